mod common;

use async_graphql::{Request, Variables};
use chrono::{Duration, Local};
use entity::opportunity;
use serde_json::json;

const BOARD: &str = r#"
    query Board($period: PeriodFilter) {
        agency {
            pipelineBoard(period: $period) {
                totalCount
                totalCents
                columns {
                    stage
                    totalCount
                    totalCents
                    opportunities { title }
                }
            }
        }
    }
"#;

#[tokio::test]
async fn board_always_renders_six_columns_in_display_order() {
    let (_db, schema) = common::setup().await;
    let resp = schema.execute(Request::new(BOARD)).await;
    assert!(
        resp.errors.is_empty(),
        "unexpected errors: {:?}",
        resp.errors
    );
    let data = resp.data.into_json().unwrap();
    let board = &data["agency"]["pipelineBoard"];
    assert_eq!(board["totalCount"].as_i64().unwrap(), 0);
    let columns = board["columns"].as_array().cloned().unwrap();
    let stages: Vec<&str> = columns
        .iter()
        .map(|c| c["stage"].as_str().unwrap())
        .collect();
    assert_eq!(
        stages,
        vec![
            "PROSPECTING",
            "QUALIFICATION",
            "PROPOSAL",
            "NEGOTIATION",
            "CLOSED_WON",
            "CLOSED_LOST"
        ]
    );
    assert!(columns.iter().all(|c| c["totalCents"].as_i64() == Some(0)));
}

#[tokio::test]
async fn column_totals_add_up_and_treat_missing_value_as_zero() {
    let (db, schema) = common::setup().await;
    common::insert_opportunity(
        db.as_ref(),
        "With Value",
        opportunity::Stage::Prospecting,
        Some(10_000),
        None,
    )
    .await;
    common::insert_opportunity(
        db.as_ref(),
        "No Value",
        opportunity::Stage::Prospecting,
        None,
        None,
    )
    .await;
    common::insert_opportunity(
        db.as_ref(),
        "Closing",
        opportunity::Stage::Negotiation,
        Some(2_500),
        None,
    )
    .await;

    let resp = schema.execute(Request::new(BOARD)).await;
    assert!(
        resp.errors.is_empty(),
        "unexpected errors: {:?}",
        resp.errors
    );
    let data = resp.data.into_json().unwrap();
    let board = &data["agency"]["pipelineBoard"];
    assert_eq!(board["totalCount"].as_i64().unwrap(), 3);
    assert_eq!(board["totalCents"].as_i64().unwrap(), 12_500);

    let columns = board["columns"].as_array().cloned().unwrap();
    assert_eq!(columns[0]["totalCount"].as_i64().unwrap(), 2);
    assert_eq!(columns[0]["totalCents"].as_i64().unwrap(), 10_000);
    assert_eq!(columns[3]["totalCents"].as_i64().unwrap(), 2_500);
}

#[tokio::test]
async fn no_due_date_filter_is_exact() {
    let (db, schema) = common::setup().await;
    let today = Local::now().date_naive();
    common::insert_opportunity(
        db.as_ref(),
        "Dated",
        opportunity::Stage::Proposal,
        Some(1_000),
        Some(today),
    )
    .await;
    common::insert_opportunity(
        db.as_ref(),
        "Undated",
        opportunity::Stage::Proposal,
        Some(2_000),
        None,
    )
    .await;

    let list = r#"
        query List($period: PeriodFilter) {
            agency { opportunities(period: $period) { title } }
        }
    "#;

    // An opportunity with no due date fails the dated windows...
    let resp = schema
        .execute(Request::new(list).variables(Variables::from_json(json!({
            "period": "TODAY"
        }))))
        .await;
    assert!(resp.errors.is_empty());
    let data = resp.data.into_json().unwrap();
    let titles = data["agency"]["opportunities"].as_array().cloned().unwrap();
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0]["title"], "Dated");

    // ...and passes exactly the NO_DUE_DATE selector.
    let resp = schema
        .execute(Request::new(list).variables(Variables::from_json(json!({
            "period": "NO_DUE_DATE"
        }))))
        .await;
    assert!(resp.errors.is_empty());
    let data = resp.data.into_json().unwrap();
    let titles = data["agency"]["opportunities"].as_array().cloned().unwrap();
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0]["title"], "Undated");
}

#[tokio::test]
async fn overdue_board_only_counts_past_due_dates() {
    let (db, schema) = common::setup().await;
    let today = Local::now().date_naive();
    common::insert_opportunity(
        db.as_ref(),
        "Past Due",
        opportunity::Stage::Qualification,
        Some(4_000),
        Some(today - Duration::days(3)),
    )
    .await;
    common::insert_opportunity(
        db.as_ref(),
        "Due Later",
        opportunity::Stage::Qualification,
        Some(6_000),
        Some(today + Duration::days(3)),
    )
    .await;
    common::insert_opportunity(
        db.as_ref(),
        "No Date",
        opportunity::Stage::Qualification,
        Some(8_000),
        None,
    )
    .await;

    let resp = schema
        .execute(Request::new(BOARD).variables(Variables::from_json(json!({
            "period": "OVERDUE"
        }))))
        .await;
    assert!(
        resp.errors.is_empty(),
        "unexpected errors: {:?}",
        resp.errors
    );
    let data = resp.data.into_json().unwrap();
    let board = &data["agency"]["pipelineBoard"];
    assert_eq!(board["totalCount"].as_i64().unwrap(), 1);
    assert_eq!(board["totalCents"].as_i64().unwrap(), 4_000);
    let columns = board["columns"].as_array().cloned().unwrap();
    let titles = columns[1]["opportunities"].as_array().cloned().unwrap();
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0]["title"], "Past Due");
}
