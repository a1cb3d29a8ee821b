mod common;

use async_graphql::{Request, Variables};
use serde_json::json;

const REVIEW: &str = r#"
    mutation Review($id: ID!, $action: StrategyAction!) {
        agency {
            reviewStrategy(id: $id, action: $action) { id status }
        }
    }
"#;

async fn create_strategy(schema: &common::TestSchema, title: &str) -> String {
    let resp = schema
        .execute(
            Request::new(
                r#"
                mutation Create($input: NewStrategyInput!) {
                    agency { createStrategy(input: $input) { id status } }
                }
            "#,
            )
            .variables(Variables::from_json(json!({
                "input": { "title": title }
            }))),
        )
        .await;
    assert!(
        resp.errors.is_empty(),
        "unexpected errors: {:?}",
        resp.errors
    );
    let data = resp.data.into_json().unwrap();
    assert_eq!(data["agency"]["createStrategy"]["status"], "CREATED");
    data["agency"]["createStrategy"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn review(schema: &common::TestSchema, id: &str, action: &str) -> async_graphql::Response {
    schema
        .execute(Request::new(REVIEW).variables(Variables::from_json(json!({
            "id": id,
            "action": action
        }))))
        .await
}

#[tokio::test]
async fn strategies_walk_the_review_flow_to_execution() {
    let (_db, schema) = common::setup().await;
    let id = create_strategy(&schema, "Q3 Launch Plan").await;

    for (action, expected) in [
        ("SUBMIT", "UNDER_REVIEW"),
        ("APPROVE", "APPROVED"),
        ("EXECUTE", "EXECUTING"),
    ] {
        let resp = review(&schema, &id, action).await;
        assert!(
            resp.errors.is_empty(),
            "unexpected errors on {}: {:?}",
            action,
            resp.errors
        );
        let data = resp.data.into_json().unwrap();
        assert_eq!(data["agency"]["reviewStrategy"]["status"], expected);
    }
}

#[tokio::test]
async fn rejection_can_be_reopened_for_another_review() {
    let (_db, schema) = common::setup().await;
    let id = create_strategy(&schema, "Content Calendar").await;

    let resp = review(&schema, &id, "SUBMIT").await;
    assert!(resp.errors.is_empty());
    let resp = review(&schema, &id, "REJECT").await;
    assert!(resp.errors.is_empty());
    let data = resp.data.into_json().unwrap();
    assert_eq!(data["agency"]["reviewStrategy"]["status"], "REJECTED");

    let resp = review(&schema, &id, "REOPEN").await;
    assert!(resp.errors.is_empty());
    let data = resp.data.into_json().unwrap();
    assert_eq!(data["agency"]["reviewStrategy"]["status"], "UNDER_REVIEW");
}

#[tokio::test]
async fn out_of_order_actions_are_rejected() {
    let (_db, schema) = common::setup().await;
    let id = create_strategy(&schema, "Premature Plan").await;

    for action in ["APPROVE", "EXECUTE", "REOPEN"] {
        let resp = review(&schema, &id, action).await;
        assert!(!resp.errors.is_empty(), "{} should be rejected", action);
    }

    // Still in its initial status after every rejected action.
    let resp = review(&schema, &id, "SUBMIT").await;
    assert!(resp.errors.is_empty());
    let data = resp.data.into_json().unwrap();
    assert_eq!(data["agency"]["reviewStrategy"]["status"], "UNDER_REVIEW");
}
