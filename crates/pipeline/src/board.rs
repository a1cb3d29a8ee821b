//! Kanban-board aggregation: one bucket per stage.

use entity::opportunity::{Model, Stage};

use crate::stage::DISPLAY_ORDER;

/// One board column: the opportunities in a stage and their summed value.
#[derive(Clone, Debug)]
pub struct StageBucket {
    pub stage: Stage,
    pub total_cents: i64,
    pub opportunities: Vec<Model>,
}

/// Groups opportunities into buckets following [`DISPLAY_ORDER`]. Every
/// stage yields a bucket even when empty so the board always renders six
/// columns; an absent value counts as 0.
pub fn group_by_stage(opportunities: Vec<Model>) -> Vec<StageBucket> {
    let mut buckets: Vec<StageBucket> = DISPLAY_ORDER
        .iter()
        .map(|stage| StageBucket {
            stage: *stage,
            total_cents: 0,
            opportunities: Vec::new(),
        })
        .collect();
    for opportunity in opportunities {
        let bucket = buckets
            .iter_mut()
            .find(|bucket| bucket.stage == opportunity.stage)
            .expect("display order covers every stage");
        bucket.total_cents += opportunity.amount_cents.unwrap_or(0);
        bucket.opportunities.push(opportunity);
    }
    buckets
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use entity::opportunity;
    use uuid::Uuid;

    use super::*;

    fn sample(stage: Stage, amount_cents: Option<i64>) -> Model {
        let created = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        opportunity::Model {
            id: Uuid::new_v4(),
            title: "Deal".into(),
            client_name: "Client".into(),
            email: None,
            phone: None,
            amount_cents,
            probability: None,
            stage,
            expected_close_date: None,
            notes: None,
            created_at: created.into(),
            updated_at: created.into(),
        }
    }

    #[test]
    fn empty_input_still_yields_every_column() {
        let buckets = group_by_stage(vec![]);
        assert_eq!(buckets.len(), 6);
        assert_eq!(
            buckets.iter().map(|b| b.stage).collect::<Vec<_>>(),
            DISPLAY_ORDER.to_vec()
        );
        assert!(buckets.iter().all(|b| b.total_cents == 0));
        assert!(buckets.iter().all(|b| b.opportunities.is_empty()));
    }

    #[test]
    fn totals_treat_absent_value_as_zero_and_add_up() {
        let input = vec![
            sample(Stage::Prospecting, Some(10_000)),
            sample(Stage::Prospecting, None),
            sample(Stage::Negotiation, Some(2_500)),
            sample(Stage::ClosedLost, Some(700)),
        ];
        let grand_total: i64 = input.iter().filter_map(|o| o.amount_cents).sum();
        let buckets = group_by_stage(input);

        let prospecting = &buckets[0];
        assert_eq!(prospecting.opportunities.len(), 2);
        assert_eq!(prospecting.total_cents, 10_000);

        assert_eq!(buckets.iter().map(|b| b.total_cents).sum::<i64>(), grand_total);
        assert_eq!(buckets.last().unwrap().stage, Stage::ClosedLost);
        assert_eq!(buckets.last().unwrap().total_cents, 700);
    }
}
