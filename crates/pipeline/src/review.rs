//! Review flow for AI-generated strategies: the same chain-with-branch
//! shape as the sales funnel, instantiated over review statuses.

use entity::strategy::Status;
use thiserror::Error;

use crate::flow::{Flow, Verb};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ReviewAction {
    Submit,
    Approve,
    Reject,
    Execute,
    Reopen,
}

impl ReviewAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewAction::Submit => "SUBMIT",
            ReviewAction::Approve => "APPROVE",
            ReviewAction::Reject => "REJECT",
            ReviewAction::Execute => "EXECUTE",
            ReviewAction::Reopen => "REOPEN",
        }
    }
}

#[derive(Debug, Error)]
#[error("{} does not apply to a strategy in {}", .action.as_str(), status_str(*.status))]
pub struct InvalidReview {
    pub status: Status,
    pub action: ReviewAction,
}

const CHAIN: [Status; 4] = [
    Status::Created,
    Status::UnderReview,
    Status::Approved,
    Status::Executing,
];

fn review_flow() -> Flow<Status> {
    Flow::new(&CHAIN, Status::UnderReview, Status::Rejected)
}

/// Resolve the status `action` lands on. `Submit` and `Execute` are both
/// one-step advances; each is pinned to the status it applies to so the
/// action names stay honest.
pub fn resolve(current: Status, action: ReviewAction) -> Result<Status, InvalidReview> {
    let illegal = InvalidReview {
        status: current,
        action,
    };
    match (action, current) {
        (ReviewAction::Submit, status) if status != Status::Created => return Err(illegal),
        (ReviewAction::Execute, status) if status != Status::Approved => return Err(illegal),
        _ => {}
    }
    let verb = match action {
        ReviewAction::Submit | ReviewAction::Execute => Verb::Forward,
        ReviewAction::Approve => Verb::Accept,
        ReviewAction::Reject => Verb::Decline,
        ReviewAction::Reopen => Verb::Reopen,
    };
    review_flow().apply(current, verb).map_err(|_| illegal)
}

pub fn status_str(status: Status) -> &'static str {
    match status {
        Status::Created => "CREATED",
        Status::UnderReview => "UNDER_REVIEW",
        Status::Approved => "APPROVED",
        Status::Rejected => "REJECTED",
        Status::Executing => "EXECUTING",
    }
}
