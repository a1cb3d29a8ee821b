//! The sales funnel instantiation of [`crate::flow`].

use entity::opportunity::Stage;

use crate::error::PipelineError;
use crate::flow::{Flow, Verb};

/// Verbs accepted by the stage-transition endpoint. The target stage is
/// always recomputed from the opportunity's current stage; a client-supplied
/// target is never trusted.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Transition {
    Forward,
    Backward,
    Won,
    Lost,
    Reopen,
}

impl Transition {
    pub fn as_str(self) -> &'static str {
        match self {
            Transition::Forward => "FORWARD",
            Transition::Backward => "BACKWARD",
            Transition::Won => "WON",
            Transition::Lost => "LOST",
            Transition::Reopen => "REOPEN",
        }
    }

    fn verb(self) -> Verb {
        match self {
            Transition::Forward => Verb::Forward,
            Transition::Backward => Verb::Backward,
            Transition::Won => Verb::Accept,
            Transition::Lost => Verb::Decline,
            Transition::Reopen => Verb::Reopen,
        }
    }
}

/// Column layout for the board: funnel order with the lost column last.
pub const DISPLAY_ORDER: [Stage; 6] = [
    Stage::Prospecting,
    Stage::Qualification,
    Stage::Proposal,
    Stage::Negotiation,
    Stage::ClosedWon,
    Stage::ClosedLost,
];

const CHAIN: [Stage; 5] = [
    Stage::Prospecting,
    Stage::Qualification,
    Stage::Proposal,
    Stage::Negotiation,
    Stage::ClosedWon,
];

fn funnel() -> Flow<Stage> {
    Flow::new(&CHAIN, Stage::Negotiation, Stage::ClosedLost)
}

/// Resolve the stage `transition` lands on, or reject it leaving the
/// caller's record untouched.
pub fn resolve(current: Stage, transition: Transition) -> Result<Stage, PipelineError> {
    funnel()
        .apply(current, transition.verb())
        .map_err(|_| PipelineError::InvalidTransition {
            stage: current,
            transition,
        })
}

pub fn stage_str(stage: Stage) -> &'static str {
    match stage {
        Stage::Prospecting => "PROSPECTING",
        Stage::Qualification => "QUALIFICATION",
        Stage::Proposal => "PROPOSAL",
        Stage::Negotiation => "NEGOTIATION",
        Stage::ClosedWon => "CLOSED_WON",
        Stage::ClosedLost => "CLOSED_LOST",
    }
}
