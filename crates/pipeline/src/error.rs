use entity::opportunity::Stage;
use thiserror::Error;

use crate::stage::{stage_str, Transition};

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The requested verb does not apply to the opportunity's current
    /// stage. The record is left unchanged.
    #[error("{} is not a legal transition from {}", .transition.as_str(), stage_str(*.stage))]
    InvalidTransition { stage: Stage, transition: Transition },

    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Confirm/cancel arrived for a conversion that is not in
    /// `DraftPending`.
    #[error("no pending conversion draft")]
    NoPendingDraft,
}
