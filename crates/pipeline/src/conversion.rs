//! Deriving a client from a won opportunity.
//!
//! The stage write and the client write are two independent persistence
//! operations; this module only produces the draft and tracks its
//! lifecycle. A cancelled or failed client write never rolls the
//! opportunity back out of `closed_won`.

use chrono::NaiveDate;
use entity::{client, opportunity};

use crate::error::PipelineError;

/// An unpersisted client record derived from a won opportunity. Every
/// field may be edited by the caller before confirmation.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientDraft {
    pub name: String,
    pub company: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub industry: Option<String>,
    pub monthly_value_cents: Option<i64>,
    pub status: client::Status,
    pub start_date: NaiveDate,
    pub notes: String,
}

impl ClientDraft {
    /// The prospect name fills name, company and contact person; the
    /// one-time deal value is copied into the recurring monthly value
    /// verbatim. Provenance is carried only in the notes text.
    pub fn from_opportunity(source: &opportunity::Model, today: NaiveDate) -> Self {
        Self {
            name: source.client_name.clone(),
            company: Some(source.client_name.clone()),
            contact_person: Some(source.client_name.clone()),
            email: source.email.clone(),
            phone: source.phone.clone(),
            industry: None,
            monthly_value_cents: source.amount_cents,
            status: client::Status::Active,
            start_date: today,
            notes: format!("Cliente convertido da oportunidade: {}", source.title),
        }
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.name.trim().is_empty() {
            return Err(PipelineError::Validation {
                field: "name",
                message: "name is required".into(),
            });
        }
        Ok(())
    }
}

/// Lifecycle of one conversion. `DraftPending` is entered only by a Won
/// transition and holds exactly one draft per opportunity.
#[derive(Clone, Debug, PartialEq)]
pub enum Conversion {
    Idle,
    DraftPending(ClientDraft),
    Persisted,
    Cancelled,
}

impl Conversion {
    pub fn begin(source: &opportunity::Model, today: NaiveDate) -> Self {
        Conversion::DraftPending(ClientDraft::from_opportunity(source, today))
    }

    pub fn draft(&self) -> Option<&ClientDraft> {
        match self {
            Conversion::DraftPending(draft) => Some(draft),
            _ => None,
        }
    }

    /// Marks the draft persisted. Legal only while a draft is pending.
    pub fn confirm(&mut self) -> Result<(), PipelineError> {
        match self {
            Conversion::DraftPending(_) => {
                *self = Conversion::Persisted;
                Ok(())
            }
            _ => Err(PipelineError::NoPendingDraft),
        }
    }

    /// Discards the draft. The opportunity stays `closed_won`.
    pub fn cancel(&mut self) -> Result<(), PipelineError> {
        match self {
            Conversion::DraftPending(_) => {
                *self = Conversion::Cancelled;
                Ok(())
            }
            _ => Err(PipelineError::NoPendingDraft),
        }
    }
}
