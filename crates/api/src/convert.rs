use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;
use entity::opportunity;
use pipeline::conversion::{ClientDraft, Conversion};
use uuid::Uuid;

/// In-flight conversion drafts keyed by opportunity id. One draft per
/// opportunity; drafts for different opportunities never disturb each
/// other. The ledger is process-local: a draft lost to a restart simply
/// means the next confirmation derives a fresh one from the store.
#[derive(Default)]
pub struct ConversionLedger {
    entries: Mutex<HashMap<Uuid, Conversion>>,
}

impl ConversionLedger {
    /// Opens (or replaces) the pending draft for an opportunity and
    /// returns a copy for presentation.
    pub fn begin(&self, source: &opportunity::Model, today: NaiveDate) -> ClientDraft {
        let conversion = Conversion::begin(source, today);
        let draft = conversion
            .draft()
            .cloned()
            .expect("a freshly begun conversion holds a draft");
        self.entries
            .lock()
            .expect("ledger lock")
            .insert(source.id, conversion);
        draft
    }

    pub fn pending(&self, opportunity_id: Uuid) -> Option<ClientDraft> {
        self.entries
            .lock()
            .expect("ledger lock")
            .get(&opportunity_id)
            .and_then(|conversion| conversion.draft().cloned())
    }

    /// Settles the pending draft as persisted and drops the entry. A
    /// missing entry is fine: confirmations may arrive without a prior
    /// Won transition in this process.
    pub fn settle_persisted(&self, opportunity_id: Uuid) {
        let mut entries = self.entries.lock().expect("ledger lock");
        if let Some(conversion) = entries.get_mut(&opportunity_id) {
            if conversion.confirm().is_ok() {
                entries.remove(&opportunity_id);
            }
        }
    }

    /// Discards the pending draft. Returns whether one existed; the
    /// opportunity's stage is not touched either way.
    pub fn cancel(&self, opportunity_id: Uuid) -> bool {
        let mut entries = self.entries.lock().expect("ledger lock");
        match entries.get_mut(&opportunity_id) {
            Some(conversion) => {
                if conversion.cancel().is_ok() {
                    entries.remove(&opportunity_id);
                    true
                } else {
                    false
                }
            }
            None => false,
        }
    }
}
