//! Journal sink: where completed sessions go.

use chrono::Utc;
use tracing::{debug, warn};

use super::suite::{SuiteBus, SuiteIntention, SuiteJournal, SuiteTask};
use super::JournalEntry;
use crate::error::JournalError;
use crate::storage::JournalStore;

/// Receives one entry per completed ritual run.
///
/// The sink owns persistence, deduplication and any propagation to the
/// suite bus. The session controller logs and drops any error.
pub trait JournalSink {
    fn submit_completed_session(&self, entry: JournalEntry) -> Result<(), JournalError>;
}

impl<T: JournalSink + ?Sized> JournalSink for &T {
    fn submit_completed_session(&self, entry: JournalEntry) -> Result<(), JournalError> {
        (**self).submit_completed_session(entry)
    }
}

impl<T: JournalSink + ?Sized> JournalSink for Box<T> {
    fn submit_completed_session(&self, entry: JournalEntry) -> Result<(), JournalError> {
        (**self).submit_completed_session(entry)
    }
}

/// Discards every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullJournalSink;

impl JournalSink for NullJournalSink {
    fn submit_completed_session(&self, _entry: JournalEntry) -> Result<(), JournalError> {
        Ok(())
    }
}

/// Persists entries locally and mirrors them onto the suite bus.
///
/// The local write is authoritative; bus writes are best-effort and only
/// logged when they fail.
pub struct SuiteJournalSink<'a, B> {
    store: &'a JournalStore,
    bus: Option<B>,
    /// Rituals whose reflection notes also become the current intention
    /// and a new task.
    intention_rituals: Vec<String>,
}

impl<'a, B: SuiteBus> SuiteJournalSink<'a, B> {
    pub fn new(store: &'a JournalStore, bus: Option<B>) -> Self {
        Self {
            store,
            bus,
            intention_rituals: Vec::new(),
        }
    }

    pub fn with_intention_rituals(mut self, ids: Vec<String>) -> Self {
        self.intention_rituals = ids;
        self
    }

    /// Attach a reflection note to an existing entry.
    ///
    /// The note is stored locally, then the entry's suite journal record is
    /// replaced by the noted one and echoed. For intention
    /// rituals it also becomes the current intention and a one-pomodoro task.
    pub fn record_reflection(&self, entry_id: &str, note: &str) -> Result<JournalEntry, JournalError> {
        let entry = self.store.set_note(entry_id, note)?;

        if let Some(bus) = &self.bus {
            let journal = SuiteJournal {
                at: Utc::now(),
                ..SuiteJournal::from(&entry)
            };
            if let Err(e) = bus.append_journal_entry(&journal) {
                warn!(entry = %entry.id, error = %e, "suite journal write failed");
            }

            if self.intention_rituals.iter().any(|id| *id == entry.ritual_id) {
                let now = Utc::now();
                let intention = SuiteIntention::new(note, entry.ritual_name.clone(), now);
                if let Err(e) = bus.append_intention(&intention) {
                    warn!(entry = %entry.id, error = %e, "suite intention write failed");
                }
                if let Err(e) = bus.append_task(&SuiteTask::new(note, now)) {
                    warn!(entry = %entry.id, error = %e, "suite task write failed");
                }
            }
        }
        Ok(entry)
    }
}

impl<B: SuiteBus> JournalSink for SuiteJournalSink<'_, B> {
    fn submit_completed_session(&self, entry: JournalEntry) -> Result<(), JournalError> {
        if !self.store.append(&entry)? {
            debug!(entry = %entry.id, "journal entry already stored");
            return Ok(());
        }

        if let Some(bus) = &self.bus {
            if let Err(e) = bus.append_journal_entry(&SuiteJournal::from(&entry)) {
                warn!(entry = %entry.id, error = %e, "suite journal write failed");
            }
        }
        Ok(())
    }
}
