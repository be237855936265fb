//! Journal entries, the journal sink and the suite bus capability.
//!
//! The session controller hands each completed run to a [`JournalSink`].
//! [`SuiteJournalSink`] is the concrete adapter: it stores entries in the
//! local [`crate::storage::JournalStore`] and mirrors them onto a
//! [`SuiteBus`] for the companion apps.

mod entry;
mod sink;
pub mod suite;

pub use entry::JournalEntry;
pub use sink::{JournalSink, NullJournalSink, SuiteJournalSink};
pub use suite::{
    EchoSuiteRecord, MemorySuiteBus, SuiteBus, SuiteIntention, SuiteJournal, SuiteTask,
};
