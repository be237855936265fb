//! Suite bus records and capability trait.
//!
//! The suite bus is a keyed store shared by the companion apps. Quiet Forge
//! appends intentions, tasks and echo-log records to it. Journal records
//! are keyed by entry id: a later record for the same entry replaces the
//! earlier one.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::RefCell;
use uuid::Uuid;

use super::JournalEntry;
use crate::error::JournalError;

/// Value written to every record's `source` field.
pub const SOURCE: &str = "rituals";

/// Well-known bus keys.
pub mod keys {
    pub const JOURNALS: &str = "suite.journals";
    pub const INTENTIONS: &str = "suite.intentions";
    pub const CURRENT_INTENTION: &str = "suite.currentIntention";
    pub const TASKS: &str = "suite.tasks";
    pub const ECHO_SUITE: &str = "echo_suite_data";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteJournal {
    pub id: String,
    pub at: DateTime<Utc>,
    pub ritual_id: String,
    pub ritual_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub source: String,
}

impl From<&JournalEntry> for SuiteJournal {
    fn from(entry: &JournalEntry) -> Self {
        Self {
            id: entry.id.clone(),
            at: entry.completed_at,
            ritual_id: entry.ritual_id.clone(),
            ritual_name: entry.ritual_name.clone(),
            note: entry.note.clone(),
            source: SOURCE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteIntention {
    pub id: String,
    pub at: DateTime<Utc>,
    pub text: String,
    pub ritual: String,
    pub source: String,
}

impl SuiteIntention {
    pub fn new(text: impl Into<String>, ritual: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            at,
            text: text.into(),
            ritual: ritual.into(),
            source: SOURCE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteTask {
    pub id: String,
    pub title: String,
    /// Estimate in pomodoros.
    pub estimate: u32,
    pub created_at: DateTime<Utc>,
    pub source: String,
}

impl SuiteTask {
    pub fn new(title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            estimate: 1,
            created_at,
            source: SOURCE.to_string(),
        }
    }
}

/// Flat record in the shared echo-suite log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EchoSuiteRecord {
    /// `ritual_` followed by the timestamp truncated to the minute.
    pub id: String,
    pub app: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: String,
    pub content: String,
}

impl EchoSuiteRecord {
    pub fn journal(content: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: format!("ritual_{}", at.format("%Y-%m-%dT%H:%M")),
            app: SOURCE.to_string(),
            kind: "journal".to_string(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            content: content.into(),
        }
    }
}

/// Write capabilities of the suite bus.
pub trait SuiteBus {
    /// Store the journal record, replacing any record with the same id.
    fn append_journal_entry(&self, journal: &SuiteJournal) -> Result<(), JournalError>;

    /// Record an intention and make it the current one.
    fn append_intention(&self, intention: &SuiteIntention) -> Result<(), JournalError>;

    fn append_task(&self, task: &SuiteTask) -> Result<(), JournalError>;
}

impl<T: SuiteBus + ?Sized> SuiteBus for &T {
    fn append_journal_entry(&self, journal: &SuiteJournal) -> Result<(), JournalError> {
        (**self).append_journal_entry(journal)
    }

    fn append_intention(&self, intention: &SuiteIntention) -> Result<(), JournalError> {
        (**self).append_intention(intention)
    }

    fn append_task(&self, task: &SuiteTask) -> Result<(), JournalError> {
        (**self).append_task(task)
    }
}

/// Shared keyed-value layout used by every bus backend.
///
/// Journal entries that carry a note are mirrored into the echo-suite log.
pub(crate) fn apply_journal(store: &mut Map<String, Value>, journal: &SuiteJournal) -> Result<(), JournalError> {
    upsert(store, keys::JOURNALS, &journal.id, to_value(keys::JOURNALS, journal)?);
    if let Some(note) = &journal.note {
        let echo = EchoSuiteRecord::journal(note.clone(), journal.at);
        push(store, keys::ECHO_SUITE, to_value(keys::ECHO_SUITE, &echo)?);
    }
    Ok(())
}

pub(crate) fn apply_intention(
    store: &mut Map<String, Value>,
    intention: &SuiteIntention,
) -> Result<(), JournalError> {
    let value = to_value(keys::INTENTIONS, intention)?;
    store.insert(keys::CURRENT_INTENTION.to_string(), value.clone());
    push(store, keys::INTENTIONS, value);
    Ok(())
}

pub(crate) fn apply_task(store: &mut Map<String, Value>, task: &SuiteTask) -> Result<(), JournalError> {
    push(store, keys::TASKS, to_value(keys::TASKS, task)?);
    Ok(())
}

/// Append to the list under `key`. A missing or non-list value starts a
/// fresh list.
fn push(store: &mut Map<String, Value>, key: &str, value: Value) {
    match store.get_mut(key) {
        Some(Value::Array(list)) => list.push(value),
        _ => {
            store.insert(key.to_string(), Value::Array(vec![value]));
        }
    }
}

/// Replace the record whose `id` matches, or append when there is none.
fn upsert(store: &mut Map<String, Value>, key: &str, id: &str, value: Value) {
    if let Some(Value::Array(list)) = store.get_mut(key) {
        if let Some(slot) = list.iter_mut().find(|v| v["id"] == id) {
            *slot = value;
            return;
        }
    }
    push(store, key, value);
}

fn to_value<T: Serialize>(key: &str, record: &T) -> Result<Value, JournalError> {
    serde_json::to_value(record).map_err(|e| JournalError::BusWrite {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// In-process bus, for hosts without shared storage and for tests.
#[derive(Debug, Default)]
pub struct MemorySuiteBus {
    store: RefCell<Map<String, Value>>,
}

impl MemorySuiteBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value under `key`, if any.
    pub fn read(&self, key: &str) -> Option<Value> {
        self.store.borrow().get(key).cloned()
    }

    /// Number of records in the list under `key`.
    pub fn count(&self, key: &str) -> usize {
        match self.store.borrow().get(key) {
            Some(Value::Array(list)) => list.len(),
            _ => 0,
        }
    }
}

impl SuiteBus for MemorySuiteBus {
    fn append_journal_entry(&self, journal: &SuiteJournal) -> Result<(), JournalError> {
        apply_journal(&mut self.store.borrow_mut(), journal)
    }

    fn append_intention(&self, intention: &SuiteIntention) -> Result<(), JournalError> {
        apply_intention(&mut self.store.borrow_mut(), intention)
    }

    fn append_task(&self, task: &SuiteTask) -> Result<(), JournalError> {
        apply_task(&mut self.store.borrow_mut(), task)
    }
}
