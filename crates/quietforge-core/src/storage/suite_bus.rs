//! Suite bus backed by a single JSON file.
//!
//! The file holds one JSON object mapping bus keys to values. Every append
//! reads the file, applies the change and writes it back.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::JournalError;
use crate::journal::suite::{self, SuiteBus, SuiteIntention, SuiteJournal, SuiteTask};

#[derive(Debug, Clone)]
pub struct FileSuiteBus {
    path: PathBuf,
}

impl FileSuiteBus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents. A missing or unreadable file reads as empty.
    pub fn read_all(&self) -> Map<String, Value> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => return Map::new(),
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                warn!(path = %self.path.display(), "suite bus file is malformed, starting fresh");
                Map::new()
            }
        }
    }

    pub fn read(&self, key: &str) -> Option<Value> {
        self.read_all().remove(key)
    }

    fn update(
        &self,
        key: &str,
        apply: impl FnOnce(&mut Map<String, Value>) -> Result<(), JournalError>,
    ) -> Result<(), JournalError> {
        let mut store = self.read_all();
        apply(&mut store)?;

        let write_err = |message: String| JournalError::BusWrite {
            key: key.to_string(),
            message,
        };
        let content = serde_json::to_string_pretty(&Value::Object(store))
            .map_err(|e| write_err(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }
        std::fs::write(&self.path, content).map_err(|e| write_err(e.to_string()))
    }
}

impl SuiteBus for FileSuiteBus {
    fn append_journal_entry(&self, journal: &SuiteJournal) -> Result<(), JournalError> {
        self.update(suite::keys::JOURNALS, |store| suite::apply_journal(store, journal))
    }

    fn append_intention(&self, intention: &SuiteIntention) -> Result<(), JournalError> {
        self.update(suite::keys::INTENTIONS, |store| {
            suite::apply_intention(store, intention)
        })
    }

    fn append_task(&self, task: &SuiteTask) -> Result<(), JournalError> {
        self.update(suite::keys::TASKS, |store| suite::apply_task(store, task))
    }
}
