//! Journal entry type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ritual::Ritual;

/// A reflection record for one finished ritual run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub ritual_id: String,
    pub ritual_name: String,
    pub completed_at: DateTime<Utc>,
    /// Filled in later by the reflection editor.
    #[serde(default)]
    pub note: Option<String>,
}

impl JournalEntry {
    /// New entry for `ritual`, without a note.
    pub fn for_ritual(ritual: &Ritual, completed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            ritual_id: ritual.id().to_string(),
            ritual_name: ritual.name().to_string(),
            completed_at,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}
