//! SQLite-backed journal of completed rituals.
//!
//! One row per completed run, keyed by entry id. Appends are idempotent so
//! a retried submission never produces a second row.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::data_dir;
use crate::error::{CoreError, DatabaseError, JournalError};
use crate::journal::JournalEntry;

pub struct JournalStore {
    conn: Connection,
}

impl JournalStore {
    /// Open the journal at `<data dir>/journal.db`.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("journal.db");
        Ok(Self::open_at(&path)?)
    }

    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory journal.
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS journal (
                id           TEXT PRIMARY KEY,
                ritual_id    TEXT NOT NULL,
                ritual_name  TEXT NOT NULL,
                completed_at TEXT NOT NULL,
                note         TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_journal_completed_at ON journal(completed_at);",
        )
    }

    /// Store an entry. Returns `false` when an entry with the same id is
    /// already present.
    pub fn append(&self, entry: &JournalEntry) -> Result<bool, DatabaseError> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO journal (id, ritual_id, ritual_name, completed_at, note)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.id,
                entry.ritual_id,
                entry.ritual_name,
                entry.completed_at.to_rfc3339(),
                entry.note,
            ],
        )?;
        Ok(inserted > 0)
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// All entries, newest first.
    pub fn list(&self) -> Result<Vec<JournalEntry>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, ritual_id, ritual_name, completed_at, note
             FROM journal ORDER BY completed_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([], row_to_entry)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    pub fn get(&self, id: &str) -> Result<Option<JournalEntry>, DatabaseError> {
        let entry = self
            .conn
            .query_row(
                "SELECT id, ritual_id, ritual_name, completed_at, note
                 FROM journal WHERE id = ?1",
                params![id],
                row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    pub fn count(&self) -> Result<u64, DatabaseError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM journal", [], |row| row.get(0))?;
        Ok(n.max(0) as u64)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Attach or replace the reflection note on an entry.
    pub fn set_note(&self, id: &str, note: &str) -> Result<JournalEntry, JournalError> {
        let updated = self.conn.execute(
            "UPDATE journal SET note = ?1 WHERE id = ?2",
            params![note, id],
        )?;
        if updated == 0 {
            return Err(JournalError::EntryNotFound(id.to_string()));
        }
        self.get(id)?
            .ok_or_else(|| JournalError::EntryNotFound(id.to_string()))
    }

    /// Remove one entry. Returns `false` if it did not exist.
    pub fn delete(&self, id: &str) -> Result<bool, DatabaseError> {
        let removed = self
            .conn
            .execute("DELETE FROM journal WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    /// Remove every entry, returning how many were dropped.
    pub fn clear(&self) -> Result<usize, DatabaseError> {
        Ok(self.conn.execute("DELETE FROM journal", [])?)
    }
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<JournalEntry> {
    let completed_at: String = row.get(3)?;
    let completed_at = DateTime::parse_from_rfc3339(&completed_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;
    Ok(JournalEntry {
        id: row.get(0)?,
        ritual_id: row.get(1)?,
        ritual_name: row.get(2)?,
        completed_at,
        note: row.get(4)?,
    })
}
