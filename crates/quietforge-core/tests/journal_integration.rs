//! Integration tests for journal persistence and suite propagation.

use chrono::Utc;
use quietforge_core::journal::suite::keys;
use quietforge_core::journal::SuiteJournalSink;
use quietforge_core::{Catalog, FileSuiteBus, JournalEntry, JournalSink, JournalStore};

#[test]
fn reflection_flows_to_suite_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("journal.db");
    let bus_path = dir.path().join("suite.json");
    let catalog = Catalog::stock().unwrap();
    let ritual = catalog.require("morning_alignment").unwrap();

    let entry = JournalEntry::for_ritual(ritual, Utc::now());
    let id = entry.id.clone();
    {
        let store = JournalStore::open_at(&db_path).unwrap();
        let sink = SuiteJournalSink::new(&store, Some(FileSuiteBus::new(&bus_path)))
            .with_intention_rituals(vec!["morning_alignment".into()]);
        sink.submit_completed_session(entry).unwrap();
    }

    // A later process attaches the note.
    let store = JournalStore::open_at(&db_path).unwrap();
    let bus = FileSuiteBus::new(&bus_path);
    let sink = SuiteJournalSink::new(&store, Some(&bus))
        .with_intention_rituals(vec!["morning_alignment".into()]);
    sink.record_reflection(&id, "Write the hard email first").unwrap();

    assert_eq!(
        store.get(&id).unwrap().unwrap().note.as_deref(),
        Some("Write the hard email first")
    );
    let journals = bus.read(keys::JOURNALS).unwrap();
    let journals = journals.as_array().unwrap();
    assert_eq!(journals.len(), 1);
    assert_eq!(journals[0]["id"], id.as_str());
    assert_eq!(journals[0]["note"], "Write the hard email first");
    assert_eq!(
        bus.read(keys::CURRENT_INTENTION).unwrap()["text"],
        "Write the hard email first"
    );
    let tasks = bus.read(keys::TASKS).unwrap();
    assert_eq!(tasks[0]["title"], "Write the hard email first");
    assert_eq!(tasks[0]["source"], "rituals");
    let echo = bus.read(keys::ECHO_SUITE).unwrap();
    assert!(echo[0]["id"].as_str().unwrap().starts_with("ritual_"));
}

#[test]
fn broken_bus_does_not_lose_the_entry() {
    let dir = tempfile::tempdir().unwrap();
    let store = JournalStore::open_in_memory().unwrap();
    // The bus path is a directory, so every write fails.
    let sink = SuiteJournalSink::new(&store, Some(FileSuiteBus::new(dir.path())));
    let catalog = Catalog::stock().unwrap();
    let entry = JournalEntry::for_ritual(catalog.require("stress_reset").unwrap(), Utc::now());

    sink.submit_completed_session(entry.clone()).unwrap();
    assert_eq!(store.list().unwrap(), vec![entry]);
}
