use clap::Subcommand;
use quietforge_core::journal::SuiteJournalSink;
use quietforge_core::{Config, FileSuiteBus, JournalStore};

#[derive(Subcommand)]
pub enum JournalAction {
    /// List journal entries, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Attach a reflection note to an entry
    Note {
        /// Entry ID
        id: String,
        /// Reflection text
        text: String,
    },
    /// Delete one entry
    Delete {
        /// Entry ID
        id: String,
    },
    /// Delete every entry
    Clear,
}

pub fn run(action: JournalAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = JournalStore::open()?;

    match action {
        JournalAction::List { json } => {
            let entries = store.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("no entries");
            } else {
                for e in entries {
                    let when = e.completed_at.format("%Y-%m-%d %H:%M");
                    println!("{}  {when}  {}", e.id, e.ritual_name);
                    if let Some(note) = e.note {
                        println!("    {note}");
                    }
                }
            }
        }
        JournalAction::Note { id, text } => {
            let config = Config::load()?;
            let bus = if config.journal.propagate_to_suite {
                Some(FileSuiteBus::new(config.suite_bus_path()?))
            } else {
                None
            };
            let sink = SuiteJournalSink::new(&store, bus)
                .with_intention_rituals(config.suite.intention_rituals.clone());
            let entry = sink.record_reflection(&id, &text)?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        JournalAction::Delete { id } => {
            if !store.delete(&id)? {
                return Err(format!("journal entry not found: {id}").into());
            }
            println!("deleted {id}");
        }
        JournalAction::Clear => {
            let n = store.clear()?;
            println!("deleted {n} entries");
        }
    }
    Ok(())
}
