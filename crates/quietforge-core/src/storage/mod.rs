mod config;
pub mod journal_store;
pub mod suite_bus;

pub use config::{AudioConfig, Config, JournalConfig, SuiteConfig, TimerConfig};
pub use journal_store::JournalStore;
pub use suite_bus::FileSuiteBus;

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// `QUIETFORGE_HOME` wins when set. Otherwise `~/.config/quietforge[-dev]/`
/// based on QUIETFORGE_ENV; set QUIETFORGE_ENV=dev for the development
/// directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("QUIETFORGE_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("QUIETFORGE_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("quietforge-dev")
            } else {
                base_dir.join("quietforge")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
