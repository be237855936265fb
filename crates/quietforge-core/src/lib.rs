//! # Quiet Forge Core Library
//!
//! This library provides the timing engine behind the Quiet Forge guided-ritual
//! timer. Hosts (the CLI today) own the frame loop and drive a session by
//! calling `tick(now)` with their own timestamps.
//!
//! ## Architecture
//!
//! - **Breath**: Pure breath phase calculator for every supported pattern
//! - **Ritual**: Ritual content, validation and the section resolver
//! - **Timer**: Pause-safe ritual clock and the session controller
//! - **Journal**: Completed-run entries, the journal sink and the suite bus
//! - **Storage**: SQLite journal store and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`RitualSession`]: Session state machine
//! - [`compute_phase`]: Breath glow state for a pattern at time `t`
//! - [`Catalog`]: Stock and user ritual definitions
//! - [`JournalStore`]: Journal persistence
//! - [`Config`]: Application configuration management

pub mod breath;
pub mod cues;
pub mod error;
pub mod events;
pub mod journal;
pub mod ritual;
pub mod storage;
pub mod timer;

pub use breath::{compute_phase, idle_state, BreathPattern, BreathPhase, BreathState};
pub use cues::{Cue, CuePlayer, GatedCuePlayer, SilentCuePlayer};
pub use error::{ConfigError, CoreError, CueError, DatabaseError, JournalError};
pub use events::Event;
pub use journal::{JournalEntry, JournalSink, NullJournalSink, SuiteBus, SuiteJournalSink};
pub use ritual::{Catalog, Ritual, RitualDefinition, Section, SectionKind, SectionPosition};
pub use storage::{Config, FileSuiteBus, JournalStore};
pub use timer::{Elapsed, RitualClock, RitualSession, SessionFrame, SessionState};
