use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::breath::BreathState;
use crate::timer::SessionState;

/// Every state change of a ritual session produces an Event.
/// Hosts render from them; the CLI prints them with `--json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        ritual_id: String,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    SessionPaused {
        elapsed_secs: f64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        elapsed_secs: f64,
        at: DateTime<Utc>,
    },
    /// A section boundary was crossed.
    SectionEntered {
        index: usize,
        /// Section active on the previous tick. More than one boundary may
        /// have been crossed if the host stalled.
        from_index: usize,
        label: String,
        kind: String,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        ritual_id: String,
        entry_id: String,
        at: DateTime<Utc>,
    },
    /// User left before the end; nothing is journaled.
    SessionExited {
        ritual_id: String,
        elapsed_secs: f64,
        at: DateTime<Utc>,
    },
    /// Full state dump, for hosts that attach mid-session.
    StateSnapshot {
        state: SessionState,
        ritual_id: String,
        section_index: usize,
        section_label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        breath: Option<BreathState>,
        elapsed_secs: f64,
        remaining_secs: u64,
        progress_pct: f64,
        at: DateTime<Utc>,
    },
}
