//! Ritual clock.
//!
//! A paused/running state machine over caller-supplied frame timestamps in
//! milliseconds (any monotonic origin). It never reads the system clock, so
//! hosts and tests drive it with whatever time source they own.
//!
//! ## State Transitions
//!
//! ```text
//! Paused -> Running -> Paused -> ...
//! ```
//!
//! Elapsed time is frozen while paused and never decreases while running.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Elapsed time in both representations the UI consumes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Elapsed {
    /// Whole seconds, rounded down.
    pub whole_secs: u64,
    /// Fractional seconds.
    pub fine_secs: f64,
}

impl Elapsed {
    fn from_fine(fine_secs: f64) -> Self {
        Self {
            whole_secs: fine_secs.floor() as u64,
            fine_secs,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RitualClock {
    /// Elapsed time never exceeds this many seconds.
    ceiling_secs: f64,
    running: bool,
    /// Logical start of the current run segment. `Some` only while running.
    started_at_ms: Option<f64>,
    /// When the clock was last paused.
    paused_at_ms: Option<f64>,
    elapsed: Elapsed,
}

impl RitualClock {
    /// Clock whose elapsed time is clamped to `ceiling_secs`.
    pub fn new(ceiling_secs: f64) -> Self {
        Self {
            ceiling_secs: ceiling_secs.max(0.0),
            running: false,
            started_at_ms: None,
            paused_at_ms: None,
            elapsed: Elapsed::default(),
        }
    }

    /// Clock with no ceiling, for the free-running stopwatch.
    pub fn unbounded() -> Self {
        Self::new(f64::INFINITY)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed(&self) -> Elapsed {
        self.elapsed
    }

    pub fn ceiling_secs(&self) -> f64 {
        self.ceiling_secs
    }

    pub fn paused_at_ms(&self) -> Option<f64> {
        self.paused_at_ms
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or resume. Returns `false` when already running.
    ///
    /// The start reference is placed so that the time accumulated before a
    /// pause is carried over exactly; the paused gap never counts.
    pub fn start(&mut self, now_ms: f64) -> bool {
        if self.running {
            return false;
        }
        if !now_ms.is_finite() {
            warn!(now_ms, "ignoring clock start with a non-finite timestamp");
            return false;
        }
        self.started_at_ms = Some(now_ms - self.elapsed.fine_secs * 1000.0);
        self.running = true;
        true
    }

    /// Pause, folding in the time up to `now_ms`. Returns `false` when
    /// already paused.
    pub fn pause(&mut self, now_ms: f64) -> bool {
        if !self.running {
            return false;
        }
        self.tick(now_ms);
        self.running = false;
        self.started_at_ms = None;
        self.paused_at_ms = Some(now_ms);
        true
    }

    /// Advance to `now_ms` and return the elapsed time.
    ///
    /// While paused this returns the frozen value. A timestamp that would
    /// move time backwards or is not finite leaves the value unchanged.
    pub fn tick(&mut self, now_ms: f64) -> Elapsed {
        let Some(started) = self.started_at_ms.filter(|_| self.running) else {
            return self.elapsed;
        };

        let raw = (now_ms - started) / 1000.0;
        if !raw.is_finite() {
            return self.elapsed;
        }

        let fine = raw.clamp(0.0, self.ceiling_secs).max(self.elapsed.fine_secs);
        self.elapsed = Elapsed::from_fine(fine);
        self.elapsed
    }

    /// Back to paused with nothing accumulated.
    pub fn reset(&mut self) {
        self.running = false;
        self.started_at_ms = None;
        self.paused_at_ms = None;
        self.elapsed = Elapsed::default();
    }
}
