//! Breathing patterns and the phase calculator that animates them.

mod pattern;
mod state;

pub use pattern::{BreathPattern, BreathPhase, Motion, PhaseStep, FLOOR, PEAK};
pub use state::{compute_phase, idle_state, BreathState};
