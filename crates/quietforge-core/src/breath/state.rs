//! Breath phase calculator.
//!
//! Maps (pattern, seconds) to the visual state of the breathing glow. Pure
//! and total: every finite or non-finite input yields a state whose scale and
//! opacity lie in `[0, 1]`.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use super::pattern::{BreathPattern, BreathPhase, Motion, PhaseStep, FLOOR, PEAK};

/// Period of the idle shimmer shown once a cycle limit is spent.
const IDLE_PERIOD_SECS: f64 = 4.0;

/// Rendered state of the breathing glow for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreathState {
    /// `None` during pauses and while idle.
    pub phase: Option<BreathPhase>,
    /// Normalised glow scale, 0..1.
    pub scale: f64,
    /// Glow brightness, 0..1.
    pub opacity: f64,
    /// Seconds in one full cycle of the pattern.
    pub cycle_secs: f64,
}

/// Compute the glow state `t` seconds into a pattern.
///
/// `t` may lie anywhere on the real line; it is folded into `[0, C)` first.
/// Non-finite input is treated as the start of the cycle.
pub fn compute_phase(pattern: BreathPattern, t: f64) -> BreathState {
    let cycle = pattern.cycle_secs();
    let steps = pattern.steps();
    let mut remaining = wrap(t, cycle);

    let last = steps.len() - 1;
    for (i, step) in steps.iter().enumerate() {
        // Rounding can leave a residue a hair past the final boundary.
        if remaining < step.secs || i == last {
            return evaluate(step, remaining.min(step.secs), cycle);
        }
        remaining -= step.secs;
    }
    unreachable!("pattern phase tables are never empty")
}

/// Resting shimmer shown after a bounded breath section runs out of cycles.
pub fn idle_state(t: f64, cycle_secs: f64) -> BreathState {
    let t = if t.is_finite() { t } else { 0.0 };
    let angle = (t / IDLE_PERIOD_SECS) * TAU;
    BreathState {
        phase: None,
        scale: unit(FLOOR + 0.02 * (1.0 - angle.cos())),
        opacity: unit(0.6 + 0.04 * angle.sin()),
        cycle_secs,
    }
}

fn evaluate(step: &PhaseStep, into: f64, cycle_secs: f64) -> BreathState {
    let (scale, opacity) = match step.motion {
        Motion::Ramp { from, to } => {
            let p = (into / step.secs).clamp(0.0, 1.0);
            (lerp(from, to, p), step.opacity)
        }
        Motion::Plateau { scale } => (scale, step.opacity),
        Motion::Pulse {
            scale,
            scale_swing,
            opacity_swing,
        } => {
            let wave = ((into / step.secs) * TAU).sin();
            (
                (scale + scale_swing * wave).max(FLOOR),
                step.opacity + opacity_swing * wave,
            )
        }
    };

    BreathState {
        phase: step.phase,
        scale: scale.clamp(0.0, PEAK),
        opacity: unit(opacity),
        cycle_secs,
    }
}

fn wrap(t: f64, cycle: f64) -> f64 {
    if !t.is_finite() {
        return 0.0;
    }
    let folded = ((t % cycle) + cycle) % cycle;
    if folded >= cycle {
        0.0
    } else {
        folded
    }
}

fn lerp(a: f64, b: f64, p: f64) -> f64 {
    a + (b - a) * p
}

fn unit(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}
