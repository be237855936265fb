//! Breathing pattern library.
//!
//! A pattern is an ordered list of [`PhaseStep`]s. Patterns differ only in
//! their step tables; the evaluation walk lives in [`super::state`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Smallest rendered scale. Never zero so the glow stays visible.
pub const FLOOR: f64 = 0.06;
/// Largest rendered scale.
pub const PEAK: f64 = 1.0;

const STEADY: f64 = 0.85;
const RESTING: f64 = 0.72;

/// Labelled sub-state of a breathing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreathPhase {
    Inhale,
    Hold,
    Exhale,
}

impl BreathPhase {
    pub fn label(&self) -> &'static str {
        match self {
            BreathPhase::Inhale => "Inhale",
            BreathPhase::Hold => "Hold",
            BreathPhase::Exhale => "Exhale",
        }
    }
}

/// How the visual scale moves while a step is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Linear interpolation from `from` to `to` over the step.
    Ramp { from: f64, to: f64 },
    /// Fixed scale.
    Plateau { scale: f64 },
    /// Sinusoidal pulse around `scale`; one full period per step.
    Pulse {
        scale: f64,
        scale_swing: f64,
        opacity_swing: f64,
    },
}

/// One entry of a pattern's phase schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseStep {
    /// `None` for the unlabelled pauses between phases.
    pub phase: Option<BreathPhase>,
    pub secs: f64,
    pub motion: Motion,
    /// Base opacity; pulses swing around it.
    pub opacity: f64,
}

const fn inhale(secs: f64, from: f64, to: f64, opacity: f64) -> PhaseStep {
    PhaseStep {
        phase: Some(BreathPhase::Inhale),
        secs,
        motion: Motion::Ramp { from, to },
        opacity,
    }
}

const fn exhale(secs: f64) -> PhaseStep {
    PhaseStep {
        phase: Some(BreathPhase::Exhale),
        secs,
        motion: Motion::Ramp { from: PEAK, to: FLOOR },
        opacity: STEADY,
    }
}

const fn hold(secs: f64, scale: f64) -> PhaseStep {
    PhaseStep {
        phase: Some(BreathPhase::Hold),
        secs,
        motion: Motion::Plateau { scale },
        opacity: STEADY,
    }
}

const fn pause(secs: f64, scale: f64, scale_swing: f64, opacity_swing: f64) -> PhaseStep {
    PhaseStep {
        phase: None,
        secs,
        motion: Motion::Pulse {
            scale,
            scale_swing,
            opacity_swing,
        },
        opacity: RESTING,
    }
}

const FOUR_FOUR_SIX_PAUSED: &[PhaseStep] = &[
    inhale(4.0, FLOOR, PEAK, STEADY),
    pause(0.75, PEAK, 0.0, 0.06),
    hold(4.0, PEAK),
    exhale(6.0),
    pause(0.75, FLOOR, 0.10, 0.036),
];

const FOUR_FOUR_SIX_CONTINUOUS: &[PhaseStep] = &[
    inhale(4.0, FLOOR, PEAK, STEADY),
    hold(4.0, PEAK),
    exhale(6.0),
];

const BOX_4_4_4_4: &[PhaseStep] = &[
    inhale(4.0, FLOOR, PEAK, STEADY),
    hold(4.0, PEAK),
    exhale(4.0),
    hold(4.0, FLOOR),
];

const FOUR_SEVEN_EIGHT_PAUSED_END: &[PhaseStep] = &[
    inhale(4.0, FLOOR, PEAK, STEADY),
    hold(7.0, PEAK),
    exhale(8.0),
    pause(0.75, FLOOR, 0.08, 0.04),
];

const RESONANT_5_5: &[PhaseStep] = &[inhale(5.5, FLOOR, PEAK, STEADY), exhale(5.5)];

// Double inhale: a deep draw to 80% then a short top-up, then a long exhale.
const PHYSIO_SIGH: &[PhaseStep] = &[
    inhale(2.5, FLOOR, PEAK * 0.8, STEADY),
    inhale(1.0, PEAK * 0.8, PEAK, 0.9),
    exhale(6.0),
];

/// Breathing patterns known to the engine.
///
/// Content files refer to patterns by the identifiers returned from
/// [`BreathPattern::id`]; anything else fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BreathPattern {
    /// 4-4-6 with short pauses after inhale and exhale.
    FourFourSixPaused,
    /// 4-4-6 without pauses.
    FourFourSixContinuous,
    /// 4-4-4-4 box breathing.
    Box4444,
    /// 4-7-8 with a pause after the exhale.
    FourSevenEightPausedEnd,
    /// 5.5 in, 5.5 out.
    Resonant55,
    /// Physiological sigh loop.
    PhysioSigh,
}

impl BreathPattern {
    pub const ALL: [BreathPattern; 6] = [
        BreathPattern::FourFourSixPaused,
        BreathPattern::FourFourSixContinuous,
        BreathPattern::Box4444,
        BreathPattern::FourSevenEightPausedEnd,
        BreathPattern::Resonant55,
        BreathPattern::PhysioSigh,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            BreathPattern::FourFourSixPaused => "fourFourSix_paused",
            BreathPattern::FourFourSixContinuous => "fourFourSix_continuous",
            BreathPattern::Box4444 => "box_4_4_4_4",
            BreathPattern::FourSevenEightPausedEnd => "fourSevenEight_pausedEnd",
            BreathPattern::Resonant55 => "resonant_5_5",
            BreathPattern::PhysioSigh => "physioSigh",
        }
    }

    pub fn steps(&self) -> &'static [PhaseStep] {
        match self {
            BreathPattern::FourFourSixPaused => FOUR_FOUR_SIX_PAUSED,
            BreathPattern::FourFourSixContinuous => FOUR_FOUR_SIX_CONTINUOUS,
            BreathPattern::Box4444 => BOX_4_4_4_4,
            BreathPattern::FourSevenEightPausedEnd => FOUR_SEVEN_EIGHT_PAUSED_END,
            BreathPattern::Resonant55 => RESONANT_5_5,
            BreathPattern::PhysioSigh => PHYSIO_SIGH,
        }
    }

    /// Length of one full cycle in seconds.
    pub fn cycle_secs(&self) -> f64 {
        self.steps().iter().map(|s| s.secs).sum()
    }
}

impl fmt::Display for BreathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for BreathPattern {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BreathPattern::ALL
            .iter()
            .copied()
            .find(|p| p.id() == s)
            .ok_or_else(|| ConfigError::UnknownPattern(s.to_string()))
    }
}

impl TryFrom<String> for BreathPattern {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BreathPattern> for String {
    fn from(pattern: BreathPattern) -> Self {
        pattern.id().to_string()
    }
}
