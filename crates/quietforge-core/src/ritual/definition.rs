use serde::{Deserialize, Serialize};

use crate::breath::BreathPattern;
use crate::error::ConfigError;

/// Kind-specific payload of a ritual section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SectionKind {
    Breath {
        #[serde(rename = "breath_type")]
        pattern: BreathPattern,
        /// Cap on full breathing cycles; the glow idles once spent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cycles: Option<u32>,
    },
    Intention,
    Posture {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        prompts: Vec<String>,
    },
    Presence {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        prompts: Vec<String>,
    },
}

impl SectionKind {
    pub fn tag(&self) -> &'static str {
        match self {
            SectionKind::Breath { .. } => "breath",
            SectionKind::Intention => "intention",
            SectionKind::Posture { .. } => "posture",
            SectionKind::Presence { .. } => "presence",
        }
    }
}

/// One timed segment of a ritual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub label: String,
    /// Duration in whole seconds.
    pub seconds: u32,
    #[serde(flatten)]
    pub kind: SectionKind,
}

impl Section {
    pub fn breath(label: impl Into<String>, seconds: u32, pattern: BreathPattern) -> Self {
        Self {
            label: label.into(),
            seconds,
            kind: SectionKind::Breath {
                pattern,
                cycles: None,
            },
        }
    }

    pub fn intention(label: impl Into<String>, seconds: u32) -> Self {
        Self {
            label: label.into(),
            seconds,
            kind: SectionKind::Intention,
        }
    }

    pub fn posture(label: impl Into<String>, seconds: u32) -> Self {
        Self {
            label: label.into(),
            seconds,
            kind: SectionKind::Posture {
                prompts: Vec::new(),
            },
        }
    }

    pub fn presence(label: impl Into<String>, seconds: u32) -> Self {
        Self {
            label: label.into(),
            seconds,
            kind: SectionKind::Presence {
                prompts: Vec::new(),
            },
        }
    }

    /// Limit a breath section to `cycles` full repetitions. No effect on
    /// other kinds.
    pub fn with_cycles(mut self, limit: u32) -> Self {
        if let SectionKind::Breath { ref mut cycles, .. } = self.kind {
            *cycles = Some(limit);
        }
        self
    }

    pub fn with_prompts(mut self, lines: Vec<String>) -> Self {
        match self.kind {
            SectionKind::Posture { ref mut prompts } | SectionKind::Presence { ref mut prompts } => {
                *prompts = lines;
            }
            _ => {}
        }
        self
    }

    pub fn duration_secs(&self) -> u64 {
        u64::from(self.seconds)
    }

    pub fn pattern(&self) -> Option<BreathPattern> {
        match self.kind {
            SectionKind::Breath { pattern, .. } => Some(pattern),
            _ => None,
        }
    }

    /// Seconds after which a bounded breath section stops animating.
    pub fn cycle_budget_secs(&self) -> Option<f64> {
        match self.kind {
            SectionKind::Breath {
                pattern,
                cycles: Some(n),
            } => Some(f64::from(n) * pattern.cycle_secs()),
            _ => None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// A ritual exactly as written in content files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RitualDefinition {
    pub id: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub guided: bool,
    #[serde(default)]
    pub description: String,
    /// Optional declared total. Checked against the section sum, never
    /// trusted on its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_seconds: Option<u64>,
    pub sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal_prompt: Option<String>,
}

impl RitualDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, sections: Vec<Section>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            guided: true,
            description: String::new(),
            total_seconds: None,
            sections,
            journal_prompt: None,
        }
    }

    pub fn derived_total_secs(&self) -> u64 {
        self.sections.iter().map(Section::duration_secs).sum()
    }

    /// Check every load-time invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sections.is_empty() {
            return Err(ConfigError::EmptyRitual {
                ritual: self.id.clone(),
            });
        }

        for (index, section) in self.sections.iter().enumerate() {
            if section.seconds == 0 {
                return Err(ConfigError::NonPositiveDuration {
                    ritual: self.id.clone(),
                    index,
                    label: section.label.clone(),
                });
            }
            if let SectionKind::Breath { cycles: Some(0), .. } = section.kind {
                return Err(ConfigError::ZeroCycleLimit {
                    ritual: self.id.clone(),
                    index,
                });
            }
        }

        let derived = self.derived_total_secs();
        if let Some(declared) = self.total_seconds {
            if declared != derived {
                return Err(ConfigError::TotalMismatch {
                    ritual: self.id.clone(),
                    declared,
                    derived,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RitualDefinition {
        RitualDefinition::new(
            "sample",
            "Sample",
            vec![
                Section::intention("Intention", 60),
                Section::breath("Breathing", 120, BreathPattern::FourFourSixPaused),
                Section::presence("Settle", 60),
            ],
        )
    }

    #[test]
    fn total_is_sum_of_sections() {
        assert_eq!(sample().derived_total_secs(), 240);
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn empty_ritual_is_rejected() {
        let def = RitualDefinition::new("empty", "Empty", vec![]);
        assert!(matches!(def.validate(), Err(ConfigError::EmptyRitual { .. })));
    }

    #[test]
    fn zero_length_section_is_rejected() {
        let mut def = sample();
        def.sections[1].seconds = 0;
        match def.validate() {
            Err(ConfigError::NonPositiveDuration { index, label, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(label, "Breathing");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn zero_cycle_limit_is_rejected() {
        let mut def = sample();
        def.sections[1] = def.sections[1].clone().with_cycles(0);
        assert!(matches!(def.validate(), Err(ConfigError::ZeroCycleLimit { index: 1, .. })));
    }

    #[test]
    fn drifting_declared_total_is_rejected() {
        let mut def = sample();
        def.total_seconds = Some(300);
        assert!(matches!(
            def.validate(),
            Err(ConfigError::TotalMismatch { declared: 300, derived: 240, .. })
        ));
        def.total_seconds = Some(240);
        assert!(def.validate().is_ok());
    }

    #[test]
    fn cycle_budget_only_for_bounded_breath() {
        let bounded = Section::breath("Sigh", 60, BreathPattern::PhysioSigh).with_cycles(3);
        assert_eq!(bounded.cycle_budget_secs(), Some(28.5));
        let open = Section::breath("Sigh", 60, BreathPattern::PhysioSigh);
        assert_eq!(open.cycle_budget_secs(), None);
        assert_eq!(Section::intention("I", 10).with_cycles(3).cycle_budget_secs(), None);
    }

    #[test]
    fn sections_parse_from_tagged_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            sections: Vec<Section>,
        }
        let parsed: Wrapper = toml::from_str(
            r#"
            [[sections]]
            kind = "breath"
            label = "Grounding"
            seconds = 60
            breath_type = "physioSigh"
            cycles = 3

            [[sections]]
            kind = "posture"
            label = "Posture"
            seconds = 30
            prompts = ["Spine long."]
            "#,
        )
        .unwrap();
        assert_eq!(parsed.sections[0].pattern(), Some(BreathPattern::PhysioSigh));
        assert_eq!(parsed.sections[0].cycle_budget_secs(), Some(28.5));
        assert_eq!(parsed.sections[1].kind.tag(), "posture");
    }

    #[test]
    fn unknown_pattern_fails_to_parse() {
        let result = toml::from_str::<Section>(
            r#"
            kind = "breath"
            label = "Breathing"
            seconds = 60
            breath_type = "fourEight_continuous"
            "#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("fourEight_continuous"), "{err}");
    }
}
