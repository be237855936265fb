//! Ritual content: definitions, validation, the stock catalog and the
//! section resolver.

mod catalog;
mod definition;
mod resolver;

pub use catalog::Catalog;
pub use definition::{RitualDefinition, Section, SectionKind};
pub use resolver::SectionPosition;

use serde::{Serialize, Serializer};

use crate::error::ConfigError;

/// A validated ritual, ready to drive a session.
///
/// Only constructible through [`Ritual::new`], so every `Ritual` has at
/// least one section, positive durations and a derived total.
#[derive(Debug, Clone, PartialEq)]
pub struct Ritual {
    definition: RitualDefinition,
    /// Start offset of each section in seconds (prefix sums).
    starts: Vec<u64>,
    total_secs: u64,
}

impl Ritual {
    pub fn new(mut definition: RitualDefinition) -> Result<Self, ConfigError> {
        definition.validate()?;

        let mut starts = Vec::with_capacity(definition.sections.len());
        let mut acc = 0u64;
        for section in &definition.sections {
            starts.push(acc);
            acc += section.duration_secs();
        }
        definition.total_seconds = Some(acc);

        Ok(Self {
            definition,
            starts,
            total_secs: acc,
        })
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn sections(&self) -> &[Section] {
        &self.definition.sections
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn journal_prompt(&self) -> Option<&str> {
        self.definition.journal_prompt.as_deref()
    }

    pub fn definition(&self) -> &RitualDefinition {
        &self.definition
    }
}

impl Serialize for Ritual {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.definition.serialize(serializer)
    }
}
