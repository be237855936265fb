//! Ritual catalog.
//!
//! The stock rituals ship embedded in the binary. A user catalog file with
//! the same layout may add rituals or replace stock ones by id.

use serde::Deserialize;
use std::path::Path;

use super::{Ritual, RitualDefinition};
use crate::error::ConfigError;

const STOCK_CATALOG: &str = include_str!("../../rituals/stock.toml");

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    rituals: Vec<RitualDefinition>,
}

/// Read-only set of validated rituals, in file order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    rituals: Vec<Ritual>,
}

impl Catalog {
    /// The built-in rituals.
    pub fn stock() -> Result<Self, ConfigError> {
        Self::from_toml_str(STOCK_CATALOG)
    }

    /// Parse and validate a catalog document. Fails on the first invalid
    /// ritual or repeated id.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = toml::from_str(content)?;
        let mut catalog = Self::default();
        for definition in file.rituals {
            if catalog.get(&definition.id).is_some() {
                return Err(ConfigError::DuplicateRitual(definition.id));
            }
            catalog.rituals.push(Ritual::new(definition)?);
        }
        Ok(catalog)
    }

    /// Stock rituals overlaid with the rituals in `extra`, if given.
    pub fn load(extra: Option<&Path>) -> Result<Self, ConfigError> {
        let mut catalog = Self::stock()?;
        if let Some(path) = extra {
            let content =
                std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
            let user = Self::from_toml_str(&content)?;
            catalog.merge(user);
        }
        Ok(catalog)
    }

    /// Add rituals from `other`, replacing any with the same id.
    pub fn merge(&mut self, other: Catalog) {
        for ritual in other.rituals {
            match self.rituals.iter_mut().find(|r| r.id() == ritual.id()) {
                Some(existing) => *existing = ritual,
                None => self.rituals.push(ritual),
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Ritual> {
        self.rituals.iter().find(|r| r.id() == id)
    }

    pub fn require(&self, id: &str) -> Result<&Ritual, ConfigError> {
        self.get(id)
            .ok_or_else(|| ConfigError::RitualNotFound(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ritual> {
        self.rituals.iter()
    }

    pub fn len(&self) -> usize {
        self.rituals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rituals.is_empty()
    }
}
