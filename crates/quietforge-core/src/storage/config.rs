//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Sound cue toggles
//! - Frame cadence and time scale for the terminal host
//! - Journal propagation to the suite bus
//! - An optional user ritual catalog
//!
//! Configuration is stored at `<data dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result};

/// Sound cue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Woodblock between sections.
    #[serde(default = "default_true")]
    pub transition_cue: bool,
    /// Gong at the end of a ritual.
    #[serde(default = "default_true")]
    pub completion_cue: bool,
}

/// Host loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    /// Multiplier applied to wall time; 1.0 runs in real time.
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,
}

/// Journal configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalConfig {
    #[serde(default = "default_true")]
    pub propagate_to_suite: bool,
}

/// Suite bus configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Rituals whose reflection notes become the current intention.
    #[serde(default = "default_intention_rituals")]
    pub intention_rituals: Vec<String>,
    /// Override for the bus file location.
    #[serde(default)]
    pub bus_path: Option<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub journal: JournalConfig,
    #[serde(default)]
    pub suite: SuiteConfig,
    /// Extra ritual catalog merged over the stock rituals.
    #[serde(default)]
    pub rituals_path: Option<String>,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_frame_interval_ms() -> u64 {
    16
}
fn default_time_scale() -> f64 {
    1.0
}
fn default_intention_rituals() -> Vec<String> {
    vec!["morning_alignment".into()]
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            transition_cue: true,
            completion_cue: true,
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            time_scale: default_time_scale(),
        }
    }
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            propagate_to_suite: true,
        }
    }
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            intention_rituals: default_intention_rituals(),
            bus_path: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            audio: AudioConfig::default(),
            timer: TimerConfig::default(),
            journal: JournalConfig::default(),
            suite: SuiteConfig::default(),
            rituals_path: None,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> std::result::Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(invalid("config key is empty".into()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| invalid("unknown config key".into()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| invalid("unknown config key".into()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    // Optional strings are stored as null until first set.
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| invalid("unknown config key".into()))?;
        }

        Err(invalid("unknown config key".into()))
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults there if it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.check()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// into the key's type.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.check()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    /// Range checks that serde cannot express.
    fn check(&self) -> std::result::Result<(), ConfigError> {
        if self.timer.frame_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.frame_interval_ms".into(),
                message: "must be at least 1".into(),
            });
        }
        if !(self.timer.time_scale.is_finite() && self.timer.time_scale > 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "timer.time_scale".into(),
                message: "must be a positive number".into(),
            });
        }
        Ok(())
    }

    /// User catalog path, if configured.
    pub fn rituals_path(&self) -> Option<PathBuf> {
        self.rituals_path.as_ref().map(PathBuf::from)
    }

    /// Suite bus file: the configured override or `suite.json` in the data
    /// directory.
    pub fn suite_bus_path(&self) -> Result<PathBuf> {
        match &self.suite.bus_path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Ok(data_dir()?.join("suite.json")),
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert!(parsed.audio.enabled);
        assert_eq!(parsed.timer.frame_interval_ms, 16);
        assert_eq!(parsed.suite.intention_rituals, vec!["morning_alignment"]);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[audio]\nenabled = false\n").unwrap();
        assert!(!parsed.audio.enabled);
        assert!(parsed.audio.transition_cue);
        assert_eq!(parsed.timer.time_scale, 1.0);
        assert!(parsed.journal.propagate_to_suite);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("audio.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("timer.frame_interval_ms").as_deref(), Some("16"));
        assert!(cfg.get("audio.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.apply("audio.completion_cue", "false").unwrap();
        cfg.apply("timer.time_scale", "2.5").unwrap();
        cfg.apply("suite.intention_rituals", r#"["midday_reset"]"#).unwrap();
        assert!(!cfg.audio.completion_cue);
        assert_eq!(cfg.timer.time_scale, 2.5);
        assert_eq!(cfg.suite.intention_rituals, vec!["midday_reset"]);
    }

    #[test]
    fn apply_sets_optional_string() {
        let mut cfg = Config::default();
        cfg.apply("rituals_path", "/tmp/rituals.toml").unwrap();
        assert_eq!(cfg.rituals_path(), Some(PathBuf::from("/tmp/rituals.toml")));
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(cfg.apply("audio.volume", "3").is_err());
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.apply("audio.enabled", "loud").is_err());
        assert!(cfg.audio.enabled);
    }

    #[test]
    fn apply_rejects_out_of_range() {
        let mut cfg = Config::default();
        assert!(cfg.apply("timer.frame_interval_ms", "0").is_err());
        assert!(cfg.apply("timer.time_scale", "-1").is_err());
        assert_eq!(cfg.timer.frame_interval_ms, 16);
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(cfg.audio.enabled);
        assert!(path.exists());
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "audio = 3").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
