//! Configuration module for telebind-rs
//!
//! Holds the identifier wire format and codec tuning that must agree with the
//! monitoring channel:
//! - Segment separator and null-observable marker
//! - Phase lookup order for runtime counterparts
//! - Extra observable aliases and classifier prefixes
//!
//! # Config Location
//!
//! `load_or_default()` reads from the platform config directory:
//! - **Linux**: `~/.config/dev.telebind/telemetry.toml`
//! - **macOS**: `~/Library/Application Support/dev.telebind/telemetry.toml`
//! - **Windows**: `%APPDATA%\dev.telebind\telemetry.toml`
//!
//! # Example
//!
//! ```toml
//! separator = ":"
//! null_marker = "null"
//! phase_order = ["adaptation", "monitoring"]
//! algorithm_prefix = "Algorithm"
//!
//! [observable_aliases]
//! QUEUE_LENGTH = "queueLength"
//!
//! [classifiers]
//! Broker = "Machine"
//! ```

use crate::codec::{ALGORITHM_PREFIX, DEFAULT_NULL_MARKER, DEFAULT_SEPARATOR};
use crate::error::{Result, TelemetryError};
use crate::topology::Phase;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "dev.telebind";

/// Config filename
pub const CONFIG_FILE: &str = "telemetry.toml";

/// Get the path of the default config file
pub fn default_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID).join(CONFIG_FILE))
}

/// Identifier format and codec configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Segment separator shared with the monitoring channel
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Observable segment meaning "no observable"
    #[serde(default = "default_null_marker")]
    pub null_marker: String,

    /// Phases consulted, in order, for runtime counterparts
    #[serde(default = "Phase::default_order")]
    pub phase_order: Vec<Phase>,

    /// Category prefix of algorithm identifiers
    #[serde(default = "default_algorithm_prefix")]
    pub algorithm_prefix: String,

    /// Channel token → slot name, on top of the built-in table
    #[serde(default)]
    pub observable_aliases: BTreeMap<String, String>,

    /// Declared type → category prefix, on top of the built-in classifiers
    #[serde(default)]
    pub classifiers: BTreeMap<String, String>,
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

fn default_null_marker() -> String {
    DEFAULT_NULL_MARKER.to_string()
}

fn default_algorithm_prefix() -> String {
    ALGORITHM_PREFIX.to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            null_marker: default_null_marker(),
            phase_order: Phase::default_order(),
            algorithm_prefix: default_algorithm_prefix(),
            observable_aliases: BTreeMap::new(),
            classifiers: BTreeMap::new(),
        }
    }
}

impl TelemetryConfig {
    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TelemetryError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            TelemetryError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the default location, returning defaults on any error
    pub fn load_or_default() -> Self {
        let Some(path) = default_config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load telemetry config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save the config to disk as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TelemetryError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| {
            TelemetryError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }

    /// Check the settings the codec relies on
    pub fn validate(&self) -> Result<()> {
        if self.separator.is_empty() {
            return Err(TelemetryError::Config("separator must not be empty".into()));
        }
        if self.null_marker.contains(&self.separator) {
            return Err(TelemetryError::Config(format!(
                "null marker '{}' contains the separator '{}'",
                self.null_marker, self.separator
            )));
        }
        if self.phase_order.is_empty() {
            return Err(TelemetryError::Config("phase_order must not be empty".into()));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.phase_order.iter().find(|p| !seen.insert(**p)) {
            return Err(TelemetryError::Config(format!(
                "phase '{}' listed twice in phase_order",
                dup
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.separator, ":");
        assert_eq!(config.null_marker, "null");
        assert_eq!(config.phase_order, vec![Phase::Adaptation, Phase::Monitoring]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: TelemetryConfig = toml::from_str(
            r#"
            phase_order = ["monitoring"]

            [observable_aliases]
            QUEUE_LENGTH = "queueLength"
            "#,
        )
        .unwrap();
        assert_eq!(config.separator, ":");
        assert_eq!(config.phase_order, vec![Phase::Monitoring]);
        assert_eq!(config.observable_aliases["QUEUE_LENGTH"], "queueLength");
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let mut config = TelemetryConfig::default();
        config.separator.clear();
        assert!(config.validate().is_err());

        let mut config = TelemetryConfig::default();
        config.phase_order = vec![Phase::Monitoring, Phase::Monitoring];
        assert!(config.validate().is_err());

        let mut config = TelemetryConfig::default();
        config.phase_order.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = TelemetryConfig::default();
        config.classifiers.insert("Broker".into(), "Machine".into());
        config.save(&path).unwrap();

        let loaded = TelemetryConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "separator = \"\"\n").unwrap();
        assert!(matches!(
            TelemetryConfig::load(&path),
            Err(TelemetryError::Config(_))
        ));
    }
}
