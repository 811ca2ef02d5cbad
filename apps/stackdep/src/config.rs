//! # Configuration
//!
//! Optional TOML configuration for the CLI.
//!
//! ```toml
//! [reconciler]
//! ledger_policy = "deduplicate"   # or "accumulate"
//! restore_target = "active"       # or "captured"
//! skip = false
//!
//! [output]
//! json = false
//! ```
//!
//! When `--config` is not given, `stackdep.toml` in the working directory
//! is read if present; otherwise defaults apply. An explicitly named file
//! must exist.

use serde::{Deserialize, Serialize};
use stackdep_core::{ReconcilerOptions, StackDepError};
use std::path::Path;

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "stackdep.toml";

/// Output preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Print JSON instead of text (same as `--json-mode`).
    pub json: bool,
}

/// Top-level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub reconciler: ReconcilerOptions,
    pub output: OutputConfig,
}

impl AppConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self, StackDepError> {
        toml::from_str(raw).map_err(|e| StackDepError::ConfigError(e.to_string()))
    }

    /// Load configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] if
    /// it exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, StackDepError> {
        let (path, explicit) = match path {
            Some(p) => (p, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };

        if !explicit && !path.is_file() {
            tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|e| {
            StackDepError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(config = %path.display(), ?config, "configuration loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackdep_core::{LedgerPolicy, RestoreTarget};

    #[test]
    fn empty_config_uses_defaults() {
        let config = AppConfig::from_toml_str("").expect("parse");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn parses_all_sections() {
        let config = AppConfig::from_toml_str(
            r#"
            [reconciler]
            ledger_policy = "accumulate"
            restore_target = "captured"
            skip = true

            [output]
            json = true
            "#,
        )
        .expect("parse");

        assert_eq!(config.reconciler.ledger_policy, LedgerPolicy::Accumulate);
        assert_eq!(config.reconciler.restore_target, RestoreTarget::Captured);
        assert!(config.reconciler.skip);
        assert!(config.output.json);
    }

    #[test]
    fn rejects_unknown_keys() {
        let result = AppConfig::from_toml_str("[reconciler]\nledger = \"accumulate\"\n");
        assert!(matches!(result, Err(StackDepError::ConfigError(_))));
    }

    #[test]
    fn rejects_unknown_policy() {
        let result = AppConfig::from_toml_str("[reconciler]\nledger_policy = \"sometimes\"\n");
        assert!(matches!(result, Err(StackDepError::ConfigError(_))));
    }
}
