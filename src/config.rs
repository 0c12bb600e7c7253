//! Runtime configuration
//!
//! Loaded from `~/.config/mozo-notify/config.json` when present. A missing
//! file is not an error; defaults keep the classifier's built-in allow-set.
//! The allow-set lives in config rather than code so new call types
//! introduced upstream do not require a release to classify.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::notification::classifier::DEFAULT_ALLOW_TYPES;

/// Runtime configuration for the classifier and the file surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Call types the classifier accepts on their own (case-insensitive).
    #[serde(default = "default_allow_types")]
    pub allow_types: Vec<String>,
    /// Override for the file surface's data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            allow_types: default_allow_types(),
            data_dir: None,
        }
    }
}

fn default_allow_types() -> Vec<String> {
    DEFAULT_ALLOW_TYPES.iter().map(|t| t.to_string()).collect()
}

impl NotifyConfig {
    /// Default config file location.
    pub fn path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("mozo-notify")
            .join("config.json")
    }

    /// Load from the default location; defaults when the file is absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path())
    }

    /// Load from an explicit path; defaults when the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Data directory for the file surface.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
                .join("mozo-notify")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = NotifyConfig::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, NotifyConfig::default());
        assert_eq!(
            config.allow_types,
            vec!["waiter_call", "new_call", "unified"]
        );
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"data_dir": "/var/lib/mozo"}"#).unwrap();

        let config = NotifyConfig::load_from(&path).unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/mozo")));
        assert_eq!(config.allow_types, NotifyConfig::default().allow_types);
        assert_eq!(config.data_dir(), PathBuf::from("/var/lib/mozo"));
    }

    #[test]
    fn test_allow_types_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"allow_types": ["bill_request"]}"#).unwrap();

        let config = NotifyConfig::load_from(&path).unwrap();
        assert_eq!(config.allow_types, vec!["bill_request"]);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{").unwrap();
        assert!(NotifyConfig::load_from(&path).is_err());
    }
}
