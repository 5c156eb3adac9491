//! i2o Config
//!
//! This crate contains the serializable application settings for i2o.
//! Settings are loaded from a JSON file in the data directory; secrets can
//! be supplied (or overridden) through environment variables.
//!
//! The binary loads an [`AppConfig`] at startup and hands the relevant
//! section to each client crate.

mod assist;
mod error;
mod inquiry;

pub use assist::AssistSettings;
pub use error::ConfigError;
pub use inquiry::InquirySettings;

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
  /// Generative-language client settings.
  pub assist: AssistSettings,

  /// Remote literature-inquiry settings.
  pub inquiry: InquirySettings,
}

impl AppConfig {
  /// Load configuration from a JSON file and validate it.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;

    let config: AppConfig =
      serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
      })?;

    config.validate()?;
    Ok(config)
  }

  /// Load configuration from `path` if the file exists, defaults otherwise.
  pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
    if path.exists() {
      Self::load(path)
    } else {
      Ok(Self::default())
    }
  }

  /// Validate cross-field constraints that serde cannot express.
  pub fn validate(&self) -> Result<(), ConfigError> {
    self.inquiry.validate()?;
    self.assist.validate()?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  #[test]
  fn load_round_trips_defaults() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("config.json");

    let json = serde_json::to_string_pretty(&AppConfig::default()).expect("serialize");
    let mut file = std::fs::File::create(&path).expect("create config file");
    file.write_all(json.as_bytes()).expect("write config file");

    let loaded = AppConfig::load(&path).expect("load config");
    assert_eq!(loaded.inquiry.poll_interval_ms, 2000);
    assert_eq!(loaded.inquiry.max_poll_attempts, Some(150));
  }

  #[test]
  fn load_rejects_unknown_fields() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"inquiry": {"polling": true}}"#).expect("write config file");

    let err = AppConfig::load(&path).expect_err("unknown field should be rejected");
    assert!(matches!(err, ConfigError::Parse { .. }));
  }

  #[test]
  fn load_or_default_without_file() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("missing.json");

    let config = AppConfig::load_or_default(&path).expect("defaults");
    assert_eq!(config.assist.model, AssistSettings::default().model);
  }

  #[test]
  fn load_rejects_invalid_inquiry_url() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"inquiry": {"base_url": "not a url"}}"#).expect("write config");

    let err = AppConfig::load(&path).expect_err("invalid URL should be rejected");
    assert!(matches!(err, ConfigError::InvalidUrl { .. }));
  }
}
