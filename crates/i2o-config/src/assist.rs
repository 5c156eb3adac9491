use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

/// Environment variable consulted for the API key before the config file.
pub const API_KEY_ENV: &str = "I2O_API_KEY";

/// Settings for the generative-language service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssistSettings {
  /// Model identifier passed to the service.
  pub model: String,

  /// Base URL of the generative-language API.
  pub base_url: String,

  /// API key. The `I2O_API_KEY` environment variable takes precedence, so
  /// the key can stay out of the config file.
  pub api_key: Option<String>,
}

impl Default for AssistSettings {
  fn default() -> Self {
    Self {
      model: "gemini-2.5-flash-preview-04-17".to_string(),
      base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
      api_key: None,
    }
  }
}

impl AssistSettings {
  /// Resolve the API key, preferring the environment over the file.
  pub fn resolve_api_key(&self) -> Option<String> {
    std::env::var(API_KEY_ENV)
      .ok()
      .filter(|key| !key.is_empty())
      .or_else(|| self.api_key.clone())
  }

  pub(crate) fn validate(&self) -> Result<(), ConfigError> {
    Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidUrl {
      field: "assist.base_url".to_string(),
      message: e.to_string(),
    })?;
    Ok(())
  }
}
