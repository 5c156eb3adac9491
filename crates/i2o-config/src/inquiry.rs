use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

/// Default polling interval between result fetches, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Default cap on result fetches before a task is failed as timed out.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 150;

/// Settings for the remote literature-inquiry service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InquirySettings {
  /// Base URL of the inquiry endpoint. Questions are POSTed here and
  /// answers are fetched from the same URL with a `task_id` query
  /// parameter.
  pub base_url: String,

  /// Interval between result fetches, in milliseconds. Constant for the
  /// lifetime of a task.
  pub poll_interval_ms: u64,

  /// Maximum number of result fetches before the task is failed as timed
  /// out. `None` polls until the service answers or the caller cancels.
  pub max_poll_attempts: Option<u32>,
}

impl Default for InquirySettings {
  fn default() -> Self {
    Self {
      base_url: "https://platform.futurehouse.org/api/tasks".to_string(),
      poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
      max_poll_attempts: Some(DEFAULT_MAX_POLL_ATTEMPTS),
    }
  }
}

impl InquirySettings {
  /// Parse and return the configured endpoint URL.
  pub fn endpoint(&self) -> Result<Url, ConfigError> {
    Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidUrl {
      field: "inquiry.base_url".to_string(),
      message: e.to_string(),
    })
  }

  pub(crate) fn validate(&self) -> Result<(), ConfigError> {
    self.endpoint()?;
    Ok(())
  }
}
