use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// The config file could not be read.
  #[error("failed to read config file: {path}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The config file is not valid JSON for the expected shape.
  #[error("failed to parse config file: {path}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  /// A URL field failed to parse.
  #[error("invalid URL in '{field}': {message}")]
  InvalidUrl { field: String, message: String },
}
