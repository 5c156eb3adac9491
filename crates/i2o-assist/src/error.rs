use thiserror::Error;

/// Errors produced by the assist client.
#[derive(Debug, Error)]
pub enum AssistError {
  /// No API key was configured.
  #[error("no API key configured; set I2O_API_KEY or add one to the config file")]
  MissingApiKey,

  /// Request failed to complete.
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The service replied with a non-success status.
  #[error("unexpected status {status}")]
  Status { status: u16 },

  /// The reply body did not have the expected shape.
  #[error("malformed reply: {message}")]
  MalformedReply { message: String },

  /// The service returned no usable text.
  #[error("the model returned an empty completion")]
  EmptyCompletion,

  /// Prompt template rendering failed.
  #[error("template error: {0}")]
  Template(#[from] minijinja::Error),
}
