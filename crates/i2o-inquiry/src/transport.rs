use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use url::Url;

/// Errors at the HTTP transport level.
#[derive(Debug, Error)]
pub enum TransportError {
  /// Request failed to complete.
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The service replied with a non-success status.
  #[error("unexpected status {status}")]
  Status { status: u16 },
}

/// Transport seam for the inquiry service.
///
/// Both operations return the raw reply body; classification happens at
/// the client boundary, not here. Implementations must tolerate concurrent
/// requests for independent tasks.
#[async_trait]
pub trait InquiryTransport: Send + Sync + 'static {
  /// Submit a question; the reply body is expected to carry a task id.
  async fn submit(&self, question: &str) -> Result<serde_json::Value, TransportError>;

  /// Fetch the current result for a task.
  async fn fetch(&self, task_id: &str) -> Result<serde_json::Value, TransportError>;
}

/// HTTP implementation of [`InquiryTransport`].
///
/// Questions are POSTed to the base URL as `{"question": ...}`; results
/// are fetched from the same URL with a `task_id` query parameter.
#[derive(Debug, Clone)]
pub struct HttpTransport {
  client: Client,
  base_url: Url,
}

impl HttpTransport {
  pub fn new(base_url: Url) -> Self {
    Self {
      client: Client::new(),
      base_url,
    }
  }

  fn result_url(&self, task_id: &str) -> Url {
    let mut url = self.base_url.clone();
    url.query_pairs_mut().append_pair("task_id", task_id);
    url
  }
}

#[async_trait]
impl InquiryTransport for HttpTransport {
  async fn submit(&self, question: &str) -> Result<serde_json::Value, TransportError> {
    let response = self
      .client
      .post(self.base_url.clone())
      .json(&serde_json::json!({ "question": question }))
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      return Err(TransportError::Status {
        status: status.as_u16(),
      });
    }

    Ok(response.json().await?)
  }

  async fn fetch(&self, task_id: &str) -> Result<serde_json::Value, TransportError> {
    let response = self.client.get(self.result_url(task_id)).send().await?;

    let status = response.status();
    if !status.is_success() {
      return Err(TransportError::Status {
        status: status.as_u16(),
      });
    }

    Ok(response.json().await?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn result_url_carries_task_id() {
    let transport = HttpTransport::new(Url::parse("https://example.org/api/tasks").unwrap());
    let url = transport.result_url("t-42");
    assert_eq!(url.as_str(), "https://example.org/api/tasks?task_id=t-42");
  }
}
