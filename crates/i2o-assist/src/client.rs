use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::error::AssistError;
use crate::types::{Completion, SourceLink};

/// Client for the generative-language API.
#[derive(Debug)]
pub struct AssistClient {
  http: Client,
  base_url: String,
  model: String,
  api_key: String,
}

impl AssistClient {
  /// Create a client. Fails immediately when no API key is available, so
  /// misconfiguration surfaces before the first drafting call.
  pub fn new(
    base_url: impl Into<String>,
    model: impl Into<String>,
    api_key: Option<String>,
  ) -> Result<Self, AssistError> {
    let api_key = api_key
      .filter(|key| !key.is_empty())
      .ok_or(AssistError::MissingApiKey)?;
    Ok(Self {
      http: Client::new(),
      base_url: base_url.into(),
      model: model.into(),
      api_key,
    })
  }

  /// Generate plain text.
  #[instrument(name = "assist_generate_text", skip_all)]
  pub async fn generate_text(
    &self,
    prompt: &str,
    system: Option<&str>,
  ) -> Result<Completion, AssistError> {
    let body = self.request_body(prompt, system, false, false);
    let reply = self.call(&body).await?;
    extract_completion(&reply)
  }

  /// Generate JSON. Markdown code fences around the payload are stripped
  /// before parsing; anything that still fails to parse is an error.
  #[instrument(name = "assist_generate_json", skip_all)]
  pub async fn generate_json(
    &self,
    prompt: &str,
    system: Option<&str>,
  ) -> Result<Value, AssistError> {
    let body = self.request_body(prompt, system, true, false);
    let reply = self.call(&body).await?;
    let completion = extract_completion(&reply)?;

    let stripped = strip_code_fences(&completion.text);
    serde_json::from_str(stripped).map_err(|e| AssistError::MalformedReply {
      message: format!("completion is not valid JSON: {e}"),
    })
  }

  /// Generate text grounded in web search, reporting source links.
  #[instrument(name = "assist_generate_grounded", skip_all)]
  pub async fn generate_grounded(
    &self,
    prompt: &str,
    system: Option<&str>,
  ) -> Result<Completion, AssistError> {
    let body = self.request_body(prompt, system, false, true);
    let reply = self.call(&body).await?;
    extract_completion(&reply)
  }

  fn request_body(&self, prompt: &str, system: Option<&str>, as_json: bool, grounded: bool) -> Value {
    let mut body = json!({
      "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
    });

    if let Some(system) = system {
      body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
    }
    if as_json {
      body["generationConfig"] = json!({ "responseMimeType": "application/json" });
    }
    if grounded {
      body["tools"] = json!([{ "googleSearch": {} }]);
    }

    body
  }

  async fn call(&self, body: &Value) -> Result<Value, AssistError> {
    let url = format!(
      "{}/models/{}:generateContent",
      self.base_url.trim_end_matches('/'),
      self.model
    );

    let response = self
      .http
      .post(&url)
      .query(&[("key", self.api_key.as_str())])
      .json(body)
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      return Err(AssistError::Status {
        status: status.as_u16(),
      });
    }

    let reply: Value = response.json().await?;
    debug!(model = %self.model, "assist_reply_received");
    Ok(reply)
  }
}

/// Pull the generated text and any grounding sources out of a reply.
fn extract_completion(reply: &Value) -> Result<Completion, AssistError> {
  let candidate = reply
    .get("candidates")
    .and_then(Value::as_array)
    .and_then(|candidates| candidates.first())
    .ok_or_else(|| AssistError::MalformedReply {
      message: "reply has no candidates".to_string(),
    })?;

  let text: String = candidate
    .pointer("/content/parts")
    .and_then(Value::as_array)
    .map(|parts| {
      parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("")
    })
    .unwrap_or_default();

  if text.trim().is_empty() {
    return Err(AssistError::EmptyCompletion);
  }

  let sources = candidate
    .pointer("/groundingMetadata/groundingChunks")
    .and_then(Value::as_array)
    .map(|chunks| {
      chunks
        .iter()
        .filter_map(|chunk| {
          let web = chunk.get("web").or_else(|| chunk.get("retrievedContext"))?;
          Some(SourceLink {
            uri: web.get("uri")?.as_str()?.to_string(),
            title: web
              .get("title")
              .and_then(Value::as_str)
              .unwrap_or_default()
              .to_string(),
          })
        })
        .collect()
    })
    .unwrap_or_default();

  Ok(Completion { text, sources })
}

/// Strip a Markdown code fence (with optional language tag) wrapping the
/// payload. Models frequently fence JSON output even when asked not to.
fn strip_code_fences(text: &str) -> &str {
  let trimmed = text.trim();
  let Some(rest) = trimmed.strip_prefix("```") else {
    return trimmed;
  };
  let Some(body) = rest.strip_suffix("```") else {
    return trimmed;
  };
  // Drop the language tag on the opening fence line, if any.
  match body.split_once('\n') {
    Some((first_line, remainder)) if !first_line.trim().contains(' ') => remainder.trim(),
    _ => body.trim(),
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn missing_api_key_is_rejected_at_construction() {
    let err = AssistClient::new("https://example.org", "model-1", None).unwrap_err();
    assert!(matches!(err, AssistError::MissingApiKey));

    let err =
      AssistClient::new("https://example.org", "model-1", Some(String::new())).unwrap_err();
    assert!(matches!(err, AssistError::MissingApiKey));
  }

  #[test]
  fn extract_completion_joins_parts() {
    let reply = json!({
      "candidates": [{
        "content": { "parts": [{ "text": "Hello, " }, { "text": "world" }] }
      }]
    });
    let completion = extract_completion(&reply).unwrap();
    assert_eq!(completion.text, "Hello, world");
    assert!(completion.sources.is_empty());
  }

  #[test]
  fn extract_completion_collects_grounding_sources() {
    let reply = json!({
      "candidates": [{
        "content": { "parts": [{ "text": "grounded answer" }] },
        "groundingMetadata": {
          "groundingChunks": [
            { "web": { "uri": "https://pubmed.example/1", "title": "Trial A" } },
            { "retrievedContext": { "uri": "https://kb.example/2", "title": "Guideline B" } }
          ]
        }
      }]
    });
    let completion = extract_completion(&reply).unwrap();
    assert_eq!(completion.sources.len(), 2);
    assert_eq!(completion.sources[0].uri, "https://pubmed.example/1");
    assert_eq!(completion.sources[1].title, "Guideline B");
  }

  #[test]
  fn empty_completion_is_an_error() {
    let reply = json!({
      "candidates": [{ "content": { "parts": [{ "text": "   " }] } }]
    });
    assert!(matches!(
      extract_completion(&reply),
      Err(AssistError::EmptyCompletion)
    ));
  }

  #[test]
  fn reply_without_candidates_is_malformed() {
    assert!(matches!(
      extract_completion(&json!({})),
      Err(AssistError::MalformedReply { .. })
    ));
  }

  #[test]
  fn strip_code_fences_handles_language_tags() {
    assert_eq!(
      strip_code_fences("```json\n{\"a\": 1}\n```"),
      "{\"a\": 1}"
    );
    assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
    assert_eq!(strip_code_fences("{\"plain\": true}"), "{\"plain\": true}");
    assert_eq!(strip_code_fences("  {\"padded\": true}  "), "{\"padded\": true}");
  }
}
