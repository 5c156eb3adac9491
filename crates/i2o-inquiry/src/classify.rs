//! Boundary classification of service replies.
//!
//! Reply bodies are classified exactly once, here, into a tagged result;
//! the poll loop never re-inspects individual fields.

use serde_json::Value;

/// Status strings the service uses for work that is not finished yet.
const PENDING_MARKERS: [&str; 4] = ["pending", "queued", "running", "in_progress"];

/// Three-way classification of a result-fetch reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PollClassification {
  /// Recognized not-ready-yet marker; poll again.
  Pending,
  /// Completed with a non-empty answer.
  Answered(String),
  /// Neither pending nor completed; terminal failure.
  Unrecognized(String),
}

/// Extract the task id from a submission reply, if present and non-empty.
pub(crate) fn parse_submit_reply(body: &Value) -> Option<String> {
  body
    .get("task_id")
    .and_then(Value::as_str)
    .map(str::trim)
    .filter(|id| !id.is_empty())
    .map(str::to_string)
}

/// Classify a result-fetch reply body.
///
/// `status == "completed"` with a non-empty `answer` is a success; a
/// recognized pending marker (or a body with neither status nor answer)
/// schedules another fetch; everything else is terminal.
pub(crate) fn classify_poll_reply(body: &Value) -> PollClassification {
  if !body.is_object() {
    return PollClassification::Unrecognized(format!("non-object reply: {body}"));
  }

  let answer = body
    .get("answer")
    .and_then(Value::as_str)
    .map(str::trim)
    .filter(|a| !a.is_empty());

  match body.get("status").and_then(Value::as_str) {
    Some("completed") => match answer {
      Some(answer) => PollClassification::Answered(answer.to_string()),
      None => PollClassification::Unrecognized("completed without an answer".to_string()),
    },
    Some(status) if PENDING_MARKERS.contains(&status) => PollClassification::Pending,
    Some(status) => PollClassification::Unrecognized(format!("unexpected status '{status}'")),
    // No status field: an absent or empty answer is the service's
    // not-ready-yet shape.
    None => match answer {
      Some(answer) => PollClassification::Answered(answer.to_string()),
      None => PollClassification::Pending,
    },
  }
}
