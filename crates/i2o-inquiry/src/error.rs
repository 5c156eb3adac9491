use thiserror::Error;

use crate::transport::TransportError;

/// Errors produced by the inquiry client.
///
/// `EmptyQuestion`, `Submission`, and `MalformedSubmitReply` are returned
/// synchronously from [`crate::InquiryClient::submit`]; the rest surface as
/// the terminal [`crate::InquiryOutcome::Failed`] of a task.
#[derive(Debug, Error)]
pub enum InquiryError {
  /// The question was empty after trimming; nothing was sent.
  #[error("question is empty")]
  EmptyQuestion,

  /// The submission call failed; no task was created.
  #[error("submission failed")]
  Submission {
    #[source]
    source: TransportError,
  },

  /// The submission reply carried no task id.
  #[error("submission reply missing task id: {body}")]
  MalformedSubmitReply { body: String },

  /// A result fetch failed at the transport level. Terminal for the task.
  #[error("result fetch failed for task {task_id}")]
  PollTransport {
    task_id: String,
    #[source]
    source: TransportError,
  },

  /// A result fetch returned a body matching neither a pending marker nor
  /// a completed answer. Terminal for the task.
  #[error("unrecognized reply for task {task_id}: {detail}")]
  UnrecognizedReply { task_id: String, detail: String },

  /// The configured fetch cap was exhausted without a terminal reply.
  #[error("task {task_id} still pending after {attempts} fetches")]
  TimeoutExceeded { task_id: String, attempts: u32 },
}
