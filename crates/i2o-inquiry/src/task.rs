use serde::{Deserialize, Serialize};

use crate::error::InquiryError;

/// Lifecycle state of an inquiry task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
  Unsubmitted,
  Pending,
  Succeeded,
  Failed,
  Cancelled,
}

impl TaskStatus {
  /// Whether no further transitions can follow this state.
  pub fn is_terminal(self) -> bool {
    matches!(
      self,
      TaskStatus::Succeeded | TaskStatus::Failed | TaskStatus::Cancelled
    )
  }
}

/// Terminal outcome of an inquiry, delivered exactly once per task.
#[derive(Debug)]
pub enum InquiryOutcome {
  /// The service answered the question.
  Answered(String),
  /// The task failed; the error describes why.
  Failed(InquiryError),
  /// The caller withdrew interest before a terminal reply arrived.
  Cancelled,
}

/// One outstanding unit of remote asynchronous work.
///
/// The record is owned exclusively by the poll loop tracking it; callers
/// see it only as the delivered [`InquiryOutcome`]. Transitions are
/// guarded: once a terminal state is reached, further transitions are
/// rejected, so an outcome can never be applied twice.
#[derive(Debug)]
pub(crate) struct InquiryTask {
  id: Option<String>,
  status: TaskStatus,
  answer: Option<String>,
  failure: Option<InquiryError>,
}

impl InquiryTask {
  pub(crate) fn new() -> Self {
    Self {
      id: None,
      status: TaskStatus::Unsubmitted,
      answer: None,
      failure: None,
    }
  }

  /// Record the id assigned by the service. Only legal once, on the
  /// `Unsubmitted -> Pending` transition.
  pub(crate) fn mark_submitted(&mut self, id: impl Into<String>) -> bool {
    if self.status != TaskStatus::Unsubmitted {
      return false;
    }
    self.id = Some(id.into());
    self.status = TaskStatus::Pending;
    true
  }

  /// Apply a successful answer. Returns false if the task is already
  /// terminal; the answer is then discarded.
  pub(crate) fn complete(&mut self, answer: impl Into<String>) -> bool {
    if self.status.is_terminal() {
      return false;
    }
    self.answer = Some(answer.into());
    self.status = TaskStatus::Succeeded;
    true
  }

  /// Apply a terminal failure. Returns false if the task is already
  /// terminal.
  pub(crate) fn fail(&mut self, error: InquiryError) -> bool {
    if self.status.is_terminal() {
      return false;
    }
    self.failure = Some(error);
    self.status = TaskStatus::Failed;
    true
  }

  /// Apply cancellation. Returns false if the task is already terminal.
  pub(crate) fn cancel(&mut self) -> bool {
    if self.status.is_terminal() {
      return false;
    }
    self.status = TaskStatus::Cancelled;
    true
  }

  pub(crate) fn status(&self) -> TaskStatus {
    self.status
  }

  /// Consume the terminal record into its outcome.
  ///
  /// # Panics
  /// Panics if the task is not terminal; the poll loop only calls this
  /// after applying a terminal transition.
  pub(crate) fn into_outcome(self) -> InquiryOutcome {
    match self.status {
      TaskStatus::Succeeded => InquiryOutcome::Answered(self.answer.unwrap_or_default()),
      TaskStatus::Failed => {
        let failure = self.failure.unwrap_or(InquiryError::UnrecognizedReply {
          task_id: self.id.unwrap_or_default(),
          detail: "failure recorded without a reason".to_string(),
        });
        InquiryOutcome::Failed(failure)
      }
      TaskStatus::Cancelled => InquiryOutcome::Cancelled,
      TaskStatus::Unsubmitted | TaskStatus::Pending => {
        unreachable!("into_outcome called on a non-terminal task")
      }
    }
  }
}
