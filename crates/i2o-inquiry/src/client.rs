use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::classify::{self, PollClassification};
use crate::error::InquiryError;
use crate::task::{InquiryOutcome, InquiryTask, TaskStatus};
use crate::transport::InquiryTransport;

/// Floor for the poll interval, so a zero in a config file cannot turn
/// the loop into a busy spin.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Tuning for the poll loop.
#[derive(Debug, Clone, Copy)]
pub struct InquiryConfig {
  /// Interval between result fetches. Constant for the lifetime of a
  /// task, never adaptive.
  pub poll_interval: Duration,

  /// Maximum number of result fetches before the task is failed as timed
  /// out. `None` polls until the service answers or the caller cancels.
  pub max_attempts: Option<u32>,
}

impl Default for InquiryConfig {
  fn default() -> Self {
    Self {
      poll_interval: Duration::from_secs(2),
      max_attempts: Some(150),
    }
  }
}

/// Client for the task-based question-answering service.
///
/// Generic over the transport so tests can script replies; production use
/// pairs it with [`crate::HttpTransport`].
pub struct InquiryClient<T: InquiryTransport> {
  transport: Arc<T>,
  config: InquiryConfig,
}

impl<T: InquiryTransport> InquiryClient<T> {
  pub fn new(transport: T, mut config: InquiryConfig) -> Self {
    config.poll_interval = config.poll_interval.max(MIN_POLL_INTERVAL);
    Self {
      transport: Arc::new(transport),
      config,
    }
  }

  /// Submit a question and start polling for the answer.
  ///
  /// The question must be non-empty after trimming; validation happens
  /// before any network call. On success the remote task exists, the poll
  /// loop is running, and the returned handle is the only reference to
  /// it.
  ///
  /// # Errors
  /// [`InquiryError::EmptyQuestion`] for blank input,
  /// [`InquiryError::Submission`] if the submission call fails, and
  /// [`InquiryError::MalformedSubmitReply`] if the reply carries no task
  /// id. In every error case no task exists and no polling was started.
  #[instrument(name = "inquiry_submit", skip_all)]
  pub async fn submit(&self, question: &str) -> Result<PendingInquiry, InquiryError> {
    let question = question.trim();
    if question.is_empty() {
      return Err(InquiryError::EmptyQuestion);
    }

    let body = self
      .transport
      .submit(question)
      .await
      .map_err(|source| InquiryError::Submission { source })?;

    let task_id = classify::parse_submit_reply(&body).ok_or_else(|| {
      InquiryError::MalformedSubmitReply {
        body: body.to_string(),
      }
    })?;

    let mut task = InquiryTask::new();
    task.mark_submitted(task_id.clone());
    info!(task_id = %task_id, "task_submitted");

    let (outcome_tx, outcome_rx) = oneshot::channel();
    let (status_tx, status_rx) = watch::channel(TaskStatus::Pending);
    let cancel = CancellationToken::new();

    tokio::spawn(poll_loop(
      Arc::clone(&self.transport),
      self.config,
      task_id.clone(),
      task,
      cancel.clone(),
      outcome_tx,
      status_tx,
    ));

    Ok(PendingInquiry {
      task_id,
      cancel,
      outcome: outcome_rx,
      status: status_rx,
    })
  }
}

/// Handle to a submitted inquiry.
///
/// Await [`PendingInquiry::wait`] for the terminal outcome, observe
/// [`PendingInquiry::status`], or [`PendingInquiry::cancel`]. Dropping the
/// handle does not cancel the task.
#[derive(Debug)]
pub struct PendingInquiry {
  task_id: String,
  cancel: CancellationToken,
  outcome: oneshot::Receiver<InquiryOutcome>,
  status: watch::Receiver<TaskStatus>,
}

impl PendingInquiry {
  /// The id the service assigned to this task.
  pub fn task_id(&self) -> &str {
    &self.task_id
  }

  /// Current task status.
  pub fn status(&self) -> TaskStatus {
    *self.status.borrow()
  }

  /// Withdraw interest in the task.
  ///
  /// Stops future fetches; a reply from a fetch already in flight is
  /// discarded. Idempotent, and a no-op once the task is terminal.
  pub fn cancel(&self) {
    self.cancel.cancel();
  }

  /// Token that cancels this task when triggered, for wiring into
  /// signal handlers.
  pub fn cancellation_token(&self) -> CancellationToken {
    self.cancel.clone()
  }

  /// Wait for the terminal outcome. Delivered exactly once.
  pub async fn wait(self) -> InquiryOutcome {
    match self.outcome.await {
      Ok(outcome) => outcome,
      // The loop can only drop the sender without sending if the runtime
      // is tearing down; treat that as withdrawn interest.
      Err(_) => InquiryOutcome::Cancelled,
    }
  }
}

/// Poll the result endpoint until the task reaches a terminal state.
///
/// Cycles are strictly sequential: the next fetch is scheduled only after
/// the previous reply has been classified. A cancellation requested at any
/// point wins over a reply still in flight.
#[instrument(name = "inquiry_poll", skip_all, fields(task_id = %task_id))]
async fn poll_loop<T: InquiryTransport>(
  transport: Arc<T>,
  config: InquiryConfig,
  task_id: String,
  mut task: InquiryTask,
  cancel: CancellationToken,
  outcome_tx: oneshot::Sender<InquiryOutcome>,
  status_tx: watch::Sender<TaskStatus>,
) {
  let mut attempts: u32 = 0;

  loop {
    tokio::select! {
      _ = cancel.cancelled() => {
        task.cancel();
        warn!("task_cancelled");
        break;
      }
      _ = tokio::time::sleep(config.poll_interval) => {}
    }

    if let Some(max) = config.max_attempts {
      if attempts >= max {
        task.fail(InquiryError::TimeoutExceeded {
          task_id: task_id.clone(),
          attempts,
        });
        error!(attempts, "task_timed_out");
        break;
      }
    }
    attempts += 1;

    let fetched = tokio::select! {
      _ = cancel.cancelled() => {
        task.cancel();
        warn!("task_cancelled");
        break;
      }
      fetched = transport.fetch(&task_id) => fetched,
    };

    // The token may have been triggered in the same instant the fetch
    // resolved; cancellation wins and the reply is discarded.
    if cancel.is_cancelled() {
      task.cancel();
      warn!("task_cancelled");
      break;
    }

    match fetched {
      Err(source) => {
        task.fail(InquiryError::PollTransport {
          task_id: task_id.clone(),
          source,
        });
        error!(attempt = attempts, "task_failed");
        break;
      }
      Ok(body) => match classify::classify_poll_reply(&body) {
        PollClassification::Pending => {
          debug!(attempt = attempts, "poll_pending");
        }
        PollClassification::Answered(answer) => {
          task.complete(answer);
          info!(attempt = attempts, "task_completed");
          break;
        }
        PollClassification::Unrecognized(detail) => {
          task.fail(InquiryError::UnrecognizedReply {
            task_id: task_id.clone(),
            detail,
          });
          error!(attempt = attempts, "task_failed");
          break;
        }
      },
    }
  }

  let _ = status_tx.send(task.status());
  if outcome_tx.send(task.into_outcome()).is_err() {
    debug!("outcome receiver dropped before delivery");
  }
}
