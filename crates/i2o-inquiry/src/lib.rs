//! i2o Inquiry
//!
//! Client for a task-based question-answering service: a question is
//! POSTed to the service, which replies with a task id; the answer is then
//! fetched on a fixed interval until the task completes, fails, or the
//! caller cancels interest.
//!
//! [`InquiryClient::submit`] validates the question, creates the remote
//! task, and starts the poll loop in one operation. The returned
//! [`PendingInquiry`] handle is the only reference to the task: await
//! [`PendingInquiry::wait`] for the terminal outcome, observe
//! [`PendingInquiry::status`], or [`PendingInquiry::cancel`]. Exactly one
//! terminal outcome is delivered per task.

mod classify;
mod client;
mod error;
mod task;
mod transport;

pub use client::{InquiryClient, InquiryConfig, PendingInquiry};
pub use error::InquiryError;
pub use task::{InquiryOutcome, TaskStatus};
pub use transport::{HttpTransport, InquiryTransport, TransportError};
