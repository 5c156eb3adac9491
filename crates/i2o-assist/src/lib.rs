//! i2o Assist
//!
//! Client for the generative-language API that backs the platform's
//! drafting features: plain text completions, JSON completions (with
//! Markdown code fences stripped before parsing), and search-grounded
//! completions that report their source links.
//!
//! Prompt text is produced by [`PromptTemplates`], so prompt structure
//! lives in templates rather than format strings scattered across
//! call sites.

mod client;
mod error;
mod prompt;
mod types;

pub use client::AssistClient;
pub use error::AssistError;
pub use prompt::{
  IdeaReportContext, ManuscriptSectionContext, PromptTemplates, ProposalSectionContext,
  SqlDraftContext,
};
pub use types::{Completion, SourceLink};
