//! i2o Project
//!
//! Data model and state container for a research project as it moves
//! through the four platform stages: ideation, proposal development, data
//! collection and analysis, and manuscript writing.
//!
//! The [`ProjectStore`] owns the current project and exposes named mutation
//! operations; callers never reach into the project to mutate it directly.
//! Stage advancement is gated: each stage defines a condition that must
//! hold before [`ProjectStore::advance_stage`] moves on.

mod error;
mod store;
mod types;

pub use error::ProjectError;
pub use store::{NOVELTY_FLOOR, ProjectStore};
pub use types::{
  AiReport, Analysis, DataPathway, DataSet, EthicsStatus, IdeaValidationStage, IdeationMode,
  Manuscript, ManuscriptStatus, Proposal, ResearchIdea, ResearchProject, Stage, User, UserRole,
};
