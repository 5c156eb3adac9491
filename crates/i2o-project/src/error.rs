use thiserror::Error;

use crate::types::{Stage, UserRole};

/// Errors that can occur while mutating project state.
#[derive(Debug, Error)]
pub enum ProjectError {
  /// No project has been started yet.
  #[error("no current project")]
  NoProject,

  /// The project lead must be a healthcare professional.
  #[error("project lead must be an HCP, got {role:?}")]
  InvalidLead { role: UserRole },

  /// The role cannot be assigned to a project as an expert.
  #[error("role {role:?} cannot be assigned to a project")]
  InvalidAssignment { role: UserRole },

  /// The condition for leaving the current stage does not hold.
  #[error("cannot leave stage '{from:?}': {reason}")]
  StageGate { from: Stage, reason: String },

  /// Stages only move forward.
  #[error("cannot move back from {from:?} to {to:?}")]
  BackwardTransition { from: Stage, to: Stage },

  /// The project is already at the final stage.
  #[error("project is already at the manuscript stage")]
  AlreadyFinal,
}
