use serde::{Deserialize, Serialize};

/// A link the service grounded its answer on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceLink {
  pub uri: String,
  pub title: String,
}

/// A model completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Completion {
  /// The generated text.
  pub text: String,

  /// Source links, populated for search-grounded completions.
  pub sources: Vec<SourceLink>,
}
