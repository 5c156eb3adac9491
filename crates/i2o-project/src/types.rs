use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
  Hcp,
  Researcher,
  Statistician,
  DataEngineer,
  Admin,
}

impl UserRole {
  /// Human-readable label for display.
  pub fn label(self) -> &'static str {
    match self {
      UserRole::Hcp => "Healthcare Professional",
      UserRole::Researcher => "Experienced Researcher",
      UserRole::Statistician => "Statistician",
      UserRole::DataEngineer => "Data Engineer/Custodian",
      UserRole::Admin => "System Administrator",
    }
  }

  /// Whether this role can be assigned to a project as an expert.
  pub fn is_assignable(self) -> bool {
    matches!(
      self,
      UserRole::Researcher | UserRole::Statistician | UserRole::DataEngineer
    )
  }
}

/// A platform user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub id: String,
  pub name: String,
  pub role: UserRole,
}

/// The four sequential stages of a research project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
  Ideation,
  Proposal,
  DataAnalysis,
  Manuscript,
}

impl Stage {
  /// The stage that follows this one, if any.
  pub fn next(self) -> Option<Stage> {
    match self {
      Stage::Ideation => Some(Stage::Proposal),
      Stage::Proposal => Some(Stage::DataAnalysis),
      Stage::DataAnalysis => Some(Stage::Manuscript),
      Stage::Manuscript => None,
    }
  }

  /// Human-readable label for display.
  pub fn label(self) -> &'static str {
    match self {
      Stage::Ideation => "Idea Generation & Validation",
      Stage::Proposal => "Proposal Development & Ethics",
      Stage::DataAnalysis => "Data Collection, Aggregation & Analysis",
      Stage::Manuscript => "Manuscript Writing & Publication",
    }
  }
}

/// How the research idea was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeationMode {
  ClinicianLed,
  AiCoCreation,
  AutonomousAi,
}

/// Progress of idea validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeaValidationStage {
  PreliminaryScreening,
  InDepthAnalysis,
}

/// AI-generated assessment of a research idea.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiReport {
  pub literature_summary: String,
  pub research_gaps: String,
  pub feasibility_assessment: String,
  pub novelty_rating: Option<String>,
  pub similarity_rating: Option<String>,
  pub suggestions: Option<String>,
}

/// A research idea under development.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchIdea {
  pub concept: String,
  pub background: Option<String>,
  pub objective: Option<String>,
  pub methodology: Option<String>,
  pub significance: Option<String>,
  pub expected_outcomes: Option<String>,
  pub ideation_mode: Option<IdeationMode>,
  pub validation_stage: Option<IdeaValidationStage>,
  pub report: Option<AiReport>,
  /// 0-100; higher is more novel.
  pub novelty_score: Option<u8>,
  /// 0-100; lower means less overlap with existing work.
  pub similarity_score: Option<u8>,
  pub is_novel: Option<bool>,
  pub expert_assigned: bool,
}

/// Ethics review state of a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EthicsStatus {
  NotSubmitted,
  Submitted,
  FeedbackReceived,
  Approved,
  Rejected,
}

/// A research proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
  pub title: String,
  /// Named sections, ordered by name for stable serialization.
  pub sections: BTreeMap<String, String>,
  pub ethics_status: EthicsStatus,
  pub ethics_feedback: Option<String>,
  pub statistician_assigned: bool,
  pub precedent_comparison_report: Option<String>,
}

impl Default for Proposal {
  fn default() -> Self {
    Self {
      title: String::new(),
      sections: BTreeMap::new(),
      ethics_status: EthicsStatus::NotSubmitted,
      ethics_feedback: None,
      statistician_assigned: false,
      precedent_comparison_report: None,
    }
  }
}

/// How project data is collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataPathway {
  /// Engineer-assisted, AI-powered querying.
  EngineerQuery,
  /// AI-assisted GUI extraction.
  GuiExtraction,
}

/// A data set collected for the project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSet {
  pub name: String,
  pub description: String,
  pub source_query: Option<String>,
  pub simulated_rows: Vec<serde_json::Value>,
  pub pathway: Option<DataPathway>,
  pub engineer_reviewed: bool,
  pub engineer_approved: bool,
}

/// Statistical analysis plan and results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
  pub plan: String,
  pub test_types: Vec<String>,
  pub measures_to_report: Vec<String>,
  pub figures_and_tables_plan: Vec<String>,
  pub plan_locked: bool,
  pub results: Option<String>,
  pub tables: Option<String>,
  pub figures: Option<String>,
  pub statistician_interpretation: Option<String>,
  pub validated: bool,
}

/// Publication readiness of a manuscript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManuscriptStatus {
  Drafting,
  Review,
  ReadyForSubmission,
}

/// A manuscript draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manuscript {
  pub title: String,
  pub target_journal: Option<String>,
  pub sections: BTreeMap<String, String>,
  pub references: Option<String>,
  pub status: ManuscriptStatus,
  pub keywords: Option<String>,
  pub authors: Option<String>,
  pub affiliations: Option<String>,
  pub acknowledgements: Option<String>,
  pub author_contributions: Option<String>,
  pub conflict_of_interest_statement: Option<String>,
  pub funding_statement: Option<String>,
  pub recommended_article_type: Option<String>,
  pub recommended_word_counts: Option<String>,
  pub recommended_figure_types: Option<String>,
}

impl Default for Manuscript {
  fn default() -> Self {
    Self {
      title: String::new(),
      target_journal: None,
      sections: BTreeMap::new(),
      references: None,
      status: ManuscriptStatus::Drafting,
      keywords: None,
      authors: None,
      affiliations: None,
      acknowledgements: None,
      author_contributions: None,
      conflict_of_interest_statement: None,
      funding_statement: None,
      recommended_article_type: None,
      recommended_word_counts: None,
      recommended_figure_types: None,
    }
  }
}

/// A research project and everything produced for it so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchProject {
  pub id: String,
  pub title: String,
  pub lead: User,
  pub stage: Stage,
  pub idea: Option<ResearchIdea>,
  pub proposal: Option<Proposal>,
  pub dataset: Option<DataSet>,
  pub analysis: Option<Analysis>,
  pub manuscript: Option<Manuscript>,
  pub assigned_researcher: Option<String>,
  pub assigned_statistician: Option<String>,
  pub assigned_data_engineer: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl ResearchProject {
  /// Create a fresh project at the ideation stage.
  pub fn new(title: impl Into<String>, lead: User) -> Self {
    let now = Utc::now();
    Self {
      id: uuid::Uuid::new_v4().to_string(),
      title: title.into(),
      lead,
      stage: Stage::Ideation,
      idea: None,
      proposal: None,
      dataset: None,
      analysis: None,
      manuscript: None,
      assigned_researcher: None,
      assigned_statistician: None,
      assigned_data_engineer: None,
      created_at: now,
      updated_at: now,
    }
  }
}
