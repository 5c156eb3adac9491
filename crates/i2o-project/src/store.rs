use chrono::Utc;

use crate::error::ProjectError;
use crate::types::{
  AiReport, Analysis, DataSet, EthicsStatus, IdeationMode, Manuscript, ManuscriptStatus, Proposal,
  ResearchIdea, ResearchProject, Stage, User, UserRole,
};

/// Minimum novelty score for an idea to be considered novel.
pub const NOVELTY_FLOOR: u8 = 60;

/// Owns the current research project and exposes named mutation operations.
///
/// Every mutation goes through a method on this type; each one stamps
/// `updated_at`. Stage advancement is gated by [`ProjectStore::advance_stage`].
#[derive(Debug, Default)]
pub struct ProjectStore {
  current: Option<ResearchProject>,
}

impl ProjectStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Install an existing project (e.g. one loaded from disk).
  pub fn load(&mut self, project: ResearchProject) {
    self.current = Some(project);
  }

  /// The current project, if one has been started.
  pub fn current(&self) -> Option<&ResearchProject> {
    self.current.as_ref()
  }

  /// Drop the current project.
  pub fn clear(&mut self) {
    self.current = None;
  }

  /// Start a new project at the ideation stage, replacing any current one.
  ///
  /// Only a healthcare professional can lead a project.
  pub fn start_project(
    &mut self,
    title: impl Into<String>,
    lead: User,
  ) -> Result<&ResearchProject, ProjectError> {
    if lead.role != UserRole::Hcp {
      return Err(ProjectError::InvalidLead { role: lead.role });
    }
    self.current = Some(ResearchProject::new(title, lead));
    Ok(self.current.as_ref().unwrap())
  }

  /// Set or replace the research idea.
  pub fn set_idea(&mut self, idea: ResearchIdea) -> Result<(), ProjectError> {
    let project = self.project_mut()?;
    project.idea = Some(idea);
    project.updated_at = Utc::now();
    Ok(())
  }

  /// Record which ideation mode produced the idea, clearing any stale
  /// assessment from a previous mode.
  pub fn set_ideation_mode(&mut self, mode: IdeationMode) -> Result<(), ProjectError> {
    let project = self.project_mut()?;
    let idea = project.idea.get_or_insert_with(ResearchIdea::default);
    idea.ideation_mode = Some(mode);
    idea.report = None;
    idea.novelty_score = None;
    idea.similarity_score = None;
    idea.is_novel = None;
    project.updated_at = Utc::now();
    Ok(())
  }

  /// Record how far idea validation has progressed.
  pub fn set_validation_stage(
    &mut self,
    stage: crate::types::IdeaValidationStage,
  ) -> Result<(), ProjectError> {
    let project = self.project_mut()?;
    let idea = project.idea.get_or_insert_with(ResearchIdea::default);
    idea.validation_stage = Some(stage);
    project.updated_at = Utc::now();
    Ok(())
  }

  /// Attach an AI assessment report to the idea.
  pub fn record_idea_report(
    &mut self,
    report: AiReport,
    novelty_score: u8,
    similarity_score: u8,
  ) -> Result<(), ProjectError> {
    let project = self.project_mut()?;
    let idea = project.idea.get_or_insert_with(ResearchIdea::default);
    idea.report = Some(report);
    idea.novelty_score = Some(novelty_score.min(100));
    idea.similarity_score = Some(similarity_score.min(100));
    project.updated_at = Utc::now();
    Ok(())
  }

  /// Conclude idea validation: the idea is novel iff its score clears
  /// [`NOVELTY_FLOOR`].
  pub fn mark_idea_validated(&mut self) -> Result<bool, ProjectError> {
    let project = self.project_mut()?;
    let idea = project
      .idea
      .as_mut()
      .ok_or_else(|| ProjectError::StageGate {
        from: Stage::Ideation,
        reason: "no idea to validate".to_string(),
      })?;
    let novel = idea.novelty_score.unwrap_or(0) >= NOVELTY_FLOOR;
    idea.is_novel = Some(novel);
    project.updated_at = Utc::now();
    Ok(novel)
  }

  /// Assign an expert to the project by role.
  pub fn assign_expert(
    &mut self,
    role: UserRole,
    user_id: impl Into<String>,
  ) -> Result<(), ProjectError> {
    if !role.is_assignable() {
      return Err(ProjectError::InvalidAssignment { role });
    }
    let project = self.project_mut()?;
    let user_id = user_id.into();
    match role {
      UserRole::Researcher => {
        project.assigned_researcher = Some(user_id);
        if let Some(idea) = project.idea.as_mut() {
          idea.expert_assigned = true;
        }
      }
      UserRole::Statistician => {
        project.assigned_statistician = Some(user_id);
        if let Some(proposal) = project.proposal.as_mut() {
          proposal.statistician_assigned = true;
        }
      }
      UserRole::DataEngineer => {
        project.assigned_data_engineer = Some(user_id);
      }
      UserRole::Hcp | UserRole::Admin => unreachable!("checked by is_assignable"),
    }
    project.updated_at = Utc::now();
    Ok(())
  }

  /// Set the proposal title, creating the proposal on first write.
  pub fn set_proposal_title(&mut self, title: impl Into<String>) -> Result<(), ProjectError> {
    let project = self.project_mut()?;
    let proposal = project.proposal.get_or_insert_with(Proposal::default);
    proposal.title = title.into();
    project.updated_at = Utc::now();
    Ok(())
  }

  /// Write a named proposal section, creating the proposal on first write.
  pub fn update_proposal_section(
    &mut self,
    name: impl Into<String>,
    text: impl Into<String>,
  ) -> Result<(), ProjectError> {
    let project = self.project_mut()?;
    let proposal = project.proposal.get_or_insert_with(Proposal::default);
    proposal.sections.insert(name.into(), text.into());
    project.updated_at = Utc::now();
    Ok(())
  }

  /// Record the ethics review transition.
  pub fn set_ethics_status(
    &mut self,
    status: EthicsStatus,
    feedback: Option<String>,
  ) -> Result<(), ProjectError> {
    let project = self.project_mut()?;
    let proposal = project.proposal.get_or_insert_with(Proposal::default);
    proposal.ethics_status = status;
    if feedback.is_some() {
      proposal.ethics_feedback = feedback;
    }
    project.updated_at = Utc::now();
    Ok(())
  }

  /// Attach the precedent comparison report to the proposal.
  pub fn set_precedent_report(&mut self, report: impl Into<String>) -> Result<(), ProjectError> {
    let project = self.project_mut()?;
    let proposal = project.proposal.get_or_insert_with(Proposal::default);
    proposal.precedent_comparison_report = Some(report.into());
    project.updated_at = Utc::now();
    Ok(())
  }

  /// Set or replace the data set.
  pub fn set_dataset(&mut self, dataset: DataSet) -> Result<(), ProjectError> {
    let project = self.project_mut()?;
    project.dataset = Some(dataset);
    project.updated_at = Utc::now();
    Ok(())
  }

  /// Record the data engineer's review decision.
  pub fn record_engineer_review(&mut self, approved: bool) -> Result<(), ProjectError> {
    let project = self.project_mut()?;
    let dataset = project.dataset.get_or_insert_with(DataSet::default);
    dataset.engineer_reviewed = true;
    dataset.engineer_approved = approved;
    project.updated_at = Utc::now();
    Ok(())
  }

  /// Set the statistical analysis plan. Rejected once the plan is locked.
  pub fn set_analysis_plan(&mut self, plan: impl Into<String>) -> Result<(), ProjectError> {
    let project = self.project_mut()?;
    let analysis = project.analysis.get_or_insert_with(Analysis::default);
    if analysis.plan_locked {
      return Err(ProjectError::StageGate {
        from: Stage::DataAnalysis,
        reason: "analysis plan is locked".to_string(),
      });
    }
    analysis.plan = plan.into();
    project.updated_at = Utc::now();
    Ok(())
  }

  /// Lock the analysis plan so results cannot drift from it.
  pub fn lock_analysis_plan(&mut self) -> Result<(), ProjectError> {
    let project = self.project_mut()?;
    let analysis = project.analysis.get_or_insert_with(Analysis::default);
    analysis.plan_locked = true;
    project.updated_at = Utc::now();
    Ok(())
  }

  /// Record analysis outputs.
  pub fn record_results(
    &mut self,
    results: impl Into<String>,
    tables: Option<String>,
    figures: Option<String>,
  ) -> Result<(), ProjectError> {
    let project = self.project_mut()?;
    let analysis = project.analysis.get_or_insert_with(Analysis::default);
    analysis.results = Some(results.into());
    analysis.tables = tables;
    analysis.figures = figures;
    analysis.validated = false;
    project.updated_at = Utc::now();
    Ok(())
  }

  /// Statistician sign-off on the recorded results.
  pub fn validate_analysis(
    &mut self,
    interpretation: impl Into<String>,
  ) -> Result<(), ProjectError> {
    let project = self.project_mut()?;
    let analysis = project
      .analysis
      .as_mut()
      .ok_or_else(|| ProjectError::StageGate {
        from: Stage::DataAnalysis,
        reason: "no analysis to validate".to_string(),
      })?;
    if analysis.results.is_none() {
      return Err(ProjectError::StageGate {
        from: Stage::DataAnalysis,
        reason: "no results recorded".to_string(),
      });
    }
    analysis.statistician_interpretation = Some(interpretation.into());
    analysis.validated = true;
    project.updated_at = Utc::now();
    Ok(())
  }

  /// Write a named manuscript section, creating the manuscript on first
  /// write.
  pub fn update_manuscript_section(
    &mut self,
    name: impl Into<String>,
    text: impl Into<String>,
  ) -> Result<(), ProjectError> {
    let project = self.project_mut()?;
    let manuscript = project.manuscript.get_or_insert_with(Manuscript::default);
    manuscript.sections.insert(name.into(), text.into());
    project.updated_at = Utc::now();
    Ok(())
  }

  /// Move the manuscript through its publication states.
  pub fn set_manuscript_status(&mut self, status: ManuscriptStatus) -> Result<(), ProjectError> {
    let project = self.project_mut()?;
    let manuscript = project.manuscript.get_or_insert_with(Manuscript::default);
    manuscript.status = status;
    project.updated_at = Utc::now();
    Ok(())
  }

  /// Advance to the next stage if the current stage's gate holds.
  pub fn advance_stage(&mut self) -> Result<Stage, ProjectError> {
    let next = self.check_gate()?;
    let project = self.project_mut()?;
    project.stage = next;
    project.updated_at = Utc::now();
    Ok(next)
  }

  /// Move directly to a stage. Forward (or same-stage) only; gates are not
  /// re-checked, so this is reserved for admin flows.
  pub fn set_stage(&mut self, stage: Stage) -> Result<(), ProjectError> {
    let project = self.project_mut()?;
    if stage < project.stage {
      return Err(ProjectError::BackwardTransition {
        from: project.stage,
        to: stage,
      });
    }
    project.stage = stage;
    project.updated_at = Utc::now();
    Ok(())
  }

  /// Evaluate the gate for leaving the current stage and return the stage
  /// it would move to.
  fn check_gate(&self) -> Result<Stage, ProjectError> {
    let project = self.current.as_ref().ok_or(ProjectError::NoProject)?;
    let next = project.stage.next().ok_or(ProjectError::AlreadyFinal)?;

    let gate_err = |reason: &str| ProjectError::StageGate {
      from: project.stage,
      reason: reason.to_string(),
    };

    match project.stage {
      Stage::Ideation => {
        let idea = project.idea.as_ref().ok_or_else(|| gate_err("no idea"))?;
        if idea.is_novel != Some(true) {
          return Err(gate_err("idea has not been validated as novel"));
        }
      }
      Stage::Proposal => {
        let proposal = project
          .proposal
          .as_ref()
          .ok_or_else(|| gate_err("no proposal"))?;
        if proposal.ethics_status != EthicsStatus::Approved {
          return Err(gate_err("ethics approval is outstanding"));
        }
      }
      Stage::DataAnalysis => {
        let analysis = project
          .analysis
          .as_ref()
          .ok_or_else(|| gate_err("no analysis"))?;
        if !analysis.validated {
          return Err(gate_err("analysis has not been validated"));
        }
      }
      Stage::Manuscript => unreachable!("next() returned None above"),
    }

    Ok(next)
  }

  fn project_mut(&mut self) -> Result<&mut ResearchProject, ProjectError> {
    self.current.as_mut().ok_or(ProjectError::NoProject)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn hcp() -> User {
    User {
      id: "user_hcp_1".to_string(),
      name: "Dr. Alice Smith".to_string(),
      role: UserRole::Hcp,
    }
  }

  fn store_with_project() -> ProjectStore {
    let mut store = ProjectStore::new();
    store
      .start_project("AKI outcomes in sepsis", hcp())
      .expect("start project");
    store
  }

  fn validated_idea(store: &mut ProjectStore, novelty: u8) {
    store
      .set_idea(ResearchIdea {
        concept: "Early AKI markers".to_string(),
        ..ResearchIdea::default()
      })
      .unwrap();
    store
      .record_idea_report(AiReport::default(), novelty, 20)
      .unwrap();
    store.mark_idea_validated().unwrap();
  }

  #[test]
  fn start_project_requires_hcp_lead() {
    let mut store = ProjectStore::new();
    let err = store
      .start_project(
        "title",
        User {
          id: "u1".to_string(),
          name: "Admin".to_string(),
          role: UserRole::Admin,
        },
      )
      .expect_err("non-HCP lead should be rejected");
    assert!(matches!(err, ProjectError::InvalidLead { .. }));
    assert!(store.current().is_none());
  }

  #[test]
  fn mutations_without_project_fail() {
    let mut store = ProjectStore::new();
    let err = store.set_idea(ResearchIdea::default()).unwrap_err();
    assert!(matches!(err, ProjectError::NoProject));
  }

  #[test]
  fn ideation_gate_requires_novel_idea() {
    let mut store = store_with_project();
    let err = store.advance_stage().unwrap_err();
    assert!(matches!(err, ProjectError::StageGate { .. }));

    validated_idea(&mut store, 45);
    let err = store.advance_stage().unwrap_err();
    assert!(matches!(err, ProjectError::StageGate { .. }));

    validated_idea(&mut store, 72);
    assert_eq!(store.advance_stage().unwrap(), Stage::Proposal);
  }

  #[test]
  fn mark_idea_validated_applies_novelty_floor() {
    let mut store = store_with_project();
    store.set_idea(ResearchIdea::default()).unwrap();
    store
      .record_idea_report(AiReport::default(), NOVELTY_FLOOR, 10)
      .unwrap();
    assert!(store.mark_idea_validated().unwrap());

    store
      .record_idea_report(AiReport::default(), NOVELTY_FLOOR - 1, 10)
      .unwrap();
    assert!(!store.mark_idea_validated().unwrap());
  }

  #[test]
  fn proposal_gate_requires_ethics_approval() {
    let mut store = store_with_project();
    validated_idea(&mut store, 80);
    store.advance_stage().unwrap();

    store.set_proposal_title("Proposal").unwrap();
    store
      .update_proposal_section("Background", "Sepsis-associated AKI...")
      .unwrap();
    store
      .set_precedent_report("Consistent with three prior institutional protocols.")
      .unwrap();
    store
      .set_ethics_status(EthicsStatus::Submitted, None)
      .unwrap();
    assert!(store.advance_stage().is_err());

    store
      .set_ethics_status(EthicsStatus::Approved, Some("Approved.".to_string()))
      .unwrap();
    assert_eq!(store.advance_stage().unwrap(), Stage::DataAnalysis);
  }

  #[test]
  fn analysis_gate_requires_validation() {
    let mut store = store_with_project();
    validated_idea(&mut store, 80);
    store.advance_stage().unwrap();
    store
      .set_ethics_status(EthicsStatus::Approved, None)
      .unwrap();
    store.advance_stage().unwrap();

    store.set_analysis_plan("t-test on primary outcome").unwrap();
    assert!(store.advance_stage().is_err());

    assert!(matches!(
      store.validate_analysis("looks good").unwrap_err(),
      ProjectError::StageGate { .. }
    ));
    store.record_results("p < 0.05", None, None).unwrap();
    store.validate_analysis("Validated by statistician.").unwrap();
    assert_eq!(store.advance_stage().unwrap(), Stage::Manuscript);

    assert!(matches!(
      store.advance_stage().unwrap_err(),
      ProjectError::AlreadyFinal
    ));
  }

  #[test]
  fn locked_plan_rejects_edits() {
    let mut store = store_with_project();
    store.set_analysis_plan("v1").unwrap();
    store.lock_analysis_plan().unwrap();
    assert!(store.set_analysis_plan("v2").is_err());
  }

  #[test]
  fn assign_expert_rejects_non_expert_roles() {
    let mut store = store_with_project();
    let err = store.assign_expert(UserRole::Admin, "u9").unwrap_err();
    assert!(matches!(
      err,
      ProjectError::InvalidAssignment {
        role: UserRole::Admin
      }
    ));
  }

  #[test]
  fn assign_researcher_marks_idea() {
    let mut store = store_with_project();
    store.set_idea(ResearchIdea::default()).unwrap();
    store
      .assign_expert(UserRole::Researcher, "user_researcher_1")
      .unwrap();

    let project = store.current().unwrap();
    assert_eq!(
      project.assigned_researcher.as_deref(),
      Some("user_researcher_1")
    );
    assert!(project.idea.as_ref().unwrap().expert_assigned);
  }

  #[test]
  fn assign_statistician_marks_proposal() {
    let mut store = store_with_project();
    store.set_proposal_title("Proposal").unwrap();
    store
      .assign_expert(UserRole::Statistician, "user_statistician_1")
      .unwrap();
    assert!(
      store
        .current()
        .unwrap()
        .proposal
        .as_ref()
        .unwrap()
        .statistician_assigned
    );
  }

  #[test]
  fn set_stage_rejects_backward_moves() {
    let mut store = store_with_project();
    store.set_stage(Stage::DataAnalysis).unwrap();
    let err = store.set_stage(Stage::Ideation).unwrap_err();
    assert!(matches!(err, ProjectError::BackwardTransition { .. }));
  }

  #[test]
  fn rejected_ethics_can_be_resubmitted() {
    let mut store = store_with_project();
    store
      .set_ethics_status(EthicsStatus::Rejected, Some("Out of scope.".to_string()))
      .unwrap();
    store
      .set_ethics_status(EthicsStatus::Submitted, None)
      .unwrap();
    let proposal = store.current().unwrap().proposal.as_ref().unwrap();
    assert_eq!(proposal.ethics_status, EthicsStatus::Submitted);
    // Feedback from the previous round is preserved.
    assert_eq!(proposal.ethics_feedback.as_deref(), Some("Out of scope."));
  }

  #[test]
  fn switching_ideation_mode_clears_stale_assessment() {
    let mut store = store_with_project();
    validated_idea(&mut store, 90);
    store.set_ideation_mode(IdeationMode::AiCoCreation).unwrap();

    let idea = store.current().unwrap().idea.as_ref().unwrap();
    assert_eq!(idea.ideation_mode, Some(IdeationMode::AiCoCreation));
    assert!(idea.report.is_none());
    assert!(idea.novelty_score.is_none());
    assert!(idea.is_novel.is_none());
  }

  #[test]
  fn dataset_review_flags_follow_the_engineer_decision() {
    let mut store = store_with_project();
    store
      .set_dataset(DataSet {
        name: "sepsis_cohort".to_string(),
        description: "ICU admissions with sepsis codes".to_string(),
        pathway: Some(crate::types::DataPathway::EngineerQuery),
        ..DataSet::default()
      })
      .unwrap();
    store.record_engineer_review(false).unwrap();

    let dataset = store.current().unwrap().dataset.as_ref().unwrap();
    assert!(dataset.engineer_reviewed);
    assert!(!dataset.engineer_approved);
  }

  #[test]
  fn manuscript_sections_and_status_are_tracked() {
    let mut store = store_with_project();
    store
      .update_manuscript_section("Abstract", "We report...")
      .unwrap();
    store
      .set_manuscript_status(ManuscriptStatus::Review)
      .unwrap();

    let manuscript = store.current().unwrap().manuscript.as_ref().unwrap();
    assert_eq!(
      manuscript.sections.get("Abstract").map(String::as_str),
      Some("We report...")
    );
    assert_eq!(manuscript.status, ManuscriptStatus::Review);
  }

  #[test]
  fn validation_stage_progresses() {
    let mut store = store_with_project();
    store
      .set_validation_stage(crate::types::IdeaValidationStage::PreliminaryScreening)
      .unwrap();
    store
      .set_validation_stage(crate::types::IdeaValidationStage::InDepthAnalysis)
      .unwrap();
    assert_eq!(
      store.current().unwrap().idea.as_ref().unwrap().validation_stage,
      Some(crate::types::IdeaValidationStage::InDepthAnalysis)
    );
  }

  #[test]
  fn clear_drops_the_project() {
    let mut store = store_with_project();
    assert!(store.current().is_some());
    store.clear();
    assert!(store.current().is_none());
  }

  #[test]
  fn project_round_trips_through_json() {
    let mut store = store_with_project();
    validated_idea(&mut store, 80);
    let project = store.current().unwrap().clone();

    let json = serde_json::to_string(&project).expect("serialize");
    let back: ResearchProject = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, project);
  }
}
