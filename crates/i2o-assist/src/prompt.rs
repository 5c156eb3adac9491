//! Prompt templates.
//!
//! Prompts are rendered from typed context structs so the structure of
//! each prompt lives in one place.

use minijinja::Environment;
use serde::Serialize;

use crate::error::AssistError;

const IDEA_REPORT: &str = "\
Research concept:
{{ concept }}
{% if background %}
Clinical background provided by the lead:
{{ background }}
{% endif %}
Knowledge base context:
{{ knowledge_base }}

Assess this concept against the knowledge base. Reply as JSON with the
fields: literature_summary (string), research_gaps (string),
feasibility_assessment (string), novelty_score (number 0-100, 100 is
highly novel), similarity_score (number 0-100, 0 is no overlap with
existing work), suggestions (string with actionable refinements).";

const PROPOSAL_SECTION: &str = "\
Project title: {{ title }}
Research objective: {{ objective }}

Draft the '{{ section }}' section of a clinical research proposal for
this project. Follow institutional proposal conventions and keep the
section self-contained.";

const SQL_DRAFT: &str = "\
Data request:
{{ request }}

Available tables:
{% for table in tables %}- {{ table }}
{% endfor %}
Write a single SQL query that fulfils the request using only the tables
listed. Reply with the query alone.";

const MANUSCRIPT_SECTION: &str = "\
Project title: {{ title }}
Target journal: {{ journal }}
Validated findings:
{{ findings }}

Draft the '{{ section }}' section of the manuscript. Match the register
of a peer-reviewed clinical journal.";

/// Context for the idea assessment prompt.
#[derive(Debug, Serialize)]
pub struct IdeaReportContext<'a> {
  pub concept: &'a str,
  pub background: Option<&'a str>,
  pub knowledge_base: &'a str,
}

/// Context for drafting one proposal section.
#[derive(Debug, Serialize)]
pub struct ProposalSectionContext<'a> {
  pub title: &'a str,
  pub objective: &'a str,
  pub section: &'a str,
}

/// Context for drafting a data-extraction query.
#[derive(Debug, Serialize)]
pub struct SqlDraftContext<'a> {
  pub request: &'a str,
  pub tables: Vec<&'a str>,
}

/// Context for drafting one manuscript section.
#[derive(Debug, Serialize)]
pub struct ManuscriptSectionContext<'a> {
  pub title: &'a str,
  pub journal: &'a str,
  pub findings: &'a str,
  pub section: &'a str,
}

/// The platform's prompt templates, compiled once.
pub struct PromptTemplates {
  env: Environment<'static>,
}

impl PromptTemplates {
  pub fn new() -> Self {
    let mut env = Environment::new();
    // Template sources are compile-time constants; registration cannot
    // fail on valid syntax.
    env
      .add_template("idea_report", IDEA_REPORT)
      .expect("idea_report template is valid");
    env
      .add_template("proposal_section", PROPOSAL_SECTION)
      .expect("proposal_section template is valid");
    env
      .add_template("sql_draft", SQL_DRAFT)
      .expect("sql_draft template is valid");
    env
      .add_template("manuscript_section", MANUSCRIPT_SECTION)
      .expect("manuscript_section template is valid");
    Self { env }
  }

  pub fn idea_report(&self, ctx: &IdeaReportContext<'_>) -> Result<String, AssistError> {
    Ok(self.env.get_template("idea_report")?.render(ctx)?)
  }

  pub fn proposal_section(&self, ctx: &ProposalSectionContext<'_>) -> Result<String, AssistError> {
    Ok(self.env.get_template("proposal_section")?.render(ctx)?)
  }

  pub fn sql_draft(&self, ctx: &SqlDraftContext<'_>) -> Result<String, AssistError> {
    Ok(self.env.get_template("sql_draft")?.render(ctx)?)
  }

  pub fn manuscript_section(
    &self,
    ctx: &ManuscriptSectionContext<'_>,
  ) -> Result<String, AssistError> {
    Ok(self.env.get_template("manuscript_section")?.render(ctx)?)
  }
}

impl Default for PromptTemplates {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn idea_report_renders_concept_and_context() {
    let templates = PromptTemplates::new();
    let prompt = templates
      .idea_report(&IdeaReportContext {
        concept: "Early AKI markers in sepsis",
        background: None,
        knowledge_base: "Simulated PubMed summaries.",
      })
      .unwrap();

    assert!(prompt.contains("Early AKI markers in sepsis"));
    assert!(prompt.contains("Simulated PubMed summaries."));
    assert!(prompt.contains("novelty_score"));
    assert!(!prompt.contains("Clinical background provided"));
  }

  #[test]
  fn idea_report_includes_background_when_present() {
    let templates = PromptTemplates::new();
    let prompt = templates
      .idea_report(&IdeaReportContext {
        concept: "c",
        background: Some("ICU cohort experience"),
        knowledge_base: "kb",
      })
      .unwrap();
    assert!(prompt.contains("ICU cohort experience"));
  }

  #[test]
  fn sql_draft_lists_tables() {
    let templates = PromptTemplates::new();
    let prompt = templates
      .sql_draft(&SqlDraftContext {
        request: "admissions with creatinine > 2.0",
        tables: vec!["admissions", "labs"],
      })
      .unwrap();
    assert!(prompt.contains("- admissions"));
    assert!(prompt.contains("- labs"));
  }

  #[test]
  fn manuscript_section_names_the_section() {
    let templates = PromptTemplates::new();
    let prompt = templates
      .manuscript_section(&ManuscriptSectionContext {
        title: "t",
        journal: "Journal of Clinical Trials",
        findings: "p < 0.05",
        section: "Discussion",
      })
      .unwrap();
    assert!(prompt.contains("'Discussion'"));
    assert!(prompt.contains("Journal of Clinical Trials"));
  }
}
