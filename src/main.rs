use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use i2o_assist::{AssistClient, IdeaReportContext, PromptTemplates};
use i2o_config::AppConfig;
use i2o_inquiry::{HttpTransport, InquiryClient, InquiryConfig, InquiryOutcome};
use i2o_project::{
  AiReport, EthicsStatus, ProjectStore, ResearchIdea, ResearchProject, User, UserRole,
};

/// Knowledge base context handed to idea assessment, standing in for the
/// institutional literature index.
const KNOWLEDGE_BASE_CONTEXT: &str =
  "Simulated PubMed API providing summaries of relevant medical literature. \
   Simulated institutional research guidelines for proposal development and ethics.";

/// i2o - Clinical research accelerator
#[derive(Parser)]
#[command(name = "i2o")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.i2o)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Ask the literature service a question and wait for the answer
  Ask {
    /// The question to submit
    question: String,
  },

  /// Manage the current research project
  Project {
    #[command(subcommand)]
    action: ProjectAction,
  },

  /// Generate an AI assessment of the project's research concept
  Refine {
    /// The research concept to assess
    #[arg(long)]
    concept: String,

    /// Clinical background from the project lead
    #[arg(long)]
    background: Option<String>,
  },
}

#[derive(Subcommand)]
enum ProjectAction {
  /// Start a new project, replacing any current one
  New {
    /// Project title
    #[arg(long)]
    title: String,

    /// Name of the healthcare professional leading the project
    #[arg(long)]
    lead: String,
  },

  /// Print the current project as JSON
  Show,

  /// Assign an expert to the project
  Assign {
    #[arg(long)]
    role: ExpertRole,

    #[arg(long)]
    user_id: String,
  },

  /// Record an ethics review transition
  Ethics {
    #[command(subcommand)]
    action: EthicsAction,
  },

  /// Advance the project to the next stage
  Advance,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExpertRole {
  Researcher,
  Statistician,
  DataEngineer,
}

impl From<ExpertRole> for UserRole {
  fn from(role: ExpertRole) -> Self {
    match role {
      ExpertRole::Researcher => UserRole::Researcher,
      ExpertRole::Statistician => UserRole::Statistician,
      ExpertRole::DataEngineer => UserRole::DataEngineer,
    }
  }
}

#[derive(Subcommand)]
enum EthicsAction {
  /// Submit the proposal for ethics review
  Submit,
  /// Record reviewer feedback
  Feedback {
    #[arg(long)]
    note: String,
  },
  /// Approve the proposal
  Approve,
  /// Reject the proposal
  Reject {
    #[arg(long)]
    note: String,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let data_dir = cli.data_dir.unwrap_or_else(|| {
    dirs::home_dir()
      .expect("could not determine home directory")
      .join(".i2o")
  });

  let Some(command) = cli.command else {
    println!("i2o - use --help to see available commands");
    return Ok(());
  };

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async {
    match command {
      Commands::Ask { question } => run_ask(question, data_dir).await,
      Commands::Project { action } => run_project(action, data_dir).await,
      Commands::Refine {
        concept,
        background,
      } => run_refine(concept, background, data_dir).await,
    }
  })
}

async fn run_ask(question: String, data_dir: PathBuf) -> Result<()> {
  let config = load_config(&data_dir)?;
  let endpoint = config.inquiry.endpoint()?;

  let client = InquiryClient::new(
    HttpTransport::new(endpoint),
    InquiryConfig {
      poll_interval: Duration::from_millis(config.inquiry.poll_interval_ms),
      max_attempts: config.inquiry.max_poll_attempts,
    },
  );

  let pending = client
    .submit(&question)
    .await
    .context("failed to submit question")?;
  eprintln!("Submitted task {}", pending.task_id());

  // Ctrl-C withdraws interest instead of killing the process mid-poll.
  let cancel: CancellationToken = pending.cancellation_token();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      cancel.cancel();
    }
  });

  match pending.wait().await {
    InquiryOutcome::Answered(answer) => {
      println!("{answer}");
      Ok(())
    }
    InquiryOutcome::Failed(err) => Err(err).context("inquiry failed"),
    InquiryOutcome::Cancelled => {
      eprintln!("Cancelled.");
      Ok(())
    }
  }
}

async fn run_project(action: ProjectAction, data_dir: PathBuf) -> Result<()> {
  match action {
    ProjectAction::New { title, lead } => {
      let mut store = ProjectStore::new();
      store.start_project(
        title,
        User {
          id: uuid::Uuid::new_v4().to_string(),
          name: lead,
          role: UserRole::Hcp,
        },
      )?;
      save_project(&store, &data_dir).await?;
      let project = store.current().expect("project was just started");
      eprintln!("Started project '{}' ({})", project.title, project.id);
      Ok(())
    }
    ProjectAction::Show => {
      let store = load_store(&data_dir).await?;
      let project = store.current().context("no current project")?;
      println!("{}", serde_json::to_string_pretty(project)?);
      Ok(())
    }
    ProjectAction::Assign { role, user_id } => {
      let mut store = load_store(&data_dir).await?;
      store.assign_expert(role.into(), user_id.as_str())?;
      save_project(&store, &data_dir).await?;
      eprintln!("Assigned {user_id}");
      Ok(())
    }
    ProjectAction::Ethics { action } => {
      let mut store = load_store(&data_dir).await?;
      let (status, feedback) = match action {
        EthicsAction::Submit => (EthicsStatus::Submitted, None),
        EthicsAction::Feedback { note } => (EthicsStatus::FeedbackReceived, Some(note)),
        EthicsAction::Approve => (
          EthicsStatus::Approved,
          Some("Proposal approved by the ethics committee.".to_string()),
        ),
        EthicsAction::Reject { note } => (EthicsStatus::Rejected, Some(note)),
      };
      store.set_ethics_status(status, feedback)?;
      save_project(&store, &data_dir).await?;
      eprintln!("Ethics status recorded");
      Ok(())
    }
    ProjectAction::Advance => {
      let mut store = load_store(&data_dir).await?;
      let stage = store.advance_stage()?;
      save_project(&store, &data_dir).await?;
      eprintln!("Advanced to: {}", stage.label());
      Ok(())
    }
  }
}

async fn run_refine(
  concept: String,
  background: Option<String>,
  data_dir: PathBuf,
) -> Result<()> {
  let config = load_config(&data_dir)?;
  let assist = AssistClient::new(
    &config.assist.base_url,
    &config.assist.model,
    config.assist.resolve_api_key(),
  )?;

  let mut store = load_store(&data_dir).await?;
  if store.current().is_none() {
    bail!("no current project; run `i2o project new` first");
  }

  let templates = PromptTemplates::new();
  let prompt = templates.idea_report(&IdeaReportContext {
    concept: &concept,
    background: background.as_deref(),
    knowledge_base: KNOWLEDGE_BASE_CONTEXT,
  })?;

  eprintln!("Assessing concept...");
  let reply = assist
    .generate_json(
      &prompt,
      Some("You are an assistant specialized in clinical research ideation."),
    )
    .await
    .context("idea assessment failed")?;

  let novelty = read_score(&reply, "novelty_score");
  let similarity = read_score(&reply, "similarity_score");
  let report = AiReport {
    literature_summary: read_text(&reply, "literature_summary"),
    research_gaps: read_text(&reply, "research_gaps"),
    feasibility_assessment: read_text(&reply, "feasibility_assessment"),
    novelty_rating: Some(novelty_rating(novelty).to_string()),
    similarity_rating: Some(similarity_rating(similarity).to_string()),
    suggestions: reply
      .get("suggestions")
      .and_then(Value::as_str)
      .map(str::to_string),
  };

  store.set_idea(ResearchIdea {
    concept,
    background,
    ..ResearchIdea::default()
  })?;
  store.record_idea_report(report, novelty, similarity)?;
  let novel = store.mark_idea_validated()?;
  save_project(&store, &data_dir).await?;

  eprintln!(
    "Novelty {novelty}/100, similarity {similarity}/100 - {}",
    if novel {
      "concept cleared the novelty floor"
    } else {
      "concept is below the novelty floor"
    }
  );
  Ok(())
}

fn read_text(reply: &Value, field: &str) -> String {
  reply
    .get(field)
    .and_then(Value::as_str)
    .unwrap_or_default()
    .to_string()
}

fn read_score(reply: &Value, field: &str) -> u8 {
  reply
    .get(field)
    .and_then(Value::as_f64)
    .unwrap_or(0.0)
    .clamp(0.0, 100.0) as u8
}

fn novelty_rating(score: u8) -> &'static str {
  match score {
    81.. => "High",
    61..=80 => "Medium",
    _ => "Low",
  }
}

fn similarity_rating(score: u8) -> &'static str {
  match score {
    0..=29 => "Low (Unique)",
    30..=59 => "Medium",
    _ => "High (Similar)",
  }
}

fn load_config(data_dir: &std::path::Path) -> Result<AppConfig> {
  let path = data_dir.join("config.json");
  AppConfig::load_or_default(&path)
    .with_context(|| format!("failed to load config: {}", path.display()))
}

async fn load_store(data_dir: &std::path::Path) -> Result<ProjectStore> {
  let path = data_dir.join("project.json");
  let mut store = ProjectStore::new();

  if path.exists() {
    let content = tokio::fs::read_to_string(&path)
      .await
      .with_context(|| format!("failed to read project file: {}", path.display()))?;
    let project: ResearchProject = serde_json::from_str(&content)
      .with_context(|| format!("failed to parse project file: {}", path.display()))?;
    store.load(project);
  }

  Ok(store)
}

async fn save_project(store: &ProjectStore, data_dir: &std::path::Path) -> Result<()> {
  let project = store.current().context("no project to save")?;

  tokio::fs::create_dir_all(data_dir)
    .await
    .with_context(|| format!("failed to create data dir: {}", data_dir.display()))?;

  let path = data_dir.join("project.json");
  let json = serde_json::to_string_pretty(project)?;
  tokio::fs::write(&path, json)
    .await
    .with_context(|| format!("failed to write project file: {}", path.display()))?;

  Ok(())
}
