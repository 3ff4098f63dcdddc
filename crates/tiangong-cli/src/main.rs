//! `tiangong` command-line entry point.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tiangong_agent::WorkspaceAgentBuilder;
use tiangong_core::{init_tracing, LogFormat, Secrets, WorkspaceResponse};
use tiangong_llm::{ChatModelOptions, ModelFactory, ModelPurpose};
use tiangong_research::{
    DifyKnowledgeBaseClient, ResearchProvider, RetryingProvider, SearchOptions,
    TavilySearchClient,
};
use tiangong_skills::{ToolCatalogue, ToolCategory};
use tiangong_workflows::{run_document_workflow, WorkflowConfig, WorkflowKind};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "tiangong",
    version,
    about = "TianGong AI Workspace: document workflows, research and agent tooling"
)]
struct Cli {
    /// Path to the secrets file (default: $TIANGONG_SECRETS or .secrets/secrets.toml)
    #[arg(long, global = true)]
    secrets: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Text)]
    log_format: LogFormatArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the tool catalogue
    Tools {
        #[command(subcommand)]
        action: ToolsAction,
    },
    /// Generate documents
    Docs {
        #[command(subcommand)]
        action: DocsAction,
    },
    /// Internet research through Tavily
    Research {
        #[command(subcommand)]
        action: ResearchAction,
    },
    /// Dify knowledge base retrieval
    Kb {
        #[command(subcommand)]
        action: KbAction,
    },
    /// Workspace agent assembly
    Agent {
        #[command(subcommand)]
        action: AgentAction,
    },
}

#[derive(Subcommand)]
enum ToolsAction {
    /// List catalogue entries
    List {
        /// Only show one category (workflow, integration, agent, runtime)
        #[arg(long)]
        category: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum DocsAction {
    /// Run a document workflow and print the result envelope
    Run {
        /// report, patent_disclosure, plan or project_proposal
        #[arg(long)]
        workflow: String,
        #[arg(long)]
        topic: String,
        #[arg(long)]
        instructions: Option<String>,
        #[arg(long)]
        audience: Option<String>,
        #[arg(long, default_value = "zh")]
        language: String,
        /// Do not run the research step
        #[arg(long)]
        skip_research: bool,
        /// general, deep_research or creative
        #[arg(long, default_value = "general")]
        purpose: String,
        #[arg(long, default_value_t = 0.4)]
        temperature: f32,
        /// Model request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Use this model name instead of the configured one
        #[arg(long)]
        model: Option<String>,
    },
}

#[derive(Subcommand)]
enum ResearchAction {
    /// Search the web
    Search {
        query: String,
        #[arg(long)]
        max_results: Option<u32>,
    },
}

#[derive(Subcommand)]
enum KbAction {
    /// Retrieve knowledge chunks
    Retrieve {
        query: String,
        #[arg(long)]
        top_k: Option<u32>,
    },
}

#[derive(Subcommand)]
enum AgentAction {
    /// Print the assembled agent's prompt, tools and sub-agents
    Describe,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.log_format.into());

    match cli.command {
        Commands::Tools { action } => match action {
            ToolsAction::List { category, json } => list_tools(category.as_deref(), json)?,
        },
        Commands::Docs { action } => match action {
            DocsAction::Run {
                workflow,
                topic,
                instructions,
                audience,
                language,
                skip_research,
                purpose,
                temperature,
                timeout,
                model,
            } => {
                let kind: WorkflowKind = workflow.parse()?;
                let mut builder = WorkflowConfig::builder(kind, topic)
                    .language(language)
                    .include_research(!skip_research);
                if let Some(instructions) = instructions {
                    builder = builder.instructions(instructions);
                }
                if let Some(audience) = audience {
                    builder = builder.audience(audience);
                }
                let config = builder.build()?;

                let secrets = load_secrets(cli.secrets.as_deref())?;
                let options = ChatModelOptions {
                    purpose: purpose.parse::<ModelPurpose>()?,
                    temperature,
                    timeout_secs: timeout,
                    model_override: model,
                };
                let llm = ModelFactory::new(&secrets)?.create_chat_model(&options)?;
                let research = if config.include_research() {
                    research_provider(&secrets)
                } else {
                    None
                };

                let response = match run_document_workflow(&config, &llm, research.as_deref()).await {
                    Ok(result) => WorkspaceResponse::ok(serde_json::to_value(&result)?)
                        .with_message("Document workflow completed")
                        .with_metadata("workflow", serde_json::json!(config.workflow())),
                    Err(e) => WorkspaceResponse::error(e.to_string()),
                };
                emit(response)?;
            }
        },
        Commands::Research { action } => match action {
            ResearchAction::Search { query, max_results } => {
                let secrets = load_secrets(cli.secrets.as_deref())?;
                let provider = RetryingProvider::new(TavilySearchClient::from_secrets(&secrets)?);
                let mut options = SearchOptions::new();
                if let Some(max) = max_results {
                    options.insert("max_results".into(), serde_json::json!(max));
                }
                let options = (!options.is_empty()).then_some(&options);
                let response = match provider.search(&query, options).await {
                    Ok(found) => WorkspaceResponse::ok(serde_json::to_value(found)?),
                    Err(e) => WorkspaceResponse::error(e.to_string()),
                };
                emit(response)?;
            }
        },
        Commands::Kb { action } => match action {
            KbAction::Retrieve { query, top_k } => {
                let secrets = load_secrets(cli.secrets.as_deref())?;
                let client = DifyKnowledgeBaseClient::from_secrets(&secrets)?;
                let response = match client.retrieve(&query, top_k, None).await {
                    Ok(found) => WorkspaceResponse::ok(serde_json::to_value(found)?),
                    Err(e) => WorkspaceResponse::error(e.to_string()),
                };
                emit(response)?;
            }
        },
        Commands::Agent { action } => match action {
            AgentAction::Describe => {
                let secrets = load_secrets(cli.secrets.as_deref())?;
                let agent = WorkspaceAgentBuilder::from_secrets(&secrets)?.build();
                println!("{}", serde_json::to_string_pretty(&agent.describe())?);
            }
        },
    }

    Ok(())
}

fn load_secrets(path: Option<&std::path::Path>) -> anyhow::Result<Secrets> {
    let secrets = match path {
        Some(path) => Secrets::load_from(path)?,
        None => Secrets::load()?,
    };
    Ok(secrets)
}

/// Tavily with retries, or `None` when it is not configured.
fn research_provider(secrets: &Secrets) -> Option<Arc<dyn ResearchProvider>> {
    match TavilySearchClient::from_secrets(secrets) {
        Ok(client) => Some(Arc::new(RetryingProvider::new(client))),
        Err(e) => {
            warn!(error = %e, "Research disabled");
            None
        }
    }
}

/// Print the envelope to stdout; an error envelope also fails the process.
fn emit(response: WorkspaceResponse) -> anyhow::Result<()> {
    let response = response
        .with_request_id(uuid::Uuid::new_v4().to_string())
        .with_timestamp();
    println!("{}", response.to_json_pretty()?);
    if response.is_success() {
        Ok(())
    } else {
        anyhow::bail!(response.message.unwrap_or_default())
    }
}

fn list_tools(category: Option<&str>, json: bool) -> anyhow::Result<()> {
    let catalogue = ToolCatalogue::workspace_default();
    let entries = match category {
        Some(raw) => {
            let category: ToolCategory = raw.parse().map_err(anyhow::Error::msg)?;
            catalogue.by_category(category)
        }
        None => catalogue.list(),
    };
    info!(count = entries.len(), "Listing tools");

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No tools registered.");
        return Ok(());
    }
    println!("Registered tools:");
    for entry in &entries {
        println!("  {} [{}] - {}", entry.name, entry.category, entry.description);
        println!("    entrypoint: {}", entry.entrypoint);
    }
    println!("\nTotal: {} tool(s)", entries.len());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_docs_run_defaults() {
        let cli = Cli::try_parse_from([
            "tiangong", "docs", "run", "--workflow", "report", "--topic", "Battery recycling",
        ])
        .unwrap();
        match cli.command {
            Commands::Docs {
                action:
                    DocsAction::Run {
                        workflow,
                        language,
                        skip_research,
                        purpose,
                        temperature,
                        ..
                    },
            } => {
                assert_eq!(workflow, "report");
                assert_eq!(language, "zh");
                assert!(!skip_research);
                assert_eq!(purpose, "general");
                assert!((temperature - 0.4).abs() < f32::EPSILON);
            }
            _ => panic!("expected docs run"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tiangong", "tools", "list", "--json", "--log-format", "json", "--secrets", "s.toml",
        ])
        .unwrap();
        assert!(matches!(cli.log_format, LogFormatArg::Json));
        assert_eq!(cli.secrets, Some(PathBuf::from("s.toml")));
        assert!(matches!(
            cli.command,
            Commands::Tools {
                action: ToolsAction::List { json: true, category: None }
            }
        ));
    }

    #[test]
    fn test_docs_run_requires_topic() {
        assert!(Cli::try_parse_from(["tiangong", "docs", "run", "--workflow", "plan"]).is_err());
    }

    #[test]
    fn test_kb_retrieve_top_k() {
        let cli =
            Cli::try_parse_from(["tiangong", "kb", "retrieve", "separator", "--top-k", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Kb {
                action: KbAction::Retrieve { top_k: Some(3), .. }
            }
        ));
    }

    #[test]
    fn test_list_tools_rejects_unknown_category() {
        assert!(list_tools(Some("nonsense"), true).is_err());
        assert!(list_tools(Some("workflow"), true).is_ok());
    }

    #[test]
    fn test_emit_fails_on_error_envelope() {
        assert!(emit(WorkspaceResponse::ok(serde_json::json!({"a": 1}))).is_ok());
        let err = emit(WorkspaceResponse::error("Unsupported workflow 'memo'.")).unwrap_err();
        assert!(err.to_string().contains("memo"));
    }

    #[test]
    fn test_missing_tavily_disables_research() {
        assert!(research_provider(&Secrets::default()).is_none());
    }
}
