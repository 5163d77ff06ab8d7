//! Persona Review CLI
//!
//! The `persona-review` command sends each document to every configured
//! reviewer persona and prints one merged JSON report for the whole batch.
//!
//! Per-document problems (unreadable files, failed generation calls) are
//! reported inside the JSON; the process only exits non-zero for startup
//! faults and output write failures.

use anyhow::{Context, Result};
use clap::Parser;
use generation_client::{OpenAiBackend, OpenAiConfig};
use persona_review_core::{
    render_batch_json, write_batch_artifact_json, BatchArtifact, BatchController,
    FsDocumentSource, PersonaConfig, PersonaRegistry, ReviewConfig, ReviewGraph,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};

#[derive(Parser, Debug)]
#[command(name = "persona-review")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Multi-persona document reviewer", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json_logs: bool,

    /// TOML file with [[persona]] tables (default: built-in reviewers)
    #[arg(long, value_name = "FILE")]
    personas: Option<PathBuf>,

    /// Model identifier sent to the backend
    #[arg(long, env = "PERSONA_REVIEW_MODEL")]
    model: Option<String>,

    /// API root of the OpenAI-compatible backend
    #[arg(long, env = "OPENAI_BASE_URL")]
    base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "PERSONA_REVIEW_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Maximum generation calls in flight per document
    #[arg(long)]
    max_concurrent_agents: Option<usize>,

    /// Documents reviewed at once
    #[arg(long, default_value_t = 1)]
    document_concurrency: usize,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the active persona table and exit
    #[arg(long)]
    list_personas: bool,

    /// Document paths to review
    #[arg(required_unless_present = "list_personas")]
    documents: Vec<String>,
}

impl Cli {
    fn backend_config(&self) -> OpenAiConfig {
        let mut config = OpenAiConfig::from_env();
        if let Some(model) = &self.model {
            config = config.with_model(model);
        }
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url);
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config = config.with_timeout_secs(timeout_secs);
        }
        config
    }

    fn review_config(&self) -> ReviewConfig {
        ReviewConfig {
            max_concurrent_agents: self.max_concurrent_agents,
            document_concurrency: self.document_concurrency,
        }
    }
}

fn load_personas(path: Option<&PathBuf>) -> Result<PersonaRegistry> {
    match path {
        Some(path) => PersonaRegistry::load(path)
            .with_context(|| format!("Failed to load persona table from {:?}", path)),
        None => Ok(PersonaRegistry::builtin()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    persona_review_core::init_tracing(cli.json_logs, level);

    let registry = Arc::new(load_personas(cli.personas.as_ref())?);

    if cli.list_personas {
        let personas: Vec<&PersonaConfig> = registry.iter().collect();
        println!("{}", serde_json::to_string_pretty(&personas)?);
        return Ok(());
    }

    let backend_config = cli.backend_config();
    if backend_config.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; every agent call will fail");
    }
    let backend = OpenAiBackend::new(backend_config).context("Failed to create backend")?;

    let graph = ReviewGraph::new(Arc::clone(&registry), Arc::new(backend), cli.review_config())
        .context("Invalid review configuration")?;
    let controller = BatchController::new(graph, Arc::new(FsDocumentSource::new()));

    let report = controller.process_batch(&cli.documents).await;
    let artifact = BatchArtifact::new(report, &registry);

    info!(
        documents = artifact.summary.documents,
        failed_documents = artifact.summary.failed_documents,
        findings = artifact.summary.total_findings,
        agent_failures = artifact.summary.agent_failures,
        "Review complete"
    );

    match &cli.output {
        Some(path) => {
            write_batch_artifact_json(path, &artifact)?;
            info!("Wrote report to {:?}", path);
        }
        None => println!("{}", render_batch_json(&artifact)?),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_documents_are_required_unless_listing() {
        assert!(Cli::try_parse_from(["persona-review"]).is_err());
        let cli = Cli::try_parse_from(["persona-review", "--list-personas"]).unwrap();
        assert!(cli.list_personas);
        assert!(cli.documents.is_empty());
    }

    #[test]
    fn test_flags_flow_into_configs() {
        let cli = Cli::try_parse_from([
            "persona-review",
            "--model",
            "local-model",
            "--base-url",
            "http://localhost:8080/v1/",
            "--timeout-secs",
            "5",
            "--max-concurrent-agents",
            "2",
            "--document-concurrency",
            "3",
            "a.md",
            "b.md",
        ])
        .unwrap();

        let backend = cli.backend_config();
        assert_eq!(backend.model, "local-model");
        assert_eq!(backend.base_url, "http://localhost:8080/v1");
        assert_eq!(backend.timeout_secs, 5);

        let review = cli.review_config();
        assert_eq!(review.max_concurrent_agents, Some(2));
        assert_eq!(review.document_concurrency, 3);
        assert_eq!(cli.documents, vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_missing_persona_file_is_fatal() {
        let missing = PathBuf::from("/definitely/not/here/personas.toml");
        let err = load_personas(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("persona table"));
    }

    #[test]
    fn test_default_personas_are_builtin() {
        assert_eq!(load_personas(None).unwrap(), PersonaRegistry::builtin());
    }
}
