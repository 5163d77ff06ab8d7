//! Fan-out/join review graph.
//!
//! `Start` → one task per configured persona → join barrier → supervisor.
//! Each persona runs in its own tokio task with its own copy of the
//! persona config and a shared read-only handle to the document. Tasks never
//! observe one another; the join waits for every task before the supervisor
//! runs. A semaphore caps how many generation calls are in flight at once.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use generation_client::GenerationBackend;
use tokio::sync::Semaphore;
use tracing::{instrument, warn, Instrument};

use crate::domain::{AgentName, AgentReport, ConfigError, ConfigResult, DocumentReport};
use crate::orchestration::agent_node::run_agent_node;
use crate::orchestration::merge::merge_agent_reports;
use crate::orchestration::message::AgentMessage;
use crate::persona::PersonaRegistry;

/// Concurrency knobs for a review run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewConfig {
    /// Maximum generation calls in flight per document. `None` runs every
    /// persona at once.
    pub max_concurrent_agents: Option<usize>,
    /// Documents reviewed at once by the batch controller.
    pub document_concurrency: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            max_concurrent_agents: None,
            document_concurrency: 1,
        }
    }
}

impl ReviewConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_concurrent_agents == Some(0) {
            return Err(ConfigError::InvalidConcurrency {
                field: "max_concurrent_agents",
            });
        }
        if self.document_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency {
                field: "document_concurrency",
            });
        }
        Ok(())
    }
}

/// The compiled review graph for a fixed persona set and backend.
#[derive(Clone)]
pub struct ReviewGraph {
    personas: Arc<PersonaRegistry>,
    backend: Arc<dyn GenerationBackend>,
    config: ReviewConfig,
}

impl ReviewGraph {
    pub fn new(
        personas: Arc<PersonaRegistry>,
        backend: Arc<dyn GenerationBackend>,
        config: ReviewConfig,
    ) -> ConfigResult<Self> {
        config.validate()?;
        if personas.is_empty() {
            return Err(ConfigError::EmptyPersonaSet);
        }
        Ok(Self {
            personas,
            backend,
            config,
        })
    }

    pub fn personas(&self) -> &PersonaRegistry {
        &self.personas
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    /// Review one document and return the supervisor's report.
    pub async fn run(&self, document: &str) -> DocumentReport {
        let (_, report) = self.execute(document).await;
        report
    }

    /// Review one document and return every message the graph produced.
    pub async fn run_transcript(&self, document: &str) -> Vec<AgentMessage> {
        let (mut transcript, report) = self.execute(document).await;
        transcript.push(AgentMessage::Supervisor { report });
        transcript
    }

    #[instrument(skip_all, fields(agents = self.personas.len()))]
    async fn execute(&self, document: &str) -> (Vec<AgentMessage>, DocumentReport) {
        let document: Arc<str> = Arc::from(document);
        let mut transcript = vec![AgentMessage::Start {
            document: Arc::clone(&document),
        }];

        transcript.extend(self.fan_out(document).await);

        let joined = join_agent_outputs(&self.personas.names(), &transcript);
        (transcript, merge_agent_reports(joined))
    }

    async fn fan_out(&self, document: Arc<str>) -> Vec<AgentMessage> {
        let permits = self
            .config
            .max_concurrent_agents
            .unwrap_or(self.personas.len());
        let sem = Arc::new(Semaphore::new(permits));

        let mut tasks = Vec::with_capacity(self.personas.len());
        for persona in self.personas.iter() {
            let persona = persona.clone();
            let agent = persona.name.clone();
            let backend = Arc::clone(&self.backend);
            let document = Arc::clone(&document);
            let sem = Arc::clone(&sem);

            let task = tokio::spawn(
                async move {
                    let _permit = sem.acquire_owned().await.ok();
                    let agent = persona.name.clone();
                    let report = run_agent_node(persona, backend, document).await;
                    AgentMessage::AgentOutput { agent, report }
                }
                .in_current_span(),
            );
            tasks.push((agent, task));
        }

        // Barrier: every task is awaited before the join runs.
        let mut outputs = Vec::with_capacity(tasks.len());
        for (agent, task) in tasks {
            match task.await {
                Ok(message) => outputs.push(message),
                Err(e) => warn!(agent = %agent, error = %e, "Agent task produced no result"),
            }
        }
        outputs
    }
}

/// Collect one report per configured agent from a message log.
///
/// Agents with no `AgentOutput` get an empty report. Outputs from agents
/// outside the configured set, and repeats after the first, are dropped.
pub fn join_agent_outputs(
    configured: &[AgentName],
    messages: &[AgentMessage],
) -> BTreeMap<AgentName, AgentReport> {
    let known: HashSet<&AgentName> = configured.iter().collect();
    let mut joined = BTreeMap::new();

    for message in messages {
        let AgentMessage::AgentOutput { agent, report } = message else {
            continue;
        };
        if !known.contains(agent) {
            warn!(agent = %agent, "Dropping output from unconfigured agent");
            continue;
        }
        if joined.contains_key(agent) {
            warn!(agent = %agent, "Dropping repeated output for agent");
            continue;
        }
        joined.insert(agent.clone(), report.clone());
    }

    for agent in configured {
        if !joined.contains_key(agent) {
            warn!(agent = %agent, "No output from agent; substituting empty report");
            joined.insert(agent.clone(), AgentReport::empty());
        }
    }

    joined
}
