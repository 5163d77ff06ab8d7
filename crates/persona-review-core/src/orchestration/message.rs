//! Messages flowing through the review graph.

use std::sync::Arc;

use crate::domain::{AgentName, AgentReport, DocumentReport};

/// One step of a document run, in the order the graph produced it.
///
/// A complete transcript is `Start`, one `AgentOutput` per agent that
/// produced a result (persona configuration order, whatever order the
/// calls finished in), then `Supervisor`.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentMessage {
    Start { document: Arc<str> },
    AgentOutput { agent: AgentName, report: AgentReport },
    Supervisor { report: DocumentReport },
}

impl AgentMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            AgentMessage::Start { .. } => "start",
            AgentMessage::AgentOutput { .. } => "agent_output",
            AgentMessage::Supervisor { .. } => "supervisor",
        }
    }
}
