//! Report types: per-agent, per-document and per-batch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::finding::{Finding, Severity};

/// Identifier of one configured reviewer persona.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentName(String);

impl AgentName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AgentName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl std::fmt::Display for AgentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered findings produced by one agent for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentReport(Vec<Finding>);

impl AgentReport {
    pub fn new(findings: Vec<Finding>) -> Self {
        Self(findings)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// One-element report carrying a synthetic `error` finding.
    pub fn failure(comment: impl Into<String>) -> Self {
        Self(vec![Finding::error(comment)])
    }

    pub fn findings(&self) -> &[Finding] {
        &self.0
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `true` when the report is the single error finding of a failed call.
    pub fn is_failure(&self) -> bool {
        matches!(self.0.as_slice(), [only] if only.severity == Severity::Error)
    }

    pub fn unrecognized_severities(&self) -> usize {
        self.0
            .iter()
            .filter(|f| !f.severity.is_recognized())
            .count()
    }
}

/// Finding counts for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_findings: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub error: usize,
    pub unrecognized: usize,
    /// Agents whose report is a single synthetic error finding.
    pub failed_agents: usize,
}

/// Every configured agent's report for one document, keyed by agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentReport(BTreeMap<AgentName, AgentReport>);

impl DocumentReport {
    pub fn new(reports: BTreeMap<AgentName, AgentReport>) -> Self {
        Self(reports)
    }

    pub fn get(&self, agent: &AgentName) -> Option<&AgentReport> {
        self.0.get(agent)
    }

    pub fn agents(&self) -> impl Iterator<Item = &AgentName> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AgentName, &AgentReport)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary::default();
        for report in self.0.values() {
            if report.is_failure() {
                summary.failed_agents += 1;
            }
            for finding in report.findings() {
                summary.total_findings += 1;
                match finding.severity {
                    Severity::High => summary.high += 1,
                    Severity::Medium => summary.medium += 1,
                    Severity::Low => summary.low += 1,
                    Severity::Error => summary.error += 1,
                    Severity::Unrecognized(_) => summary.unrecognized += 1,
                }
            }
        }
        summary
    }
}

/// Result for one input document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Reviewed {
        document: String,
        review: DocumentReport,
    },
    Failed {
        document: String,
        error: String,
    },
}

impl BatchEntry {
    pub fn document(&self) -> &str {
        match self {
            BatchEntry::Reviewed { document, .. } | BatchEntry::Failed { document, .. } => {
                document
            }
        }
    }

    pub fn review(&self) -> Option<&DocumentReport> {
        match self {
            BatchEntry::Reviewed { review, .. } => Some(review),
            BatchEntry::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, BatchEntry::Failed { .. })
    }
}

/// Counts across a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub documents: usize,
    pub failed_documents: usize,
    pub total_findings: usize,
    pub agent_failures: usize,
}

/// One entry per input document, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            documents: self.entries.len(),
            ..BatchSummary::default()
        };
        for entry in &self.entries {
            match entry.review() {
                Some(review) => {
                    let doc = review.summary();
                    summary.total_findings += doc.total_findings;
                    summary.agent_failures += doc.failed_agents;
                }
                None => summary.failed_documents += 1,
            }
        }
        summary
    }
}
