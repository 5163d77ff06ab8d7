use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::domain::{AgentName, BatchEntry, BatchReport, BatchSummary};
use crate::persona::PersonaRegistry;

/// Version of the persisted batch artifact layout.
pub const BATCH_SCHEMA_VERSION: &str = "1.0";

/// Canonical batch artifact written for downstream tooling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchArtifact {
    pub schema_version: String,
    pub batch_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// SHA-256 of the persona table the batch ran with.
    pub persona_digest: String,
    pub personas: Vec<AgentName>,
    pub summary: BatchSummary,
    pub results: Vec<BatchEntry>,
}

impl BatchArtifact {
    pub fn new(report: BatchReport, personas: &PersonaRegistry) -> Self {
        let summary = report.summary();
        Self {
            schema_version: BATCH_SCHEMA_VERSION.to_string(),
            batch_id: report.batch_id,
            generated_at: Utc::now(),
            persona_digest: personas.digest(),
            personas: personas.names(),
            summary,
            results: report.entries,
        }
    }
}

/// Pretty JSON for stdout.
pub fn render_batch_json(artifact: &BatchArtifact) -> Result<String> {
    serde_json::to_string_pretty(artifact).context("serialize batch artifact")
}

/// Write the batch artifact in pretty JSON format.
pub fn write_batch_artifact_json(path: &Path, artifact: &BatchArtifact) -> Result<()> {
    let content = render_batch_json(artifact)?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DocumentReport;

    fn report() -> BatchReport {
        BatchReport {
            batch_id: Uuid::new_v4(),
            entries: vec![
                BatchEntry::Failed {
                    document: "missing.md".to_string(),
                    error: "document not found: missing.md".to_string(),
                },
                BatchEntry::Reviewed {
                    document: "story.md".to_string(),
                    review: DocumentReport::default(),
                },
            ],
        }
    }

    #[test]
    fn test_artifact_carries_digest_and_summary() {
        let personas = PersonaRegistry::builtin();
        let artifact = BatchArtifact::new(report(), &personas);
        assert_eq!(artifact.schema_version, BATCH_SCHEMA_VERSION);
        assert_eq!(artifact.persona_digest, personas.digest());
        assert_eq!(artifact.personas.len(), 3);
        assert_eq!(artifact.summary.documents, 2);
        assert_eq!(artifact.summary.failed_documents, 1);
        assert_eq!(artifact.results[0].document(), "missing.md");
    }

    #[test]
    fn test_write_and_read_back_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("review.json");
        let artifact = BatchArtifact::new(report(), &PersonaRegistry::builtin());

        write_batch_artifact_json(&path, &artifact).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let back: BatchArtifact = serde_json::from_str(&content).unwrap();
        assert_eq!(back, artifact);
    }

    #[test]
    fn test_write_to_missing_directory_fails_with_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/review.json");
        let artifact = BatchArtifact::new(report(), &PersonaRegistry::builtin());

        let err = write_batch_artifact_json(&path, &artifact).unwrap_err();
        assert!(err.to_string().contains("review.json"));
    }
}
