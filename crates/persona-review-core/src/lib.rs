//! Persona Review Core Library
//!
//! Sends a document to several independently instructed reviewer personas,
//! normalizes each persona's free-form JSON into canonical findings, and
//! merges them into one report per document.

pub mod batch;
pub mod domain;
pub mod normalizer;
pub mod obs;
pub mod orchestration;
pub mod persona;
pub mod reporting;
pub mod source;
pub mod telemetry;

pub use batch::BatchController;

pub use domain::{
    AgentName, AgentReport, BatchEntry, BatchReport, BatchSummary, ConfigError, ConfigResult,
    DocumentReport, Finding, ReportSummary, Severity, SourceError, SourceResult,
};

pub use normalizer::normalize_response;

pub use orchestration::agent_node::{build_request, render_user_content, run_agent_node};
pub use orchestration::graph::{join_agent_outputs, ReviewConfig, ReviewGraph};
pub use orchestration::merge::merge_agent_reports;
pub use orchestration::message::AgentMessage;

pub use persona::{PersonaConfig, PersonaRegistry};

pub use reporting::{
    render_batch_json, write_batch_artifact_json, BatchArtifact, BATCH_SCHEMA_VERSION,
};

pub use source::{DocumentSource, FsDocumentSource, MemoryDocumentSource};

pub use obs::{
    batch_span, document_span, emit_agent_failed, emit_agent_finished, emit_batch_finished,
    emit_batch_started, emit_document_finished, emit_document_started, emit_document_unreadable,
};
pub use telemetry::init_tracing;

/// Persona Review version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
