//! Domain models for Persona Review.
//!
//! Canonical definitions for the core entities:
//! - `Finding`: one reviewer remark
//! - `AgentReport`: findings from one agent for one document
//! - `DocumentReport`: every agent's report for one document
//! - `BatchReport`: one entry per input document

pub mod error;
pub mod finding;
pub mod report;

// Re-export main types and errors
pub use error::{ConfigError, ConfigResult, SourceError, SourceResult};
pub use finding::{Finding, Severity};
pub use report::{
    AgentName, AgentReport, BatchEntry, BatchReport, BatchSummary, DocumentReport, ReportSummary,
};
