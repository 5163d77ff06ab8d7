//! Structured observability hooks for review lifecycle events.
//!
//! This module provides:
//! - Batch- and document-scoped spans for use with `tracing::Instrument`
//! - Emission functions for key lifecycle events: batch start/finish,
//!   document start/finish/unreadable, agent finish/failure
//!
//! Events are emitted at `info!` level, failures at `warn!`.
//! Verbosity is controlled via `RUST_LOG`; see [`crate::telemetry`].

use tracing::{info, warn, Span};

/// Span tagged with the batch id.
pub fn batch_span(batch_id: &str) -> Span {
    tracing::info_span!("review.batch", batch_id = %batch_id)
}

/// Span tagged with the document identifier.
pub fn document_span(document: &str) -> Span {
    tracing::info_span!("review.document", document = %document)
}

pub fn emit_batch_started(batch_id: &str, documents: usize, personas: usize) {
    info!(
        event = "batch.started",
        batch_id = %batch_id,
        documents = documents,
        personas = personas,
    );
}

pub fn emit_batch_finished(batch_id: &str, documents: usize, failed_documents: usize, duration_ms: u64) {
    info!(
        event = "batch.finished",
        batch_id = %batch_id,
        documents = documents,
        failed_documents = failed_documents,
        duration_ms = duration_ms,
    );
}

pub fn emit_document_started(document: &str, agents: usize) {
    info!(event = "document.started", document = %document, agents = agents);
}

/// Emit event: document reviewed, with finding totals.
pub fn emit_document_finished(document: &str, findings: usize, failed_agents: usize, duration_ms: u64) {
    info!(
        event = "document.finished",
        document = %document,
        findings = findings,
        failed_agents = failed_agents,
        duration_ms = duration_ms,
    );
}

/// Emit event: document could not be resolved (warning level).
pub fn emit_document_unreadable(document: &str, error: &dyn std::fmt::Display) {
    warn!(event = "document.unreadable", document = %document, error = %error);
}

pub fn emit_agent_finished(agent: &str, findings: usize, duration_ms: u64) {
    info!(
        event = "agent.finished",
        agent = %agent,
        findings = findings,
        duration_ms = duration_ms,
    );
}

/// Emit event: generation call failed (warning level).
pub fn emit_agent_failed(agent: &str, error: &dyn std::fmt::Display) {
    warn!(event = "agent.failed", agent = %agent, error = %error);
}
