//! One persona run: build the request, call the backend once, normalize.

use std::sync::Arc;
use std::time::Instant;

use generation_client::{GenerationBackend, GenerationRequest};
use tracing::{instrument, warn};

use crate::domain::AgentReport;
use crate::normalizer::normalize_response;
use crate::obs::{emit_agent_failed, emit_agent_finished};
use crate::persona::PersonaConfig;

/// Wrap the document for the user message. The document text is inserted
/// verbatim.
pub fn render_user_content(document: &str) -> String {
    format!("--- Target document ---\n{document}\n\n### Respond with the requested JSON only ###")
}

pub fn build_request(persona: &PersonaConfig, document: &str) -> GenerationRequest {
    GenerationRequest::new(
        persona.instruction.clone(),
        render_user_content(document),
        persona.params(),
    )
}

/// Run one persona against one document.
///
/// Invocation failures are contained: they come back as a one-element
/// report holding an `error` finding, never as an `Err`.
#[instrument(skip_all, fields(agent = %persona.name))]
pub async fn run_agent_node(
    persona: PersonaConfig,
    backend: Arc<dyn GenerationBackend>,
    document: Arc<str>,
) -> AgentReport {
    if document.trim().is_empty() {
        warn!(agent = %persona.name, "Document is blank; skipping generation call");
        return AgentReport::empty();
    }

    let started = Instant::now();
    let request = build_request(&persona, &document);

    match backend.invoke(&request).await {
        Ok(raw) => {
            let report = normalize_response(&persona.name, &raw);
            emit_agent_finished(
                persona.name.as_str(),
                report.len(),
                started.elapsed().as_millis() as u64,
            );
            report
        }
        Err(e) => {
            emit_agent_failed(persona.name.as_str(), &e);
            AgentReport::failure(format!(
                "Generation call failed for agent {} via {}: {}",
                persona.name,
                backend.name(),
                e
            ))
        }
    }
}
