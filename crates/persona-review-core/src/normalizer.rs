//! Best-effort coercion of raw agent text into an [`AgentReport`].
//!
//! Generative output only probabilistically follows the requested format, so
//! nothing here rejects a whole response because one element is off. The
//! response is matched against an ordered list of document shapes, and each
//! array element against an ordered list of element shapes; the first matcher
//! that recognizes its input wins. Supporting a new tolerated shape means
//! adding an entry to one of the two tables.
//!
//! Document shapes, in priority order:
//! 1. array of elements
//! 2. single object, treated as a one-element array
//!
//! Element shapes, in priority order:
//! 1. flat finding: object with both `severity` and `comment`
//! 2. wrapper: object whose `issues` is an array of flat findings (one level)

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::{AgentName, AgentReport, Finding, Severity};

/// Returns `None` when the value is not this matcher's shape.
type ShapeMatcher = fn(&Value, &AgentName) -> Option<Vec<Finding>>;

const DOCUMENT_SHAPES: &[(&str, ShapeMatcher)] =
    &[("array", match_array), ("object", match_single_object)];

const ELEMENT_SHAPES: &[(&str, ShapeMatcher)] = &[
    ("finding", match_flat_finding),
    ("issues_wrapper", match_issues_wrapper),
];

/// Coerce one agent's raw response into findings. Never fails.
pub fn normalize_response(agent: &AgentName, raw: &str) -> AgentReport {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        warn!(agent = %agent, "Agent returned an empty response");
        return AgentReport::empty();
    }

    let value: Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(e) => {
            warn!(
                agent = %agent,
                error = %e,
                preview = %preview(trimmed),
                "Agent response is not valid JSON"
            );
            return AgentReport::empty();
        }
    };

    for (shape, matcher) in DOCUMENT_SHAPES {
        if let Some(findings) = matcher(&value, agent) {
            debug!(agent = %agent, shape, findings = findings.len(), "Normalized agent response");
            return AgentReport::new(findings);
        }
    }

    warn!(
        agent = %agent,
        preview = %preview(trimmed),
        "Agent response JSON matches no known shape"
    );
    AgentReport::empty()
}

fn match_array(value: &Value, agent: &AgentName) -> Option<Vec<Finding>> {
    let items = value.as_array()?;
    Some(extract_elements(items, agent))
}

fn match_single_object(value: &Value, agent: &AgentName) -> Option<Vec<Finding>> {
    if !value.is_object() {
        return None;
    }
    Some(extract_elements(std::slice::from_ref(value), agent))
}

fn extract_elements(items: &[Value], agent: &AgentName) -> Vec<Finding> {
    let mut findings = Vec::new();
    'elements: for (position, item) in items.iter().enumerate() {
        for (_, matcher) in ELEMENT_SHAPES {
            if let Some(found) = matcher(item, agent) {
                findings.extend(found);
                continue 'elements;
            }
        }
        warn!(
            agent = %agent,
            position,
            element = %preview(&item.to_string()),
            "Skipping response element with unrecognized shape"
        );
    }
    findings
}

fn match_flat_finding(value: &Value, agent: &AgentName) -> Option<Vec<Finding>> {
    let object = value.as_object()?;
    if !(object.contains_key("severity") && object.contains_key("comment")) {
        return None;
    }
    Some(coerce_finding(object, agent).into_iter().collect())
}

fn match_issues_wrapper(value: &Value, agent: &AgentName) -> Option<Vec<Finding>> {
    let members = value.as_object()?.get("issues")?.as_array()?;
    let mut findings = Vec::with_capacity(members.len());
    for (position, member) in members.iter().enumerate() {
        match match_flat_finding(member, agent) {
            Some(found) => findings.extend(found),
            None => warn!(
                agent = %agent,
                position,
                element = %preview(&member.to_string()),
                "Skipping nested issue with unrecognized shape"
            ),
        }
    }
    Some(findings)
}

/// Build a finding from an object known to carry `severity` and `comment`.
fn coerce_finding(object: &Map<String, Value>, agent: &AgentName) -> Option<Finding> {
    let severity = match object.get("severity") {
        Some(Value::String(s)) => agent_severity(s),
        Some(other) => Severity::Unrecognized(other.to_string()),
        None => return None,
    };

    let comment = match object.get("comment") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    if comment.is_empty() {
        warn!(agent = %agent, "Skipping finding with empty comment");
        return None;
    }

    let line = object.get("line").and_then(|v| coerce_line(v, agent));

    Some(Finding::new(severity, comment, line))
}

/// `error` belongs to failures synthesized by the agent node, so an agent
/// that writes it gets an unrecognized severity instead.
fn agent_severity(raw: &str) -> Severity {
    match Severity::parse(raw) {
        Severity::Error => Severity::Unrecognized(raw.to_string()),
        severity => severity,
    }
}

/// Positive integers (or integer-valued numbers/strings) only.
fn coerce_line(value: &Value, agent: &AgentName) -> Option<u32> {
    let line = match value {
        Value::Null => return None,
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 1.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    match line.and_then(|l| u32::try_from(l).ok()).filter(|l| *l > 0) {
        Some(l) => Some(l),
        None => {
            debug!(agent = %agent, line = %value, "Discarding unusable line value");
            None
        }
    }
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 120;
    match text.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
