//! The canonical finding shape every agent response is coerced into.

use serde::{Deserialize, Serialize};

/// How serious a finding is.
///
/// `Error` is reserved for findings the pipeline synthesizes when an agent
/// call fails. Values outside the known set are carried verbatim in
/// `Unrecognized` so the supervisor can flag them without losing data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    High,
    Medium,
    Low,
    Error,
    Unrecognized(String),
}

impl Severity {
    /// Exact, case-sensitive match against the known values.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            "error" => Severity::Error,
            other => Severity::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Error => "error",
            Severity::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Severity::Unrecognized(_))
    }
}

impl From<String> for Severity {
    fn from(raw: String) -> Self {
        Severity::parse(&raw)
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.as_str().to_string()
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One reviewer remark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    /// Never empty.
    pub comment: String,
    /// 1-based line the remark refers to, when the agent could localize it.
    #[serde(default)]
    pub line: Option<u32>,
}

impl Finding {
    pub fn new(severity: Severity, comment: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            severity,
            comment: comment.into(),
            line,
        }
    }

    /// Synthetic finding describing a pipeline failure.
    pub fn error(comment: impl Into<String>) -> Self {
        Self::new(Severity::Error, comment, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_parse_is_exact() {
        assert_eq!(Severity::parse("high"), Severity::High);
        assert_eq!(Severity::parse("error"), Severity::Error);
        assert_eq!(
            Severity::parse("High"),
            Severity::Unrecognized("High".to_string())
        );
        assert_eq!(
            Severity::parse("critical"),
            Severity::Unrecognized("critical".to_string())
        );
    }

    #[test]
    fn test_unrecognized_severity_serializes_verbatim() {
        let finding = Finding::new(Severity::parse("blocker"), "c", Some(4));
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"severity": "blocker", "comment": "c", "line": 4})
        );
    }

    #[test]
    fn test_missing_line_serializes_as_null() {
        let json = serde_json::to_value(Finding::error("boom")).unwrap();
        assert_eq!(json["severity"], "error");
        assert!(json["line"].is_null());
    }

    #[test]
    fn test_finding_deserializes_without_line() {
        let finding: Finding =
            serde_json::from_str(r#"{"severity":"low","comment":"y"}"#).unwrap();
        assert_eq!(finding, Finding::new(Severity::Low, "y", None));
    }
}
