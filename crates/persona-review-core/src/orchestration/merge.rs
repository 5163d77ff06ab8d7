//! Supervisor merge of per-agent reports into one document report.
//!
//! The merge is deliberately a copy: no cross-agent deduplication, no
//! reordering, no severity re-weighting. Every finding stays attributable
//! to the agent that produced it. The only thing the supervisor adds is a
//! warning when an agent used severities outside the known set.

use std::collections::BTreeMap;

use tracing::warn;

use crate::domain::{AgentName, AgentReport, DocumentReport};

/// Assemble the joined per-agent reports into a [`DocumentReport`].
pub fn merge_agent_reports(reports: BTreeMap<AgentName, AgentReport>) -> DocumentReport {
    for (agent, report) in &reports {
        let suspicious = report.unrecognized_severities();
        if suspicious > 0 {
            warn!(
                agent = %agent,
                suspicious,
                "Agent reported findings with unrecognized severity"
            );
        }
    }
    DocumentReport::new(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Finding, Severity};
    use crate::normalizer::normalize_response;
    use tracing_test::traced_test;

    fn reports() -> BTreeMap<AgentName, AgentReport> {
        let mut map = BTreeMap::new();
        map.insert(
            AgentName::from("engineer"),
            AgentReport::new(vec![
                Finding::new(Severity::Low, "second", Some(9)),
                Finding::new(Severity::High, "first", Some(1)),
            ]),
        );
        map.insert(
            AgentName::from("pdm"),
            AgentReport::new(vec![Finding::new(Severity::High, "first", Some(1))]),
        );
        map.insert(AgentName::from("architect"), AgentReport::empty());
        map
    }

    #[test]
    fn test_merge_copies_reports_verbatim() {
        let input = reports();
        let merged = merge_agent_reports(input.clone());
        assert_eq!(merged.len(), 3);
        for (agent, report) in &input {
            assert_eq!(merged.get(agent), Some(report));
        }
    }

    #[test]
    fn test_merge_keeps_duplicates_across_agents() {
        let merged = merge_agent_reports(reports());
        assert_eq!(merged.summary().total_findings, 3);
    }

    #[test]
    fn test_merge_keeps_empty_reports() {
        let merged = merge_agent_reports(reports());
        assert!(merged
            .get(&AgentName::from("architect"))
            .is_some_and(|r| r.is_empty()));
    }

    #[test]
    fn test_merge_preserves_unrecognized_severity() {
        let mut map = BTreeMap::new();
        map.insert(
            AgentName::from("engineer"),
            AgentReport::new(vec![Finding::new(Severity::parse("showstopper"), "c", None)]),
        );
        let merged = merge_agent_reports(map);
        let report = merged.get(&AgentName::from("engineer")).unwrap();
        assert_eq!(report.findings()[0].severity.as_str(), "showstopper");
    }

    #[traced_test]
    #[test]
    fn test_agent_written_error_is_flagged_not_counted_as_failure() {
        let engineer = AgentName::from("engineer");
        let mut map = BTreeMap::new();
        map.insert(
            engineer.clone(),
            normalize_response(
                &engineer,
                r#"[{"severity":"error","comment":"the story is an error"}]"#,
            ),
        );
        map.insert(
            AgentName::from("pdm"),
            AgentReport::failure("Generation call failed for agent pdm"),
        );

        let merged = merge_agent_reports(map);
        let summary = merged.summary();
        assert_eq!(summary.failed_agents, 1);
        assert_eq!(summary.unrecognized, 1);
        assert!(!merged.get(&engineer).unwrap().is_failure());
        assert!(logs_contain("unrecognized severity"));
    }
}
