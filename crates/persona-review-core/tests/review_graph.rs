//! Review graph fan-out/join tests.
//!
//! Exercises the full persona fan-out → join → supervisor path against
//! scripted generation backends.

use std::sync::Arc;
use std::time::Duration;

use generation_client::fakes::{FailingBackend, ScriptedBackend};
use generation_client::{GenerationBackend, GenerationError};
use persona_review_core::{
    AgentMessage, AgentName, Finding, PersonaConfig, PersonaRegistry, ReviewConfig, ReviewGraph,
    Severity,
};

fn registry() -> Arc<PersonaRegistry> {
    Arc::new(
        PersonaRegistry::new(vec![
            PersonaConfig::new("alpha", "instruction-a", 0.0),
            PersonaConfig::new("bravo", "instruction-b", 0.2),
            PersonaConfig::new("charlie", "instruction-c", 0.0),
        ])
        .unwrap(),
    )
}

fn graph(backend: Arc<dyn GenerationBackend>, config: ReviewConfig) -> ReviewGraph {
    ReviewGraph::new(registry(), backend, config).unwrap()
}

#[tokio::test]
async fn test_failed_agent_is_isolated_from_siblings() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .with_reply("instruction-a", r#"[{"severity":"high","comment":"a1","line":3}]"#)
            .with_failure(
                "instruction-b",
                GenerationError::Transport("connection reset".to_string()),
            )
            .with_reply("instruction-c", r#"{"severity":"low","comment":"c1","line":null}"#),
    );

    let report = graph(backend, ReviewConfig::default())
        .run("As a user I want to log in.")
        .await;

    assert_eq!(report.len(), 3);
    assert_eq!(
        report.get(&AgentName::from("alpha")).unwrap().findings(),
        &[Finding::new(Severity::High, "a1", Some(3))]
    );
    assert_eq!(
        report.get(&AgentName::from("charlie")).unwrap().findings(),
        &[Finding::new(Severity::Low, "c1", None)]
    );

    let bravo = report.get(&AgentName::from("bravo")).unwrap();
    assert!(bravo.is_failure());
    assert!(bravo.findings()[0].comment.contains("connection reset"));
}

#[tokio::test]
async fn test_every_agent_failing_still_yields_full_report() {
    let backend = Arc::new(FailingBackend::new(GenerationError::RateLimited));
    let report = graph(backend, ReviewConfig::default()).run("doc").await;

    assert_eq!(report.len(), 3);
    assert!(report.iter().all(|(_, r)| r.is_failure()));
    assert_eq!(report.summary().failed_agents, 3);
}

#[tokio::test]
async fn test_garbage_responses_become_empty_reports() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .with_reply("instruction-a", "I cannot comply")
            .with_reply("instruction-b", "")
            .with_reply("instruction-c", r#"{"summary":"fine"}"#),
    );
    let report = graph(backend, ReviewConfig::default()).run("doc").await;

    assert_eq!(report.len(), 3);
    assert!(report.iter().all(|(_, r)| r.is_empty()));
}

#[tokio::test]
async fn test_each_persona_is_called_once_with_its_own_parameters() {
    let backend = Arc::new(ScriptedBackend::new());
    graph(backend.clone(), ReviewConfig::default())
        .run("the document")
        .await;

    let mut calls = backend.calls();
    assert_eq!(calls.len(), 3);
    calls.sort_by(|a, b| a.system_instruction.cmp(&b.system_instruction));
    assert_eq!(calls[1].system_instruction, "instruction-b");
    assert_eq!(calls[1].params.temperature, 0.2);
    assert!(calls.iter().all(|c| c.user_content.contains("the document")));
}

#[tokio::test(start_paused = true)]
async fn test_agents_run_concurrently_and_join_waits_for_slowest() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .with_reply("instruction-a", r#"[{"severity":"low","comment":"slow"}]"#)
            .with_delay("instruction-a", Duration::from_secs(10))
            .with_delay("instruction-b", Duration::from_secs(10))
            .with_delay("instruction-c", Duration::from_secs(10)),
    );

    let started = tokio::time::Instant::now();
    let report = graph(backend, ReviewConfig::default()).run("doc").await;
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_secs(10), "join must wait for the slowest agent");
    assert!(elapsed < Duration::from_secs(20), "agents must overlap, took {elapsed:?}");
    assert_eq!(report.get(&AgentName::from("alpha")).unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_max_concurrent_agents_serializes_calls() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .with_delay("instruction-a", Duration::from_secs(10))
            .with_delay("instruction-b", Duration::from_secs(10))
            .with_delay("instruction-c", Duration::from_secs(10)),
    );
    let config = ReviewConfig {
        max_concurrent_agents: Some(1),
        ..ReviewConfig::default()
    };

    let started = tokio::time::Instant::now();
    let report = graph(backend, config).run("doc").await;

    assert!(started.elapsed() >= Duration::from_secs(30));
    assert_eq!(report.len(), 3);
}

#[tokio::test]
async fn test_transcript_carries_one_output_per_agent() {
    let backend = Arc::new(ScriptedBackend::new());
    let transcript = graph(backend, ReviewConfig::default())
        .run_transcript("doc")
        .await;

    assert_eq!(transcript.len(), 5);
    assert!(matches!(&transcript[0], AgentMessage::Start { document } if &**document == "doc"));

    let mut agents: Vec<String> = transcript
        .iter()
        .filter_map(|m| match m {
            AgentMessage::AgentOutput { agent, .. } => Some(agent.to_string()),
            _ => None,
        })
        .collect();
    agents.sort();
    assert_eq!(agents, vec!["alpha", "bravo", "charlie"]);

    match transcript.last() {
        Some(AgentMessage::Supervisor { report }) => assert_eq!(report.len(), 3),
        other => panic!("expected supervisor message, got {other:?}"),
    }
}

#[tokio::test]
async fn test_concurrent_documents_do_not_share_findings() {
    let backend: Arc<dyn GenerationBackend> = Arc::new(
        ScriptedBackend::new()
            .with_reply("instruction-a", r#"[{"severity":"medium","comment":"shared"}]"#),
    );
    let graph = graph(backend, ReviewConfig::default());

    let (one, two) = tokio::join!(graph.run("first"), graph.run("second"));
    assert_eq!(one, two);
    assert_eq!(one.get(&AgentName::from("alpha")).unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_transcript_lists_outputs_in_persona_order() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .with_delay("instruction-a", Duration::from_secs(30))
            .with_delay("instruction-b", Duration::from_secs(10)),
    );
    let transcript = graph(backend, ReviewConfig::default())
        .run_transcript("doc")
        .await;

    let agents: Vec<String> = transcript
        .iter()
        .filter_map(|m| match m {
            AgentMessage::AgentOutput { agent, .. } => Some(agent.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(agents, vec!["alpha", "bravo", "charlie"]);
}
