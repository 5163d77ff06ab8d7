//! In-memory fakes for the generation boundary (testing only)
//!
//! Provides `ScriptedBackend` and `FailingBackend`, which satisfy the
//! [`GenerationBackend`] contract without any network access.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::backend::{GenerationBackend, GenerationRequest};
use crate::error::{GenerationError, GenerationResult};

#[derive(Debug, Clone)]
struct Script {
    outcome: GenerationResult<String>,
    delay: Option<Duration>,
}

// ---------------------------------------------------------------------------
// ScriptedBackend
// ---------------------------------------------------------------------------

/// Backend that answers by exact system instruction.
///
/// Requests whose instruction has no script get `default_reply`. Every
/// request is recorded and can be inspected with [`ScriptedBackend::calls`].
#[derive(Debug)]
pub struct ScriptedBackend {
    scripts: HashMap<String, Script>,
    default_reply: String,
    calls: Mutex<Vec<GenerationRequest>>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self {
            scripts: HashMap::new(),
            default_reply: "[]".to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply used when no script matches.
    pub fn with_default_reply(mut self, reply: impl Into<String>) -> Self {
        self.default_reply = reply.into();
        self
    }

    /// Answer `instruction` with `reply`.
    pub fn with_reply(mut self, instruction: impl Into<String>, reply: impl Into<String>) -> Self {
        self.scripts.insert(
            instruction.into(),
            Script {
                outcome: Ok(reply.into()),
                delay: None,
            },
        );
        self
    }

    /// Fail every call made with `instruction`.
    pub fn with_failure(mut self, instruction: impl Into<String>, error: GenerationError) -> Self {
        self.scripts.insert(
            instruction.into(),
            Script {
                outcome: Err(error),
                delay: None,
            },
        );
        self
    }

    /// Sleep before answering `instruction`. Applies to an existing script
    /// or creates one that returns the default reply.
    pub fn with_delay(mut self, instruction: impl Into<String>, delay: Duration) -> Self {
        let default_reply = self.default_reply.clone();
        self.scripts
            .entry(instruction.into())
            .or_insert_with(|| Script {
                outcome: Ok(default_reply),
                delay: None,
            })
            .delay = Some(delay);
        self
    }

    /// Snapshot of every request received so far, in arrival order.
    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn invoke(&self, request: &GenerationRequest) -> GenerationResult<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        match self.scripts.get(&request.system_instruction) {
            Some(script) => {
                if let Some(delay) = script.delay {
                    tokio::time::sleep(delay).await;
                }
                script.outcome.clone()
            }
            None => Ok(self.default_reply.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// FailingBackend
// ---------------------------------------------------------------------------

/// Backend whose every call fails with the same error.
#[derive(Debug, Clone)]
pub struct FailingBackend {
    error: GenerationError,
}

impl FailingBackend {
    pub fn new(error: GenerationError) -> Self {
        Self { error }
    }
}

#[async_trait]
impl GenerationBackend for FailingBackend {
    fn name(&self) -> &str {
        "failing"
    }

    async fn invoke(&self, _request: &GenerationRequest) -> GenerationResult<String> {
        Err(self.error.clone())
    }
}
