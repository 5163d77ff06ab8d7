//! The opaque generation call: instruction + content in, raw text out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationResult;

/// Sampling knobs attached to one call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: 1024,
        }
    }
}

/// One outbound generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Fixed instruction text (sent as the system message).
    pub system_instruction: String,
    /// Per-call content (sent as the user message).
    pub user_content: String,
    pub params: GenerationParams,
}

impl GenerationRequest {
    pub fn new(
        system_instruction: impl Into<String>,
        user_content: impl Into<String>,
        params: GenerationParams,
    ) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            user_content: user_content.into(),
            params,
        }
    }
}

/// A generation backend.
///
/// Implementations make exactly one attempt per `invoke`; retry policy, if
/// any, belongs to the caller.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Short backend identifier for logs.
    fn name(&self) -> &str;

    /// Execute one call and return the raw response text.
    async fn invoke(&self, request: &GenerationRequest) -> GenerationResult<String>;
}
