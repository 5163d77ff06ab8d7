//! OpenAI-compatible chat completions backend
//!
//! Talks to any server exposing `POST {base_url}/chat/completions` with the
//! OpenAI request/response envelope. JSON mode is requested by default so
//! the model is nudged towards structured output.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::backend::{GenerationBackend, GenerationRequest};
use crate::error::{GenerationError, GenerationResult};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Longest error body kept in [`GenerationError::Api`].
const MAX_ERROR_BODY: usize = 512;

/// Chat completions configuration
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiConfig {
    /// API root, without the trailing `/chat/completions`
    pub base_url: String,
    /// Bearer token
    pub api_key: Option<String>,
    /// Model identifier sent with every request
    pub model: String,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Request `response_format = {"type": "json_object"}`
    pub json_mode: bool,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        OpenAiConfig {
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            model: std::env::var("PERSONA_REVIEW_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            timeout_secs: std::env::var("PERSONA_REVIEW_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            json_mode: true,
        }
    }
}

impl OpenAiConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat completions client
pub struct OpenAiBackend {
    config: OpenAiConfig,
    http_client: reqwest::Client,
}

impl OpenAiBackend {
    /// Create a new client
    pub fn new(config: OpenAiConfig) -> GenerationResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("persona-review/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::ClientBuild(e.to_string()))?;

        Ok(OpenAiBackend {
            config,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> GenerationResult<Self> {
        Self::new(OpenAiConfig::from_env())
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn build_body<'a>(&'a self, request: &'a GenerationRequest) -> ChatCompletionBody<'a> {
        ChatCompletionBody {
            model: &self.config.model,
            temperature: request.params.temperature,
            max_tokens: request.params.max_tokens,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_content,
                },
            ],
            response_format: self
                .config
                .json_mode
                .then_some(ResponseFormat { kind: "json_object" }),
        }
    }
}

/// Map a non-success HTTP status to the error taxonomy.
fn classify_status(status: u16, body: &str) -> GenerationError {
    match status {
        401 | 403 => GenerationError::Unauthorized { status },
        429 => GenerationError::RateLimited,
        _ => {
            let mut body = body.trim().to_string();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            GenerationError::Api { status, body }
        }
    }
}

/// Pull the first choice's content out of a response envelope.
fn extract_content(body: &str) -> GenerationResult<String> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or(GenerationError::EmptyChoice)
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai-chat"
    }

    async fn invoke(&self, request: &GenerationRequest) -> GenerationResult<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingApiKey)?;

        let body = self.build_body(request);
        debug!(
            model = %self.config.model,
            temperature = request.params.temperature,
            max_tokens = request.params.max_tokens,
            "Sending chat completion request"
        );

        let response = self
            .http_client
            .post(self.config.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Chat completion request failed");
            return Err(classify_status(status.as_u16(), &text));
        }

        extract_content(&text)
    }
}
