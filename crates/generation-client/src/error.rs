//! Error types for generation-client

use thiserror::Error;

/// Failures at the generation call boundary.
///
/// Every variant is a terminal outcome for one call; callers decide whether
/// the failure is contained or surfaced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// No API key was configured for a backend that requires one
    #[error("no API key configured (set OPENAI_API_KEY)")]
    MissingApiKey,

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// Connection, DNS or TLS failure
    #[error("transport error: {0}")]
    Transport(String),

    /// The request exceeded the configured timeout
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Credentials were rejected
    #[error("unauthorized (HTTP {status})")]
    Unauthorized { status: u16 },

    /// The backend is throttling us
    #[error("rate limited (HTTP 429)")]
    RateLimited,

    /// Any other non-success status
    #[error("backend returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body was not the expected envelope
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),

    /// The envelope parsed but carried no message content
    #[error("backend response contained no message content")]
    EmptyChoice,
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerationError::Timeout(err.to_string())
        } else if err.is_decode() {
            GenerationError::MalformedResponse(err.to_string())
        } else {
            GenerationError::Transport(err.to_string())
        }
    }
}

/// Result type for generation calls.
pub type GenerationResult<T> = std::result::Result<T, GenerationError>;
