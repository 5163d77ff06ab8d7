//! Generation Client
//!
//! The boundary between Persona Review and a text generation service:
//! - `GenerationBackend`: one call, instruction + content in, raw text out
//! - `OpenAiBackend`: OpenAI-compatible chat completions over HTTP
//! - `fakes`: scripted in-memory backends for tests

pub mod backend;
pub mod error;
pub mod fakes;
pub mod openai;

pub use backend::{GenerationBackend, GenerationParams, GenerationRequest};
pub use error::{GenerationError, GenerationResult};
pub use openai::{OpenAiBackend, OpenAiConfig};
