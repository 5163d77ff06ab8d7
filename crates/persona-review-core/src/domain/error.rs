//! Domain-level error taxonomy for Persona Review.

/// Startup configuration faults. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("persona set is empty")]
    EmptyPersonaSet,

    #[error("duplicate persona name: {0}")]
    DuplicatePersona(String),

    #[error("persona name must not be blank")]
    BlankPersonaName,

    #[error("persona {0} has a blank instruction")]
    BlankInstruction(String),

    #[error("persona {name} has temperature {value} outside 0.0..=2.0")]
    InvalidTemperature { name: String, value: f32 },

    #[error("invalid concurrency setting {field}: must be at least 1")]
    InvalidConcurrency { field: &'static str },

    #[error("failed to parse persona file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures resolving a document identifier to text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("document not found: {document}")]
    NotFound { document: String },

    #[error("could not read document {document}: {reason}")]
    Read { document: String, reason: String },

    #[error("document {document} is not valid UTF-8: {reason}")]
    Decode { document: String, reason: String },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type for document resolution.
pub type SourceResult<T> = std::result::Result<T, SourceError>;
