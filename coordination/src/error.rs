//! Error types
//!
//! One enum per failure domain. Only [`PipelineError`] and [`ConfigError`]
//! ever reach a caller of the high-level API; backend and store failures are
//! absorbed inside the debate engine and research store and show up as
//! degraded output plus a log line.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single call to the generation backend.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Connection, timeout or other transport-level failure
    #[error("Backend request failed: {message}")]
    Transport { message: String, timed_out: bool },

    /// Backend answered with a non-success status
    #[error("Backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Body was not the expected `{"response": ...}` document
    #[error("Backend response could not be decoded: {0}")]
    Decode(String),
}

impl GenerationError {
    /// Create a transport error
    pub fn transport(message: impl Into<String>, timed_out: bool) -> Self {
        Self::Transport {
            message: message.into(),
            timed_out,
        }
    }

    /// Whether the call ran past its deadline
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { timed_out: true, .. })
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        Self::transport(err.to_string(), err.is_timeout())
    }
}

/// Research store persistence failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error wrapper
    #[error("Research store IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("Research store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Create an IO error bound to the document path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Configuration loading or validation failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for the expected schema
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parsed but are out of range
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    /// Create a validation error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// Failure of the draft-then-debate pipeline.
///
/// These are the only fatal errors: once a draft exists, the debate always
/// returns some content.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Initial draft could not be generated
    #[error("Initial draft generation failed after {attempts} attempt(s): {source}")]
    DraftFailed {
        attempts: u32,
        #[source]
        source: GenerationError,
    },

    /// Backend produced an empty initial draft
    #[error("Initial draft generation produced no content")]
    EmptyDraft,
}
