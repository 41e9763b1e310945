//! Error types for finebench
//!
//! One enum per layer, plus an umbrella error for callers that drive the
//! whole stack (the CLI binary).

use thiserror::Error;

use crate::protocol::{Command, Status};

/// Result type alias using BenchError
pub type Result<T> = std::result::Result<T, BenchError>;

// =============================================================================
// Codec Errors
// =============================================================================

/// Errors raised while encoding requests or decoding frames
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Key too long: {0} bytes (max 65535)")]
    KeyTooLong(usize),

    #[error("Value too long: {0} bytes (max 4294967295)")]
    ValueTooLong(usize),

    #[error("Key is not ASCII")]
    NonAsciiKey,

    #[error("{0:?} request requires a value")]
    MissingValue(Command),

    #[error("{0:?} request does not carry a value")]
    UnexpectedValue(Command),

    #[error("Operation not available in this protocol version: {0}")]
    UnsupportedOp(String),

    #[error("Unknown opcode: 0x{0:02x}")]
    UnknownOpcode(u8),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

// =============================================================================
// Store Client Errors
// =============================================================================

/// Errors surfaced by the store client
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connect, read or write failure, including timeouts
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The server answered with an error status
    #[error("Server returned {status:?} (code 0x{code:02x})")]
    Protocol { status: Status, code: u8 },

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

// =============================================================================
// Backend Errors
// =============================================================================

/// Opaque error passed through from a backend
#[derive(Debug, Error)]
#[error("{backend}: {source}")]
pub struct BackendError {
    backend: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl BackendError {
    /// Wrap any error raised by a backend's native client
    pub fn new(
        backend: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            backend: backend.into(),
            source: source.into(),
        }
    }

    /// Error for an operation the backend does not offer
    pub fn unsupported(backend: impl Into<String>, operation: &str) -> Self {
        Self::new(backend, format!("{} is not supported", operation))
    }

    /// Name of the backend that raised the error
    pub fn backend(&self) -> &str {
        &self.backend
    }
}

impl From<StoreError> for BackendError {
    fn from(err: StoreError) -> Self {
        Self::new("finedb", err)
    }
}

// =============================================================================
// Harness Errors
// =============================================================================

/// Misconfiguration detected before a phase starts
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Backend {backend} does not support phase {phase}")]
    Unsupported { backend: String, phase: String },

    #[error("Workload is empty")]
    EmptyWorkload,

    #[error("Repeat count must be at least 1")]
    ZeroRepeat,
}

// =============================================================================
// Umbrella Error
// =============================================================================

/// Unified error type for callers driving the whole stack
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Harness(#[from] HarnessError),

    #[error("Configuration error: {0}")]
    Config(String),
}
