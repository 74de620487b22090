use std::io;
use thiserror::Error;

use crate::session::SessionState;

/// Errors that can occur during encoder session operations
#[derive(Debug, Error)]
pub enum SessionError {
    // ===== Lifecycle Errors =====
    /// Operation attempted outside the state that permits it
    #[error("cannot {operation} while session is {state}")]
    InvalidState {
        /// The operation that was refused
        operation: &'static str,
        /// The state the session was in
        state: SessionState,
    },

    /// The engine refused the fixed encoder configuration at open time
    #[error("encoder configuration rejected: {message}")]
    ConfigurationRejected {
        /// Description of the failure
        message: String,
        /// The underlying engine error
        #[source]
        source: Option<EngineError>,
    },

    /// Engine or scratch buffer could not be allocated at open time
    #[error("resource exhausted: {resource}")]
    ResourceExhaustion {
        /// The resource that could not be acquired
        resource: &'static str,
        /// The underlying source of the error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid parameter provided at open time
    #[error("invalid parameter: {name} - {message}")]
    InvalidParameter {
        /// The name of the parameter
        name: &'static str,
        /// Description of the error
        message: String,
    },

    // ===== Encode Errors =====
    /// Engine failed to encode one chunk
    #[error("encode failed (engine code {code}): {message}")]
    EncodeFailure {
        /// Engine-reported error code
        code: i32,
        /// Description of the failure
        message: String,
    },

    /// PCM byte buffer does not hold a whole number of 16-bit samples
    #[error("PCM buffer of {len} bytes is not a whole number of 16-bit samples")]
    MisalignedInput {
        /// Length of the rejected buffer in bytes
        len: usize,
    },

    /// PCM chunk holds more samples than the engine accepts per call
    #[error("PCM chunk of {samples} samples exceeds the engine limit of {max}")]
    OversizedInput {
        /// Samples in the rejected chunk
        samples: usize,
        /// Samples the engine accepts per call
        max: usize,
    },

    // ===== Host Errors =====
    /// I/O error while streaming PCM in or AAC out
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SessionError {
    /// Check if the session must not be used any further after this error
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigurationRejected { .. }
                | Self::ResourceExhaustion { .. }
                | Self::InvalidParameter { .. }
                | Self::InvalidState { .. }
        )
    }

    /// Check if this error only affects the chunk that produced it
    ///
    /// The session stays open and the caller may continue with the next chunk.
    #[must_use]
    pub fn is_chunk_scoped(&self) -> bool {
        matches!(
            self,
            Self::EncodeFailure { .. } | Self::MisalignedInput { .. } | Self::OversizedInput { .. }
        )
    }
}

/// Error reported by a codec engine through its call contract
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("engine error {code}: {message}")]
pub struct EngineError {
    /// Engine-specific numeric code (negative, as engines report it)
    pub code: i32,
    /// Description of the failure
    pub message: String,
}

impl EngineError {
    /// Create a new engine error
    #[must_use]
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Result type alias for encoder session operations
pub type Result<T> = std::result::Result<T, SessionError>;
