//! # aac-session
//!
//! Single-session AAC encoder: feed it interleaved 16-bit PCM one chunk at a
//! time and get back ADTS-framed AAC frames.
//!
//! ## Features
//!
//! - Explicit `Uninitialized -> Open -> Closed` session lifecycle
//! - Engine handle and scratch buffer released exactly once, also on drop
//! - Fixed encoder configuration: 16-bit input, 8 kbps per channel, ADTS output
//! - Pluggable codec engine, with an fdk-aac implementation included
//!
//! ## Example
//!
//! ```rust,no_run
//! use aac_session::{EncoderSession, FdkAacEngine, SessionConfig};
//!
//! # fn example() -> Result<(), aac_session::SessionError> {
//! let mut session = EncoderSession::open(FdkAacEngine::new(), SessionConfig::new(44100, 2))?;
//!
//! let pcm = vec![0u8; session.input_chunk_bytes()];
//! let frame = session.encode(&pcm)?;
//! println!("encoded {} bytes", frame.len());
//!
//! session.close();
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Session**: `EncoderSession` - lifecycle and frame-encode contract
//! - **Engine**: `CodecEngine` - narrow call contract to the AAC coder
//! - **Host**: `host::encode_stream` - byte stream adapter over `FrameEncoder`
//!
//! Diagnostics go through `tracing`; nothing is printed unless the
//! application installs a subscriber.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
/// Error types
pub mod error;
/// Core types
pub mod types;

/// Testing utilities
pub mod testing;

pub mod audio;
pub mod engine;
pub mod host;
pub mod session;

// Re-exports
pub use audio::{InputFormat, OutputFormat};
pub use engine::{CodecEngine, EncoderConfiguration, EngineError, EngineOpen, FdkAacEngine};
pub use error::SessionError;
pub use session::{EncoderSession, FrameEncoder, SessionState, SharedEncoderSession};
pub use types::{SessionConfig, SessionConfigBuilder};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
