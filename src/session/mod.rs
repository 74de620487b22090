//! Encoder session lifecycle
//!
//! An [`EncoderSession`] owns one engine instance and one output scratch
//! buffer. It moves through three states:
//!
//! ```text
//! Uninitialized --open--> Open --close--> Closed
//!                          |  ^
//!                          +--+ encode
//! ```
//!
//! `Closed` is terminal. Closing releases the engine handle and the scratch
//! buffer together, exactly once; dropping a session closes it.

mod shared;

#[cfg(test)]
mod tests;

pub use shared::SharedEncoderSession;

use std::fmt;

use crate::audio::pcm_bytes_to_i16;
use crate::engine::{CodecEngine, EncoderConfiguration};
use crate::error::{Result, SessionError};
use crate::types::SessionConfig;

/// Code used when an engine reports more bytes than the scratch buffer holds
pub const OUTPUT_OVERRUN: i32 = -1;

/// Lifecycle state of an encoder session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Created but not opened yet
    #[default]
    Uninitialized,
    /// Engine handle and scratch buffer are held
    Open,
    /// Resources released; terminal
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Uninitialized => f.write_str("uninitialized"),
            SessionState::Open => f.write_str("open"),
            SessionState::Closed => f.write_str("closed"),
        }
    }
}

/// Capability surface a host binding drives
pub trait FrameEncoder: Sized {
    /// Engine the encoder is opened on
    type Engine;

    /// Open an encoder with the given acoustic parameters
    ///
    /// # Errors
    ///
    /// Returns error if the engine cannot be opened or configured
    fn open(engine: Self::Engine, config: SessionConfig) -> Result<Self>;

    /// Encode one chunk of interleaved 16-bit little-endian PCM
    ///
    /// An empty chunk drains the engine.
    ///
    /// # Errors
    ///
    /// Returns error if the encoder is not open or the engine fails
    fn encode(&mut self, pcm: &[u8]) -> Result<Vec<u8>>;

    /// Bytes of PCM that make up one full input chunk
    fn input_chunk_bytes(&self) -> usize;

    /// Release the encoder; calling it again is a no-op
    fn close(&mut self);
}

/// Single AAC encoding session over a codec engine
pub struct EncoderSession<E: CodecEngine> {
    engine: E,
    state: SessionState,
    sample_rate: u32,
    channels: u32,
    handle: Option<E::Handle>,
    required_input_samples: usize,
    max_output_bytes: usize,
    /// Reused for every encode call, never handed out
    scratch: Vec<u8>,
    frames_encoded: u64,
}

impl<E: CodecEngine> EncoderSession<E> {
    /// Create a session in the `Uninitialized` state
    #[must_use]
    pub fn uninitialized(engine: E) -> Self {
        Self {
            engine,
            state: SessionState::Uninitialized,
            sample_rate: 0,
            channels: 0,
            handle: None,
            required_input_samples: 0,
            max_output_bytes: 0,
            scratch: Vec::new(),
            frames_encoded: 0,
        }
    }

    /// Create and open a session
    ///
    /// # Errors
    ///
    /// Returns error if the parameters are invalid, the engine or scratch
    /// buffer cannot be allocated, or the engine rejects the fixed
    /// configuration
    pub fn open(engine: E, config: SessionConfig) -> Result<Self> {
        let mut session = Self::uninitialized(engine);
        session.open_with(config)?;
        Ok(session)
    }

    /// Open an `Uninitialized` session
    ///
    /// An invalid parameter leaves the session `Uninitialized`. Any failure
    /// after the engine was touched releases what was acquired and leaves the
    /// session `Closed`.
    ///
    /// # Errors
    ///
    /// Returns error if the session was already opened, the parameters are
    /// invalid, allocation fails or the engine rejects the configuration
    pub fn open_with(&mut self, config: SessionConfig) -> Result<()> {
        if self.state != SessionState::Uninitialized {
            return Err(SessionError::InvalidState {
                operation: "open",
                state: self.state,
            });
        }

        let sample_rate = config.resolved_sample_rate();
        let channels = config.resolved_channels();
        if sample_rate == 0 {
            return Err(SessionError::InvalidParameter {
                name: "sample_rate",
                message: "must be greater than zero".to_string(),
            });
        }
        if channels == 0 {
            return Err(SessionError::InvalidParameter {
                name: "channels",
                message: "must be greater than zero".to_string(),
            });
        }

        tracing::debug!(sample_rate, channels, "Opening encoder session");

        let opened = match self.engine.open(sample_rate, channels) {
            Ok(opened) => opened,
            Err(e) => {
                tracing::warn!(code = e.code, "Engine open failed: {}", e.message);
                self.state = SessionState::Closed;
                return Err(SessionError::ResourceExhaustion {
                    resource: "engine handle",
                    source: Some(Box::new(e)),
                });
            }
        };
        let mut handle = opened.handle;

        tracing::debug!(
            required_input_samples = opened.required_input_samples,
            max_output_bytes = opened.max_output_bytes,
            "Engine opened"
        );

        let mut scratch = Vec::new();
        if let Err(e) = scratch.try_reserve_exact(opened.max_output_bytes) {
            self.engine.close(handle);
            self.state = SessionState::Closed;
            return Err(SessionError::ResourceExhaustion {
                resource: "scratch buffer",
                source: Some(Box::new(e)),
            });
        }
        scratch.resize(opened.max_output_bytes, 0);

        let config = self.engine.configuration(&handle).with_fixed_fields();
        if let Err(e) = self.engine.set_configuration(&mut handle, &config) {
            tracing::warn!(code = e.code, "Engine rejected configuration: {}", e.message);
            self.engine.close(handle);
            self.state = SessionState::Closed;
            return Err(SessionError::ConfigurationRejected {
                message: format!(
                    "engine refused {:?} input at {} bps with {} output",
                    config.input_format, config.bit_rate, config.output_format
                ),
                source: Some(e),
            });
        }

        tracing::debug!(
            bit_rate = config.bit_rate,
            output_format = %config.output_format,
            "Encoder configuration applied"
        );

        self.sample_rate = sample_rate;
        self.channels = channels;
        self.handle = Some(handle);
        self.required_input_samples = opened.required_input_samples;
        self.max_output_bytes = opened.max_output_bytes;
        self.scratch = scratch;
        self.state = SessionState::Open;
        Ok(())
    }

    /// Encode one chunk of interleaved 16-bit little-endian PCM bytes
    ///
    /// The chunk may be shorter than [`Self::input_chunk_bytes`]; an empty
    /// chunk drains the engine. The returned buffer holds exactly the bytes
    /// the engine produced and may be empty.
    ///
    /// # Errors
    ///
    /// Returns error if the session is not open, the buffer is not a whole
    /// number of samples or too long, or the engine fails on this chunk
    pub fn encode(&mut self, pcm: &[u8]) -> Result<Vec<u8>> {
        self.ensure_open("encode")?;
        let samples =
            pcm_bytes_to_i16(pcm).ok_or(SessionError::MisalignedInput { len: pcm.len() })?;
        self.encode_samples(&samples)
    }

    /// Encode one chunk of interleaved 16-bit samples
    ///
    /// # Errors
    ///
    /// Returns error if the session is not open, the chunk holds more samples
    /// than the engine accepts, or the engine fails on this chunk
    pub fn encode_samples(&mut self, samples: &[i16]) -> Result<Vec<u8>> {
        self.ensure_open("encode")?;
        if samples.len() > self.required_input_samples {
            return Err(SessionError::OversizedInput {
                samples: samples.len(),
                max: self.required_input_samples,
            });
        }

        let Some(handle) = self.handle.as_mut() else {
            tracing::error!("Open session without an engine handle");
            return Err(SessionError::InvalidState {
                operation: "encode",
                state: self.state,
            });
        };

        tracing::trace!(samples = samples.len(), "Encoding chunk");

        let capacity = self.scratch.len();
        let written = match self
            .engine
            .encode_frame(handle, samples, &mut self.scratch)
        {
            Ok(written) if written <= capacity => written,
            Ok(written) => {
                tracing::warn!(written, capacity, "Engine overran the scratch buffer");
                return Err(SessionError::EncodeFailure {
                    code: OUTPUT_OVERRUN,
                    message: format!(
                        "engine reported {written} bytes for a {capacity} byte buffer"
                    ),
                });
            }
            Err(e) => {
                tracing::warn!(code = e.code, "Engine failed to encode chunk: {}", e.message);
                return Err(SessionError::EncodeFailure {
                    code: e.code,
                    message: e.message,
                });
            }
        };

        self.frames_encoded += 1;
        tracing::trace!(written, "Encoded chunk");

        Ok(self.scratch[..written].to_vec())
    }

    /// Drain audio the engine still buffers by passing zero samples
    ///
    /// Each call returns at most one frame; keep calling until the result
    /// is empty.
    ///
    /// # Errors
    ///
    /// Returns error if the session is not open or the engine fails
    pub fn flush(&mut self) -> Result<Vec<u8>> {
        self.encode_samples(&[])
    }

    /// Release the engine handle and scratch buffer
    ///
    /// Calling `close` on a closed session does nothing.
    pub fn close(&mut self) {
        match self.state {
            SessionState::Closed => {
                tracing::trace!("Session already closed");
                return;
            }
            SessionState::Uninitialized => {
                tracing::trace!("Closing session that was never opened");
            }
            SessionState::Open => {
                if let Some(handle) = self.handle.take() {
                    self.engine.close(handle);
                } else {
                    tracing::error!("Open session without an engine handle");
                }
                tracing::debug!(
                    frames_encoded = self.frames_encoded,
                    "Encoder session closed"
                );
            }
        }

        self.scratch = Vec::new();
        self.state = SessionState::Closed;
    }

    /// Get current state
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Get sample rate in Hz (zero before open)
    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get channel count (zero before open)
    #[must_use]
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Samples (all channels) the engine expects per call
    #[must_use]
    pub fn required_input_samples(&self) -> usize {
        self.required_input_samples
    }

    /// PCM bytes that make up one full input chunk
    #[must_use]
    pub fn input_chunk_bytes(&self) -> usize {
        self.required_input_samples * EncoderConfiguration::FIXED.input_format.bytes_per_sample()
    }

    /// Upper bound on bytes one encode call may return
    #[must_use]
    pub fn max_output_bytes(&self) -> usize {
        self.max_output_bytes
    }

    /// Number of successful encode calls
    #[must_use]
    pub fn frames_encoded(&self) -> u64 {
        self.frames_encoded
    }

    /// Whether the session holds neither an engine handle nor a scratch buffer
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.handle.is_none() && self.scratch.capacity() == 0
    }

    /// Configuration the engine currently runs with, if open
    #[must_use]
    pub fn configuration(&self) -> Option<EncoderConfiguration> {
        self.handle
            .as_ref()
            .map(|handle| self.engine.configuration(handle))
    }

    fn ensure_open(&self, operation: &'static str) -> Result<()> {
        if self.state == SessionState::Open {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}

impl<E: CodecEngine> Drop for EncoderSession<E> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<E: CodecEngine> fmt::Debug for EncoderSession<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncoderSession")
            .field("state", &self.state)
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .field("required_input_samples", &self.required_input_samples)
            .field("max_output_bytes", &self.max_output_bytes)
            .field("frames_encoded", &self.frames_encoded)
            .finish_non_exhaustive()
    }
}

impl<E: CodecEngine> FrameEncoder for EncoderSession<E> {
    type Engine = E;

    fn open(engine: E, config: SessionConfig) -> Result<Self> {
        EncoderSession::open(engine, config)
    }

    fn encode(&mut self, pcm: &[u8]) -> Result<Vec<u8>> {
        EncoderSession::encode(self, pcm)
    }

    fn input_chunk_bytes(&self) -> usize {
        EncoderSession::input_chunk_bytes(self)
    }

    fn close(&mut self) {
        EncoderSession::close(self);
    }
}
