//! Codec engine call contract
//!
//! A [`CodecEngine`] performs the actual perceptual coding. Sessions only
//! configure and drive it through the narrow set of calls below; everything
//! about psychoacoustics, bit allocation and entropy coding stays behind the
//! trait.

pub mod fdk;


pub use crate::error::EngineError;
pub use fdk::{FdkAacEngine, FdkHandle};

use crate::audio::{AacProfile, InputFormat, OutputFormat};

/// Result of opening an engine instance
#[derive(Debug)]
pub struct EngineOpen<H> {
    /// Opaque per-instance engine state
    pub handle: H,
    /// Samples (all channels) the engine expects per encode call
    pub required_input_samples: usize,
    /// Upper bound on bytes a single encode call may write
    pub max_output_bytes: usize,
}

/// Engine configuration fields the session controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfiguration {
    /// Sample format of the input buffer
    pub input_format: InputFormat,
    /// Bit rate in bits per second per channel
    pub bit_rate: u32,
    /// Output container
    pub output_format: OutputFormat,
    /// Audio object type
    pub profile: AacProfile,
}

impl EncoderConfiguration {
    /// Configuration every session forces onto its engine
    pub const FIXED: Self = Self {
        input_format: InputFormat::I16,
        bit_rate: 8000,
        output_format: OutputFormat::Adts,
        profile: AacProfile::Lc,
    };

    /// Copy `self` with the session-controlled fields forced on top
    ///
    /// Fields the session does not control (the profile) keep the engine's
    /// current value.
    #[must_use]
    pub fn with_fixed_fields(self) -> Self {
        Self {
            input_format: Self::FIXED.input_format,
            bit_rate: Self::FIXED.bit_rate,
            output_format: Self::FIXED.output_format,
            ..self
        }
    }
}

/// External AAC codec engine
///
/// Handles are consumed by [`CodecEngine::close`], so a handle cannot be
/// released twice.
pub trait CodecEngine {
    /// Per-instance engine state
    type Handle;

    /// Acquire an engine instance for the given acoustic parameters
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be created for these parameters
    fn open(&mut self, sample_rate: u32, channels: u32)
    -> Result<EngineOpen<Self::Handle>, EngineError>;

    /// Read the current configuration of an instance
    fn configuration(&self, handle: &Self::Handle) -> EncoderConfiguration;

    /// Push a configuration into an instance
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects any field
    fn set_configuration(
        &mut self,
        handle: &mut Self::Handle,
        config: &EncoderConfiguration,
    ) -> Result<(), EngineError>;

    /// Encode one chunk of interleaved samples into `output`
    ///
    /// Returns the number of bytes written, which may be zero while the
    /// engine primes its lookahead. An empty `input` drains: each such call
    /// writes at most one buffered frame, and zero once nothing is left.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails to encode the chunk
    fn encode_frame(
        &mut self,
        handle: &mut Self::Handle,
        input: &[i16],
        output: &mut [u8],
    ) -> Result<usize, EngineError>;

    /// Release an instance
    fn close(&mut self, handle: Self::Handle);
}
