//! AAC codec engine using fdk-aac

use fdk_aac::enc::{AudioObjectType, BitRate, ChannelMode, Encoder, EncoderParams, Transport};

use super::{CodecEngine, EncoderConfiguration, EngineError, EngineOpen};
use crate::audio::{AacProfile, InputFormat, OutputFormat};

/// Code reported when fdk-aac itself fails
pub const FDK_ERROR: i32 = -1;
/// Code reported for parameters fdk-aac cannot represent
pub const FDK_UNSUPPORTED: i32 = -2;

/// Configuration a freshly opened instance starts from
const INITIAL_CONFIGURATION: EncoderConfiguration = EncoderConfiguration {
    input_format: InputFormat::I16,
    bit_rate: 64_000,
    output_format: OutputFormat::Raw,
    profile: AacProfile::Lc,
};

/// Frame geometry of a built encoder, in interleaved samples
#[derive(Debug, Clone, Copy)]
struct FrameLayout {
    max_output_bytes: usize,
    frame_samples: usize,
    delay_samples: usize,
}

/// Per-instance fdk-aac state
///
/// fdk-aac treats a zero-length call as "no input yet", not as end of
/// stream, so draining is done here: the handle counts what went in and
/// what came out, and pads with silence until the encoder delay and any
/// partial frame have been flushed.
pub struct FdkHandle {
    encoder: Encoder,
    sample_rate: u32,
    channels: u32,
    config: EncoderConfiguration,
    max_output_bytes: usize,
    layout: FrameLayout,
    silence: Vec<i16>,
    samples_in: u64,
    frames_out: u64,
    padding_in: u64,
}

impl FdkHandle {
    /// Whether the encoder still holds audio that has not come out as frames
    fn owes_output(&self) -> bool {
        let frame = self.layout.frame_samples as u64;
        if frame == 0 {
            return false;
        }
        let delay = self.layout.delay_samples as u64;
        let target = (self.samples_in + delay).div_ceil(frame) * frame;

        // Padding is capped one frame past the target so a drain always ends
        self.frames_out * frame < target && self.padding_in < target - self.samples_in + frame
    }

    fn reset_counters(&mut self) {
        self.silence = vec![0; self.layout.frame_samples];
        self.samples_in = 0;
        self.frames_out = 0;
        self.padding_in = 0;
    }
}

impl std::fmt::Debug for FdkHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FdkHandle")
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .field("config", &self.config)
            .field("max_output_bytes", &self.max_output_bytes)
            .field("samples_in", &self.samples_in)
            .field("frames_out", &self.frames_out)
            .finish_non_exhaustive()
    }
}

/// Codec engine backed by the Fraunhofer FDK AAC library
///
/// Configuration changes rebuild the underlying encoder, since fdk-aac fixes
/// its parameters at creation time.
#[derive(Debug, Default, Clone, Copy)]
pub struct FdkAacEngine;

impl FdkAacEngine {
    /// Create a new engine
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn build_encoder(
        sample_rate: u32,
        channels: u32,
        config: &EncoderConfiguration,
    ) -> Result<(Encoder, FrameLayout), EngineError> {
        if config.input_format != InputFormat::I16 {
            return Err(EngineError::new(
                FDK_UNSUPPORTED,
                format!(
                    "unsupported input format {:?}, only 16-bit PCM is accepted",
                    config.input_format
                ),
            ));
        }

        let params = EncoderParams {
            bit_rate: BitRate::Cbr(config.bit_rate.saturating_mul(channels)),
            sample_rate,
            transport: match config.output_format {
                OutputFormat::Raw => Transport::Raw,
                OutputFormat::Adts => Transport::Adts,
            },
            channels: match channels {
                1 => ChannelMode::Mono,
                2 => ChannelMode::Stereo,
                _ => {
                    return Err(EngineError::new(
                        FDK_UNSUPPORTED,
                        format!("unsupported channel count {channels}"),
                    ));
                }
            },
            audio_object_type: match config.profile {
                AacProfile::Lc => AudioObjectType::Mpeg4LowComplexity,
                AacProfile::Eld => AudioObjectType::Mpeg4EnhancedLowDelay,
            },
        };

        let encoder = Encoder::new(params)
            .map_err(|e| EngineError::new(FDK_ERROR, format!("encoder init failed: {e:?}")))?;
        let info = encoder
            .info()
            .map_err(|e| EngineError::new(FDK_ERROR, format!("encoder info failed: {e:?}")))?;

        let channels = channels as usize;
        Ok((
            encoder,
            FrameLayout {
                max_output_bytes: info.maxOutBufBytes as usize,
                frame_samples: info.frameLength as usize * channels,
                delay_samples: info.nDelay as usize * channels,
            },
        ))
    }

    /// Push one frame of silence through the encoder, or report zero bytes
    /// once everything it held has come out
    fn drain_frame(handle: &mut FdkHandle, output: &mut [u8]) -> Result<usize, EngineError> {
        while handle.owes_output() {
            let info = handle
                .encoder
                .encode(&handle.silence, output)
                .map_err(|e| EngineError::new(FDK_ERROR, format!("{e:?}")))?;

            handle.padding_in += handle.layout.frame_samples as u64;
            if info.output_size > 0 {
                handle.frames_out += 1;
                return Ok(info.output_size);
            }
        }

        tracing::trace!(
            samples_in = handle.samples_in,
            frames_out = handle.frames_out,
            "fdk-aac drained"
        );
        Ok(0)
    }
}

impl CodecEngine for FdkAacEngine {
    type Handle = FdkHandle;

    fn open(
        &mut self,
        sample_rate: u32,
        channels: u32,
    ) -> Result<EngineOpen<FdkHandle>, EngineError> {
        let (encoder, layout) =
            Self::build_encoder(sample_rate, channels, &INITIAL_CONFIGURATION)?;

        // Leave room for a transport header whichever container is set later
        let max_output_bytes = layout.max_output_bytes + OutputFormat::Adts.header_bytes();
        let required_input_samples = layout.frame_samples;

        tracing::debug!(
            sample_rate,
            channels,
            frame_samples = layout.frame_samples,
            delay_samples = layout.delay_samples,
            max_output_bytes,
            "fdk-aac instance opened"
        );

        let mut handle = FdkHandle {
            encoder,
            sample_rate,
            channels,
            config: INITIAL_CONFIGURATION,
            max_output_bytes,
            layout,
            silence: Vec::new(),
            samples_in: 0,
            frames_out: 0,
            padding_in: 0,
        };
        handle.reset_counters();

        Ok(EngineOpen {
            handle,
            required_input_samples,
            max_output_bytes,
        })
    }

    fn configuration(&self, handle: &FdkHandle) -> EncoderConfiguration {
        handle.config
    }

    fn set_configuration(
        &mut self,
        handle: &mut FdkHandle,
        config: &EncoderConfiguration,
    ) -> Result<(), EngineError> {
        let (encoder, layout) =
            Self::build_encoder(handle.sample_rate, handle.channels, config)?;

        // The geometry was published at open time and must keep holding
        let needed = layout.max_output_bytes + config.output_format.header_bytes();
        if needed > handle.max_output_bytes {
            return Err(EngineError::new(
                FDK_UNSUPPORTED,
                format!(
                    "configuration needs {needed} output bytes, instance was opened with {}",
                    handle.max_output_bytes
                ),
            ));
        }
        if layout.frame_samples != handle.layout.frame_samples {
            return Err(EngineError::new(
                FDK_UNSUPPORTED,
                format!(
                    "configuration changes the frame to {} samples, instance was opened with {}",
                    layout.frame_samples, handle.layout.frame_samples
                ),
            ));
        }

        handle.encoder = encoder;
        handle.config = *config;
        handle.layout = layout;
        handle.reset_counters();
        Ok(())
    }

    fn encode_frame(
        &mut self,
        handle: &mut FdkHandle,
        input: &[i16],
        output: &mut [u8],
    ) -> Result<usize, EngineError> {
        if input.is_empty() {
            return Self::drain_frame(handle, output);
        }

        let info = handle
            .encoder
            .encode(input, output)
            .map_err(|e| EngineError::new(FDK_ERROR, format!("{e:?}")))?;

        if info.input_consumed < input.len() {
            tracing::warn!(
                consumed = info.input_consumed,
                provided = input.len(),
                "fdk-aac did not consume the whole chunk"
            );
        }

        handle.samples_in += info.input_consumed as u64;
        if info.output_size > 0 {
            handle.frames_out += 1;
        }
        Ok(info.output_size)
    }

    fn close(&mut self, handle: FdkHandle) {
        tracing::trace!(
            sample_rate = handle.sample_rate,
            channels = handle.channels,
            "fdk-aac instance closed"
        );
        drop(handle);
    }
}
