//! PCM input and AAC output format definitions

use std::fmt;

/// PCM sample format the engine reads from its input buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputFormat {
    /// 16-bit signed integer
    #[default]
    I16,
    /// 24-bit signed integer, carried in 32-bit words
    I24,
    /// 32-bit signed integer
    I32,
    /// 32-bit float
    Float,
}

impl InputFormat {
    /// Get bytes per sample
    #[must_use]
    pub fn bytes_per_sample(self) -> usize {
        match self {
            InputFormat::I16 => 2,
            InputFormat::I24 | InputFormat::I32 | InputFormat::Float => 4,
        }
    }
}

/// Container the encoded AAC frames are written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// Headerless AAC access units
    #[default]
    Raw,
    /// Self-framed Audio Data Transport Stream
    Adts,
}

impl OutputFormat {
    /// Size of the per-frame header the container adds
    ///
    /// ADTS headers are 9 bytes when a CRC is present; engines used here
    /// never emit one.
    #[must_use]
    pub fn header_bytes(self) -> usize {
        match self {
            OutputFormat::Raw => 0,
            OutputFormat::Adts => 7,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Raw => f.write_str("raw"),
            OutputFormat::Adts => f.write_str("adts"),
        }
    }
}

/// AAC audio object type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AacProfile {
    /// Low Complexity
    #[default]
    Lc,
    /// Enhanced Low Delay
    Eld,
}

/// Check whether `frame` starts with an ADTS sync word (12 set bits)
#[must_use]
pub fn has_adts_sync(frame: &[u8]) -> bool {
    matches!(frame, [0xFF, second, ..] if second & 0xF0 == 0xF0)
}
