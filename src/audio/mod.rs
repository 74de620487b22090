//! PCM input handling and AAC output formats

pub mod convert;
pub mod format;


pub use convert::{i16_to_pcm_bytes, pcm_bytes_to_i16};
pub use format::{AacProfile, InputFormat, OutputFormat, has_adts_sync};
