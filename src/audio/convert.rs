//! PCM byte buffer conversion

use byteorder::{ByteOrder, LittleEndian};

/// Reinterpret a little-endian byte buffer as interleaved 16-bit samples
///
/// Returns `None` when the buffer length is odd, since a trailing byte cannot
/// form a sample.
#[must_use]
pub fn pcm_bytes_to_i16(input: &[u8]) -> Option<Vec<i16>> {
    if input.len() % 2 != 0 {
        return None;
    }

    let mut samples = vec![0i16; input.len() / 2];
    LittleEndian::read_i16_into(input, &mut samples);
    Some(samples)
}

/// Serialize interleaved 16-bit samples as little-endian bytes
#[must_use]
pub fn i16_to_pcm_bytes(samples: &[i16]) -> Vec<u8> {
    let mut bytes = vec![0u8; samples.len() * 2];
    LittleEndian::write_i16_into(samples, &mut bytes);
    bytes
}
