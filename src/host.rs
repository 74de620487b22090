//! Host adapter: streams raw PCM through a frame encoder
//!
//! Marshals a byte stream into the per-call chunk contract of
//! [`FrameEncoder`] and writes the encoded frames back out.

use std::io::{self, Read, Write};

use crate::error::Result;
use crate::session::FrameEncoder;

/// Totals of one streaming run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    /// Chunks handed to the encoder, including the final drain
    pub chunks: u64,
    /// PCM bytes read
    pub pcm_bytes: u64,
    /// Encoded bytes written
    pub encoded_bytes: u64,
    /// Chunks the engine failed on and that were skipped
    pub failed_chunks: u64,
}

/// Encode everything `reader` yields and write the frames to `writer`
///
/// PCM is read in full chunks of [`FrameEncoder::input_chunk_bytes`]; the
/// last chunk may be short. After end of input the encoder is drained with
/// empty chunks until it returns no more bytes. Chunks the engine fails on
/// are logged and skipped. The encoder is left open; closing it is up to the
/// caller.
///
/// # Errors
///
/// Returns error on I/O failure or on any encoder error that is not scoped to
/// a single chunk
pub fn encode_stream<F, R, W>(
    encoder: &mut F,
    mut reader: R,
    mut writer: W,
) -> Result<StreamSummary>
where
    F: FrameEncoder,
    R: Read,
    W: Write,
{
    let mut summary = StreamSummary::default();
    let mut chunk = vec![0u8; encoder.input_chunk_bytes()];

    loop {
        let n = fill_chunk(&mut reader, &mut chunk)?;
        if n == 0 {
            break;
        }
        summary.pcm_bytes += n as u64;
        encode_chunk(encoder, &chunk[..n], &mut writer, &mut summary)?;
        if n < chunk.len() {
            break;
        }
    }

    // A skipped drain chunk ends the drain too
    while let Some(written) = encode_chunk(encoder, &[], &mut writer, &mut summary)? {
        if written == 0 {
            break;
        }
    }
    writer.flush()?;

    tracing::debug!(
        chunks = summary.chunks,
        pcm_bytes = summary.pcm_bytes,
        encoded_bytes = summary.encoded_bytes,
        failed_chunks = summary.failed_chunks,
        "Stream encoded"
    );
    Ok(summary)
}

fn encode_chunk<F: FrameEncoder, W: Write>(
    encoder: &mut F,
    pcm: &[u8],
    writer: &mut W,
    summary: &mut StreamSummary,
) -> Result<Option<usize>> {
    summary.chunks += 1;
    match encoder.encode(pcm) {
        Ok(frame) => {
            writer.write_all(&frame)?;
            summary.encoded_bytes += frame.len() as u64;
            Ok(Some(frame.len()))
        }
        Err(e) if e.is_chunk_scoped() => {
            tracing::warn!(chunk = summary.chunks, "Skipping chunk: {}", e);
            summary.failed_chunks += 1;
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Read until `buf` is full or the reader is exhausted
fn fill_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
