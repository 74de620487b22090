//! Common test utilities and fixtures
#![allow(dead_code)]

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Initialize test logging (call once per test module)
pub fn init_logging() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::from_default_env().add_directive("aac_session=trace".parse().unwrap());

        fmt().with_env_filter(filter).with_test_writer().init();
    });
}

/// Interleaved 16-bit sine wave as little-endian PCM bytes
pub fn sine_pcm(frequency: f32, sample_rate: u32, channels: u32, frames: usize) -> Vec<u8> {
    let mut samples = Vec::with_capacity(frames * channels as usize);
    for i in 0..frames {
        #[allow(clippy::cast_precision_loss)]
        let t = i as f32 / sample_rate as f32;
        #[allow(clippy::cast_possible_truncation)]
        let value = ((t * frequency * std::f32::consts::TAU).sin() * 8000.0) as i16;
        for _ in 0..channels {
            samples.push(value);
        }
    }
    aac_session::audio::i16_to_pcm_bytes(&samples)
}
