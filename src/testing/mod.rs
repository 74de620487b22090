//! Test doubles for the codec engine contract

pub mod mock_engine;

pub use mock_engine::{
    EngineCalls, EngineProbe, MockEncodeResult, MockEngine, MockEngineConfig, MockHandle,
};

use crate::session::EncoderSession;
use crate::types::SessionConfig;

/// Helper to open a session on a default mock engine.
///
/// Returns the session together with a probe on its engine.
///
/// # Panics
///
/// Panics if the session fails to open, which a default mock engine never
/// causes for non-zero parameters.
#[must_use]
pub fn open_mock_session(
    sample_rate: u32,
    channels: u32,
) -> (EncoderSession<MockEngine>, EngineProbe) {
    let engine = MockEngine::default();
    let probe = engine.probe();
    let session = EncoderSession::open(engine, SessionConfig::new(sample_rate, channels))
        .expect("mock session should open");
    (session, probe)
}
