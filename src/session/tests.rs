use super::*;
use crate::audio::{InputFormat, OutputFormat, i16_to_pcm_bytes};
use crate::error::SessionError;
use crate::testing::{MockEncodeResult, MockEngine, MockEngineConfig, open_mock_session};
use proptest::prelude::*;

fn scripted(script: Vec<MockEncodeResult>) -> MockEngine {
    MockEngine::default().with_script(script)
}

// --- lifecycle ---

#[test]
fn test_open_close_balanced() {
    let (mut session, probe) = open_mock_session(44100, 2);

    assert_eq!(session.state(), SessionState::Open);
    assert_eq!(probe.calls().live_handles(), 1);

    session.close();

    let calls = probe.calls();
    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(calls.opens, 1);
    assert_eq!(calls.closes, 1);
    assert!(session.is_released());
}

#[test]
fn test_open_applies_fixed_configuration() {
    let (session, probe) = open_mock_session(44100, 2);

    let calls = probe.calls();
    assert_eq!(calls.opened_with, vec![(44100, 2)]);
    assert_eq!(calls.get_configurations, 1);
    assert_eq!(calls.applied.len(), 1);

    let applied = calls.applied[0];
    assert_eq!(applied.input_format, InputFormat::I16);
    assert_eq!(applied.bit_rate, 8000);
    assert_eq!(applied.output_format, OutputFormat::Adts);
    assert_eq!(session.configuration(), Some(applied));
}

#[test]
fn test_open_defaults_when_absent() {
    let engine = MockEngine::default();
    let probe = engine.probe();

    let session = EncoderSession::open(engine, SessionConfig::default()).unwrap();

    assert_eq!(session.sample_rate(), 8000);
    assert_eq!(session.channels(), 2);
    assert_eq!(probe.calls().opened_with, vec![(8000, 2)]);
}

#[test]
fn test_open_rejects_explicit_zero() {
    let engine = MockEngine::default();
    let probe = engine.probe();
    let mut session = EncoderSession::uninitialized(engine);

    let err = session
        .open_with(SessionConfig::builder().sample_rate(0).build())
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::InvalidParameter {
            name: "sample_rate",
            ..
        }
    ));

    let err = session
        .open_with(SessionConfig::builder().channels(0).build())
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::InvalidParameter {
            name: "channels",
            ..
        }
    ));

    // Nothing was acquired, the session can still be opened
    assert_eq!(probe.calls().total(), 0);
    assert_eq!(session.state(), SessionState::Uninitialized);
    session.open_with(SessionConfig::new(16000, 1)).unwrap();
    assert_eq!(session.state(), SessionState::Open);
}

#[test]
fn test_open_configuration_rejected() {
    let engine = MockEngine::new(MockEngineConfig {
        reject_configuration: true,
        ..MockEngineConfig::default()
    });
    let probe = engine.probe();

    let err = EncoderSession::open(engine, SessionConfig::new(44100, 2)).unwrap_err();

    assert!(matches!(err, SessionError::ConfigurationRejected { .. }));
    assert!(err.is_fatal());
    // The handle acquired before the rejection is released
    let calls = probe.calls();
    assert_eq!(calls.opens, 1);
    assert_eq!(calls.closes, 1);
}

#[test]
fn test_open_engine_failure() {
    let engine = MockEngine::new(MockEngineConfig {
        fail_open: true,
        ..MockEngineConfig::default()
    });
    let probe = engine.probe();
    let mut session = EncoderSession::uninitialized(engine);

    let err = session.open_with(SessionConfig::default()).unwrap_err();

    assert!(matches!(
        err,
        SessionError::ResourceExhaustion {
            resource: "engine handle",
            ..
        }
    ));
    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(probe.calls().closes, 0);
}

#[test]
fn test_open_scratch_exhaustion() {
    let engine = MockEngine::new(MockEngineConfig {
        max_output_bytes: usize::MAX,
        ..MockEngineConfig::default()
    });
    let probe = engine.probe();
    let mut session = EncoderSession::uninitialized(engine);

    let err = session.open_with(SessionConfig::new(44100, 2)).unwrap_err();

    assert!(matches!(
        err,
        SessionError::ResourceExhaustion {
            resource: "scratch buffer",
            ..
        }
    ));
    assert!(err.is_fatal());
    assert_eq!(session.state(), SessionState::Closed);
    assert!(session.is_released());
    // The handle is returned before the allocation failure surfaces
    let calls = probe.calls();
    assert_eq!(calls.opens, 1);
    assert_eq!(calls.closes, 1);
    assert_eq!(calls.set_configurations, 0);
}

#[test]
fn test_second_open_is_invalid() {
    let (mut session, probe) = open_mock_session(44100, 2);

    let err = session.open_with(SessionConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        SessionError::InvalidState {
            operation: "open",
            state: SessionState::Open
        }
    ));

    session.close();
    let err = session.open_with(SessionConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        SessionError::InvalidState {
            state: SessionState::Closed,
            ..
        }
    ));
    assert_eq!(probe.calls().opens, 1);
}

#[test]
fn test_close_is_idempotent() {
    let (mut session, probe) = open_mock_session(48000, 1);

    session.close();
    session.close();
    drop(session);

    assert_eq!(probe.calls().closes, 1);
}

#[test]
fn test_drop_closes() {
    let (session, probe) = open_mock_session(48000, 2);

    drop(session);

    let calls = probe.calls();
    assert_eq!(calls.closes, 1);
    assert_eq!(calls.live_handles(), 0);
}

#[test]
fn test_close_uninitialized() {
    let engine = MockEngine::default();
    let probe = engine.probe();
    let mut session = EncoderSession::uninitialized(engine);

    session.close();

    assert_eq!(session.state(), SessionState::Closed);
    assert!(session.is_released());
    assert_eq!(probe.calls().total(), 0);
}

// --- encode ---

#[test]
fn test_input_chunk_follows_input_format() {
    let (session, _probe) = open_mock_session(44100, 2);
    let format = session.configuration().map(|c| c.input_format);

    assert_eq!(format, Some(InputFormat::I16));
    assert_eq!(
        session.input_chunk_bytes(),
        session.required_input_samples() * InputFormat::I16.bytes_per_sample()
    );
    assert_eq!(session.input_chunk_bytes(), 2048);
}

#[test]
fn test_encode_before_open() {
    let engine = MockEngine::default();
    let probe = engine.probe();
    let mut session = EncoderSession::uninitialized(engine);

    let err = session.encode(&[0u8; 64]).unwrap_err();

    assert!(matches!(
        err,
        SessionError::InvalidState {
            operation: "encode",
            state: SessionState::Uninitialized
        }
    ));
    assert_eq!(probe.calls().total(), 0);
}

#[test]
fn test_encode_after_close() {
    let (mut session, probe) = open_mock_session(44100, 2);
    session.close();
    let before = probe.calls().total();

    let err = session.encode(&[0u8; 2048]).unwrap_err();
    assert!(matches!(
        err,
        SessionError::InvalidState {
            state: SessionState::Closed,
            ..
        }
    ));
    assert!(session.flush().is_err());

    assert_eq!(probe.calls().total(), before);
}

#[test]
fn test_encode_scenario() {
    let engine = scripted(vec![MockEncodeResult::Bytes(200), MockEncodeResult::Bytes(0)]);
    let probe = engine.probe();
    let mut session = EncoderSession::open(engine, SessionConfig::new(44100, 2)).unwrap();

    assert_eq!(session.required_input_samples(), 1024);
    assert_eq!(session.max_output_bytes(), 768);

    let first = session.encode(&[0u8; 2048]).unwrap();
    assert_eq!(first.len(), 200);

    let second = session.encode(&[0u8; 100]).unwrap();
    assert!(second.is_empty());

    let calls = probe.calls();
    assert_eq!(calls.input_lengths, vec![1024, 50]);
    assert_eq!(calls.output_capacities, vec![768, 768]);
    assert_eq!(session.frames_encoded(), 2);
}

#[test]
fn test_encode_failure_keeps_session_open() {
    let engine = scripted(vec![MockEncodeResult::Fail(-5), MockEncodeResult::Bytes(10)]);
    let mut session = EncoderSession::open(engine, SessionConfig::new(44100, 2)).unwrap();

    let err = session.encode(&[0u8; 2048]).unwrap_err();
    assert!(matches!(err, SessionError::EncodeFailure { code: -5, .. }));
    assert!(err.is_chunk_scoped());
    assert_eq!(session.state(), SessionState::Open);

    let next = session.encode(&[0u8; 2048]).unwrap();
    assert_eq!(next.len(), 10);
    assert_eq!(session.frames_encoded(), 1);
}

#[test]
fn test_encode_overrun_is_failure() {
    let engine = scripted(vec![MockEncodeResult::Overrun]);
    let mut session = EncoderSession::open(engine, SessionConfig::new(44100, 2)).unwrap();

    let err = session.encode(&[0u8; 2048]).unwrap_err();

    assert!(matches!(
        err,
        SessionError::EncodeFailure {
            code: OUTPUT_OVERRUN,
            ..
        }
    ));
}

#[test]
fn test_encode_misaligned_input() {
    let (mut session, probe) = open_mock_session(44100, 2);
    let before = probe.calls().encodes;

    let err = session.encode(&[0u8; 3]).unwrap_err();

    assert!(matches!(err, SessionError::MisalignedInput { len: 3 }));
    assert_eq!(probe.calls().encodes, before);
    assert_eq!(session.state(), SessionState::Open);
}

#[test]
fn test_encode_oversized_input() {
    let (mut session, probe) = open_mock_session(44100, 2);

    let err = session.encode(&[0u8; 2050]).unwrap_err();

    assert!(matches!(
        err,
        SessionError::OversizedInput {
            samples: 1025,
            max: 1024
        }
    ));
    assert_eq!(probe.calls().encodes, 0);
}

#[test]
fn test_encode_passes_samples() {
    let (mut session, _probe) = open_mock_session(44100, 2);
    let samples: Vec<i16> = (0..1024).map(|i| i16::try_from(i).unwrap() - 512).collect();

    let from_bytes = session.encode(&i16_to_pcm_bytes(&samples)).unwrap();
    let from_samples = session.encode_samples(&samples).unwrap();

    // Default mock rule: input.len() / 8 bytes
    assert_eq!(from_bytes.len(), 128);
    assert_eq!(from_samples.len(), 128);
}

#[test]
fn test_flush_passes_zero_samples() {
    let (mut session, probe) = open_mock_session(44100, 2);

    let drained = session.flush().unwrap();

    assert!(drained.is_empty());
    assert_eq!(probe.calls().input_lengths, vec![0]);
}

#[test]
fn test_encode_outputs_do_not_alias() {
    let (mut session, _probe) = open_mock_session(44100, 2);

    let mut first = session.encode(&[0u8; 2048]).unwrap();
    let second = session.encode(&[0u8; 2048]).unwrap();

    assert!(first.iter().all(|&b| b == 1));
    assert!(second.iter().all(|&b| b == 2));
    assert_ne!(first.as_ptr(), second.as_ptr());

    first.fill(0xAA);
    assert!(second.iter().all(|&b| b == 2));
}

#[test]
fn test_scratch_allocated_once() {
    let (mut session, probe) = open_mock_session(44100, 2);

    for _ in 0..5 {
        session.encode(&[0u8; 2048]).unwrap();
    }

    let capacities = probe.calls().output_capacities;
    assert!(capacities.iter().all(|&c| c == 768));
    assert!(!session.is_released());
}

#[test]
fn test_session_state_display() {
    assert_eq!(SessionState::Uninitialized.to_string(), "uninitialized");
    assert_eq!(SessionState::Open.to_string(), "open");
    assert_eq!(SessionState::Closed.to_string(), "closed");
}

#[test]
fn test_frame_encoder_trait() {
    fn drive<F: FrameEncoder<Engine = MockEngine>>(engine: MockEngine) -> usize {
        let mut encoder = F::open(engine, SessionConfig::new(44100, 2)).unwrap();
        let chunk = vec![0u8; encoder.input_chunk_bytes()];
        let len = encoder.encode(&chunk).unwrap().len();
        encoder.close();
        len
    }

    let engine = MockEngine::default();
    let probe = engine.probe();

    assert_eq!(drive::<EncoderSession<MockEngine>>(engine), 128);
    assert_eq!(probe.calls().live_handles(), 0);
}

// --- shared.rs tests ---

#[test]
fn test_shared_session_across_threads() {
    let engine = MockEngine::default();
    let probe = engine.probe();
    let shared = SharedEncoderSession::open(engine, SessionConfig::new(44100, 2)).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            std::thread::spawn(move || {
                for _ in 0..25 {
                    let out = shared.encode(&[0u8; 2048]).unwrap();
                    assert_eq!(out.len(), 128);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(probe.calls().encodes, 100);
    assert_eq!(shared.with_session(|s| s.frames_encoded()), 100);

    shared.close();
    shared.close();
    assert_eq!(shared.state(), SessionState::Closed);
    assert!(shared.encode(&[0u8; 2048]).is_err());
    drop(shared);
    assert_eq!(probe.calls().closes, 1);
}

#[test]
fn test_shared_session_closes_on_last_drop() {
    let engine = MockEngine::default();
    let probe = engine.probe();
    let shared = SharedEncoderSession::open(engine, SessionConfig::default()).unwrap();
    let other = shared.clone();

    drop(shared);
    assert_eq!(probe.calls().closes, 0);
    assert_eq!(other.state(), SessionState::Open);

    drop(other);
    assert_eq!(probe.calls().closes, 1);
}

proptest! {
    #[test]
    fn prop_output_len_matches_reported(reported in 0usize..=768, samples in 0usize..=1024) {
        let engine = scripted(vec![MockEncodeResult::Bytes(reported)]);
        let mut session = EncoderSession::open(engine, SessionConfig::new(44100, 2)).unwrap();

        let out = session.encode(&vec![0u8; samples * 2]).unwrap();

        prop_assert_eq!(out.len(), reported);
    }

    #[test]
    fn prop_open_close_balanced(sample_rate in 1u32..=192_000, channels in 1u32..=8) {
        let engine = MockEngine::default();
        let probe = engine.probe();

        let mut session =
            EncoderSession::open(engine, SessionConfig::new(sample_rate, channels)).unwrap();
        session.close();
        session.close();

        let calls = probe.calls();
        prop_assert_eq!(calls.opens, 1);
        prop_assert_eq!(calls.closes, 1);
    }
}
