//! Integration tests for the encoder session lifecycle against a mock engine

mod common;

use aac_session::testing::{MockEncodeResult, MockEngine, MockEngineConfig};
use aac_session::{EncoderSession, SessionConfig, SessionError, SessionState, SharedEncoderSession};

#[test]
fn test_full_lifecycle() {
    common::init_logging();
    let engine = MockEngine::new(MockEngineConfig {
        required_input_samples: 2048,
        max_output_bytes: 1536,
        ..MockEngineConfig::default()
    });
    let probe = engine.probe();

    let mut session = EncoderSession::open(engine, SessionConfig::new(44100, 2)).unwrap();
    assert_eq!(session.input_chunk_bytes(), 4096);
    assert_eq!(session.max_output_bytes(), 1536);

    let pcm = common::sine_pcm(440.0, 44100, 2, 1024);
    for _ in 0..10 {
        let frame = session.encode(&pcm).unwrap();
        assert_eq!(frame.len(), 256);
    }
    let drained = session.flush().unwrap();
    assert!(drained.is_empty());

    session.close();
    assert!(session.is_released());

    let calls = probe.calls();
    assert_eq!(calls.encodes, 11);
    assert_eq!(calls.opens, calls.closes);
}

#[test]
fn test_open_encode_drain_scenario() {
    common::init_logging();
    let engine = MockEngine::default().with_script([
        MockEncodeResult::Bytes(200),
        MockEncodeResult::Bytes(0),
    ]);

    let mut session = EncoderSession::open(engine, SessionConfig::new(44100, 2)).unwrap();

    assert_eq!(session.encode(&[0u8; 2048]).unwrap().len(), 200);
    assert_eq!(session.encode(&[0u8; 512]).unwrap().len(), 0);
}

#[test]
fn test_rejected_configuration_is_not_silent() {
    common::init_logging();
    let engine = MockEngine::new(MockEngineConfig {
        reject_configuration: true,
        ..MockEngineConfig::default()
    });
    let probe = engine.probe();

    match EncoderSession::open(engine, SessionConfig::default()) {
        Err(SessionError::ConfigurationRejected { source, .. }) => {
            assert_eq!(source.map(|e| e.code), Some(-2));
        }
        other => panic!("Expected ConfigurationRejected, got {other:?}"),
    }
    assert_eq!(probe.calls().live_handles(), 0);
}

#[test]
fn test_independent_sessions_in_parallel() {
    common::init_logging();
    let configs = [(8000, 1), (16000, 2), (44100, 2), (48000, 1)];

    let handles: Vec<_> = configs
        .into_iter()
        .map(|(rate, channels)| {
            std::thread::spawn(move || {
                let engine = MockEngine::default();
                let probe = engine.probe();
                let mut session =
                    EncoderSession::open(engine, SessionConfig::new(rate, channels)).unwrap();
                for _ in 0..50 {
                    session.encode(&[0u8; 2048]).unwrap();
                }
                drop(session);
                probe.calls()
            })
        })
        .collect();

    for (handle, (rate, channels)) in handles.into_iter().zip(configs) {
        let calls = handle.join().unwrap();
        assert_eq!(calls.opened_with, vec![(rate, channels)]);
        assert_eq!(calls.encodes, 50);
        assert_eq!(calls.closes, 1);
    }
}

#[test]
fn test_shared_session_serializes_encodes() {
    common::init_logging();
    let engine = MockEngine::default();
    let probe = engine.probe();
    let shared = SharedEncoderSession::open(engine, SessionConfig::new(44100, 2)).unwrap();

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let shared = shared.clone();
            scope.spawn(move || {
                for _ in 0..10 {
                    shared.encode(&[0u8; 2048]).unwrap();
                }
            });
        }
    });

    shared.close();
    assert_eq!(shared.state(), SessionState::Closed);
    let calls = probe.calls();
    assert_eq!(calls.encodes, 80);
    assert_eq!(calls.closes, 1);
}
