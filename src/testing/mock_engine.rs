//! Scriptable codec engine for testing purposes.
//!
//! `MockEngine` implements the engine call contract without doing any real
//! coding. It records every call so tests can verify that sessions open and
//! close handles one to one and never touch the engine outside the `Open`
//! state. Encode results can be scripted per call.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use crate::audio::{AacProfile, InputFormat, OutputFormat};
use crate::engine::{CodecEngine, EncoderConfiguration, EngineError, EngineOpen};

/// Configuration for the mock engine.
#[derive(Debug, Clone)]
pub struct MockEngineConfig {
    /// Samples per call reported at open time.
    pub required_input_samples: usize,
    /// Output bound reported at open time.
    pub max_output_bytes: usize,
    /// Whether `open` fails.
    pub fail_open: bool,
    /// Whether `set_configuration` fails.
    pub reject_configuration: bool,
}

impl Default for MockEngineConfig {
    fn default() -> Self {
        Self {
            required_input_samples: 1024,
            max_output_bytes: 768,
            fail_open: false,
            reject_configuration: false,
        }
    }
}

/// Scripted outcome of one `encode_frame` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockEncodeResult {
    /// Write this many bytes.
    Bytes(usize),
    /// Fail with this engine code.
    Fail(i32),
    /// Report more bytes than the output buffer holds.
    Overrun,
}

/// Record of calls made into a mock engine.
#[derive(Debug, Clone, Default)]
pub struct EngineCalls {
    /// Successful `open` calls.
    pub opens: usize,
    /// Failed `open` calls; these hand out no handle.
    pub failed_opens: usize,
    /// `close` calls.
    pub closes: usize,
    /// `configuration` calls.
    pub get_configurations: usize,
    /// `set_configuration` calls.
    pub set_configurations: usize,
    /// `encode_frame` calls.
    pub encodes: usize,
    /// Parameters passed to `open`.
    pub opened_with: Vec<(u32, u32)>,
    /// Configurations passed to `set_configuration`.
    pub applied: Vec<EncoderConfiguration>,
    /// Input sample counts passed to `encode_frame`.
    pub input_lengths: Vec<usize>,
    /// Output capacities passed to `encode_frame`.
    pub output_capacities: Vec<usize>,
}

impl EngineCalls {
    /// Handles opened and not closed yet.
    #[must_use]
    pub fn live_handles(&self) -> usize {
        self.opens - self.closes
    }

    /// Total number of calls of any kind.
    #[must_use]
    pub fn total(&self) -> usize {
        self.opens
            + self.failed_opens
            + self.closes
            + self.get_configurations
            + self.set_configurations
            + self.encodes
    }
}

/// Shared view of the calls a mock engine has received.
///
/// Stays valid after the engine was moved into a session.
#[derive(Debug, Clone, Default)]
pub struct EngineProbe {
    calls: Arc<Mutex<EngineCalls>>,
}

impl EngineProbe {
    /// Snapshot of the calls so far.
    #[must_use]
    pub fn calls(&self) -> EngineCalls {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, f: impl FnOnce(&mut EngineCalls)) {
        f(&mut self.calls.lock().unwrap_or_else(PoisonError::into_inner));
    }
}

/// Per-instance state of the mock engine.
#[derive(Debug)]
pub struct MockHandle {
    /// Instance number, starting at 1.
    pub id: u64,
    config: EncoderConfiguration,
}

/// Codec engine double that records calls and follows a script.
///
/// With an empty script each call writes `input.len() / 8` bytes (capped at
/// the output capacity), every byte set to the call number.
#[derive(Debug, Default)]
pub struct MockEngine {
    config: MockEngineConfig,
    script: VecDeque<MockEncodeResult>,
    probe: EngineProbe,
    next_id: u64,
}

impl MockEngine {
    /// Create a mock engine.
    #[must_use]
    pub fn new(config: MockEngineConfig) -> Self {
        Self {
            config,
            script: VecDeque::new(),
            probe: EngineProbe::default(),
            next_id: 0,
        }
    }

    /// Queue encode outcomes, consumed one per `encode_frame` call.
    #[must_use]
    pub fn with_script(mut self, script: impl IntoIterator<Item = MockEncodeResult>) -> Self {
        self.script.extend(script);
        self
    }

    /// Get a probe that observes this engine's calls.
    #[must_use]
    pub fn probe(&self) -> EngineProbe {
        self.probe.clone()
    }
}

impl CodecEngine for MockEngine {
    type Handle = MockHandle;

    fn open(
        &mut self,
        sample_rate: u32,
        channels: u32,
    ) -> Result<EngineOpen<MockHandle>, EngineError> {
        let fail = self.config.fail_open;
        self.probe.record(|calls| {
            calls.opened_with.push((sample_rate, channels));
            if fail {
                calls.failed_opens += 1;
            } else {
                calls.opens += 1;
            }
        });

        if fail {
            return Err(EngineError::new(-1, "mock engine refused to open"));
        }

        self.next_id += 1;
        Ok(EngineOpen {
            handle: MockHandle {
                id: self.next_id,
                config: EncoderConfiguration {
                    input_format: InputFormat::Float,
                    bit_rate: 64_000,
                    output_format: OutputFormat::Raw,
                    profile: AacProfile::Lc,
                },
            },
            required_input_samples: self.config.required_input_samples,
            max_output_bytes: self.config.max_output_bytes,
        })
    }

    fn configuration(&self, handle: &MockHandle) -> EncoderConfiguration {
        self.probe.record(|calls| calls.get_configurations += 1);
        handle.config
    }

    fn set_configuration(
        &mut self,
        handle: &mut MockHandle,
        config: &EncoderConfiguration,
    ) -> Result<(), EngineError> {
        self.probe.record(|calls| {
            calls.set_configurations += 1;
            calls.applied.push(*config);
        });

        if self.config.reject_configuration {
            return Err(EngineError::new(-2, "mock engine rejected configuration"));
        }

        handle.config = *config;
        Ok(())
    }

    fn encode_frame(
        &mut self,
        _handle: &mut MockHandle,
        input: &[i16],
        output: &mut [u8],
    ) -> Result<usize, EngineError> {
        let mut call = 0;
        self.probe.record(|calls| {
            calls.encodes += 1;
            calls.input_lengths.push(input.len());
            calls.output_capacities.push(output.len());
            call = calls.encodes;
        });

        let written = match self.script.pop_front() {
            Some(MockEncodeResult::Bytes(n)) => n.min(output.len()),
            Some(MockEncodeResult::Fail(code)) => {
                return Err(EngineError::new(code, "mock engine encode failure"));
            }
            Some(MockEncodeResult::Overrun) => return Ok(output.len() + 1),
            None => (input.len() / 8).min(output.len()),
        };

        #[allow(clippy::cast_possible_truncation)]
        let byte = call as u8;
        output[..written].fill(byte);
        Ok(written)
    }

    fn close(&mut self, _handle: MockHandle) {
        self.probe.record(|calls| calls.closes += 1);
    }
}
