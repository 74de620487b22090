//! Thread-shareable encoder session

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{EncoderSession, FrameEncoder, SessionState};
use crate::engine::CodecEngine;
use crate::error::Result;
use crate::types::SessionConfig;

/// Encoder session guarded by a per-session lock
///
/// Clones refer to the same session. The lock is held for the whole of
/// `encode` and `close`, so at most one engine call is in flight. The session
/// is closed when the last clone is dropped.
pub struct SharedEncoderSession<E: CodecEngine> {
    inner: Arc<Mutex<EncoderSession<E>>>,
}

impl<E: CodecEngine> Clone for SharedEncoderSession<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: CodecEngine> SharedEncoderSession<E> {
    /// Open a session and wrap it
    ///
    /// # Errors
    ///
    /// Returns error if the session cannot be opened
    pub fn open(engine: E, config: SessionConfig) -> Result<Self> {
        Ok(Self::from_session(EncoderSession::open(engine, config)?))
    }

    /// Wrap an existing session
    #[must_use]
    pub fn from_session(session: EncoderSession<E>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Encode one PCM chunk under the session lock
    ///
    /// # Errors
    ///
    /// Returns error if the session is not open or the engine fails
    pub fn encode(&self, pcm: &[u8]) -> Result<Vec<u8>> {
        self.lock().encode(pcm)
    }

    /// Drain the engine under the session lock
    ///
    /// # Errors
    ///
    /// Returns error if the session is not open or the engine fails
    pub fn flush(&self) -> Result<Vec<u8>> {
        self.lock().flush()
    }

    /// Close the session for every clone
    pub fn close(&self) {
        self.lock().close();
    }

    /// Get current state
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.lock().state()
    }

    /// PCM bytes that make up one full input chunk
    #[must_use]
    pub fn input_chunk_bytes(&self) -> usize {
        self.lock().input_chunk_bytes()
    }

    /// Run `f` with exclusive access to the session
    pub fn with_session<T>(&self, f: impl FnOnce(&mut EncoderSession<E>) -> T) -> T {
        f(&mut self.lock())
    }

    // Session state only changes after engine calls return, so a poisoned
    // lock still guards a consistent session.
    fn lock(&self) -> MutexGuard<'_, EncoderSession<E>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E: CodecEngine> FrameEncoder for SharedEncoderSession<E> {
    type Engine = E;

    fn open(engine: E, config: SessionConfig) -> Result<Self> {
        SharedEncoderSession::open(engine, config)
    }

    fn encode(&mut self, pcm: &[u8]) -> Result<Vec<u8>> {
        SharedEncoderSession::encode(self, pcm)
    }

    fn input_chunk_bytes(&self) -> usize {
        SharedEncoderSession::input_chunk_bytes(self)
    }

    fn close(&mut self) {
        SharedEncoderSession::close(self);
    }
}
