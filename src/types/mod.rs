//! Core types module

mod config;


pub use config::{DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE, SessionConfig, SessionConfigBuilder};
