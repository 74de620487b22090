/// Sample rate used when none is given (Hz)
pub const DEFAULT_SAMPLE_RATE: u32 = 8000;

/// Channel count used when none is given
pub const DEFAULT_CHANNELS: u32 = 2;

/// Acoustic parameters an encoder session is opened with
///
/// Both fields are optional. An absent value falls back to its default; an
/// explicit value, including zero, is passed through as given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Sample rate in Hz (default: 8000)
    pub sample_rate: Option<u32>,

    /// Number of interleaved channels (default: 2)
    pub channels: Option<u32>,
}

impl SessionConfig {
    /// Create a config with both parameters given explicitly
    #[must_use]
    pub fn new(sample_rate: u32, channels: u32) -> Self {
        Self {
            sample_rate: Some(sample_rate),
            channels: Some(channels),
        }
    }

    /// Create a new config builder
    #[must_use]
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Sample rate with the default applied if absent
    #[must_use]
    pub fn resolved_sample_rate(&self) -> u32 {
        self.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE)
    }

    /// Channel count with the default applied if absent
    #[must_use]
    pub fn resolved_channels(&self) -> u32 {
        self.channels.unwrap_or(DEFAULT_CHANNELS)
    }
}

/// Builder for `SessionConfig`
#[derive(Debug, Clone, Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    /// Set sample rate in Hz
    #[must_use]
    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.config.sample_rate = Some(sample_rate);
        self
    }

    /// Set channel count
    #[must_use]
    pub fn channels(mut self, channels: u32) -> Self {
        self.config.channels = Some(channels);
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> SessionConfig {
        self.config
    }
}
