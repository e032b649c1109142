//! Stream and Bus Configuration

use serde::{Deserialize, Serialize};
use sixband_dsp::EngineConfig;

/// Channels per bus the processor accepts
pub const STEREO: usize = 2;

/// Audio stream configuration as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Sample rate in Hz (e.g., 44100, 48000, 96000)
    pub sample_rate: f32,

    /// Number of audio channels (1 = mono, 2 = stereo)
    pub channels: usize,

    /// Maximum buffer size in frames
    pub buffer_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            channels: STEREO,
            buffer_size: 512,
        }
    }
}

impl StreamConfig {
    /// Calculate latency in milliseconds for this configuration
    pub fn latency_ms(&self) -> f32 {
        (self.buffer_size as f32 / self.sample_rate) * 1000.0
    }

    /// Validate configuration.
    ///
    /// The sample rate is not checked here: the engine substitutes a safe
    /// default for non-positive rates instead of rejecting them.
    pub fn validate(&self) -> Result<(), String> {
        if self.channels != STEREO {
            return Err(format!("Invalid channel count: {}", self.channels));
        }
        if self.buffer_size == 0 {
            return Err(format!("Invalid buffer size: {}", self.buffer_size));
        }
        Ok(())
    }
}

impl From<StreamConfig> for EngineConfig {
    fn from(config: StreamConfig) -> Self {
        EngineConfig::new(config.sample_rate, config.channels, config.buffer_size)
    }
}

/// Main input/output bus channel counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusLayout {
    pub input_channels: usize,
    pub output_channels: usize,
}

impl Default for BusLayout {
    fn default() -> Self {
        Self::stereo()
    }
}

impl BusLayout {
    pub fn new(input_channels: usize, output_channels: usize) -> Self {
        Self {
            input_channels,
            output_channels,
        }
    }

    pub fn stereo() -> Self {
        Self::new(STEREO, STEREO)
    }

    /// Only stereo in / stereo out is supported
    pub fn is_supported(&self) -> bool {
        self.input_channels == STEREO && self.output_channels == STEREO
    }
}
