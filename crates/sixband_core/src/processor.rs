//! Host-Facing Equalizer Processor
//!
//! Wraps the DSP engine with what a plugin host talks to: the stereo bus
//! layout check, the prepare/process lifecycle, the named parameter surface
//! and persisted state.
//!
//! # Threads
//!
//! ```text
//! ┌──────────────────────────────┐       ┌──────────────────────────────┐
//! │ Control thread (UI/automation)│       │ Audio thread                 │
//! │  params.set_by_key(..)  ──────┼─atomics─▶ process_block(buffer)      │
//! │  save_state / load_state      │       │  (no locks, no allocations)  │
//! └──────────────────────────────┘       └──────────────────────────────┘
//! ```

use std::sync::Arc;

use sixband_dsp::{
    AudioProcessor, DspError, DspResult, EngineConfig, EqEngine, EqParams, ParamDescriptor,
    PARAMETERS,
};
use tracing::{info, warn};

use crate::config::{BusLayout, StreamConfig, STEREO};
use crate::error::{EngineError, EngineResult};
use crate::state::{JsonStateCodec, StateCodec};

/// Name reported to hosts
pub const PROCESSOR_NAME: &str = "SixBand EQ";

/// The plugin-side processor
pub struct EqProcessor {
    params: Arc<EqParams>,
    engine: EqEngine,
    layout: BusLayout,
    codec: JsonStateCodec,
}

impl Default for EqProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl EqProcessor {
    /// Create a processor with default parameters and a stereo layout
    pub fn new() -> Self {
        let params = Arc::new(EqParams::new());
        Self {
            engine: EqEngine::new(Arc::clone(&params)),
            params,
            layout: BusLayout::stereo(),
            codec: JsonStateCodec,
        }
    }

    /// Handle for control threads to read and write parameters
    pub fn params(&self) -> Arc<EqParams> {
        Arc::clone(&self.params)
    }

    /// Every host-visible parameter
    pub fn parameters() -> &'static [ParamDescriptor] {
        &PARAMETERS
    }

    /// Whether a bus layout can be used
    pub fn is_layout_supported(layout: &BusLayout) -> bool {
        layout.is_supported()
    }

    /// Current bus layout
    pub fn layout(&self) -> BusLayout {
        self.layout
    }

    /// Apply a bus layout requested by the host
    pub fn set_layout(&mut self, layout: BusLayout) -> EngineResult<()> {
        if !Self::is_layout_supported(&layout) {
            warn!(
                "Rejecting bus layout {} in / {} out",
                layout.input_channels, layout.output_channels
            );
            return Err(EngineError::UnsupportedLayout {
                inputs: layout.input_channels,
                outputs: layout.output_channels,
            });
        }
        self.layout = layout;
        Ok(())
    }

    /// Prepare for playback on the stereo bus
    pub fn prepare_to_play(
        &mut self,
        sample_rate: f32,
        max_block_size: usize,
    ) -> EngineResult<EngineConfig> {
        self.prepare(StreamConfig {
            sample_rate,
            channels: self.layout.output_channels,
            buffer_size: max_block_size,
        })
    }

    /// Prepare for a full stream configuration
    ///
    /// Note: This allocates. Only call during setup, not in audio callback.
    pub fn prepare(&mut self, config: StreamConfig) -> EngineResult<EngineConfig> {
        if config.channels != STEREO {
            warn!("Rejecting {}-channel stream", config.channels);
            return Err(EngineError::UnsupportedLayout {
                inputs: config.channels,
                outputs: config.channels,
            });
        }
        config.validate().map_err(EngineError::ConfigError)?;

        let prepared = self.engine.prepare(config.into())?;
        info!(
            "{} ready ({:.1}ms blocks)",
            PROCESSOR_NAME,
            StreamConfig {
                sample_rate: prepared.sample_rate,
                ..config
            }
            .latency_ms()
        );
        Ok(prepared)
    }

    /// Whether `prepare` has succeeded at least once
    pub fn is_prepared(&self) -> bool {
        self.engine.is_prepared()
    }

    /// Process one interleaved stereo block in place.
    ///
    /// Before preparation this is a no-op and reports `NotPrepared`.
    ///
    /// # Real-time Safety
    /// No allocations, no locks.
    #[inline]
    pub fn process_block(&mut self, buffer: &mut [f32]) -> DspResult<()> {
        self.engine.process_interleaved(buffer)
    }

    /// Process separate left/right buffers in place
    #[inline]
    pub fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) -> DspResult<()> {
        self.engine.process_planar(&mut [left, right])
    }

    /// Clear filter history (stream restart)
    pub fn reset(&mut self) {
        self.engine.reset();
    }

    /// Read a parameter by stable key
    pub fn parameter(&self, key: &str) -> EngineResult<f32> {
        Ok(self.params.get_by_key(key)?)
    }

    /// Write a parameter by stable key
    pub fn set_parameter(&self, key: &str, value: f32) -> EngineResult<()> {
        Ok(self.params.set_by_key(key, value)?)
    }

    /// Serialize all parameter values
    pub fn save_state(&self) -> EngineResult<Vec<u8>> {
        Ok(self.codec.save(&self.params)?)
    }

    /// Restore parameter values; on failure the current values are kept
    pub fn load_state(&self, blob: &[u8]) -> EngineResult<()> {
        Ok(self.codec.load(blob, &self.params)?)
    }

    /// Combined response of the active bands (dB) at `frequency`
    pub fn magnitude_db_at(&self, frequency: f32) -> f32 {
        self.engine.magnitude_db_at(frequency)
    }
}

impl AudioProcessor for EqProcessor {
    fn prepare(&mut self, config: EngineConfig) -> DspResult<EngineConfig> {
        if config.channels != STEREO {
            return Err(DspError::InvalidChannelCount(config.channels));
        }
        self.engine.prepare(config)
    }

    fn process(&mut self, buffer: &mut [f32]) -> DspResult<()> {
        self.process_block(buffer)
    }

    fn reset(&mut self) {
        EqProcessor::reset(self);
    }

    fn name(&self) -> &'static str {
        PROCESSOR_NAME
    }
}
