//! Six-Band EQ Engine
//!
//! Owns one [`BiquadFilter`] per band and routes audio through them in a
//! fixed order. Before every processing call the engine reads the shared
//! [`EqParams`], clamps each band into its valid range and recomputes all
//! coefficients. There is no change detection and no smoothing.
//!
//! # Lifecycle
//!
//! ```text
//! new() ──▶ Unprepared ──prepare(config)──▶ Prepared ──process()──▶ Prepared
//!                                              ▲                        │
//!                                              └────prepare(config)─────┘
//! ```

use std::sync::Arc;

use biquad::Coefficients;
use tracing::{debug, info, warn};

use crate::coefficients::{self, sanitize_sample_rate, NYQUIST_LIMIT, PASS_Q};
use crate::error::{DspError, DspResult};
use crate::filter::BiquadFilter;
use crate::params::{
    BandId, BandSettings, EqParams, BAND_COUNT, GAIN_RANGE_DB, HIGH_PASS_FLOOR_HZ, Q_RANGE,
};
use crate::response;

/// Order in which bands are applied.
///
/// The high-pass runs first so sub-sonic energy is gone before the shelves
/// and peaks see the signal; the low-pass runs last.
pub const PROCESSING_ORDER: [BandId; BAND_COUNT] = [
    BandId::HighPass,
    BandId::LowShelf,
    BandId::Peak1,
    BandId::Peak2,
    BandId::HighShelf,
    BandId::LowPass,
];

/// Stream parameters supplied by the host before processing starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Sample rate in Hz; non-positive values are replaced with 44.1kHz
    pub sample_rate: f32,
    /// Number of channels (at least 1)
    pub channels: usize,
    /// Largest block the host will pass to `process`
    pub max_block_size: usize,
}

impl EngineConfig {
    pub fn new(sample_rate: f32, channels: usize, max_block_size: usize) -> Self {
        Self {
            sample_rate,
            channels,
            max_block_size,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(48000.0, 2, 512)
    }
}

/// Clamp a band's raw settings into what the filter will actually be designed with
///
/// - frequency into the band's range, and never above 0.49 x sample rate
/// - high-pass frequency never below 20Hz
/// - gain and Q into their ranges; pass bands use the fixed Q
/// - non-finite values fall back to the band default
pub fn effective_settings(band: BandId, settings: BandSettings, sample_rate: f32) -> BandSettings {
    let defaults = band.default_settings();
    let (min, max) = band.frequency_range();

    let mut frequency_hz = finite_or(settings.frequency_hz, defaults.frequency_hz).clamp(min, max);
    frequency_hz = frequency_hz.min(sanitize_sample_rate(sample_rate) * NYQUIST_LIMIT);
    if band == BandId::HighPass {
        frequency_hz = frequency_hz.max(HIGH_PASS_FLOOR_HZ);
    }

    let (gain_db, q) = if band.has_gain_and_q() {
        (
            finite_or(settings.gain_db, defaults.gain_db).clamp(GAIN_RANGE_DB.0, GAIN_RANGE_DB.1),
            finite_or(settings.q, defaults.q).clamp(Q_RANGE.0, Q_RANGE.1),
        )
    } else {
        (0.0, PASS_Q)
    };

    BandSettings {
        shape: band.shape(),
        frequency_hz,
        gain_db,
        q,
        bypassed: settings.bypassed,
    }
}

#[inline]
fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Coefficients for a band from its effective settings
#[inline]
fn design(settings: &BandSettings, sample_rate: f32) -> Coefficients<f32> {
    coefficients::compute(
        settings.shape,
        sample_rate,
        settings.frequency_hz,
        settings.q,
        coefficients::db_to_gain(settings.gain_db),
    )
}

/// One band slot in the chain
struct Stage {
    band: BandId,
    filter: BiquadFilter,
    active: bool,
}

/// The six-band equalizer processor
///
/// Holds the filter state and processes audio samples.
/// Designed for real-time use: no allocations in `process_*()`.
pub struct EqEngine {
    params: Arc<EqParams>,
    // In PROCESSING_ORDER
    stages: [Stage; BAND_COUNT],
    config: Option<EngineConfig>,
}

impl EqEngine {
    /// Create an unprepared engine reading from `params`
    pub fn new(params: Arc<EqParams>) -> Self {
        let stages = PROCESSING_ORDER.map(|band| Stage {
            band,
            filter: BiquadFilter::identity(1),
            active: false,
        });

        Self {
            params,
            stages,
            config: None,
        }
    }

    /// Create an engine with its own default parameters and prepare it
    pub fn with_config(config: EngineConfig) -> DspResult<Self> {
        let mut engine = Self::new(Arc::new(EqParams::new()));
        engine.prepare(config)?;
        Ok(engine)
    }

    /// Allocate filter state for `config` and compute initial coefficients.
    ///
    /// May be called again at any time; all filter state is rebuilt from
    /// silence. Returns the configuration actually in effect (with the sample
    /// rate substituted if it was invalid).
    ///
    /// Note: This allocates. Only call during setup, not in audio callback.
    pub fn prepare(&mut self, config: EngineConfig) -> DspResult<EngineConfig> {
        if config.channels == 0 {
            return Err(DspError::InvalidChannelCount(config.channels));
        }
        if config.max_block_size == 0 {
            return Err(DspError::InvalidBlockSize(config.max_block_size));
        }

        let sample_rate = sanitize_sample_rate(config.sample_rate);
        if sample_rate != config.sample_rate {
            warn!(
                "Invalid sample rate {}Hz, using {}Hz instead",
                config.sample_rate, sample_rate
            );
        }
        let config = EngineConfig {
            sample_rate,
            ..config
        };

        for stage in &mut self.stages {
            stage.filter = BiquadFilter::identity(config.channels);
        }
        self.config = Some(config);
        self.update_coefficients(sample_rate);

        info!(
            "EQ engine prepared: {}Hz, {} channel(s), max block {}",
            config.sample_rate, config.channels, config.max_block_size
        );
        Ok(config)
    }

    /// Whether `prepare` has been called
    pub fn is_prepared(&self) -> bool {
        self.config.is_some()
    }

    /// Active configuration, if prepared
    pub fn config(&self) -> Option<EngineConfig> {
        self.config
    }

    /// Shared parameter store
    pub fn params(&self) -> &Arc<EqParams> {
        &self.params
    }

    fn sample_rate(&self) -> f32 {
        self.config
            .map_or(coefficients::DEFAULT_SAMPLE_RATE, |c| c.sample_rate)
    }

    /// Read every band's parameters and swap in fresh coefficients.
    ///
    /// # Real-time Safety
    /// No allocations, no locks: atomic loads and arithmetic only.
    #[inline]
    fn update_coefficients(&mut self, sample_rate: f32) {
        for stage in &mut self.stages {
            let raw = self.params.snapshot(stage.band);
            let settings = effective_settings(stage.band, raw, sample_rate);
            stage.filter.set_coefficients(design(&settings, sample_rate));
            stage.active = !settings.bypassed;
        }
    }

    /// Process an interleaved buffer in-place
    ///
    /// Buffer format: [L0, R0, L1, R1, ...] with the channel count given to
    /// `prepare`. Leaves the buffer untouched and returns
    /// [`DspError::NotPrepared`] if the engine was never prepared.
    ///
    /// # Real-time Safety
    /// No allocations. O(n) where n = buffer length.
    #[inline]
    pub fn process_interleaved(&mut self, buffer: &mut [f32]) -> DspResult<()> {
        let config = self.config.ok_or(DspError::NotPrepared)?;
        self.update_coefficients(config.sample_rate);

        for stage in &mut self.stages {
            if stage.active {
                stage.filter.process_interleaved(buffer);
            }
        }
        Ok(())
    }

    /// Process separate channel buffers in-place
    ///
    /// Accepts up to the prepared channel count; more slices than that is
    /// [`DspError::InvalidChannelCount`] and nothing is processed.
    ///
    /// # Real-time Safety
    /// No allocations. O(n) where n = total samples.
    #[inline]
    pub fn process_planar(&mut self, channels: &mut [&mut [f32]]) -> DspResult<()> {
        let config = self.config.ok_or(DspError::NotPrepared)?;
        if channels.len() > config.channels {
            return Err(DspError::InvalidChannelCount(channels.len()));
        }
        self.update_coefficients(config.sample_rate);

        for stage in &mut self.stages {
            if stage.active {
                stage.filter.process_planar(channels);
            }
        }
        Ok(())
    }

    /// Reset filter state (clear delay lines)
    ///
    /// Call when the stream restarts to prevent filter ringing
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.filter.reset();
        }
        debug!("EQ filter state reset");
    }

    fn stage(&self, band: BandId) -> &Stage {
        // PROCESSING_ORDER contains every band exactly once
        let position = PROCESSING_ORDER
            .iter()
            .position(|&b| b == band)
            .unwrap_or(0);
        &self.stages[position]
    }

    /// The clamped settings a band is (or would be) designed with right now
    pub fn effective_band(&self, band: BandId) -> BandSettings {
        effective_settings(band, self.params.snapshot(band), self.sample_rate())
    }

    /// Coefficients computed for a band by the most recent update
    pub fn band_coefficients(&self, band: BandId) -> &Coefficients<f32> {
        self.stage(band).filter.coefficients()
    }

    /// Combined response (dB) of every non-bypassed band at `frequency`,
    /// evaluated from the current parameters
    pub fn magnitude_db_at(&self, frequency: f32) -> f32 {
        let sample_rate = self.sample_rate();
        let active = PROCESSING_ORDER.map(|band| {
            let settings = self.effective_band(band);
            (!settings.bypassed).then(|| design(&settings, sample_rate))
        });
        response::cascade_magnitude_db(active.iter().flatten(), frequency, sample_rate)
    }
}
