//! Band Parameters
//!
//! The six bands' controls (frequency, gain, Q, bypass) stored as independent
//! atomic scalars. Any thread may write them; the audio thread reads them at
//! the start of every block without locking.
//!
//! There is no cross-field atomicity: the audio thread may observe a new
//! frequency together with an old gain for one block. The result is still a
//! stable filter, just momentarily "between" two settings.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::coefficients::{FilterShape, PASS_Q};
use crate::error::{DspError, DspResult};

/// Number of bands in the equalizer
pub const BAND_COUNT: usize = 6;

/// Number of host-visible parameters
pub const PARAM_COUNT: usize = 20;

/// Gain range for shelf and peak bands (dB)
pub const GAIN_RANGE_DB: (f32, f32) = (-15.0, 15.0);

/// Q range for shelf and peak bands
pub const Q_RANGE: (f32, f32) = (0.3, 4.0);

/// Skew applied to frequency controls when mapping to a normalized 0..1 range.
/// Values below 1 give more resolution at the low end.
pub const FREQ_SKEW: f32 = 0.25;

/// Lowest cutoff the high-pass band is ever designed at (Hz)
pub const HIGH_PASS_FLOOR_HZ: f32 = 20.0;

/// The six bands, in parameter (declaration) order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BandId {
    LowShelf,
    Peak1,
    Peak2,
    HighShelf,
    HighPass,
    LowPass,
}

impl BandId {
    /// All bands in parameter order. Not the processing order.
    pub const ALL: [BandId; BAND_COUNT] = [
        BandId::LowShelf,
        BandId::Peak1,
        BandId::Peak2,
        BandId::HighShelf,
        BandId::HighPass,
        BandId::LowPass,
    ];

    /// Position in [`BandId::ALL`]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn shape(self) -> FilterShape {
        match self {
            BandId::LowShelf => FilterShape::LowShelf,
            BandId::Peak1 | BandId::Peak2 => FilterShape::Peaking,
            BandId::HighShelf => FilterShape::HighShelf,
            BandId::HighPass => FilterShape::HighPass,
            BandId::LowPass => FilterShape::LowPass,
        }
    }

    /// Human-readable band name
    pub const fn label(self) -> &'static str {
        match self {
            BandId::LowShelf => "LowShelf",
            BandId::Peak1 => "Peak1",
            BandId::Peak2 => "Peak2",
            BandId::HighShelf => "HighShelf",
            BandId::HighPass => "High-Pass",
            BandId::LowPass => "Low-Pass",
        }
    }

    /// Valid frequency range (Hz)
    pub const fn frequency_range(self) -> (f32, f32) {
        match self {
            BandId::LowShelf => (20.0, 250.0),
            BandId::Peak1 => (150.0, 2000.0),
            BandId::Peak2 => (1000.0, 12000.0),
            BandId::HighShelf => (4000.0, 20000.0),
            BandId::HighPass => (20.0, 400.0),
            BandId::LowPass => (4000.0, 20000.0),
        }
    }

    /// Whether gain and Q are user-adjustable for this band
    pub const fn has_gain_and_q(self) -> bool {
        !matches!(self, BandId::HighPass | BandId::LowPass)
    }

    /// Factory settings for this band
    pub const fn default_settings(self) -> BandSettings {
        let (frequency_hz, q, bypassed) = match self {
            BandId::LowShelf => (120.0, 0.7, false),
            BandId::Peak1 => (750.0, 1.0, false),
            BandId::Peak2 => (3000.0, 1.0, false),
            BandId::HighShelf => (8000.0, 0.7, false),
            BandId::HighPass => (20.0, PASS_Q, true),
            BandId::LowPass => (20000.0, PASS_Q, true),
        };
        BandSettings {
            shape: self.shape(),
            frequency_hz,
            gain_db: 0.0,
            q,
            bypassed,
        }
    }
}

/// Plain (non-atomic) snapshot of one band's settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandSettings {
    pub shape: FilterShape,
    pub frequency_hz: f32,
    pub gain_db: f32,
    pub q: f32,
    pub bypassed: bool,
}

/// Lock-free storage for one band
///
/// Rust pattern: AtomicF32 doesn't exist, so f32 values are stored as bits
/// in an AtomicU32.
pub struct BandParams {
    frequency_bits: AtomicU32,
    gain_bits: AtomicU32,
    q_bits: AtomicU32,
    bypassed: AtomicBool,
}

impl BandParams {
    pub fn new(settings: BandSettings) -> Self {
        Self {
            frequency_bits: AtomicU32::new(settings.frequency_hz.to_bits()),
            gain_bits: AtomicU32::new(settings.gain_db.to_bits()),
            q_bits: AtomicU32::new(settings.q.to_bits()),
            bypassed: AtomicBool::new(settings.bypassed),
        }
    }

    // Relaxed ordering is fine: each field is an independent value and
    // nothing else is published alongside it

    pub fn frequency(&self) -> f32 {
        f32::from_bits(self.frequency_bits.load(Ordering::Relaxed))
    }

    pub fn set_frequency(&self, hz: f32) {
        self.frequency_bits.store(hz.to_bits(), Ordering::Relaxed);
    }

    pub fn gain_db(&self) -> f32 {
        f32::from_bits(self.gain_bits.load(Ordering::Relaxed))
    }

    pub fn set_gain_db(&self, db: f32) {
        self.gain_bits.store(db.to_bits(), Ordering::Relaxed);
    }

    pub fn q(&self) -> f32 {
        f32::from_bits(self.q_bits.load(Ordering::Relaxed))
    }

    pub fn set_q(&self, q: f32) {
        self.q_bits.store(q.to_bits(), Ordering::Relaxed);
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypassed.load(Ordering::Relaxed)
    }

    pub fn set_bypassed(&self, bypassed: bool) {
        self.bypassed.store(bypassed, Ordering::Relaxed);
    }

    /// Read every field once
    #[inline]
    pub fn snapshot(&self, shape: FilterShape) -> BandSettings {
        BandSettings {
            shape,
            frequency_hz: self.frequency(),
            gain_db: self.gain_db(),
            q: self.q(),
            bypassed: self.is_bypassed(),
        }
    }

    fn store(&self, settings: BandSettings) {
        self.set_frequency(settings.frequency_hz);
        self.set_gain_db(settings.gain_db);
        self.set_q(settings.q);
        self.set_bypassed(settings.bypassed);
    }
}

/// Which control of a band a parameter addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Frequency,
    Gain,
    Q,
    Bypass,
}

/// Address of one control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId {
    pub band: BandId,
    pub kind: ParamKind,
}

impl ParamId {
    pub const fn new(band: BandId, kind: ParamKind) -> Self {
        Self { band, kind }
    }
}

/// Value domain of a parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamRange {
    /// Continuous value; `skew` < 1 spends more of the normalized range on low values
    Continuous { min: f32, max: f32, skew: f32 },
    /// Boolean switch, stored as 0.0 / 1.0
    Toggle,
}

/// Metadata for one host-visible parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    pub id: ParamId,
    /// Stable identifier used for automation and persisted state
    pub key: &'static str,
    /// Label shown by generic host UIs
    pub label: &'static str,
    pub range: ParamRange,
    pub default: f32,
}

impl ParamDescriptor {
    const fn frequency(band: BandId, key: &'static str, label: &'static str) -> Self {
        let (min, max) = band.frequency_range();
        Self {
            id: ParamId::new(band, ParamKind::Frequency),
            key,
            label,
            range: ParamRange::Continuous {
                min,
                max,
                skew: FREQ_SKEW,
            },
            default: band.default_settings().frequency_hz,
        }
    }

    const fn gain(band: BandId, key: &'static str, label: &'static str) -> Self {
        Self {
            id: ParamId::new(band, ParamKind::Gain),
            key,
            label,
            range: ParamRange::Continuous {
                min: GAIN_RANGE_DB.0,
                max: GAIN_RANGE_DB.1,
                skew: 1.0,
            },
            default: band.default_settings().gain_db,
        }
    }

    const fn q(band: BandId, key: &'static str, label: &'static str) -> Self {
        Self {
            id: ParamId::new(band, ParamKind::Q),
            key,
            label,
            range: ParamRange::Continuous {
                min: Q_RANGE.0,
                max: Q_RANGE.1,
                skew: 1.0,
            },
            default: band.default_settings().q,
        }
    }

    const fn bypass(band: BandId, key: &'static str, label: &'static str) -> Self {
        Self {
            id: ParamId::new(band, ParamKind::Bypass),
            key,
            label,
            range: ParamRange::Toggle,
            default: if band.default_settings().bypassed { 1.0 } else { 0.0 },
        }
    }

    /// Clamp a plain value into this parameter's range
    pub fn clamp(&self, value: f32) -> f32 {
        match self.range {
            ParamRange::Continuous { min, max, .. } => {
                if value.is_finite() {
                    value.clamp(min, max)
                } else {
                    self.default
                }
            }
            ParamRange::Toggle => toggle_value(value > 0.5),
        }
    }

    /// Map a plain value to 0..1
    pub fn to_normalized(&self, value: f32) -> f32 {
        match self.range {
            ParamRange::Continuous { min, max, skew } => {
                let proportion = (self.clamp(value) - min) / (max - min);
                if skew == 1.0 {
                    proportion
                } else {
                    proportion.powf(skew)
                }
            }
            ParamRange::Toggle => toggle_value(value > 0.5),
        }
    }

    /// Map 0..1 back to a plain value
    pub fn from_normalized(&self, normalized: f32) -> f32 {
        let normalized = if normalized.is_finite() {
            normalized.clamp(0.0, 1.0)
        } else {
            0.0
        };
        match self.range {
            ParamRange::Continuous { min, max, skew } => {
                let proportion = if skew == 1.0 || normalized == 0.0 {
                    normalized
                } else {
                    (normalized.ln() / skew).exp()
                };
                min + (max - min) * proportion
            }
            ParamRange::Toggle => toggle_value(normalized > 0.5),
        }
    }
}

#[inline]
fn toggle_value(on: bool) -> f32 {
    if on {
        1.0
    } else {
        0.0
    }
}

/// Every host-visible parameter, in host order
pub const PARAMETERS: [ParamDescriptor; PARAM_COUNT] = [
    // Low shelf
    ParamDescriptor::frequency(BandId::LowShelf, "LS_FREQ", "LowShelf Freq"),
    ParamDescriptor::gain(BandId::LowShelf, "LS_GAIN", "LowShelf Gain"),
    ParamDescriptor::q(BandId::LowShelf, "LS_Q", "LowShelf Q"),
    ParamDescriptor::bypass(BandId::LowShelf, "LS_BYP", "LowShelf Bypass"),
    // Peak 1
    ParamDescriptor::frequency(BandId::Peak1, "P1_FREQ", "Peak1 Freq"),
    ParamDescriptor::gain(BandId::Peak1, "P1_GAIN", "Peak1 Gain"),
    ParamDescriptor::q(BandId::Peak1, "P1_Q", "Peak1 Q"),
    ParamDescriptor::bypass(BandId::Peak1, "P1_BYP", "Peak1 Bypass"),
    // Peak 2
    ParamDescriptor::frequency(BandId::Peak2, "P2_FREQ", "Peak2 Freq"),
    ParamDescriptor::gain(BandId::Peak2, "P2_GAIN", "Peak2 Gain"),
    ParamDescriptor::q(BandId::Peak2, "P2_Q", "Peak2 Q"),
    ParamDescriptor::bypass(BandId::Peak2, "P2_BYP", "Peak2 Bypass"),
    // High shelf
    ParamDescriptor::frequency(BandId::HighShelf, "HS_FREQ", "HighShelf Freq"),
    ParamDescriptor::gain(BandId::HighShelf, "HS_GAIN", "HighShelf Gain"),
    ParamDescriptor::q(BandId::HighShelf, "HS_Q", "HighShelf Q"),
    ParamDescriptor::bypass(BandId::HighShelf, "HS_BYP", "HighShelf Bypass"),
    // HP/LP
    ParamDescriptor::frequency(BandId::HighPass, "HP_FREQ", "High-Pass Freq"),
    ParamDescriptor::bypass(BandId::HighPass, "HP_BYP", "High-Pass Bypass"),
    ParamDescriptor::frequency(BandId::LowPass, "LP_FREQ", "Low-Pass Freq"),
    ParamDescriptor::bypass(BandId::LowPass, "LP_BYP", "Low-Pass Bypass"),
];

/// Descriptor for a control, if that band has it
pub fn descriptor(id: ParamId) -> Option<&'static ParamDescriptor> {
    PARAMETERS.iter().find(|d| d.id == id)
}

/// Descriptor by stable key (e.g. "LS_FREQ")
pub fn find(key: &str) -> Option<&'static ParamDescriptor> {
    PARAMETERS.iter().find(|d| d.key == key)
}

/// The full parameter set shared between control threads and the audio thread
///
/// Share it with `Arc<EqParams>`; every accessor takes `&self`.
pub struct EqParams {
    bands: [BandParams; BAND_COUNT],
}

impl Default for EqParams {
    fn default() -> Self {
        Self::new()
    }
}

impl EqParams {
    /// Parameters at factory defaults
    pub fn new() -> Self {
        Self {
            bands: BandId::ALL.map(|band| BandParams::new(band.default_settings())),
        }
    }

    pub fn band(&self, band: BandId) -> &BandParams {
        &self.bands[band.index()]
    }

    /// Current settings of one band
    #[inline]
    pub fn snapshot(&self, band: BandId) -> BandSettings {
        self.bands[band.index()].snapshot(band.shape())
    }

    /// Overwrite one band's settings field by field
    pub fn apply(&self, band: BandId, settings: BandSettings) {
        self.bands[band.index()].store(settings);
    }

    /// Restore every control to its factory default
    pub fn reset_to_defaults(&self) {
        for band in BandId::ALL {
            self.apply(band, band.default_settings());
        }
    }

    /// Read a control as a plain value (bypass reads as 0.0 / 1.0)
    pub fn get(&self, id: ParamId) -> f32 {
        let band = self.band(id.band);
        match id.kind {
            ParamKind::Frequency => band.frequency(),
            ParamKind::Gain => band.gain_db(),
            ParamKind::Q => band.q(),
            ParamKind::Bypass => toggle_value(band.is_bypassed()),
        }
    }

    /// Write a control as a plain value (bypass is on above 0.5).
    ///
    /// Out-of-range values are stored as given and clamped when the audio
    /// thread uses them.
    pub fn set(&self, id: ParamId, value: f32) {
        let band = self.band(id.band);
        match id.kind {
            ParamKind::Frequency => band.set_frequency(value),
            ParamKind::Gain => band.set_gain_db(value),
            ParamKind::Q => band.set_q(value),
            ParamKind::Bypass => band.set_bypassed(value > 0.5),
        }
    }

    /// Read by stable key
    pub fn get_by_key(&self, key: &str) -> DspResult<f32> {
        let descriptor = find(key).ok_or_else(|| DspError::UnknownParameter(key.to_string()))?;
        Ok(self.get(descriptor.id))
    }

    /// Write by stable key
    pub fn set_by_key(&self, key: &str, value: f32) -> DspResult<()> {
        let descriptor = find(key).ok_or_else(|| DspError::UnknownParameter(key.to_string()))?;
        self.set(descriptor.id, value);
        Ok(())
    }

    /// Read by key as a normalized 0..1 value
    pub fn get_normalized(&self, key: &str) -> DspResult<f32> {
        let descriptor = find(key).ok_or_else(|| DspError::UnknownParameter(key.to_string()))?;
        Ok(descriptor.to_normalized(self.get(descriptor.id)))
    }

    /// Write by key from a normalized 0..1 value
    pub fn set_normalized(&self, key: &str, normalized: f32) -> DspResult<()> {
        let descriptor = find(key).ok_or_else(|| DspError::UnknownParameter(key.to_string()))?;
        self.set(descriptor.id, descriptor.from_normalized(normalized));
        Ok(())
    }
}
