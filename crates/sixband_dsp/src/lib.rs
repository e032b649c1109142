//! SixBand DSP - Digital Signal Processing Module
//!
//! This crate provides the equalizer's signal path:
//! - Biquad coefficient design for shelf, peak and pass shapes (RBJ cookbook)
//! - Multi-channel biquad stages with per-channel delay state
//! - A fixed six-band chain (HP, low shelf, two peaks, high shelf, LP)
//! - Lock-free parameter storage shared with control threads
//!
//! # Architecture
//!
//! The DSP chain follows a strict "no allocation in audio callback" rule.
//! Coefficients are recomputed from atomically-read parameters at the start
//! of every block, on the audio thread, before any sample is filtered.

pub mod coefficients;
mod engine;
mod error;
mod filter;
pub mod params;
mod processor;
pub mod response;

pub use coefficients::{db_to_gain, FilterShape, DEFAULT_SAMPLE_RATE, PASS_Q};
pub use engine::{effective_settings, EngineConfig, EqEngine, PROCESSING_ORDER};
pub use error::{DspError, DspResult};
pub use filter::BiquadFilter;
pub use params::{
    BandId, BandParams, BandSettings, EqParams, ParamDescriptor, ParamId, ParamKind, ParamRange,
    BAND_COUNT, PARAMETERS, PARAM_COUNT,
};
pub use processor::AudioProcessor;
