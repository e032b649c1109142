//! SixBand Core - Host-Facing Processor
//!
//! This crate wraps the DSP engine with the surface a plugin host uses:
//! - Stereo-only bus layout negotiation
//! - prepare/process lifecycle with safe fallbacks for bad configuration
//! - 20 named parameters, addressable by stable key from any thread
//! - Save/restore of all parameters as an opaque state blob
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Control Thread (UI / automation)            │
//! │      set_parameter ──▶ Arc<EqParams> ◀── save/load_state    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ atomic loads
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Audio Thread                           │
//! │   recompute coefficients ──▶ HP ▶ LS ▶ P1 ▶ P2 ▶ HS ▶ LP    │
//! │              (Zero allocation in this path)                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod processor;
mod state;

pub use config::{BusLayout, StreamConfig, STEREO};
pub use error::{EngineError, EngineResult, StateError};
pub use processor::{EqProcessor, PROCESSOR_NAME};
pub use state::{JsonStateCodec, ParamSnapshot, ParamValue, StateCodec, STATE_FORMAT, STATE_VERSION};

// Re-export DSP types for convenience
pub use sixband_dsp::{
    AudioProcessor, BandId, BandSettings, EngineConfig, EqParams, ParamDescriptor, PARAMETERS,
};
