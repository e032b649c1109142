//! Persisted Parameter State
//!
//! Snapshots all 20 parameters into an opaque blob the host stores with a
//! session, and restores them from one.
//!
//! # Blob format
//!
//! UTF-8 JSON:
//!
//! ```json
//! {
//!   "format": "sixband-state",
//!   "version": 1,
//!   "params": { "HP_BYP": true, "HP_FREQ": 20.0, "LS_FREQ": 120.0, ... }
//! }
//! ```
//!
//! A blob is validated completely before any value is applied, so a rejected
//! blob never leaves the parameters half-restored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sixband_dsp::{EqParams, ParamRange, PARAMETERS, PARAM_COUNT};
use tracing::{debug, info, warn};

use crate::error::StateError;

/// Value of the `format` field
pub const STATE_FORMAT: &str = "sixband-state";

/// Newest blob version this build writes and reads
pub const STATE_VERSION: u32 = 1;

/// A stored parameter value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Switch(bool),
    Number(f32),
}

/// Serializable snapshot of every parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSnapshot {
    pub format: String,
    pub version: u32,
    pub params: BTreeMap<String, ParamValue>,
}

impl ParamSnapshot {
    /// Read every parameter's current value, clamped into its range.
    ///
    /// Stored values may be out of range or non-finite; what is captured is
    /// always something `resolve` accepts.
    pub fn capture(params: &EqParams) -> Self {
        let values = PARAMETERS
            .iter()
            .map(|descriptor| {
                let value = descriptor.clamp(params.get(descriptor.id));
                let value = match descriptor.range {
                    ParamRange::Toggle => ParamValue::Switch(value > 0.5),
                    ParamRange::Continuous { .. } => ParamValue::Number(value),
                };
                (descriptor.key.to_string(), value)
            })
            .collect();

        Self {
            format: STATE_FORMAT.to_string(),
            version: STATE_VERSION,
            params: values,
        }
    }

    /// Check the snapshot and resolve a value for every parameter.
    ///
    /// Missing parameters resolve to their default, present ones are clamped
    /// into range, unknown keys are ignored.
    pub fn resolve(&self) -> Result<[f32; PARAM_COUNT], StateError> {
        if self.format != STATE_FORMAT {
            return Err(StateError::UnknownFormat(self.format.clone()));
        }
        if self.version == 0 || self.version > STATE_VERSION {
            return Err(StateError::UnsupportedVersion {
                found: self.version,
                supported: STATE_VERSION,
            });
        }

        let mut values = [0.0_f32; PARAM_COUNT];
        for (slot, descriptor) in values.iter_mut().zip(PARAMETERS.iter()) {
            *slot = match (descriptor.range, self.params.get(descriptor.key)) {
                (_, None) => descriptor.default,
                (ParamRange::Toggle, Some(ParamValue::Switch(on))) => {
                    if *on {
                        1.0
                    } else {
                        0.0
                    }
                }
                (_, Some(ParamValue::Number(value))) => descriptor.clamp(*value),
                (ParamRange::Continuous { .. }, Some(ParamValue::Switch(_))) => {
                    return Err(StateError::InvalidValue {
                        key: descriptor.key.to_string(),
                    });
                }
            };
        }

        for key in self.params.keys() {
            if sixband_dsp::params::find(key).is_none() {
                debug!("Ignoring unknown parameter {:?} in saved state", key);
            }
        }

        Ok(values)
    }

    /// Validate, then write every parameter
    pub fn restore(&self, params: &EqParams) -> Result<(), StateError> {
        let values = self.resolve()?;
        for (descriptor, value) in PARAMETERS.iter().zip(values) {
            params.set(descriptor.id, value);
        }
        Ok(())
    }
}

/// Converts parameter state to and from an opaque blob
pub trait StateCodec {
    /// Serialize the current parameter values
    fn save(&self, params: &EqParams) -> Result<Vec<u8>, StateError>;

    /// Restore parameter values from a blob.
    ///
    /// On error the parameters keep their current values.
    fn load(&self, blob: &[u8], params: &EqParams) -> Result<(), StateError>;
}

/// JSON implementation of [`StateCodec`]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStateCodec;

impl StateCodec for JsonStateCodec {
    fn save(&self, params: &EqParams) -> Result<Vec<u8>, StateError> {
        let snapshot = ParamSnapshot::capture(params);
        serde_json::to_vec(&snapshot).map_err(|e| StateError::Encode(e.to_string()))
    }

    fn load(&self, blob: &[u8], params: &EqParams) -> Result<(), StateError> {
        let restored = serde_json::from_slice::<ParamSnapshot>(blob)
            .map_err(StateError::from)
            .and_then(|snapshot| snapshot.restore(params));

        match &restored {
            Ok(()) => info!("State restored ({} bytes)", blob.len()),
            Err(e) => warn!("Discarding saved state, keeping current parameters: {}", e),
        }
        restored
    }
}
