//! Audio Processor Trait
//!
//! The interface a host drives: prepare once per stream configuration, then
//! process interleaved blocks in place.

use crate::engine::{EngineConfig, EqEngine};
use crate::error::DspResult;

/// Trait for in-place audio processors
///
/// # Real-time Safety Contract
///
/// Implementors MUST follow these rules in `process()`:
/// - NO heap allocations (no Vec::push, no Box::new, no String)
/// - NO syscalls (no file I/O, no network, no mutex locks)
/// - NO unbounded loops
/// - Constant or O(n) time complexity where n = buffer size
///
/// Violating these rules causes audio dropouts ("glitches").
pub trait AudioProcessor: Send {
    /// Allocate state for a stream configuration. Not real-time safe.
    fn prepare(&mut self, config: EngineConfig) -> DspResult<EngineConfig>;

    /// Process audio buffer in-place
    ///
    /// Buffer format is interleaved: [L0, R0, L1, R1, ...]
    fn process(&mut self, buffer: &mut [f32]) -> DspResult<()>;

    /// Reset internal state (delay lines)
    fn reset(&mut self);

    /// Human-readable name for debugging/UI
    fn name(&self) -> &'static str;
}

impl AudioProcessor for EqEngine {
    fn prepare(&mut self, config: EngineConfig) -> DspResult<EngineConfig> {
        EqEngine::prepare(self, config)
    }

    fn process(&mut self, buffer: &mut [f32]) -> DspResult<()> {
        self.process_interleaved(buffer)
    }

    fn reset(&mut self) {
        EqEngine::reset(self);
    }

    fn name(&self) -> &'static str {
        "Six-Band Equalizer"
    }
}
