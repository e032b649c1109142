//! Multi-channel Biquad Stage
//!
//! One coefficient set shared by every channel, one pair of delay registers
//! per channel. The channel count is fixed when the filter is built, so a
//! buffer can never be walked with a different channel layout than the state
//! was allocated for.

use biquad::{Biquad, Coefficients, DirectForm2Transposed};

use crate::coefficients;

/// A second-order filter applied independently to each channel
///
/// y[n] = b0·x[n] + b1·x[n-1] + b2·x[n-2] - a1·y[n-1] - a2·y[n-2]
pub struct BiquadFilter {
    coefficients: Coefficients<f32>,
    // DirectForm2Transposed: better numerical stability than DF1,
    // two registers per channel
    states: Vec<DirectForm2Transposed<f32>>,
}

impl BiquadFilter {
    /// Build a filter for `channels` channels (at least one)
    ///
    /// Note: This allocates. Only call during setup, not in audio callback.
    pub fn new(coefficients: Coefficients<f32>, channels: usize) -> Self {
        let states = (0..channels.max(1))
            .map(|_| DirectForm2Transposed::<f32>::new(coefficients))
            .collect();
        Self {
            coefficients,
            states,
        }
    }

    /// A passthrough filter, used until real coefficients are computed
    pub fn identity(channels: usize) -> Self {
        Self::new(coefficients::identity(), channels)
    }

    /// Replace the active coefficient set.
    ///
    /// The whole struct is swapped at once; delay registers are kept so a
    /// coefficient change never zeroes the filter history.
    #[inline]
    pub fn set_coefficients(&mut self, coefficients: Coefficients<f32>) {
        self.coefficients = coefficients;
        for state in &mut self.states {
            state.update_coefficients(coefficients);
        }
    }

    /// Currently active coefficients
    pub fn coefficients(&self) -> &Coefficients<f32> {
        &self.coefficients
    }

    /// Number of channels this filter holds state for
    pub fn channels(&self) -> usize {
        self.states.len()
    }

    /// Run one sample of one channel through the filter
    #[cfg(test)]
    fn process_sample(&mut self, channel: usize, sample: f32) -> f32 {
        self.states[channel].run(sample)
    }

    /// Process an interleaved buffer in-place
    ///
    /// Buffer format: [L0, R0, L1, R1, ...]. Only whole frames are processed;
    /// a trailing partial frame is left untouched.
    ///
    /// # Real-time Safety
    /// No allocations. O(n) where n = buffer length.
    #[inline]
    pub fn process_interleaved(&mut self, buffer: &mut [f32]) {
        let channels = self.states.len();
        for frame in buffer.chunks_exact_mut(channels) {
            for (sample, state) in frame.iter_mut().zip(self.states.iter_mut()) {
                *sample = state.run(*sample);
            }
        }
    }

    /// Process one slice per channel in-place
    ///
    /// Slices pair up with channel states in order; extra slices beyond the
    /// filter's channel count are left untouched.
    #[inline]
    pub fn process_planar(&mut self, channels: &mut [&mut [f32]]) {
        for (samples, state) in channels.iter_mut().zip(self.states.iter_mut()) {
            for sample in samples.iter_mut() {
                *sample = state.run(*sample);
            }
        }
    }

    /// Clear delay lines
    pub fn reset(&mut self) {
        for state in &mut self.states {
            state.reset_state();
        }
    }
}
