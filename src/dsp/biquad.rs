//! Biquad stage
//!
//! One second-order IIR section in transposed direct form II. A stage is
//! either active (filters and advances its two delay registers) or bypassed
//! (identity, registers held at zero).

use super::coefficients::CoefficientSet;
use crate::config::DENORMAL_THRESHOLD;

/// Processing state of a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageState {
    /// Coefficients are applied to every sample
    Active,
    /// Samples pass through unchanged
    #[default]
    Bypassed,
}

/// Flush a value whose magnitude is below [`DENORMAL_THRESHOLD`] to zero
#[inline]
pub fn flush_denormal(value: f64) -> f64 {
    if value.abs() < DENORMAL_THRESHOLD {
        0.0
    } else {
        value
    }
}

/// Single second-order section with its own delay line
#[derive(Debug, Clone, Default)]
pub struct BiquadStage {
    coeffs: CoefficientSet,
    state: StageState,
    z1: f64,
    z2: f64,
}

impl BiquadStage {
    /// Create a bypassed stage with identity coefficients
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the coefficients without touching the delay registers
    #[inline]
    pub fn set_coefficients(&mut self, coeffs: CoefficientSet) {
        self.coeffs = coeffs;
    }

    pub fn coefficients(&self) -> &CoefficientSet {
        &self.coeffs
    }

    /// Switch between active and bypassed
    ///
    /// Entering the bypassed state zeroes the delay registers, so a stage
    /// that is re-activated later starts from rest.
    #[inline]
    pub fn set_bypassed(&mut self, bypassed: bool) {
        if bypassed {
            if self.state == StageState::Active {
                self.reset();
            }
            self.state = StageState::Bypassed;
        } else {
            self.state = StageState::Active;
        }
    }

    #[inline]
    pub fn is_bypassed(&self) -> bool {
        self.state == StageState::Bypassed
    }

    pub fn state(&self) -> StageState {
        self.state
    }

    /// Zero the delay registers
    #[inline]
    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }

    /// Current delay registers `(z^-1, z^-2)`
    pub fn registers(&self) -> (f64, f64) {
        (self.z1, self.z2)
    }

    /// Process one sample
    #[inline]
    pub fn process_sample(&mut self, input: f64) -> f64 {
        match self.state {
            StageState::Bypassed => input,
            StageState::Active => {
                let c = &self.coeffs;
                let output = c.b0 * input + self.z1;
                self.z1 = flush_denormal(c.b1 * input - c.a1 * output + self.z2);
                self.z2 = flush_denormal(c.b2 * input - c.a2 * output);
                output
            }
        }
    }

    /// Linear magnitude at `freq` Hz; 1.0 when bypassed
    pub fn magnitude_at(&self, freq: f64, sample_rate: f64) -> f64 {
        match self.state {
            StageState::Bypassed => 1.0,
            StageState::Active => self.coeffs.magnitude_at(freq, sample_rate),
        }
    }
}
