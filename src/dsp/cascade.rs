//! Cascade of biquad stages
//!
//! Four fixed slots used by the low-cut and high-cut filters. The slope
//! decides how many leading slots are active; the rest are bypassed.

use super::biquad::BiquadStage;
use super::coefficients::{CoefficientSet, MAX_SECTIONS};

/// Fixed-capacity ordered sequence of [`MAX_SECTIONS`] stages
#[derive(Debug, Clone, Default)]
pub struct Cascade {
    stages: [BiquadStage; MAX_SECTIONS],
}

impl Cascade {
    /// Create a cascade with every stage bypassed
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `coefficients` into the leading stages and bypass the rest
    ///
    /// Extra sets beyond [`MAX_SECTIONS`] are ignored. Stages that stay
    /// active keep their delay state; stages that become bypassed are
    /// reset.
    pub fn configure(&mut self, coefficients: &[CoefficientSet]) {
        debug_assert!(coefficients.len() <= MAX_SECTIONS);

        for (i, stage) in self.stages.iter_mut().enumerate() {
            match coefficients.get(i) {
                Some(coeffs) => {
                    stage.set_coefficients(*coeffs);
                    stage.set_bypassed(false);
                }
                None => stage.set_bypassed(true),
            }
        }
    }

    /// Run one sample through all four slots in order
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        self.stages
            .iter_mut()
            .fold(input, |x, stage| stage.process_sample(x))
    }

    /// Zero every stage's delay registers
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }

    /// Number of stages currently active
    pub fn active_stages(&self) -> usize {
        self.stages.iter().filter(|s| !s.is_bypassed()).count()
    }

    pub fn stage(&self, index: usize) -> Option<&BiquadStage> {
        self.stages.get(index)
    }

    /// Combined linear magnitude of the active stages at `freq` Hz
    pub fn magnitude_at(&self, freq: f64, sample_rate: f64) -> f64 {
        self.stages
            .iter()
            .map(|s| s.magnitude_at(freq, sample_rate))
            .product()
    }
}
