//! Coefficient design
//!
//! Pure functions that turn cutoff / center frequency, Q and gain into
//! normalized biquad coefficients. Nothing here allocates, so the chain
//! updater can call it from the audio thread on every block.
//!
//! Transfer function of one section:
//! `H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)`

use std::f64::consts::PI;

/// Maximum number of second-order sections in one cut filter (48 dB/oct)
pub const MAX_SECTIONS: usize = 4;

/// Immutable coefficient vector of one biquad, already divided by `a0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoefficientSet {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl CoefficientSet {
    /// Pass-through coefficients (`y[n] = x[n]`)
    pub const IDENTITY: CoefficientSet = CoefficientSet {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Build from unnormalized coefficients
    #[inline]
    fn normalized(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        let inv_a0 = 1.0 / a0;
        Self {
            b0: b0 * inv_a0,
            b1: b1 * inv_a0,
            b2: b2 * inv_a0,
            a1: a1 * inv_a0,
            a2: a2 * inv_a0,
        }
    }

    /// Linear magnitude of the response at `freq` Hz
    pub fn magnitude_at(&self, freq: f64, sample_rate: f64) -> f64 {
        let w = 2.0 * PI * freq / sample_rate;
        let (sin1, cos1) = w.sin_cos();
        let (sin2, cos2) = (2.0 * w).sin_cos();

        // Evaluate numerator and denominator at z = e^{jw}
        let num_re = self.b0 + self.b1 * cos1 + self.b2 * cos2;
        let num_im = -(self.b1 * sin1 + self.b2 * sin2);
        let den_re = 1.0 + self.a1 * cos1 + self.a2 * cos2;
        let den_im = -(self.a1 * sin1 + self.a2 * sin2);

        ((num_re * num_re + num_im * num_im) / (den_re * den_re + den_im * den_im)).sqrt()
    }

    /// True when both poles lie strictly inside the unit circle
    pub fn is_stable(&self) -> bool {
        self.a2.abs() < 1.0 && self.a1.abs() < 1.0 + self.a2
    }
}

impl Default for CoefficientSet {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Which side of the spectrum a Butterworth cascade removes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutKind {
    /// Removes content below the cutoff (low-cut)
    HighPass,
    /// Removes content above the cutoff (high-cut)
    LowPass,
}

/// Ordered sections of one Butterworth design
///
/// Fixed capacity so that designing never touches the heap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeCoefficients {
    sections: [CoefficientSet; MAX_SECTIONS],
    len: usize,
}

impl CascadeCoefficients {
    /// The designed sections, in processing order
    pub fn as_slice(&self) -> &[CoefficientSet] {
        &self.sections[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Combined linear magnitude of all sections at `freq` Hz
    pub fn magnitude_at(&self, freq: f64, sample_rate: f64) -> f64 {
        self.as_slice()
            .iter()
            .map(|c| c.magnitude_at(freq, sample_rate))
            .product()
    }
}

/// Limit a design frequency to `guard * sample_rate`
///
/// Every design function below requires `freq < sample_rate / 2`; callers
/// pass frequencies through here first.
#[inline]
pub fn clamp_to_nyquist(freq: f64, sample_rate: f64, guard: f64) -> f64 {
    freq.min(guard * sample_rate)
}

/// Convert decibels to a linear gain factor
#[inline]
pub fn db_to_gain(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Convert a linear gain factor to decibels
#[inline]
pub fn gain_to_db(gain: f64) -> f64 {
    if gain <= 0.0 {
        f64::NEG_INFINITY
    } else {
        20.0 * gain.log10()
    }
}

/// Peaking EQ section (Audio EQ Cookbook)
///
/// `linear_gain` is the gain at `center_freq`, e.g. `db_to_gain(6.0)`.
/// Preconditions: `0 < center_freq < sample_rate / 2`, `q > 0`,
/// `linear_gain > 0`.
pub fn design_peak(sample_rate: f64, center_freq: f64, q: f64, linear_gain: f64) -> CoefficientSet {
    let a = linear_gain.max(0.0).sqrt();
    let w0 = 2.0 * PI * center_freq / sample_rate;
    let (sin_w0, cos_w0) = w0.sin_cos();
    let alpha = sin_w0 / (2.0 * q);

    CoefficientSet::normalized(
        1.0 + alpha * a,
        -2.0 * cos_w0,
        1.0 - alpha * a,
        1.0 + alpha / a,
        -2.0 * cos_w0,
        1.0 - alpha / a,
    )
}

/// Butterworth high-pass or low-pass of even `order`, as `order / 2`
/// second-order sections
///
/// Poles of the analog prototype sit at angles `theta_k = pi * (2k + 1) / (2N)`
/// from the imaginary axis; each conjugate pair becomes one section with
/// damping `2 * sin(theta_k)`, mapped to the z-plane by the bilinear
/// transform with a pre-warped cutoff. The cascade is -3 dB at `cutoff`.
///
/// `order` is clamped to `2..=8`; an odd order is rounded down.
/// Precondition: `0 < cutoff < sample_rate / 2`.
pub fn design_butterworth_cascade(
    kind: CutKind,
    sample_rate: f64,
    cutoff: f64,
    order: usize,
) -> CascadeCoefficients {
    debug_assert!(order % 2 == 0, "butterworth order must be even, got {order}");

    let len = (order / 2).clamp(1, MAX_SECTIONS);
    let n = (2 * len) as f64;

    let wc = (PI * cutoff / sample_rate).tan();
    let wc2 = wc * wc;

    let mut sections = [CoefficientSet::IDENTITY; MAX_SECTIONS];
    for (k, section) in sections.iter_mut().take(len).enumerate() {
        let theta = PI * (2 * k + 1) as f64 / (2.0 * n);
        let damping = 2.0 * theta.sin();

        let a0 = 1.0 + damping * wc + wc2;
        let a1 = 2.0 * (wc2 - 1.0);
        let a2 = 1.0 - damping * wc + wc2;

        *section = match kind {
            CutKind::LowPass => CoefficientSet::normalized(wc2, 2.0 * wc2, wc2, a0, a1, a2),
            CutKind::HighPass => CoefficientSet::normalized(1.0, -2.0, 1.0, a0, a1, a2),
        };
    }

    CascadeCoefficients { sections, len }
}
