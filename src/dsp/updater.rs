//! Chain updater
//!
//! Turns a [`FilterSettings`] snapshot into coefficients and installs the
//! same coefficients into the left and right chains. Runs between blocks on
//! the audio thread, so it designs into stack values and never allocates.

use super::chain::{ChainPosition, ChannelChain};
use super::coefficients::{
    clamp_to_nyquist, db_to_gain, design_butterworth_cascade, design_peak, CascadeCoefficients,
    CoefficientSet, CutKind,
};
use crate::config::DEFAULT_NYQUIST_GUARD;
use crate::settings::FilterSettings;

/// Designs coefficients from settings and swaps them into both chains
#[derive(Debug, Clone, Copy)]
pub struct ChainUpdater {
    nyquist_guard: f64,
}

impl ChainUpdater {
    /// `nyquist_guard` is the fraction of the sample rate every design
    /// frequency is clamped to
    pub fn new(nyquist_guard: f64) -> Self {
        Self { nyquist_guard }
    }

    /// Peak section coefficients for `settings`
    pub fn peak_coefficients(&self, settings: &FilterSettings, sample_rate: f64) -> CoefficientSet {
        let freq = clamp_to_nyquist(settings.peak_freq as f64, sample_rate, self.nyquist_guard);
        design_peak(
            sample_rate,
            freq,
            settings.peak_q as f64,
            db_to_gain(settings.peak_gain_db as f64),
        )
    }

    /// Low-cut sections at the order implied by the low-cut slope
    pub fn low_cut_coefficients(
        &self,
        settings: &FilterSettings,
        sample_rate: f64,
    ) -> CascadeCoefficients {
        let cutoff = clamp_to_nyquist(settings.low_cut_freq as f64, sample_rate, self.nyquist_guard);
        design_butterworth_cascade(
            CutKind::HighPass,
            sample_rate,
            cutoff,
            settings.low_cut_slope.order(),
        )
    }

    /// High-cut sections at the order implied by the high-cut slope
    pub fn high_cut_coefficients(
        &self,
        settings: &FilterSettings,
        sample_rate: f64,
    ) -> CascadeCoefficients {
        let cutoff =
            clamp_to_nyquist(settings.high_cut_freq as f64, sample_rate, self.nyquist_guard);
        design_butterworth_cascade(
            CutKind::LowPass,
            sample_rate,
            cutoff,
            settings.high_cut_slope.order(),
        )
    }

    /// Install the peak band into both chains
    pub fn update_peak(&self, settings: &FilterSettings, left: &mut ChannelChain, right: &mut ChannelChain) {
        let coeffs = self.peak_coefficients(settings, left.sample_rate());
        for chain in [left, right] {
            chain.peak_mut().set_coefficients(coeffs);
            chain.peak_mut().set_bypassed(false);
            chain.set_bypassed(ChainPosition::Peak, settings.peak_bypassed);
        }
    }

    /// Install the low-cut cascade into both chains
    pub fn update_low_cut(
        &self,
        settings: &FilterSettings,
        left: &mut ChannelChain,
        right: &mut ChannelChain,
    ) {
        let coeffs = self.low_cut_coefficients(settings, left.sample_rate());
        for chain in [left, right] {
            chain.low_cut_mut().configure(coeffs.as_slice());
            chain.set_bypassed(ChainPosition::LowCut, settings.low_cut_bypassed);
        }
    }

    /// Install the high-cut cascade into both chains
    pub fn update_high_cut(
        &self,
        settings: &FilterSettings,
        left: &mut ChannelChain,
        right: &mut ChannelChain,
    ) {
        let coeffs = self.high_cut_coefficients(settings, left.sample_rate());
        for chain in [left, right] {
            chain.high_cut_mut().configure(coeffs.as_slice());
            chain.set_bypassed(ChainPosition::HighCut, settings.high_cut_bypassed);
        }
    }

    /// Recompute every section and swap it into both chains
    ///
    /// Both chains must have been prepared at the same sample rate.
    pub fn update(&self, settings: &FilterSettings, left: &mut ChannelChain, right: &mut ChannelChain) {
        debug_assert_eq!(left.sample_rate(), right.sample_rate());

        self.update_low_cut(settings, left, right);
        self.update_peak(settings, left, right);
        self.update_high_cut(settings, left, right);
    }
}

impl Default for ChainUpdater {
    fn default() -> Self {
        Self::new(DEFAULT_NYQUIST_GUARD)
    }
}
