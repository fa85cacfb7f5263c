//! Filter settings snapshot
//!
//! [`resolve`] copies every control out of the parameter store once per
//! block. The rest of the block works from that copy, so a control surface
//! writing mid-block cannot change coefficients half way through.

use serde::{Deserialize, Serialize};

use crate::params::{ParamId, ParameterStore, SLOPE_LABELS};

/// Cut filter steepness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Slope {
    #[default]
    Db12,
    Db24,
    Db36,
    Db48,
}

impl Slope {
    pub const ALL: [Slope; 4] = [Slope::Db12, Slope::Db24, Slope::Db36, Slope::Db48];

    /// Choice index, 0..=3; out-of-range indices saturate to 48 dB/oct
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Slope::Db12,
            1 => Slope::Db24,
            2 => Slope::Db36,
            _ => Slope::Db48,
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Butterworth order: 2, 4, 6 or 8
    pub fn order(&self) -> usize {
        2 * self.sections()
    }

    /// Number of active biquad sections: 1..=4
    pub fn sections(&self) -> usize {
        self.index() + 1
    }

    pub fn db_per_octave(&self) -> u32 {
        12 * self.sections() as u32
    }

    pub fn label(&self) -> &'static str {
        SLOPE_LABELS[self.index()]
    }
}

/// Immutable view of every control, taken once per block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    /// Low-cut corner in Hz (20-20000)
    pub low_cut_freq: f32,
    /// High-cut corner in Hz (20-20000)
    pub high_cut_freq: f32,
    /// Peak center in Hz (20-20000)
    pub peak_freq: f32,
    /// Peak gain in dB (-24 to +24)
    pub peak_gain_db: f32,
    /// Peak Q (0.1 to 24)
    pub peak_q: f32,
    pub low_cut_slope: Slope,
    pub high_cut_slope: Slope,
    pub low_cut_bypassed: bool,
    pub peak_bypassed: bool,
    pub high_cut_bypassed: bool,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            low_cut_freq: ParamId::LowCutFreq.spec().default,
            high_cut_freq: ParamId::HighCutFreq.spec().default,
            peak_freq: ParamId::PeakFreq.spec().default,
            peak_gain_db: ParamId::PeakGain.spec().default,
            peak_q: ParamId::PeakQ.spec().default,
            low_cut_slope: Slope::Db12,
            high_cut_slope: Slope::Db12,
            low_cut_bypassed: false,
            peak_bypassed: false,
            high_cut_bypassed: false,
        }
    }
}

/// Snapshot the current control values
///
/// Wait-free: one relaxed atomic load per control.
pub fn resolve(store: &ParameterStore) -> FilterSettings {
    FilterSettings {
        low_cut_freq: store.get(ParamId::LowCutFreq),
        high_cut_freq: store.get(ParamId::HighCutFreq),
        peak_freq: store.get(ParamId::PeakFreq),
        peak_gain_db: store.get(ParamId::PeakGain),
        peak_q: store.get(ParamId::PeakQ),
        low_cut_slope: Slope::from_index(store.get_choice(ParamId::LowCutSlope)),
        high_cut_slope: Slope::from_index(store.get_choice(ParamId::HighCutSlope)),
        low_cut_bypassed: store.get_toggle(ParamId::LowCutBypassed),
        peak_bypassed: store.get_toggle(ParamId::PeakBypassed),
        high_cut_bypassed: store.get_toggle(ParamId::HighCutBypassed),
    }
}
