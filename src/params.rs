//! Parameter store
//!
//! The controls a UI or host automation writes and the audio thread reads.
//! Each control lives in its own atomic cell, so reads on the audio thread
//! never wait on a writer. Range and step are enforced here, on write.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::error::{EqError, Result};

/// Slope choice labels, index 0..=3
pub const SLOPE_LABELS: [&str; 4] = ["12 dB/oct", "24 dB/oct", "36 dB/oct", "48 dB/oct"];

/// Identifier of one control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    LowCutFreq,
    HighCutFreq,
    PeakFreq,
    PeakGain,
    PeakQ,
    LowCutSlope,
    HighCutSlope,
    LowCutBypassed,
    PeakBypassed,
    HighCutBypassed,
}

impl ParamId {
    /// Every control, in declaration order
    pub const ALL: [ParamId; 10] = [
        ParamId::LowCutFreq,
        ParamId::HighCutFreq,
        ParamId::PeakFreq,
        ParamId::PeakGain,
        ParamId::PeakQ,
        ParamId::LowCutSlope,
        ParamId::HighCutSlope,
        ParamId::LowCutBypassed,
        ParamId::PeakBypassed,
        ParamId::HighCutBypassed,
    ];

    /// Stable string id used by hosts
    pub fn as_str(&self) -> &'static str {
        self.spec().id
    }

    /// Look up a control by its string id
    pub fn from_id(id: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == id)
            .ok_or_else(|| EqError::UnknownParameter { id: id.to_string() })
    }

    /// Range, default and display data for this control
    pub fn spec(&self) -> &'static ParamSpec {
        &PARAM_SPECS[*self as usize]
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of value a control holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Continuous value with linear taper
    Float,
    /// Index into a list of labels
    Choice,
    /// On/off toggle
    Toggle,
}

/// Static description of a control
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: ParamKind,
    pub min: f32,
    pub max: f32,
    /// Values snap to multiples of this interval above `min`
    pub step: f32,
    pub default: f32,
    pub unit: &'static str,
}

impl ParamSpec {
    /// Clamp to range and snap to step
    pub fn constrain(&self, value: f32) -> f32 {
        if !value.is_finite() {
            return self.default;
        }
        let clamped = value.clamp(self.min, self.max);
        if self.step <= 0.0 {
            return clamped;
        }

        // Snap in f64 on decimal-rounded bounds so 0.1-style steps land on
        // the nearest f32 of the decimal value
        let min = decimal(self.min);
        let step = decimal(self.step);
        let steps = ((clamped as f64 - min) / step).round();
        ((min + steps * step) as f32).clamp(self.min, self.max)
    }

    /// Map a plain value to 0..=1
    pub fn to_normalized(&self, value: f32) -> f32 {
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    /// Map 0..=1 to a plain value (not yet constrained)
    pub fn from_normalized(&self, normalized: f32) -> f32 {
        self.min + normalized.clamp(0.0, 1.0) * (self.max - self.min)
    }
}

#[inline]
fn decimal(value: f32) -> f64 {
    (value as f64 * 1e6).round() / 1e6
}

const fn freq_spec(id: &'static str, name: &'static str, default: f32) -> ParamSpec {
    ParamSpec {
        id,
        name,
        kind: ParamKind::Float,
        min: 20.0,
        max: 20000.0,
        step: 1.0,
        default,
        unit: "Hz",
    }
}

const fn slope_spec(id: &'static str, name: &'static str) -> ParamSpec {
    ParamSpec {
        id,
        name,
        kind: ParamKind::Choice,
        min: 0.0,
        max: 3.0,
        step: 1.0,
        default: 0.0,
        unit: "dB/oct",
    }
}

const fn toggle_spec(id: &'static str, name: &'static str) -> ParamSpec {
    ParamSpec {
        id,
        name,
        kind: ParamKind::Toggle,
        min: 0.0,
        max: 1.0,
        step: 1.0,
        default: 0.0,
        unit: "",
    }
}

// Indexed by `ParamId as usize`
static PARAM_SPECS: [ParamSpec; 10] = [
    freq_spec("LC_freq", "Low Cut Frequency", 120.0),
    freq_spec("HC_freq", "High Cut Frequency", 20000.0),
    freq_spec("PD_freq", "Peak/Dip Frequency", 300.0),
    ParamSpec {
        id: "PD_gain",
        name: "Peak/Dip Gain",
        kind: ParamKind::Float,
        min: -24.0,
        max: 24.0,
        step: 0.1,
        default: 0.0,
        unit: "dB",
    },
    ParamSpec {
        id: "PD_q",
        name: "Peak/Dip Q",
        kind: ParamKind::Float,
        min: 0.1,
        max: 24.0,
        step: 0.01,
        default: 1.0,
        unit: "",
    },
    slope_spec("LC_slope", "Low Cut Slope"),
    slope_spec("HC_slope", "High Cut Slope"),
    toggle_spec("LC_bypass", "Low Cut Bypass"),
    toggle_spec("PD_bypass", "Peak/Dip Bypass"),
    toggle_spec("HC_bypass", "High Cut Bypass"),
];

/// `f32` stored as its bit pattern in an [`AtomicU32`]
#[derive(Debug)]
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Lock-free store of every control value
///
/// Share it as `Arc<ParameterStore>` between the control thread and the
/// audio thread.
#[derive(Debug)]
pub struct ParameterStore {
    values: [AtomicF32; 7],
    toggles: [AtomicBool; 3],
}

impl ParameterStore {
    /// Create a store with every control at its default
    pub fn new() -> Self {
        Self {
            values: std::array::from_fn(|i| AtomicF32::new(ParamId::ALL[i].spec().default)),
            toggles: std::array::from_fn(|_| AtomicBool::new(false)),
        }
    }

    #[inline]
    fn toggle_slot(param: ParamId) -> Option<usize> {
        match param {
            ParamId::LowCutBypassed => Some(0),
            ParamId::PeakBypassed => Some(1),
            ParamId::HighCutBypassed => Some(2),
            _ => None,
        }
    }

    /// Current plain value of a control
    ///
    /// Toggles read as 0.0 / 1.0, choices as their index.
    #[inline]
    pub fn get(&self, param: ParamId) -> f32 {
        match Self::toggle_slot(param) {
            Some(slot) => {
                if self.toggles[slot].load(Ordering::Relaxed) {
                    1.0
                } else {
                    0.0
                }
            }
            None => self.values[param as usize].load(),
        }
    }

    /// Current index of a choice control
    #[inline]
    pub fn get_choice(&self, param: ParamId) -> usize {
        self.get(param) as usize
    }

    /// Current state of a toggle; false for any other control
    #[inline]
    pub fn get_toggle(&self, param: ParamId) -> bool {
        Self::toggle_slot(param)
            .map(|slot| self.toggles[slot].load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    /// Write a plain value, clamped and snapped to the control's step
    ///
    /// Returns the value actually stored.
    pub fn set(&self, param: ParamId, value: f32) -> f32 {
        let constrained = param.spec().constrain(value);
        match Self::toggle_slot(param) {
            Some(slot) => self.toggles[slot].store(constrained >= 0.5, Ordering::Relaxed),
            None => self.values[param as usize].store(constrained),
        }
        constrained
    }

    /// Set a toggle control
    pub fn set_toggle(&self, param: ParamId, on: bool) {
        self.set(param, if on { 1.0 } else { 0.0 });
    }

    /// Read a control by string id
    pub fn get_by_id(&self, id: &str) -> Result<f32> {
        Ok(self.get(ParamId::from_id(id)?))
    }

    /// Write a control by string id
    pub fn set_by_id(&self, id: &str, value: f32) -> Result<f32> {
        Ok(self.set(ParamId::from_id(id)?, value))
    }

    /// Host automation read, 0..=1
    pub fn get_normalized(&self, param: ParamId) -> f32 {
        param.spec().to_normalized(self.get(param))
    }

    /// Host automation write, 0..=1
    pub fn set_normalized(&self, param: ParamId, normalized: f32) -> f32 {
        self.set(param, param.spec().from_normalized(normalized))
    }

    /// Put every control back to its default
    pub fn reset_to_defaults(&self) {
        for param in ParamId::ALL {
            self.set(param, param.spec().default);
        }
    }

    /// Display text for a control's current value, e.g. "120 Hz"
    pub fn display_value(&self, param: ParamId) -> String {
        let spec = param.spec();
        let value = self.get(param);
        match spec.kind {
            ParamKind::Choice => SLOPE_LABELS[(value as usize).min(3)].to_string(),
            ParamKind::Toggle => (if value >= 0.5 { "On" } else { "Off" }).to_string(),
            ParamKind::Float if param == ParamId::PeakQ => format!("{value:.2}"),
            ParamKind::Float if value >= 1000.0 && spec.unit == "Hz" => {
                format!("{:.2} kHz", value / 1000.0)
            }
            ParamKind::Float if spec.step < 1.0 => format!("{value:.1} {}", spec.unit),
            ParamKind::Float => format!("{value:.0} {}", spec.unit),
        }
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_defaults() {
        let store = ParameterStore::new();
        assert_eq!(store.get(ParamId::LowCutFreq), 120.0);
        assert_eq!(store.get(ParamId::HighCutFreq), 20000.0);
        assert_eq!(store.get(ParamId::PeakFreq), 300.0);
        assert_eq!(store.get(ParamId::PeakGain), 0.0);
        assert_eq!(store.get(ParamId::PeakQ), 1.0);
        assert_eq!(store.get_choice(ParamId::LowCutSlope), 0);
        assert_eq!(store.get_choice(ParamId::HighCutSlope), 0);
        assert!(!store.get_toggle(ParamId::PeakBypassed));
    }

    #[test]
    fn test_spec_table_matches_ids() {
        for param in ParamId::ALL {
            assert_eq!(ParamId::from_id(param.as_str()).unwrap(), param);
        }
    }

    #[test]
    fn test_write_is_clamped() {
        let store = ParameterStore::new();
        assert_eq!(store.set(ParamId::LowCutFreq, 5.0), 20.0);
        assert_eq!(store.set(ParamId::HighCutFreq, 96000.0), 20000.0);
        assert_eq!(store.set(ParamId::PeakGain, -40.0), -24.0);
        assert_eq!(store.set(ParamId::LowCutSlope, 9.0), 3.0);
        assert_eq!(store.set(ParamId::PeakQ, f32::NAN), 1.0);
    }

    #[test]
    fn test_write_snaps_to_step() {
        let store = ParameterStore::new();
        assert_eq!(store.set(ParamId::PeakFreq, 440.4), 440.0);
        assert_abs_diff_eq!(store.set(ParamId::PeakGain, 3.14), 3.1, epsilon = 1e-4);
        assert_eq!(store.set(ParamId::HighCutSlope, 1.6), 2.0);
    }

    #[test]
    fn test_unknown_id_is_an_error() {
        let store = ParameterStore::new();
        let err = store.set_by_id("LC_gain", 1.0).unwrap_err();
        assert!(matches!(err, EqError::UnknownParameter { .. }));
        assert_eq!(store.set_by_id("PD_gain", 6.0).unwrap(), 6.0);
        assert_eq!(store.get_by_id("PD_gain").unwrap(), 6.0);
    }

    #[test]
    fn test_normalized_round_trip() {
        let store = ParameterStore::new();
        store.set_normalized(ParamId::PeakGain, 0.75);
        assert_abs_diff_eq!(store.get(ParamId::PeakGain), 12.0, epsilon = 1e-4);
        assert_abs_diff_eq!(store.get_normalized(ParamId::PeakGain), 0.75, epsilon = 1e-4);

        store.set_normalized(ParamId::LowCutSlope, 1.0);
        assert_eq!(store.get_choice(ParamId::LowCutSlope), 3);
    }

    #[test]
    fn test_toggles() {
        let store = ParameterStore::new();
        store.set_toggle(ParamId::HighCutBypassed, true);
        assert!(store.get_toggle(ParamId::HighCutBypassed));
        assert_eq!(store.get(ParamId::HighCutBypassed), 1.0);
        assert!(!store.get_toggle(ParamId::PeakFreq));
    }

    #[test]
    fn test_reset_to_defaults() {
        let store = ParameterStore::new();
        store.set(ParamId::PeakQ, 12.0);
        store.set_toggle(ParamId::LowCutBypassed, true);
        store.reset_to_defaults();
        assert_eq!(store.get(ParamId::PeakQ), 1.0);
        assert!(!store.get_toggle(ParamId::LowCutBypassed));
    }

    #[test]
    fn test_display_value() {
        let store = ParameterStore::new();
        assert_eq!(store.display_value(ParamId::LowCutFreq), "120 Hz");
        assert_eq!(store.display_value(ParamId::HighCutFreq), "20.00 kHz");
        assert_eq!(store.display_value(ParamId::LowCutSlope), "12 dB/oct");
        assert_eq!(store.display_value(ParamId::PeakQ), "1.00");
        assert_eq!(store.display_value(ParamId::PeakBypassed), "Off");
    }
}
