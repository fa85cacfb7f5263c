//! Channel chain
//!
//! Per-channel pipeline, always in this order:
//! 1. Low-cut (Butterworth high-pass cascade)
//! 2. Peak (single peaking biquad)
//! 3. High-cut (Butterworth low-pass cascade)
//!
//! Left and right each own one chain; nothing is shared between them.

use super::biquad::{flush_denormal, BiquadStage};
use super::cascade::Cascade;

/// Fixed positions in the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChainPosition {
    LowCut = 0,
    Peak = 1,
    HighCut = 2,
}

impl ChainPosition {
    /// All positions in processing order
    pub const ALL: [ChainPosition; 3] = [
        ChainPosition::LowCut,
        ChainPosition::Peak,
        ChainPosition::HighCut,
    ];
}

/// Filter pipeline for one audio channel
#[derive(Debug, Clone)]
pub struct ChannelChain {
    low_cut: Cascade,
    peak: BiquadStage,
    high_cut: Cascade,
    bypassed: [bool; 3],
    sample_rate: f64,
    block_size_hint: usize,
    flush_denormals: bool,
}

impl ChannelChain {
    /// Create an unprepared chain with every stage bypassed
    pub fn new() -> Self {
        Self {
            low_cut: Cascade::new(),
            peak: BiquadStage::new(),
            high_cut: Cascade::new(),
            bypassed: [false; 3],
            sample_rate: 48000.0,
            block_size_hint: 512,
            flush_denormals: true,
        }
    }

    /// Clear all delay state and record the stream format
    ///
    /// Must be called before the first block and whenever the sample rate
    /// changes.
    pub fn prepare(&mut self, sample_rate: f64, block_size_hint: usize) {
        self.sample_rate = sample_rate;
        self.block_size_hint = block_size_hint;
        self.reset();
    }

    /// Zero the delay registers of every stage
    pub fn reset(&mut self) {
        self.low_cut.reset();
        self.peak.reset();
        self.high_cut.reset();
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn block_size_hint(&self) -> usize {
        self.block_size_hint
    }

    /// Enable or disable input flushing of near-zero samples
    pub fn set_flush_denormals(&mut self, flush: bool) {
        self.flush_denormals = flush;
    }

    pub fn low_cut(&self) -> &Cascade {
        &self.low_cut
    }

    pub fn low_cut_mut(&mut self) -> &mut Cascade {
        &mut self.low_cut
    }

    pub fn peak(&self) -> &BiquadStage {
        &self.peak
    }

    pub fn peak_mut(&mut self) -> &mut BiquadStage {
        &mut self.peak
    }

    pub fn high_cut(&self) -> &Cascade {
        &self.high_cut
    }

    pub fn high_cut_mut(&mut self) -> &mut Cascade {
        &mut self.high_cut
    }

    /// Skip a whole section
    ///
    /// Entering bypass zeroes that section's delay state.
    pub fn set_bypassed(&mut self, position: ChainPosition, bypassed: bool) {
        let slot = &mut self.bypassed[position as usize];
        if bypassed && !*slot {
            match position {
                ChainPosition::LowCut => self.low_cut.reset(),
                ChainPosition::Peak => self.peak.reset(),
                ChainPosition::HighCut => self.high_cut.reset(),
            }
        }
        *slot = bypassed;
    }

    pub fn is_bypassed(&self, position: ChainPosition) -> bool {
        self.bypassed[position as usize]
    }

    /// Process one sample: low-cut, then peak, then high-cut
    #[inline]
    pub fn process_sample(&mut self, input: f64) -> f64 {
        let mut x = if self.flush_denormals {
            flush_denormal(input)
        } else {
            input
        };

        if !self.bypassed[ChainPosition::LowCut as usize] {
            x = self.low_cut.process(x);
        }
        if !self.bypassed[ChainPosition::Peak as usize] {
            x = self.peak.process_sample(x);
        }
        if !self.bypassed[ChainPosition::HighCut as usize] {
            x = self.high_cut.process(x);
        }
        x
    }

    /// Process a block of samples in place
    pub fn process_block(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample = self.process_sample(*sample as f64) as f32;
        }
    }

    /// Linear magnitude of the whole chain at `freq` Hz
    pub fn magnitude_at(&self, freq: f64) -> f64 {
        let sr = self.sample_rate;
        let mut magnitude = 1.0;
        if !self.is_bypassed(ChainPosition::LowCut) {
            magnitude *= self.low_cut.magnitude_at(freq, sr);
        }
        if !self.is_bypassed(ChainPosition::Peak) {
            magnitude *= self.peak.magnitude_at(freq, sr);
        }
        if !self.is_bypassed(ChainPosition::HighCut) {
            magnitude *= self.high_cut.magnitude_at(freq, sr);
        }
        magnitude
    }
}

impl Default for ChannelChain {
    fn default() -> Self {
        Self::new()
    }
}
