//! Stereo EQ processor
//!
//! The block-level boundary a host drives. Per block:
//! resolve settings -> update both chains -> filter each channel in place.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::dsp::coefficients::gain_to_db;
use crate::dsp::{ChainUpdater, ChannelChain};
use crate::engine::buffer::{AudioBuffer, ChannelLayout};
use crate::error::{EqError, Result};
use crate::params::ParameterStore;
use crate::settings::{resolve, FilterSettings};

/// Real-time stereo equalizer
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use simple_eq::{EngineConfig, EqProcessor, ParamId, ParameterStore};
///
/// let store = Arc::new(ParameterStore::new());
/// let mut eq = EqProcessor::new(Arc::clone(&store), EngineConfig::default());
/// eq.prepare(48000.0, 512).unwrap();
///
/// store.set(ParamId::PeakGain, 6.0);
/// let mut left = vec![0.0_f32; 512];
/// let mut right = vec![0.0_f32; 512];
/// eq.process_stereo(&mut left, &mut right).unwrap();
/// ```
#[derive(Debug)]
pub struct EqProcessor {
    store: Arc<ParameterStore>,
    config: EngineConfig,
    updater: ChainUpdater,
    left: ChannelChain,
    right: ChannelChain,
    prepared: bool,
    latest: FilterSettings,
}

impl EqProcessor {
    pub fn new(store: Arc<ParameterStore>, config: EngineConfig) -> Self {
        let mut left = ChannelChain::new();
        let mut right = ChannelChain::new();
        left.set_flush_denormals(config.flush_denormals);
        right.set_flush_denormals(config.flush_denormals);

        Self {
            store,
            updater: ChainUpdater::new(config.nyquist_guard),
            config,
            left,
            right,
            prepared: false,
            latest: FilterSettings::default(),
        }
    }

    /// The parameter store this processor reads from
    pub fn store(&self) -> &Arc<ParameterStore> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start (or restart) a stream
    ///
    /// Clears all filter state and installs coefficients for the current
    /// controls. `max_block_size` of zero falls back to the configured
    /// default.
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize) -> Result<()> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(EqError::InvalidSampleRate { sample_rate });
        }

        let max_block_size = if max_block_size == 0 {
            self.config.max_block_size
        } else {
            max_block_size
        };

        self.left.prepare(sample_rate, max_block_size);
        self.right.prepare(sample_rate, max_block_size);
        self.prepared = true;

        self.latest = resolve(&self.store);
        self.updater.update(&self.latest, &mut self.left, &mut self.right);

        tracing::info!(sample_rate, max_block_size, "eq prepared");
        Ok(())
    }

    /// End the stream; `prepare` must be called again before processing
    pub fn release(&mut self) {
        self.left.reset();
        self.right.reset();
        self.prepared = false;
        tracing::info!("eq released");
    }

    /// Clear filter state without changing the stream format
    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
        tracing::debug!("eq state reset");
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn sample_rate(&self) -> Option<f64> {
        self.prepared.then(|| self.left.sample_rate())
    }

    /// Largest block accepted until the next `prepare`
    pub fn max_block_size(&self) -> Option<usize> {
        self.prepared.then(|| self.left.block_size_hint())
    }

    /// Mono or stereo, with matching input and output
    pub fn is_layout_supported(input_channels: usize, output_channels: usize) -> bool {
        let supported =
            input_channels == output_channels && ChannelLayout::from_count(output_channels).is_some();
        if !supported {
            tracing::warn!(input_channels, output_channels, "rejected channel layout");
        }
        supported
    }

    /// Always 0, the same tail the plugin reports to its host
    ///
    /// A high-Q peak can still ring for a few hundred milliseconds after the
    /// input stops; hosts that stop calling `process` on silence cut it off.
    pub fn tail_length_secs(&self) -> f64 {
        0.0
    }

    /// Settings used for the most recent block
    pub fn latest_settings(&self) -> FilterSettings {
        self.latest
    }

    pub fn left_chain(&self) -> &ChannelChain {
        &self.left
    }

    pub fn right_chain(&self) -> &ChannelChain {
        &self.right
    }

    /// Response of the current chain at `freq` Hz, in dB
    pub fn magnitude_response_db(&self, freq: f64) -> f64 {
        gain_to_db(self.left.magnitude_at(freq))
    }

    fn begin_block(&mut self, block_size: usize) -> Result<()> {
        if !self.prepared {
            return Err(EqError::NotPrepared);
        }
        let max_block_size = self.left.block_size_hint();
        if block_size > max_block_size {
            return Err(EqError::BlockTooLarge {
                block_size,
                max_block_size,
            });
        }

        self.latest = resolve(&self.store);
        self.updater.update(&self.latest, &mut self.left, &mut self.right);
        Ok(())
    }

    /// Filter one stereo block in place
    pub fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) -> Result<()> {
        if left.len() != right.len() {
            return Err(EqError::ChannelLengthMismatch {
                left: left.len(),
                right: right.len(),
            });
        }
        self.begin_block(left.len())?;

        self.left.process_block(left);
        self.right.process_block(right);
        Ok(())
    }

    /// Filter one mono block in place through the left chain
    pub fn process_mono(&mut self, samples: &mut [f32]) -> Result<()> {
        self.begin_block(samples.len())?;
        self.left.process_block(samples);
        Ok(())
    }

    /// Filter a mono or stereo buffer in place
    pub fn process(&mut self, buffer: &mut AudioBuffer) -> Result<()> {
        let channels = buffer.channels();
        match buffer.stereo_mut() {
            Some((left, right)) => self.process_stereo(left, right),
            None if channels == 1 => self.process_mono(buffer.channel_mut(0)),
            None => Err(EqError::UnsupportedLayout {
                input_channels: channels,
                output_channels: channels,
            }),
        }
    }
}
