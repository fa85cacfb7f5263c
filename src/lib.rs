//! SimpleEQ - Real-time Stereo Equalizer Engine
//!
//! Three sections per channel, always in this order:
//! 1. Low-cut: Butterworth high-pass, 12/24/36/48 dB/oct
//! 2. Peak: one peaking biquad (frequency, gain, Q)
//! 3. High-cut: Butterworth low-pass, 12/24/36/48 dB/oct
//!
//! # Architecture
//!
//! - [`ParameterStore`]: lock-free controls, written from any thread
//! - [`settings::resolve`]: per-block snapshot of the store
//! - [`dsp::ChainUpdater`]: designs coefficients and installs them into both chains
//! - [`EqProcessor`]: the block boundary a host calls
//!
//! The audio path never locks, allocates or logs.

pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod params;
pub mod settings;

pub use config::EngineConfig;
pub use engine::{AudioBuffer, ChannelLayout, EqProcessor};
pub use error::{EqError, Result};
pub use params::{ParamId, ParameterStore};
pub use settings::{FilterSettings, Slope};
