//! Filter chain engine
//!
//! Coefficient design, biquad stages, cascades, per-channel chains and the
//! updater that swaps coefficients into them between blocks.

pub mod biquad;
pub mod cascade;
pub mod chain;
pub mod coefficients;
pub mod updater;

pub use biquad::{BiquadStage, StageState};
pub use cascade::Cascade;
pub use chain::{ChainPosition, ChannelChain};
pub use coefficients::{
    design_butterworth_cascade, design_peak, CascadeCoefficients, CoefficientSet, CutKind,
    MAX_SECTIONS,
};
pub use updater::ChainUpdater;
