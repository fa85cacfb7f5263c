//! Host-facing engine
//!
//! - Planar audio buffers and level helpers
//! - The block processor a host drives
//! - Offline WAV rendering

pub mod buffer;
pub mod io;
pub mod processor;

pub use buffer::{AudioBuffer, ChannelLayout};
pub use io::{
    export_wav, generate_stereo_test_tone, generate_test_tone, import_wav, process_in_blocks,
    render_wav,
};
pub use processor::EqProcessor;
