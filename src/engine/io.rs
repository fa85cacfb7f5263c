//! Offline WAV I/O
//!
//! Reads and writes WAV files through hound and renders a file through an
//! [`EqProcessor`] block by block, the same way a host would drive it. Audio
//! is kept at the file's own sample rate; the filters are designed for
//! whatever rate the processor is prepared at.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::engine::buffer::{AudioBuffer, ChannelLayout};
use crate::engine::processor::EqProcessor;
use crate::error::{EqError, Result};

/// Import a mono or stereo WAV file as 32-bit float
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `UnsupportedFormat` - More than 2 channels, or an unsupported bit depth
/// * `InvalidAudio` - If the file holds no frames
/// * `Wav` - If hound cannot parse the file
pub fn import_wav(path: &Path) -> Result<AudioBuffer> {
    if !path.exists() {
        return Err(EqError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    let layout = ChannelLayout::from_count(channels).ok_or_else(|| EqError::UnsupportedFormat {
        format: format!("{}-channel audio (only mono/stereo supported)", channels),
    })?;

    let interleaved = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;
    if interleaved.is_empty() {
        return Err(EqError::InvalidAudio {
            reason: format!("{} contains no audio frames", path.display()),
        });
    }

    let buffer = AudioBuffer::from_interleaved(&interleaved, layout, spec.sample_rate)?;
    tracing::debug!(
        path = %path.display(),
        channels,
        sample_rate = spec.sample_rate,
        frames = buffer.len(),
        "imported wav"
    );
    Ok(buffer)
}

/// Write a buffer to a WAV file at its own sample rate
///
/// `bit_depth` 16 and 24 write integer PCM, 32 writes IEEE float.
pub fn export_wav(buffer: &AudioBuffer, path: &Path, bit_depth: u16) -> Result<()> {
    let sample_format = match bit_depth {
        16 | 24 => SampleFormat::Int,
        32 => SampleFormat::Float,
        _ => {
            return Err(EqError::UnsupportedFormat {
                format: format!("{}-bit audio (only 16, 24, 32 supported)", bit_depth),
            })
        }
    };
    if buffer.channel_layout().is_none() {
        return Err(EqError::UnsupportedFormat {
            format: format!("{}-channel audio (only mono/stereo supported)", buffer.channels()),
        });
    }

    let spec = WavSpec {
        channels: buffer.channels() as u16,
        sample_rate: buffer.sample_rate,
        bits_per_sample: bit_depth,
        sample_format,
    };
    let mut writer = WavWriter::create(path, spec)?;

    for sample in buffer.to_interleaved() {
        match bit_depth {
            16 => writer.write_sample((sample * 32767.0).clamp(-32768.0, 32767.0) as i16)?,
            // 24-bit stored as i32 in hound
            24 => writer.write_sample((sample * 8388607.0).clamp(-8388608.0, 8388607.0) as i32)?,
            _ => writer.write_sample(sample)?,
        }
    }
    writer.finalize()?;

    tracing::debug!(path = %path.display(), bit_depth, frames = buffer.len(), "exported wav");
    Ok(())
}

/// Filter `input` through `processor` and write the result to `output`
///
/// Prepares the processor at the file's sample rate with `block_size` as
/// the maximum block, then feeds it consecutive blocks. The rendered file
/// is 32-bit float. Returns the processed audio.
pub fn render_wav(
    input: &Path,
    output: &Path,
    processor: &mut EqProcessor,
    block_size: usize,
) -> Result<AudioBuffer> {
    let mut buffer = import_wav(input)?;
    let block_size = block_size.max(1);

    processor.prepare(buffer.sample_rate as f64, block_size)?;
    process_in_blocks(processor, &mut buffer, block_size)?;
    export_wav(&buffer, output, 32)?;

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        frames = buffer.len(),
        block_size,
        "rendered wav"
    );
    Ok(buffer)
}

/// Run a whole buffer through a prepared processor, `block_size` frames at a time
pub fn process_in_blocks(
    processor: &mut EqProcessor,
    buffer: &mut AudioBuffer,
    block_size: usize,
) -> Result<()> {
    let block_size = block_size.max(1);
    let channels = buffer.channels();

    match buffer.stereo_mut() {
        Some((left, right)) => {
            for (l, r) in left.chunks_mut(block_size).zip(right.chunks_mut(block_size)) {
                processor.process_stereo(l, r)?;
            }
        }
        None if channels == 1 => {
            for block in buffer.channel_mut(0).chunks_mut(block_size) {
                processor.process_mono(block)?;
            }
        }
        None => {
            return Err(EqError::UnsupportedLayout {
                input_channels: channels,
                output_channels: channels,
            })
        }
    }
    Ok(())
}

/// Generate a mono sine wave at full scale
pub fn generate_test_tone(frequency: f32, duration_secs: f32, sample_rate: u32) -> AudioBuffer {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let mut buffer = AudioBuffer::new(num_samples, ChannelLayout::Mono, sample_rate);
    fill_sine(buffer.channel_mut(0), frequency, sample_rate);
    buffer
}

/// Generate a stereo buffer with a different sine in each channel
pub fn generate_stereo_test_tone(
    freq_left: f32,
    freq_right: f32,
    duration_secs: f32,
    sample_rate: u32,
) -> AudioBuffer {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let mut buffer = AudioBuffer::new(num_samples, ChannelLayout::Stereo, sample_rate);
    fill_sine(buffer.channel_mut(0), freq_left, sample_rate);
    fill_sine(buffer.channel_mut(1), freq_right, sample_rate);
    buffer
}

fn fill_sine(samples: &mut [f32], frequency: f32, sample_rate: u32) {
    let angular_freq = 2.0 * std::f64::consts::PI * frequency as f64 / sample_rate as f64;
    for (i, sample) in samples.iter_mut().enumerate() {
        *sample = (angular_freq * i as f64).sin() as f32;
    }
}

// ============================================================================
// Internal helper functions
// ============================================================================

/// Read samples from a WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    let samples: Vec<f32> = match (sample_format, bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, hound::Error>>()?,
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<std::result::Result<Vec<f32>, hound::Error>>()?,
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 8388608.0))
            .collect::<std::result::Result<Vec<f32>, hound::Error>>()?,
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| (v as f64 / 2147483648.0) as f32))
            .collect::<std::result::Result<Vec<f32>, hound::Error>>()?,
        (format, bits) => {
            return Err(EqError::UnsupportedFormat {
                format: format!("{}-bit {:?} audio", bits, format),
            })
        }
    };
    Ok(samples)
}

// ============================================================================
// Tests
// ============================================================================
