//! Integration Tests
//!
//! End-to-end tests for the equalizer: controls in, audio through the
//! processor, levels measured on the way out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use simple_eq::engine::buffer::calculate_peak;
use simple_eq::engine::{generate_stereo_test_tone, generate_test_tone, process_in_blocks};
use simple_eq::{
    AudioBuffer, ChannelLayout, EngineConfig, EqError, EqProcessor, ParamId, ParameterStore, Slope,
};

const BLOCK: usize = 512;

fn processor(sample_rate: f64) -> (Arc<ParameterStore>, EqProcessor) {
    let store = Arc::new(ParameterStore::new());
    let mut eq = EqProcessor::new(Arc::clone(&store), EngineConfig::default());
    eq.prepare(sample_rate, BLOCK).unwrap();
    (store, eq)
}

/// Level change in dB of one channel, measured after `skip` samples
fn gain_db(input: &AudioBuffer, output: &AudioBuffer, channel: usize, skip: usize) -> f32 {
    let settled = |buffer: &AudioBuffer| buffer.slice(skip, buffer.len()).rms_db(channel);
    settled(output) - settled(input)
}

fn render_mono(eq: &mut EqProcessor, input: &AudioBuffer) -> AudioBuffer {
    let mut output = input.clone();
    process_in_blocks(eq, &mut output, BLOCK).unwrap();
    output
}

// === Frequency Response Tests ===

#[test]
fn test_peak_boost_at_center() {
    let (store, mut eq) = processor(48000.0);
    store.set(ParamId::PeakFreq, 1000.0);
    store.set(ParamId::PeakGain, 6.0);
    store.set(ParamId::PeakQ, 1.0);

    let input = generate_test_tone(1000.0, 1.0, 48000);
    let output = render_mono(&mut eq, &input);

    let gain = gain_db(&input, &output, 0, 4800);
    assert!(
        (gain - 6.0).abs() < 0.3,
        "Expected +6 dB at 1 kHz, got {:.2} dB",
        gain
    );
}

#[test]
fn test_peak_cut_leaves_distant_frequencies() {
    let (store, mut eq) = processor(48000.0);
    store.set(ParamId::PeakFreq, 1000.0);
    store.set(ParamId::PeakGain, -12.0);
    store.set(ParamId::PeakQ, 4.0);

    let input = generate_test_tone(8000.0, 1.0, 48000);
    let output = render_mono(&mut eq, &input);

    let gain = gain_db(&input, &output, 0, 4800);
    assert!(gain.abs() < 0.3, "8 kHz should pass, got {:.2} dB", gain);
}

#[test]
fn test_low_cut_48db_attenuation() {
    let (store, mut eq) = processor(48000.0);
    store.set(ParamId::LowCutFreq, 120.0);
    store.set(ParamId::LowCutSlope, 3.0);

    // One octave under the corner
    let input = generate_test_tone(60.0, 2.0, 48000);
    let output = render_mono(&mut eq, &input);
    let gain = gain_db(&input, &output, 0, 48000);
    assert!(gain < -40.0, "Expected at least 40 dB cut at 60 Hz, got {:.2} dB", gain);

    // 8th-order Butterworth: |H|^2 = 1 / (1 + (120/100)^16)
    eq.reset();
    let input = generate_test_tone(100.0, 2.0, 48000);
    let output = render_mono(&mut eq, &input);
    let gain = gain_db(&input, &output, 0, 48000);
    assert!(
        (gain + 12.9).abs() < 0.5,
        "Expected about -12.9 dB at 100 Hz, got {:.2} dB",
        gain
    );
}

#[test]
fn test_slope_steepens_cut() {
    let mut previous = 0.0_f32;
    for slope in Slope::ALL {
        let (store, mut eq) = processor(48000.0);
        store.set(ParamId::HighCutFreq, 2000.0);
        store.set(ParamId::HighCutSlope, slope.index() as f32);

        let input = generate_test_tone(4000.0, 1.0, 48000);
        let output = render_mono(&mut eq, &input);
        let gain = gain_db(&input, &output, 0, 4800);

        // Roughly 12 dB more per octave with each step
        let expected = -(slope.db_per_octave() as f32);
        assert!(
            (gain - expected).abs() < 2.0,
            "{}: expected about {} dB one octave up, got {:.2} dB",
            slope.label(),
            expected,
            gain
        );
        assert!(gain < previous);
        previous = gain;
    }
}

#[test]
fn test_bypassed_sections_pass_audio() {
    let (store, mut eq) = processor(48000.0);
    store.set(ParamId::LowCutFreq, 2000.0);
    store.set(ParamId::HighCutFreq, 500.0);
    store.set(ParamId::PeakGain, 12.0);
    store.set_by_id("LC_bypass", 1.0).unwrap();
    store.set_by_id("PD_bypass", 1.0).unwrap();
    store.set_by_id("HC_bypass", 1.0).unwrap();

    let input = generate_test_tone(1000.0, 0.1, 48000);
    let output = render_mono(&mut eq, &input);
    // Only near-zero samples are flushed on the way in
    for (a, b) in input.channel(0).iter().zip(output.channel(0)) {
        assert!((a - b).abs() < 1e-12);
    }
}

// === Stereo Tests ===

#[test]
fn test_stereo_channels_identical_for_identical_input() {
    let (store, mut eq) = processor(44100.0);
    store.set(ParamId::LowCutFreq, 200.0);
    store.set(ParamId::LowCutSlope, 2.0);
    store.set(ParamId::PeakFreq, 3000.0);
    store.set(ParamId::PeakGain, -7.5);
    store.set(ParamId::HighCutFreq, 9000.0);

    let mono = generate_test_tone(440.0, 0.5, 44100);
    let mut stereo = AudioBuffer {
        samples: vec![mono.channel(0).to_vec(), mono.channel(0).to_vec()],
        sample_rate: 44100,
    };
    process_in_blocks(&mut eq, &mut stereo, BLOCK).unwrap();

    assert_eq!(stereo.channel(0), stereo.channel(1));
}

#[test]
fn test_stereo_channels_keep_separate_state() {
    let (store, mut eq) = processor(48000.0);
    store.set_toggle(ParamId::LowCutBypassed, true);
    store.set(ParamId::HighCutFreq, 1000.0);
    store.set(ParamId::HighCutSlope, 3.0);

    let mut stereo = generate_stereo_test_tone(200.0, 5000.0, 1.0, 48000);
    let input = stereo.clone();
    process_in_blocks(&mut eq, &mut stereo, BLOCK).unwrap();

    let left = gain_db(&input, &stereo, 0, 4800);
    let right = gain_db(&input, &stereo, 1, 4800);
    assert!(left.abs() < 0.5, "200 Hz should pass, got {:.2} dB", left);
    assert!(right < -60.0, "5 kHz should be cut, got {:.2} dB", right);
}

// === Stability Tests ===

#[test]
fn test_silence_remains_silent() {
    let (store, mut eq) = processor(48000.0);
    store.set(ParamId::PeakGain, 24.0);
    store.set(ParamId::PeakQ, 24.0);
    store.set(ParamId::LowCutSlope, 3.0);
    store.set(ParamId::HighCutSlope, 3.0);

    let mut silence = AudioBuffer::new(48000, ChannelLayout::Stereo, 48000);
    process_in_blocks(&mut eq, &mut silence, BLOCK).unwrap();

    assert!(silence.samples.iter().flatten().all(|&s| s == 0.0));
}

#[test]
fn test_coefficient_swap_is_continuous() {
    let (store, mut eq) = processor(48000.0);
    store.set(ParamId::PeakFreq, 1000.0);

    let tone = generate_test_tone(100.0, 0.5, 48000);
    let mut signal: Vec<f32> = tone
        .channel(0)
        .iter()
        .map(|s| s * 0.5)
        .collect();

    for (i, block) in signal.chunks_mut(BLOCK).enumerate() {
        if i == 20 {
            store.set(ParamId::PeakGain, 12.0);
        }
        eq.process_mono(block).unwrap();
    }

    assert!(signal.iter().all(|s| s.is_finite()));
    let max_step = signal
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(0.0_f32, f32::max);
    assert!(max_step < 0.2, "Discontinuity of {:.3} after swap", max_step);
    assert!(calculate_peak(&signal) < 2.0);
}

#[test]
fn test_concurrent_parameter_writes() {
    let (store, mut eq) = processor(48000.0);
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let store = Arc::clone(&store);
        let done = Arc::clone(&done);
        std::thread::spawn(move || {
            let mut i = 0u32;
            while !done.load(Ordering::Relaxed) {
                let t = (i % 1000) as f32 / 1000.0;
                store.set_normalized(ParamId::PeakFreq, t);
                store.set_normalized(ParamId::PeakGain, 1.0 - t);
                store.set_normalized(ParamId::LowCutFreq, t * 0.5);
                store.set(ParamId::LowCutSlope, (i % 4) as f32);
                store.set(ParamId::HighCutSlope, ((i / 4) % 4) as f32);
                store.set_toggle(ParamId::PeakBypassed, i % 7 == 0);
                i = i.wrapping_add(1);
                std::thread::yield_now();
            }
        })
    };

    let mut stereo = generate_stereo_test_tone(220.0, 3300.0, 0.1, 48000);
    for _ in 0..50 {
        process_in_blocks(&mut eq, &mut stereo, 256).unwrap();
        for ch in stereo.samples.iter_mut() {
            for s in ch.iter_mut() {
                *s = s.clamp(-1.0, 1.0);
            }
        }
    }

    done.store(true, Ordering::Relaxed);
    writer.join().unwrap();

    assert!(stereo.is_finite());
}

// === Lifecycle Tests ===

#[test]
fn test_process_before_prepare() {
    let store = Arc::new(ParameterStore::new());
    let mut eq = EqProcessor::new(store, EngineConfig::default());
    let mut buffer = AudioBuffer::new(64, ChannelLayout::Stereo, 48000);

    let err = eq.process(&mut buffer).unwrap_err();
    assert!(matches!(err, EqError::NotPrepared));
    assert!(err.is_recoverable());
}

#[test]
fn test_layout_rejection() {
    assert!(EqProcessor::is_layout_supported(2, 2));
    assert!(!EqProcessor::is_layout_supported(2, 1));

    let (_, mut eq) = processor(48000.0);
    let mut quad = AudioBuffer {
        samples: vec![vec![0.0; 64]; 4],
        sample_rate: 48000,
    };
    assert!(matches!(
        eq.process(&mut quad),
        Err(EqError::UnsupportedLayout { .. })
    ));
}

#[test]
fn test_block_too_large() {
    let (_, mut eq) = processor(48000.0);
    let mut block = vec![0.0_f32; BLOCK + 1];
    assert!(matches!(
        eq.process_mono(&mut block),
        Err(EqError::BlockTooLarge { .. })
    ));
}

#[test]
fn test_reprepare_at_new_sample_rate() {
    let (store, mut eq) = processor(44100.0);
    store.set(ParamId::PeakFreq, 1000.0);
    store.set(ParamId::PeakGain, 6.0);

    let input = generate_test_tone(1000.0, 0.5, 44100);
    render_mono(&mut eq, &input);

    eq.prepare(96000.0, BLOCK).unwrap();
    assert!((eq.magnitude_response_db(1000.0) - 6.0).abs() < 0.05);

    let input = generate_test_tone(1000.0, 1.0, 96000);
    let output = render_mono(&mut eq, &input);
    let gain = gain_db(&input, &output, 0, 9600);
    assert!((gain - 6.0).abs() < 0.3, "Expected +6 dB at 96 kHz, got {:.2} dB", gain);
}

#[test]
fn test_tail_length_is_zero() {
    let (_, eq) = processor(48000.0);
    assert_eq!(eq.tail_length_secs(), 0.0);
}
