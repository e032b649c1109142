//! Measured frequency response of the full chain
//!
//! Runs an impulse through the engine, takes its FFT and checks the response
//! at test frequencies.

use std::sync::Arc;

use rustfft::{num_complex::Complex, FftPlanner};
use sixband_dsp::{db_to_gain, BandId, EngineConfig, EqEngine, EqParams};

const SAMPLE_RATE: f32 = 48000.0;
const FFT_LEN: usize = 16384;

fn mono_engine(params: Arc<EqParams>) -> EqEngine {
    let mut engine = EqEngine::new(params);
    engine
        .prepare(EngineConfig::new(SAMPLE_RATE, 1, FFT_LEN))
        .unwrap();
    engine
}

/// Magnitude spectrum (dB) of the engine's impulse response
fn measure(params: Arc<EqParams>) -> Vec<f32> {
    let mut engine = mono_engine(params);
    let mut impulse = vec![0.0_f32; FFT_LEN];
    impulse[0] = 1.0;
    engine.process_interleaved(&mut impulse).unwrap();

    let mut spectrum: Vec<Complex<f32>> = impulse.iter().map(|&x| Complex::new(x, 0.0)).collect();
    let mut planner = FftPlanner::<f32>::new();
    planner.plan_fft_forward(FFT_LEN).process(&mut spectrum);

    spectrum
        .iter()
        .take(FFT_LEN / 2)
        .map(|c| 20.0 * c.norm().log10())
        .collect()
}

fn bin(freq: f32) -> usize {
    (freq / SAMPLE_RATE * FFT_LEN as f32).round() as usize
}

fn bin_freq(freq: f32) -> f32 {
    bin(freq) as f32 * SAMPLE_RATE / FFT_LEN as f32
}

fn peak_amplitude(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0_f32, |m, s| m.max(s.abs()))
}

fn sine(freq: f32, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / SAMPLE_RATE).sin())
        .collect()
}

#[test]
fn measured_response_matches_analytic_curve() {
    let params = Arc::new(EqParams::new());
    params.set_by_key("LS_GAIN", 6.0).unwrap();
    params.set_by_key("P1_GAIN", -8.0).unwrap();
    params.set_by_key("P2_GAIN", 4.0).unwrap();
    params.set_by_key("HS_GAIN", -3.0).unwrap();
    params.set_by_key("HP_BYP", 0.0).unwrap();
    params.set_by_key("HP_FREQ", 40.0).unwrap();

    let engine = mono_engine(Arc::clone(&params));
    let measured = measure(params);

    for freq in [100.0, 500.0, 750.0, 2000.0, 3000.0, 9000.0, 15000.0] {
        let expected = engine.magnitude_db_at(bin_freq(freq));
        let got = measured[bin(freq)];
        assert!(
            (got - expected).abs() < 0.1,
            "{}Hz: measured {}dB, expected {}dB",
            freq,
            got,
            expected
        );
    }
}

#[test]
fn bypass_only_affects_its_own_band() {
    let params = Arc::new(EqParams::new());
    params.set_by_key("LS_GAIN", 9.0).unwrap();
    params.set_by_key("P2_FREQ", 6000.0).unwrap();
    params.set_by_key("P2_GAIN", 9.0).unwrap();
    params.set_by_key("P2_Q", 2.0).unwrap();

    let both = measure(Arc::clone(&params));

    params.set_by_key("P2_BYP", 1.0).unwrap();
    let shelf_only = measure(Arc::clone(&params));

    // Low shelf region: untouched by the peak's bypass
    for freq in [40.0, 80.0, 150.0] {
        let delta = both[bin(freq)] - shelf_only[bin(freq)];
        assert!(delta.abs() < 0.05, "{}Hz moved by {}dB", freq, delta);
    }

    // Peak region: the 9dB boost disappears
    let delta = both[bin(6000.0)] - shelf_only[bin(6000.0)];
    assert!((delta - 9.0).abs() < 0.1, "peak delta {}dB", delta);

    // Bypassing the peak leaves its stored settings alone
    assert_eq!(params.get_by_key("P2_GAIN").unwrap(), 9.0);
    assert_eq!(params.get_by_key("P2_FREQ").unwrap(), 6000.0);
}

#[test]
fn low_shelf_boost_scenario() {
    // 48kHz, defaults (HP/LP bypassed), LS_GAIN = +6dB
    let params = Arc::new(EqParams::new());
    params.set_by_key("LS_GAIN", 6.0).unwrap();
    assert!(params.band(BandId::HighPass).is_bypassed());
    assert!(params.band(BandId::LowPass).is_bypassed());

    let block = SAMPLE_RATE as usize;
    let settle = block / 2;

    // At the shelf corner (default 120Hz) a cookbook shelf gives half the dB gain
    let mut engine = mono_engine(Arc::clone(&params));
    let mut buffer = sine(120.0, block);
    engine.process_interleaved(&mut buffer).unwrap();
    let ratio = peak_amplitude(&buffer[settle..]);
    assert!(
        (ratio - db_to_gain(3.0)).abs() < 0.02,
        "120Hz gain {} (expected {})",
        ratio,
        db_to_gain(3.0)
    );

    // Well inside the shelf the full +6dB applies
    let mut engine = mono_engine(params);
    let mut buffer = sine(30.0, block);
    engine.process_interleaved(&mut buffer).unwrap();
    let ratio = peak_amplitude(&buffer[settle..]);
    assert!(
        (ratio - db_to_gain(6.0)).abs() < 0.04,
        "30Hz gain {} (expected {})",
        ratio,
        db_to_gain(6.0)
    );
}

#[test]
fn stereo_channels_are_filtered_independently() {
    let params = Arc::new(EqParams::new());
    params.set_by_key("P1_GAIN", 10.0).unwrap();
    params.set_by_key("HS_GAIN", -10.0).unwrap();
    params.set_by_key("LP_BYP", 0.0).unwrap();
    params.set_by_key("LP_FREQ", 9000.0).unwrap();

    let left = sine(700.0, 2048);
    let right: Vec<f32> = (0..2048).map(|i| if i % 100 == 0 { 1.0 } else { -0.1 }).collect();

    let mut stereo = EqEngine::new(Arc::clone(&params));
    stereo.prepare(EngineConfig::new(SAMPLE_RATE, 2, 2048)).unwrap();
    let mut interleaved: Vec<f32> = left
        .iter()
        .zip(right.iter())
        .flat_map(|(&l, &r)| [l, r])
        .collect();
    stereo.process_interleaved(&mut interleaved).unwrap();

    let mut left_alone = left.clone();
    mono_engine(Arc::clone(&params))
        .process_interleaved(&mut left_alone)
        .unwrap();
    let mut right_alone = right.clone();
    mono_engine(params)
        .process_interleaved(&mut right_alone)
        .unwrap();

    for (i, frame) in interleaved.chunks_exact(2).enumerate() {
        assert_eq!(frame[0], left_alone[i], "left diverged at frame {}", i);
        assert_eq!(frame[1], right_alone[i], "right diverged at frame {}", i);
    }
}

#[test]
fn extreme_settings_stay_bounded() {
    let params = Arc::new(EqParams::new());
    for key in ["LS_GAIN", "P1_GAIN", "P2_GAIN", "HS_GAIN"] {
        params.set_by_key(key, 15.0).unwrap();
    }
    for key in ["LS_Q", "P1_Q", "P2_Q", "HS_Q"] {
        params.set_by_key(key, 4.0).unwrap();
    }
    params.set_by_key("HP_BYP", 0.0).unwrap();
    params.set_by_key("LP_BYP", 0.0).unwrap();

    let mut engine = mono_engine(params);
    let mut noise: Vec<f32> = (0..48000)
        .map(|i| (((i as u32).wrapping_mul(2654435761) >> 16) as f32 / 32768.0) - 1.0)
        .collect();
    engine.process_interleaved(&mut noise).unwrap();

    assert!(noise.iter().all(|s| s.is_finite()));
    assert!(peak_amplitude(&noise) < 100.0);
}
