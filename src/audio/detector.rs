//! Level detection for the demo meter
//!
//! A peak envelope follower turns raw input into a level in dB, and a
//! soft-knee gain computer works out how much a compressor with the current
//! settings would reduce it.

use levelplot::{CompressorCurveParams, GainReductionFeed};

/// Floor used when converting silence to dB
const SILENCE_DB: f32 = -120.0;

/// Linear amplitude to dB
pub fn gain_to_db(gain: f32) -> f32 {
    if gain > 0.0 {
        (20.0 * gain.log10()).max(SILENCE_DB)
    } else {
        SILENCE_DB
    }
}

/// One-pole coefficient for a time constant in milliseconds
fn coefficient(sample_rate: f32, time_ms: f32) -> f32 {
    if time_ms <= 0.0 {
        0.0
    } else {
        (-1.0 / (time_ms * 0.001 * sample_rate)).exp()
    }
}

/// Peak envelope follower with separate attack and release
pub struct PeakDetector {
    attack: f32,
    release: f32,
    envelope: f32,
}

impl PeakDetector {
    pub fn new(sample_rate: f32, attack_ms: f32, release_ms: f32) -> Self {
        Self {
            attack: coefficient(sample_rate, attack_ms),
            release: coefficient(sample_rate, release_ms),
            envelope: 0.0,
        }
    }

    /// Feed one sample, returning the envelope (linear)
    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let input = sample.abs();
        let coeff = if input > self.envelope {
            self.attack
        } else {
            self.release
        };
        self.envelope = input + coeff * (self.envelope - input);
        self.envelope
    }
}

/// Static output level of a soft-knee compressor for `level_db` in
pub fn compressed_level(params: &CompressorCurveParams, level_db: f64) -> f64 {
    let over = level_db - params.threshold_db;
    let knee = params.knee_width_db.max(0.0);
    let slope = 1.0 / params.ratio - 1.0;

    if knee > 0.0 && 2.0 * over.abs() <= knee {
        let x = over + knee / 2.0;
        level_db + slope * x * x / (2.0 * knee)
    } else if over > 0.0 {
        params.threshold_db + over / params.ratio
    } else {
        level_db
    }
}

/// Everything the input callback needs to drive a gain reduction plot
pub struct Meter {
    detector: PeakDetector,
    params: CompressorCurveParams,
    feed: GainReductionFeed,
}

impl Meter {
    pub fn new(sample_rate: f32, params: CompressorCurveParams, feed: GainReductionFeed) -> Self {
        Self {
            detector: PeakDetector::new(sample_rate, 1.0, 120.0),
            params,
            feed,
        }
    }

    /// Pick up new compressor settings; invalid ratios are ignored
    pub fn set_params(&mut self, params: &CompressorCurveParams) {
        if params.validate().is_ok() {
            self.params = params.clone();
        }
    }

    /// Feed one mono sample
    #[inline]
    pub fn process(&mut self, sample: f32) {
        let pre = gain_to_db(self.detector.process(sample)) as f64;
        let post = compressed_level(&self.params, pre);
        self.feed.process(pre, post, post - pre);
    }
}
