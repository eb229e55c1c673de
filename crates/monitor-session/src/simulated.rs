//! Synthetic sources. None of these read a real sensor: each produces
//! plausible raw values so the classification and confidence path can run
//! end to end.

use crate::error::SessionError;
use crate::source::{RawSample, Sample, SampleSource, SourceProvider};
use biosignal_core::{amplitude_to_decibels, MonitoringDomain, RawInput};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::f64::consts::TAU;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Opens a simulated source for any domain. With a seed, every opened source
/// gets its own deterministic stream.
#[derive(Debug, Default)]
pub struct SimulatedSources {
    seed: Option<u64>,
    opened: AtomicU64,
}

impl SimulatedSources {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seed,
            opened: AtomicU64::new(0),
        }
    }

    fn rng(&self) -> SmallRng {
        let n = self.opened.fetch_add(1, Ordering::Relaxed);
        match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(n)),
            None => SmallRng::from_entropy(),
        }
    }
}

impl SourceProvider for SimulatedSources {
    fn open(&self, domain: MonitoringDomain) -> Result<Box<dyn SampleSource>, SessionError> {
        let rng = self.rng();
        debug!(%domain, "opening simulated source");
        Ok(match domain {
            MonitoringDomain::Sound => Box::new(SoundSource::new(rng)),
            MonitoringDomain::Cardiac => Box::new(CardiacSource { rng }),
            MonitoringDomain::Respiratory => Box::new(RespiratorySource::new(rng)),
            MonitoringDomain::Tremor => Box::new(TremorSource::new(rng)),
            MonitoringDomain::Gait => Box::new(GaitSource::new(rng)),
            MonitoringDomain::Speech => Box::new(SpeechSource::new(rng)),
        })
    }
}

fn push_bounded<T>(buf: &mut VecDeque<T>, value: T, cap: usize) {
    buf.push_back(value);
    while buf.len() > cap {
        buf.pop_front();
    }
}

fn mean(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let n = values.clone().count();
    if n == 0 {
        return 0.0;
    }
    values.sum::<f64>() / n as f64
}

/// Population variance; zero below two values.
pub(crate) fn variance(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let n = values.clone().count();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values.clone());
    values.map(|v| (v - m).powi(2)).sum::<f64>() / n as f64
}

pub(crate) fn mean_abs_deviation(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let m = mean(values.clone());
    mean(values.map(|v| (v - m).abs()))
}

/// `1 - (var x + var z)`, clamped to `[0, 1]`.
pub(crate) fn gait_stability(
    xs: impl Iterator<Item = f64> + Clone,
    zs: impl Iterator<Item = f64> + Clone,
) -> f64 {
    (1.0 - (variance(xs) + variance(zs))).clamp(0.0, 1.0)
}

/// Metering level in dBFS mapped onto `[0, 1]`, scaled to 0.8 plus jitter.
pub(crate) fn speech_volume(level_dbfs: f64, jitter: f64) -> f64 {
    ((level_dbfs + 100.0) / 60.0).clamp(0.0, 1.0) * 0.8 + jitter
}

pub(crate) fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Microphone amplitude as a bounded random walk.
pub struct SoundSource {
    rng: SmallRng,
    amplitude: f64,
}

impl SoundSource {
    pub fn new(rng: SmallRng) -> Self {
        Self {
            rng,
            amplitude: 0.45,
        }
    }
}

impl SampleSource for SoundSource {
    fn domain(&self) -> MonitoringDomain {
        MonitoringDomain::Sound
    }

    fn next_sample(&mut self, _now_ms: i64) -> Sample {
        self.amplitude = (self.amplitude + self.rng.gen_range(-0.05..0.05)).clamp(0.0, 1.0);
        let db = amplitude_to_decibels(self.amplitude);
        Sample::Ready(RawSample {
            input: RawInput::Sound { db },
            raw_value: db,
        })
    }
}

/// Camera PPG stand-in: 72 bpm with uniform jitter.
pub struct CardiacSource {
    rng: SmallRng,
}

impl SampleSource for CardiacSource {
    fn domain(&self) -> MonitoringDomain {
        MonitoringDomain::Cardiac
    }

    fn next_sample(&mut self, _now_ms: i64) -> Sample {
        let heart_rate = (72.0 + self.rng.gen_range(-5.0..5.0_f64)).round() as i32;
        Sample::Ready(RawSample {
            input: RawInput::Cardiac { heart_rate },
            raw_value: f64::from(heart_rate),
        })
    }
}

/// Breathing rate drifts slowly around 14/min; the raw value is the
/// microphone metering level in dBFS.
pub struct RespiratorySource {
    rng: SmallRng,
}

impl RespiratorySource {
    pub fn new(rng: SmallRng) -> Self {
        Self { rng }
    }
}

impl SampleSource for RespiratorySource {
    fn domain(&self) -> MonitoringDomain {
        MonitoringDomain::Respiratory
    }

    fn next_sample(&mut self, now_ms: i64) -> Sample {
        let metering: f64 = -45.0 + self.rng.gen_range(-3.0..3.0);
        let drift = (now_ms as f64 / 5000.0).sin() * 3.0;
        let noise = (self.rng.gen::<f64>() - 0.5) * 2.0;
        let breaths_per_minute = round_tenth(14.0 + drift + noise);
        Sample::Ready(RawSample {
            input: RawInput::Respiratory { breaths_per_minute },
            raw_value: metering,
        })
    }
}

const TREMOR_HISTORY: usize = 50;
const TREMOR_MIN_SAMPLES: usize = 20;

/// Acceleration magnitude with a small oscillation. Intensity is the mean
/// absolute deviation over the last 50 magnitudes.
pub struct TremorSource {
    rng: SmallRng,
    magnitudes: VecDeque<f64>,
}

impl TremorSource {
    pub fn new(rng: SmallRng) -> Self {
        Self {
            rng,
            magnitudes: VecDeque::with_capacity(TREMOR_HISTORY),
        }
    }
}

impl SampleSource for TremorSource {
    fn domain(&self) -> MonitoringDomain {
        MonitoringDomain::Tremor
    }

    fn next_sample(&mut self, now_ms: i64) -> Sample {
        let t = now_ms as f64 / 1000.0;
        let osc = 0.03 * (TAU * 5.5 * t).sin();
        let x = osc + self.rng.gen_range(-0.01..0.01);
        let y = 0.5 * osc + self.rng.gen_range(-0.01..0.01);
        let z = 0.05 + self.rng.gen_range(-0.01..0.01);
        let magnitude = (x * x + y * y + z * z).sqrt();

        push_bounded(&mut self.magnitudes, magnitude, TREMOR_HISTORY);
        if self.magnitudes.len() < TREMOR_MIN_SAMPLES {
            return Sample::Warming(magnitude);
        }

        let intensity = mean_abs_deviation(self.magnitudes.iter().copied());
        let frequency = 5.0 + self.rng.gen_range(0.0..2.0);
        Sample::Ready(RawSample {
            input: RawInput::Tremor {
                intensity,
                frequency,
            },
            raw_value: magnitude,
        })
    }
}

const GAIT_HISTORY: usize = 100;
const GAIT_MIN_SAMPLES: usize = 20;
const STEP_HISTORY: usize = 10;
const STEP_THRESHOLD: f64 = 0.5;
const STEP_DEBOUNCE_MS: i64 = 250;
const STEPS_PER_SECOND: f64 = 1.8;

/// Counts a step when vertical acceleration jumps above the threshold
/// straight from a negative sample. Steps closer than 250 ms to the last one
/// are ignored and only the last 10 are kept.
#[derive(Debug, Default)]
pub(crate) struct StepDetector {
    last_vertical: f64,
    steps: VecDeque<i64>,
}

impl StepDetector {
    pub(crate) fn observe(&mut self, vertical: f64, now_ms: i64) {
        if vertical > STEP_THRESHOLD && self.last_vertical < 0.0 {
            let debounced = self
                .steps
                .back()
                .map_or(true, |last| now_ms - last > STEP_DEBOUNCE_MS);
            if debounced {
                push_bounded(&mut self.steps, now_ms, STEP_HISTORY);
            }
        }
        self.last_vertical = vertical;
    }

    pub(crate) fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Cadence over the span between the first and last kept step.
    pub(crate) fn steps_per_minute(&self) -> f64 {
        match (self.steps.front(), self.steps.back()) {
            (Some(first), Some(last)) if self.steps.len() >= 2 && last > first => {
                let span_s = (last - first) as f64 / 1000.0;
                (self.steps.len() - 1) as f64 / span_s * 60.0
            }
            _ => 0.0,
        }
    }
}

/// Walking phone in a pocket: a short heel-strike spike on the vertical axis
/// once per step, small sway on the other two.
pub struct GaitSource {
    rng: SmallRng,
    accel: VecDeque<(f64, f64, f64)>,
    steps: StepDetector,
}

impl GaitSource {
    pub fn new(rng: SmallRng) -> Self {
        Self {
            rng,
            accel: VecDeque::with_capacity(GAIT_HISTORY),
            steps: StepDetector::default(),
        }
    }
}

impl SampleSource for GaitSource {
    fn domain(&self) -> MonitoringDomain {
        MonitoringDomain::Gait
    }

    fn next_sample(&mut self, now_ms: i64) -> Sample {
        let phase = (now_ms as f64 / 1000.0 * STEPS_PER_SECOND).fract();
        let strike = if phase < 0.25 { 1.0 } else { -0.3 };
        let x: f64 = self.rng.gen_range(-0.15..0.15);
        let y: f64 = strike + self.rng.gen_range(-0.1..0.1);
        let z: f64 = self.rng.gen_range(-0.15..0.15);
        push_bounded(&mut self.accel, (x, y, z), GAIT_HISTORY);

        if self.accel.len() < GAIT_MIN_SAMPLES {
            return Sample::Warming(y);
        }
        self.steps.observe(y, now_ms);

        let symmetry = 0.8 + self.rng.gen_range(0.0..0.2);
        let stability = gait_stability(
            self.accel.iter().map(|a| a.0),
            self.accel.iter().map(|a| a.2),
        );
        Sample::Ready(RawSample {
            input: RawInput::Gait {
                steps_per_minute: self.steps.steps_per_minute(),
                symmetry,
                stability,
            },
            raw_value: y,
        })
    }
}

/// Speech metrics around a metering level in dBFS.
pub struct SpeechSource {
    rng: SmallRng,
}

impl SpeechSource {
    pub fn new(rng: SmallRng) -> Self {
        Self { rng }
    }
}

impl SampleSource for SpeechSource {
    fn domain(&self) -> MonitoringDomain {
        MonitoringDomain::Speech
    }

    fn next_sample(&mut self, _now_ms: i64) -> Sample {
        let level: f64 = -35.0 + self.rng.gen_range(-10.0..10.0);
        let clarity = 0.75 + self.rng.gen_range(0.0..0.2);
        let volume = speech_volume(level, self.rng.gen_range(0.0..0.2));
        let rhythm = 0.7 + self.rng.gen_range(0.0..0.3);
        Sample::Ready(RawSample {
            input: RawInput::Speech {
                clarity,
                volume,
                rhythm,
            },
            raw_value: level,
        })
    }
}
