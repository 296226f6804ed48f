//! Scenario generation for benchmarking the TSSC codec.
//!
//! This crate provides:
//!
//! - A deterministic substation-style measurement feed
//! - Bursts where every analog point moves at once
//! - A serde mirror of the tuple for baseline size comparisons
//!
//! # Design Principles
//!
//! - **Reproducible** - All scenarios are deterministic given a seed.
//! - **Realistic** - Frames of analog, status and counter points at a fixed cadence.
//! - **Measurable** - Output format suitable for CI regression tracking.

use codec::{Measurement, PointId};
use serde::{Deserialize, Serialize};

/// Default frame cadence in 100 ns ticks (30 frames per second).
pub const FRAME_TICKS: i64 = 333_333;

/// First frame timestamp in 100 ns ticks.
pub const EPOCH_TICKS: i64 = 638_000_000_000_000_000;

/// Quality flag raised on a sample that failed validation upstream.
pub const QUALITY_SUSPECT: u32 = 0x0000_0040;

/// Shape of a generated feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioConfig {
    /// Number of points reported in every frame.
    pub points: u32,
    /// Number of frames.
    pub frames: u32,
    /// Nominal spacing between frames in 100 ns ticks.
    pub interval_ticks: i64,
    /// Each frame timestamp is moved by up to this many ticks either way.
    pub jitter_ticks: i64,
    /// RNG seed.
    pub seed: u64,
    /// Every `n`th frame moves every analog point at once.
    pub burst_every: Option<u32>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            points: 64,
            frames: 300,
            interval_ticks: FRAME_TICKS,
            jitter_ticks: 0,
            seed: 1,
            burst_every: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PointKind {
    /// Slowly drifting analog value, e.g. a voltage magnitude.
    Analog,
    /// Breaker or alarm status, 0.0 or 1.0.
    Status,
    /// Monotonic counter.
    Counter,
}

#[derive(Debug, Clone)]
struct PointState {
    kind: PointKind,
    value: f32,
    quality: u32,
}

/// Generates measurements frame by frame, each frame listing every point in
/// id order under one timestamp.
pub fn generate(config: &ScenarioConfig) -> Vec<Measurement> {
    let mut rng = Rng::new(config.seed);
    let mut points: Vec<PointState> = (0..config.points)
        .map(|id| {
            let kind = match id % 8 {
                0..=4 => PointKind::Analog,
                5 | 6 => PointKind::Status,
                _ => PointKind::Counter,
            };
            let value = match kind {
                PointKind::Analog => 100.0 + rng.range_i64(-5_000, 5_000) as f32 / 100.0,
                PointKind::Status => 0.0,
                PointKind::Counter => rng.range_i64(0, 1_000) as f32,
            };
            PointState {
                kind,
                value,
                quality: 0,
            }
        })
        .collect();

    let mut out = Vec::with_capacity(config.points as usize * config.frames as usize);
    for frame in 0..config.frames {
        let burst_now = config
            .burst_every
            .is_some_and(|every| every > 0 && frame > 0 && frame % every == 0);
        let mut timestamp = EPOCH_TICKS + i64::from(frame) * config.interval_ticks;
        if config.jitter_ticks > 0 {
            timestamp += rng.range_i64(-config.jitter_ticks, config.jitter_ticks);
        }
        for (id, state) in points.iter_mut().enumerate() {
            step(state, &mut rng, burst_now);
            out.push(Measurement::new(
                PointId::new(id as u32),
                timestamp,
                state.quality,
                state.value,
            ));
        }
    }
    out
}

fn step(state: &mut PointState, rng: &mut Rng, burst: bool) {
    match state.kind {
        PointKind::Analog => {
            if burst {
                state.value += rng.range_i64(-2_000, 2_000) as f32 / 100.0;
            } else if rng.next_u32() % 4 == 0 {
                state.value += rng.range_i64(-10, 10) as f32 / 100.0;
            }
        }
        PointKind::Status => {
            if burst || rng.next_u32() % 200 == 0 {
                state.value = if state.value == 0.0 { 1.0 } else { 0.0 };
            }
        }
        PointKind::Counter => {
            if rng.next_u32() % 3 == 0 {
                state.value += 1.0;
            }
        }
    }
    state.quality = if rng.next_u32() % 500 == 0 {
        QUALITY_SUSPECT
    } else {
        0
    };
}

/// Small deterministic LCG.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }

    pub fn range_i64(&mut self, min: i64, max: i64) -> i64 {
        let span = (max - min).unsigned_abs().max(1) + 1;
        let value = u64::from(self.next_u32()) % span;
        min + value as i64
    }
}

/// Plain serde mirror of a measurement for baseline encodings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SerdeMeasurement {
    pub id: u32,
    pub timestamp: i64,
    pub quality: u32,
    pub value: f32,
}

impl From<&Measurement> for SerdeMeasurement {
    fn from(measurement: &Measurement) -> Self {
        Self {
            id: measurement.id.raw(),
            timestamp: measurement.timestamp,
            quality: measurement.quality,
            value: measurement.value,
        }
    }
}
