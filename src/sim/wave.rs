//! Wave sequencing
//!
//! A round plays a fixed opening sequence followed by a long tail of randomly
//! sampled wave shapes. Every wave also tightens the pace.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::settings::{MAX_RANDOM_WAVES, Tuning};

/// How an individual spawn decides whether it is a bomb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BombPolicy {
    Never,
    Always,
    Random,
}

/// Pattern of enemies tossed together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaveShape {
    OneNoBomb,
    One,
    TwoWithOneBomb,
    Two,
    Three,
    Four,
    /// Five enemies spaced a fifth of the chain delay apart
    Chain,
    /// Five enemies at half the spacing of `Chain`
    FastChain,
}

impl WaveShape {
    pub const ALL: [WaveShape; 8] = [
        WaveShape::OneNoBomb,
        WaveShape::One,
        WaveShape::TwoWithOneBomb,
        WaveShape::Two,
        WaveShape::Three,
        WaveShape::Four,
        WaveShape::Chain,
        WaveShape::FastChain,
    ];

    /// Gentle start every round opens with
    pub const OPENING: [WaveShape; 7] = [
        WaveShape::OneNoBomb,
        WaveShape::OneNoBomb,
        WaveShape::TwoWithOneBomb,
        WaveShape::TwoWithOneBomb,
        WaveShape::Three,
        WaveShape::One,
        WaveShape::Chain,
    ];

    /// Uniformly pick a shape
    pub fn sample(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Spawn actions for this shape, with deferred ones spaced over `chain_delay`
    pub fn spawn_plan(self, chain_delay: f32) -> Vec<SpawnAction> {
        let now = |bomb| SpawnAction { delay: 0.0, bomb };
        match self {
            WaveShape::OneNoBomb => vec![now(BombPolicy::Never)],
            WaveShape::One => vec![now(BombPolicy::Random)],
            WaveShape::TwoWithOneBomb => vec![now(BombPolicy::Never), now(BombPolicy::Always)],
            WaveShape::Two => vec![now(BombPolicy::Random); 2],
            WaveShape::Three => vec![now(BombPolicy::Random); 3],
            WaveShape::Four => vec![now(BombPolicy::Random); 4],
            WaveShape::Chain => chained(chain_delay / 5.0),
            WaveShape::FastChain => chained(chain_delay / 10.0),
        }
    }
}

/// One immediate spawn followed by four spaced `step` apart
fn chained(step: f32) -> Vec<SpawnAction> {
    (0..5)
        .map(|k| SpawnAction {
            delay: step * k as f32,
            bomb: BombPolicy::Random,
        })
        .collect()
}

/// A single enemy spawn, `delay` seconds after the wave starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnAction {
    pub delay: f32,
    pub bomb: BombPolicy,
}

impl SpawnAction {
    pub fn is_immediate(&self) -> bool {
        self.delay <= 0.0
    }
}

/// Difficulty knobs that tighten after every wave
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pace {
    /// Delay before the next wave once the field is clear (seconds)
    pub popup_time: f32,
    /// Window a chained wave is spread over (seconds)
    pub chain_delay: f32,
    /// Simulation speed multiplier for enemy motion
    pub fall_speed: f32,
}

impl Pace {
    fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            popup_time: tuning.popup_time,
            chain_delay: tuning.chain_delay,
            fall_speed: tuning.world_speed,
        }
    }
}

/// Next wave handed out by the sequencer
#[derive(Debug, Clone, PartialEq)]
pub struct Wave {
    /// Position in the sequence (0-based)
    pub index: usize,
    pub shape: WaveShape,
    /// Pace after this wave's decay, used to schedule it
    pub pace: Pace,
    pub actions: Vec<SpawnAction>,
}

/// Pre-generated wave sequence with a cursor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveSequencer {
    shapes: Vec<WaveShape>,
    cursor: usize,
    pace: Pace,
    popup_decay: f32,
    chain_decay: f32,
    speed_growth: f32,
}

impl WaveSequencer {
    /// Build the opening sequence plus `tuning.random_waves` sampled shapes,
    /// capped at `MAX_RANDOM_WAVES`
    pub fn new(tuning: &Tuning, rng: &mut impl Rng) -> Self {
        let random_waves = tuning.random_waves.min(MAX_RANDOM_WAVES);
        let mut shapes = Vec::with_capacity(WaveShape::OPENING.len() + random_waves);
        shapes.extend_from_slice(&WaveShape::OPENING);
        shapes.extend((0..random_waves).map(|_| WaveShape::sample(rng)));
        Self::from_shapes(shapes, tuning)
    }

    /// Sequencer over an explicit list of shapes
    pub fn from_shapes(shapes: Vec<WaveShape>, tuning: &Tuning) -> Self {
        Self {
            shapes,
            cursor: 0,
            pace: Pace::from_tuning(tuning),
            popup_decay: tuning.popup_decay,
            chain_decay: tuning.chain_decay,
            speed_growth: tuning.world_speed_growth,
        }
    }

    /// Apply the per-wave decay and hand out the shape at the cursor.
    /// Returns None once the sequence is exhausted; the pace is left alone then.
    pub fn next(&mut self) -> Option<Wave> {
        let shape = *self.shapes.get(self.cursor)?;

        self.pace.popup_time *= self.popup_decay;
        self.pace.chain_delay *= self.chain_decay;
        self.pace.fall_speed *= self.speed_growth;

        let wave = Wave {
            index: self.cursor,
            shape,
            pace: self.pace,
            actions: shape.spawn_plan(self.pace.chain_delay),
        };
        self.cursor += 1;
        Some(wave)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.shapes.len()
    }

    pub fn pace(&self) -> Pace {
        self.pace
    }

    pub fn shapes(&self) -> &[WaveShape] {
        &self.shapes
    }
}
