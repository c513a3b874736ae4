//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Timers on the simulation clock, never wall-clock callbacks
//! - No rendering, audio or platform dependencies; those go out as events

pub mod schedule;
pub mod session;
pub mod state;
pub mod tick;
pub mod wave;

pub use schedule::{CancelToken, Command, Scheduler};
pub use session::Session;
pub use state::{
    EffectKind, Enemy, EnemyId, EnemyKind, EnemyState, GameEvent, GameState, RoundPhase,
    SliceOutcome, SliceTrail,
};
pub use tick::{TickInput, TouchEvent, TouchPhase, handle_touch, tick};
pub use wave::{BombPolicy, Pace, SpawnAction, Wave, WaveSequencer, WaveShape};
