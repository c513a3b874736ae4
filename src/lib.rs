//! Penguin Slice - a slice-the-penguins arcade game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (wave sequencing, enemies, round state)
//! - `host`: Seam to the engine that renders, plays sounds and emits particles
//! - `audio`: Sound cues and volume mixing
//! - `assets`: Named asset catalog with checked lookups
//! - `settings`: Player settings and data-driven game tuning

pub mod assets;
pub mod audio;
pub mod host;
pub mod settings;
pub mod sim;

pub use assets::{AssetCatalog, AssetError, AssetKind};
pub use audio::{AudioMixer, SoundCue};
pub use host::{Host, dispatch};
pub use settings::{Settings, SettingsError, Tuning};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Scene dimensions (origin bottom-left, y up)
    pub const SCENE_WIDTH: f32 = 1024.0;
    pub const SCENE_HEIGHT: f32 = 768.0;

    /// Lives at round start
    pub const START_LIVES: u8 = 3;

    /// Enemies launch from just below the bottom edge
    pub const SPAWN_Y: f32 = -128.0;
    pub const SPAWN_X_MIN: i32 = 64;
    pub const SPAWN_X_MAX: i32 = 960;
    /// Enemies below this height have fallen out of play
    pub const EXPIRY_Y: f32 = -140.0;
    /// Radius of the circular body requested from the host
    pub const ENEMY_RADIUS: f32 = 64.0;
    /// Launch velocities are rolled in coarse units and scaled by this
    pub const LAUNCH_VELOCITY_SCALE: f32 = 40.0;
    /// Spin is rolled in -6..=6 and halved
    pub const MAX_SPIN: f32 = 3.0;

    /// Points per slice
    pub const REGULAR_POINTS: u64 = 1;
    pub const BONUS_POINTS: u64 = 5;

    /// Newest touch points kept in the slice trail
    pub const TRAIL_MAX_POINTS: usize = 12;
}
