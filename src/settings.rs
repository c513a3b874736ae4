//! Game settings and tuning
//!
//! Both are plain JSON documents. A missing file means defaults; a file that
//! exists but doesn't parse is an error the caller decides how to handle.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Upper bound on the random wave tail a settings file may ask for
pub const MAX_RANDOM_WAVES: usize = 100_000;

/// Data-driven game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Delay before the first wave (seconds)
    pub start_delay: f32,
    /// Delay between the field emptying and the next wave (seconds)
    pub popup_time: f32,
    /// Popup time multiplier applied after every wave
    pub popup_decay: f32,
    /// Window over which a chained wave's spawns are spread (seconds)
    pub chain_delay: f32,
    /// Chain delay multiplier applied after every wave
    pub chain_decay: f32,
    /// Initial simulation speed (scales enemy motion)
    pub world_speed: f32,
    /// World speed multiplier applied after every wave
    pub world_speed_growth: f32,
    /// Vertical acceleration (pixels/s², negative is down)
    pub gravity: f32,
    /// Number of randomly sampled waves after the opening sequence
    pub random_waves: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            start_delay: 2.0,
            popup_time: 0.9,
            popup_decay: 0.991,
            chain_delay: 3.0,
            chain_decay: 0.99,
            world_speed: 0.85,
            world_speed_growth: 1.02,
            gravity: -900.0,
            random_waves: 1000,
        }
    }
}

impl Tuning {
    /// Check the values keep the difficulty curve sane
    pub fn validate(&self) -> Result<(), SettingsError> {
        let decays = [
            ("popup_decay", self.popup_decay),
            ("chain_decay", self.chain_decay),
        ];
        for (field, value) in decays {
            if !(value > 0.0 && value < 1.0) {
                return Err(SettingsError::Invalid {
                    field,
                    reason: format!("must be in (0, 1), got {value}"),
                });
            }
        }
        if self.world_speed_growth <= 1.0 {
            return Err(SettingsError::Invalid {
                field: "world_speed_growth",
                reason: format!("must be > 1, got {}", self.world_speed_growth),
            });
        }
        if self.gravity >= 0.0 {
            return Err(SettingsError::Invalid {
                field: "gravity",
                reason: format!("must pull down (< 0), got {}", self.gravity),
            });
        }
        if self.random_waves > MAX_RANDOM_WAVES {
            return Err(SettingsError::Invalid {
                field: "random_waves",
                reason: format!("must be at most {MAX_RANDOM_WAVES}, got {}", self.random_waves),
            });
        }
        let delays = [
            ("start_delay", self.start_delay),
            ("popup_time", self.popup_time),
            ("chain_delay", self.chain_delay),
            ("world_speed", self.world_speed),
        ];
        for (field, value) in delays {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SettingsError::Invalid {
                    field,
                    reason: format!("must be a non-negative number, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute all audio
    pub muted: bool,

    // === Gameplay ===
    /// Fixed seed for reproducible rounds (None = seed from the clock)
    pub seed: Option<u64>,
    /// Balance values
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            seed: None,
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON; absent fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json).map_err(SettingsError::Parse)?;
        settings.tuning.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file, falling back to defaults if it doesn't exist
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let settings = Self::from_json(&json)?;
                log::info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("No settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(SettingsError::Io(e)),
        }
    }
}

/// Failure to read or accept a settings document
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid { field: &'static str, reason: String },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "Failed to read settings: {e}"),
            SettingsError::Parse(e) => write!(f, "Malformed settings JSON: {e}"),
            SettingsError::Invalid { field, reason } => {
                write!(f, "Invalid tuning value `{field}`: {reason}")
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Parse(e) => Some(e),
            SettingsError::Invalid { .. } => None,
        }
    }
}
