//! Sound cues and volume mixing
//!
//! Playback itself belongs to the host; the game core only names the cue and
//! the mixer decides how loud it should be.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Sound effect cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Penguin tossed into the scene
    Launch,
    /// Penguin sliced
    Whack,
    /// Bomb sliced
    Explosion,
    /// Life lost
    Wrong,
    /// Round over
    GameOver,
    /// Blade swoosh while dragging (variant 1..=3)
    Swoosh(u8),
    /// Looping fuse while a bomb is in play
    BombFuse,
}

impl SoundCue {
    /// Number of swoosh variants
    pub const SWOOSH_VARIANTS: u8 = 3;

    /// Asset name of the sound file
    pub fn asset_name(&self) -> String {
        match self {
            SoundCue::Launch => "launch.caf".to_string(),
            SoundCue::Whack => "whack.caf".to_string(),
            SoundCue::Explosion => "explosion.caf".to_string(),
            SoundCue::Wrong => "wrong.caf".to_string(),
            SoundCue::GameOver => "gameOver.caf".to_string(),
            SoundCue::Swoosh(n) => format!("swoosh{n}.caf"),
            SoundCue::BombFuse => "sliceBombFuse.caf".to_string(),
        }
    }

    /// Whether the host should loop this cue until told to stop
    pub fn is_looping(&self) -> bool {
        matches!(self, SoundCue::BombFuse)
    }

    /// Relative loudness of the cue before mixing
    fn base_gain(&self) -> f32 {
        match self {
            SoundCue::Explosion | SoundCue::GameOver => 1.0,
            SoundCue::Whack | SoundCue::Wrong => 0.8,
            SoundCue::Launch => 0.6,
            SoundCue::Swoosh(_) => 0.5,
            SoundCue::BombFuse => 0.4,
        }
    }
}

/// Volume state for the game's sound effects
#[derive(Debug, Clone)]
pub struct AudioMixer {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioMixer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioMixer {
    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Build a mixer from player settings
    pub fn from_settings(settings: &Settings) -> Self {
        let mut mixer = Self::new();
        mixer.set_master_volume(settings.master_volume);
        mixer.set_sfx_volume(settings.sfx_volume);
        mixer.set_muted(settings.muted);
        mixer
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Gain to play a cue at, or None if it would be silent
    pub fn gain_for(&self, cue: SoundCue) -> Option<f32> {
        let gain = self.effective_volume() * cue.base_gain();
        (gain > 0.0).then_some(gain)
    }
}
