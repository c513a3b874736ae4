//! Seam to the host engine
//!
//! The simulation never draws, plays or emits anything itself. It queues
//! `GameEvent`s and `dispatch` turns them into calls on a `Host`.

use glam::Vec2;

use crate::audio::SoundCue;
use crate::sim::{EffectKind, Enemy, EnemyId, EnemyState, GameEvent, WaveShape};

/// Engine capabilities the game core drives
pub trait Host {
    /// Create the sprite and a circular, non-colliding body with the enemy's
    /// velocity and spin
    fn spawn_enemy(&mut self, enemy: &Enemy);

    /// Drop the enemy's sprite; `state` says how it left play
    fn remove_enemy(&mut self, id: EnemyId, state: EnemyState);

    fn play_sound(&mut self, cue: SoundCue);

    fn stop_sound(&mut self, cue: SoundCue);

    fn trigger_effect(&mut self, effect: EffectKind, pos: Vec2);

    /// Redraw the blade trail through `points`
    fn draw_trail(&mut self, points: &[Vec2]);

    fn fade_trail(&mut self);

    fn update_score(&mut self, score: u64);

    fn update_lives(&mut self, lives: u8);

    /// Show the final score with a single restart choice
    fn present_game_over(&mut self, score: u64, by_bomb: bool);

    fn wave_started(&mut self, _index: usize, _shape: WaveShape) {}
}

/// Forward queued events to the host, in order
pub fn dispatch(events: impl IntoIterator<Item = GameEvent>, host: &mut impl Host) {
    for event in events {
        match event {
            GameEvent::WaveStarted { index, shape } => host.wave_started(index, shape),
            GameEvent::EnemySpawned(enemy) => host.spawn_enemy(&enemy),
            GameEvent::EnemyRemoved { id, state } => host.remove_enemy(id, state),
            GameEvent::Sound(cue) => host.play_sound(cue),
            GameEvent::StopSound(cue) => host.stop_sound(cue),
            GameEvent::Effect { kind, pos } => host.trigger_effect(kind, pos),
            GameEvent::ScoreChanged { score } => host.update_score(score),
            GameEvent::LifeLost { lives } => host.update_lives(lives),
            GameEvent::TrailUpdated(points) => {
                // A single point has no path; clear instead
                let points = if points.len() < 2 { &[][..] } else { &points[..] };
                host.draw_trail(points);
            }
            GameEvent::TrailFaded => host.fade_trail(),
            GameEvent::RoundEnded { score, by_bomb } => host.present_game_over(score, by_bomb),
        }
    }
}
