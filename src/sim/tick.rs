//! Per-frame simulation tick
//!
//! Core game loop: apply touch input, fire due timers, move enemies, sweep
//! the ones that fell out.

use glam::Vec2;

use super::state::{EnemyId, GameState};
use crate::audio::SoundCue;

/// Touch gesture phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Began,
    Moved,
    Ended,
    Cancelled,
}

/// A touch sample in scene coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub pos: Vec2,
    /// Enemies under the touch, as found by the host's hit test
    pub hits: Vec<EnemyId>,
}

impl TouchEvent {
    pub fn began(pos: Vec2) -> Self {
        Self {
            phase: TouchPhase::Began,
            pos,
            hits: Vec::new(),
        }
    }

    pub fn moved(pos: Vec2, hits: Vec<EnemyId>) -> Self {
        Self {
            phase: TouchPhase::Moved,
            pos,
            hits,
        }
    }

    pub fn ended(pos: Vec2) -> Self {
        Self {
            phase: TouchPhase::Ended,
            pos,
            hits: Vec::new(),
        }
    }
}

/// Input collected since the last tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Touch samples, oldest first
    pub touches: Vec<TouchEvent>,
    /// Cues the host finished playing
    pub finished_sounds: Vec<SoundCue>,
}

/// Apply one touch sample
pub fn handle_touch(state: &mut GameState, touch: &TouchEvent) {
    // Input is disabled once the round is over
    if state.is_ended() {
        return;
    }

    match touch.phase {
        TouchPhase::Began => {
            state.trail.begin(touch.pos);
            state.emit_trail();
        }
        TouchPhase::Moved => {
            state.trail.extend(touch.pos);
            state.emit_trail();
            state.play_swoosh();

            for &id in &touch.hits {
                if state.slice(id).is_some() && state.is_ended() {
                    break;
                }
            }
        }
        TouchPhase::Ended | TouchPhase::Cancelled => state.emit_trail_fade(),
    }
}

/// Advance the round by `dt` seconds of wall time
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    for &cue in &input.finished_sounds {
        state.sound_finished(cue);
    }

    if state.is_ended() {
        return;
    }

    for touch in &input.touches {
        handle_touch(state, touch);
    }

    for command in state.scheduler.advance(dt) {
        state.run_command(command);
    }

    if state.is_ended() {
        return;
    }

    state.time_ticks += 1;

    // World speed scales motion only; timers run on wall time
    let step = dt * state.world_speed();
    let gravity = state.gravity();
    for enemy in &mut state.enemies {
        enemy.integrate(step, gravity);
    }

    state.sweep();
    state.update_fuse();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::settings::Tuning;
    use crate::sim::state::{EnemyKind, GameEvent};
    use crate::sim::{WaveSequencer, WaveShape};

    fn run_for(state: &mut GameState, seconds: f32) {
        let input = TickInput::default();
        let steps = (seconds / SIM_DT).ceil() as u32;
        for _ in 0..steps {
            tick(state, &input, SIM_DT);
        }
    }

    #[test]
    fn test_first_wave_after_start_delay() {
        let mut state = GameState::new(12345, &Tuning::default());
        run_for(&mut state, 1.9);
        assert_eq!(state.wave_index(), 0);
        assert!(state.enemies.is_empty());

        run_for(&mut state, 0.2);
        assert_eq!(state.wave_index(), 1);
        // Opening wave is a single non-bomb
        assert_eq!(state.enemies.len(), 1);
        assert_ne!(state.enemies[0].kind, EnemyKind::Bomb);
    }

    #[test]
    fn test_untouched_enemy_costs_a_life_then_next_wave() {
        let mut state = GameState::new(777, &Tuning::default());
        run_for(&mut state, 2.1);
        assert_eq!(state.enemies.len(), 1);

        // Long enough to rise, fall out and for the next wave to pop
        run_for(&mut state, 5.0);
        assert_eq!(state.lives, 2);
        assert!(state.wave_index() >= 2);
    }

    #[test]
    fn test_slice_through_touch() {
        let mut state = GameState::new(5, &Tuning::default());
        let a = state.spawn(EnemyKind::Regular).unwrap();
        let b = state.spawn(EnemyKind::Bonus).unwrap();
        state.drain_events();

        let input = TickInput {
            touches: vec![
                TouchEvent::began(Vec2::new(100.0, 100.0)),
                TouchEvent::moved(Vec2::new(120.0, 110.0), vec![a, b, a]),
                TouchEvent::ended(Vec2::new(130.0, 115.0)),
            ],
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);

        assert_eq!(state.score, 6);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::TrailFaded));
        let swooshes = events
            .iter()
            .filter(|e| matches!(e, GameEvent::Sound(SoundCue::Swoosh(_))))
            .count();
        assert_eq!(swooshes, 1);
        assert!(state.is_swoosh_playing());
    }

    #[test]
    fn test_swoosh_waits_for_previous() {
        let mut state = GameState::new(5, &Tuning::default());
        let drag = TickInput {
            touches: vec![TouchEvent::moved(Vec2::ZERO, Vec::new())],
            ..Default::default()
        };
        tick(&mut state, &drag, SIM_DT);
        tick(&mut state, &drag, SIM_DT);
        let swoosh = state
            .drain_events()
            .into_iter()
            .find_map(|e| match e {
                GameEvent::Sound(cue @ SoundCue::Swoosh(_)) => Some(cue),
                _ => None,
            })
            .unwrap();

        let done = TickInput {
            finished_sounds: vec![swoosh],
            ..drag.clone()
        };
        tick(&mut state, &done, SIM_DT);
        let again = state
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::Sound(SoundCue::Swoosh(_))))
            .count();
        assert_eq!(again, 1);
    }

    #[test]
    fn test_cancelled_touch_fades_trail() {
        let mut state = GameState::new(5, &Tuning::default());
        let cancelled = TouchEvent {
            phase: TouchPhase::Cancelled,
            ..TouchEvent::began(Vec2::ZERO)
        };
        handle_touch(&mut state, &cancelled);
        assert_eq!(state.drain_events(), vec![GameEvent::TrailFaded]);
    }

    #[test]
    fn test_trail_capped() {
        let mut state = GameState::new(5, &Tuning::default());
        let mut touches = vec![TouchEvent::began(Vec2::ZERO)];
        touches.extend((1..30).map(|i| TouchEvent::moved(Vec2::splat(i as f32), Vec::new())));
        let input = TickInput {
            touches,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.trail.len(), TRAIL_MAX_POINTS);
    }

    #[test]
    fn test_bomb_slice_freezes_round() {
        let mut state = GameState::new(5, &Tuning::default());
        let regular = state.spawn(EnemyKind::Regular).unwrap();
        let bomb = state.spawn(EnemyKind::Bomb).unwrap();

        let input = TickInput {
            touches: vec![TouchEvent::moved(Vec2::ZERO, vec![bomb, regular])],
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert!(state.is_ended());
        // Regular after the bomb in the same swipe doesn't score
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, 0);

        let ticks = state.time_ticks;
        let cursor = state.wave_index();
        run_for(&mut state, 10.0);
        assert_eq!(state.time_ticks, ticks);
        assert_eq!(state.wave_index(), cursor);
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn test_chain_spawns_cancelled_by_round_end() {
        let tuning = Tuning::default();
        let mut state = GameState::new(5, &tuning);
        state.waves = WaveSequencer::from_shapes(vec![WaveShape::Chain; 3], &tuning);
        run_for(&mut state, 2.05);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.pending_commands(), 4);

        state.end_round(false);
        state.drain_events();
        run_for(&mut state, 5.0);
        assert!(state.enemies.is_empty());
        assert!(state
            .drain_events()
            .iter()
            .all(|e| !matches!(e, GameEvent::EnemySpawned(_))));
    }

    #[test]
    fn test_chain_spawns_spread_out() {
        let tuning = Tuning::default();
        let mut state = GameState::new(5, &tuning);
        state.waves = WaveSequencer::from_shapes(vec![WaveShape::Chain], &tuning);
        run_for(&mut state, 2.05);
        let mut spawned = state
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemySpawned(_)))
            .count();
        assert_eq!(spawned, 1);

        // chain delay after one decay is 2.97s, so steps of 0.594s
        run_for(&mut state, 0.65);
        spawned += state
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemySpawned(_)))
            .count();
        assert_eq!(spawned, 2);
    }

    #[test]
    fn test_determinism() {
        let tuning = Tuning::default();
        let mut state1 = GameState::new(99999, &tuning);
        let mut state2 = GameState::new(99999, &tuning);

        run_for(&mut state1, 30.0);
        run_for(&mut state2, 30.0);

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.lives, state2.lives);
        assert_eq!(state1.wave_index(), state2.wave_index());
        assert_eq!(state1.enemies, state2.enemies);
    }
}
