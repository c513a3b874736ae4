//! Round lifecycle across restarts

use super::state::GameState;
use super::tick::{TickInput, tick};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::settings::Tuning;

/// Owns the current round and replaces it on restart
#[derive(Debug, Clone)]
pub struct Session {
    pub state: GameState,
    tuning: Tuning,
    accumulator: f32,
    /// Input waiting for the next substep
    pending: TickInput,
    rounds_played: u32,
}

impl Session {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            state: GameState::new(seed, &tuning),
            tuning,
            accumulator: 0.0,
            pending: TickInput::default(),
            rounds_played: 1,
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Rounds started in this session, including the current one
    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    /// Run fixed-step ticks for `dt` seconds of frame time. Returns the substeps run.
    ///
    /// Input is buffered until a substep runs, then applied on that substep only,
    /// so short frames don't lose touches or sound completions.
    pub fn update(&mut self, input: &TickInput, dt: f32) -> u32 {
        self.pending.touches.extend(input.touches.iter().cloned());
        self.pending
            .finished_sounds
            .extend(input.finished_sounds.iter().copied());

        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let step_input = if substeps == 0 {
                std::mem::take(&mut self.pending)
            } else {
                TickInput::default()
            };
            tick(&mut self.state, &step_input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }

    /// Start a fresh round. Only allowed once the current round has ended.
    pub fn restart(&mut self, seed: u64) -> bool {
        if !self.state.is_ended() {
            log::warn!("Restart ignored, round still running");
            return false;
        }
        self.state = GameState::new(seed, &self.tuning);
        self.accumulator = 0.0;
        self.pending = TickInput::default();
        self.rounds_played += 1;
        log::info!("Round {} started with seed {seed}", self.rounds_played);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SoundCue;
    use crate::sim::state::EnemyKind;
    use crate::sim::tick::TouchEvent;
    use glam::Vec2;

    #[test]
    fn test_restart_requires_ended_round() {
        let mut session = Session::new(1, Tuning::default());
        assert!(!session.restart(2));
        assert_eq!(session.state.seed, 1);
        assert_eq!(session.rounds_played(), 1);
    }

    #[test]
    fn test_restart_replaces_state() {
        let mut session = Session::new(1, Tuning::default());
        let id = session.state.spawn(EnemyKind::Regular).unwrap();
        session.state.slice(id);
        session.state.lose_life();
        session.state.end_round(false);

        assert!(session.restart(2));
        let state = &session.state;
        assert_eq!(state.seed, 2);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, 3);
        assert!(!state.is_ended());
        assert_eq!(state.wave_index(), 0);
        assert_eq!(state.pending_commands(), 1);
        assert_eq!(session.rounds_played(), 2);
    }

    #[test]
    fn test_update_fixed_steps() {
        let mut session = Session::new(1, Tuning::default());
        let input = TickInput::default();
        assert_eq!(session.update(&input, SIM_DT * 0.5), 0);
        assert_eq!(session.update(&input, SIM_DT * 0.6), 1);
        // Long frames are clamped to 0.1s
        assert_eq!(session.update(&input, 1.0), 6);
        assert_eq!(session.state.time_ticks, 7);
    }

    #[test]
    fn test_short_frame_keeps_swipe() {
        let mut session = Session::new(1, Tuning::default());
        let id = session.state.spawn(EnemyKind::Regular).unwrap();
        let swipe = TickInput {
            touches: vec![TouchEvent::moved(Vec2::ZERO, vec![id])],
            ..Default::default()
        };

        // Half a step: nothing runs yet, but the swipe must survive
        assert_eq!(session.update(&swipe, SIM_DT * 0.5), 0);
        assert_eq!(session.update(&TickInput::default(), SIM_DT * 0.6), 1);
        assert_eq!(session.state.score, 1);
        assert!(session.state.enemy(id).is_none());
    }

    #[test]
    fn test_short_frame_keeps_finished_sounds() {
        let mut session = Session::new(1, Tuning::default());
        let drag = TickInput {
            touches: vec![TouchEvent::moved(Vec2::ZERO, Vec::new())],
            ..Default::default()
        };
        session.update(&drag, SIM_DT * 1.1);
        assert!(session.state.is_swoosh_playing());

        let done = TickInput {
            finished_sounds: vec![SoundCue::Swoosh(1), SoundCue::Swoosh(2), SoundCue::Swoosh(3)],
            ..Default::default()
        };
        assert_eq!(session.update(&done, SIM_DT * 0.3), 0);
        assert!(session.state.is_swoosh_playing());
        assert_eq!(session.update(&TickInput::default(), SIM_DT * 0.7), 1);
        assert!(!session.state.is_swoosh_playing());
    }
}
