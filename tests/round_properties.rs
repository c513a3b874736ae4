//! Property tests for round bookkeeping over random play

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use proptest::prelude::*;

use penguin_slice::consts::{EXPIRY_Y, SIM_DT};
use penguin_slice::sim::{
    EnemyId, EnemyKind, EnemyState, GameEvent, GameState, TickInput, TouchEvent, tick,
};
use penguin_slice::Tuning;

#[derive(Debug, Clone)]
enum Action {
    /// Let the round run for some frames
    Run(u16),
    /// Swipe through the n-th active enemy (modulo count)
    Slice(usize),
    /// Swipe through an id that may not exist
    SliceId(u32),
    /// Drop every active enemy below the scene
    DropAll,
    EndRound(bool),
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => (1u16..240).prop_map(Action::Run),
        4 => (0usize..8).prop_map(Action::Slice),
        1 => (0u32..64).prop_map(Action::SliceId),
        2 => Just(Action::DropAll),
        1 => any::<bool>().prop_map(Action::EndRound),
    ]
}

/// Book-keeping a reader of the event stream can do
#[derive(Default)]
struct Ledger {
    kinds: HashMap<EnemyId, EnemyKind>,
    removed: HashSet<EnemyId>,
}

fn swipe(ids: Vec<EnemyId>) -> TickInput {
    TickInput {
        touches: vec![TouchEvent::moved(Vec2::ZERO, ids)],
        ..Default::default()
    }
}

fn apply(state: &mut GameState, action: &Action) {
    match *action {
        Action::Run(frames) => {
            let input = TickInput::default();
            for _ in 0..frames {
                tick(state, &input, SIM_DT);
            }
        }
        Action::Slice(n) => {
            if !state.enemies.is_empty() {
                let id = state.enemies[n % state.enemies.len()].id;
                tick(state, &swipe(vec![id]), SIM_DT);
            }
        }
        Action::SliceId(id) => tick(state, &swipe(vec![id]), SIM_DT),
        Action::DropAll => {
            for enemy in &mut state.enemies {
                enemy.pos.y = EXPIRY_Y - 100.0;
            }
            tick(state, &TickInput::default(), SIM_DT);
        }
        Action::EndRound(by_bomb) => {
            state.end_round(by_bomb);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn round_bookkeeping_holds(seed in any::<u64>(), actions in prop::collection::vec(action(), 1..40)) {
        let mut state = GameState::new(seed, &Tuning::default());
        let mut ledger = Ledger::default();
        let len = state.waves.len();

        for action in &actions {
            let (lives, score, cursor, was_ended) =
                (state.lives, state.score, state.wave_index(), state.is_ended());

            apply(&mut state, action);
            let events = state.drain_events();

            let mut expected_points = 0;
            let mut life_losses = 0u8;
            let mut bomb_end = false;
            let mut waves_started = 0;
            for event in &events {
                match event {
                    GameEvent::EnemySpawned(enemy) => {
                        prop_assert!(!was_ended, "spawn after round end");
                        ledger.kinds.insert(enemy.id, enemy.kind);
                    }
                    GameEvent::EnemyRemoved { id, state: how } => {
                        prop_assert!(ledger.removed.insert(*id), "enemy #{} removed twice", id);
                        if *how == EnemyState::Sliced {
                            expected_points += ledger.kinds[id].points();
                        }
                    }
                    GameEvent::LifeLost { .. } => life_losses += 1,
                    GameEvent::RoundEnded { by_bomb, .. } => {
                        prop_assert!(!was_ended, "round ended twice");
                        bomb_end |= *by_bomb;
                    }
                    GameEvent::WaveStarted { .. } => waves_started += 1,
                    _ => {}
                }
            }

            // Lives only drop through misses or a bomb
            prop_assert!(state.lives <= 3);
            prop_assert!(state.lives <= lives);
            if bomb_end {
                prop_assert_eq!(state.lives, 0);
            } else {
                prop_assert_eq!(state.lives, lives - life_losses);
            }

            // Score moves only by slice points
            prop_assert_eq!(state.score, score + expected_points);

            // Cursor moves one per wave and stays in range
            prop_assert_eq!(state.wave_index(), cursor + waves_started);
            prop_assert!(state.wave_index() <= len);

            // Ended is sticky and inert
            if was_ended {
                prop_assert!(state.is_ended());
                prop_assert!(events.is_empty());
            }
            if state.is_ended() {
                prop_assert!(state.enemies.is_empty());
                prop_assert_eq!(state.pending_commands(), 0);
            }
        }
    }

    #[test]
    fn same_seed_same_round(seed in any::<u64>(), frames in 1u32..3000) {
        let tuning = Tuning::default();
        let mut a = GameState::new(seed, &tuning);
        let mut b = GameState::new(seed, &tuning);
        let input = TickInput::default();
        for _ in 0..frames {
            tick(&mut a, &input, SIM_DT);
            tick(&mut b, &input, SIM_DT);
        }
        prop_assert_eq!(a.drain_events(), b.drain_events());
        prop_assert_eq!(a.lives, b.lives);
        prop_assert_eq!(a.wave_index(), b.wave_index());
    }
}

#[test]
fn three_slices_then_a_miss() {
    let mut state = GameState::new(2024, &Tuning::default());
    let ids: Vec<EnemyId> = (0..4)
        .map(|_| state.spawn(EnemyKind::Regular).unwrap())
        .collect();

    tick(&mut state, &swipe(ids[..3].to_vec()), SIM_DT);
    state.enemies[0].pos.y = EXPIRY_Y - 100.0;
    tick(&mut state, &TickInput::default(), SIM_DT);

    assert_eq!(state.score, 3);
    assert_eq!(state.lives, 2);
    assert!(!state.is_ended());
}

#[test]
fn ending_twice_matches_ending_once() {
    let tuning = Tuning::default();
    let mut once = GameState::new(11, &tuning);
    let mut twice = GameState::new(11, &tuning);
    for state in [&mut once, &mut twice] {
        state.spawn(EnemyKind::Bonus).unwrap();
        state.spawn(EnemyKind::Bomb).unwrap();
    }

    once.end_round(false);
    twice.end_round(false);
    twice.end_round(false);

    assert_eq!(once.drain_events(), twice.drain_events());
    assert_eq!(once.lives, twice.lives);
    assert_eq!(once.score, twice.score);
    assert_eq!(once.phase, twice.phase);
    assert_eq!(once.wave_index(), twice.wave_index());
    assert_eq!(once.pending_commands(), twice.pending_commands());
}
