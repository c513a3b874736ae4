//! Penguin Slice headless runner
//!
//! Plays rounds with a simple autopilot against a logging host and prints a
//! JSON summary per round. Run with `--help` for options.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use penguin_slice::consts::*;
use penguin_slice::sim::{
    EffectKind, Enemy, EnemyId, EnemyKind, EnemyState, Session, TickInput, TouchEvent, WaveShape,
};
use penguin_slice::{AssetCatalog, AssetKind, AudioMixer, Host, Settings, SoundCue, dispatch};

/// Give up on a round that runs this long (simulated seconds)
const MAX_ROUND_SECS: f32 = 600.0;

#[derive(Parser)]
#[command(name = "penguin-slice")]
#[command(about = "Play Penguin Slice rounds headlessly and print a JSON summary per round")]
struct Args {
    /// Round seed (defaults to the settings seed, then the clock)
    seed: Option<u64>,

    /// Rounds to play back to back
    #[arg(long, default_value_t = 1)]
    rounds: u32,

    /// Settings JSON file
    #[arg(long)]
    settings: Option<PathBuf>,
}

/// Host that logs what an engine would do
struct LogHost {
    catalog: AssetCatalog,
    mixer: AudioMixer,
    stats: RoundStats,
}

#[derive(Debug, Default, Clone, Serialize)]
struct RoundStats {
    spawned: u32,
    sliced: u32,
    missed: u32,
    discarded: u32,
    waves: u32,
    game_over: Option<(u64, bool)>,
}

impl LogHost {
    fn resolve(&self, name: &str, kind: AssetKind) {
        if let Err(e) = self.catalog.lookup(name, kind) {
            log::warn!("{e}");
        }
    }
}

impl Host for LogHost {
    fn spawn_enemy(&mut self, enemy: &Enemy) {
        self.resolve(enemy.kind.sprite_name(), AssetKind::Image);
        self.stats.spawned += 1;
        log::debug!(
            "spawn {:?} #{} at ({:.0}, {:.0}) vel ({:.0}, {:.0}) r={ENEMY_RADIUS}",
            enemy.kind,
            enemy.id,
            enemy.pos.x,
            enemy.pos.y,
            enemy.vel.x,
            enemy.vel.y
        );
    }

    fn remove_enemy(&mut self, id: EnemyId, state: EnemyState) {
        match state {
            EnemyState::Sliced => self.stats.sliced += 1,
            EnemyState::Expired => self.stats.missed += 1,
            EnemyState::Discarded => self.stats.discarded += 1,
            EnemyState::Active => {}
        }
        log::debug!("remove #{id} ({state:?})");
    }

    fn play_sound(&mut self, cue: SoundCue) {
        self.resolve(&cue.asset_name(), AssetKind::Sound);
        if let Some(gain) = self.mixer.gain_for(cue) {
            log::trace!("play {} at {gain:.2}", cue.asset_name());
        }
    }

    fn stop_sound(&mut self, cue: SoundCue) {
        log::trace!("stop {}", cue.asset_name());
    }

    fn trigger_effect(&mut self, effect: EffectKind, pos: Vec2) {
        self.resolve(effect.asset_name(), AssetKind::Emitter);
        log::trace!("effect {} at ({:.0}, {:.0})", effect.asset_name(), pos.x, pos.y);
    }

    fn draw_trail(&mut self, points: &[Vec2]) {
        log::trace!("trail through {} points", points.len());
    }

    fn fade_trail(&mut self) {}

    fn update_score(&mut self, score: u64) {
        log::debug!("score {score}");
    }

    fn update_lives(&mut self, lives: u8) {
        log::info!("life lost, {lives} left");
    }

    fn present_game_over(&mut self, score: u64, by_bomb: bool) {
        self.resolve("gameOver", AssetKind::Image);
        log::info!("GAME OVER - score {score}{}", if by_bomb { " (bomb)" } else { "" });
        self.stats.game_over = Some((score, by_bomb));
    }

    fn wave_started(&mut self, index: usize, shape: WaveShape) {
        self.stats.waves += 1;
        log::debug!("wave {} {shape:?}", index + 1);
    }
}

/// Swipes at enemies near the top of their arc, sometimes clumsily
struct Autopilot {
    rng: Pcg32,
    /// Chance per frame to slice a reachable penguin
    skill: f64,
    /// Chance per frame to clip a reachable bomb
    clumsiness: f64,
}

impl Autopilot {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed ^ 0x5eed),
            skill: 0.04,
            clumsiness: 0.002,
        }
    }

    fn input(&mut self, enemies: &[Enemy]) -> TickInput {
        let reachable = enemies.iter().filter(|e| e.pos.y > SCENE_HEIGHT * 0.3);
        let mut hits = Vec::new();
        let mut blade = None;
        for enemy in reachable {
            let chance = match enemy.kind {
                EnemyKind::Bomb => self.clumsiness,
                EnemyKind::Regular | EnemyKind::Bonus => self.skill,
            };
            if self.rng.random_bool(chance) {
                hits.push(enemy.id);
                blade = Some(enemy.pos);
            }
        }

        let Some(pos) = blade else {
            return TickInput::default();
        };
        TickInput {
            touches: vec![
                TouchEvent::began(pos - Vec2::new(40.0, 0.0)),
                TouchEvent::moved(pos, hits),
                TouchEvent::ended(pos + Vec2::new(40.0, 0.0)),
            ],
            // Cues are short; treat the swoosh as done by the next swipe
            finished_sounds: vec![SoundCue::Swoosh(1), SoundCue::Swoosh(2), SoundCue::Swoosh(3)],
        }
    }
}

#[derive(Debug, Serialize)]
struct RoundSummary {
    round: u32,
    seed: u64,
    score: u64,
    lives: u8,
    waves_tossed: usize,
    sim_seconds: f32,
    stats: RoundStats,
}

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Penguin Slice (headless) starting...");

    let args = Args::parse();
    let settings = match &args.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };

    let seed = args.seed.or(settings.seed).unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    });

    let catalog = AssetCatalog::builtin("assets");
    if let Err(errors) = catalog.verify() {
        log::warn!(
            "{} of {} assets missing under {} (headless run continues)",
            errors.len(),
            catalog.len(),
            catalog.root().display()
        );
    }

    let mut session = Session::new(seed, settings.tuning.clone());
    let mut round_seed = seed;
    for round in 1..=args.rounds {
        if round > 1 {
            round_seed = round_seed.wrapping_add(1);
            session.restart(round_seed);
        }

        let mut host = LogHost {
            catalog: catalog.clone(),
            mixer: AudioMixer::from_settings(&settings),
            stats: RoundStats::default(),
        };
        let mut pilot = Autopilot::new(round_seed);

        let mut elapsed = 0.0;
        while !session.state.is_ended() && elapsed < MAX_ROUND_SECS {
            let input = pilot.input(&session.state.enemies);
            session.update(&input, SIM_DT);
            dispatch(session.state.drain_events(), &mut host);
            elapsed += SIM_DT;
        }
        if !session.state.is_ended() {
            log::warn!("Round {round} still running after {MAX_ROUND_SECS}s, stopping it");
            session.state.end_round(false);
            dispatch(session.state.drain_events(), &mut host);
        }

        let summary = RoundSummary {
            round,
            seed: round_seed,
            score: session.state.score,
            lives: session.state.lives,
            waves_tossed: session.state.wave_index(),
            sim_seconds: elapsed,
            stats: host.stats,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
