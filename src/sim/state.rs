//! Game state and core simulation types
//!
//! One `GameState` is one round. Restarting builds a new one.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::schedule::{CancelToken, Command, Scheduler};
use super::wave::{BombPolicy, WaveSequencer};
use crate::audio::SoundCue;
use crate::consts::*;
use crate::settings::Tuning;

pub type EnemyId = u32;

/// Round lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Waves are being tossed and input is live
    Running,
    /// Round over; frozen until restart
    Ended,
}

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Regular,
    /// Worth extra points
    Bonus,
    /// Ends the round when sliced
    Bomb,
}

impl EnemyKind {
    /// Roll a kind under the given bomb policy
    pub fn roll(policy: BombPolicy, rng: &mut impl Rng) -> Self {
        let roll = rng.random_range(0..=6);
        match policy {
            BombPolicy::Always => EnemyKind::Bomb,
            BombPolicy::Never if roll == 3 => EnemyKind::Bonus,
            BombPolicy::Never => EnemyKind::Regular,
            BombPolicy::Random => match roll {
                0 => EnemyKind::Bomb,
                2 => EnemyKind::Bonus,
                _ => EnemyKind::Regular,
            },
        }
    }

    /// Image asset for the sprite
    pub fn sprite_name(&self) -> &'static str {
        match self {
            EnemyKind::Regular => "penguin",
            EnemyKind::Bonus => "penguinBonus",
            EnemyKind::Bomb => "sliceBomb",
        }
    }

    /// Points for slicing (bombs score nothing)
    pub fn points(&self) -> u64 {
        match self {
            EnemyKind::Regular => REGULAR_POINTS,
            EnemyKind::Bonus => BONUS_POINTS,
            EnemyKind::Bomb => 0,
        }
    }
}

/// Where an enemy is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyState {
    /// In flight, can be sliced or fall out
    Active,
    Sliced,
    /// Fell below the scene
    Expired,
    /// Removed without scoring or penalty (fallen bomb, round end)
    Discarded,
}

/// A tossed enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Angular velocity (radians/s)
    pub spin: f32,
    pub rotation: f32,
    pub state: EnemyState,
}

impl Enemy {
    /// Place an enemy below the bottom edge with a random upward toss
    pub fn launch(id: EnemyId, kind: EnemyKind, rng: &mut impl Rng) -> Self {
        let x = rng.random_range(SPAWN_X_MIN..=SPAWN_X_MAX) as f32;
        let spin = rng.random_range(-6..=6) as f32 / 2.0;

        // Lean toward the middle, harder from the edges
        let vx = if x < 256.0 {
            rng.random_range(8..=15)
        } else if x < 512.0 {
            rng.random_range(3..=5)
        } else if x < 768.0 {
            -rng.random_range(3..=5)
        } else {
            -rng.random_range(8..=15)
        };
        let vy = rng.random_range(24..=32);

        Self {
            id,
            kind,
            pos: Vec2::new(x, SPAWN_Y),
            vel: Vec2::new(vx as f32, vy as f32) * LAUNCH_VELOCITY_SCALE,
            spin,
            rotation: 0.0,
            state: EnemyState::Active,
        }
    }

    /// Ballistic step; `dt` is already scaled by world speed
    pub fn integrate(&mut self, dt: f32, gravity: f32) {
        self.vel.y += gravity * dt;
        self.pos += self.vel * dt;
        self.rotation += self.spin * dt;
    }

    pub fn has_fallen(&self) -> bool {
        self.pos.y < EXPIRY_Y
    }

    pub fn is_bomb(&self) -> bool {
        self.kind == EnemyKind::Bomb
    }
}

/// Particle effects the host can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    SliceHitEnemy,
    SliceHitBomb,
    /// Fuse sparks attached to a bomb
    BombFuse,
}

impl EffectKind {
    /// Emitter asset name
    pub fn asset_name(&self) -> &'static str {
        match self {
            EffectKind::SliceHitEnemy => "sliceHitEnemy",
            EffectKind::SliceHitBomb => "sliceHitBomb",
            EffectKind::BombFuse => "sliceFuse",
        }
    }
}

/// Requests for the host, drained after each tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    WaveStarted { index: usize, shape: super::WaveShape },
    EnemySpawned(Enemy),
    EnemyRemoved { id: EnemyId, state: EnemyState },
    Sound(SoundCue),
    StopSound(SoundCue),
    Effect { kind: EffectKind, pos: Vec2 },
    ScoreChanged { score: u64 },
    LifeLost { lives: u8 },
    /// Slice trail path changed (fewer than 2 points means nothing to draw)
    TrailUpdated(Vec<Vec2>),
    /// Touch lifted; fade the trail out
    TrailFaded,
    RoundEnded { score: u64, by_bomb: bool },
}

/// What a slice did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceOutcome {
    Scored { points: u64 },
    /// Bomb hit; the round is over
    Detonated,
}

/// Recent touch points for the blade trail
#[derive(Debug, Clone, Default)]
pub struct SliceTrail {
    points: VecDeque<Vec2>,
}

impl SliceTrail {
    /// Start a new trail at `pos`
    pub fn begin(&mut self, pos: Vec2) {
        self.points.clear();
        self.points.push_back(pos);
    }

    /// Extend the trail, keeping only the newest points
    pub fn extend(&mut self, pos: Vec2) {
        self.points.push_back(pos);
        while self.points.len() > TRAIL_MAX_POINTS {
            self.points.pop_front();
        }
    }

    pub fn points(&self) -> Vec<Vec2> {
        self.points.iter().copied().collect()
    }

    /// Drawable once there are two points
    pub fn has_path(&self) -> bool {
        self.points.len() >= 2
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Complete state of one round
#[derive(Debug, Clone)]
pub struct GameState {
    /// Round seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub score: u64,
    pub lives: u8,
    pub phase: RoundPhase,
    /// Wave sequence and pace
    pub waves: WaveSequencer,
    /// Active enemies, in spawn order
    pub enemies: Vec<Enemy>,
    pub trail: SliceTrail,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) scheduler: Scheduler,
    round_token: CancelToken,
    /// A wave toss is pending or the sequence ran out
    next_wave_queued: bool,
    fuse_playing: bool,
    swoosh_playing: bool,
    gravity: f32,
    events: Vec<GameEvent>,
    next_id: EnemyId,
}

impl GameState {
    /// Create a new round; the first wave is tossed after the start delay
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let waves = WaveSequencer::new(tuning, &mut rng);
        let mut scheduler = Scheduler::new();
        let round_token = scheduler.token();
        scheduler.schedule(tuning.start_delay, round_token, Command::TossWave);

        log::info!("Round started (seed {seed}, {} waves)", waves.len());

        Self {
            seed,
            rng,
            score: 0,
            lives: START_LIVES,
            phase: RoundPhase::Running,
            waves,
            enemies: Vec::new(),
            trail: SliceTrail::default(),
            time_ticks: 0,
            scheduler,
            round_token,
            next_wave_queued: true,
            fuse_playing: false,
            swoosh_playing: false,
            gravity: tuning.gravity,
            events: Vec::new(),
            next_id: 1,
        }
    }

    pub fn is_ended(&self) -> bool {
        self.phase == RoundPhase::Ended
    }

    /// Current wave cursor
    pub fn wave_index(&self) -> usize {
        self.waves.cursor()
    }

    /// Simulation speed for enemy motion; zero once the round is over
    pub fn world_speed(&self) -> f32 {
        match self.phase {
            RoundPhase::Running => self.waves.pace().fall_speed,
            RoundPhase::Ended => 0.0,
        }
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn has_active_bomb(&self) -> bool {
        self.enemies.iter().any(Enemy::is_bomb)
    }

    pub fn is_fuse_playing(&self) -> bool {
        self.fuse_playing
    }

    pub fn is_swoosh_playing(&self) -> bool {
        self.swoosh_playing
    }

    /// Timers still waiting to fire this round
    pub fn pending_commands(&self) -> usize {
        self.scheduler.pending_for(self.round_token)
    }

    /// Take the host requests produced so far
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> EnemyId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Run a command that fell due on the scheduler
    pub fn run_command(&mut self, command: Command) {
        if self.is_ended() {
            log::debug!("Dropping {command:?}, round is over");
            return;
        }
        match command {
            Command::TossWave => self.toss_wave(),
            Command::SpawnEnemy(policy) => {
                self.spawn_enemy(policy);
            }
        }
    }

    /// Advance the sequencer and start the next wave
    pub fn toss_wave(&mut self) {
        if self.is_ended() {
            return;
        }

        let Some(wave) = self.waves.next() else {
            log::warn!("Wave sequence exhausted after {} waves", self.waves.len());
            self.next_wave_queued = true;
            return;
        };

        log::info!("Wave {}: {:?}", wave.index + 1, wave.shape);
        self.emit(GameEvent::WaveStarted {
            index: wave.index,
            shape: wave.shape,
        });

        for action in &wave.actions {
            if action.is_immediate() {
                self.spawn_enemy(action.bomb);
            } else {
                self.scheduler
                    .schedule(action.delay, self.round_token, Command::SpawnEnemy(action.bomb));
            }
        }

        self.next_wave_queued = false;
    }

    /// Toss a single enemy, its kind rolled under `policy`
    pub fn spawn_enemy(&mut self, policy: BombPolicy) -> Option<EnemyId> {
        if self.is_ended() {
            return None;
        }
        let kind = EnemyKind::roll(policy, &mut self.rng);
        self.spawn(kind)
    }

    /// Toss a single enemy of a known kind
    pub fn spawn(&mut self, kind: EnemyKind) -> Option<EnemyId> {
        if self.is_ended() {
            return None;
        }

        let id = self.next_entity_id();
        let enemy = Enemy::launch(id, kind, &mut self.rng);
        log::debug!("Spawned {kind:?} #{id} at x={}", enemy.pos.x);

        if kind == EnemyKind::Bomb {
            // Only one fuse loop at a time; a new bomb restarts it
            if self.fuse_playing {
                self.emit(GameEvent::StopSound(SoundCue::BombFuse));
            }
            self.emit(GameEvent::Sound(SoundCue::BombFuse));
            self.fuse_playing = true;
            self.emit(GameEvent::Effect {
                kind: EffectKind::BombFuse,
                pos: enemy.pos,
            });
        } else {
            self.emit(GameEvent::Sound(SoundCue::Launch));
        }

        self.emit(GameEvent::EnemySpawned(enemy.clone()));
        self.enemies.push(enemy);
        Some(id)
    }

    /// Take an enemy out of the active set, marking how it left
    fn remove_enemy(&mut self, id: EnemyId, state: EnemyState) -> Option<Enemy> {
        let index = self.enemies.iter().position(|e| e.id == id)?;
        let mut enemy = self.enemies.remove(index);
        enemy.state = state;
        self.emit(GameEvent::EnemyRemoved { id, state });
        Some(enemy)
    }

    /// Resolve a slice on an enemy the host's hit test found under the blade.
    /// Unknown or already-resolved ids are ignored.
    pub fn slice(&mut self, id: EnemyId) -> Option<SliceOutcome> {
        if self.is_ended() {
            return None;
        }
        let enemy = self.remove_enemy(id, EnemyState::Sliced)?;

        match enemy.kind {
            EnemyKind::Bomb => {
                log::info!("Bomb #{id} sliced");
                self.emit(GameEvent::Effect {
                    kind: EffectKind::SliceHitBomb,
                    pos: enemy.pos,
                });
                self.emit(GameEvent::Sound(SoundCue::Explosion));
                self.end_round(true);
                Some(SliceOutcome::Detonated)
            }
            kind => {
                let points = kind.points();
                self.emit(GameEvent::Effect {
                    kind: EffectKind::SliceHitEnemy,
                    pos: enemy.pos,
                });
                self.score += points;
                self.emit(GameEvent::ScoreChanged { score: self.score });
                self.emit(GameEvent::Sound(SoundCue::Whack));
                Some(SliceOutcome::Scored { points })
            }
        }
    }

    /// Remove enemies that fell out of the scene, or queue the next wave once
    /// the field is clear
    pub fn sweep(&mut self) {
        if self.is_ended() {
            return;
        }

        if self.enemies.is_empty() {
            if !self.next_wave_queued {
                let delay = self.waves.pace().popup_time;
                self.scheduler.schedule(delay, self.round_token, Command::TossWave);
                self.next_wave_queued = true;
            }
            return;
        }

        let fallen: Vec<(EnemyId, EnemyKind)> = self
            .enemies
            .iter()
            .filter(|e| e.has_fallen())
            .map(|e| (e.id, e.kind))
            .collect();

        for (id, kind) in fallen {
            if kind == EnemyKind::Bomb {
                self.remove_enemy(id, EnemyState::Discarded);
            } else if self.remove_enemy(id, EnemyState::Expired).is_some() {
                log::debug!("{kind:?} #{id} missed");
                self.lose_life();
            }
        }
    }

    /// Take away a life, ending the round on the last one
    pub fn lose_life(&mut self) {
        if self.is_ended() || self.lives == 0 {
            return;
        }
        self.lives -= 1;
        self.emit(GameEvent::Sound(SoundCue::Wrong));
        self.emit(GameEvent::LifeLost { lives: self.lives });
        if self.lives == 0 {
            self.end_round(false);
        }
    }

    /// Stop the fuse loop once no bomb is in play
    pub fn update_fuse(&mut self) {
        if self.fuse_playing && !self.has_active_bomb() {
            self.emit(GameEvent::StopSound(SoundCue::BombFuse));
            self.fuse_playing = false;
        }
    }

    /// Start a swoosh unless one is still playing
    pub(crate) fn play_swoosh(&mut self) {
        if self.swoosh_playing {
            return;
        }
        let variant = self.rng.random_range(1..=SoundCue::SWOOSH_VARIANTS);
        self.swoosh_playing = true;
        self.emit(GameEvent::Sound(SoundCue::Swoosh(variant)));
    }

    /// Host finished playing a cue
    pub fn sound_finished(&mut self, cue: SoundCue) {
        if matches!(cue, SoundCue::Swoosh(_)) {
            self.swoosh_playing = false;
        }
    }

    pub(crate) fn emit_trail(&mut self) {
        let points = self.trail.points();
        self.emit(GameEvent::TrailUpdated(points));
    }

    pub(crate) fn emit_trail_fade(&mut self) {
        self.emit(GameEvent::TrailFaded);
    }

    /// End the round. Returns false if it had already ended.
    pub fn end_round(&mut self, by_bomb: bool) -> bool {
        if self.is_ended() {
            return false;
        }
        self.phase = RoundPhase::Ended;

        let cancelled = self.scheduler.cancel(self.round_token);
        log::info!(
            "Round over (score {}, wave {}, by bomb: {by_bomb}, {cancelled} pending spawns cancelled)",
            self.score,
            self.waves.cursor()
        );

        for mut enemy in std::mem::take(&mut self.enemies) {
            enemy.state = EnemyState::Discarded;
            self.emit(GameEvent::EnemyRemoved {
                id: enemy.id,
                state: enemy.state,
            });
        }

        if by_bomb {
            self.lives = 0;
        }

        self.emit(GameEvent::Sound(SoundCue::GameOver));
        if self.fuse_playing {
            self.emit(GameEvent::StopSound(SoundCue::BombFuse));
            self.fuse_playing = false;
        }
        self.emit(GameEvent::RoundEnded {
            score: self.score,
            by_bomb,
        });
        true
    }
}
