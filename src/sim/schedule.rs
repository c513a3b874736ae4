//! One-shot deferred commands
//!
//! Timers run on the simulation clock and are owned by a cancellation token.
//! Cancelling a token drops every timer scheduled under it.

use serde::{Deserialize, Serialize};

use super::wave::BombPolicy;

/// Deferred work the game state knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Start the next wave
    TossWave,
    /// Spawn a single enemy
    SpawnEnemy(BombPolicy),
}

/// Handle grouping timers for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CancelToken(u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Timer {
    due: f64,
    /// Insertion order, breaks ties between equal due times
    seq: u64,
    token: CancelToken,
    command: Command,
}

/// Single-threaded timer queue
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    now: f64,
    timers: Vec<Timer>,
    next_seq: u64,
    next_token: u32,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh cancellation token
    pub fn token(&mut self) -> CancelToken {
        let token = CancelToken(self.next_token);
        self.next_token += 1;
        token
    }

    /// Run `command` once, `delay` seconds from now
    pub fn schedule(&mut self, delay: f32, token: CancelToken, command: Command) {
        let timer = Timer {
            due: self.now + f64::from(delay.max(0.0)),
            seq: self.next_seq,
            token,
            command,
        };
        self.next_seq += 1;
        self.timers.push(timer);
    }

    /// Drop every pending timer owned by `token`; returns how many were dropped
    pub fn cancel(&mut self, token: CancelToken) -> usize {
        let before = self.timers.len();
        self.timers.retain(|t| t.token != token);
        before - self.timers.len()
    }

    /// Advance the clock and return the commands that fell due, oldest first
    pub fn advance(&mut self, dt: f32) -> Vec<Command> {
        self.now += f64::from(dt.max(0.0));
        let now = self.now;

        let mut due: Vec<Timer> = Vec::new();
        self.timers.retain(|t| {
            if t.due <= now {
                due.push(t.clone());
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|t| t.command).collect()
    }

    /// Seconds elapsed on this scheduler's clock
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Pending timers owned by `token`
    pub fn pending_for(&self, token: CancelToken) -> usize {
        self.timers.iter().filter(|t| t.token == token).count()
    }
}
