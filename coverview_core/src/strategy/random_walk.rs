//! Random walk search.
//!
//! Commits to a randomly perturbed heading for a randomly drawn number of
//! ticks, then re-draws. Motion is always straight ahead at robot speed.

use super::SearchStrategy;
use crate::error::ConfigError;
use crate::robot::{MotionCommand, Robot};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomWalkConfig {
    /// Shortest commitment to a heading (ticks, inclusive)
    pub min_ticks: u32,

    /// Longest commitment to a heading (ticks, exclusive)
    pub max_ticks: u32,

    /// Heading changes are drawn uniformly from `[-max_turn, max_turn)` degrees
    pub max_turn: f64,
}

impl Default for RandomWalkConfig {
    fn default() -> Self {
        Self {
            min_ticks: 10,
            max_ticks: 30,
            max_turn: 180.0,
        }
    }
}

impl RandomWalkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_ticks == 0 {
            return Err(ConfigError::ZeroSamples("random_walk.min_ticks"));
        }
        if self.max_ticks <= self.min_ticks {
            return Err(ConfigError::OutOfRange {
                name: "random_walk.max_ticks",
                value: self.max_ticks as f64,
                expected: "> min_ticks",
            });
        }
        ConfigError::require_positive("random_walk.max_turn", self.max_turn)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct WalkProgress {
    ticks_remaining: u32,
}

/// Constant-speed walk with random heading changes.
#[derive(Debug, Clone)]
pub struct RandomWalk {
    config: RandomWalkConfig,
    rng: ChaCha8Rng,
    progress: Option<WalkProgress>,
}

impl RandomWalk {
    /// Creates a walk driven by the given RNG.
    pub fn new(config: RandomWalkConfig, rng: ChaCha8Rng) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            rng,
            progress: None,
        })
    }

    /// Creates a walk with a ChaCha8 RNG seeded from `seed`.
    pub fn with_seed(config: RandomWalkConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::new(config, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Ticks left before the next heading change.
    pub fn ticks_remaining(&self) -> u32 {
        self.progress.as_ref().map(|p| p.ticks_remaining).unwrap_or(0)
    }
}

impl SearchStrategy for RandomWalk {
    fn name(&self) -> &str {
        "random_walk"
    }

    fn step(&mut self, robot: &Robot, dt: f64) -> Vec<MotionCommand> {
        let progress = self
            .progress
            .get_or_insert(WalkProgress { ticks_remaining: 0 });

        let mut commands = Vec::with_capacity(2);
        if progress.ticks_remaining == 0 {
            let turn = self
                .rng
                .gen_range(-self.config.max_turn..self.config.max_turn);
            commands.push(MotionCommand::Turn(turn));
            progress.ticks_remaining = self
                .rng
                .gen_range(self.config.min_ticks..self.config.max_ticks);
        }

        commands.push(MotionCommand::Forward(robot.speed() * dt));
        progress.ticks_remaining -= 1;
        commands
    }
}
