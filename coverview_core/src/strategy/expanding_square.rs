//! Expanding square search: drive a side, turn 90 degrees clockwise, and grow
//! the side length after every second side.

use super::SearchStrategy;
use crate::error::ConfigError;
use crate::robot::{MotionCommand, Robot};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpandingSquareConfig {
    /// Length of the first two sides (meters)
    pub initial_side: f64,

    /// Growth applied after every second side (meters)
    pub side_increment: f64,

    /// Pattern completes once the next side would exceed this; unbounded when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_side: Option<f64>,
}

impl Default for ExpandingSquareConfig {
    fn default() -> Self {
        Self {
            initial_side: 1.0,
            side_increment: 0.5,
            max_side: None,
        }
    }
}

impl ExpandingSquareConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("expanding_square.initial_side", self.initial_side)?;
        ConfigError::require_positive("expanding_square.side_increment", self.side_increment)?;
        if let Some(max_side) = self.max_side {
            ConfigError::require_positive("expanding_square.max_side", max_side)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct SquareProgress {
    side_length: f64,
    driven: f64,
    sides_completed: u32,
    complete: bool,
}

/// Square spiral.
#[derive(Debug, Clone)]
pub struct ExpandingSquare {
    config: ExpandingSquareConfig,
    progress: Option<SquareProgress>,
}

impl ExpandingSquare {
    /// Validates `config` and creates the strategy.
    pub fn new(config: ExpandingSquareConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            progress: None,
        })
    }

    pub fn sides_completed(&self) -> u32 {
        self.progress.as_ref().map(|p| p.sides_completed).unwrap_or(0)
    }

    /// Length of the side currently being driven.
    pub fn side_length(&self) -> f64 {
        self.progress
            .as_ref()
            .map(|p| p.side_length)
            .unwrap_or(self.config.initial_side)
    }
}

impl SearchStrategy for ExpandingSquare {
    fn name(&self) -> &str {
        "expanding_square"
    }

    fn step(&mut self, robot: &Robot, dt: f64) -> Vec<MotionCommand> {
        let config = &self.config;
        let progress = self.progress.get_or_insert(SquareProgress {
            side_length: config.initial_side,
            driven: 0.0,
            sides_completed: 0,
            complete: false,
        });

        if progress.complete {
            return Vec::new();
        }

        let distance = (robot.speed() * dt).min(progress.side_length - progress.driven);
        let mut commands = vec![MotionCommand::Forward(distance)];
        progress.driven += distance;

        if progress.driven >= progress.side_length - 1e-9 {
            commands.push(MotionCommand::Turn(90.0));
            progress.sides_completed += 1;
            progress.driven = 0.0;

            if progress.sides_completed % 2 == 0 {
                progress.side_length += config.side_increment;
                if config.max_side.is_some_and(|max| progress.side_length > max) {
                    progress.complete = true;
                    info!(
                        "Expanding square complete after {} sides",
                        progress.sides_completed
                    );
                }
            }
        }

        commands
    }

    fn is_complete(&self) -> bool {
        self.progress.as_ref().map(|p| p.complete).unwrap_or(false)
    }
}
