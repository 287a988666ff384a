//! Lawnmower (boustrophedon) search.
//!
//! Drive a row of fixed length, turn 90 degrees, drive the row spacing, turn
//! 90 degrees the same way. The two turns reverse the heading and shift the
//! next row sideways. The turn direction alternates every row so successive
//! rows keep stepping toward the same side.

use super::SearchStrategy;
use crate::error::ConfigError;
use crate::robot::{MotionCommand, Robot};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Residual distance treated as "arrived".
const ARRIVAL_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LawnmowerConfig {
    /// Length of each row (meters)
    pub row_length: f64,

    /// Sideways offset between rows (meters)
    pub row_spacing: f64,

    /// Stop after this many rows; unbounded when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<u32>,
}

impl Default for LawnmowerConfig {
    fn default() -> Self {
        Self {
            row_length: 8.0,
            row_spacing: 1.0,
            max_rows: None,
        }
    }
}

impl LawnmowerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("lawnmower.row_length", self.row_length)?;
        ConfigError::require_positive("lawnmower.row_spacing", self.row_spacing)?;
        if self.max_rows == Some(0) {
            return Err(ConfigError::OutOfRange {
                name: "lawnmower.max_rows",
                value: 0.0,
                expected: ">= 1",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Leg {
    /// Driving along a row; holds distance covered in this row
    Row(f64),

    /// Driving the sideways shift; holds distance remaining
    Shift(f64),
}

#[derive(Debug, Clone)]
struct LawnmowerProgress {
    leg: Leg,
    rows_completed: u32,

    /// +1 turns clockwise at the end of the row, -1 counter-clockwise
    turn_sign: f64,

    complete: bool,
}

/// Back-and-forth row coverage.
#[derive(Debug, Clone)]
pub struct Lawnmower {
    config: LawnmowerConfig,
    progress: Option<LawnmowerProgress>,
}

impl Lawnmower {
    /// Validates `config` and creates the strategy.
    pub fn new(config: LawnmowerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            progress: None,
        })
    }

    /// Rows fully driven so far.
    pub fn rows_completed(&self) -> u32 {
        self.progress.as_ref().map(|p| p.rows_completed).unwrap_or(0)
    }
}

impl SearchStrategy for Lawnmower {
    fn name(&self) -> &str {
        "lawnmower"
    }

    fn step(&mut self, robot: &Robot, dt: f64) -> Vec<MotionCommand> {
        let config = &self.config;
        let progress = self.progress.get_or_insert(LawnmowerProgress {
            leg: Leg::Row(0.0),
            rows_completed: 0,
            turn_sign: 1.0,
            complete: false,
        });

        if progress.complete {
            return Vec::new();
        }

        let travel = robot.speed() * dt;
        let mut commands = Vec::with_capacity(2);

        match progress.leg {
            Leg::Row(driven) => {
                let distance = travel.min(config.row_length - driven);
                commands.push(MotionCommand::Forward(distance));

                let driven = driven + distance;
                if driven >= config.row_length - ARRIVAL_EPSILON {
                    progress.rows_completed += 1;
                    debug!("Lawnmower: row {} done", progress.rows_completed);

                    if config.max_rows.is_some_and(|max| progress.rows_completed >= max) {
                        progress.complete = true;
                        info!("Lawnmower complete after {} rows", progress.rows_completed);
                    } else {
                        commands.push(MotionCommand::Turn(90.0 * progress.turn_sign));
                        progress.leg = Leg::Shift(config.row_spacing);
                    }
                } else {
                    progress.leg = Leg::Row(driven);
                }
            }
            Leg::Shift(remaining) => {
                let distance = travel.min(remaining);
                commands.push(MotionCommand::Forward(distance));

                let remaining = remaining - distance;
                if remaining <= ARRIVAL_EPSILON {
                    commands.push(MotionCommand::Turn(90.0 * progress.turn_sign));
                    progress.turn_sign = -progress.turn_sign;
                    progress.leg = Leg::Row(0.0);
                } else {
                    progress.leg = Leg::Shift(remaining);
                }
            }
        }

        commands
    }

    fn is_complete(&self) -> bool {
        self.progress.as_ref().map(|p| p.complete).unwrap_or(false)
    }
}
