//! Archimedean spiral search.
//!
//! The spiral is centered on the robot's position at the first step. A
//! cumulative traversal angle `theta` (degrees) defines the target point at
//! radius `theta / 360 * radius_step`; the robot steers toward it with a bounded
//! turn rate and drives forward at its own speed. The target advances by
//! `angle_step` whenever the robot comes within the capture distance.

use super::SearchStrategy;
use crate::error::ConfigError;
use crate::robot::{heading_difference, heading_towards, MotionCommand, Robot};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Spiral parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiralConfig {
    /// Radius growth per full revolution (meters)
    pub radius_step: f64,

    /// Angular spacing between consecutive spiral targets (degrees)
    pub angle_step: f64,

    /// Spiral ends once the target radius exceeds this (meters)
    pub max_radius: f64,

    /// Maximum turn rate (degrees per second)
    pub max_turn_rate: f64,

    /// Lower bound on the capture distance (meters)
    pub min_capture_distance: f64,
}

impl Default for SpiralConfig {
    fn default() -> Self {
        Self {
            radius_step: 5.0,
            angle_step: 5.0,
            max_radius: 10.0,
            max_turn_rate: 180.0,
            min_capture_distance: 0.15,
        }
    }
}

impl SpiralConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("spiral.radius_step", self.radius_step)?;
        ConfigError::require_positive("spiral.angle_step", self.angle_step)?;
        ConfigError::require_positive("spiral.max_radius", self.max_radius)?;
        ConfigError::require_positive("spiral.max_turn_rate", self.max_turn_rate)?;
        ConfigError::require_non_negative("spiral.min_capture_distance", self.min_capture_distance)?;
        Ok(())
    }

    /// Spiral radius at traversal angle `theta` (degrees).
    pub fn radius_at(&self, theta: f64) -> f64 {
        theta / 360.0 * self.radius_step
    }

    /// Distance at which the current target counts as reached.
    ///
    /// Never smaller than 2.2 minimum turning radii, so the target can't sit
    /// inside a turning circle where the robot would orbit it indefinitely.
    fn capture_distance(&self, radius: f64, speed: f64) -> f64 {
        let turning_radius = speed / self.max_turn_rate.to_radians();
        self.min_capture_distance
            .max(0.05 * radius)
            .max(2.2 * turning_radius)
    }
}

#[derive(Debug, Clone)]
struct SpiralProgress {
    center: Vector2<f64>,
    theta: f64,
    complete: bool,
}

/// Outward archimedean spiral.
#[derive(Debug, Clone)]
pub struct Spiral {
    config: SpiralConfig,
    progress: Option<SpiralProgress>,
}

impl Spiral {
    /// Validates `config` and creates the strategy.
    pub fn new(config: SpiralConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            progress: None,
        })
    }

    /// Current traversal angle in degrees (0 before the first step).
    pub fn traversal_angle(&self) -> f64 {
        self.progress.as_ref().map(|p| p.theta).unwrap_or(0.0)
    }
}

impl SearchStrategy for Spiral {
    fn name(&self) -> &str {
        "spiral"
    }

    fn step(&mut self, robot: &Robot, dt: f64) -> Vec<MotionCommand> {
        let config = &self.config;
        let progress = self.progress.get_or_insert_with(|| {
            debug!(
                "Spiral: radius_step={}m angle_step={}deg max_radius={}m",
                config.radius_step, config.angle_step, config.max_radius
            );
            SpiralProgress {
                center: robot.pose().position,
                theta: 0.0,
                complete: false,
            }
        });

        if progress.complete {
            return Vec::new();
        }

        let offset = loop {
            let radius = config.radius_at(progress.theta);
            if radius > config.max_radius {
                progress.complete = true;
                info!("Spiral complete at radius {:.2}m", radius);
                return Vec::new();
            }

            let (sin, cos) = progress.theta.to_radians().sin_cos();
            let target = progress.center + Vector2::new(radius * sin, radius * cos);
            let offset = target - robot.pose().position;

            if offset.norm() >= config.capture_distance(radius, robot.speed()) {
                break offset;
            }
            progress.theta += config.angle_step;
        };

        let mut commands = Vec::with_capacity(2);
        if let Some(target_heading) = heading_towards(offset.x, offset.y) {
            let diff = heading_difference(robot.heading(), target_heading);
            let max_turn = config.max_turn_rate * dt;
            if diff.abs() > max_turn {
                commands.push(MotionCommand::Turn(diff.signum() * max_turn));
            } else {
                commands.push(MotionCommand::SetHeading(target_heading));
            }
        }
        commands.push(MotionCommand::Forward(robot.speed() * dt));
        commands
    }

    fn is_complete(&self) -> bool {
        self.progress.as_ref().map(|p| p.complete).unwrap_or(false)
    }
}
