//! Star search: rays out from a fixed center and back.
//!
//! Each ray drives out to `max_radius`, returns to the center, then rotates
//! the ray angle by `angle_step`. The star is centered on the pose at the
//! first step, and the first ray follows the heading at that moment.

use super::SearchStrategy;
use crate::error::ConfigError;
use crate::robot::{heading_towards, normalize_heading, MotionCommand, Robot};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const ARRIVAL_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StarConfig {
    /// Length of each ray (meters)
    pub max_radius: f64,

    /// Rotation between consecutive rays (degrees)
    pub angle_step: f64,
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            max_radius: 4.0,
            angle_step: 45.0,
        }
    }
}

impl StarConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("star.max_radius", self.max_radius)?;
        ConfigError::require_positive("star.angle_step", self.angle_step)?;
        if self.angle_step > 360.0 {
            return Err(ConfigError::OutOfRange {
                name: "star.angle_step",
                value: self.angle_step,
                expected: "(0, 360]",
            });
        }
        Ok(())
    }

    /// Rays needed for one full revolution.
    pub fn ray_count(&self) -> u32 {
        (360.0 / self.angle_step).ceil() as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leg {
    Outbound,
    Inbound,
}

#[derive(Debug, Clone)]
struct StarProgress {
    center: Vector2<f64>,
    ray_heading: f64,
    leg: Leg,
    rays_completed: u32,
    complete: bool,
}

#[derive(Debug, Clone)]
pub struct Star {
    config: StarConfig,
    progress: Option<StarProgress>,
}

impl Star {
    /// Validates `config` and creates the strategy.
    pub fn new(config: StarConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            progress: None,
        })
    }

    /// Rays driven out and back so far.
    pub fn rays_completed(&self) -> u32 {
        self.progress.as_ref().map(|p| p.rays_completed).unwrap_or(0)
    }
}

impl SearchStrategy for Star {
    fn name(&self) -> &str {
        "star"
    }

    fn step(&mut self, robot: &Robot, dt: f64) -> Vec<MotionCommand> {
        let config = &self.config;
        let progress = self.progress.get_or_insert_with(|| StarProgress {
            center: robot.pose().position,
            ray_heading: robot.heading(),
            leg: Leg::Outbound,
            rays_completed: 0,
            complete: false,
        });

        if progress.complete {
            return Vec::new();
        }

        let travel = robot.speed() * dt;
        let offset = progress.center - robot.pose().position;
        let from_center = offset.norm();
        let mut commands = Vec::with_capacity(2);

        match progress.leg {
            Leg::Outbound => {
                let distance = travel.min((config.max_radius - from_center).max(0.0));
                commands.push(MotionCommand::SetHeading(progress.ray_heading));
                commands.push(MotionCommand::Forward(distance));

                if from_center + distance >= config.max_radius - ARRIVAL_EPSILON {
                    progress.leg = Leg::Inbound;
                }
            }
            Leg::Inbound => {
                // Too close to resolve a heading: keep the current one
                if let Some(heading) = heading_towards(offset.x, offset.y) {
                    commands.push(MotionCommand::SetHeading(heading));
                }
                let distance = travel.min(from_center);
                commands.push(MotionCommand::Forward(distance));

                if from_center - distance <= ARRIVAL_EPSILON {
                    progress.rays_completed += 1;
                    progress.ray_heading =
                        normalize_heading(progress.ray_heading + config.angle_step);
                    progress.leg = Leg::Outbound;
                    debug!("Star: ray {} done", progress.rays_completed);

                    if progress.rays_completed >= config.ray_count() {
                        progress.complete = true;
                        info!("Star complete after {} rays", progress.rays_completed);
                    }
                }
            }
        }

        commands
    }

    fn is_complete(&self) -> bool {
        self.progress.as_ref().map(|p| p.complete).unwrap_or(false)
    }
}
