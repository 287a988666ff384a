//! Camera-driven ring search.
//!
//! Rotates in place for a full turn, then drives outward to the next ring.
//! Rings are spaced by the camera footprint width at maximum range, scaled by
//! `overlap` so consecutive sweeps share a margin.

use super::SearchStrategy;
use crate::error::ConfigError;
use crate::robot::{MotionCommand, Robot};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const ARRIVAL_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSweepConfig {
    /// Fraction of the footprint width used as ring spacing, in `(0, 1]`
    pub overlap: f64,

    /// In-place rotation rate (degrees per second)
    pub sweep_rate: f64,

    /// Radius assigned to the sweep at the start pose (meters)
    pub initial_radius: f64,

    /// Pattern completes once the next ring would exceed this (meters)
    pub max_radius: f64,
}

impl Default for CameraSweepConfig {
    fn default() -> Self {
        Self {
            overlap: 0.8,
            sweep_rate: 30.0,
            initial_radius: 1.0,
            max_radius: 10.0,
        }
    }
}

impl CameraSweepConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("camera_sweep.overlap", self.overlap)?;
        if self.overlap > 1.0 {
            return Err(ConfigError::OutOfRange {
                name: "camera_sweep.overlap",
                value: self.overlap,
                expected: "(0, 1]",
            });
        }
        ConfigError::require_positive("camera_sweep.sweep_rate", self.sweep_rate)?;
        ConfigError::require_non_negative("camera_sweep.initial_radius", self.initial_radius)?;
        ConfigError::require_positive("camera_sweep.max_radius", self.max_radius)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    /// Rotating in place; holds degrees swept so far
    Sweeping(f64),

    /// Driving outward to the current ring radius
    Advancing,
}

#[derive(Debug, Clone)]
struct SweepProgress {
    center: Vector2<f64>,
    spacing: f64,
    ring_radius: f64,
    phase: Phase,
    sweeps_completed: u32,
    complete: bool,
}

#[derive(Debug, Clone)]
pub struct CameraSweep {
    config: CameraSweepConfig,
    progress: Option<SweepProgress>,
}

impl CameraSweep {
    /// Validates `config` and creates the strategy.
    pub fn new(config: CameraSweepConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            progress: None,
        })
    }

    /// Full rotations finished so far.
    pub fn sweeps_completed(&self) -> u32 {
        self.progress.as_ref().map(|p| p.sweeps_completed).unwrap_or(0)
    }

    /// Ring spacing in meters, known after the first step.
    pub fn spacing(&self) -> Option<f64> {
        self.progress.as_ref().map(|p| p.spacing)
    }
}

impl SearchStrategy for CameraSweep {
    fn name(&self) -> &str {
        "camera_sweep"
    }

    fn step(&mut self, robot: &Robot, dt: f64) -> Vec<MotionCommand> {
        let config = &self.config;
        let progress = self.progress.get_or_insert_with(|| {
            let spacing = robot.camera().footprint_width() * config.overlap;
            debug!("Camera sweep: ring spacing {:.2}m", spacing);
            SweepProgress {
                center: robot.pose().position,
                spacing,
                ring_radius: config.initial_radius,
                phase: Phase::Sweeping(0.0),
                sweeps_completed: 0,
                complete: false,
            }
        });

        if progress.complete {
            return Vec::new();
        }

        match progress.phase {
            Phase::Sweeping(swept) => {
                let delta = (config.sweep_rate * dt).min(360.0 - swept);
                let swept = swept + delta;

                if swept >= 360.0 - ARRIVAL_EPSILON {
                    progress.sweeps_completed += 1;
                    progress.ring_radius += progress.spacing;
                    if progress.ring_radius > config.max_radius {
                        progress.complete = true;
                        info!(
                            "Camera sweep complete after {} sweeps",
                            progress.sweeps_completed
                        );
                    } else {
                        debug!("Camera sweep: advancing to ring {:.2}m", progress.ring_radius);
                        progress.phase = Phase::Advancing;
                    }
                } else {
                    progress.phase = Phase::Sweeping(swept);
                }

                vec![MotionCommand::Turn(delta)]
            }
            Phase::Advancing => {
                let from_center = (robot.pose().position - progress.center).norm();
                let distance = (robot.speed() * dt).min((progress.ring_radius - from_center).max(0.0));

                if from_center + distance >= progress.ring_radius - ARRIVAL_EPSILON {
                    progress.phase = Phase::Sweeping(0.0);
                }

                vec![MotionCommand::Forward(distance)]
            }
        }
    }

    fn is_complete(&self) -> bool {
        self.progress.as_ref().map(|p| p.complete).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraSpec;
    use approx::assert_relative_eq;

    fn robot() -> Robot {
        Robot::new(0.0, 0.0, 1.0, CameraSpec::realsense_d435()).unwrap()
    }

    #[test]
    fn test_spacing_from_footprint() {
        let mut sweep = CameraSweep::new(CameraSweepConfig::default()).unwrap();
        assert!(sweep.spacing().is_none());

        let robot = robot();
        sweep.step(&robot, 0.1);
        let expected = 2.0 * 3.0 * 43.5f64.to_radians().tan() * 0.8;
        assert_relative_eq!(sweep.spacing().unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_first_sweep_rotates_in_place() {
        let mut sweep = CameraSweep::new(CameraSweepConfig::default()).unwrap();
        let mut robot = robot();

        // 30 deg/s at dt 0.1 -> 120 ticks per full turn
        for _ in 0..120 {
            for command in sweep.step(&robot, 0.1) {
                robot.apply(command);
            }
        }
        assert_eq!(sweep.sweeps_completed(), 1);
        assert_eq!(robot.path().len(), 1);
        assert!(robot.heading() < 1e-6 || robot.heading() > 360.0 - 1e-6);
    }

    #[test]
    fn test_default_pattern_completes() {
        let mut sweep = CameraSweep::new(CameraSweepConfig::default()).unwrap();
        let mut robot = robot();
        for _ in 0..1000 {
            for command in sweep.step(&robot, 0.1) {
                robot.apply(command);
            }
        }

        // Rings at 1 + 4.56 m, then the next (10.1 m) is past the limit
        assert!(sweep.is_complete());
        assert_eq!(sweep.sweeps_completed(), 2);
        let ring = 1.0 + sweep.spacing().unwrap();
        assert_relative_eq!(robot.pose().distance_from_origin(), ring, epsilon = 1e-6);
        assert!(sweep.step(&robot, 0.1).is_empty());
    }

    #[test]
    fn test_invalid_config() {
        assert!(CameraSweepConfig {
            overlap: 1.5,
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(CameraSweepConfig {
            sweep_rate: 0.0,
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(CameraSweepConfig::default().validate().is_ok());
    }

    #[test]
    fn test_constructor_rejects_invalid_config() {
        assert!(CameraSweep::new(CameraSweepConfig {
            overlap: 1.5,
            ..Default::default()
        })
        .is_err());
    }
}
