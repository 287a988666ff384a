//! Interest-point search.
//!
//! Visits a list of points of interest in order. The robot drives straight at
//! each point until inside `search_radius`, then circles at half speed for
//! `circle_degrees` of turning before moving on. Once every point has been
//! searched it falls back to a jittery random exploration.

use super::SearchStrategy;
use crate::error::ConfigError;
use crate::robot::{heading_towards, MotionCommand, Robot};
use nalgebra::Vector2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetAwareConfig {
    /// Points to search, world frame `[x, y]` meters
    pub interest_points: Vec<[f64; 2]>,

    /// Distance at which the robot starts circling a point (meters)
    pub search_radius: f64,

    /// Turn rate while circling (degrees per second)
    pub circle_rate: f64,

    /// Turning accumulated around each point before moving on (degrees)
    pub circle_degrees: f64,

    /// Per-tick heading jitter during exploration, `[-explore_turn, explore_turn)` degrees
    pub explore_turn: f64,
}

impl Default for TargetAwareConfig {
    fn default() -> Self {
        Self {
            interest_points: vec![[5.0, 5.0], [-3.0, 7.0], [2.0, -6.0]],
            search_radius: 2.0,
            circle_rate: 30.0,
            circle_degrees: 720.0,
            explore_turn: 30.0,
        }
    }
}

impl TargetAwareConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for point in &self.interest_points {
            for value in point {
                if !value.is_finite() {
                    return Err(ConfigError::NonFinite {
                        name: "target_aware.interest_points",
                        value: *value,
                    });
                }
            }
        }
        ConfigError::require_positive("target_aware.search_radius", self.search_radius)?;
        ConfigError::require_positive("target_aware.circle_rate", self.circle_rate)?;
        ConfigError::require_positive("target_aware.circle_degrees", self.circle_degrees)?;
        ConfigError::require_positive("target_aware.explore_turn", self.explore_turn)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct TargetProgress {
    target_index: usize,
    circled: f64,
}

/// Interest-point visits followed by random exploration.
#[derive(Debug, Clone)]
pub struct TargetAware {
    config: TargetAwareConfig,
    rng: ChaCha8Rng,
    progress: Option<TargetProgress>,
}

impl TargetAware {
    pub fn new(config: TargetAwareConfig, rng: ChaCha8Rng) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            rng,
            progress: None,
        })
    }

    pub fn with_seed(config: TargetAwareConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::new(config, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Interest points fully searched so far.
    pub fn targets_searched(&self) -> usize {
        self.progress.as_ref().map(|p| p.target_index).unwrap_or(0)
    }

    /// True once every interest point has been searched.
    pub fn is_exploring(&self) -> bool {
        self.targets_searched() >= self.config.interest_points.len()
    }
}

impl SearchStrategy for TargetAware {
    fn name(&self) -> &str {
        "target_aware"
    }

    fn step(&mut self, robot: &Robot, dt: f64) -> Vec<MotionCommand> {
        let config = &self.config;
        let progress = self.progress.get_or_insert(TargetProgress {
            target_index: 0,
            circled: 0.0,
        });
        let travel = robot.speed() * dt;

        let Some([tx, ty]) = config.interest_points.get(progress.target_index).copied() else {
            let turn = self.rng.gen_range(-config.explore_turn..config.explore_turn);
            return vec![MotionCommand::Turn(turn), MotionCommand::Forward(travel)];
        };

        let offset = Vector2::new(tx, ty) - robot.pose().position;
        if offset.norm() > config.search_radius {
            let mut commands = Vec::with_capacity(2);
            if let Some(heading) = heading_towards(offset.x, offset.y) {
                commands.push(MotionCommand::SetHeading(heading));
            }
            commands.push(MotionCommand::Forward(travel));
            return commands;
        }

        let turn = config.circle_rate * dt;
        progress.circled += turn;
        if progress.circled >= config.circle_degrees {
            progress.target_index += 1;
            progress.circled = 0.0;
            debug!("Target aware: searched point ({}, {})", tx, ty);
            if progress.target_index == config.interest_points.len() {
                info!("Target aware: all interest points searched, exploring");
            }
        }

        vec![MotionCommand::Turn(turn), MotionCommand::Forward(travel * 0.5)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraSpec;

    fn robot() -> Robot {
        Robot::new(0.0, 0.0, 1.0, CameraSpec::realsense_d435()).unwrap()
    }

    fn single_point() -> TargetAwareConfig {
        TargetAwareConfig {
            interest_points: vec![[3.0, 0.0]],
            search_radius: 1.0,
            circle_rate: 90.0,
            circle_degrees: 90.0,
            explore_turn: 30.0,
        }
    }

    fn run(strategy: &mut TargetAware, robot: &mut Robot, ticks: usize) {
        for _ in 0..ticks {
            for command in strategy.step(robot, 0.1) {
                robot.apply(command);
            }
        }
    }

    #[test]
    fn test_drives_toward_first_point() {
        let mut strategy = TargetAware::with_seed(single_point(), 1).unwrap();
        let mut robot = robot();

        let commands = strategy.step(&robot, 0.1);
        assert!(matches!(commands[0], MotionCommand::SetHeading(h) if (h - 90.0).abs() < 1e-9));

        run(&mut strategy, &mut robot, 10);
        assert!(robot.x() > 0.9);
        assert!(robot.y().abs() < 1e-9);
        assert_eq!(strategy.targets_searched(), 0);
    }

    #[test]
    fn test_circles_then_moves_on() {
        let mut strategy = TargetAware::with_seed(single_point(), 1).unwrap();
        let mut robot = robot();

        // ~20 ticks to get within 1m, then 10 ticks of 9 degrees
        run(&mut strategy, &mut robot, 40);
        assert_eq!(strategy.targets_searched(), 1);
        assert!(strategy.is_exploring());
    }

    #[test]
    fn test_visits_points_in_order() {
        let config = TargetAwareConfig {
            interest_points: vec![[0.0, 4.0], [0.0, -4.0]],
            ..single_point()
        };
        let mut strategy = TargetAware::with_seed(config, 9).unwrap();
        let mut robot = robot();

        let mut reached_first_at = None;
        for tick in 0..400 {
            for command in strategy.step(&robot, 0.1) {
                robot.apply(command);
            }
            if strategy.targets_searched() == 1 && reached_first_at.is_none() {
                reached_first_at = Some(tick);
                assert!(robot.y() > 2.0);
            }
        }
        assert!(reached_first_at.is_some());
        assert_eq!(strategy.targets_searched(), 2);
    }

    #[test]
    fn test_exploration_is_seeded() {
        let explore = |seed| {
            let mut strategy = TargetAware::with_seed(single_point(), seed).unwrap();
            let mut robot = robot();
            run(&mut strategy, &mut robot, 200);
            robot.pose().position
        };
        assert_eq!(explore(4), explore(4));
        assert_ne!(explore(4), explore(5));
    }

    #[test]
    fn test_never_completes() {
        let mut strategy = TargetAware::with_seed(single_point(), 2).unwrap();
        let mut robot = robot();
        run(&mut strategy, &mut robot, 300);
        assert!(!strategy.is_complete());
    }

    #[test]
    fn test_invalid_config() {
        let config = TargetAwareConfig {
            interest_points: vec![[f64::NAN, 0.0]],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NonFinite { .. })));
        assert!(TargetAwareConfig {
            explore_turn: 0.0,
            ..Default::default()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_constructor_rejects_non_positive_explore_turn() {
        for explore_turn in [0.0, -15.0] {
            let config = TargetAwareConfig {
                explore_turn,
                ..single_point()
            };
            assert!(matches!(
                TargetAware::with_seed(config, 4),
                Err(ConfigError::NonPositive { name: "target_aware.explore_turn", .. })
            ));
        }
    }
}
