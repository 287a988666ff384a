//! Search strategies.
//!
//! A strategy is a stepping policy: each tick it looks at the robot and
//! returns the motion commands to apply. Progress state is private to each
//! instance and created on the first step, so two instances of the same
//! strategy never interfere.

pub mod camera_sweep;
pub mod expanding_square;
pub mod lawnmower;
pub mod random_walk;
pub mod spiral;
pub mod star;
pub mod target_aware;

pub use camera_sweep::{CameraSweep, CameraSweepConfig};
pub use expanding_square::{ExpandingSquare, ExpandingSquareConfig};
pub use lawnmower::{Lawnmower, LawnmowerConfig};
pub use random_walk::{RandomWalk, RandomWalkConfig};
pub use spiral::{Spiral, SpiralConfig};
pub use star::{Star, StarConfig};
pub use target_aware::{TargetAware, TargetAwareConfig};

use crate::error::ConfigError;
use crate::robot::{MotionCommand, Robot};
use serde::{Deserialize, Serialize};

/// A search pattern driving the robot one tick at a time.
pub trait SearchStrategy: Send {
    /// Short identifier used in logs and exports.
    fn name(&self) -> &str;

    /// Computes this tick's motion. `dt` is the tick length in seconds.
    fn step(&mut self, robot: &Robot, dt: f64) -> Vec<MotionCommand>;

    /// True once the pattern has finished. Complete strategies emit no motion.
    fn is_complete(&self) -> bool {
        false
    }
}

/// Strategy identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    /// Archimedean spiral out from the start pose
    #[default]
    Spiral,

    /// Back-and-forth rows
    Lawnmower,

    /// Square spiral
    ExpandingSquare,

    /// Random heading changes at random intervals
    RandomWalk,

    /// Rays out from the start pose and back
    Star,

    /// Full in-place sweeps on rings spaced by the camera footprint
    CameraSweep,

    /// Circle known interest points, then explore
    TargetAware,
}

impl StrategyId {
    /// Returns every strategy, in menu order.
    pub fn all() -> Vec<StrategyId> {
        vec![
            StrategyId::Spiral,
            StrategyId::Lawnmower,
            StrategyId::ExpandingSquare,
            StrategyId::RandomWalk,
            StrategyId::Star,
            StrategyId::CameraSweep,
            StrategyId::TargetAware,
        ]
    }

    /// Returns the strategy name.
    pub fn name(&self) -> &'static str {
        match self {
            StrategyId::Spiral => "spiral",
            StrategyId::Lawnmower => "lawnmower",
            StrategyId::ExpandingSquare => "expanding_square",
            StrategyId::RandomWalk => "random_walk",
            StrategyId::Star => "star",
            StrategyId::CameraSweep => "camera_sweep",
            StrategyId::TargetAware => "target_aware",
        }
    }

    /// Human-readable name for menus.
    pub fn display_name(&self) -> &'static str {
        match self {
            StrategyId::Spiral => "Spiral Search",
            StrategyId::Lawnmower => "Lawnmower Search",
            StrategyId::ExpandingSquare => "Expanding Square",
            StrategyId::RandomWalk => "Random Walk",
            StrategyId::Star => "Star Pattern",
            StrategyId::CameraSweep => "Camera Sweep",
            StrategyId::TargetAware => "Target-Aware Search",
        }
    }

    /// Returns a description of the strategy.
    pub fn description(&self) -> &'static str {
        match self {
            StrategyId::Spiral => "Expanding archimedean spiral with a bounded turn rate",
            StrategyId::Lawnmower => "Boustrophedon rows with a fixed spacing",
            StrategyId::ExpandingSquare => "Square spiral, sides grow every second turn",
            StrategyId::RandomWalk => "Random headings held for 10-30 ticks",
            StrategyId::Star => "Rays out to a fixed radius and back, 45 degrees apart",
            StrategyId::CameraSweep => "360 degree camera sweeps on rings spaced by the FOV footprint",
            StrategyId::TargetAware => "Circle likely target locations, then explore randomly",
        }
    }

    /// Key the interactive menu uses for this strategy ("1" for the first).
    pub fn menu_key(&self) -> String {
        let index = Self::all()
            .iter()
            .position(|id| id == self)
            .unwrap_or(0);
        (index + 1).to_string()
    }

    /// Resolves a menu choice (a number key or a name).
    pub fn from_menu_choice(choice: &str) -> Option<StrategyId> {
        let choice = choice.trim();
        if let Ok(key) = choice.parse::<usize>() {
            return key.checked_sub(1).and_then(|i| Self::all().get(i).copied());
        }
        choice.parse().ok()
    }

    /// Builds a fresh strategy instance. `seed` feeds strategies that use randomness.
    pub fn build(
        &self,
        params: &StrategyParams,
        seed: u64,
    ) -> Result<Box<dyn SearchStrategy>, ConfigError> {
        let strategy: Box<dyn SearchStrategy> = match self {
            StrategyId::Spiral => Box::new(Spiral::new(params.spiral.clone())?),
            StrategyId::Lawnmower => Box::new(Lawnmower::new(params.lawnmower.clone())?),
            StrategyId::ExpandingSquare => {
                Box::new(ExpandingSquare::new(params.expanding_square.clone())?)
            }
            StrategyId::RandomWalk => {
                Box::new(RandomWalk::with_seed(params.random_walk.clone(), seed)?)
            }
            StrategyId::Star => Box::new(Star::new(params.star.clone())?),
            StrategyId::CameraSweep => Box::new(CameraSweep::new(params.camera_sweep.clone())?),
            StrategyId::TargetAware => {
                Box::new(TargetAware::with_seed(params.target_aware.clone(), seed)?)
            }
        };
        Ok(strategy)
    }
}

impl std::fmt::Display for StrategyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for StrategyId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "spiral" => Ok(StrategyId::Spiral),
            "lawnmower" | "boustrophedon" => Ok(StrategyId::Lawnmower),
            "expanding_square" | "expandingsquare" | "square" => Ok(StrategyId::ExpandingSquare),
            "random_walk" | "randomwalk" | "random" => Ok(StrategyId::RandomWalk),
            "star" | "star_pattern" => Ok(StrategyId::Star),
            "camera_sweep" | "camerasweep" | "camera_optimized" => Ok(StrategyId::CameraSweep),
            "target_aware" | "targetaware" | "target" => Ok(StrategyId::TargetAware),
            _ => Err(format!("Unknown strategy: {}", s)),
        }
    }
}

/// Per-strategy parameters, one table per strategy in the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    pub spiral: SpiralConfig,
    pub lawnmower: LawnmowerConfig,
    pub expanding_square: ExpandingSquareConfig,
    pub random_walk: RandomWalkConfig,
    pub star: StarConfig,
    pub camera_sweep: CameraSweepConfig,
    pub target_aware: TargetAwareConfig,
}

impl StrategyParams {
    /// Validates every table, not only the one in use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.spiral.validate()?;
        self.lawnmower.validate()?;
        self.expanding_square.validate()?;
        self.random_walk.validate()?;
        self.star.validate()?;
        self.camera_sweep.validate()?;
        self.target_aware.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraSpec;

    #[test]
    fn test_names_round_trip() {
        for id in StrategyId::all() {
            assert_eq!(id.name().parse::<StrategyId>(), Ok(id));
            assert_eq!(id.to_string(), id.name());
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!("Random-Walk".parse::<StrategyId>(), Ok(StrategyId::RandomWalk));
        assert_eq!("square".parse::<StrategyId>(), Ok(StrategyId::ExpandingSquare));
        assert!("zigzag".parse::<StrategyId>().is_err());
    }

    #[test]
    fn test_menu_keys() {
        assert_eq!(StrategyId::Spiral.menu_key(), "1");
        assert_eq!(StrategyId::TargetAware.menu_key(), "7");
        assert_eq!(StrategyId::from_menu_choice("3"), Some(StrategyId::ExpandingSquare));
        assert_eq!(StrategyId::from_menu_choice(" star "), Some(StrategyId::Star));
        assert_eq!(StrategyId::from_menu_choice("0"), None);
        assert_eq!(StrategyId::from_menu_choice("8"), None);
        assert_eq!(StrategyId::from_menu_choice(""), None);
    }

    #[test]
    fn test_default_is_spiral() {
        assert_eq!(StrategyId::default(), StrategyId::Spiral);
    }

    #[test]
    fn test_build_every_strategy() {
        let params = StrategyParams::default();
        let robot = Robot::new(0.0, 0.0, 1.0, CameraSpec::realsense_d435()).unwrap();

        for id in StrategyId::all() {
            let mut strategy = id.build(&params, 42).unwrap();
            assert_eq!(strategy.name(), id.name());
            assert!(!strategy.is_complete());
            assert!(!strategy.step(&robot, 0.1).is_empty());
        }
    }

    #[test]
    fn test_build_rejects_invalid_params() {
        let mut params = StrategyParams::default();
        params.star.max_radius = -1.0;
        assert!(StrategyId::Star.build(&params, 0).is_err());
        assert!(StrategyId::Spiral.build(&params, 0).is_ok());
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_built_instances_are_independent() {
        let params = StrategyParams::default();
        let mut robot = Robot::new(0.0, 0.0, 1.0, CameraSpec::realsense_d435()).unwrap();
        let mut first = StrategyId::Lawnmower.build(&params, 0).unwrap();
        let mut second = StrategyId::Lawnmower.build(&params, 0).unwrap();

        for _ in 0..100 {
            for command in first.step(&robot, 0.1) {
                robot.apply(command);
            }
        }
        let fresh = Robot::new(0.0, 0.0, 1.0, CameraSpec::realsense_d435()).unwrap();
        assert_eq!(second.step(&fresh, 0.1), vec![MotionCommand::Forward(0.1)]);
    }
}
