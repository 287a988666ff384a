//! Simulation configuration.
//!
//! One explicit struct, validated once and handed to constructors. Field
//! names match the keys of the TOML config file the harness loads.

use crate::area::SearchArea;
use crate::camera::{CameraSpec, VisibilitySampler};
use crate::error::ConfigError;
use crate::robot::Robot;
use crate::strategy::StrategyParams;
use serde::{Deserialize, Serialize};

/// Visibility sampling density.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Angular samples across the horizontal FOV
    pub angle_samples: usize,

    /// Range samples between min and max camera range
    pub range_samples: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            angle_samples: 30,
            range_samples: 20,
        }
    }
}

/// Full simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Radius of the circular search area (meters)
    pub search_radius: f64,

    /// Coverage grid cell edge (meters)
    pub grid_size: f64,

    /// Robot forward speed (m/s)
    pub robot_speed: f64,

    /// Camera horizontal FOV (degrees)
    pub camera_fov_horizontal: f64,

    /// Camera vertical FOV (degrees)
    pub camera_fov_vertical: f64,

    /// Camera minimum range (meters)
    pub camera_min_range: f64,

    /// Camera maximum range (meters)
    pub camera_max_range: f64,

    /// Seconds per tick
    pub time_step: f64,

    /// Robot start position (meters)
    pub start_x: f64,
    pub start_y: f64,

    /// Master seed; strategy and scheduler seeds are derived from it
    pub seed: u64,

    pub sampling: SamplingConfig,

    pub strategy: StrategyParams,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            search_radius: 10.0,
            grid_size: 0.5,
            robot_speed: 1.0,
            camera_fov_horizontal: 87.0,
            camera_fov_vertical: 58.0,
            camera_min_range: 0.3,
            camera_max_range: 3.0,
            time_step: 0.1,
            start_x: 0.0,
            start_y: 0.0,
            seed: 42,
            sampling: SamplingConfig::default(),
            strategy: StrategyParams::default(),
        }
    }
}

impl SearchConfig {
    /// Checks every parameter. Constructors re-check their own inputs, so this
    /// mainly surfaces all config-file mistakes before anything is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.build_area()?;
        self.build_robot()?;
        self.build_sampler()?;
        ConfigError::require_non_negative("time_step", self.time_step)?;
        self.strategy.validate()
    }

    pub fn build_area(&self) -> Result<SearchArea, ConfigError> {
        SearchArea::new(self.search_radius, self.grid_size)
    }

    pub fn build_camera(&self) -> Result<CameraSpec, ConfigError> {
        CameraSpec::new(
            self.camera_fov_horizontal,
            self.camera_fov_vertical,
            self.camera_min_range,
            self.camera_max_range,
        )
    }

    /// Robot at the configured start position, heading north.
    pub fn build_robot(&self) -> Result<Robot, ConfigError> {
        Robot::new(self.start_x, self.start_y, self.robot_speed, self.build_camera()?)
    }

    pub fn build_sampler(&self) -> Result<VisibilitySampler, ConfigError> {
        VisibilitySampler::new(self.sampling.angle_samples, self.sampling.range_samples)
    }
}
