//! CoverView Core - Coverage-Search Simulation Engine
//!
//! Simulates a ground robot searching a bounded circular area with a
//! forward-facing camera, and tracks which cells of a discretized grid the
//! camera has observed. Used to compare search patterns before deployment.
//!
//! # Tick Pipeline
//!
//! ```text
//! ┌──────────────┐  commands  ┌─────────┐  pose  ┌───────────────────┐  cells  ┌────────────┐
//! │SearchStrategy│───────────►│  Robot  │───────►│ VisibilitySampler │────────►│ SearchArea │
//! └──────────────┘            └─────────┘        └───────────────────┘         └────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use coverview_core::{SearchConfig, Simulator, StrategyId};
//!
//! let config = SearchConfig::default();
//! let mut sim = Simulator::from_config(&config, StrategyId::Spiral)?;
//! for _ in 0..500 {
//!     sim.tick(config.time_step);
//! }
//! println!("coverage: {:.1}%", sim.area().coverage_percentage());
//! ```

pub mod area;
pub mod camera;
pub mod config;
pub mod error;
pub mod metrics;
pub mod robot;
pub mod simulator;
pub mod strategy;

// Re-export key types for convenience
pub use area::{GridCell, SearchArea};
pub use camera::{CameraSpec, VisibilitySampler};
pub use config::{SamplingConfig, SearchConfig};
pub use error::ConfigError;
pub use metrics::{CoverageMetrics, MetricsSummary};
pub use robot::{MotionCommand, Robot, RobotPose};
pub use simulator::{Simulator, TickReport};
pub use strategy::{SearchStrategy, StrategyId, StrategyParams};
