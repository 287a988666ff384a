//! Simulator - one coverage search run.
//!
//! Owns the coverage grid, the robot and the strategy. Every tick runs
//! strategy -> motion -> visibility -> mark coverage, in that order.

use crate::area::{GridCell, SearchArea};
use crate::camera::VisibilitySampler;
use crate::config::SearchConfig;
use crate::error::ConfigError;
use crate::metrics::CoverageMetrics;
use crate::robot::Robot;
use crate::strategy::{SearchStrategy, StrategyId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use tracing::{info, warn};

/// Seed multiplier for the strategy RNG.
const STRATEGY_SEED_MIX: u64 = 0x517cc1b727220a95;

/// Seed multiplier for the fractional-tick scheduler RNG.
const SCHEDULER_SEED_MIX: u64 = 0x9e3779b97f4a7c15;

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Cells in the camera footprint after the move
    pub visible: usize,
    /// Cells marked for the first time this tick
    pub newly_seen: usize,
    /// Coverage after the tick [0, 100]
    pub coverage: f64,
    /// Strategy reports completion
    pub complete: bool,
}

/// The coverage search simulation.
pub struct Simulator {
    area: SearchArea,
    robot: Robot,
    sampler: VisibilitySampler,
    strategy: Box<dyn SearchStrategy>,

    /// Drives the fractional extra tick of `advance_frame`
    scheduler_rng: ChaCha8Rng,

    metrics: CoverageMetrics,
    time: f64,
    tick_count: u64,
    complete: bool,
}

impl Simulator {
    /// Creates a simulator from pre-built parts.
    pub fn new(
        area: SearchArea,
        robot: Robot,
        sampler: VisibilitySampler,
        strategy: Box<dyn SearchStrategy>,
        seed: u64,
    ) -> Self {
        Self {
            area,
            robot,
            sampler,
            strategy,
            scheduler_rng: ChaCha8Rng::seed_from_u64(seed),
            metrics: CoverageMetrics::new(),
            time: 0.0,
            tick_count: 0,
            complete: false,
        }
    }

    /// Builds everything from a validated configuration.
    ///
    /// Strategy and scheduler seeds are derived from `config.seed`.
    pub fn from_config(config: &SearchConfig, strategy: StrategyId) -> Result<Self, ConfigError> {
        config.validate()?;
        let strategy_seed = config.seed.wrapping_mul(STRATEGY_SEED_MIX);
        let scheduler_seed = config.seed.wrapping_mul(SCHEDULER_SEED_MIX);

        Ok(Self::new(
            config.build_area()?,
            config.build_robot()?,
            config.build_sampler()?,
            strategy.build(&config.strategy, strategy_seed)?,
            scheduler_seed,
        ))
    }

    /// Advances the simulation by one tick of `dt` seconds.
    ///
    /// Negative or non-finite `dt` is treated as 0.
    pub fn tick(&mut self, dt: f64) -> TickReport {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            warn!("Invalid time step {}, using 0", dt);
            0.0
        };

        let path_start = self.robot.path().len();
        for command in self.strategy.step(&self.robot, dt) {
            self.robot.apply(command);
        }
        let distance: f64 = self.robot.path()[path_start.saturating_sub(1)..]
            .windows(2)
            .map(|w| (w[1] - w[0]).norm())
            .sum();

        let visible = self.visible_cells();
        let newly_seen = self.area.mark_seen(&visible);
        let coverage = self.area.coverage_percentage();

        self.time += dt;
        self.tick_count += 1;
        self.metrics
            .record_tick(dt, visible.len(), newly_seen, distance, coverage);

        if !self.complete && self.strategy.is_complete() {
            self.complete = true;
            info!(
                "{} complete after {} ticks ({:.1}s), coverage {:.1}%",
                self.strategy.name(),
                self.tick_count,
                self.time,
                coverage
            );
        }

        TickReport {
            visible: visible.len(),
            newly_seen,
            coverage,
            complete: self.complete,
        }
    }

    /// Runs one display frame at a speed `multiplier`.
    ///
    /// Executes `floor(multiplier)` ticks, then one more with probability
    /// equal to the fractional part. Returns the number of ticks executed.
    pub fn advance_frame(&mut self, multiplier: f64, dt: f64) -> u64 {
        let multiplier = if multiplier.is_finite() && multiplier >= 0.0 {
            multiplier
        } else {
            warn!("Invalid speed multiplier {}, using 0", multiplier);
            0.0
        };

        let whole = multiplier.floor();
        let fraction = multiplier - whole;
        let mut ticks = whole as u64;
        if fraction > 0.0 && self.scheduler_rng.gen::<f64>() < fraction {
            ticks += 1;
        }

        for _ in 0..ticks {
            self.tick(dt);
        }
        ticks
    }

    /// Clears the coverage grid. Robot, path and strategy are untouched.
    pub fn reset_coverage(&mut self) {
        self.area.reset();
    }

    /// Cells inside the camera footprint at the current pose.
    pub fn visible_cells(&self) -> HashSet<GridCell> {
        self.sampler
            .visible_cells(self.robot.pose(), self.robot.camera(), &self.area)
    }

    pub fn area(&self) -> &SearchArea {
        &self.area
    }

    pub fn robot(&self) -> &Robot {
        &self.robot
    }

    pub fn metrics(&self) -> &CoverageMetrics {
        &self.metrics
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    /// Simulated seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }
}
