//! Headless strategy runner.

use crate::exporter::{RunExport, RunFrame};
use coverview_core::{ConfigError, MetricsSummary, SearchConfig, Simulator, StrategyId};
use tracing::{debug, info};

/// Coverage is logged every this many frames.
const PROGRESS_INTERVAL: u64 = 50;

/// Result of a single run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Strategy that was run
    pub strategy: StrategyId,

    /// Master seed
    pub seed: u64,

    /// Frames executed
    pub frames: u64,

    /// Total ticks executed
    pub total_ticks: u64,

    /// Final simulation time in seconds
    pub final_time_secs: f64,

    /// True if the strategy finished its pattern
    pub completed: bool,

    /// Final coverage [0, 100]
    pub coverage: f64,

    /// Points in the robot's path log, start position included
    pub path_points: usize,

    /// Statistics collected during the run
    pub metrics: MetricsSummary,
}

/// Runs strategies against a fixed configuration.
#[derive(Debug, Clone)]
pub struct SearchRunner {
    config: SearchConfig,

    /// Frames to run
    frames: u64,

    /// Ticks per frame; fractional values add a probabilistic extra tick
    speed: f64,

    /// End the run on the frame the strategy completes
    stop_on_complete: bool,
}

impl SearchRunner {
    /// Creates a runner with 2000 frames at 1x speed.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            frames: 2000,
            speed: 1.0,
            stop_on_complete: false,
        }
    }

    /// Sets the number of frames.
    pub fn with_frames(mut self, frames: u64) -> Self {
        self.frames = frames;
        self
    }

    /// Sets the speed multiplier.
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Stops early once the strategy completes.
    pub fn with_stop_on_complete(mut self, stop: bool) -> Self {
        self.stop_on_complete = stop;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Runs a strategy and returns the result.
    pub fn run(&self, strategy: StrategyId) -> Result<RunResult, ConfigError> {
        self.drive(strategy, |_, _, _| {}).map(|(result, _)| result)
    }

    /// Runs a strategy, recording every frame for export.
    pub fn run_with_export(&self, strategy: StrategyId) -> Result<(RunResult, RunExport), ConfigError> {
        let mut export = RunExport::new(strategy.name(), &self.config);
        let (result, sim) = self.drive(strategy, |sim, frame, ticks| {
            export.add_frame(RunFrame::capture(sim, frame, ticks));
        })?;
        export.finalize(&sim);
        Ok((result, export))
    }

    fn drive<F>(&self, strategy: StrategyId, mut on_frame: F) -> Result<(RunResult, Simulator), ConfigError>
    where
        F: FnMut(&Simulator, u64, u64),
    {
        info!(
            "Starting {} (seed={}, frames={}, speed={}x)",
            strategy.name(),
            self.config.seed,
            self.frames,
            self.speed
        );

        let mut sim = Simulator::from_config(&self.config, strategy)?;
        let mut frames_run = 0;

        for frame in 0..self.frames {
            let ticks = sim.advance_frame(self.speed, self.config.time_step);
            frames_run += 1;
            on_frame(&sim, frame, ticks);

            if frame % PROGRESS_INTERVAL == 0 && frame > 0 {
                debug!(
                    "  Frame {}: coverage {:.1}% | t={:.1}s",
                    frame,
                    sim.area().coverage_percentage(),
                    sim.time()
                );
            }

            if self.stop_on_complete && sim.is_complete() {
                break;
            }
        }

        let coverage = sim.area().coverage_percentage();
        info!(
            "{}: coverage {:.1}% after {} frames ({:.1}m driven)",
            strategy.name(),
            coverage,
            frames_run,
            sim.metrics().distance()
        );

        let result = RunResult {
            strategy,
            seed: self.config.seed,
            frames: frames_run,
            total_ticks: sim.tick_count(),
            final_time_secs: sim.time(),
            completed: sim.is_complete(),
            coverage,
            path_points: sim.robot().path().len(),
            metrics: sim.metrics().summary(),
        };
        Ok((result, sim))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_runs_requested_frames() {
        let runner = SearchRunner::new(SearchConfig::default()).with_frames(100);
        let result = runner.run(StrategyId::Spiral).unwrap();

        assert_eq!(result.frames, 100);
        assert_eq!(result.total_ticks, 100);
        assert_relative_eq!(result.final_time_secs, 10.0, epsilon = 1e-9);
        assert!(result.coverage > 0.0);
        assert_eq!(result.metrics.coverage, result.coverage);
    }

    #[test]
    fn test_speed_multiplier() {
        let runner = SearchRunner::new(SearchConfig::default())
            .with_frames(50)
            .with_speed(3.0);
        let result = runner.run(StrategyId::Lawnmower).unwrap();
        assert_eq!(result.total_ticks, 150);
    }

    #[test]
    fn test_stop_on_complete() {
        let mut config = SearchConfig::default();
        config.strategy.star.max_radius = 1.0;
        config.strategy.star.angle_step = 90.0;

        let runner = SearchRunner::new(config)
            .with_frames(2000)
            .with_stop_on_complete(true);
        let result = runner.run(StrategyId::Star).unwrap();

        assert!(result.completed);
        assert!(result.frames < 2000);
    }

    #[test]
    fn test_runs_to_frame_limit_without_stop() {
        let mut config = SearchConfig::default();
        config.strategy.star.max_radius = 1.0;
        config.strategy.star.angle_step = 90.0;

        let result = SearchRunner::new(config)
            .with_frames(200)
            .run(StrategyId::Star)
            .unwrap();
        assert!(result.completed);
        assert_eq!(result.frames, 200);
    }

    #[test]
    fn test_export_matches_result() {
        let runner = SearchRunner::new(SearchConfig::default()).with_frames(30);
        let (result, export) = runner.run_with_export(StrategyId::ExpandingSquare).unwrap();

        assert_eq!(export.frames.len() as u64, result.frames);
        assert_eq!(export.strategy, "expanding_square");
        assert_eq!(export.summary.as_ref().map(|s| s.ticks), Some(result.total_ticks));
        let last = export.frames.last().unwrap();
        assert_eq!(last.coverage, result.coverage);
    }

    #[test]
    fn test_same_seed_reproducible() {
        let runner = SearchRunner::new(SearchConfig::default())
            .with_frames(150)
            .with_speed(1.3);
        let a = runner.run(StrategyId::RandomWalk).unwrap();
        let b = runner.run(StrategyId::RandomWalk).unwrap();
        assert_eq!(a.total_ticks, b.total_ticks);
        assert_eq!(a.coverage, b.coverage);
    }

    #[test]
    fn test_reports_path_points() {
        let result = SearchRunner::new(SearchConfig::default())
            .with_frames(40)
            .with_speed(2.0)
            .run(StrategyId::RandomWalk)
            .unwrap();
        // Every random-walk tick drives forward
        assert_eq!(result.total_ticks, 80);
        assert_eq!(result.path_points, 81);
    }

    #[test]
    fn test_invalid_config_is_error() {
        let config = SearchConfig {
            robot_speed: -1.0,
            ..Default::default()
        };
        assert!(SearchRunner::new(config).run(StrategyId::Spiral).is_err());
    }
}
