//! Coverage Metrics Module
//! =======================
//!
//! Per-run statistics for comparing search patterns:
//! - **Coverage timeline**: coverage percentage over time, thinned to at most
//!   [`MAX_TIMELINE_SAMPLES`] entries on long runs
//! - **Redundancy**: fraction of cell observations that saw an already-seen cell
//! - **Path efficiency**: coverage gained per meter driven
//! - **Milestones**: time to reach 50% and 90% coverage

use serde::{Deserialize, Serialize};

/// Coverage milestones tracked by [`CoverageMetrics`], in percent.
pub const MILESTONES: [f64; 2] = [50.0, 90.0];

/// Timeline capacity. Must be even.
pub const MAX_TIMELINE_SAMPLES: usize = 4096;

/// A single entry of the coverage timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageSample {
    /// Simulation time (seconds)
    pub time: f64,
    /// Coverage after the tick [0, 100]
    pub coverage: f64,
}

/// Statistics accumulated over a simulation run.
#[derive(Debug, Clone)]
pub struct CoverageMetrics {
    ticks: u64,
    elapsed: f64,
    distance: f64,

    /// Cell observations across all ticks, duplicates included
    observations: u64,
    /// Observations that marked a cell for the first time
    new_observations: u64,

    coverage: f64,

    /// One sample every `sample_stride` ticks; doubles each time the timeline fills
    timeline: Vec<CoverageSample>,
    sample_stride: u64,

    milestone_times: [Option<f64>; 2],
}

impl Default for CoverageMetrics {
    fn default() -> Self {
        Self {
            ticks: 0,
            elapsed: 0.0,
            distance: 0.0,
            observations: 0,
            new_observations: 0,
            coverage: 0.0,
            timeline: Vec::new(),
            sample_stride: 1,
            milestone_times: [None; 2],
        }
    }
}

impl CoverageMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one tick.
    ///
    /// `visible` counts the cells in the footprint, `newly_seen` the ones
    /// marked for the first time, `distance` the meters driven this tick.
    pub fn record_tick(
        &mut self,
        dt: f64,
        visible: usize,
        newly_seen: usize,
        distance: f64,
        coverage: f64,
    ) {
        self.ticks += 1;
        self.elapsed += dt;
        self.distance += distance;
        self.observations += visible as u64;
        self.new_observations += newly_seen as u64;
        self.coverage = coverage;

        if self.ticks % self.sample_stride == 0 {
            self.timeline.push(CoverageSample {
                time: self.elapsed,
                coverage,
            });
            if self.timeline.len() >= MAX_TIMELINE_SAMPLES {
                // Keep the samples that land on the doubled stride
                let mut index = 0;
                self.timeline.retain(|_| {
                    index += 1;
                    index % 2 == 0
                });
                self.sample_stride *= 2;
            }
        }

        for (slot, threshold) in self.milestone_times.iter_mut().zip(MILESTONES) {
            if slot.is_none() && coverage >= threshold {
                *slot = Some(self.elapsed);
            }
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulated seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Meters driven.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn observations(&self) -> u64 {
        self.observations
    }

    pub fn new_observations(&self) -> u64 {
        self.new_observations
    }

    pub fn timeline(&self) -> &[CoverageSample] {
        &self.timeline
    }

    /// Ticks between consecutive timeline samples.
    pub fn sample_stride(&self) -> u64 {
        self.sample_stride
    }

    /// Latest recorded coverage, 0 before the first tick.
    pub fn coverage(&self) -> f64 {
        self.coverage
    }

    /// Seconds until coverage first reached 50%.
    pub fn time_to_half(&self) -> Option<f64> {
        self.milestone_times[0]
    }

    /// Seconds until coverage first reached 90%.
    pub fn time_to_ninety(&self) -> Option<f64> {
        self.milestone_times[1]
    }

    /// Fraction of observations that re-saw a known cell [0, 1].
    pub fn redundancy_ratio(&self) -> f64 {
        if self.observations == 0 {
            return 0.0;
        }
        1.0 - self.new_observations as f64 / self.observations as f64
    }

    /// Coverage percentage points per meter driven, 0 before any motion.
    pub fn coverage_per_meter(&self) -> f64 {
        if self.distance <= 0.0 {
            return 0.0;
        }
        self.coverage() / self.distance
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            ticks: self.ticks,
            elapsed_secs: self.elapsed,
            coverage: self.coverage(),
            distance: self.distance,
            redundancy_ratio: self.redundancy_ratio(),
            coverage_per_meter: self.coverage_per_meter(),
            time_to_50: self.time_to_half(),
            time_to_90: self.time_to_ninety(),
        }
    }
}

// =============================================================================
// SUMMARY
// =============================================================================

/// Flat snapshot of [`CoverageMetrics`] for reports and exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub ticks: u64,
    pub elapsed_secs: f64,
    /// Final coverage [0, 100]
    pub coverage: f64,
    /// Meters driven
    pub distance: f64,
    pub redundancy_ratio: f64,
    pub coverage_per_meter: f64,
    pub time_to_50: Option<f64>,
    pub time_to_90: Option<f64>,
}
