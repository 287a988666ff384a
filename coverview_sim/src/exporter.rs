//! JSON exporter for external renderers.
//!
//! Exports per-frame robot pose and coverage, plus the final coverage grid
//! and path, so a plotting tool can replay a run without re-simulating it.

use coverview_core::{MetricsSummary, SearchConfig, Simulator};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// A single exported frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunFrame {
    /// Frame index
    pub frame: u64,

    /// Simulation time in seconds
    pub time_sec: f64,

    /// Ticks executed in this frame (speed multiplier)
    pub ticks: u64,

    /// Robot pose
    pub x: f64,
    pub y: f64,
    pub heading: f64,

    /// Coverage after the frame [0, 100]
    pub coverage: f64,
}

impl RunFrame {
    /// Snapshots the simulator after a frame.
    pub fn capture(sim: &Simulator, frame: u64, ticks: u64) -> Self {
        let pose = sim.robot().pose();
        Self {
            frame,
            time_sec: sim.time(),
            ticks,
            x: pose.x(),
            y: pose.y(),
            heading: pose.heading(),
            coverage: sim.area().coverage_percentage(),
        }
    }
}

/// Complete run export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunExport {
    /// Strategy name
    pub strategy: String,

    /// Master seed
    pub seed: u64,

    /// Configuration the run used
    pub config: SearchConfig,

    /// Duration in seconds
    pub duration_sec: f64,

    /// All frames
    pub frames: Vec<RunFrame>,

    /// Robot path, `[x, y]` per entry
    pub path: Vec<[f64; 2]>,

    /// Final coverage grid, row index = grid y
    pub grid: Vec<Vec<bool>>,

    /// True if the strategy finished its pattern
    pub completed: bool,

    /// Final statistics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<MetricsSummary>,
}

impl RunExport {
    /// Creates a new export container.
    pub fn new(strategy: &str, config: &SearchConfig) -> Self {
        Self {
            strategy: strategy.to_string(),
            seed: config.seed,
            config: config.clone(),
            duration_sec: 0.0,
            frames: Vec::new(),
            path: Vec::new(),
            grid: Vec::new(),
            completed: false,
            summary: None,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: RunFrame) {
        self.duration_sec = frame.time_sec;
        self.frames.push(frame);
    }

    /// Captures the final grid, path and statistics.
    pub fn finalize(&mut self, sim: &Simulator) {
        self.duration_sec = sim.time();
        self.path = sim.robot().path().iter().map(|p| [p.x, p.y]).collect();
        self.grid = sim.area().rows().map(|row| row.to_vec()).collect();
        self.completed = sim.is_complete();
        self.summary = Some(sim.metrics().summary());
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = self.to_json()?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverview_core::StrategyId;

    fn run_frames(sim: &mut Simulator, export: &mut RunExport, frames: u64) {
        for frame in 0..frames {
            let ticks = sim.advance_frame(1.0, 0.1);
            export.add_frame(RunFrame::capture(sim, frame, ticks));
        }
    }

    #[test]
    fn test_export_collects_frames() {
        let config = SearchConfig::default();
        let mut sim = Simulator::from_config(&config, StrategyId::Spiral).unwrap();
        let mut export = RunExport::new("spiral", &config);

        run_frames(&mut sim, &mut export, 20);
        export.finalize(&sim);

        assert_eq!(export.frames.len(), 20);
        assert_eq!(export.frames[19].frame, 19);
        assert!(export.frames.windows(2).all(|w| w[1].coverage >= w[0].coverage));
        assert_eq!(export.path.len(), sim.robot().path().len());
        assert_eq!(export.grid.len(), 40);
        assert!(export.grid.iter().all(|row| row.len() == 40));
        assert!(export.summary.is_some());
    }

    #[test]
    fn test_json_shape() {
        let config = SearchConfig::default();
        let mut sim = Simulator::from_config(&config, StrategyId::Lawnmower).unwrap();
        let mut export = RunExport::new("lawnmower", &config);
        run_frames(&mut sim, &mut export, 5);
        export.finalize(&sim);

        let value: serde_json::Value = serde_json::from_str(&export.to_json().unwrap()).unwrap();
        assert_eq!(value["strategy"], "lawnmower");
        assert_eq!(value["seed"], 42);
        assert_eq!(value["frames"].as_array().unwrap().len(), 5);
        assert_eq!(value["config"]["grid_size"], 0.5);
        assert!(value["summary"]["coverage"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_unfinalized_export_omits_summary() {
        let export = RunExport::new("star", &SearchConfig::default());
        let value: serde_json::Value = serde_json::from_str(&export.to_json().unwrap()).unwrap();
        assert!(value.get("summary").is_none());
    }

    #[test]
    fn test_write_to_file() {
        let config = SearchConfig::default();
        let export = RunExport::new("spiral", &config);
        let path = std::env::temp_dir().join(format!("coverview_export_{}.json", std::process::id()));
        let path = path.to_string_lossy().to_string();

        export.write_to_file(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"strategy\": \"spiral\""));
        std::fs::remove_file(&path).unwrap();
    }
}
