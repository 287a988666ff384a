//! CoverView Run Harness
//!
//! Headless driver around `coverview_core`: runs search strategies for a
//! number of display frames, compares them, and exports frame-by-frame JSON
//! that an external renderer can replay.
//!
//! # Usage
//!
//! ```ignore
//! use coverview_core::{SearchConfig, StrategyId};
//! use coverview_sim::SearchRunner;
//!
//! let runner = SearchRunner::new(SearchConfig::default())
//!     .with_frames(2000)
//!     .with_speed(2.5);
//!
//! let result = runner.run(StrategyId::Lawnmower)?;
//! println!("{:.1}% covered", result.coverage);
//! ```

pub mod exporter;
pub mod menu;
pub mod runner;
pub mod settings;

pub use exporter::{RunExport, RunFrame};
pub use runner::{RunResult, SearchRunner};
pub use settings::SettingsError;
