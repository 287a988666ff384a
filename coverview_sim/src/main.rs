//! CoverView Simulator CLI
//!
//! Run and compare coverage-search strategies headlessly.

use clap::Parser;
use coverview_core::{SearchConfig, StrategyId};
use coverview_sim::{menu, settings, RunResult, SearchRunner};
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// CoverView coverage-search simulator
#[derive(Parser, Debug)]
#[command(name = "coverview-sim")]
#[command(about = "Simulate and compare robot coverage-search strategies", long_about = None)]
struct Args {
    /// TOML config file (defaults are used for missing keys)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Strategy to run: a name, a menu number, "all", or "menu" for the interactive chooser.
    /// Unknown values fall back to spiral
    #[arg(short = 'S', long, default_value = "menu")]
    strategy: String,

    /// Master seed, overrides the config file (0 = random from time)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of display frames to run
    #[arg(short, long, default_value = "2000")]
    frames: u64,

    /// Speed multiplier (ticks per frame, fractions allowed)
    #[arg(long, default_value = "1.0")]
    speed: f64,

    /// Stop as soon as the strategy completes its pattern
    #[arg(long)]
    stop_on_complete: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for scripting
    #[arg(long)]
    json: bool,

    /// Export frame data to a JSON file for an external renderer
    #[arg(long)]
    export: Option<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

fn fail(message: impl std::fmt::Display) -> ! {
    error!("{}", message);
    std::process::exit(1);
}

fn load_config(args: &Args) -> SearchConfig {
    let mut config = match &args.config {
        Some(path) => settings::load(path).unwrap_or_else(|e| fail(e)),
        None => SearchConfig::default(),
    };

    match args.seed {
        Some(0) => {
            config.seed = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(42);
        }
        Some(seed) => config.seed = seed,
        None => {}
    }
    config
}

fn select_strategies(choice: &str) -> Vec<StrategyId> {
    if choice != "menu" {
        return menu::resolve_strategies(choice);
    }

    let stdin = std::io::stdin();
    let chosen = menu::prompt_strategy(stdin.lock(), std::io::stdout())
        .unwrap_or_else(|e| fail(format!("Failed to read strategy choice: {}", e)));
    vec![chosen]
}

fn print_json(results: &[RunResult]) {
    let summary = serde_json::json!({
        "total": results.len(),
        "results": results.iter().map(|r| {
            serde_json::json!({
                "strategy": r.strategy.name(),
                "seed": r.seed,
                "frames": r.frames,
                "ticks": r.total_ticks,
                "time_secs": r.final_time_secs,
                "completed": r.completed,
                "coverage": r.coverage,
                "path_points": r.path_points,
                "metrics": r.metrics,
            })
        }).collect::<Vec<_>>(),
    });
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(format!("Failed to encode results: {}", e)),
    }
}

fn print_summary(results: &[RunResult]) {
    let mut ranked: Vec<&RunResult> = results.iter().collect();
    ranked.sort_by(|a, b| b.coverage.total_cmp(&a.coverage));

    info!("");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("Final Statistics");
    for result in ranked {
        let milestone = |t: Option<f64>| t.map(|t| format!("{:.1}s", t)).unwrap_or_else(|| "-".into());
        info!(
            "  {:<18} coverage {:>5.1}% | {:>6.1}m | {:>5} path points | redundancy {:>4.2} | 50% {} | 90% {}{}",
            result.strategy.name(),
            result.coverage,
            result.metrics.distance,
            result.path_points,
            result.metrics.redundancy_ratio,
            milestone(result.metrics.time_to_50),
            milestone(result.metrics.time_to_90),
            if result.completed { " | complete" } else { "" }
        );
    }
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }

    let config = load_config(&args);

    if args.dump_config {
        match settings::render(&config) {
            Ok(text) => print!("{}", text),
            Err(e) => fail(e),
        }
        return;
    }

    if !args.json {
        info!("CoverView Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!(
            "Search radius {}m, grid {}m, speed {}m/s, camera {}° x {}° / {}-{}m",
            config.search_radius,
            config.grid_size,
            config.robot_speed,
            config.camera_fov_horizontal,
            config.camera_fov_vertical,
            config.camera_min_range,
            config.camera_max_range
        );
    }

    let strategies = select_strategies(args.strategy.trim());
    let runner = SearchRunner::new(config)
        .with_frames(args.frames)
        .with_speed(args.speed)
        .with_stop_on_complete(args.stop_on_complete);

    // Handle --export mode for a single strategy
    if let Some(export_path) = &args.export {
        if strategies.len() > 1 {
            fail("--export only supports a single strategy, not 'all'");
        }

        let (result, export) = runner
            .run_with_export(strategies[0])
            .unwrap_or_else(|e| fail(e));
        if let Err(e) = export.write_to_file(export_path) {
            fail(format!("Failed to write export: {}", e));
        }
        info!("Exported {} frames to {}", export.frames.len(), export_path);

        if args.json {
            print_json(&[result]);
        } else {
            print_summary(&[result]);
        }
        return;
    }

    let mut results = Vec::with_capacity(strategies.len());
    for strategy in strategies {
        match runner.run(strategy) {
            Ok(result) => results.push(result),
            Err(e) => fail(format!("{}: {}", strategy.name(), e)),
        }
    }

    if args.json {
        print_json(&results);
    } else {
        print_summary(&results);
    }
}
