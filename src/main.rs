//! uwb-positioning daemon
//!
//! Reads network snapshots as newline-delimited JSON from stdin (or `--input`), solves
//! each one on a fixed tick, and writes the published snapshots to stdout, one JSON
//! document per line. Logs go to stderr.
//!
//! ```bash
//! # Snapshots in the wire schema
//! uwb-positioning --config config.json < snapshots.jsonl
//!
//! # Bare edge lists: [["A", "B", 12.5], ["B", "C", 8.0]]
//! uwb-positioning --edges --input ranges.jsonl
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use env_logger::Env;

use uwb_positioning::{
    AppConfig, ConfigurationManager, HealthMonitor, LinePublisher, Network, PositionSolver, TickOutcome,
    UwbManager,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "uwb-positioning")]
#[command(about = "UWB network positioning daemon")]
#[command(version)]
struct Args {
    /// Configuration file (JSON); defaults are used if it does not exist
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Read snapshots from this file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Input lines are bare edge lists of [end0, end1, distance]
    #[arg(long)]
    edges: bool,

    /// Processing tick interval in milliseconds (overrides the config file)
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Log level (overrides the config file and RUST_LOG)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Seconds between health reports in the log
    #[arg(long, default_value = "30")]
    health_interval_secs: u64,
}

fn main() {
    let args = Args::parse();

    let (config, config_status) = load_config(&args);
    init_logging(&args, config.as_ref().ok());

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    match config_status {
        ConfigStatus::Loaded => log::info!("Configuration loaded from {}", args.config.display()),
        ConfigStatus::Missing => log::warn!(
            "Config file {} not found, using default configuration",
            args.config.display()
        ),
    }

    let interval = Duration::from_millis(args.interval_ms.unwrap_or(config.application.update_interval_ms).max(1));
    log::info!("uwb-positioning {} starting", env!("CARGO_PKG_VERSION"));
    log::info!("  Beacons configured: {}", config.beacons.len());
    log::info!(
        "  Refinement: {} (max {} iterations, learning rate {})",
        if config.algorithm.refinement_enabled { "enabled" } else { "disabled" },
        config.algorithm.max_iterations,
        config.algorithm.learning_rate
    );
    log::info!("  Update interval: {:?}", interval);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .expect("Error setting Ctrl-C handler");

    if let Err(e) = run(&args, &config, interval, running) {
        log::error!("Daemon error: {}", e);
        std::process::exit(1);
    }

    log::info!("uwb-positioning shutdown complete");
}

enum ConfigStatus {
    Loaded,
    Missing,
}

fn load_config(args: &Args) -> (Result<AppConfig, uwb_positioning::ConfigError>, ConfigStatus) {
    if args.config.exists() {
        let config = ConfigurationManager::from_file(&args.config).map(ConfigurationManager::into_config);
        (config, ConfigStatus::Loaded)
    } else {
        (Ok(AppConfig::default()), ConfigStatus::Missing)
    }
}

/// `--log-level`, then the config file, then `RUST_LOG`, then `info`
fn init_logging(args: &Args, config: Option<&AppConfig>) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{}] {} - {}",
            record.level(),
            record.target(),
            record.args()
        )
    });

    let explicit = args
        .log_level
        .clone()
        .or_else(|| config.and_then(|c| c.application.log_filter()).map(str::to_string));
    if let Some(level) = explicit {
        builder.parse_filters(&level);
    }

    builder.init();
}

fn run(
    args: &Args,
    config: &AppConfig,
    interval: Duration,
    running: Arc<AtomicBool>,
) -> Result<(), Box<dyn std::error::Error>> {
    let health = Arc::new(HealthMonitor::new());
    let solver = PositionSolver::from_config(config);
    let publisher = Box::new(LinePublisher::new(io::stdout()));
    let manager = Arc::new(UwbManager::new(solver, publisher, Arc::clone(&health)));

    let reader: Box<dyn BufRead + Send> = match &args.input {
        Some(path) => {
            log::info!("  Input: {}", path.display());
            Box::new(BufReader::new(File::open(path)?))
        }
        None => {
            log::info!("  Input: stdin");
            Box::new(BufReader::new(io::stdin()))
        }
    };

    let input_done = Arc::new(AtomicBool::new(false));
    let receiver = {
        let manager = Arc::clone(&manager);
        let input_done = Arc::clone(&input_done);
        let running = Arc::clone(&running);
        let edges = args.edges;
        thread::Builder::new()
            .name("receiver".to_string())
            .spawn(move || {
                receive_lines(reader, &manager, edges, &running);
                input_done.store(true, Ordering::Release);
            })?
    };

    let health_interval = Duration::from_secs(args.health_interval_secs.max(1));
    let mut last_health = Instant::now();

    while running.load(Ordering::Relaxed) {
        // Read the flag before ticking so a snapshot posted just before EOF is still seen
        let finished = input_done.load(Ordering::Acquire);

        match manager.tick() {
            TickOutcome::Processed(report) => {
                for diagnostic in &report.diagnostics {
                    log::debug!("Cycle {} diagnostic: {}", report.cycle, diagnostic);
                }
            }
            TickOutcome::Failed(e) => log::warn!("Cycle skipped: {}", e),
            TickOutcome::Idle | TickOutcome::Busy => {}
        }

        if last_health.elapsed() >= health_interval {
            log_health(&health);
            last_health = Instant::now();
        }

        if finished && !manager.has_pending() {
            log::info!("Input exhausted");
            break;
        }
        thread::sleep(interval);
    }

    log_health(&health);
    if input_done.load(Ordering::Acquire) {
        let _ = receiver.join();
    }
    Ok(())
}

fn receive_lines(reader: Box<dyn BufRead + Send>, manager: &UwbManager, edges: bool, running: &AtomicBool) {
    for line in reader.lines() {
        if !running.load(Ordering::Relaxed) {
            break;
        }
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::error!("Failed to read input: {}", e);
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if edges {
            match serde_json::from_str::<Vec<(String, String, f64)>>(line) {
                Ok(list) => manager.receive(Network::from_edge_list(&list)),
                Err(e) => log::error!("Failed to parse edge list: {}", e),
            }
        } else {
            // Parse failures are logged by the manager
            let _ = manager.receive_message(line);
        }
    }
}

fn log_health(health: &HealthMonitor) {
    match serde_json::to_string(&health.report()) {
        Ok(json) => log::info!("Health: {}", json),
        Err(e) => log::warn!("Failed to serialize health report: {}", e),
    }
}
