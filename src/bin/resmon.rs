//! resmon - live CPU, memory and disk utilization in the terminal.
//!
//! Usage:
//!   resmon                      # refresh every second
//!   resmon 5                    # refresh every 5 seconds
//!   resmon --disk-path /home    # report the filesystem mounted at /home
//!   resmon --log-file resmon.log -v
//!
//! Press `q`, `Esc` or `Ctrl-C` to quit.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

use resmon::config::{DEFAULT_SHUTDOWN_GRACE, DashboardConfig};
use resmon::lifecycle::Lifecycle;

/// Terminal dashboard for system resource utilization.
#[derive(Parser)]
#[command(name = "resmon", about = "System resource dashboard", version)]
struct Args {
    /// Sampling interval in seconds (default: 1).
    #[arg(value_name = "INTERVAL")]
    interval: Option<u64>,

    /// Mark a reading stale after this many seconds without an update.
    /// Default: three sampling intervals.
    #[arg(long, value_name = "SECS")]
    stale_after: Option<u64>,

    /// How long to wait for samplers on shutdown, in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_SHUTDOWN_GRACE.as_millis() as u64)]
    grace_ms: u64,

    /// Path to /proc filesystem.
    #[arg(long, default_value = "/proc")]
    proc_path: PathBuf,

    /// Mount point whose usage the disk row shows.
    #[arg(long, default_value = "/")]
    disk_path: PathBuf,

    /// Write logs to this file. Nothing is logged without it, since the
    /// dashboard owns the terminal.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(log_file: &Path, verbose: u8, quiet: bool) -> std::io::Result<()> {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("resmon={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    let file = File::create(log_file)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_thread_names(true)
        .with_target(false)
        .init();
    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Some(path) = &args.log_file
        && let Err(e) = init_logging(path, args.verbose, args.quiet)
    {
        eprintln!("Error: cannot open log file {}: {}", path.display(), e);
        std::process::exit(1);
    }

    let mut config = DashboardConfig::default()
        .with_shutdown_grace(Duration::from_millis(args.grace_ms))
        .with_proc_path(args.proc_path)
        .with_disk_path(args.disk_path);
    if let Some(secs) = args.interval {
        config = config.with_interval(Duration::from_secs(secs));
    }
    if let Some(secs) = args.stale_after {
        config = config.with_stale_after(Duration::from_secs(secs));
    }

    let lifecycle = match Lifecycle::new(config) {
        Ok(lifecycle) => lifecycle,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Raw mode turns an interactive Ctrl-C into a key press; this covers
    // signals sent from outside the terminal.
    let token = lifecycle.token();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        token.cancel();
    }) {
        warn!("Failed to set signal handler: {}", e);
    }

    info!(config = ?lifecycle.config(), "starting dashboard");
    let sources = lifecycle.default_sources();
    match lifecycle.run(sources) {
        Ok(report) => {
            if let Some(timeout) = report.timeout {
                eprintln!("Warning: {}", timeout);
            }
            info!("dashboard stopped");
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
