//! UAFX MIDI Controller
//!
//! Desktop control panel sending MIDI Control Change messages to UAFX pedals
//! and other CC-driven devices.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use uafx_controller::cli;
use uafx_controller::coordinator::Coordinator;
use uafx_controller::paths::AppPaths;
use uafx_controller::transport::MidirBackend;
use uafx_controller::ui;

/// UAFX MIDI Controller - on-screen knobs for MIDI CC devices
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the device layout file [default: controls.json in the data directory]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the saved control values [default: state.json next to the config]
    #[arg(short, long)]
    state: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Initial MIDI channel (1-16)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=16))]
    channel: u8,

    /// List available MIDI output ports
    #[arg(long)]
    list_ports: bool,

    /// Run the console instead of the window
    #[arg(long)]
    headless: bool,
}

fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let paths = AppPaths::detect().with_overrides(args.config.clone(), args.state.clone());
    if let Err(e) = paths.ensure_directories() {
        eprintln!("[paths] WARNING: failed to create data directories: {}", e);
    }

    let _log_guard = init_logging(&args.log_level, &paths.logs_dir);

    info!("Starting UAFX Controller v{}...", env!("CARGO_PKG_VERSION"));
    info!(
        "Data directory ({} mode): {}",
        paths.mode(),
        paths.base_dir().display()
    );
    info!("Configuration file: {}", paths.config.display());
    info!("State file: {}", paths.state.display());

    if args.list_ports {
        cli::list_ports_formatted();
        return Ok(());
    }

    let mut coordinator = Coordinator::startup(&paths.config, &paths.state, MidirBackend::new());
    coordinator.set_channel(args.channel as i32);

    if args.headless {
        cli::run_repl(coordinator)?;
    } else {
        ui::run_panel(coordinator)?;
    }

    info!("UAFX Controller shutdown complete");
    Ok(())
}

/// Console logging plus a daily log file when the logs directory is usable.
///
/// The returned guard flushes the file writer on drop.
fn init_logging(level: &str, logs_dir: &Path) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("uafx-controller")
        .filename_suffix("log")
        .build(logs_dir);

    let (file_layer, guard, file_error) = match file {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .with(file_layer)
        .init();

    if let Some(e) = file_error {
        warn!("File logging disabled ({}): {}", logs_dir.display(), e);
    }

    guard
}
