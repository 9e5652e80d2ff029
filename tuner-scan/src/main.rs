//! tuner-scan: DVB-T frontend settings and scan capture replay.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};

use tuner_protocol::{encode_settings, FrontendSettings};
use tuner_scan::{
    load_capture, logging, replay, resolve_config, save_capture, ConfigFile, ConfiguredPermissions,
    LoggingCallback, ScanReport, ScanSession, ScanSessionConfig,
};

/// tuner-scan - DVB-T frontend settings and scan replay
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'f', long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory where log files are stored
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Number of days to keep log files
    #[arg(long, global = true)]
    log_retention_days: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build DVB-T settings from the [dvbt] section and print them
    Settings {
        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: SettingsFormat,
    },
    /// Replay a recorded scan capture through a scan session
    Replay {
        /// Capture file (binary frames or JSON lines)
        capture: PathBuf,

        /// Delay between events in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Print the collected results as JSON
        #[arg(long)]
        json: bool,

        /// Also write the capture as binary frames
        #[arg(long)]
        save_frames: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SettingsFormat {
    Json,
    /// Hex dump of the encoded settings frame
    Frame,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let (file_config, config_path) = match resolve_config(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to load config file: {}", e);
            return Err(e.into());
        }
    };
    if let Some(path) = &config_path {
        eprintln!("Loaded config from: {}", path.display());
    }

    // Command line takes precedence over the config file.
    let log_dir = args
        .log_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(file_config.logging.log_dir.as_deref().unwrap_or("logs")));
    let log_retention_days = args
        .log_retention_days
        .or(file_config.logging.retention_days)
        .unwrap_or(7);

    logging::init_logging(
        &log_dir,
        log_retention_days,
        args.verbose,
        file_config.logging.level.as_deref(),
    )?;

    info!("tuner-scan v{}", env!("CARGO_PKG_VERSION"));

    let result = match args.command {
        Command::Settings { format } => print_settings(&file_config, format),
        Command::Replay {
            capture,
            interval_ms,
            json,
            save_frames,
        } => run_replay(&file_config, capture, interval_ms, json, save_frames).await,
    };

    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}

fn print_settings(
    config: &ConfigFile,
    format: SettingsFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let access = ConfiguredPermissions::from_config(&config.access).acquire_tuner_access()?;
    let settings = config.dvbt.build(&access);
    info!(
        "Built {} settings at {} Hz",
        settings.frontend_type(),
        FrontendSettings::frequency(&settings)
    );

    match format {
        SettingsFormat::Json => println!("{}", serde_json::to_string_pretty(&settings)?),
        SettingsFormat::Frame => {
            let frame = encode_settings(&settings)?;
            let hex: String = frame.iter().map(|b| format!("{:02x}", b)).collect();
            println!("{}", hex);
        }
    }
    Ok(())
}

async fn run_replay(
    config: &ConfigFile,
    capture: PathBuf,
    interval_ms: Option<u64>,
    json: bool,
    save_frames: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Scan results are tuner data; the same grant applies.
    ConfiguredPermissions::from_config(&config.access).acquire_tuner_access()?;

    let events = load_capture(&capture)?;
    if let Some(path) = &save_frames {
        save_capture(path, &events)?;
    }

    let defaults = ScanSessionConfig::default();
    let session_config = ScanSessionConfig {
        event_buffer: config.scan.event_buffer.unwrap_or(defaults.event_buffer),
        stop_on_end: config.scan.stop_on_end.unwrap_or(defaults.stop_on_end),
    };
    let interval = Duration::from_millis(
        interval_ms
            .or(config.scan.replay_interval_ms)
            .unwrap_or(0),
    );

    let report = Arc::new(ScanReport::new());
    let (mut session, sender) = ScanSession::new(session_config);
    session.add_callback(Arc::new(LoggingCallback));
    session.add_callback(report.clone());
    let handle = session.spawn();

    let sent = replay(events, &sender, interval).await;
    drop(sender);
    let stats = handle.await?;

    info!(
        "Replayed {} event(s), {} delivered, {} discarded after end, {} callback failure(s)",
        sent, stats.events_delivered, stats.events_discarded, stats.callback_failures
    );
    report.log_summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&report.summary())?);
    }
    Ok(())
}
