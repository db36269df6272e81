use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use projector_core::logging::{self, LogLevel};
use projector_core::placement::{self, Placement};
use projector_core::settings::Settings;
use projector_core::{config, monitors, settings_io};
use projector_core::{NativeProjectionFactory, ProjectionController, TransformSync};

#[derive(Parser, Debug)]
#[command(name = "projector", version, about = "Place the projection window on the right display")]
struct Cli {
    /// Override the stored log level (Off, Error, Warn, Info, Debug, Trace)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Use this directory instead of the platform config directory
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List connected monitors
    Monitors {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which monitor projection would use and where
    Place {
        /// Preferred device id (defaults to the stored preference)
        #[arg(long)]
        prefer: Option<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remember the monitor used for projection
    Prefer {
        /// Device id as printed by `monitors`
        #[arg(required_unless_present = "clear")]
        device_id: Option<String>,
        /// Forget the stored preference (automatic selection)
        #[arg(long, conflicts_with = "device_id")]
        clear: bool,
    },
    /// Open the projection window until Ctrl+C
    Show {
        /// Preferred device id (defaults to the stored preference)
        #[arg(long)]
        prefer: Option<String>,
    },
}

fn resolve_config_dir(cli: &Cli) -> Result<PathBuf> {
    match &cli.config_dir {
        Some(dir) => Ok(dir.clone()),
        None => settings_io::projector_config_dir().context("Could not find config directory"),
    }
}

fn resolve_log_level(cli: &Cli, settings: &Settings) -> LogLevel {
    if let Some(level) = cli.log_level {
        return level;
    }
    if let Ok(value) = std::env::var(config::env::LOG_LEVEL_ENV) {
        match value.parse::<LogLevel>() {
            Ok(level) => return level,
            Err(e) => eprintln!("Ignoring {}: {}", config::env::LOG_LEVEL_ENV, e),
        }
    }
    settings.log_level.parse::<LogLevel>().unwrap_or(LogLevel::Error)
}

fn init_logging(level: LogLevel, settings: &Settings) {
    if let Err(e) = logging::init_logging(level, settings.log_to_file) {
        eprintln!("Failed to initialize logging: {}", e);
        return;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        platform = std::env::consts::OS,
        log_level = %level,
        "Projector started"
    );

    if settings.log_to_file {
        logging::auto_cleanup_old_logs(settings.log_retention_days);
    }
}

fn print_monitors(json: bool) -> Result<()> {
    let monitors = monitors::enumerate_monitors();
    if json {
        println!("{}", serde_json::to_string_pretty(&monitors)?);
        return Ok(());
    }

    if monitors.is_empty() {
        println!("No monitors detected");
        return Ok(());
    }
    for (idx, monitor) in monitors.iter().enumerate() {
        println!("{}: {}", idx, monitor.label());
        println!("   id:     {}", monitor.device_id);
        println!("   bounds: {}", monitor.bounds);
    }
    Ok(())
}

fn print_placement(preferred: &str, json: bool) -> Result<()> {
    let monitors = monitors::enumerate_monitors();
    let target = placement::resolve_placement(&monitors, preferred);
    if json {
        println!("{}", serde_json::to_string_pretty(&target)?);
        return Ok(());
    }

    match &target {
        Placement::Monitor {
            device_id,
            reason,
            rect,
        } => {
            println!("Target: {} ({})", device_id, reason);
            println!("Window: {} borderless, topmost", rect);
        }
        Placement::Fallback { rect } => {
            println!("Target: none detected");
            println!("Window: {} windowed fallback", rect);
        }
    }
    Ok(())
}

fn show_projection(settings: &Settings, preferred: &str) -> Result<()> {
    let monitors = monitors::enumerate_monitors();
    let controller = ProjectionController::new(NativeProjectionFactory::default());
    let mut sync = TransformSync::new(settings.transform_limits(), controller);

    let placement = sync
        .sink_mut()
        .open(&monitors, preferred)
        .context("Failed to open projection window")?
        .clone();
    println!("Projecting on {} (Ctrl+C to stop)", placement.rect());

    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .context("Failed to install Ctrl+C handler")?;
    let _ = rx.recv();

    log::info!("Stopping projection");
    sync.sink_mut().close();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_dir = resolve_config_dir(&cli)?;
    let settings = settings_io::load_settings_from_disk(&config_dir);

    let level = resolve_log_level(&cli, &settings);
    init_logging(level, &settings);

    match cli.command {
        Command::Monitors { json } => print_monitors(json),
        Command::Place { prefer, json } => {
            let preferred = prefer.unwrap_or_else(|| settings.preferred_monitor_device_id.clone());
            print_placement(&preferred, json)
        }
        Command::Prefer { device_id, clear } => {
            let device_id = if clear { None } else { device_id };
            let saved = settings_io::write_preferred_device_id(&config_dir, device_id.as_deref())?;
            if saved.has_preferred_monitor() {
                println!("Projection monitor set to {}", saved.preferred_monitor_device_id);
            } else {
                println!("Projection monitor selection is automatic");
            }
            Ok(())
        }
        Command::Show { prefer } => {
            let preferred = prefer.unwrap_or_else(|| settings.preferred_monitor_device_id.clone());
            show_projection(&settings, &preferred)
        }
    }
}
