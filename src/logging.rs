//! Tracing setup: stderr output, an optional daily log file, and retention
//! cleanup for old files.

use anyhow::{anyhow, Context, Result};
use lazy_static::lazy_static;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::reload::Handle;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::config;

lazy_static! {
    // Set by the first init; later inits only swap the filter
    static ref FILTER_HANDLE: Mutex<Option<Handle<EnvFilter, Registry>>> = Mutex::new(None);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    const ALL: [LogLevel; 6] = [
        LogLevel::Off,
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    fn name(self) -> &'static str {
        match self {
            LogLevel::Off => "Off",
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.eq_ignore_ascii_case("warning") {
            return Ok(LogLevel::Warn);
        }
        LogLevel::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Invalid log level: {}", s))
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<LogLevel> for Option<Level> {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

/// `Projector/logs` under the local data dir, created on demand.
pub fn get_logs_dir() -> Result<PathBuf> {
    let logs_dir = dirs::data_local_dir()
        .context("Failed to get local data directory")?
        .join("Projector")
        .join("logs");

    fs::create_dir_all(&logs_dir)
        .with_context(|| format!("Failed to create logs directory: {:?}", logs_dir))?;
    Ok(logs_dir)
}

fn build_filter(log_level: LogLevel) -> Result<EnvFilter> {
    let Some(level) = Option::<Level>::from(log_level) else {
        return Ok(EnvFilter::new("off"));
    };

    let mut filter = EnvFilter::new("off");
    for target in config::logging::LOG_TARGETS {
        let directive = format!("{}={}", target, level.as_str())
            .parse()
            .with_context(|| format!("Failed to build log directive for {}", target))?;
        filter = filter.add_directive(directive);
    }
    Ok(filter)
}

/// Install the global subscriber, or swap its level if one is already
/// installed. Whether a file layer exists is decided by the first call.
pub fn init_logging(log_level: LogLevel, log_to_file: bool) -> Result<()> {
    let filter = build_filter(log_level)?;

    let mut handle_slot = FILTER_HANDLE
        .lock()
        .map_err(|e| anyhow!("Failed to lock log filter handle: {}", e))?;
    if let Some(handle) = handle_slot.as_ref() {
        return handle.reload(filter).context("Failed to reload log filter");
    }

    let (filter_layer, handle) = tracing_subscriber::reload::Layer::new(filter);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(true);

    // Option<Layer> is itself a layer, so the file sink can stay optional
    let file_layer = if log_to_file {
        let appender = RollingFileAppender::new(
            Rotation::DAILY,
            get_logs_dir()?,
            config::logging::LOG_FILE_NAME,
        );
        Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(appender)
                .with_span_events(FmtSpan::CLOSE)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install log subscriber")?;

    *handle_slot = Some(handle);
    Ok(())
}

fn is_log_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(config::logging::LOG_FILE_NAME))
}

/// Delete log files last modified more than `keep_days` ago. Returns how
/// many were removed.
pub fn cleanup_old_logs(logs_dir: &Path, keep_days: u32) -> Result<usize> {
    let max_age = Duration::from_secs(u64::from(keep_days) * 24 * 60 * 60);
    let now = SystemTime::now();

    let entries = fs::read_dir(logs_dir)
        .with_context(|| format!("Failed to read logs directory: {:?}", logs_dir))?;

    let mut deleted = 0;
    for path in entries.filter_map(|e| e.ok()).map(|e| e.path()) {
        if !is_log_file(&path) {
            continue;
        }
        let age = fs::metadata(&path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok());
        if age.is_some_and(|age| age > max_age) && fs::remove_file(&path).is_ok() {
            tracing::debug!(file = ?path, "Deleted old log file");
            deleted += 1;
        }
    }

    Ok(deleted)
}

/// Run [`cleanup_old_logs`] on a background thread.
pub fn auto_cleanup_old_logs(keep_days: u32) {
    std::thread::spawn(move || {
        let result = get_logs_dir().and_then(|dir| cleanup_old_logs(&dir, keep_days));
        match result {
            Ok(0) => {}
            Ok(count) => tracing::info!(deleted_count = count, "Cleaned up old log files"),
            Err(e) => tracing::warn!(error = %e, "Failed to clean up old log files"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parse_accepts_aliases() {
        assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!(" debug ".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_log_level_display_roundtrip() {
        for level in LogLevel::ALL {
            assert_eq!(level.to_string().parse::<LogLevel>(), Ok(level));
        }
    }

    #[test]
    fn test_off_maps_to_no_level() {
        let level: Option<Level> = LogLevel::Off.into();
        assert!(level.is_none());
    }

    #[test]
    fn test_filter_covers_bin_and_lib_targets() {
        let filter = build_filter(LogLevel::Debug).unwrap().to_string().to_lowercase();
        assert!(filter.contains("projector=debug"));
        assert!(filter.contains("projector_core=debug"));
    }

    #[test]
    fn test_cleanup_keeps_fresh_logs() {
        let dir = std::env::temp_dir().join(format!("projector_logs_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("projector.log.2026-01-01"), "fresh").unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        assert_eq!(cleanup_old_logs(&dir, 30).unwrap(), 0);
        assert!(dir.join("projector.log.2026-01-01").exists());
        assert!(dir.join("notes.txt").exists());

        let _ = fs::remove_dir_all(&dir);
    }
}
