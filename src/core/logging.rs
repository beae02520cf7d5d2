//! Logging backend
//!
//! Everything in the crate logs through the `log` facade. The binary installs
//! a `flexi_logger` backend once at startup; libraries embedding the tracker
//! are free to install their own.

use flexi_logger::{DeferredNow, FileSpec, FlexiLoggerError, Logger, LoggerHandle};
use std::str::FromStr;
use std::sync::{Mutex, OnceLock};

static LOGGER_HANDLE: OnceLock<Mutex<LoggerHandle>> = OnceLock::new();

/// Output layout of a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::EnumString, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum LogFormat {
    /// `2026-10-16 10:00:00.000 INF message`
    #[default]
    Text,
    /// Text plus the source location, `(module/tracker.rs:42)`
    Ext,
    /// One compact JSON object per line
    Json,
}

/// Start the global logger.
///
/// Unknown format names fall back to [`LogFormat::Text`].
pub fn init_logging(
    log_level: Option<&str>,
    log_format: Option<&str>,
    log_file: Option<&str>,
    color_enabled: bool,
) -> Result<(), FlexiLoggerError> {
    // Already running: only the level can change
    if let Some(handle) = LOGGER_HANDLE.get() {
        if let Ok(mut handle) = handle.lock() {
            handle.parse_and_push_temp_spec(log_level.unwrap_or("info"))?;
        }
        return Ok(());
    }

    let format = log_format
        .and_then(|f| LogFormat::from_str(f).ok())
        .unwrap_or_default();

    let mut logger = Logger::try_with_str(log_level.unwrap_or("info"))?;
    logger = match (format, color_enabled) {
        (LogFormat::Json, _) => logger.format(json_format),
        (LogFormat::Ext, true) => logger.format(extended_color_format),
        (LogFormat::Ext, false) => logger.format(extended_format),
        (LogFormat::Text, true) => logger.format(text_color_format),
        (LogFormat::Text, false) => logger.format(text_format),
    };

    if let Some(path) = log_file {
        logger = logger.log_to_file(FileSpec::try_from(std::path::Path::new(path))?);
    }

    let handle = logger.start()?;
    let _ = LOGGER_HANDLE.set(Mutex::new(handle));
    Ok(())
}

/// Change the active log level at runtime.
///
/// Only the level can change; format and destination are fixed at startup.
/// Returns `false` when no logger was started by [`init_logging`].
pub fn reconfigure_logging(log_level: &str) -> bool {
    let Some(handle) = LOGGER_HANDLE.get() else {
        return false;
    };
    match handle.lock() {
        Ok(mut handle) => handle.parse_and_push_temp_spec(log_level).is_ok(),
        Err(_) => false,
    }
}

fn level_abbr(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERR",
        log::Level::Warn => "WRN",
        log::Level::Info => "INF",
        log::Level::Debug => "DBG",
        log::Level::Trace => "TRC",
    }
}

fn colored_level(level: log::Level) -> colored::ColoredString {
    use colored::Colorize;
    match level {
        log::Level::Error => "ERR".red().bold(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Info => "INF".green(),
        log::Level::Debug => "DBG".blue(),
        log::Level::Trace => "TRC".magenta(),
    }
}

fn timestamp(now: &mut DeferredNow) -> String {
    now.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

fn text_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {} {}",
        timestamp(now),
        level_abbr(record.level()),
        record.args()
    )
}

fn text_color_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    use colored::Colorize;
    write!(
        w,
        "{} {} {}",
        timestamp(now).dimmed(),
        colored_level(record.level()),
        record.args()
    )
}

fn extended_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {} {} ({})",
        timestamp(now),
        level_abbr(record.level()),
        record.args(),
        target_as_path(record.target(), record.line())
    )
}

fn extended_color_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    use colored::Colorize;
    write!(
        w,
        "{} {} {} ({})",
        timestamp(now).dimmed(),
        colored_level(record.level()),
        record.args(),
        target_as_path(record.target(), record.line()).dimmed()
    )
}

fn json_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    let line = serde_json::json!({
        "timestamp": now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        "level": level_abbr(record.level()),
        "message": record.args().to_string(),
        "target": target_as_path(record.target(), record.line()),
    });
    match serde_json::to_string(&line) {
        Ok(json) => w.write_all(json.as_bytes()),
        Err(_) => w.write_all(b"{\"error\":\"Failed to serialize log message\"}"),
    }
}

/// `modlife::module::tracker` at line 42 becomes `module/tracker.rs:42`
fn target_as_path(target: &str, line: Option<u32>) -> String {
    let path = match target.strip_prefix("modlife::") {
        Some(rest) => rest.replace("::", "/") + ".rs",
        None => target.replace("::", "/"),
    };
    match line {
        Some(line) => format!("{path}:{line}"),
        None => path,
    }
}
