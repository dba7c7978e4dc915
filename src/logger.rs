use rust_i18n::t;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::constants::{APP_NAME, LOG_FILE_NAME};
use crate::error::AppError;

/// Simplifies file paths by extracting relevant parts from cargo registry paths
///
/// # Arguments
/// * `file_path` - The file path to simplify
///
/// # Returns
/// A simplified version of the file path
fn simplify_file_path(file_path: &str) -> String {
    if file_path.contains(APP_NAME) {
        if let Some(pos) = file_path.rfind("/src/") {
            return file_path[(pos + 1)..].to_string();
        }
    }

    if let Some((_, suffix)) = file_path.split_once(".cargo/registry/src/") {
        if let Some(first_slash) = suffix.find('/') {
            suffix[(first_slash + 1)..].to_string()
        } else {
            suffix.to_string()
        }
    } else {
        file_path.to_string()
    }
}

/// Formats log messages for console output with a simplified format
///
/// # Arguments
/// * `out` - The format callback to write the formatted message
/// * `message` - The log message to format
/// * `record` - The log record containing metadata
pub fn console_log_formatter(
    out: fern::FormatCallback,
    message: &std::fmt::Arguments,
    record: &log::Record,
) {
    let level = record.level();
    let level_color = match level {
        log::Level::Error => "\x1B[31m", // red
        log::Level::Warn => "\x1B[33m",  // yellow
        log::Level::Info => "\x1B[32m",  // green
        log::Level::Debug => "\x1B[0m",  // normal
        log::Level::Trace => "\x1B[35m", // purple
    };
    let reset = "\x1B[0m";

    out.finish(format_args!(
        "{}{}[{}] {}:{} {}{}",
        level_color,
        chrono::Local::now().format("%H:%M:%S.%3f "),
        get_level(level),
        simplify_file_path(record.file().unwrap_or("")),
        record.line().unwrap_or(0),
        message,
        reset,
    ))
}

/// Formats log messages for file output with the full date and location
pub fn file_log_formatter(
    out: fern::FormatCallback,
    message: &std::fmt::Arguments,
    record: &log::Record,
) {
    out.finish(format_args!(
        "{}[{}] {}:{} {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        get_level(record.level()),
        simplify_file_path(record.file().unwrap_or("")),
        record.line().unwrap_or(0),
        message
    ))
}

/// Logs from this crate, plus anything at `level` or above from dependencies
fn is_own_or_above(metadata: &log::Metadata, level: log::LevelFilter) -> bool {
    metadata.target().contains("chatpanel") || metadata.level() < level
}

/// Creates the log directory and file, returning the file dispatcher.
///
/// # Arguments
/// * `log_dir` - Directory that holds `chatpanel.log`
fn build_file_dispatch(log_dir: &Path) -> Result<(fern::Dispatch, PathBuf), AppError> {
    let log_file_path = log_dir.join(LOG_FILE_NAME);

    std::fs::create_dir_all(log_dir).map_err(|e| AppError::General {
        message: t!(
            "main.failed_to_create_log_directory",
            path = log_dir.display().to_string(),
            error = e.to_string()
        )
        .to_string(),
    })?;
    let to_file_error = |e: std::io::Error| AppError::General {
        message: t!(
            "main.failed_to_create_log_file",
            path = log_file_path.display().to_string(),
            error = e.to_string()
        )
        .to_string(),
    };
    File::create(&log_file_path).map_err(to_file_error)?;
    let log_file = fern::log_file(&log_file_path).map_err(to_file_error)?;

    let dispatch = fern::Dispatch::new()
        .level(log::LevelFilter::Info)
        .filter(|metadata| is_own_or_above(metadata, log::LevelFilter::Info))
        .format(file_log_formatter)
        .chain(log_file);

    Ok((dispatch, log_file_path))
}

/// Sets up the application logger with console and file outputs
///
/// The console gets debug output from this crate, the file gets info and
/// above. File logging is skipped when `config.log_dir` is `None`.
pub fn setup_logger(config: &AppConfig) -> Result<(), AppError> {
    let stdout_dispatcher = fern::Dispatch::new()
        .level(log::LevelFilter::Debug)
        .filter(|metadata| is_own_or_above(metadata, log::LevelFilter::Debug))
        .format(console_log_formatter)
        .chain(std::io::stdout());

    let mut base_dispatcher = fern::Dispatch::new()
        .level(log::LevelFilter::Debug)
        .chain(stdout_dispatcher);

    let mut log_file_path = None;
    if let Some(log_dir) = &config.log_dir {
        let (file_dispatcher, path) = build_file_dispatch(log_dir)?;
        base_dispatcher = base_dispatcher.chain(file_dispatcher);
        log_file_path = Some(path);
    }

    base_dispatcher.apply().map_err(|e| AppError::General {
        message: t!("main.failed_to_initialize_logger", error = e.to_string()).to_string(),
    })?;

    log::debug!(
        "Logger initialized successfully, log file path: {:?}",
        log_file_path
    );
    Ok(())
}

fn get_level(level: log::Level) -> String {
    match level {
        log::Level::Error => "E",
        log::Level::Warn => "W",
        log::Level::Info => "I",
        log::Level::Debug => "D",
        log::Level::Trace => "T",
    }
    .to_string()
}

#[cfg(test)]
use log::SetLoggerError;

/// Console-only logger for tests
#[cfg(test)]
pub fn setup_test_logger() -> Result<(), SetLoggerError> {
    if log::logger().enabled(&log::Metadata::builder().level(log::Level::Debug).build()) {
        return Ok(()); // already initialized
    }

    fern::Dispatch::new()
        .format(console_log_formatter)
        .level(log::LevelFilter::Debug)
        .filter(|metadata| is_own_or_above(metadata, log::LevelFilter::Debug))
        .chain(std::io::stdout())
        .apply()
        .map_err(|e| {
            log::error!("Failed to initialize logger: {:?}", e);
            e
        })?;

    log::debug!("Test logger initialized successfully");
    Ok(())
}
