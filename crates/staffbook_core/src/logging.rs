//! Rolling-file logging for Staffbook processes.
//!
//! # Responsibility
//! - Start the `flexi_logger` file backend from `CoreConfig` once per process.
//! - Route panics into the log as single sanitized lines.
//!
//! # Invariants
//! - Employee events carry ids, outcomes and error codes only. Names,
//!   addresses, birth dates and salaries never reach log lines.
//! - A repeated init with the same level and directory is a no-op; a
//!   repeated init with other settings is rejected.
//! - Init failures come back as `LoggingError`; init never panics.

use crate::config::CoreConfig;
use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, LogSpecification, Logger, LoggerHandle,
    Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::panic::PanicHookInfo;
use std::path::{Path, PathBuf};
use thiserror::Error;

const LOG_FILE_BASENAME: &str = "staffbook";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 5;
const PANIC_PAYLOAD_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("log directory must be absolute, got `{}`", .0.display())]
    RelativeDir(PathBuf),
    #[error("failed to create log directory `{}`: {source}", .dir.display())]
    CreateDir {
        dir: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to start file logger: {0}")]
    Backend(#[from] FlexiLoggerError),
    #[error("logging already active with level {level} at `{}`", .dir.display())]
    AlreadyActive { level: LevelFilter, dir: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FileLogging {
    level: LevelFilter,
    dir: PathBuf,
}

struct ActiveLogger {
    settings: FileLogging,
    _handle: LoggerHandle,
}

/// Starts file logging as `config` describes.
///
/// Returns `Ok(false)` without starting anything when `config.log_dir` is
/// unset, `Ok(true)` once file logging is active.
///
/// # Errors
/// - `RelativeDir` when `log_dir` is not absolute.
/// - `CreateDir`/`Backend` when the directory or the logger cannot be set up.
/// - `AlreadyActive` when logging runs with a different level or directory.
pub fn init_logging(config: &CoreConfig) -> Result<bool, LoggingError> {
    let Some(dir) = config.log_dir.as_deref() else {
        return Ok(false);
    };
    let wanted = FileLogging {
        level: config.log_level,
        dir: absolute_dir(dir)?,
    };

    let active = ACTIVE.get_or_try_init(|| start(&wanted))?;
    if active.settings != wanted {
        return Err(LoggingError::AlreadyActive {
            level: active.settings.level,
            dir: active.settings.dir.clone(),
        });
    }
    Ok(true)
}

fn start(settings: &FileLogging) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&settings.dir).map_err(|source| LoggingError::CreateDir {
        dir: settings.dir.clone(),
        source,
    })?;

    let mut spec = LogSpecification::builder();
    spec.default(settings.level);
    let handle = Logger::with(spec.build())
        .log_to_file(
            FileSpec::default()
                .directory(settings.dir.clone())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;

    route_panics_to_log();
    info!(
        "event=logging_init module=logging status=ok level={} log_dir={} version={}",
        settings.level,
        settings.dir.display(),
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        settings: settings.clone(),
        _handle: handle,
    })
}

fn absolute_dir(dir: &Path) -> Result<PathBuf, LoggingError> {
    if dir.is_absolute() {
        Ok(dir.to_path_buf())
    } else {
        Err(LoggingError::RelativeDir(dir.to_path_buf()))
    }
}

// Runs once: only the first successful `start` reaches it.
fn route_panics_to_log() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let location = panic.location().map_or_else(
            || "unknown".to_string(),
            |loc| format!("{}:{}", loc.file(), loc.line()),
        );
        error!(
            "event=panic module=logging status=error location={location} payload={}",
            panic_summary(panic)
        );
        previous(panic);
    }));
}

// Panic text may quote employee data.
fn panic_summary(panic: &PanicHookInfo<'_>) -> String {
    let payload = panic.payload();
    let text = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");
    one_line(text, PANIC_PAYLOAD_LIMIT)
}

fn one_line(text: &str, limit: usize) -> String {
    let mut line: String = text
        .chars()
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .take(limit)
        .collect();
    if text.chars().count() > limit {
        line.push_str("...");
    }
    line
}
