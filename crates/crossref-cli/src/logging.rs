use std::env;
use std::path::Path;
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Analyzer crates log at `info`; dependencies only surface warnings.
const DEFAULT_FILTER: &str = "warn,crossref=info,crossref_core=info";
const DEFAULT_LOG_FILE: &str = "./logs/crossref.log";

/// Stdout plus a plain-text log file. `TRACING_LEVEL` replaces the filter and
/// `LOG_FILE_PATH` moves the file. When the log file cannot be created the
/// analysis still runs with stdout logging only, since the report artifacts
/// are the run's real output.
pub fn init_logger() -> Option<WorkerGuard> {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| DEFAULT_FILTER.to_string());
    let filter_layer = EnvFilter::new(filter);

    let log_file_path = env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let (file_layer, guard) = match open_log_file(Path::new(&log_file_path)) {
        Some(appender) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .pretty()
                .with_file(false)
                .without_time()
                .with_ansi(true),
        )
        .with(file_layer)
        .with(filter_layer)
        .init();

    debug!(log_file = %log_file_path, "Tracing is configured for stdout and file logging.");

    guard
}

fn open_log_file(path: &Path) -> Option<RollingFileAppender> {
    let file_name = path.file_name()?.to_string_lossy().into_owned();
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    match RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
    {
        Ok(appender) => Some(appender),
        Err(e) => {
            eprintln!("Log file {} unavailable ({}); logging to stdout only", path.display(), e);
            None
        }
    }
}
