//! Logging infrastructure for Video Generator.
//!
//! This module provides:
//! - Application-wide `tracing` subscriber setup, optionally with a rolling file
//! - Per-attempt loggers with file + callback output
//! - Compact mode with progress filtering
//! - Tail buffer of child output for failure reports
//!
//! # Example
//!
//! ```no_run
//! use vgen_core::logging::{GenerationLogger, LogConfig};
//!
//! let logger = GenerationLogger::new("generation_1", "/path/to/logs", LogConfig::default(), None)
//!     .unwrap();
//! logger.phase("Generate");
//! logger.command("python ltx_video_generator.py request.json");
//! logger.progress(50);
//! logger.success("Generation completed!");
//! ```

mod generation_logger;
mod types;

pub use generation_logger::GenerationLogger;
pub use types::{LogConfig, LogLevel, LogLineCallback, MessagePrefix};

use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG` and falls back to `default_level`. Output goes to
/// stderr. Call once at startup.
pub fn init_tracing(default_level: LogLevel) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(env_filter(default_level))
        .init();
}

/// Like [`init_tracing`], plus a daily-rolling `video-generator.log` in `dir`.
///
/// Keep the returned guard alive for the lifetime of the program or
/// buffered lines are lost.
pub fn init_tracing_with_file(default_level: LogLevel, dir: &Path) -> WorkerGuard {
    let appender = tracing_appender::rolling::daily(dir, "video-generator.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(env_filter(default_level))
        .init();

    guard
}

fn env_filter(default_level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.as_str()))
}

/// Install tracing for the application.
///
/// Writes the rolling log into `logs_dir` when it exists or can be created;
/// otherwise logs to stderr only. The guard, when returned, must be kept
/// alive until exit.
pub fn init_logging(default_level: LogLevel, logs_dir: &Path) -> Option<WorkerGuard> {
    match prepare_log_dir(logs_dir) {
        Ok(()) => Some(init_tracing_with_file(default_level, logs_dir)),
        Err(e) => {
            init_tracing(default_level);
            tracing::warn!(
                "Log folder {} unavailable ({}), logging to stderr only",
                logs_dir.display(),
                e
            );
            None
        }
    }
}

fn prepare_log_dir(dir: &Path) -> io::Result<()> {
    if dir.as_os_str().is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "no log folder configured"));
    }
    fs::create_dir_all(dir)
}
