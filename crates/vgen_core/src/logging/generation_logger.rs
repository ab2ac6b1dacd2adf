//! Per-attempt logger with file and callback output.
//!
//! Each generation attempt gets its own logger that:
//! - Writes to a dedicated log file (when a logs folder is configured)
//! - Mirrors lines to a host callback (if provided)
//! - Filters progress and child output in compact mode
//! - Keeps a tail of child output for failure reports

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LogConfig, LogLevel, LogLineCallback, MessagePrefix};

/// Logger for one generation attempt.
pub struct GenerationLogger {
    name: String,
    log_path: Option<PathBuf>,
    file_writer: Mutex<Option<BufWriter<File>>>,
    callback: Option<LogLineCallback>,
    config: LogConfig,
    tail_buffer: Mutex<VecDeque<String>>,
    last_progress: Mutex<Option<u32>>,
}

impl GenerationLogger {
    /// Create a logger writing `<log_dir>/<name>.log`.
    pub fn new(
        name: impl Into<String>,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
        callback: Option<LogLineCallback>,
    ) -> std::io::Result<Self> {
        let name = name.into();
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)?;

        let log_path = log_dir.join(format!("{}.log", sanitize_filename(&name)));
        let file = File::create(&log_path)?;

        let mut logger = Self::detached(name, config, callback);
        logger.log_path = Some(log_path);
        logger.file_writer = Mutex::new(Some(BufWriter::new(file)));
        Ok(logger)
    }

    /// Create a logger without a file; only the callback and tail are fed.
    pub fn detached(
        name: impl Into<String>,
        config: LogConfig,
        callback: Option<LogLineCallback>,
    ) -> Self {
        let tail_capacity = config.error_tail;
        Self {
            name: name.into(),
            log_path: None,
            file_writer: Mutex::new(None),
            callback,
            config,
            tail_buffer: Mutex::new(VecDeque::with_capacity(tail_capacity)),
            last_progress: Mutex::new(None),
        }
    }

    /// Mirror every written line to `callback`.
    pub fn with_callback(mut self, callback: LogLineCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the log file, if one was opened.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Log a message at the specified level.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.config.level {
            return;
        }
        let formatted = self.format_message(message);
        self.output(&formatted);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, &MessagePrefix::Warning.format(message));
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, &MessagePrefix::Error.format(message));
    }

    /// Log the command line being executed.
    pub fn command(&self, command: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Command.format(command));
    }

    pub fn phase(&self, phase_name: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Phase.format(phase_name));
    }

    pub fn success(&self, message: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Success.format(message));
    }

    /// Log a progress percentage.
    ///
    /// In compact mode only crossings of `progress_step` boundaries and
    /// 100% are written. Returns whether the value was logged.
    pub fn progress(&self, percent: u32) -> bool {
        if self.config.compact {
            let step = self.config.progress_step.max(1);
            let mut last = self.last_progress.lock();
            if let Some(previous) = *last {
                let crossed = percent / step > previous / step;
                if !crossed && !(percent >= 100 && previous < 100) {
                    return false;
                }
            }
            *last = Some(percent);
        }

        self.log(LogLevel::Info, &format!("Progress: {}%", percent));
        true
    }

    /// Record one line of child output.
    ///
    /// Always kept in the tail buffer; written out only when not compact.
    pub fn output_line(&self, line: &str, is_stderr: bool) {
        {
            let mut buffer = self.tail_buffer.lock();
            if self.config.error_tail > 0 {
                if buffer.len() >= self.config.error_tail {
                    buffer.pop_front();
                }
                buffer.push_back(line.to_string());
            }
        }

        if self.config.compact {
            return;
        }

        let prefix = if is_stderr { "[stderr] " } else { "" };
        self.output(&self.format_message(&format!("{}{}", prefix, line)));
    }

    /// Write the tail buffer under a header, typically after a failure.
    pub fn show_tail(&self, header: &str) {
        let buffer = self.tail_buffer.lock();
        if buffer.is_empty() {
            return;
        }

        self.output(&self.format_message(&format!("[{}/tail]", header)));
        for line in buffer.iter() {
            self.output(&self.format_message(line));
        }
    }

    pub fn get_tail(&self) -> Vec<String> {
        self.tail_buffer.lock().iter().cloned().collect()
    }

    pub fn flush(&self) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writer.flush();
        }
    }

    /// Flush and close the log file.
    pub fn close(&self) {
        self.flush();
        *self.file_writer.lock() = None;
    }

    fn format_message(&self, message: &str) -> String {
        if self.config.show_timestamps {
            format!("[{}] {}", Local::now().format("%H:%M:%S"), message)
        } else {
            message.to_string()
        }
    }

    fn output(&self, formatted: &str) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writeln!(writer, "{}", formatted);
        }
        if let Some(ref callback) = self.callback {
            callback(formatted);
        }
    }
}

impl Drop for GenerationLogger {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for GenerationLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationLogger")
            .field("name", &self.name)
            .field("log_path", &self.log_path)
            .finish_non_exhaustive()
    }
}

/// Replace characters that are not allowed in file names.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn quiet_config() -> LogConfig {
        LogConfig {
            show_timestamps: false,
            ..LogConfig::default()
        }
    }

    #[test]
    fn creates_log_file_and_writes() {
        let dir = tempdir().unwrap();
        let logger = GenerationLogger::new("gen_1", dir.path(), quiet_config(), None).unwrap();

        logger.command("python gen.py request.json");
        logger.flush();

        let path = logger.log_path().unwrap().to_path_buf();
        assert!(path.ends_with("gen_1.log"));
        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("$ python gen.py request.json"));
    }

    #[test]
    fn detached_logger_feeds_callback_only() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let callback: LogLineCallback = Box::new(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let logger = GenerationLogger::detached("gen", quiet_config(), Some(callback));
        logger.info("one");
        logger.debug("filtered by level");
        logger.warn("two");

        assert!(logger.log_path().is_none());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn compact_mode_filters_progress() {
        let logger = GenerationLogger::detached("gen", quiet_config(), None);

        assert!(logger.progress(0));
        assert!(!logger.progress(5));
        assert!(!logger.progress(19));
        assert!(logger.progress(20));
        assert!(!logger.progress(25));
        assert!(logger.progress(41));
        assert!(logger.progress(100));
        assert!(!logger.progress(100));
    }

    #[test]
    fn verbose_mode_logs_every_progress() {
        let logger = GenerationLogger::detached("gen", LogConfig::debug(), None);
        assert!(logger.progress(1));
        assert!(logger.progress(2));
    }

    #[test]
    fn tail_buffer_maintains_limit() {
        let config = LogConfig {
            error_tail: 3,
            ..quiet_config()
        };
        let logger = GenerationLogger::detached("gen", config, None);

        for i in 0..6 {
            logger.output_line(&format!("Line {}", i), false);
        }

        assert_eq!(logger.get_tail(), vec!["Line 3", "Line 4", "Line 5"]);
    }

    #[test]
    fn non_compact_writes_child_output() {
        let dir = tempdir().unwrap();
        let config = LogConfig {
            compact: false,
            ..quiet_config()
        };
        let logger = GenerationLogger::new("gen", dir.path(), config, None).unwrap();
        logger.output_line("Traceback (most recent call last):", true);
        logger.close();

        let content = fs::read_to_string(logger.log_path().unwrap()).unwrap();
        assert!(content.contains("[stderr] Traceback"));
    }

    #[test]
    fn sanitizes_filename() {
        assert_eq!(sanitize_filename("normal_name"), "normal_name");
        assert_eq!(sanitize_filename("has/slash"), "has_slash");
        assert_eq!(sanitize_filename("a<b>c"), "a_b_c");
    }
}
