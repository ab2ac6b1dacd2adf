use std::path::PathBuf;
use std::sync::Arc;

use crate::logging::LogConfig;

use super::script::default_script_path;

/// Shared sink for formatted attempt log lines.
pub type OutputMirror = Arc<dyn Fn(&str) + Send + Sync>;

/// How the generator process is launched.
#[derive(Clone)]
pub struct RunnerConfig {
    /// Interpreter executable, looked up on `PATH` when not absolute.
    pub interpreter: String,
    /// Generator script passed as the first argument.
    pub script_path: PathBuf,
    /// Directory receiving temporary request files.
    pub request_dir: PathBuf,
    /// Directory for per-attempt log files; `None` keeps logs in memory.
    pub logs_dir: Option<PathBuf>,
    pub log_config: LogConfig,
    /// Receives every line written to the attempt log.
    pub output_mirror: Option<OutputMirror>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            interpreter: "python".to_string(),
            script_path: default_script_path(),
            request_dir: std::env::temp_dir(),
            logs_dir: None,
            log_config: LogConfig::default(),
            output_mirror: None,
        }
    }
}

impl RunnerConfig {
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    pub fn with_script(mut self, script: impl Into<PathBuf>) -> Self {
        self.script_path = script.into();
        self
    }

    pub fn with_request_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.request_dir = dir.into();
        self
    }

    pub fn with_logs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.logs_dir = Some(dir.into());
        self
    }

    pub fn with_log_config(mut self, config: LogConfig) -> Self {
        self.log_config = config;
        self
    }

    pub fn with_output_mirror(mut self, mirror: OutputMirror) -> Self {
        self.output_mirror = Some(mirror);
        self
    }
}

impl std::fmt::Debug for RunnerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunnerConfig")
            .field("interpreter", &self.interpreter)
            .field("script_path", &self.script_path)
            .field("request_dir", &self.request_dir)
            .field("logs_dir", &self.logs_dir)
            .field("log_config", &self.log_config)
            .field("output_mirror", &self.output_mirror.is_some())
            .finish()
    }
}
