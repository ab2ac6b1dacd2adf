//! Generator process supervision.

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use chrono::Local;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use uuid::Uuid;

use super::config::RunnerConfig;
use super::request::ProcessRequest;
use super::request_file::RequestFile;
use super::script::resolve_script;
use crate::logging::{GenerationLogger, LogLineCallback};
use crate::models::{ProgressEvent, ProgressSink};
use crate::pipeline::{CancelHandle, GenerationError, RunnerResult};
use crate::progress::ProgressParser;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Executes one generation request in an external process.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `request` to completion, reporting progress to `on_progress`.
    ///
    /// Returns `Err(GenerationError::Cancelled)` when `cancel` fires first.
    async fn execute(
        &self,
        request: &ProcessRequest,
        cancel: &CancelHandle,
        on_progress: &ProgressSink,
    ) -> RunnerResult<()>;
}

/// Runs `<interpreter> "<script>" "<request file>"` from the script directory.
#[derive(Debug, Clone, Default)]
pub struct PythonRunner {
    config: RunnerConfig,
}

impl PythonRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    fn attempt_logger(&self) -> GenerationLogger {
        let name = format!(
            "generation_{}_{}",
            Local::now().format("%Y%m%d_%H%M%S"),
            &Uuid::new_v4().simple().to_string()[..8]
        );
        let config = self.config.log_config.clone();

        let logger = match &self.config.logs_dir {
            Some(dir) => GenerationLogger::new(&name, dir, config.clone(), None).unwrap_or_else(|e| {
                tracing::warn!("Cannot create log file in {}: {}", dir.display(), e);
                GenerationLogger::detached(&name, config, None)
            }),
            None => GenerationLogger::detached(&name, config, None),
        };

        match self.config.output_mirror.clone() {
            Some(mirror) => {
                let callback: LogLineCallback = Box::new(move |line| mirror(line));
                logger.with_callback(callback)
            }
            None => logger,
        }
    }

    async fn run_process(
        &self,
        script: &Path,
        request_file: &RequestFile,
        request: &ProcessRequest,
        cancel: &CancelHandle,
        on_progress: &ProgressSink,
        logger: &GenerationLogger,
    ) -> RunnerResult<()> {
        on_progress(&ProgressEvent::new(0, request.steps, "Starting generation..."));

        let mut cmd = Command::new(&self.config.interpreter);
        cmd.arg(script)
            .arg(request_file.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = script.parent().filter(|d| !d.as_os_str().is_empty()) {
            cmd.current_dir(dir);
        }
        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);

        logger.command(&format!(
            "{} \"{}\" \"{}\"",
            self.config.interpreter,
            script.display(),
            request_file.path().display()
        ));

        let mut child = cmd
            .spawn()
            .map_err(|e| GenerationError::process_start(&self.config.interpreter, e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| GenerationError::unexpected("child stdout was not captured"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| GenerationError::unexpected("child stderr was not captured"))?;

        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf).await.map(|_| buf)
        });

        let mut parser = ProgressParser::new(request.steps);
        let outcome = tokio::select! {
            status = drive(&mut child, stdout, &mut parser, logger, on_progress) => Some(status),
            _ = cancel.cancelled() => None,
        };

        let status = match outcome {
            Some(status) => status,
            None => {
                logger.warn("Cancellation requested, terminating generator process");
                if let Err(e) = child.kill().await {
                    tracing::warn!("Failed to terminate generator process: {}", e);
                }
                stderr_task.abort();
                return Err(GenerationError::Cancelled);
            }
        };

        let stderr = match stderr_task.await {
            Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
            Ok(Err(e)) => {
                tracing::warn!("Failed to read generator stderr: {}", e);
                String::new()
            }
            Err(e) => {
                tracing::warn!("Stderr reader task failed: {}", e);
                String::new()
            }
        };
        for line in stderr.lines() {
            logger.output_line(line, true);
        }

        let status = status?;
        if status.success() {
            on_progress(&ProgressEvent::new(
                request.steps,
                request.steps,
                "Generation completed!",
            ));
            Ok(())
        } else {
            let code = status.code().unwrap_or(-1);
            Err(GenerationError::process_exit(code, stderr))
        }
    }
}

#[async_trait]
impl ProcessRunner for PythonRunner {
    async fn execute(
        &self,
        request: &ProcessRequest,
        cancel: &CancelHandle,
        on_progress: &ProgressSink,
    ) -> RunnerResult<()> {
        let script = resolve_script(&self.config.script_path)?;
        if cancel.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }

        let logger = self.attempt_logger();
        logger.phase(&format!("Generate ({})", request.mode()));
        tracing::info!(
            "Starting {} generation: {} steps, {}x{} @ {} fps",
            request.mode(),
            request.steps,
            request.width,
            request.height,
            request.fps
        );

        let request_file = RequestFile::write(&self.config.request_dir, request).await?;
        let result = self
            .run_process(&script, &request_file, request, cancel, on_progress, &logger)
            .await;
        request_file.remove().await;

        match &result {
            Ok(()) => logger.success("Generation completed!"),
            Err(GenerationError::Cancelled) => logger.warn("Generation cancelled"),
            Err(e) => {
                logger.error(&e.to_string());
                logger.show_tail("generator output");
            }
        }
        logger.close();
        result
    }
}

/// Read stdout to EOF, forwarding progress, then wait for exit.
async fn drive(
    child: &mut Child,
    stdout: ChildStdout,
    parser: &mut ProgressParser,
    logger: &GenerationLogger,
    on_progress: &ProgressSink,
) -> RunnerResult<ExitStatus> {
    let mut reader = BufReader::new(stdout);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(|e| GenerationError::io("reading generator output", e))?;
        if read == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\r', '\n']);
        logger.output_line(line, false);

        if let Some(event) = parser.parse_line(line) {
            logger.progress(event.percentage().clamp(0.0, 100.0) as u32);
            on_progress(&event);
        }
    }

    child
        .wait()
        .await
        .map_err(|e| GenerationError::io("waiting for generator process", e))
}
