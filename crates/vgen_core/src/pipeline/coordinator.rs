//! Public entry point for generating a video.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use super::cancel::CancelHandle;
use super::errors::{GenerationError, RunnerResult};
use super::output::{OutputPathProvider, TimestampedOutputPaths};
use crate::model_state::{ModelManager, ModelProvider};
use crate::models::{GenerationRequest, GenerationResult, ProgressEvent, ProgressListener};
use crate::runner::{ProcessRequest, ProcessRunner, PythonRunner, RunnerConfig};

/// Message returned when a generation is requested while another runs.
pub const BUSY_MESSAGE: &str = "A video generation is already in progress";

/// Coordinates model state, output naming and the process runner.
///
/// At most one generation runs at a time per instance; an overlapping call
/// fails immediately with [`BUSY_MESSAGE`].
pub struct GenerationPipeline {
    models: Arc<dyn ModelProvider>,
    runner: Arc<dyn ProcessRunner>,
    outputs: Arc<dyn OutputPathProvider>,
    listener: Mutex<Option<ProgressListener>>,
    in_flight: AtomicBool,
}

impl GenerationPipeline {
    pub fn new(
        models: Arc<dyn ModelProvider>,
        runner: Arc<dyn ProcessRunner>,
        outputs: Arc<dyn OutputPathProvider>,
    ) -> Self {
        Self {
            models,
            runner,
            outputs,
            listener: Mutex::new(None),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Pipeline with a [`ModelManager`], a [`PythonRunner`] and timestamped output names.
    pub fn with_runner_config(config: RunnerConfig) -> Self {
        Self::new(
            Arc::new(ModelManager::new()),
            Arc::new(PythonRunner::new(config)),
            Arc::new(TimestampedOutputPaths::new()),
        )
    }

    /// Install the progress listener, replacing any previous one.
    ///
    /// A generation already running keeps the listener it started with.
    pub fn set_progress_listener(&self, listener: ProgressListener) {
        *self.listener.lock() = Some(listener);
    }

    pub fn clear_progress_listener(&self) {
        *self.listener.lock() = None;
    }

    pub fn is_model_loaded(&self) -> bool {
        self.models.is_loaded()
    }

    /// Load a model. Failures are logged and reported as `false`.
    pub fn load_model(&self, path: &Path) -> bool {
        self.models.load(path)
    }

    /// Whether a generation is currently running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Generate a video. Never fails: every error becomes a failed result.
    pub async fn generate_video(
        &self,
        request: &GenerationRequest,
        cancel: &CancelHandle,
    ) -> GenerationResult {
        let started = Instant::now();

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::warn!("Rejected generation request: another generation is running");
            return GenerationResult::failure(BUSY_MESSAGE);
        };

        match self.run(request, cancel, started).await {
            Ok(result) => {
                tracing::info!(
                    "Video generated in {:.1}s: {}",
                    result.processing_time().as_secs_f64(),
                    result.video_path().map(|p| p.display().to_string()).unwrap_or_default()
                );
                result
            }
            Err(e) => {
                if e.is_cancelled() {
                    tracing::warn!("Video generation was cancelled");
                } else {
                    tracing::error!("Video generation failed: {}", e);
                }
                GenerationResult::failure(e.user_message())
            }
        }
    }

    async fn run(
        &self,
        request: &GenerationRequest,
        cancel: &CancelHandle,
        started: Instant,
    ) -> RunnerResult<GenerationResult> {
        if !self.models.is_loaded() {
            return Err(GenerationError::ModelNotLoaded);
        }

        let output_path = self.outputs.output_path(request.output_dir())?;
        let model_path = self.models.model_path()?;
        let process_request = ProcessRequest::from_request(request, model_path, &output_path);

        tracing::info!(
            "Starting {} generation, output: {}",
            process_request.mode(),
            output_path.display()
        );

        if cancel.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }

        let listener = self.listener.lock().clone();
        let forward = move |event: &ProgressEvent| {
            if let Some(listener) = &listener {
                listener(event);
            }
        };
        self.runner
            .execute(&process_request, cancel, &forward)
            .await?;

        let size = match tokio::fs::metadata(&output_path).await {
            Ok(metadata) if metadata.is_file() => metadata.len(),
            _ => return Err(GenerationError::OutputMissing(output_path)),
        };

        Ok(GenerationResult::success(
            output_path,
            request.prompt(),
            started.elapsed(),
            size,
        ))
    }
}

/// Clears the in-flight flag when dropped.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_state::{ModelError, ModelResult};
    use crate::models::ProgressSink;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};
    use tokio::sync::Notify;

    struct FakeModels {
        loaded: bool,
    }

    impl ModelProvider for FakeModels {
        fn is_loaded(&self) -> bool {
            self.loaded
        }

        fn load(&self, _path: &Path) -> bool {
            false
        }

        fn model_path(&self) -> ModelResult<PathBuf> {
            if self.loaded {
                Ok(PathBuf::from("/models/ltx"))
            } else {
                Err(ModelError::NotLoaded)
            }
        }
    }

    struct FixedOutput {
        path: PathBuf,
        calls: AtomicUsize,
    }

    impl OutputPathProvider for FixedOutput {
        fn output_path(&self, _dir: Option<&Path>) -> RunnerResult<PathBuf> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.path.clone())
        }
    }

    enum Behavior {
        WriteOutput(&'static [u8]),
        SucceedWithoutOutput,
        Exit(i32, &'static str),
        WaitForCancel,
        WaitForRelease(Arc<Notify>),
    }

    struct FakeRunner {
        behavior: Behavior,
        calls: AtomicUsize,
        last_request: Mutex<Option<ProcessRequest>>,
    }

    impl FakeRunner {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl ProcessRunner for FakeRunner {
        async fn execute(
            &self,
            request: &ProcessRequest,
            cancel: &CancelHandle,
            on_progress: &ProgressSink,
        ) -> RunnerResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock() = Some(request.clone());
            on_progress(&ProgressEvent::new(0, request.steps, "Starting generation..."));

            match &self.behavior {
                Behavior::WriteOutput(bytes) => {
                    std::fs::write(&request.output_path, bytes).unwrap();
                    on_progress(&ProgressEvent::new(
                        request.steps,
                        request.steps,
                        "Generation completed!",
                    ));
                    Ok(())
                }
                Behavior::SucceedWithoutOutput => Ok(()),
                Behavior::Exit(code, stderr) => Err(GenerationError::process_exit(*code, *stderr)),
                Behavior::WaitForCancel => {
                    cancel.cancelled().await;
                    Err(GenerationError::Cancelled)
                }
                Behavior::WaitForRelease(notify) => {
                    notify.notified().await;
                    Err(GenerationError::unexpected("released"))
                }
            }
        }
    }

    struct Harness {
        _dir: TempDir,
        output: PathBuf,
        outputs: Arc<FixedOutput>,
        runner: Arc<FakeRunner>,
        pipeline: Arc<GenerationPipeline>,
    }

    fn harness(loaded: bool, behavior: Behavior) -> Harness {
        let dir = tempdir().unwrap();
        let output = dir.path().join("video.mp4");
        let outputs = Arc::new(FixedOutput {
            path: output.clone(),
            calls: AtomicUsize::new(0),
        });
        let runner = FakeRunner::new(behavior);
        let pipeline = Arc::new(GenerationPipeline::new(
            Arc::new(FakeModels { loaded }),
            runner.clone(),
            outputs.clone(),
        ));
        Harness {
            _dir: dir,
            output,
            outputs,
            runner,
            pipeline,
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::builder("a paper boat in the rain")
            .steps(10)
            .build()
            .unwrap()
    }

    fn record(pipeline: &GenerationPipeline) -> Arc<Mutex<Vec<ProgressEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        pipeline.set_progress_listener(Arc::new(move |e: &ProgressEvent| {
            sink.lock().push(e.clone())
        }));
        events
    }

    #[tokio::test]
    async fn unloaded_model_is_rejected_without_side_effects() {
        let h = harness(false, Behavior::WriteOutput(b"x"));

        let result = h.pipeline.generate_video(&request(), &CancelHandle::new()).await;

        assert!(!result.is_success());
        assert!(result.error_message().unwrap().contains("Model is not loaded"));
        assert_eq!(h.runner.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.outputs.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn success_reports_real_file_size_and_forwards_events() {
        let h = harness(true, Behavior::WriteOutput(b"0123456789"));
        let events = record(&h.pipeline);

        let result = h.pipeline.generate_video(&request(), &CancelHandle::new()).await;

        assert!(result.is_success(), "{:?}", result.error_message());
        assert_eq!(result.video_path(), Some(h.output.as_path()));
        assert_eq!(result.file_size_bytes(), 10);
        assert_eq!(result.prompt(), Some("a paper boat in the rain"));

        let events = events.lock();
        assert_eq!(
            *events,
            vec![
                ProgressEvent::new(0, 10, "Starting generation..."),
                ProgressEvent::new(10, 10, "Generation completed!"),
            ]
        );

        let sent = h.runner.last_request.lock().clone().unwrap();
        assert_eq!(sent.model_path, PathBuf::from("/models/ltx"));
        assert_eq!(sent.output_path, h.output);
        assert!(sent.input_image.is_none());
    }

    #[tokio::test]
    async fn missing_output_is_failure_despite_success() {
        let h = harness(true, Behavior::SucceedWithoutOutput);
        let result = h.pipeline.generate_video(&request(), &CancelHandle::new()).await;
        assert_eq!(result.error_message(), Some("Generated video file not found"));
    }

    #[tokio::test]
    async fn process_failure_message_includes_exit_details() {
        let h = harness(true, Behavior::Exit(2, "torch not installed"));
        let result = h.pipeline.generate_video(&request(), &CancelHandle::new()).await;

        let message = result.error_message().unwrap();
        assert!(message.starts_with("Error during video generation:"));
        assert!(message.contains("code 2"));
        assert!(message.contains("torch not installed"));
    }

    #[tokio::test]
    async fn cancellation_during_run_is_distinguished() {
        let h = harness(true, Behavior::WaitForCancel);
        let cancel = CancelHandle::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = h.pipeline.generate_video(&request(), &cancel).await;
        assert_eq!(result.error_message(), Some("Video generation was cancelled"));
    }

    #[tokio::test]
    async fn cancellation_before_start_skips_runner() {
        let h = harness(true, Behavior::WriteOutput(b"x"));
        let cancel = CancelHandle::new();
        cancel.cancel();

        let result = h.pipeline.generate_video(&request(), &cancel).await;
        assert!(result.error_message().unwrap().contains("cancelled"));
        assert_eq!(h.runner.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn overlapping_call_is_rejected_then_flag_is_released() {
        let notify = Arc::new(Notify::new());
        let h = harness(true, Behavior::WaitForRelease(notify.clone()));

        let pipeline = h.pipeline.clone();
        let first = tokio::spawn(async move {
            pipeline
                .generate_video(&request(), &CancelHandle::new())
                .await
        });

        while h.runner.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        assert!(h.pipeline.is_busy());

        let second = h.pipeline.generate_video(&request(), &CancelHandle::new()).await;
        assert_eq!(second.error_message(), Some(BUSY_MESSAGE));
        assert_eq!(h.runner.calls.load(Ordering::SeqCst), 1);

        notify.notify_one();
        let first = first.await.unwrap();
        assert!(first.error_message().unwrap().contains("released"));
        assert!(!h.pipeline.is_busy());
    }

    #[tokio::test]
    async fn cleared_listener_receives_nothing() {
        let h = harness(true, Behavior::WriteOutput(b"x"));
        let events = record(&h.pipeline);
        h.pipeline.clear_progress_listener();

        let result = h.pipeline.generate_video(&request(), &CancelHandle::new()).await;
        assert!(result.is_success());
        assert!(events.lock().is_empty());
    }

    #[tokio::test]
    async fn input_image_is_passed_through() {
        let h = harness(true, Behavior::WriteOutput(b"x"));
        let request = GenerationRequest::builder("animate this")
            .input_image("/images/start.png")
            .build()
            .unwrap();

        h.pipeline.generate_video(&request, &CancelHandle::new()).await;

        let sent = h.runner.last_request.lock().clone().unwrap();
        assert_eq!(sent.input_image, Some(PathBuf::from("/images/start.png")));
    }

    #[tokio::test]
    async fn default_pipeline_starts_unloaded() {
        let pipeline = GenerationPipeline::with_runner_config(RunnerConfig::default());
        assert!(!pipeline.is_model_loaded());
        assert!(!pipeline.load_model(Path::new("")));

        let result = pipeline.generate_video(&request(), &CancelHandle::new()).await;
        assert!(result.error_message().unwrap().contains("Model is not loaded"));
    }
}
