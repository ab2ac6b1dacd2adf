//! Generation pipeline coordinator.
//!
//! One call to [`GenerationPipeline::generate_video`] moves through:
//!
//! ```text
//! Idle ─► CheckingModel ─┬─► Rejected
//!                        └─► Running ─┬─► Succeeded
//!                                     ├─► Failed
//!                                     └─► Cancelled
//! ```
//!
//! No state is retried automatically. Every terminal state is reported as a
//! [`GenerationResult`](crate::models::GenerationResult).
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use vgen_core::pipeline::{CancelHandle, GenerationPipeline};
//! use vgen_core::runner::RunnerConfig;
//! use vgen_core::GenerationRequest;
//!
//! # async fn demo() -> Result<(), vgen_core::GenerationError> {
//! let pipeline = GenerationPipeline::with_runner_config(RunnerConfig::default());
//! pipeline.load_model(Path::new("/models/ltx-video"));
//!
//! let request = GenerationRequest::builder("a fox running through snow").build()?;
//! let result = pipeline.generate_video(&request, &CancelHandle::new()).await;
//! println!("success: {}", result.is_success());
//! # Ok(())
//! # }
//! ```

mod cancel;
mod coordinator;
mod errors;
mod output;

pub use cancel::CancelHandle;
pub use coordinator::{GenerationPipeline, BUSY_MESSAGE};
pub use errors::{GenerationError, RunnerResult};
pub use output::{OutputPathProvider, TimestampedOutputPaths, VIDEO_EXTENSION};
