//! VGen Core - Backend logic for Video Generator
//!
//! This crate drives an external generation process and turns its text
//! output into structured progress. It has zero UI dependencies and can be
//! used by a GUI host or the bundled CLI.
//!
//! # Architecture
//!
//! ```text
//! GenerationPipeline
//!     ├── ModelManager        (model_state)
//!     ├── OutputPathProvider  (pipeline::output)
//!     └── PythonRunner        (runner)
//!             └── ProgressParser (progress)
//! ```

pub mod config;
pub mod logging;
pub mod model_state;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod runner;

pub use model_state::{ModelError, ModelManager, ModelProvider};
pub use models::{
    GenerationRequest, GenerationRequestBuilder, GenerationResult, ProgressEvent, ProgressListener,
    ProgressSink,
};
pub use pipeline::{CancelHandle, GenerationError, GenerationPipeline};
pub use runner::{ProcessRequest, ProcessRunner, PythonRunner, RunnerConfig};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
