//! Data models for Video Generator.
//!
//! This module contains the values that flow through a generation attempt:
//! - The validated request a caller submits
//! - Progress events derived from the child process output
//! - The final, immutable result of one attempt

mod progress;
mod request;
mod result;

pub use progress::{ProgressEvent, ProgressListener, ProgressSink};
pub use request::{limits, GenerationRequest, GenerationRequestBuilder};
pub use result::GenerationResult;
