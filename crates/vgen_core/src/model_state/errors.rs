use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from model path validation and lookup.
#[derive(Error, Debug)]
pub enum ModelError {
    /// An empty or whitespace-only path was supplied.
    #[error("Model path must not be empty")]
    EmptyPath,

    /// Neither a file nor a directory exists at the path.
    #[error("Model path not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The path exists but could not be inspected.
    #[error("Cannot access model path {}: {source}", path.display())]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The model path was requested while nothing is loaded.
    #[error("Model is not loaded. Please load a model first.")]
    NotLoaded,
}

/// Result type for model state operations.
pub type ModelResult<T> = Result<T, ModelError>;
