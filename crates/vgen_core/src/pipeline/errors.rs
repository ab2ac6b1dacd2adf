//! Error types for a generation attempt.
//!
//! Every variant is converted into a [`GenerationResult`] failure by the
//! pipeline; none escapes `generate_video`.
//!
//! [`GenerationResult`]: crate::models::GenerationResult

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::model_state::ModelError;

/// Failure of one generation attempt.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// A request field is out of bounds.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Generation was attempted before a model was loaded.
    #[error("Model is not loaded. Please load the model first.")]
    ModelNotLoaded,

    /// The directory expected to hold the generator script is missing.
    #[error("Script directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// The generator script is missing.
    #[error("Generator script not found: {}", .0.display())]
    ScriptNotFound(PathBuf),

    /// The request file could not be written.
    #[error("Failed to write request file {}: {source}", path.display())]
    RequestFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The request could not be serialized.
    #[error("Failed to serialize request: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The child process could not be spawned.
    #[error("Failed to start {program}: {source}")]
    ProcessStart {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The child process exited with a nonzero code. `stderr` is verbatim.
    #[error("Generation process exited with code {code}: {}", .stderr.trim())]
    ProcessExit { code: i32, stderr: String },

    /// Cancellation was observed.
    #[error("Video generation was cancelled")]
    Cancelled,

    /// The process succeeded but left no output file.
    #[error("Generated video file not found: {}", .0.display())]
    OutputMissing(PathBuf),

    /// Other file I/O failure.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// Anything else.
    #[error("{0}")]
    Unexpected(String),
}

impl GenerationError {
    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a request file error.
    pub fn request_file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::RequestFile {
            path: path.into(),
            source,
        }
    }

    /// Create a process start error.
    pub fn process_start(program: impl Into<String>, source: io::Error) -> Self {
        Self::ProcessStart {
            program: program.into(),
            source,
        }
    }

    /// Create a process exit error.
    pub fn process_exit(code: i32, stderr: impl Into<String>) -> Self {
        Self::ProcessExit {
            code,
            stderr: stderr.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create an unexpected error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Whether this error is the result of cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Message placed in a failed [`GenerationResult`].
    ///
    /// [`GenerationResult`]: crate::models::GenerationResult
    pub fn user_message(&self) -> String {
        match self {
            Self::ModelNotLoaded | Self::Cancelled => self.to_string(),
            Self::OutputMissing(_) => "Generated video file not found".to_string(),
            other => format!("Error during video generation: {}", other),
        }
    }
}

impl From<ModelError> for GenerationError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::NotLoaded => Self::ModelNotLoaded,
            other => Self::Unexpected(other.to_string()),
        }
    }
}

/// Result type for runner and pipeline operations.
pub type RunnerResult<T> = Result<T, GenerationError>;
