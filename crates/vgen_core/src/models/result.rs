//! Final outcome of one generation attempt.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Result of a generation attempt.
///
/// Built only through [`GenerationResult::success`] or
/// [`GenerationResult::failure`] and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    success: bool,
    video_path: Option<PathBuf>,
    prompt: Option<String>,
    processing_time: Duration,
    file_size_bytes: u64,
    error_message: Option<String>,
}

impl GenerationResult {
    /// Create a successful result for a video that exists on disk.
    pub fn success(
        video_path: impl Into<PathBuf>,
        prompt: impl Into<String>,
        processing_time: Duration,
        file_size_bytes: u64,
    ) -> Self {
        Self {
            success: true,
            video_path: Some(video_path.into()),
            prompt: Some(prompt.into()),
            processing_time,
            file_size_bytes,
            error_message: None,
        }
    }

    /// Create a failed result with a message suitable for display.
    pub fn failure(error_message: impl Into<String>) -> Self {
        Self {
            success: false,
            video_path: None,
            prompt: None,
            processing_time: Duration::ZERO,
            file_size_bytes: 0,
            error_message: Some(error_message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn video_path(&self) -> Option<&Path> {
        self.video_path.as_deref()
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    /// Wall-clock time from the start of the call to completion.
    pub fn processing_time(&self) -> Duration {
        self.processing_time
    }

    pub fn file_size_bytes(&self) -> u64 {
        self.file_size_bytes
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_carries_file_details() {
        let result = GenerationResult::success(
            "/videos/out.mp4",
            "a lighthouse at dusk",
            Duration::from_secs(42),
            1024,
        );
        assert!(result.is_success());
        assert_eq!(result.video_path(), Some(Path::new("/videos/out.mp4")));
        assert_eq!(result.prompt(), Some("a lighthouse at dusk"));
        assert_eq!(result.file_size_bytes(), 1024);
        assert!(result.error_message().is_none());
    }

    #[test]
    fn failure_carries_only_message() {
        let result = GenerationResult::failure("Video generation was cancelled");
        assert!(!result.is_success());
        assert!(result.video_path().is_none());
        assert_eq!(result.error_message(), Some("Video generation was cancelled"));
        assert_eq!(result.processing_time(), Duration::ZERO);
    }
}
