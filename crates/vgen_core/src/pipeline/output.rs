//! Output file naming.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use super::errors::{GenerationError, RunnerResult};

/// Container extension of generated videos.
pub const VIDEO_EXTENSION: &str = "mp4";

/// Chooses where a generated video is written.
pub trait OutputPathProvider: Send + Sync {
    /// Return an absolute path that does not exist yet, creating `dir` if
    /// needed.
    ///
    /// `None` or an empty path means the current directory. Relative
    /// directories resolve against the current directory of this process,
    /// not the generator's.
    fn output_path(&self, dir: Option<&Path>) -> RunnerResult<PathBuf>;
}

/// Names files `generated_video_<yyyyMMdd_HHmmss>.mp4`.
#[derive(Debug, Clone, Default)]
pub struct TimestampedOutputPaths;

impl TimestampedOutputPaths {
    pub fn new() -> Self {
        Self
    }
}

impl OutputPathProvider for TimestampedOutputPaths {
    fn output_path(&self, dir: Option<&Path>) -> RunnerResult<PathBuf> {
        let dir = match dir {
            Some(dir) if !dir.as_os_str().is_empty() => std::path::absolute(dir),
            _ => std::env::current_dir(),
        }
        .map_err(|e| GenerationError::io("resolving output directory", e))?;
        fs::create_dir_all(&dir)
            .map_err(|e| GenerationError::io(format!("creating {}", dir.display()), e))?;

        let stem = format!("generated_video_{}", Local::now().format("%Y%m%d_%H%M%S"));
        Ok(unique_path(&dir, &stem))
    }
}

/// `dir/stem.mp4`, or `dir/stem_<n>.mp4` for the first free `n`.
fn unique_path(dir: &Path, stem: &str) -> PathBuf {
    let candidate = dir.join(format!("{}.{}", stem, VIDEO_EXTENSION));
    if !candidate.exists() {
        return candidate;
    }
    (1u32..)
        .map(|n| dir.join(format!("{}_{}.{}", stem, n, VIDEO_EXTENSION)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_directory_and_uses_timestamp_name() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("videos").join("today");

        let path = TimestampedOutputPaths::new()
            .output_path(Some(&target))
            .unwrap();

        assert!(target.is_dir());
        assert_eq!(path.parent().unwrap(), target);
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("generated_video_"));
        assert!(name.ends_with(".mp4"));
        // generated_video_ + yyyyMMdd_HHmmss + .mp4
        assert_eq!(name.len(), "generated_video_".len() + 15 + 4);
    }

    #[test]
    fn existing_name_gets_numeric_suffix() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("clip.mp4"), b"").unwrap();
        fs::write(dir.path().join("clip_1.mp4"), b"").unwrap();

        assert_eq!(unique_path(dir.path(), "clip"), dir.path().join("clip_2.mp4"));
        assert_eq!(unique_path(dir.path(), "other"), dir.path().join("other.mp4"));
    }

    #[test]
    fn empty_dir_means_current_directory() {
        let cwd = std::env::current_dir().unwrap();
        for dir in [None, Some(Path::new(""))] {
            let path = TimestampedOutputPaths::new().output_path(dir).unwrap();
            assert!(path.is_absolute());
            assert_eq!(path.parent().unwrap(), cwd);
        }
    }
}
