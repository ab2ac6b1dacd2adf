//! Thread-safe model state manager.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::errors::{ModelError, ModelResult};

/// Manifest file expected inside a model directory.
pub const MODEL_MANIFEST: &str = "model_index.json";

/// Capability the generation pipeline needs from the model state.
pub trait ModelProvider: Send + Sync {
    /// Whether a model is currently loaded.
    fn is_loaded(&self) -> bool;

    /// Validate and record a model path.
    ///
    /// Returns `false` on any failure; the reason is logged.
    fn load(&self, path: &Path) -> bool;

    /// Path of the loaded model.
    ///
    /// Fails with [`ModelError::NotLoaded`] when nothing is loaded.
    fn model_path(&self) -> ModelResult<PathBuf>;
}

#[derive(Debug, Default)]
struct ModelState {
    loaded: bool,
    path: Option<PathBuf>,
}

/// Tracks the loaded model behind a single lock.
///
/// Path validation touches the filesystem before the lock is taken, so
/// `is_loaded` never waits on I/O. The commit point of a load is the one
/// locked write that sets the loaded flag and path together; readers see
/// either the previous state or the new one, never a mix. Two racing loads
/// are ordered by that write, so the last committed path wins.
///
/// Stored paths are absolute, resolved against the current directory at
/// load time.
#[derive(Debug, Default)]
pub struct ModelManager {
    state: Mutex<ModelState>,
}

impl ModelManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a model, reporting why it failed.
    ///
    /// An empty path is rejected before any state is touched. Any other
    /// failure leaves the manager unloaded.
    pub fn try_load(&self, path: &Path) -> ModelResult<()> {
        if path.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(ModelError::EmptyPath);
        }

        match resolve_model_path(path) {
            Ok(path) => {
                let mut state = self.state.lock();
                state.path = Some(path.clone());
                state.loaded = true;
                tracing::info!("Model loaded successfully from: {}", path.display());
                Ok(())
            }
            Err(e) => {
                let mut state = self.state.lock();
                state.path = None;
                state.loaded = false;
                Err(e)
            }
        }
    }
}

impl ModelProvider for ModelManager {
    fn is_loaded(&self) -> bool {
        self.state.lock().loaded
    }

    fn load(&self, path: &Path) -> bool {
        match self.try_load(path) {
            Ok(()) => true,
            Err(ModelError::EmptyPath) => {
                tracing::error!("Refusing to load model: path is empty");
                false
            }
            Err(e) => {
                tracing::error!("Model path validation failed: {}", e);
                false
            }
        }
    }

    fn model_path(&self) -> ModelResult<PathBuf> {
        let state = self.state.lock();
        match (&state.path, state.loaded) {
            (Some(path), true) => Ok(path.clone()),
            _ => Err(ModelError::NotLoaded),
        }
    }
}

/// Make `path` absolute and validate it.
fn resolve_model_path(path: &Path) -> ModelResult<PathBuf> {
    let path = std::path::absolute(path).map_err(|source| ModelError::Inaccessible {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Attempting to load model from: {}", path.display());
    validate_model_path(&path)?;
    Ok(path)
}

/// Check that `path` is an existing file or directory.
///
/// A directory without [`MODEL_MANIFEST`] is accepted with a warning.
fn validate_model_path(path: &Path) -> ModelResult<()> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(ModelError::Inaccessible {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if metadata.is_dir() && !path.join(MODEL_MANIFEST).is_file() {
        tracing::warn!(
            "Directory does not contain {}: {}",
            MODEL_MANIFEST,
            path.display()
        );
    }

    Ok(())
}
