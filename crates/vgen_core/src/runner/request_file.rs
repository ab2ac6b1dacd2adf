//! Temporary request file lifecycle.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::request::ProcessRequest;
use crate::pipeline::{GenerationError, RunnerResult};

/// A request written to disk for one process run.
#[derive(Debug)]
pub struct RequestFile {
    path: PathBuf,
}

impl RequestFile {
    /// Write `request` as indented JSON to a fresh file in `dir`.
    ///
    /// The returned path is absolute so it stays valid from the generator's
    /// working directory.
    pub async fn write(dir: &Path, request: &ProcessRequest) -> RunnerResult<Self> {
        let dir = std::path::absolute(dir)
            .map_err(|e| GenerationError::io("resolving request directory", e))?;
        let path = dir.join(format!("generation_request_{}.json", Uuid::new_v4().simple()));
        let json = serde_json::to_string_pretty(request)?;

        tokio::fs::write(&path, json)
            .await
            .map_err(|e| GenerationError::request_file(&path, e))?;

        tracing::debug!("Wrote request file {}", path.display());
        Ok(Self { path })
    }

    /// Read a request file back.
    pub async fn read(path: &Path) -> RunnerResult<ProcessRequest> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GenerationError::request_file(path, e))?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file. Failure is logged, never returned.
    pub async fn remove(self) {
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            tracing::warn!(
                "Failed to remove request file {}: {}",
                self.path.display(),
                e
            );
        }
    }
}
