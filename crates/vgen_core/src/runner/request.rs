//! Structured input handed to the generator process.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::models::GenerationRequest;

/// Which generator variant a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    TextToVideo,
    ImageToVideo,
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TextToVideo => write!(f, "text-to-video"),
            Self::ImageToVideo => write!(f, "image-to-video"),
        }
    }
}

/// Projection of a [`GenerationRequest`] plus resolved paths.
///
/// Paths are absolute: the generator runs from its script directory, not
/// from the current directory of this process.
///
/// Serialized with snake_case field names; `input_image` is omitted when
/// absent and `seed` is written as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub model_path: PathBuf,
    pub prompt: String,
    pub output_path: PathBuf,
    pub duration_seconds: u32,
    pub steps: u32,
    pub guidance_scale: f64,
    pub seed: Option<i64>,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_image: Option<PathBuf>,
}

impl ProcessRequest {
    /// Build from a validated request and the resolved model and output paths.
    pub fn from_request(
        request: &GenerationRequest,
        model_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            model_path: absolute_path(model_path.into()),
            prompt: request.prompt().to_string(),
            output_path: absolute_path(output_path.into()),
            duration_seconds: request.duration_seconds(),
            steps: request.steps(),
            guidance_scale: request.guidance_scale(),
            seed: request.seed(),
            width: request.width(),
            height: request.height(),
            fps: request.fps(),
            input_image: request.input_image().map(|p| absolute_path(p.to_path_buf())),
        }
    }

    pub fn mode(&self) -> GenerationMode {
        if self.input_image.is_some() {
            GenerationMode::ImageToVideo
        } else {
            GenerationMode::TextToVideo
        }
    }
}

/// Resolve against the current directory, keeping the path as-is if that fails.
fn absolute_path(path: PathBuf) -> PathBuf {
    std::path::absolute(&path).unwrap_or(path)
}
