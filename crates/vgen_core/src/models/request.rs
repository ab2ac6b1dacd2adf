//! Generation request with construction-time validation.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use crate::pipeline::GenerationError;

/// Accepted ranges for request parameters.
pub mod limits {
    use std::ops::RangeInclusive;

    /// Maximum prompt length in characters.
    pub const MAX_PROMPT_CHARS: usize = 1000;
    pub const DURATION_SECONDS: RangeInclusive<u32> = 1..=30;
    pub const STEPS: RangeInclusive<u32> = 1..=100;
    pub const GUIDANCE_SCALE: RangeInclusive<f64> = 0.1..=20.0;
    pub const DIMENSION: RangeInclusive<u32> = 256..=1536;
    pub const FPS: RangeInclusive<u32> = 1..=60;
}

/// A validated video generation request.
///
/// Only [`GenerationRequestBuilder::build`] creates one, so every value
/// reachable through the getters is already within [`limits`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    prompt: String,
    duration_seconds: u32,
    steps: u32,
    guidance_scale: f64,
    seed: Option<i64>,
    width: u32,
    height: u32,
    fps: u32,
    output_dir: Option<PathBuf>,
    input_image: Option<PathBuf>,
}

impl GenerationRequest {
    /// Start building a request for the given prompt with default parameters.
    pub fn builder(prompt: impl Into<String>) -> GenerationRequestBuilder {
        GenerationRequestBuilder::new(prompt)
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn guidance_scale(&self) -> f64 {
        self.guidance_scale
    }

    pub fn seed(&self) -> Option<i64> {
        self.seed
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Directory the output file should land in (current directory if `None`).
    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Optional still image for image-to-video generation.
    pub fn input_image(&self) -> Option<&Path> {
        self.input_image.as_deref()
    }
}

/// Builder for [`GenerationRequest`].
#[derive(Debug, Clone)]
pub struct GenerationRequestBuilder {
    prompt: String,
    duration_seconds: u32,
    steps: u32,
    guidance_scale: f64,
    seed: Option<i64>,
    width: u32,
    height: u32,
    fps: u32,
    output_dir: Option<PathBuf>,
    input_image: Option<PathBuf>,
}

impl GenerationRequestBuilder {
    /// Create a builder with the default portrait (9:16) parameters.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            duration_seconds: 5,
            steps: 50,
            guidance_scale: 7.5,
            seed: None,
            width: 576,
            height: 1024,
            fps: 24,
            output_dir: None,
            input_image: None,
        }
    }

    pub fn duration_seconds(mut self, seconds: u32) -> Self {
        self.duration_seconds = seconds;
        self
    }

    pub fn steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    pub fn guidance_scale(mut self, scale: f64) -> Self {
        self.guidance_scale = scale;
        self
    }

    pub fn seed(mut self, seed: Option<i64>) -> Self {
        self.seed = seed;
        self
    }

    /// Set the output resolution.
    pub fn resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Set the output directory. An empty path means "current directory".
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.output_dir = (!dir.as_os_str().is_empty()).then_some(dir);
        self
    }

    /// Set the input image. An empty path clears it.
    pub fn input_image(mut self, image: impl Into<PathBuf>) -> Self {
        let image = image.into();
        self.input_image = (!image.as_os_str().is_empty()).then_some(image);
        self
    }

    /// Validate every field and build the request.
    ///
    /// Fails with [`GenerationError::InvalidRequest`] naming the first
    /// out-of-range field.
    pub fn build(self) -> Result<GenerationRequest, GenerationError> {
        if self.prompt.trim().is_empty() {
            return Err(GenerationError::invalid_request("prompt must not be empty"));
        }
        let prompt_chars = self.prompt.chars().count();
        if prompt_chars > limits::MAX_PROMPT_CHARS {
            return Err(GenerationError::invalid_request(format!(
                "prompt is {} characters, the maximum is {}",
                prompt_chars,
                limits::MAX_PROMPT_CHARS
            )));
        }

        check_range("duration_seconds", self.duration_seconds, &limits::DURATION_SECONDS)?;
        check_range("steps", self.steps, &limits::STEPS)?;
        if !self.guidance_scale.is_finite() {
            return Err(GenerationError::invalid_request(
                "guidance_scale must be a finite number",
            ));
        }
        check_range("guidance_scale", self.guidance_scale, &limits::GUIDANCE_SCALE)?;
        check_range("width", self.width, &limits::DIMENSION)?;
        check_range("height", self.height, &limits::DIMENSION)?;
        check_range("fps", self.fps, &limits::FPS)?;

        Ok(GenerationRequest {
            prompt: self.prompt,
            duration_seconds: self.duration_seconds,
            steps: self.steps,
            guidance_scale: self.guidance_scale,
            seed: self.seed,
            width: self.width,
            height: self.height,
            fps: self.fps,
            output_dir: self.output_dir,
            input_image: self.input_image,
        })
    }
}

fn check_range<T>(field: &str, value: T, range: &RangeInclusive<T>) -> Result<(), GenerationError>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(GenerationError::invalid_request(format!(
            "{} must be between {} and {}, got {}",
            field,
            range.start(),
            range.end(),
            value
        )))
    }
}
