//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use vgen_core::config::Settings;
use vgen_core::logging::LogLevel;

/// Command-line arguments for the video generator.
#[derive(Parser, Debug, Clone)]
#[command(name = "video-generator")]
#[command(about = "Generate a video from a text prompt with an external LTX-Video script")]
#[command(version)]
pub struct CliArgs {
    /// Text prompt describing the video
    #[arg(long, short = 'p')]
    pub prompt: String,

    /// Model file or directory (defaults to the last loaded model)
    #[arg(long, short = 'm', env = "VGEN_MODEL")]
    pub model: Option<PathBuf>,

    /// Configuration file path (defaults to the platform config directory)
    #[arg(long, short = 'c', env = "VGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for the generated video
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,

    /// Duration in seconds (1-30)
    #[arg(long)]
    pub duration: Option<u32>,

    /// Inference steps (1-100)
    #[arg(long)]
    pub steps: Option<u32>,

    /// Guidance scale
    #[arg(long)]
    pub guidance: Option<f64>,

    /// Random seed
    #[arg(long, allow_negative_numbers = true)]
    pub seed: Option<i64>,

    /// Width in pixels (256-1536)
    #[arg(long)]
    pub width: Option<u32>,

    /// Height in pixels (256-1536)
    #[arg(long)]
    pub height: Option<u32>,

    /// Frames per second (1-60)
    #[arg(long)]
    pub fps: Option<u32>,

    /// Start image for image-to-video generation
    #[arg(long, short = 'i')]
    pub image: Option<PathBuf>,

    /// Generator script
    #[arg(long, env = "VGEN_SCRIPT")]
    pub script: Option<PathBuf>,

    /// Python interpreter
    #[arg(long, env = "VGEN_PYTHON")]
    pub python: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<LogLevel>,

    /// Mirror the generator's log output to stderr
    #[arg(long)]
    pub show_output: bool,
}

impl CliArgs {
    /// Apply explicit flags on top of loaded settings.
    pub fn apply_to(&self, settings: &mut Settings) {
        let generation = &mut settings.generation;
        if let Some(duration) = self.duration {
            generation.duration_seconds = duration;
        }
        if let Some(steps) = self.steps {
            generation.steps = steps;
        }
        if let Some(guidance) = self.guidance {
            generation.guidance_scale = guidance;
        }
        if let Some(seed) = self.seed {
            generation.seed = seed.to_string();
        }
        if let Some(width) = self.width {
            generation.width = width;
        }
        if let Some(height) = self.height {
            generation.height = height;
        }
        if let Some(fps) = self.fps {
            generation.fps = fps;
        }

        let paths = &mut settings.paths;
        if let Some(dir) = &self.output_dir {
            paths.output_folder = dir.to_string_lossy().into_owned();
        }
        if let Some(script) = &self.script {
            paths.script_path = script.to_string_lossy().into_owned();
        }
        if let Some(python) = &self.python {
            paths.python_executable = python.clone();
        }

        if let Some(level) = self.log_level {
            settings.logging.level = level;
        }
    }

    /// Model to load: the explicit flag, else the remembered one when auto-load is on.
    pub fn model_path(&self, settings: &Settings) -> Option<PathBuf> {
        self.model.clone().or_else(|| {
            let remembered = settings.model.model_path.trim();
            (settings.model.auto_load && !remembered.is_empty()).then(|| PathBuf::from(remembered))
        })
    }
}
