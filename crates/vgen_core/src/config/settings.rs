//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::logging::{LogConfig, LogLevel};
use crate::models::GenerationRequestBuilder;
use crate::pipeline::GenerationError;
use crate::runner::{default_script_path, RunnerConfig};

/// Number of prompts kept in the recent list.
pub const MAX_RECENT_PROMPTS: usize = 10;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Interpreter, script and folder locations.
    #[serde(default)]
    pub paths: PathSettings,

    /// Last used model.
    #[serde(default)]
    pub model: ModelSettings,

    /// Generation parameters and prompt history.
    #[serde(default)]
    pub generation: GenerationSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Request builder for `prompt` pre-filled from the generation section.
    ///
    /// Fails with [`GenerationError::InvalidRequest`] when the stored seed is
    /// not an integer. Ranges are checked later by `build()`.
    pub fn request_builder(
        &self,
        prompt: impl Into<String>,
    ) -> Result<GenerationRequestBuilder, GenerationError> {
        let generation = &self.generation;
        Ok(GenerationRequestBuilder::new(prompt)
            .duration_seconds(generation.duration_seconds)
            .steps(generation.steps)
            .guidance_scale(generation.guidance_scale)
            .seed(generation.parsed_seed()?)
            .resolution(generation.width, generation.height)
            .fps(generation.fps)
            .output_dir(&self.paths.output_folder))
    }

    /// Runner configuration derived from the paths and logging sections.
    pub fn runner_config(&self) -> RunnerConfig {
        let paths = &self.paths;
        let mut config = RunnerConfig::default()
            .with_interpreter(&paths.python_executable)
            .with_script(paths.script_path())
            .with_log_config(self.logging.to_log_config());
        if !paths.logs_folder.trim().is_empty() {
            config = config.with_logs_dir(&paths.logs_folder);
        }
        config
    }
}

/// Path configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    /// Interpreter used to run the generator script.
    #[serde(default = "default_python_executable")]
    pub python_executable: String,

    /// Generator script; empty means the bundled script next to the executable.
    #[serde(default)]
    pub script_path: String,

    /// Output folder for generated videos; empty means the current directory.
    #[serde(default)]
    pub output_folder: String,

    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_python_executable() -> String {
    "python".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            python_executable: default_python_executable(),
            script_path: String::new(),
            output_folder: String::new(),
            logs_folder: default_logs_folder(),
        }
    }
}

impl PathSettings {
    /// Configured script, or the default location when unset.
    pub fn script_path(&self) -> PathBuf {
        if self.script_path.trim().is_empty() {
            default_script_path()
        } else {
            PathBuf::from(&self.script_path)
        }
    }
}

/// Model selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Last successfully loaded model.
    #[serde(default)]
    pub model_path: String,

    /// Load `model_path` on startup.
    #[serde(default = "default_true")]
    pub auto_load: bool,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model_path: String::new(),
            auto_load: true,
        }
    }
}

/// Generation parameters remembered between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    #[serde(default = "default_duration_seconds")]
    pub duration_seconds: u32,

    #[serde(default = "default_steps")]
    pub steps: u32,

    #[serde(default = "default_guidance_scale")]
    pub guidance_scale: f64,

    /// Seed as text; empty means random.
    #[serde(default)]
    pub seed: String,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default = "default_fps")]
    pub fps: u32,

    #[serde(default)]
    pub last_prompt: String,

    /// Most recent first.
    #[serde(default)]
    pub recent_prompts: Vec<String>,

    #[serde(default)]
    pub last_input_image_path: String,
}

fn default_duration_seconds() -> u32 {
    5
}

fn default_steps() -> u32 {
    50
}

fn default_guidance_scale() -> f64 {
    7.5
}

fn default_width() -> u32 {
    576
}

fn default_height() -> u32 {
    1024
}

fn default_fps() -> u32 {
    24
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            duration_seconds: default_duration_seconds(),
            steps: default_steps(),
            guidance_scale: default_guidance_scale(),
            seed: String::new(),
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
            last_prompt: String::new(),
            recent_prompts: Vec::new(),
            last_input_image_path: String::new(),
        }
    }
}

impl GenerationSettings {
    /// Parse the seed text. Empty means `None`.
    pub fn parsed_seed(&self) -> Result<Option<i64>, GenerationError> {
        let seed = self.seed.trim();
        if seed.is_empty() {
            return Ok(None);
        }
        seed.parse()
            .map(Some)
            .map_err(|_| GenerationError::invalid_request(format!("seed '{}' is not an integer", seed)))
    }

    /// Remember `prompt` as the last prompt and move it to the front of the
    /// recent list, dropping case-insensitive duplicates.
    pub fn add_recent_prompt(&mut self, prompt: &str) {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return;
        }

        let lower = prompt.to_lowercase();
        self.recent_prompts.retain(|p| p.to_lowercase() != lower);
        self.recent_prompts.insert(0, prompt.to_string());
        self.recent_prompts.truncate(MAX_RECENT_PROMPTS);
        self.last_prompt = prompt.to_string();
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level for console and attempt logs.
    #[serde(default)]
    pub level: LogLevel,

    /// Use compact log format.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of child output lines shown after a failure.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Prefix log lines with the time.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

fn default_progress_step() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            compact: true,
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
            show_timestamps: true,
        }
    }
}

impl LoggingSettings {
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            level: self.level,
            compact: self.compact,
            progress_step: self.progress_step,
            error_tail: self.error_tail as usize,
            show_timestamps: self.show_timestamps,
        }
    }
}

/// Config sections that can be updated independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Paths,
    Model,
    Generation,
    Logging,
}

impl ConfigSection {
    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Model => "model",
            ConfigSection::Generation => "generation",
            ConfigSection::Logging => "logging",
        }
    }

    pub fn all() -> [ConfigSection; 4] {
        [
            ConfigSection::Paths,
            ConfigSection::Model,
            ConfigSection::Generation,
            ConfigSection::Logging,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let toml = toml::to_string_pretty(&Settings::default()).unwrap();
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[generation]"));
        assert!(toml.contains("python_executable"));
    }

    #[test]
    fn settings_round_trip() {
        let mut settings = Settings::default();
        settings.generation.add_recent_prompt("a slow pan over mountains");
        let toml = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let parsed: Settings = toml::from_str("[generation]\nsteps = 30").unwrap();
        assert_eq!(parsed.generation.steps, 30);
        assert_eq!(parsed.generation.fps, 24);
        assert_eq!(parsed.paths.logs_folder, ".logs");
        assert!(parsed.model.auto_load);
    }

    #[test]
    fn recent_prompts_dedupe_and_cap() {
        let mut generation = GenerationSettings::default();
        for i in 0..12 {
            generation.add_recent_prompt(&format!("prompt {}", i));
        }
        generation.add_recent_prompt("  PROMPT 5 ");
        generation.add_recent_prompt("");

        assert_eq!(generation.recent_prompts.len(), MAX_RECENT_PROMPTS);
        assert_eq!(generation.recent_prompts[0], "PROMPT 5");
        assert_eq!(generation.recent_prompts[1], "prompt 11");
        assert_eq!(
            generation
                .recent_prompts
                .iter()
                .filter(|p| p.eq_ignore_ascii_case("prompt 5"))
                .count(),
            1
        );
        assert_eq!(generation.last_prompt, "PROMPT 5");
    }

    #[test]
    fn request_builder_applies_generation_section() {
        let mut settings = Settings::default();
        settings.generation.steps = 25;
        settings.generation.seed = " 1234 ".to_string();
        settings.paths.output_folder = "renders".to_string();

        let request = settings.request_builder("a koi pond").unwrap().build().unwrap();
        assert_eq!(request.steps(), 25);
        assert_eq!(request.seed(), Some(1234));
        assert_eq!(request.output_dir(), Some(std::path::Path::new("renders")));
    }

    #[test]
    fn unparsable_seed_is_invalid_request() {
        let mut settings = Settings::default();
        settings.generation.seed = "lucky".to_string();
        let err = settings.request_builder("p").unwrap_err();
        assert!(matches!(err, GenerationError::InvalidRequest(_)));
    }

    #[test]
    fn runner_config_uses_paths_and_logging() {
        let mut settings = Settings::default();
        settings.paths.python_executable = "python3".to_string();
        settings.paths.script_path = "/opt/gen/generate.py".to_string();
        settings.logging.compact = false;

        let config = settings.runner_config();
        assert_eq!(config.interpreter, "python3");
        assert_eq!(config.script_path, PathBuf::from("/opt/gen/generate.py"));
        assert_eq!(config.logs_dir, Some(PathBuf::from(".logs")));
        assert!(!config.log_config.compact);
    }

    #[test]
    fn section_names_match_fields() {
        let toml = toml::to_string_pretty(&Settings::default()).unwrap();
        for section in ConfigSection::all() {
            assert!(toml.contains(&format!("[{}]", section.table_name())));
        }
    }
}
