//! Configuration management for Video Generator.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Defaults applied for missing keys on load
//!
//! # Example
//!
//! ```no_run
//! use vgen_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(".config/settings.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Steps: {}", config.settings().generation.steps);
//!
//! config.settings_mut().generation.add_recent_prompt("a lantern festival");
//! config.update_section(ConfigSection::Generation).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{default_config_path, ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, GenerationSettings, LoggingSettings, ModelSettings, PathSettings, Settings,
    MAX_RECENT_PROMPTS,
};
