//! Configuration management
//!
//! This module handles loading, validation, and management of the VibeBot
//! configuration. Configuration is stored in TOML format at
//! ~/.vibebot/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: log level, data directory (default export location)
//! - **llm**: Gemini endpoint, model and request timeout
//! - **pipeline**: stage timing
//! - **memory**: chat session context window
//! - **persona**: optional override of the built-in system instruction
//!
//! The API key is never stored here; it comes from the environment (see
//! [`crate::secrets`]).
//!
//! # Examples
//!
//! ```no_run
//! use vibebot_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//! println!("Model: {}", config.llm.gemini.model);
//! # Ok(())
//! # }
//! ```

use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::session::VIBEBOT_PERSONA;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Core engine settings
    #[serde(default)]
    pub core: CoreConfig,

    /// LLM provider configuration
    #[serde(default)]
    pub llm: LLMConfig,

    /// Pipeline timing
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Chat session memory
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Persona override
    #[serde(default)]
    pub persona: PersonaConfig,
}

/// Core engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Data directory path (supports ~ expansion). Exports land here unless
    /// an explicit path is given.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            data_dir: default_data_dir(),
        }
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LLMConfig {
    /// Gemini provider settings
    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Base URL for Gemini API
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    // Note: API key comes from the environment, not from config
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
            model: default_gemini_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Pipeline timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Minimum time the input stage stays in Processing, for visible feedback
    #[serde(default = "default_input_delay_ms")]
    pub input_delay_ms: u64,
}

impl PipelineConfig {
    pub fn input_delay(&self) -> Duration {
        Duration::from_millis(self.input_delay_ms)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_delay_ms: default_input_delay_ms(),
        }
    }
}

/// Chat session memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Estimated token budget for the session's conversation context
    #[serde(default = "default_max_context_tokens")]
    pub max_context_tokens: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_context_tokens: default_max_context_tokens(),
        }
    }
}

/// Persona configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PersonaConfig {
    /// Replaces the built-in VibeBot system instruction when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("~/.vibebot")
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_input_delay_ms() -> u64 {
    300
}

fn default_max_context_tokens() -> usize {
    8000
}

impl Config {
    /// Load configuration from the default location (~/.vibebot/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        let mut config: Config = toml::from_str(contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    pub fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let mut config = Self::default();
        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.vibebot/config.toml)
    fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".vibebot").join("config.toml"))
    }

    /// The system instruction the chat session is created with
    pub fn persona_instruction(&self) -> &str {
        self.persona
            .system_instruction
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(VIBEBOT_PERSONA)
    }

    /// Validate and process configuration
    ///
    /// Checks value ranges and expands ~ in the data directory. The data
    /// directory is created lazily on first export, not here.
    fn validate_and_process(&mut self) -> Result<(), EngineError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        if self.llm.gemini.model.trim().is_empty() {
            return Err(EngineError::Config(
                "llm.gemini.model must not be empty".to_string(),
            ));
        }

        if self.llm.gemini.timeout_secs == 0 {
            return Err(EngineError::Config(
                "llm.gemini.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.memory.max_context_tokens == 0 {
            return Err(EngineError::Config(
                "memory.max_context_tokens must be greater than 0".to_string(),
            ));
        }

        self.core.data_dir = expand_path(&self.core.data_dir)?;

        Ok(())
    }
}

/// Expand ~ in path to user's home directory
pub(crate) fn expand_path(path: &Path) -> Result<PathBuf, EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}
