//! Error types and handling
//!
//! This module provides the error types used throughout the VibeBot engine.
//! All errors implement the `ErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! Model-provider failures are not represented here: the engine keeps those
//! behind its own `LLMError` so the pipeline can degrade per stage. This enum
//! covers startup, configuration, export and entry-point misuse.
//!
//! # Examples
//!
//! ```
//! use sdk::errors::{EngineError, ErrorExt};
//!
//! let error = EngineError::Busy;
//! println!("Hint: {}", error.user_hint());
//! assert!(error.is_recoverable());
//!
//! let fatal_error = EngineError::MissingApiKey("GEMINI_API_KEY".to_string());
//! assert!(!fatal_error.is_recoverable());
//! ```

use thiserror::Error;

/// Trait for engine error extensions
///
/// Provides context for errors that is safe to show to the person chatting:
/// a hint and whether trying again can help.
pub trait ErrorExt {
    /// Returns a user-friendly hint for the error
    ///
    /// The hint never contains secrets or raw provider output.
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried or worked around. Non-recoverable
    /// errors require fixing the environment and restarting.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// None of the accepted API key variables were set at startup
    #[error("API key not set (expected one of: {0})")]
    MissingApiKey(String),

    // LLM provider errors that escape the pipeline (client construction)
    #[error("LLM provider error: {0}")]
    LLMProvider(String),

    // Entry point errors
    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("A pipeline run is already in progress")]
    Busy,

    // Export errors
    #[error("Export failed: {0}")]
    Export(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",
            Self::MissingApiKey(_) => "Set GEMINI_API_KEY (or API_KEY) and restart",
            Self::LLMProvider(_) => "LLM provider unavailable. Check your API key and network",
            Self::EmptyMessage => "Type something first",
            Self::Busy => "Hold up, still answering the last message",
            Self::Export(_) => "Could not export chat history. Check the target path",
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        !matches!(self, Self::MissingApiKey(_) | Self::Config(_))
    }
}
