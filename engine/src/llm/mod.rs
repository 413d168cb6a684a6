//! LLM Provider Abstraction Layer
//!
//! This module provides a common interface for talking to the generative
//! language service. The `LLMProvider` trait is the seam between the pipeline
//! and the wire: `GeminiProvider` implements it over HTTP, tests plug in
//! scripted providers. `ModelGateway` wraps a provider with the two
//! stateless operations the pipeline needs (single turn and search turn).

use async_trait::async_trait;
use sdk::GroundingSource;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod gateway;
pub mod gemini;

pub use gateway::{ModelGateway, SearchResult};
pub use gemini::GeminiProvider;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LLMError {
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl LLMError {
    /// Render the error the way it is shown in a stage's output.
    ///
    /// Keeps the `Error: ` prefix so failed stages stand out in the display.
    pub fn stage_text(&self) -> String {
        format!("Error: {}", self)
    }
}

/// Message in a conversation history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Role of the message sender (user, assistant, system)
    pub role: MessageRole,

    /// Content of the message
    pub content: String,
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User message
    User,

    /// Assistant message
    Assistant,

    /// System message
    System,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::System => write!(f, "system"),
        }
    }
}

/// A single generation request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateRequest {
    /// Conversation contents, oldest first. System messages are folded into
    /// the provider's system instruction.
    pub messages: Vec<Message>,

    /// System instruction sent alongside the contents
    pub system_instruction: Option<String>,

    /// Grant the model web-search capability
    pub enable_search: bool,
}

impl GenerateRequest {
    /// A stateless single-prompt request
    pub fn prompt(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(prompt)],
            ..Default::default()
        }
    }

    /// A request carrying a whole conversation
    pub fn conversation(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_search(mut self) -> Self {
        self.enable_search = true;
        self
    }

    /// Text of the last user message, if any
    pub fn last_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
    }
}

/// Output of a successful generation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    /// Concatenated text of the first candidate
    pub text: String,

    /// Web references, only populated for search-enabled requests
    #[serde(default)]
    pub sources: Vec<GroundingSource>,
}

impl Generation {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sources: Vec::new(),
        }
    }

    pub fn with_sources(mut self, sources: Vec<GroundingSource>) -> Self {
        self.sources = sources;
        self
    }
}

/// LLM Provider trait that all providers must implement
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Returns the name of the provider (e.g., "gemini")
    fn name(&self) -> &str;

    /// Returns the model the provider talks to
    fn model(&self) -> &str;

    /// Generate a response from the LLM
    ///
    /// # Returns
    /// * `Ok(Generation)` - Text plus any grounding sources
    /// * `Err(LLMError)` - If the request fails for any reason
    async fn generate(&self, request: &GenerateRequest) -> Result<Generation>;
}
