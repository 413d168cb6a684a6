//! VibeBot SDK
//!
//! Shared library providing error and data types for VibeBot components.
//! This crate is used by the engine and by any front-end rendering a chat.

/// Error types and handling
pub mod errors;

/// Chat data types
pub mod types;

// Re-export commonly used types
pub use errors::{EngineError, ErrorExt};
pub use types::{ConversationTurn, GroundingSource, Message, Sender};
