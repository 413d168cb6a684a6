//! VibeBot Engine Library
//!
//! This library provides the core functionality of VibeBot.
//! It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// API key loading and secret scrubbing
pub mod secrets;

/// LLM provider abstraction layer
pub mod llm;

/// Multi-turn chat session
pub mod session;

/// Five-stage pipeline
pub mod pipeline;

/// Message bus for stage events
pub mod message_bus;

/// Conversation log and JSON export
pub mod history;

/// Chat front-end state
pub mod chat;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
