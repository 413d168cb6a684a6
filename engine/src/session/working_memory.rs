//! Working Memory for the chat session
//!
//! Holds the conversation context sent with every chat turn: the system
//! instruction first, then alternating user and assistant messages. When the
//! estimated size passes the context limit, the oldest exchanges are trimmed
//! while the system instruction and the latest exchange are kept.

use crate::llm::{Message, MessageRole};

/// Default context limit in tokens (conservative estimate for most models)
pub const DEFAULT_CONTEXT_LIMIT: usize = 8000;

/// Average characters per token (rough estimate: 1 token ≈ 4 characters)
const CHARS_PER_TOKEN: usize = 4;

/// Per-message overhead for role and structure
const MESSAGE_OVERHEAD_TOKENS: usize = 10;

/// Conversation context bounded by an estimated token budget
#[derive(Debug, Clone)]
pub struct WorkingMemory {
    /// All messages in the conversation
    messages: Vec<Message>,

    /// Maximum number of tokens allowed in context
    context_limit: usize,

    /// Current estimated token count
    token_count: usize,
}

impl WorkingMemory {
    /// Create a new working memory with default context limit
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_CONTEXT_LIMIT)
    }

    /// Create a new working memory with a specific context limit
    pub fn with_limit(context_limit: usize) -> Self {
        Self {
            messages: Vec::new(),
            context_limit,
            token_count: 0,
        }
    }

    /// Add a message, trimming old exchanges if the limit is exceeded
    pub fn add_message(&mut self, message: Message) {
        self.token_count += Self::estimate_tokens(&message);
        self.messages.push(message);

        if self.token_count > self.context_limit {
            self.trim_messages();
        }
    }

    /// Remove and return the most recent message.
    ///
    /// Used to roll back a user turn the model never answered. The system
    /// instruction is never popped.
    pub fn pop_message(&mut self) -> Option<Message> {
        if self.messages.last()?.role == MessageRole::System {
            return None;
        }
        let removed = self.messages.pop()?;
        self.token_count = self
            .token_count
            .saturating_sub(Self::estimate_tokens(&removed));
        Some(removed)
    }

    /// Get all messages in the conversation history
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Get the current token count
    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// Get the context limit
    pub fn context_limit(&self) -> usize {
        self.context_limit
    }

    /// Trim oldest exchanges to get back under the context limit.
    ///
    /// Messages go in user/assistant pairs so the context never starts with
    /// an orphaned assistant reply. The leading system message always stays,
    /// and so do the last two messages unless one is such an orphan.
    fn trim_messages(&mut self) {
        let system_count = usize::from(
            self.messages
                .first()
                .is_some_and(|m| m.role == MessageRole::System),
        );

        while self.token_count > self.context_limit && self.messages.len() > system_count + 2 {
            let removed = self.messages.remove(system_count);
            self.token_count = self
                .token_count
                .saturating_sub(Self::estimate_tokens(&removed));

            // Drop the paired reply too
            if removed.role == MessageRole::User
                && self.messages.len() > system_count + 2
                && self.messages[system_count].role == MessageRole::Assistant
            {
                let reply = self.messages.remove(system_count);
                self.token_count = self
                    .token_count
                    .saturating_sub(Self::estimate_tokens(&reply));
            }
        }

        // A reply whose question was trimmed goes too, even below the floor
        while self
            .messages
            .get(system_count)
            .is_some_and(|m| m.role == MessageRole::Assistant)
        {
            let orphan = self.messages.remove(system_count);
            self.token_count = self
                .token_count
                .saturating_sub(Self::estimate_tokens(&orphan));
        }
    }

    /// Estimate the number of tokens in a message from its character count
    fn estimate_tokens(message: &Message) -> usize {
        message.content.chars().count().div_ceil(CHARS_PER_TOKEN) + MESSAGE_OVERHEAD_TOKENS
    }
}

impl Default for WorkingMemory {
    fn default() -> Self {
        Self::new()
    }
}
