//! Chat Session
//!
//! A `ChatSession` owns one conversation handle: the system instruction plus
//! every exchange so far. `send` appends a user message, asks the model to
//! continue the conversation and records the reply, so later turns can refer
//! back to earlier ones. The handle is only replaced by an explicit `reset`.

pub mod persona;
pub mod working_memory;

pub use persona::VIBEBOT_PERSONA;
pub use working_memory::WorkingMemory;

use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::llm::{GenerateRequest, LLMProvider, Message, MessageRole, Result};

/// The accumulated multi-turn context, identified by a stable id
#[derive(Debug, Clone)]
pub struct ConversationHandle {
    id: Uuid,
    memory: WorkingMemory,
}

impl ConversationHandle {
    fn open(system_instruction: &str, context_limit: usize) -> Self {
        let mut memory = WorkingMemory::with_limit(context_limit);
        memory.add_message(Message::system(system_instruction));
        Self {
            id: Uuid::new_v4(),
            memory,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn messages(&self) -> &[Message] {
        self.memory.messages()
    }
}

/// Multi-turn chat bound to one conversation handle
pub struct ChatSession {
    provider: Arc<dyn LLMProvider>,
    system_instruction: String,
    context_limit: usize,
    handle: ConversationHandle,
}

impl ChatSession {
    /// Open a session with the default context window
    pub fn new(provider: Arc<dyn LLMProvider>, system_instruction: impl Into<String>) -> Self {
        Self::with_context_limit(
            provider,
            system_instruction,
            working_memory::DEFAULT_CONTEXT_LIMIT,
        )
    }

    /// Open a session with an explicit context window (estimated tokens)
    pub fn with_context_limit(
        provider: Arc<dyn LLMProvider>,
        system_instruction: impl Into<String>,
        context_limit: usize,
    ) -> Self {
        let system_instruction = system_instruction.into();
        let handle = ConversationHandle::open(&system_instruction, context_limit);
        info!(handle = %handle.id(), "Opened chat session");
        Self {
            provider,
            system_instruction,
            context_limit,
            handle,
        }
    }

    pub fn handle_id(&self) -> Uuid {
        self.handle.id()
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// Full conversation context, system instruction first
    pub fn history(&self) -> &[Message] {
        self.handle.messages()
    }

    /// Number of answered user turns still held in context
    pub fn turn_count(&self) -> usize {
        self.history()
            .iter()
            .filter(|m| m.role == MessageRole::Assistant)
            .count()
    }

    /// Send a message and wait for the reply.
    ///
    /// On failure the unanswered message is taken back out of the context so
    /// the next turn starts from the last good exchange.
    pub async fn send(&mut self, message: &str) -> Result<String> {
        self.handle.memory.add_message(Message::user(message));

        let request = GenerateRequest::conversation(self.handle.messages().to_vec());
        debug!(
            handle = %self.handle.id(),
            context_messages = request.messages.len(),
            "Sending chat turn"
        );

        match self.provider.generate(&request).await {
            Ok(generation) => {
                self.handle
                    .memory
                    .add_message(Message::assistant(generation.text.clone()));
                Ok(generation.text)
            }
            Err(e) => {
                error!("Error sending message in chat session: {}", e);
                self.handle.memory.pop_message();
                Err(e)
            }
        }
    }

    /// Drop the conversation and start a fresh handle with the same
    /// system instruction.
    pub fn reset(&mut self) {
        let previous = self.handle.id();
        self.handle = ConversationHandle::open(&self.system_instruction, self.context_limit);
        info!(previous = %previous, handle = %self.handle.id(), "Reset chat session");
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("provider", &self.provider.name())
            .field("handle", &self.handle.id())
            .field("messages", &self.handle.messages().len())
            .finish()
    }
}
