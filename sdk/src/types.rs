//! Chat data types shared by the engine and its front-ends

use serde::{Deserialize, Serialize};

/// Who wrote a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A message in the display thread
///
/// Immutable once created. The thread only ever appends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Opaque identifier
    pub id: String,

    /// Message text, verbatim
    pub text: String,

    /// Author of the message
    pub sender: Sender,
}

impl Message {
    /// Create a message with a fresh identifier
    pub fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
        }
    }

    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User)
    }

    /// Create a bot message
    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Bot)
    }
}

/// A web reference returned alongside a search-grounded answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub uri: String,
    pub title: String,
}

impl GroundingSource {
    pub fn new(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            title: title.into(),
        }
    }
}

/// One completed exchange, as recorded in the conversation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user: String,
    pub bot: String,
}

impl ConversationTurn {
    pub fn new(user: impl Into<String>, bot: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            bot: bot.into(),
        }
    }
}
