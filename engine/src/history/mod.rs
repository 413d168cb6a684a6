//! Conversation Log
//!
//! Append-only record of completed exchanges, kept apart from the display
//! list. Exported as a pretty-printed JSON array.

use sdk::{ConversationTurn, EngineError};
use std::path::Path;
use tracing::info;

/// File name used when an export path is a directory or not given
pub const DEFAULT_EXPORT_FILE_NAME: &str = "conversation_history.json";

#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    turns: Vec<ConversationTurn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one exchange, exactly as shown to the user
    pub fn push(&mut self, user: impl Into<String>, bot: impl Into<String>) {
        self.turns.push(ConversationTurn::new(user, bot));
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Serialize the log as pretty-printed JSON
    pub fn export_json(&self) -> Result<String, EngineError> {
        serde_json::to_string_pretty(&self.turns).map_err(|e| EngineError::Export(e.to_string()))
    }

    /// Write the JSON export to `path`, creating parent directories.
    ///
    /// If `path` is an existing directory the file is written inside it as
    /// `conversation_history.json`. Returns the path actually written.
    pub fn export_to_file(&self, path: &Path) -> Result<std::path::PathBuf, EngineError> {
        let target = if path.is_dir() {
            path.join(DEFAULT_EXPORT_FILE_NAME)
        } else {
            path.to_path_buf()
        };

        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(&target, self.export_json()?)?;
        info!(path = %target.display(), turns = self.len(), "Exported conversation log");
        Ok(target)
    }
}
