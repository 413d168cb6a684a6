//! Model Gateway
//!
//! Stateless calls used by the pipeline's translation, decision and search
//! stages. Every failure comes back as an `LLMError`; nothing panics past
//! this boundary.

use sdk::GroundingSource;
use std::sync::Arc;
use tracing::{debug, error};

use super::{GenerateRequest, LLMProvider, Result};

/// Answer from a search-grounded call
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub text: String,
    pub sources: Vec<GroundingSource>,
}

/// Thin facade over a provider exposing the pipeline's two stateless calls
#[derive(Clone)]
pub struct ModelGateway {
    provider: Arc<dyn LLMProvider>,
}

impl ModelGateway {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }

    /// Send one stateless prompt, optionally with a system instruction.
    pub async fn single_turn(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
    ) -> Result<String> {
        let mut request = GenerateRequest::prompt(prompt);
        if let Some(instruction) = system_instruction {
            request = request.with_system_instruction(instruction);
        }

        debug!(
            provider = self.provider.name(),
            model = self.provider.model(),
            prompt_len = prompt.len(),
            "single-turn call"
        );

        match self.provider.generate(&request).await {
            Ok(generation) => Ok(generation.text),
            Err(e) => {
                error!("Error calling {}: {}", self.provider.name(), e);
                Err(e)
            }
        }
    }

    /// Send one prompt with web search enabled.
    ///
    /// On success the text comes back with the grounding references the
    /// provider attached; on failure there are no sources at all.
    pub async fn search_turn(&self, prompt: &str) -> Result<SearchResult> {
        let request = GenerateRequest::prompt(prompt).with_search();

        debug!(
            provider = self.provider.name(),
            model = self.provider.model(),
            prompt_len = prompt.len(),
            "search call"
        );

        match self.provider.generate(&request).await {
            Ok(generation) => Ok(SearchResult {
                text: generation.text,
                sources: generation.sources,
            }),
            Err(e) => {
                error!("Error calling {} with search: {}", self.provider.name(), e);
                Err(e)
            }
        }
    }
}
