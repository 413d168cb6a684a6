//! Test doubles shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use vibebot_engine::llm::{GenerateRequest, Generation, LLMError, LLMProvider, Result};

/// Provider that answers from a fixed script, in order, and records every
/// request it sees.
#[derive(Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<Generation>>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: &str) -> Self {
        self.push(Ok(Generation::text(text)))
    }

    pub fn reply_with(self, generation: Generation) -> Self {
        self.push(Ok(generation))
    }

    pub fn fail(self, error: LLMError) -> Self {
        self.push(Err(error))
    }

    fn push(self, step: Result<Generation>) -> Self {
        self.script.lock().unwrap().push_back(step);
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<Generation> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LLMError::Unknown("script exhausted".to_string())))
    }
}

/// Provider that holds every call until the test opens the gate
pub struct GatedProvider {
    gate: Semaphore,
    reply: String,
}

impl GatedProvider {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(0),
            reply: reply.to_string(),
        })
    }

    pub fn open(&self, calls: usize) {
        self.gate.add_permits(calls);
    }
}

#[async_trait]
impl LLMProvider for GatedProvider {
    fn name(&self) -> &str {
        "gated"
    }

    fn model(&self) -> &str {
        "gated-model"
    }

    async fn generate(&self, _request: &GenerateRequest) -> Result<Generation> {
        self.gate
            .acquire()
            .await
            .map_err(|e| LLMError::Unknown(e.to_string()))?
            .forget();
        Ok(Generation::text(self.reply.clone()))
    }
}
