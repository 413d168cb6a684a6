//! Chat front-end state
//!
//! `ChatApp` is what a UI talks to. It owns the live chat session, the
//! orchestrator, the display thread and the conversation log, and lets only
//! one pipeline run through at a time.

use sdk::{EngineError, Message};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::history::ConversationLog;
use crate::llm::{GeminiProvider, LLMProvider, ModelGateway};
use crate::message_bus::{Event, MessageBus};
use crate::pipeline::{PipelineOrchestrator, PipelineReport, PipelineStage, DEFAULT_INPUT_DELAY};
use crate::secrets;
use crate::session::{working_memory::DEFAULT_CONTEXT_LIMIT, ChatSession, VIBEBOT_PERSONA};

/// First message of every display thread
pub const GREETING: &str = "Wassup! VibeBot here.✨";

/// Settings a `ChatApp` needs from configuration
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub system_instruction: String,
    pub context_limit: usize,
    pub input_delay: Duration,
}

impl ChatSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            system_instruction: config.persona_instruction().to_string(),
            context_limit: config.memory.max_context_tokens,
            input_delay: config.pipeline.input_delay(),
        }
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            system_instruction: VIBEBOT_PERSONA.to_string(),
            context_limit: DEFAULT_CONTEXT_LIMIT,
            input_delay: DEFAULT_INPUT_DELAY,
        }
    }
}

struct RunState {
    orchestrator: PipelineOrchestrator,
    session: Option<ChatSession>,
}

struct Transcript {
    messages: Vec<Message>,
    log: ConversationLog,
}

/// Clears the busy flag when dropped, even if the run future was cancelled
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, EngineError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| EngineError::Busy)?;
        Ok(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ChatApp {
    provider: Arc<dyn LLMProvider>,
    settings: ChatSettings,
    bus: Arc<MessageBus>,
    busy: AtomicBool,
    run: Mutex<RunState>,
    transcript: Mutex<Transcript>,
}

impl ChatApp {
    /// Build the app around `provider` and open the chat session.
    pub fn new(provider: Arc<dyn LLMProvider>, settings: ChatSettings) -> Self {
        let bus = Arc::new(MessageBus::new());
        let orchestrator = PipelineOrchestrator::new(ModelGateway::new(Arc::clone(&provider)))
            .with_input_delay(settings.input_delay)
            .with_message_bus(Arc::clone(&bus));
        let session = Self::open_session(&provider, &settings);

        Self {
            provider,
            settings,
            bus,
            busy: AtomicBool::new(false),
            run: Mutex::new(RunState {
                orchestrator,
                session: Some(session),
            }),
            transcript: Mutex::new(Transcript {
                messages: vec![Message::bot(GREETING)],
                log: ConversationLog::new(),
            }),
        }
    }

    /// Build the app against Gemini using `config` and the API key from the
    /// environment.
    ///
    /// # Errors
    /// `EngineError::MissingApiKey` if no key is set, `EngineError::LLMProvider`
    /// if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, EngineError> {
        let api_key = secrets::load_api_key()?;
        let provider = GeminiProvider::new(config.llm.gemini.clone(), api_key)
            .map_err(|e| EngineError::LLMProvider(e.to_string()))?;
        info!(model = %config.llm.gemini.model, "Using Gemini provider");
        Ok(Self::new(Arc::new(provider), ChatSettings::from_config(config)))
    }

    fn open_session(provider: &Arc<dyn LLMProvider>, settings: &ChatSettings) -> ChatSession {
        ChatSession::with_context_limit(
            Arc::clone(provider),
            settings.system_instruction.clone(),
            settings.context_limit,
        )
    }

    /// Bus carrying run and stage events
    pub fn message_bus(&self) -> Arc<MessageBus> {
        Arc::clone(&self.bus)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Run one user message through the pipeline.
    ///
    /// Once the run resolves, the user message and the reply (fallbacks
    /// included) are appended to the display thread and the conversation
    /// log. A cancelled run records nothing.
    ///
    /// # Errors
    /// `EngineError::EmptyMessage` for blank input, `EngineError::Busy` while
    /// another run is in flight. Nothing is recorded in either case.
    pub async fn submit(&self, text: &str) -> Result<PipelineReport, EngineError> {
        if text.trim().is_empty() {
            return Err(EngineError::EmptyMessage);
        }
        let _guard = BusyGuard::acquire(&self.busy)?;

        let report = {
            let mut run = self.run.lock().await;
            let RunState {
                orchestrator,
                session,
            } = &mut *run;
            orchestrator.run(text, session.as_mut()).await
        };

        let mut transcript = self.transcript.lock().await;
        transcript.log.push(text, report.reply.clone());
        transcript.messages.push(Message::user(text));
        transcript.messages.push(Message::bot(report.reply.clone()));
        debug!(turns = transcript.log.len(), "Recorded exchange");

        Ok(report)
    }

    /// Open a chat session if none is live. Returns the live handle id.
    pub async fn start_session(&self) -> Uuid {
        let mut run = self.run.lock().await;
        match &run.session {
            Some(session) => session.handle_id(),
            None => {
                let session = Self::open_session(&self.provider, &self.settings);
                let id = session.handle_id();
                run.session = Some(session);
                id
            }
        }
    }

    /// Start over with a fresh conversation handle. The display thread and
    /// conversation log are kept.
    pub async fn reset_session(&self) -> Uuid {
        let id = {
            let mut run = self.run.lock().await;
            match run.session.as_mut() {
                Some(session) => {
                    session.reset();
                    session.handle_id()
                }
                None => {
                    let session = Self::open_session(&self.provider, &self.settings);
                    let id = session.handle_id();
                    run.session = Some(session);
                    id
                }
            }
        };
        self.bus.publish(Event::SessionReset { handle_id: id }).await;
        id
    }

    /// Drop the live session. Runs after this get the missing-session reply
    /// until a new session is started.
    pub async fn end_session(&self) {
        if let Some(session) = self.run.lock().await.session.take() {
            info!(handle = %session.handle_id(), "Ended chat session");
        }
    }

    pub async fn session_id(&self) -> Option<Uuid> {
        self.run.lock().await.session.as_ref().map(|s| s.handle_id())
    }

    /// Display thread, greeting first
    pub async fn messages(&self) -> Vec<Message> {
        self.transcript.lock().await.messages.clone()
    }

    /// Snapshot of the conversation log
    pub async fn log(&self) -> ConversationLog {
        self.transcript.lock().await.log.clone()
    }

    pub async fn export_json(&self) -> Result<String, EngineError> {
        self.transcript.lock().await.log.export_json()
    }

    pub async fn export_to_file(&self, path: &Path) -> Result<PathBuf, EngineError> {
        self.transcript.lock().await.log.export_to_file(path)
    }

    /// Stages of the latest run
    pub async fn stages(&self) -> Vec<PipelineStage> {
        self.run.lock().await.orchestrator.stages().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_guard_releases_on_drop() {
        let flag = AtomicBool::new(false);
        {
            let _guard = BusyGuard::acquire(&flag).unwrap();
            assert!(flag.load(Ordering::Acquire));
            assert!(matches!(BusyGuard::acquire(&flag), Err(EngineError::Busy)));
        }
        assert!(!flag.load(Ordering::Acquire));
        assert!(BusyGuard::acquire(&flag).is_ok());
    }

    #[test]
    fn test_settings_follow_config() {
        let mut config = Config::default();
        config.pipeline.input_delay_ms = 0;
        config.memory.max_context_tokens = 1234;
        config.persona.system_instruction = Some("be brief".to_string());

        let settings = ChatSettings::from_config(&config);
        assert_eq!(settings.input_delay, Duration::ZERO);
        assert_eq!(settings.context_limit, 1234);
        assert_eq!(settings.system_instruction, "be brief");
    }
}
