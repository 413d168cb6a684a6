//! Pipeline Orchestrator
//!
//! Runs one user query through the five stages and produces the reply shown
//! to the user. Every gateway and session call is matched on its `Result`:
//! translation and response failures end the run with their own fallback
//! text, a search failure only costs the reply its grounding.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::prompts::{
    augmented_instruction, decision_output, decision_prompt, needs_search, translation_prompt,
    MISSING_SESSION_REPLY, RESPONSE_FAILED_REPLY, SEARCH_SKIPPED_OUTPUT,
    TRANSLATION_FAILED_REPLY,
};
use super::stage::{PipelineStage, StageBoard, StageId, StageStatus};
use crate::llm::ModelGateway;
use crate::message_bus::{Event, MessageBus};
use crate::session::ChatSession;

/// Delay on the input stage so the progress display has something to show
pub const DEFAULT_INPUT_DELAY: Duration = Duration::from_millis(300);

/// Which exit path a run took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The response stage answered; `grounded` is true if search results
    /// were folded into the prompt
    Replied { grounded: bool },
    MissingSession,
    TranslationFailed,
    ResponseFailed,
}

/// Everything a run produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub reply: String,
    pub outcome: RunOutcome,
    pub stages: Vec<PipelineStage>,
}

/// Sequences the five stages for one query at a time
pub struct PipelineOrchestrator {
    gateway: ModelGateway,
    board: StageBoard,
    bus: Option<Arc<MessageBus>>,
    input_delay: Duration,
}

impl PipelineOrchestrator {
    pub fn new(gateway: ModelGateway) -> Self {
        Self {
            gateway,
            board: StageBoard::new(),
            bus: None,
            input_delay: DEFAULT_INPUT_DELAY,
        }
    }

    pub fn with_input_delay(mut self, delay: Duration) -> Self {
        self.input_delay = delay;
        self
    }

    /// Publish run and stage events on `bus`
    pub fn with_message_bus(mut self, bus: Arc<MessageBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Stages of the latest run
    pub fn stages(&self) -> &[PipelineStage] {
        self.board.stages()
    }

    pub fn stage(&self, id: StageId) -> &PipelineStage {
        self.board.get(id)
    }

    /// Run the pipeline for `query` and return the reply.
    ///
    /// Never fails: every failure path has its own fallback reply, and the
    /// report says which one was taken. The stage board is cleared first;
    /// without a session no stage runs and all of them stay Pending.
    pub async fn run(&mut self, query: &str, session: Option<&mut ChatSession>) -> PipelineReport {
        self.board.reset();

        let Some(session) = session else {
            warn!("Pipeline run without a chat session");
            return self.finish(MISSING_SESSION_REPLY, RunOutcome::MissingSession).await;
        };

        info!(query_len = query.len(), "Pipeline run started");
        self.publish(Event::RunStarted {
            query: query.to_string(),
        })
        .await;

        // 1. Input
        self.update(StageId::Input, StageStatus::Processing).await;
        if !self.input_delay.is_zero() {
            tokio::time::sleep(self.input_delay).await;
        }
        self.update(StageId::Input, StageStatus::complete(query)).await;

        // 2. Translation
        self.update(StageId::Translation, StageStatus::Processing).await;
        let translated = match self
            .gateway
            .single_turn(&translation_prompt(query), None)
            .await
        {
            Ok(text) => {
                self.update(StageId::Translation, StageStatus::complete(text.clone()))
                    .await;
                text
            }
            Err(e) => {
                error!("Translation stage failed: {}", e);
                self.update(
                    StageId::Translation,
                    StageStatus::Error {
                        message: e.stage_text(),
                    },
                )
                .await;
                return self
                    .finish(TRANSLATION_FAILED_REPLY, RunOutcome::TranslationFailed)
                    .await;
            }
        };

        // 3. Decision
        self.update(StageId::Decision, StageStatus::Processing).await;
        let search = match self
            .gateway
            .single_turn(&decision_prompt(&translated), None)
            .await
        {
            Ok(answer) => needs_search(&answer),
            Err(e) => {
                warn!("Decision stage failed, assuming no search: {}", e);
                false
            }
        };
        debug!(search, "Search decision");
        self.update(
            StageId::Decision,
            StageStatus::complete(decision_output(search)),
        )
        .await;

        // 4. Search
        self.update(StageId::Search, StageStatus::Processing).await;
        let mut prompt = query.to_string();
        let mut grounded = false;
        if search {
            match self.gateway.search_turn(&translated).await {
                Ok(result) => {
                    info!(sources = result.sources.len(), "Search stage complete");
                    prompt = augmented_instruction(&result.text, query);
                    grounded = true;
                    self.update(
                        StageId::Search,
                        StageStatus::Complete {
                            output: result.text,
                            sources: result.sources,
                        },
                    )
                    .await;
                }
                Err(e) => {
                    warn!("Search stage failed, answering without it: {}", e);
                    self.update(
                        StageId::Search,
                        StageStatus::Error {
                            message: e.stage_text(),
                        },
                    )
                    .await;
                }
            }
        } else {
            self.update(
                StageId::Search,
                StageStatus::Skipped {
                    reason: SEARCH_SKIPPED_OUTPUT.to_string(),
                },
            )
            .await;
        }

        // 5. Response
        self.update(StageId::Response, StageStatus::Processing).await;
        match session.send(&prompt).await {
            Ok(reply) => {
                self.update(StageId::Response, StageStatus::complete(reply.clone()))
                    .await;
                self.finish(&reply, RunOutcome::Replied { grounded }).await
            }
            Err(e) => {
                error!("Response stage failed: {}", e);
                self.update(
                    StageId::Response,
                    StageStatus::Error {
                        message: e.stage_text(),
                    },
                )
                .await;
                self.finish(RESPONSE_FAILED_REPLY, RunOutcome::ResponseFailed)
                    .await
            }
        }
    }

    async fn update(&mut self, id: StageId, status: StageStatus) {
        match self.board.transition(id, status) {
            Ok(stage) => {
                debug!(stage = %id, status = stage.status.label(), "Stage updated");
                let snapshot = stage.clone();
                self.publish(Event::StageUpdated(snapshot)).await;
            }
            Err(e) => warn!("Ignoring stage update: {}", e),
        }
    }

    async fn finish(&self, reply: &str, outcome: RunOutcome) -> PipelineReport {
        info!(?outcome, "Pipeline run finished");
        self.publish(Event::RunFinished {
            reply: reply.to_string(),
            outcome,
        })
        .await;
        PipelineReport {
            reply: reply.to_string(),
            outcome,
            stages: self.board.snapshot(),
        }
    }

    async fn publish(&self, event: Event) {
        if let Some(bus) = &self.bus {
            bus.publish(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{GenerateRequest, Generation, LLMError, LLMProvider};
    use async_trait::async_trait;
    use crate::message_bus::EventType;

    struct Unreachable;

    #[async_trait]
    impl LLMProvider for Unreachable {
        fn name(&self) -> &str {
            "unreachable"
        }

        fn model(&self) -> &str {
            "none"
        }

        async fn generate(&self, _request: &GenerateRequest) -> crate::llm::Result<Generation> {
            Err(LLMError::ProviderUnavailable("offline".to_string()))
        }
    }

    fn orchestrator() -> PipelineOrchestrator {
        PipelineOrchestrator::new(ModelGateway::new(Arc::new(Unreachable)))
            .with_input_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_missing_session_touches_no_stage() {
        let mut orchestrator = orchestrator();
        let report = orchestrator.run("hi wassup", None).await;

        assert_eq!(report.reply, MISSING_SESSION_REPLY);
        assert_eq!(report.outcome, RunOutcome::MissingSession);
        assert!(report
            .stages
            .iter()
            .all(|stage| stage.status == StageStatus::Pending));
    }

    #[tokio::test]
    async fn test_translation_failure_stops_the_run() {
        let provider: Arc<dyn LLMProvider> = Arc::new(Unreachable);
        let mut session = ChatSession::new(Arc::clone(&provider), "persona");
        let mut orchestrator = orchestrator();

        let report = orchestrator.run("kya scene hai", Some(&mut session)).await;

        assert_eq!(report.reply, TRANSLATION_FAILED_REPLY);
        assert_eq!(report.outcome, RunOutcome::TranslationFailed);
        assert_eq!(
            orchestrator.stage(StageId::Input).status,
            StageStatus::complete("kya scene hai")
        );
        assert_eq!(
            orchestrator.stage(StageId::Translation).status.output(),
            "Error: Provider unavailable: offline"
        );
        for id in [StageId::Decision, StageId::Search, StageId::Response] {
            assert_eq!(orchestrator.stage(id).status, StageStatus::Pending);
        }
        assert_eq!(session.turn_count(), 0);
    }

    #[tokio::test]
    async fn test_run_publishes_events() {
        let bus = Arc::new(MessageBus::new());
        let mut rx = bus.subscribe(EventType::All).await;
        let mut session = ChatSession::new(Arc::new(Unreachable), "persona");
        let mut orchestrator = orchestrator().with_message_bus(Arc::clone(&bus));

        orchestrator.run("hello", Some(&mut session)).await;

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert!(matches!(events.first(), Some(Event::RunStarted { .. })));
        assert!(matches!(
            events.last(),
            Some(Event::RunFinished {
                outcome: RunOutcome::TranslationFailed,
                ..
            })
        ));
        let stage_updates = events
            .iter()
            .filter(|e| matches!(e, Event::StageUpdated(_)))
            .count();
        // Input twice, Translation twice
        assert_eq!(stage_updates, 4);
    }
}
