//! Five-stage pipeline: stage model, prompt templates and the orchestrator

pub mod orchestrator;
pub mod prompts;
pub mod stage;

pub use orchestrator::{PipelineOrchestrator, PipelineReport, RunOutcome, DEFAULT_INPUT_DELAY};
pub use stage::{InvalidTransition, PipelineStage, StageBoard, StageId, StageStatus};
