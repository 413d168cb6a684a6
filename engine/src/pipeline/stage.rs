//! Pipeline stage model
//!
//! Five fixed stages, each with a status that only moves forward within a
//! run: Pending → Processing → {Complete | Error | Skipped}. The
//! `StageBoard` holds all five and rejects any other transition.

use sdk::GroundingSource;
use serde::Serialize;
use std::fmt;

/// Stage identifiers, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub enum StageId {
    Input = 1,
    Translation = 2,
    Decision = 3,
    Search = 4,
    Response = 5,
}

impl StageId {
    pub const ALL: [StageId; 5] = [
        StageId::Input,
        StageId::Translation,
        StageId::Decision,
        StageId::Search,
        StageId::Response,
    ];

    /// 1-based stage number
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            StageId::Input => "Input Handler",
            StageId::Translation => "Translation Agent",
            StageId::Decision => "Reasoning Agent",
            StageId::Search => "Search Agent",
            StageId::Response => "Response Generation Agent",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StageId::Input => "Receives the user's Hinglish query.",
            StageId::Translation => {
                "Translates the Hinglish query into English for better understanding."
            }
            StageId::Decision => "Decides if a real-time web search is needed to answer the query.",
            StageId::Search => {
                "Performs a web search to gather up-to-date information if required."
            }
            StageId::Response => {
                "Generates the final response using chat history and search results."
            }
        }
    }

    fn index(self) -> usize {
        self as usize - 1
    }
}

impl From<StageId> for u8 {
    fn from(id: StageId) -> Self {
        id.number()
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.number(), self.name())
    }
}

/// Where a stage is in the current run, with only the data valid there
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Processing,
    Complete {
        output: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        sources: Vec<GroundingSource>,
    },
    Error {
        message: String,
    },
    Skipped {
        reason: String,
    },
}

impl StageStatus {
    pub fn complete(output: impl Into<String>) -> Self {
        Self::Complete {
            output: output.into(),
            sources: Vec::new(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::Processing => "processing",
            StageStatus::Complete { .. } => "complete",
            StageStatus::Error { .. } => "error",
            StageStatus::Skipped { .. } => "skipped",
        }
    }

    /// Text shown for the stage; empty while pending or processing
    pub fn output(&self) -> &str {
        match self {
            StageStatus::Pending | StageStatus::Processing => "",
            StageStatus::Complete { output, .. } => output,
            StageStatus::Error { message } => message,
            StageStatus::Skipped { reason } => reason,
        }
    }

    pub fn sources(&self) -> &[GroundingSource] {
        match self {
            StageStatus::Complete { sources, .. } => sources,
            _ => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StageStatus::Complete { .. } | StageStatus::Error { .. } | StageStatus::Skipped { .. }
        )
    }

    fn can_become(&self, next: &StageStatus) -> bool {
        match self {
            StageStatus::Pending => matches!(next, StageStatus::Processing),
            StageStatus::Processing => next.is_terminal(),
            _ => false,
        }
    }
}

/// One stage of the pipeline with its static metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineStage {
    pub id: StageId,
    pub name: &'static str,
    pub description: &'static str,
    #[serde(flatten)]
    pub status: StageStatus,
}

impl PipelineStage {
    pub fn pending(id: StageId) -> Self {
        Self {
            id,
            name: id.name(),
            description: id.description(),
            status: StageStatus::Pending,
        }
    }
}

/// Rejected stage transition
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stage {stage} cannot move from {from} to {to}")]
pub struct InvalidTransition {
    pub stage: StageId,
    pub from: &'static str,
    pub to: &'static str,
}

/// The five stages of the current run
#[derive(Debug, Clone, PartialEq)]
pub struct StageBoard {
    stages: [PipelineStage; 5],
}

impl StageBoard {
    pub fn new() -> Self {
        Self {
            stages: StageId::ALL.map(PipelineStage::pending),
        }
    }

    /// Put every stage back to Pending with no output
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn get(&self, id: StageId) -> &PipelineStage {
        &self.stages[id.index()]
    }

    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    pub fn snapshot(&self) -> Vec<PipelineStage> {
        self.stages.to_vec()
    }

    /// Move a stage to its next status.
    ///
    /// # Errors
    /// Returns `InvalidTransition` if the move would go backwards, skip
    /// Processing, or leave a terminal status.
    pub fn transition(
        &mut self,
        id: StageId,
        status: StageStatus,
    ) -> Result<&PipelineStage, InvalidTransition> {
        let stage = &mut self.stages[id.index()];
        if !stage.status.can_become(&status) {
            return Err(InvalidTransition {
                stage: id,
                from: stage.status.label(),
                to: status.label(),
            });
        }
        stage.status = status;
        Ok(stage)
    }
}

impl Default for StageBoard {
    fn default() -> Self {
        Self::new()
    }
}
