//! Message Bus for pipeline progress
//!
//! The MessageBus lets a front-end watch a run without holding on to the
//! orchestrator: every stage transition is published as an event. It uses
//! bounded channels and supports both specific event subscriptions and
//! global "All" subscriptions.
//!
//! Publishing never waits on a slow subscriber. An event that does not fit in
//! a full channel is dropped for that subscriber; closed channels are pruned.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use crate::pipeline::{PipelineStage, RunOutcome};

/// Channel buffer size for bounded channels
const CHANNEL_BUFFER_SIZE: usize = 100;

/// Event types that can be published on the message bus
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum EventType {
    /// A pipeline run has started
    RunStarted,
    /// A stage changed status
    StageUpdated,
    /// A pipeline run has produced its reply
    RunFinished,
    /// The chat session was replaced
    SessionReset,
    /// Subscribe to all event types
    All,
}

/// Events that can be published on the message bus
#[derive(Debug, Clone)]
pub enum Event {
    /// Run started for a user query
    RunStarted { query: String },
    /// Snapshot of a stage right after its transition
    StageUpdated(PipelineStage),
    /// Run finished with the reply shown to the user
    RunFinished { reply: String, outcome: RunOutcome },
    /// Chat session reset; carries the new handle id
    SessionReset { handle_id: Uuid },
}

impl Event {
    /// Get the event type for this event
    pub fn event_type(&self) -> EventType {
        match self {
            Event::RunStarted { .. } => EventType::RunStarted,
            Event::StageUpdated(_) => EventType::StageUpdated,
            Event::RunFinished { .. } => EventType::RunFinished,
            Event::SessionReset { .. } => EventType::SessionReset,
        }
    }
}

/// Message bus for pub/sub communication between components
pub struct MessageBus {
    channels: Arc<Mutex<HashMap<EventType, Vec<mpsc::Sender<Event>>>>>,
}

impl MessageBus {
    /// Create a new MessageBus
    pub fn new() -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Subscribe to a specific event type, or `EventType::All`
    pub async fn subscribe(&self, event_type: EventType) -> mpsc::Receiver<Event> {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let mut channels = self.channels.lock().await;
        channels.entry(event_type).or_default().push(tx);
        rx
    }

    /// Publish an event to subscribers of its type and to "All" subscribers
    pub async fn publish(&self, event: Event) {
        let mut channels = self.channels.lock().await;
        let event_type = event.event_type();

        for key in [event_type, EventType::All] {
            if let Some(subscribers) = channels.get_mut(&key) {
                subscribers.retain(|tx| match tx.try_send(event.clone()) {
                    Ok(()) => true,
                    Err(TrySendError::Full(_)) => {
                        tracing::warn!("Subscriber channel full, dropping {:?}", event_type);
                        true
                    }
                    Err(TrySendError::Closed(_)) => false,
                });
            }
        }
    }

    /// Number of live subscriptions across all event types
    pub async fn subscriber_count(&self) -> usize {
        let channels = self.channels.lock().await;
        channels.values().map(|subs| subs.len()).sum()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}
