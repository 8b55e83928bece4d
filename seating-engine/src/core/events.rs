//! Engine change notification
//!
//! The engine owns its state; hosts learn about changes by subscribing to
//! [`EngineEvent`]s instead of diffing queries after every command.

use serde::Serialize;
use shared::models::AreaKind;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::assignment::RemoteStatus;
use crate::draw_mode::DrawMode;

/// Event channel capacity (slow subscribers observe `Lagged`)
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// What kind of commit changed the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeReason {
    Edit,
    Transform,
    Annotation,
    Assignment,
    Undo,
    Redo,
    Load,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    SelectionChanged {
        count: usize,
    },
    PlanChanged {
        area: AreaKind,
        reason: ChangeReason,
    },
    HistoryChanged {
        can_undo: bool,
        can_redo: bool,
    },
    DrawModeChanged {
        mode: DrawMode,
    },
    ProposalUpdated {
        proposal_id: Uuid,
        area: AreaKind,
        score: f64,
    },
    RemoteStateChanged {
        status: RemoteStatus,
    },
    AnalysisUpdated {
        area: AreaKind,
        score: f64,
        rating: String,
    },
}

/// Broadcast fan-out for [`EngineEvent`]
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EngineEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.tx.subscribe()
    }

    /// Publish an event; having no subscribers is fine
    pub fn publish(&self, event: EngineEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Engine event dropped: no active receivers");
        }
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new();
        bus.publish(EngineEvent::SelectionChanged { count: 0 });
        assert_eq!(bus.receiver_count(), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_in_order() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        bus.publish(EngineEvent::SelectionChanged { count: 2 });
        bus.publish(EngineEvent::HistoryChanged {
            can_undo: true,
            can_redo: false,
        });

        assert_eq!(
            rx.recv().await.unwrap(),
            EngineEvent::SelectionChanged { count: 2 }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            EngineEvent::HistoryChanged {
                can_undo: true,
                can_redo: false
            }
        );
    }

    #[test]
    fn test_event_serializes_tagged() {
        let json = serde_json::to_string(&EngineEvent::PlanChanged {
            area: AreaKind::Banquet,
            reason: ChangeReason::Undo,
        })
        .unwrap();
        assert!(json.contains("\"event\":\"plan_changed\""));
        assert!(json.contains("\"reason\":\"undo\""));
    }
}
