//! Event types and broadcast bus for scan-session notifications
//!
//! The orchestrator emits a `ScanEvent` on every state transition so UI
//! collaborators can react without polling the current-session slot.
//! Events are serializable for SSE transmission.

use crate::models::ScanMode;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Scan lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScanEvent {
    /// A new session started and now owns the displayed-session slot
    SessionStarted {
        session_id: Uuid,
        mode: ScanMode,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Acquisition finished for a session that is still current
    SourceResolved {
        session_id: Uuid,
        ingredient_count: usize,
        /// Whether a catalog match supplied product metadata
        matched_catalog: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Batch scoring issued for the resolved ingredient list
    ScoringStarted {
        session_id: Uuid,
        ingredient_count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Session reached `Complete`
    SessionCompleted {
        session_id: Uuid,
        ingredient_count: usize,
        /// Whether a safety report is attached to the result
        scored: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Session reached `Failed` (acquisition error)
    SessionFailed {
        session_id: Uuid,
        error: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Scoring failed on an otherwise successful session; the session still
    /// completed, without a safety report
    ScoringUnavailable {
        session_id: Uuid,
        reason: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A superseded session produced a result after a newer session took
    /// over the slot; the result was dropped
    StaleResultDiscarded {
        session_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Sentiment summary fetch finished
    SentimentLoaded {
        total_reviews: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Sentiment summary fetch failed
    SentimentFailed {
        error: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl ScanEvent {
    /// Event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            ScanEvent::SessionStarted { .. } => "SessionStarted",
            ScanEvent::SourceResolved { .. } => "SourceResolved",
            ScanEvent::ScoringStarted { .. } => "ScoringStarted",
            ScanEvent::SessionCompleted { .. } => "SessionCompleted",
            ScanEvent::SessionFailed { .. } => "SessionFailed",
            ScanEvent::ScoringUnavailable { .. } => "ScoringUnavailable",
            ScanEvent::StaleResultDiscarded { .. } => "StaleResultDiscarded",
            ScanEvent::SentimentLoaded { .. } => "SentimentLoaded",
            ScanEvent::SentimentFailed { .. } => "SentimentFailed",
        }
    }

    /// Session this event belongs to, if any
    pub fn session_id(&self) -> Option<Uuid> {
        match self {
            ScanEvent::SessionStarted { session_id, .. }
            | ScanEvent::SourceResolved { session_id, .. }
            | ScanEvent::ScoringStarted { session_id, .. }
            | ScanEvent::SessionCompleted { session_id, .. }
            | ScanEvent::SessionFailed { session_id, .. }
            | ScanEvent::ScoringUnavailable { session_id, .. }
            | ScanEvent::StaleResultDiscarded { session_id, .. } => Some(*session_id),
            ScanEvent::SentimentLoaded { .. } | ScanEvent::SentimentFailed { .. } => None,
        }
    }
}

/// Central event distribution bus
///
/// Backed by tokio::broadcast: non-blocking publish, multiple concurrent
/// subscribers, automatic cleanup when subscribers drop.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ScanEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a bus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring whether anyone is listening
    ///
    /// State transitions are observable through the current-session slot as
    /// well, so a missed event is never a correctness problem.
    pub fn emit_lossy(&self, event: ScanEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_delivers_to_all_subscribers() {
        let bus = EventBus::new(10);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.emit_lossy(ScanEvent::SessionStarted {
            session_id: Uuid::new_v4(),
            mode: ScanMode::Image,
            timestamp: chrono::Utc::now(),
        });

        assert_eq!(rx1.try_recv().expect("rx1").event_type(), "SessionStarted");
        assert_eq!(rx2.try_recv().expect("rx2").event_type(), "SessionStarted");
    }

    #[test]
    fn emit_lossy_without_subscribers_does_not_panic() {
        let bus = EventBus::new(2);
        bus.emit_lossy(ScanEvent::SentimentFailed {
            error: "down".into(),
            timestamp: chrono::Utc::now(),
        });
        assert_eq!(bus.capacity(), 2);
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let id = Uuid::new_v4();
        let event = ScanEvent::SessionFailed {
            session_id: id,
            error: "no catalog entry".into(),
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_string(&event).expect("serialize");
        assert!(json.contains("\"type\":\"SessionFailed\""));
        assert_eq!(event.session_id(), Some(id));
    }
}
