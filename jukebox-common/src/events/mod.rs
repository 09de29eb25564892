//! Event types for the jukebox event system
//!
//! Provides shared event definitions and the EventBus used by the bot crates.

mod playback_types;
mod queue_types;

pub use playback_types::PlaybackState;
pub use queue_types::QueueChangeTrigger;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Jukebox event types
///
/// Events are broadcast via [`EventBus`] and can be serialized for external
/// observers (status pages, audit logs).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BotEvent {
    /// Playback state changed (Idle / Playing / Paused)
    PlaybackStateChanged {
        /// Playback state before change
        old_state: PlaybackState,
        /// Playback state after change
        new_state: PlaybackState,
        /// When state changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A track was handed to the audio engine
    TrackStarted {
        track_id: Uuid,
        title: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A track was appended to the queue
    TrackQueued {
        track_id: Uuid,
        title: String,
        /// 1-based position in the queue after appending
        position: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Queue contents changed for a reason other than a plain append
    QueueChanged {
        trigger: QueueChangeTrigger,
        /// Number of tracks waiting after the change
        queue_len: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A reference could not be turned into a playable track
    ResolutionFailed {
        reference: String,
        reason: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A resolution finished after the session moved on and was dropped
    StaleOutcomeDiscarded {
        /// Generation captured when the resolution started
        generation: u64,
        /// Session generation when the outcome arrived
        current_generation: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl BotEvent {
    /// Short event name for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            BotEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            BotEvent::TrackStarted { .. } => "TrackStarted",
            BotEvent::TrackQueued { .. } => "TrackQueued",
            BotEvent::QueueChanged { .. } => "QueueChanged",
            BotEvent::ResolutionFailed { .. } => "ResolutionFailed",
            BotEvent::StaleOutcomeDiscarded { .. } => "StaleOutcomeDiscarded",
        }
    }
}

/// Central event distribution bus
///
/// Wraps `tokio::broadcast`:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use jukebox_common::events::{BotEvent, EventBus, PlaybackState};
///
/// let event_bus = EventBus::new(16);
/// let mut rx = event_bus.subscribe();
///
/// let delivered = event_bus.emit(BotEvent::PlaybackStateChanged {
///     old_state: PlaybackState::Idle,
///     new_state: PlaybackState::Playing,
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert_eq!(delivered.ok(), Some(1));
///
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<BotEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<BotEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: BotEvent) -> Result<usize, broadcast::error::SendError<BotEvent>> {
        self.tx.send(event)
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
    fn test_event_serialization_is_tagged() {
        let event = BotEvent::PlaybackStateChanged {
            old_state: PlaybackState::Idle,
            new_state: PlaybackState::Playing,
            timestamp: chrono::Utc::now(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "PlaybackStateChanged");
        assert_eq!(json["old_state"], "idle");
        assert_eq!(json["new_state"], "playing");
    }

    #[test]
    fn test_queue_changed_roundtrip_fields() {
        let event = BotEvent::QueueChanged {
            trigger: QueueChangeTrigger::UserStop,
            queue_len: 0,
            timestamp: chrono::Utc::now(),
        };

        let json = serde_json::to_string(&event).unwrap();
        let parsed: BotEvent = serde_json::from_str(&json).unwrap();
        match parsed {
            BotEvent::QueueChanged { trigger, queue_len, .. } => {
                assert_eq!(trigger, QueueChangeTrigger::UserStop);
                assert_eq!(queue_len, 0);
            }
            other => panic!("Expected QueueChanged, got {:?}", other),
        }
        assert_eq!(event.event_type(), "QueueChanged");
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::new(4);
        assert_eq!(bus.subscriber_count(), 0);

        let result = bus.emit(BotEvent::ResolutionFailed {
            reference: "https://example.com/a".to_string(),
            reason: "timeout".to_string(),
            timestamp: chrono::Utc::now(),
        });
        assert!(result.is_err(), "No subscribers should report an error");
    }

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();

        let delivered = bus.emit(BotEvent::TrackStarted {
            track_id: Uuid::new_v4(),
            title: "Song".to_string(),
            timestamp: chrono::Utc::now(),
        });
        assert_eq!(delivered.unwrap(), 1);
        assert_eq!(bus.subscriber_count(), 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event_type(), "TrackStarted");
        assert_eq!(bus.capacity(), 4);
    }

    #[test]
    fn test_default_state_is_idle() {
        assert_eq!(PlaybackState::default(), PlaybackState::Idle);
        assert!(!PlaybackState::Idle.has_track());
        assert!(PlaybackState::Paused.has_track());
    }
}
