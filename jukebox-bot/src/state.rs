//! Shared session state
//!
//! The playback queue, playback state and generation marker live together in
//! one [`Session`] behind a single mutex. Commands, background resolutions and
//! track-end signals all mutate through that lock; holders only do in-memory
//! work plus non-blocking player instructions.

use crate::playback::queue::PlaybackQueue;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, MutexGuard};
use tracing::trace;

pub use jukebox_common::events::{BotEvent, EventBus, PlaybackState};

/// Mutable state of one voice session
#[derive(Debug, Default)]
pub struct Session {
    pub queue: PlaybackQueue,

    pub state: PlaybackState,

    /// Bumped by `stop`; background outcomes carrying an older value are dropped
    pub generation: u64,
}

impl Session {
    /// Set the playback state, returning the previous one if it changed
    pub fn transition(&mut self, new_state: PlaybackState) -> Option<PlaybackState> {
        if self.state == new_state {
            return None;
        }
        let old = self.state;
        self.state = new_state;
        Some(old)
    }

    pub fn is_current_generation(&self, generation: u64) -> bool {
        self.generation == generation
    }
}

/// Point-in-time copy of the session for queries and tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: PlaybackState,
    pub current_title: Option<String>,
    pub queued_titles: Vec<String>,
    pub generation: u64,
}

/// Shared state accessible by all components
pub struct SharedState {
    session: Mutex<Session>,

    /// Event broadcaster; no receivers is fine
    pub events: EventBus,

    /// Outcomes dropped because a `stop` happened while they were in flight
    stale_outcomes_total: AtomicU64,
}

impl SharedState {
    pub fn new(event_capacity: usize) -> Self {
        Self {
            session: Mutex::new(Session::default()),
            events: EventBus::new(event_capacity),
            stale_outcomes_total: AtomicU64::new(0),
        }
    }

    /// Exclusive access to the session
    pub async fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().await
    }

    /// Publish an event; having no subscribers is fine
    pub fn broadcast_event(&self, event: BotEvent) {
        let event_type = event.event_type();
        match self.events.emit(event) {
            Ok(receivers) => trace!(event = event_type, receivers, "Event broadcast"),
            Err(_) => trace!(event = event_type, "Event dropped, no subscribers"),
        }
    }

    pub async fn get_playback_state(&self) -> PlaybackState {
        self.session.lock().await.state
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let session = self.session.lock().await;
        SessionSnapshot {
            state: session.state,
            current_title: session.queue.peek_current().map(|t| t.title.clone()),
            queued_titles: session
                .queue
                .upcoming(usize::MAX)
                .into_iter()
                .map(|t| t.title)
                .collect(),
            generation: session.generation,
        }
    }

    pub fn increment_stale_outcomes(&self) {
        self.stale_outcomes_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stale_outcomes_total(&self) -> u64 {
        self.stale_outcomes_total.load(Ordering::Relaxed)
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(100)
    }
}
