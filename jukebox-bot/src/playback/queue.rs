//! Playback queue
//!
//! Ordered FIFO of pending tracks plus a single "current" slot.
//!
//! The queue itself is not synchronized; it lives inside the session state
//! behind one mutex so every mutation is serialized with the playback state
//! and generation counter.

use super::types::Track;
use std::collections::VecDeque;

/// Pending tracks and the track currently assigned to the audio engine
#[derive(Debug, Default)]
pub struct PlaybackQueue {
    /// Currently playing (or paused) track
    current: Option<Track>,

    /// Tracks waiting to play, head first
    pending: VecDeque<Track>,
}

impl PlaybackQueue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a track to the tail
    ///
    /// Returns the 1-based position of the appended track.
    pub fn enqueue(&mut self, track: Track) -> usize {
        self.pending.push_back(track);
        self.pending.len()
    }

    /// Remove the head and make it current
    ///
    /// With nothing pending, current is cleared and `None` returned.
    pub fn dequeue_next(&mut self) -> Option<Track> {
        self.current = self.pending.pop_front();
        self.current.clone()
    }

    /// Current track, without mutating
    pub fn peek_current(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    /// Replace current directly, bypassing the pending list
    pub fn set_current(&mut self, track: Track) {
        self.current = Some(track);
    }

    /// User-triggered advance; same queue effect as [`Self::dequeue_next`]
    pub fn skip(&mut self) -> Option<Track> {
        self.dequeue_next()
    }

    /// Empty the pending list and clear current
    pub fn clear(&mut self) {
        self.pending.clear();
        self.current = None;
    }

    /// Number of pending tracks (current not included)
    pub fn size(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn has_current(&self) -> bool {
        self.current.is_some()
    }

    /// Up to `limit` pending tracks, head first
    pub fn upcoming(&self, limit: usize) -> Vec<Track> {
        self.pending.iter().take(limit).cloned().collect()
    }
}
