//! Playback types shared across modules

use jukebox_common::human_time::{format_duration_u64, LIVE_DURATION};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Track length as reported by a loader or resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackDuration {
    /// Loader reported nothing, or zero
    #[default]
    Unknown,

    /// Known length in milliseconds (always > 0)
    Millis(u64),

    /// Live stream without an end
    Live,
}

impl TrackDuration {
    /// Sentinel used by loaders for live/unbounded streams
    pub const LIVE_SENTINEL_MS: u64 = u64::MAX;

    /// Interpret a raw millisecond count: 0 is unknown, the sentinel is live
    pub fn from_millis(ms: u64) -> Self {
        match ms {
            0 => TrackDuration::Unknown,
            Self::LIVE_SENTINEL_MS => TrackDuration::Live,
            n => TrackDuration::Millis(n),
        }
    }

    /// Known length, if bounded
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            TrackDuration::Millis(ms) => Some(Duration::from_millis(*ms)),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, TrackDuration::Millis(_))
    }
}

impl std::fmt::Display for TrackDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackDuration::Unknown => write!(f, "{}", format_duration_u64(0)),
            TrackDuration::Millis(ms) => write!(f, "{}", format_duration_u64(*ms)),
            TrackDuration::Live => write!(f, "{}", LIVE_DURATION),
        }
    }
}

/// A playable track produced by the resolution pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Identity used in events and logs
    pub id: Uuid,

    /// Display title
    pub title: String,

    /// URI handed to the audio engine
    pub source_uri: String,

    pub duration: TrackDuration,
}

impl Track {
    pub fn new(title: impl Into<String>, source_uri: impl Into<String>, duration: TrackDuration) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            source_uri: source_uri.into(),
            duration,
        }
    }

    /// Copy of this track with metadata replaced; the id is kept
    pub fn with_metadata(mut self, title: impl Into<String>, duration: TrackDuration) -> Self {
        self.title = title.into();
        self.duration = duration;
        self
    }
}

/// Why the audio engine stopped a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackEndReason {
    /// Played to the end
    Finished,

    /// Engine could not open the source
    LoadFailed,

    /// Explicit stop request
    Stopped,

    /// Another track was started in its place
    Replaced,

    /// Engine shut down
    Cleanup,
}

impl TrackEndReason {
    /// Whether the next queued track may start automatically
    pub fn may_start_next(&self) -> bool {
        matches!(self, TrackEndReason::Finished | TrackEndReason::LoadFailed)
    }
}

/// Track-end notification delivered by the audio engine
///
/// Signals can arrive after the session has moved on; `track_id` names the
/// track that ended so the orchestrator only advances past that track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackEndSignal {
    pub track_id: Uuid,
    pub reason: TrackEndReason,
    pub may_advance: bool,
}

impl TrackEndSignal {
    /// Signal for `track_id` whose advance flag follows the reason
    pub fn new(track_id: Uuid, reason: TrackEndReason) -> Self {
        Self {
            track_id,
            reason,
            may_advance: reason.may_start_next(),
        }
    }
}
