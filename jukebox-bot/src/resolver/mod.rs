//! Track resolution
//!
//! Turns a user-supplied reference into a playable [`Track`]:
//! - [`TrackLoader`]: generic loader (reliable path)
//! - [`MediaResolver`]: specialized external resolver for hosts the generic
//!   loader cannot reach directly
//! - [`TrackResolutionPipeline`]: picks the strategy and normalizes results
//!   into a [`TrackLoadOutcome`]

pub mod direct;
pub mod pipeline;
pub mod ytdlp;

pub use direct::DirectUrlLoader;
pub use pipeline::{SourceMode, TrackResolutionPipeline};
pub use ytdlp::{parse_duration_text, parse_resolver_output, YtDlpResolver};

use crate::playback::types::{Track, TrackDuration};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// What the generic loader reports for one reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadResult {
    /// Single track loaded
    TrackLoaded(Track),

    /// Playlist loaded; the source may mark one entry as selected
    PlaylistLoaded {
        tracks: Vec<Track>,
        selected: Option<usize>,
    },

    /// Nothing found for the reference
    NoMatches,

    /// Loading failed with a message
    LoadFailed(String),
}

/// Normalized result of resolving a reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackLoadOutcome {
    Loaded(Track),

    /// Non-empty playlist with the index of the entry to play
    PlaylistLoaded { tracks: Vec<Track>, selected: usize },

    NoMatch,

    Failed(String),
}

impl TrackLoadOutcome {
    /// Track to start or enqueue, if the outcome produced one
    pub fn into_track(self) -> Option<Track> {
        match self {
            TrackLoadOutcome::Loaded(track) => Some(track),
            TrackLoadOutcome::PlaylistLoaded { mut tracks, selected } => {
                if selected < tracks.len() {
                    Some(tracks.swap_remove(selected))
                } else {
                    tracks.into_iter().next()
                }
            }
            TrackLoadOutcome::NoMatch | TrackLoadOutcome::Failed(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            TrackLoadOutcome::Loaded(_) | TrackLoadOutcome::PlaylistLoaded { .. }
        )
    }
}

/// Metadata returned by the external resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    pub title: String,

    /// Direct stream URL, handed to the generic loader
    pub stream_url: String,

    /// Raw duration text (`MM:SS` or `HH:MM:SS`)
    pub duration_text: String,
}

impl ResolvedMedia {
    /// Parsed duration; unparseable text is unknown
    pub fn duration(&self) -> TrackDuration {
        TrackDuration::from_millis(parse_duration_text(&self.duration_text))
    }
}

/// External resolver failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    /// Process could not be started
    #[error("failed to start resolver: {0}")]
    Spawn(String),

    /// Process did not finish in time
    #[error("resolver timed out after {0:?}")]
    Timeout(Duration),

    /// Process exited unsuccessfully
    #[error("resolver exited with status {0}")]
    ExitStatus(String),

    /// Fewer than three output lines
    #[error("resolver produced {0} of 3 expected output lines")]
    IncompleteOutput(usize),
}

/// Generic loader collaborator
#[async_trait]
pub trait TrackLoader: Send + Sync {
    /// Loader identifier for logging
    fn name(&self) -> &'static str;

    /// Load a reference (URL or search term)
    async fn load(&self, reference: &str) -> LoadResult;
}

/// Specialized external resolver collaborator
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Resolver identifier for logging
    fn name(&self) -> &'static str;

    /// Resolve a page URL into title, direct stream URL and duration text
    async fn resolve(&self, url: &str) -> Result<ResolvedMedia, ResolverError>;

    /// Check if the resolver can run at all (program installed, etc.)
    async fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(title: &str) -> Track {
        Track::new(title, title, TrackDuration::Unknown)
    }

    #[test]
    fn test_playlist_outcome_picks_selected() {
        let outcome = TrackLoadOutcome::PlaylistLoaded {
            tracks: vec![track("a"), track("b"), track("c")],
            selected: 1,
        };
        assert_eq!(outcome.into_track().map(|t| t.title), Some("b".to_string()));
    }

    #[test]
    fn test_playlist_outcome_out_of_range_falls_back_to_first() {
        let outcome = TrackLoadOutcome::PlaylistLoaded {
            tracks: vec![track("a"), track("b")],
            selected: 7,
        };
        assert_eq!(outcome.into_track().map(|t| t.title), Some("a".to_string()));
    }

    #[test]
    fn test_failure_outcomes_have_no_track() {
        assert!(TrackLoadOutcome::NoMatch.into_track().is_none());
        assert!(TrackLoadOutcome::Failed("x".into()).into_track().is_none());
        assert!(!TrackLoadOutcome::NoMatch.is_success());
    }

    #[test]
    fn test_resolved_media_duration() {
        let media = ResolvedMedia {
            title: "Song".into(),
            stream_url: "https://cdn/x".into(),
            duration_text: "3:45".into(),
        };
        assert_eq!(media.duration(), TrackDuration::Millis(225_000));

        let live = ResolvedMedia {
            duration_text: "live".into(),
            ..media
        };
        assert_eq!(live.duration(), TrackDuration::Unknown);
    }
}
