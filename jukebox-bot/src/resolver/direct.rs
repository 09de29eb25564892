//! Direct URL loader
//!
//! Generic loader used by the console runtime. Any `http(s)://` reference
//! loads as a single track titled by its last path segment; anything else
//! has no match. Duration is unknown until playback.

use super::{LoadResult, TrackLoader};
use crate::playback::types::{Track, TrackDuration};
use async_trait::async_trait;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct DirectUrlLoader;

impl DirectUrlLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TrackLoader for DirectUrlLoader {
    fn name(&self) -> &'static str {
        "direct-url"
    }

    async fn load(&self, reference: &str) -> LoadResult {
        let reference = reference.trim();
        let Some(rest) = strip_http_scheme(reference) else {
            debug!(reference = %reference, "Not a URL, no match");
            return LoadResult::NoMatches;
        };

        let path = rest.split(['?', '#']).next().unwrap_or_default();
        let title = path
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(reference);

        if path.trim_matches('/').is_empty() {
            return LoadResult::LoadFailed(format!("URL has no host: {}", reference));
        }

        LoadResult::TrackLoaded(Track::new(title, reference, TrackDuration::Unknown))
    }
}

fn strip_http_scheme(reference: &str) -> Option<&str> {
    let lower = reference.get(..8).unwrap_or(reference).to_ascii_lowercase();
    if lower.starts_with("https://") {
        Some(&reference[8..])
    } else if lower.starts_with("http://") {
        Some(&reference[7..])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_url_titled_by_last_segment() {
        let loader = DirectUrlLoader::new();
        match loader.load("https://cdn.test/music/song.mp3?token=1").await {
            LoadResult::TrackLoaded(track) => {
                assert_eq!(track.title, "song.mp3");
                assert_eq!(track.source_uri, "https://cdn.test/music/song.mp3?token=1");
                assert_eq!(track.duration, TrackDuration::Unknown);
            }
            other => panic!("Expected TrackLoaded, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bare_host_uses_host_as_title() {
        let loader = DirectUrlLoader::new();
        match loader.load("HTTP://radio.test/").await {
            LoadResult::TrackLoaded(track) => assert_eq!(track.title, "radio.test"),
            other => panic!("Expected TrackLoaded, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_url_has_no_match() {
        let loader = DirectUrlLoader::new();
        assert_eq!(loader.load("never gonna give").await, LoadResult::NoMatches);
        assert_eq!(loader.load("ftp://x/y").await, LoadResult::NoMatches);
    }

    #[tokio::test]
    async fn test_empty_host_fails() {
        let loader = DirectUrlLoader::new();
        assert!(matches!(loader.load("https://").await, LoadResult::LoadFailed(_)));
    }
}
