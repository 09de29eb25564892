//! Track resolution pipeline
//!
//! References on a problematic host go through the external resolver first;
//! its direct stream URL is then loaded by the generic loader and the
//! resolver's title and duration replace the loader's metadata. Everything
//! else goes straight to the generic loader.

use super::{LoadResult, MediaResolver, TrackLoadOutcome, TrackLoader};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which source manager the pipeline was built with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    /// External resolver in front of the generic loader
    Enhanced,

    /// Generic loader only
    Default,
}

impl std::fmt::Display for SourceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceMode::Enhanced => write!(f, "enhanced"),
            SourceMode::Default => write!(f, "default"),
        }
    }
}

pub struct TrackResolutionPipeline {
    loader: Arc<dyn TrackLoader>,
    resolver: Option<Arc<dyn MediaResolver>>,
    /// Lowercase host names routed through the resolver
    problematic_hosts: Vec<String>,
}

impl TrackResolutionPipeline {
    /// Pipeline with an external resolver for `problematic_hosts`
    pub fn new(
        loader: Arc<dyn TrackLoader>,
        resolver: Option<Arc<dyn MediaResolver>>,
        problematic_hosts: Vec<String>,
    ) -> Self {
        let problematic_hosts = problematic_hosts
            .into_iter()
            .map(|host| host.trim().to_ascii_lowercase())
            .filter(|host| !host.is_empty())
            .collect();

        Self {
            loader,
            resolver,
            problematic_hosts,
        }
    }

    /// Pipeline using only the generic loader
    pub fn loader_only(loader: Arc<dyn TrackLoader>) -> Self {
        Self::new(loader, None, Vec::new())
    }

    /// Build the enhanced pipeline when the resolver responds, else the default one
    pub async fn select(
        loader: Arc<dyn TrackLoader>,
        resolver: Option<Arc<dyn MediaResolver>>,
        problematic_hosts: Vec<String>,
    ) -> Self {
        match resolver {
            Some(resolver) if resolver.is_available().await => {
                info!(resolver = resolver.name(), "Using enhanced source manager");
                Self::new(loader, Some(resolver), problematic_hosts)
            }
            Some(resolver) => {
                warn!(
                    resolver = resolver.name(),
                    "Resolver unavailable, using default source manager"
                );
                Self::loader_only(loader)
            }
            None => {
                info!("Using default source manager");
                Self::loader_only(loader)
            }
        }
    }

    pub fn mode(&self) -> SourceMode {
        if self.resolver.is_some() {
            SourceMode::Enhanced
        } else {
            SourceMode::Default
        }
    }

    /// True when the reference's host is (a subdomain of) a problematic host
    pub fn is_problematic(&self, reference: &str) -> bool {
        let Some(host) = extract_host(reference) else {
            return false;
        };
        self.problematic_hosts
            .iter()
            .any(|candidate| host == *candidate || host.ends_with(&format!(".{}", candidate)))
    }

    /// Resolve a reference into an outcome
    pub async fn resolve(&self, reference: &str) -> TrackLoadOutcome {
        let reference = reference.trim();

        match &self.resolver {
            Some(resolver) if self.is_problematic(reference) => {
                self.resolve_via_resolver(resolver.as_ref(), reference).await
            }
            _ => {
                debug!(reference = %reference, loader = self.loader.name(), "Loading directly");
                normalize(self.loader.load(reference).await)
            }
        }
    }

    async fn resolve_via_resolver(
        &self,
        resolver: &dyn MediaResolver,
        reference: &str,
    ) -> TrackLoadOutcome {
        debug!(reference = %reference, resolver = resolver.name(), "Resolving via external resolver");

        let media = match resolver.resolve(reference).await {
            Ok(media) => media,
            Err(e) => {
                warn!(reference = %reference, error = %e, "External resolver failed");
                return TrackLoadOutcome::Failed(format!("Could not resolve the video: {}", e));
            }
        };

        let title = media.title.clone();
        let duration = media.duration();

        match normalize(self.loader.load(&media.stream_url).await) {
            TrackLoadOutcome::Loaded(track) => {
                TrackLoadOutcome::Loaded(track.with_metadata(title, duration))
            }
            TrackLoadOutcome::PlaylistLoaded { tracks, selected } => {
                let tracks = tracks
                    .into_iter()
                    .enumerate()
                    .map(|(index, track)| {
                        if index == selected {
                            track.with_metadata(title.clone(), duration)
                        } else {
                            track
                        }
                    })
                    .collect();
                TrackLoadOutcome::PlaylistLoaded { tracks, selected }
            }
            TrackLoadOutcome::NoMatch => {
                warn!(reference = %reference, "Resolved stream could not be loaded");
                TrackLoadOutcome::Failed("The resolved audio stream could not be played".to_string())
            }
            failed => failed,
        }
    }
}

/// Convert a loader result into an outcome; empty playlists have no match
fn normalize(result: LoadResult) -> TrackLoadOutcome {
    match result {
        LoadResult::TrackLoaded(track) => TrackLoadOutcome::Loaded(track),
        LoadResult::PlaylistLoaded { tracks, .. } if tracks.is_empty() => TrackLoadOutcome::NoMatch,
        LoadResult::PlaylistLoaded { tracks, selected } => {
            let selected = selected.filter(|index| *index < tracks.len()).unwrap_or(0);
            TrackLoadOutcome::PlaylistLoaded { tracks, selected }
        }
        LoadResult::NoMatches => TrackLoadOutcome::NoMatch,
        LoadResult::LoadFailed(message) => TrackLoadOutcome::Failed(message),
    }
}

/// Lowercase host of an `http(s)` URL, without `www.` or port
fn extract_host(reference: &str) -> Option<String> {
    let lower = reference.trim().to_ascii_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))?;

    let authority = rest.split(['/', '?', '#']).next()?;
    let host = authority.rsplit('@').next()?.split(':').next()?;
    let host = host.strip_prefix("www.").unwrap_or(host);

    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}
