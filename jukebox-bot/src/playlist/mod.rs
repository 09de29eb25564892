//! Saved playlists
//!
//! Per-user named playlists of ordered entries. Storage sits behind the
//! [`PlaylistStore`] trait; [`MemoryPlaylistStore`] keeps everything in memory
//! for the lifetime of the process.

pub mod memory;

pub use memory::MemoryPlaylistStore;

use crate::error::Result;
use crate::playback::types::TrackDuration;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One saved entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    /// 1-based position, contiguous within a playlist
    pub order: u32,

    pub title: String,

    /// Reference the user supplied; re-resolved when the playlist is played
    pub reference: String,

    pub duration: TrackDuration,
}

/// Entry data before the store assigns an order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlaylistEntry {
    pub title: String,
    pub reference: String,
    pub duration: TrackDuration,
}

/// Playlist name with its entry count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSummary {
    pub name: String,
    pub entry_count: usize,
}

/// Playlist storage collaborator
///
/// Playlists are scoped by owner; names are case-sensitive.
#[async_trait]
pub trait PlaylistStore: Send + Sync {
    async fn exists(&self, owner: &str, name: &str) -> Result<bool>;

    /// Create a playlist, optionally with a first entry
    ///
    /// Returns `false` when the playlist already exists.
    async fn create(&self, owner: &str, name: &str, first: Option<NewPlaylistEntry>) -> Result<bool>;

    /// Append an entry with order = max + 1; returns the assigned order
    async fn add_entry(&self, owner: &str, name: &str, entry: NewPlaylistEntry) -> Result<u32>;

    /// Owner's playlists in creation order
    async fn list(&self, owner: &str) -> Result<Vec<PlaylistSummary>>;

    /// Ordered entries, `None` when the playlist does not exist
    async fn entries(&self, owner: &str, name: &str) -> Result<Option<Vec<PlaylistEntry>>>;

    /// Returns `false` when the playlist does not exist
    async fn delete(&self, owner: &str, name: &str) -> Result<bool>;

    /// Remove the entry at `order` and renumber later entries
    ///
    /// Returns the removed entry, or `None` if no entry had that order.
    async fn remove_entry(&self, owner: &str, name: &str, order: u32) -> Result<Option<PlaylistEntry>>;
}
