//! In-memory playlist store

use super::{NewPlaylistEntry, PlaylistEntry, PlaylistStore, PlaylistSummary};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct OwnerPlaylists {
    /// Playlists in creation order
    playlists: Vec<(String, Vec<PlaylistEntry>)>,
}

impl OwnerPlaylists {
    fn find(&self, name: &str) -> Option<&Vec<PlaylistEntry>> {
        self.playlists
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, entries)| entries)
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut Vec<PlaylistEntry>> {
        self.playlists
            .iter_mut()
            .find(|(existing, _)| existing == name)
            .map(|(_, entries)| entries)
    }
}

/// Playlists held in memory, lost on restart
#[derive(Debug, Default)]
pub struct MemoryPlaylistStore {
    owners: RwLock<HashMap<String, OwnerPlaylists>>,
}

impl MemoryPlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn next_order(entries: &[PlaylistEntry]) -> u32 {
    entries.iter().map(|e| e.order).max().unwrap_or(0) + 1
}

fn into_entry(entry: NewPlaylistEntry, order: u32) -> PlaylistEntry {
    PlaylistEntry {
        order,
        title: entry.title,
        reference: entry.reference,
        duration: entry.duration,
    }
}

#[async_trait]
impl PlaylistStore for MemoryPlaylistStore {
    async fn exists(&self, owner: &str, name: &str) -> Result<bool> {
        let owners = self.owners.read().await;
        Ok(owners.get(owner).and_then(|p| p.find(name)).is_some())
    }

    async fn create(&self, owner: &str, name: &str, first: Option<NewPlaylistEntry>) -> Result<bool> {
        let mut owners = self.owners.write().await;
        let playlists = owners.entry(owner.to_string()).or_default();

        if playlists.find(name).is_some() {
            return Ok(false);
        }

        let entries = first.map(|entry| vec![into_entry(entry, 1)]).unwrap_or_default();
        debug!(owner = %owner, playlist = %name, entries = entries.len(), "Playlist created");
        playlists.playlists.push((name.to_string(), entries));
        Ok(true)
    }

    async fn add_entry(&self, owner: &str, name: &str, entry: NewPlaylistEntry) -> Result<u32> {
        let mut owners = self.owners.write().await;
        let entries = owners
            .get_mut(owner)
            .and_then(|p| p.find_mut(name))
            .ok_or_else(|| Error::Playlist(format!("Playlist {} does not exist", name)))?;

        let order = next_order(entries);
        entries.push(into_entry(entry, order));
        Ok(order)
    }

    async fn list(&self, owner: &str) -> Result<Vec<PlaylistSummary>> {
        let owners = self.owners.read().await;
        Ok(owners
            .get(owner)
            .map(|p| {
                p.playlists
                    .iter()
                    .map(|(name, entries)| PlaylistSummary {
                        name: name.clone(),
                        entry_count: entries.len(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn entries(&self, owner: &str, name: &str) -> Result<Option<Vec<PlaylistEntry>>> {
        let owners = self.owners.read().await;
        Ok(owners.get(owner).and_then(|p| p.find(name)).cloned())
    }

    async fn delete(&self, owner: &str, name: &str) -> Result<bool> {
        let mut owners = self.owners.write().await;
        let Some(playlists) = owners.get_mut(owner) else {
            return Ok(false);
        };

        let before = playlists.playlists.len();
        playlists.playlists.retain(|(existing, _)| existing != name);
        Ok(playlists.playlists.len() < before)
    }

    async fn remove_entry(&self, owner: &str, name: &str, order: u32) -> Result<Option<PlaylistEntry>> {
        let mut owners = self.owners.write().await;
        let entries = owners
            .get_mut(owner)
            .and_then(|p| p.find_mut(name))
            .ok_or_else(|| Error::Playlist(format!("Playlist {} does not exist", name)))?;

        let Some(index) = entries.iter().position(|e| e.order == order) else {
            return Ok(None);
        };

        let removed = entries.remove(index);
        for entry in entries.iter_mut().filter(|e| e.order > order) {
            entry.order -= 1;
        }
        Ok(Some(removed))
    }
}
