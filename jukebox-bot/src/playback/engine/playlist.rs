//! Playlist command handlers
//!
//! **Responsibilities:**
//! - create / add / list / show / delete / remove / play / help
//! - Background metadata resolution for new entries
//! - Sequential playback of a saved playlist, honoring the stop generation

use super::commands::Placement;
use super::core::{PlaybackOrchestrator, Reply};
use super::resolution::Applied;
use crate::command::{PlaylistAction, PlaylistCommand};
use crate::error::CommandError;
use crate::platform::{ChatChannel, MessageContext};
use crate::playback::types::Track;
use crate::playlist::{NewPlaylistEntry, PlaylistEntry};
use crate::resolver::TrackLoadOutcome;
use jukebox_common::events::QueueChangeTrigger;
use std::fmt::Write;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) const PLAYLIST_HELP_TEXT: &str = "🎵 **Playlist commands:**\n\
`!playlist create <name> [url]` - Create a playlist (url optional)\n\
`!playlist add <name> <url>` - Add a track to a playlist\n\
`!playlist list` - List your playlists\n\
`!playlist show <name>` - Show a playlist\n\
`!playlist play <name>` - Play a whole playlist\n\
`!playlist remove <name> <number>` - Remove a track from a playlist\n\
`!playlist delete <name>` - Delete a playlist\n\n\
📝 **Examples:**\n\
`!playlist create favourites` - Create an empty playlist\n\
`!playlist create favourites https://www.youtube.com/watch?v=dQw4w9WgXcQ` - Create with a first track\n\
`!playlist add favourites https://www.youtube.com/watch?v=fJ9rUzIMcZQ`";

fn usage(text: &str) -> CommandError {
    CommandError::UserInput(format!("Usage: `{}`", text))
}

fn missing_playlist(name: &str) -> CommandError {
    CommandError::Precondition(format!("Playlist **{}** does not exist!", name))
}

fn missing_or_empty(name: &str) -> CommandError {
    CommandError::Precondition(format!("Playlist **{}** does not exist or is empty!", name))
}

impl PlaybackOrchestrator {
    pub(super) async fn handle_playlist(
        &self,
        ctx: &MessageContext,
        command: PlaylistCommand,
    ) -> Result<Reply, CommandError> {
        let args = command.args.as_slice();
        match command.action() {
            PlaylistAction::Create => self.playlist_create(ctx, args).await,
            PlaylistAction::Add => self.playlist_add(ctx, args).await,
            PlaylistAction::List => self.playlist_list(ctx).await,
            PlaylistAction::Show => self.playlist_show(ctx, args).await,
            PlaylistAction::Delete => self.playlist_delete(ctx, args).await,
            PlaylistAction::Remove => self.playlist_remove(ctx, args).await,
            PlaylistAction::Play => self.playlist_play(ctx, args).await,
            PlaylistAction::Help => Ok(Reply::Message(PLAYLIST_HELP_TEXT.to_string())),
        }
    }

    async fn playlist_create(&self, ctx: &MessageContext, args: &[String]) -> Result<Reply, CommandError> {
        let name = args
            .first()
            .ok_or_else(|| usage("!playlist create <name> [url]"))?;

        if self.playlists.exists(&ctx.user_id, name).await? {
            return Err(CommandError::Precondition(format!(
                "Playlist **{}** already exists!",
                name
            )));
        }

        let Some(url) = args.get(1) else {
            if !self.playlists.create(&ctx.user_id, name, None).await? {
                return Err(CommandError::Precondition(format!(
                    "Playlist **{}** already exists!",
                    name
                )));
            }
            info!(owner = %ctx.user_id, playlist = %name, "Empty playlist created");
            return Ok(Reply::Message(format!(
                "✅ Empty playlist **{}** created!\nUse `!playlist add {} <url>` to add tracks.",
                name, name
            )));
        };

        ctx.reply.send(&format!("🔍 Loading: {}", url)).await;
        let task = self.spawn_entry_resolution(ctx, name.clone(), url.clone(), EntryTarget::NewPlaylist);
        Ok(Reply::Background(task))
    }

    async fn playlist_add(&self, ctx: &MessageContext, args: &[String]) -> Result<Reply, CommandError> {
        let (Some(name), Some(url)) = (args.first(), args.get(1)) else {
            return Err(usage("!playlist add <name> <url>"));
        };

        if !self.playlists.exists(&ctx.user_id, name).await? {
            return Err(CommandError::Precondition(format!(
                "Playlist **{}** does not exist!\nUse `!playlist create {} <url>` to create it.",
                name, name
            )));
        }

        ctx.reply.send(&format!("🔍 Loading: {}", url)).await;
        let task = self.spawn_entry_resolution(ctx, name.clone(), url.clone(), EntryTarget::ExistingPlaylist);
        Ok(Reply::Background(task))
    }

    async fn playlist_list(&self, ctx: &MessageContext) -> Result<Reply, CommandError> {
        let playlists = self.playlists.list(&ctx.user_id).await?;
        if playlists.is_empty() {
            return Ok(Reply::Message(
                "📝 You have no playlists yet.\nUse `!playlist create <name> <url>` to create your first one!"
                    .to_string(),
            ));
        }

        let mut text = String::from("🎵 **Your playlists:**\n");
        for (index, summary) in playlists.iter().enumerate() {
            let _ = writeln!(
                text,
                "{}. **{}** ({} tracks)",
                index + 1,
                summary.name,
                summary.entry_count
            );
        }
        text.push_str("\nUse `!playlist show <name>` to see what is in a playlist");
        Ok(Reply::Message(text))
    }

    async fn playlist_show(&self, ctx: &MessageContext, args: &[String]) -> Result<Reply, CommandError> {
        let name = args.first().ok_or_else(|| usage("!playlist show <name>"))?;
        let entries = self.non_empty_entries(&ctx.user_id, name).await?;

        let mut text = format!("🎵 **Playlist: {}**\n", name);
        for entry in &entries {
            let _ = writeln!(text, "{}. **{}** ({})", entry.order, entry.title, entry.duration);
        }
        let _ = write!(text, "\nUse `!playlist play {}` to play the whole playlist", name);
        Ok(Reply::Message(text))
    }

    async fn playlist_delete(&self, ctx: &MessageContext, args: &[String]) -> Result<Reply, CommandError> {
        let name = args.first().ok_or_else(|| usage("!playlist delete <name>"))?;

        if !self.playlists.delete(&ctx.user_id, name).await? {
            return Err(missing_playlist(name));
        }
        info!(owner = %ctx.user_id, playlist = %name, "Playlist deleted");
        Ok(Reply::Message(format!("✅ Playlist **{}** deleted!", name)))
    }

    async fn playlist_remove(&self, ctx: &MessageContext, args: &[String]) -> Result<Reply, CommandError> {
        let (Some(name), Some(order_text)) = (args.first(), args.get(1)) else {
            return Err(usage("!playlist remove <name> <number>"));
        };

        let order: u32 = order_text
            .parse()
            .map_err(|_| CommandError::UserInput("The track number must be a number!".to_string()))?;

        if !self.playlists.exists(&ctx.user_id, name).await? {
            return Err(missing_playlist(name));
        }

        match self.playlists.remove_entry(&ctx.user_id, name, order).await? {
            Some(removed) => {
                info!(owner = %ctx.user_id, playlist = %name, order, title = %removed.title, "Playlist entry removed");
                Ok(Reply::Message(format!(
                    "✅ Removed track {} from playlist **{}**!",
                    order, name
                )))
            }
            None => Err(CommandError::Precondition(format!(
                "Could not remove track {}; check the track number.",
                order
            ))),
        }
    }

    async fn playlist_play(&self, ctx: &MessageContext, args: &[String]) -> Result<Reply, CommandError> {
        let name = args.first().ok_or_else(|| usage("!playlist play <name>"))?;
        let entries = self.non_empty_entries(&ctx.user_id, name).await?;

        self.join_voice(ctx).await?;

        let generation = self.state.lock().await.generation;
        ctx.reply
            .send(&format!(
                "🎵 **Playing playlist: {}** ({} tracks)",
                name,
                entries.len()
            ))
            .await;

        let orchestrator = self.clone();
        let reply = ctx.reply.clone();
        let name = name.clone();
        let task = tokio::spawn(async move {
            orchestrator
                .play_entries(reply, &name, entries, generation)
                .await;
        });
        Ok(Reply::Background(task))
    }

    async fn non_empty_entries(&self, owner: &str, name: &str) -> Result<Vec<PlaylistEntry>, CommandError> {
        match self.playlists.entries(owner, name).await? {
            Some(entries) if !entries.is_empty() => Ok(entries),
            _ => Err(missing_or_empty(name)),
        }
    }

    /// Resolve and place each entry in order; a stop abandons the rest
    async fn play_entries(
        &self,
        reply: Arc<dyn ChatChannel>,
        name: &str,
        entries: Vec<PlaylistEntry>,
        generation: u64,
    ) {
        let total = entries.len();
        let mut started: Option<Track> = None;
        let mut queued = 0usize;
        let mut failed = 0usize;

        for entry in entries {
            if !self.state.lock().await.is_current_generation(generation) {
                info!(playlist = %name, "Playlist playback abandoned after stop");
                return;
            }

            let outcome = self.resolve_guarded(&entry.reference).await;
            let outcome = match outcome {
                TrackLoadOutcome::Loaded(track) if track.title.is_empty() => {
                    TrackLoadOutcome::Loaded(track.with_metadata(entry.title.clone(), entry.duration))
                }
                other => other,
            };

            match self
                .apply_outcome(&entry.reference, generation, outcome, QueueChangeTrigger::PlaylistEnqueue)
                .await
            {
                Applied::Placed(placement) => match &placement {
                    Placement::Started(track) => {
                        reply.send(&placement.to_message()).await;
                        started = Some(track.clone());
                    }
                    Placement::Queued { .. } => queued += 1,
                },
                Applied::Rejected(message) => {
                    warn!(playlist = %name, order = entry.order, "Playlist entry failed: {}", message);
                    failed += 1;
                }
                Applied::Stale => {
                    info!(playlist = %name, "Playlist playback abandoned after stop");
                    return;
                }
            }
        }

        let mut summary = format!("✅ Playlist **{}**: ", name);
        if let Some(track) = &started {
            let _ = write!(summary, "started **{}**, ", track.title);
        }
        let _ = write!(summary, "{} of {} tracks added to the queue", queued, total);
        if failed > 0 {
            let _ = write!(summary, ", {} could not be loaded", failed);
        }
        reply.send(&summary).await;
    }

    /// Resolve metadata for a new entry, then store it
    fn spawn_entry_resolution(
        &self,
        ctx: &MessageContext,
        name: String,
        url: String,
        target: EntryTarget,
    ) -> tokio::task::JoinHandle<()> {
        let orchestrator = self.clone();
        let reply = ctx.reply.clone();
        let owner = ctx.user_id.clone();

        tokio::spawn(async move {
            let message = match orchestrator.store_entry(&owner, &name, &url, target).await {
                Ok(message) => message,
                Err(e) => e.to_message(),
            };
            reply.send(&message).await;
        })
    }

    async fn store_entry(
        &self,
        owner: &str,
        name: &str,
        url: &str,
        target: EntryTarget,
    ) -> Result<String, CommandError> {
        let outcome = self.resolve_guarded(url).await;
        let track = match outcome {
            TrackLoadOutcome::NoMatch => {
                return Err(CommandError::Resolution(
                    "No match found. Please check that the URL is correct.".to_string(),
                ))
            }
            TrackLoadOutcome::Failed(reason) => {
                return Err(CommandError::Resolution(format!(
                    "Failed to load the track: {}",
                    reason
                )))
            }
            success => success.into_track().ok_or_else(|| {
                CommandError::Resolution("No playable track found.".to_string())
            })?,
        };

        let entry = NewPlaylistEntry {
            title: track.title.clone(),
            reference: url.to_string(),
            duration: track.duration,
        };

        match target {
            EntryTarget::NewPlaylist => {
                if !self.playlists.create(owner, name, Some(entry)).await? {
                    return Err(CommandError::Precondition(format!(
                        "Playlist **{}** already exists!",
                        name
                    )));
                }
                info!(owner = %owner, playlist = %name, title = %track.title, "Playlist created");
                Ok(format!(
                    "✅ Playlist **{}** created!\n🎵 Added: **{}**",
                    name, track.title
                ))
            }
            EntryTarget::ExistingPlaylist => {
                let order = self.playlists.add_entry(owner, name, entry).await?;
                info!(owner = %owner, playlist = %name, order, title = %track.title, "Playlist entry added");
                Ok(format!(
                    "✅ Added to playlist **{}**:\n🎵 **{}**",
                    name, track.title
                ))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryTarget {
    NewPlaylist,
    ExistingPlaylist,
}
