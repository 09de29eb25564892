//! Core orchestrator - construction, dispatch and event emission
//!
//! **Responsibilities:**
//! - PlaybackOrchestrator struct definition and initialization
//! - Message parsing and command dispatch
//! - Rendering command results back to the chat channel
//! - Event emission helpers shared by the other engine modules

use crate::command::{parse_command, Command};
use crate::error::CommandError;
use crate::platform::{AudioPlayer, MessageContext, VoiceGateway};
use crate::playback::types::{Track, TrackEndSignal};
use crate::playlist::PlaylistStore;
use crate::resolver::TrackResolutionPipeline;
use crate::state::{BotEvent, PlaybackState, SessionSnapshot, SharedState};
use jukebox_common::events::QueueChangeTrigger;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Orchestrator settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Upcoming titles listed by the queue command
    pub display_limit: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self { display_limit: 10 }
    }
}

/// Successful command result
#[derive(Debug)]
pub enum Reply {
    /// Text for the issuing channel
    Message(String),

    /// Acknowledged and handed to background work, which reports on its own
    Background(JoinHandle<()>),
}

/// Playback state machine for one voice session
///
/// Cheap to clone; background tasks hold their own clone.
#[derive(Clone)]
pub struct PlaybackOrchestrator {
    pub(super) state: Arc<SharedState>,
    pub(super) pipeline: Arc<TrackResolutionPipeline>,
    pub(super) player: Arc<dyn AudioPlayer>,
    pub(super) voice: Arc<dyn VoiceGateway>,
    pub(super) playlists: Arc<dyn PlaylistStore>,
    pub(super) config: OrchestratorConfig,
}

impl PlaybackOrchestrator {
    pub fn new(
        state: Arc<SharedState>,
        pipeline: Arc<TrackResolutionPipeline>,
        player: Arc<dyn AudioPlayer>,
        voice: Arc<dyn VoiceGateway>,
        playlists: Arc<dyn PlaylistStore>,
        config: OrchestratorConfig,
    ) -> Self {
        info!(
            source_mode = %pipeline.mode(),
            display_limit = config.display_limit,
            "Playback orchestrator initialized"
        );
        Self {
            state,
            pipeline,
            player,
            voice,
            playlists,
            config,
        }
    }

    pub fn shared_state(&self) -> &Arc<SharedState> {
        &self.state
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot().await
    }

    /// Parse and dispatch one chat message
    ///
    /// Returns the background task when the command started one. Text that is
    /// not a command is ignored.
    pub async fn handle_message(&self, ctx: &MessageContext, text: &str) -> Option<JoinHandle<()>> {
        let parsed = parse_command(text);
        if !parsed.is_valid() {
            debug!(text = %text, "Ignoring non-command message");
            return None;
        }

        info!(
            user = %ctx.user_name,
            command = %parsed.command.map(|k| k.token()).unwrap_or_default(),
            args = %parsed.args_as_string(),
            "Command received"
        );
        self.dispatch(ctx, parsed.to_command()).await
    }

    /// Run a command and send its result to the issuing channel
    pub async fn dispatch(&self, ctx: &MessageContext, command: Command) -> Option<JoinHandle<()>> {
        let result = match command {
            Command::Play(args) => self.play(ctx, &args).await,
            Command::Stop => self.stop().await,
            Command::Pause => self.pause().await,
            Command::Resume => self.resume().await,
            Command::Skip => self.skip().await,
            Command::QueueInfo => self.queue_info().await,
            Command::Help => Ok(Reply::Message(super::commands::HELP_TEXT.to_string())),
            Command::Playlist(playlist) => self.handle_playlist(ctx, playlist).await,
            Command::Invalid => return None,
        };

        match result {
            Ok(Reply::Message(text)) => {
                ctx.reply.send(&text).await;
                None
            }
            Ok(Reply::Background(task)) => Some(task),
            Err(e) => {
                match &e {
                    CommandError::Resolution(msg) => warn!(user = %ctx.user_name, "Command failed: {}", msg),
                    other => info!(user = %ctx.user_name, "Command rejected: {}", other),
                }
                ctx.reply.send(&e.to_message()).await;
                None
            }
        }
    }

    /// Consume track-end signals until the sender side closes
    pub fn spawn_track_end_listener(&self, mut rx: mpsc::UnboundedReceiver<TrackEndSignal>) -> JoinHandle<()> {
        let orchestrator = self.clone();
        tokio::spawn(async move {
            while let Some(signal) = rx.recv().await {
                orchestrator.on_track_end(signal).await;
            }
            debug!("Track-end listener finished");
        })
    }

    pub(super) fn emit_state_change(&self, old_state: Option<PlaybackState>, new_state: PlaybackState) {
        if let Some(old_state) = old_state {
            debug!(old = %old_state, new = %new_state, "Playback state changed");
            self.state.broadcast_event(BotEvent::PlaybackStateChanged {
                old_state,
                new_state,
                timestamp: chrono::Utc::now(),
            });
        }
    }

    pub(super) fn emit_track_started(&self, track: &Track) {
        self.state.broadcast_event(BotEvent::TrackStarted {
            track_id: track.id,
            title: track.title.clone(),
            timestamp: chrono::Utc::now(),
        });
    }

    pub(super) fn emit_queue_changed(&self, trigger: QueueChangeTrigger, queue_len: usize) {
        self.state.broadcast_event(BotEvent::QueueChanged {
            trigger,
            queue_len,
            timestamp: chrono::Utc::now(),
        });
    }
}
