//! Playback command handlers
//!
//! **Responsibilities:**
//! - play / stop / pause / resume / skip / queue
//! - Voice preconditions and connection before playback
//! - Track-end handling (automatic advance)
//!
//! Every handler validates first and mutates only once all checks pass.

use super::core::{PlaybackOrchestrator, Reply};
use crate::error::CommandError;
use crate::platform::MessageContext;
use crate::playback::types::{Track, TrackEndSignal};
use crate::state::{BotEvent, PlaybackState};
use jukebox_common::events::QueueChangeTrigger;
use std::fmt::Write;
use tracing::{debug, info};

pub(crate) const HELP_TEXT: &str = "🎵 **Music bot commands:**\n\
`!play <url>` - Play music, or add it to the queue\n\
`!stop` - Stop playback and clear the queue\n\
`!pause` - Pause playback\n\
`!resume` - Resume playback\n\
`!skip` - Skip the current track\n\
`!queue` - Show the playback queue\n\
`!playlist help` - Playlist commands\n\
`!help` - Show this help\n\n\
📝 **Supported sources:** YouTube, SoundCloud, Spotify and direct audio URLs";

impl PlaybackOrchestrator {
    /// Require a voice channel and connect to it
    pub(super) async fn join_voice(&self, ctx: &MessageContext) -> Result<(), CommandError> {
        let channel = ctx.voice_channel.as_deref().ok_or_else(|| {
            CommandError::Precondition("You need to join a voice channel first!".to_string())
        })?;

        self.voice.attach(self.player.clone());
        self.voice.connect(channel).await?;
        debug!(channel = %channel, "Voice connected");
        Ok(())
    }

    /// Play a reference: resolve in the background, then start or enqueue
    pub(super) async fn play(&self, ctx: &MessageContext, args: &[String]) -> Result<Reply, CommandError> {
        let reference = args.first().ok_or_else(|| {
            CommandError::UserInput("Please provide a music URL. Usage: `!play <url>`".to_string())
        })?;

        self.join_voice(ctx).await?;

        let generation = self.state.lock().await.generation;
        ctx.reply.send(&format!("🔍 Loading: {}", reference)).await;

        let task = self.spawn_play_resolution(ctx.reply.clone(), reference.clone(), generation);
        Ok(Reply::Background(task))
    }

    /// Stop playback, clear the queue and invalidate in-flight resolutions
    pub(super) async fn stop(&self) -> Result<Reply, CommandError> {
        let mut session = self.state.lock().await;
        session.generation += 1;
        session.queue.clear();
        self.player.stop();
        let old = session.transition(PlaybackState::Idle);
        let generation = session.generation;
        drop(session);

        self.emit_state_change(old, PlaybackState::Idle);
        self.emit_queue_changed(QueueChangeTrigger::UserStop, 0);
        info!(generation, "Playback stopped, queue cleared");

        Ok(Reply::Message("⏹️ Playback stopped and the queue was cleared.".to_string()))
    }

    pub(super) async fn pause(&self) -> Result<Reply, CommandError> {
        let mut session = self.state.lock().await;
        match session.state {
            PlaybackState::Idle => Err(nothing_playing()),
            PlaybackState::Paused => Err(CommandError::Precondition(
                "Playback is already paused.".to_string(),
            )),
            PlaybackState::Playing => {
                self.player.set_paused(true);
                let old = session.transition(PlaybackState::Paused);
                drop(session);

                self.emit_state_change(old, PlaybackState::Paused);
                Ok(Reply::Message("⏸️ Playback paused.".to_string()))
            }
        }
    }

    pub(super) async fn resume(&self) -> Result<Reply, CommandError> {
        let mut session = self.state.lock().await;
        match session.state {
            PlaybackState::Idle => Err(nothing_playing()),
            PlaybackState::Playing => Err(CommandError::Precondition(
                "Playback is not paused.".to_string(),
            )),
            PlaybackState::Paused => {
                self.player.set_paused(false);
                let old = session.transition(PlaybackState::Playing);
                drop(session);

                self.emit_state_change(old, PlaybackState::Playing);
                Ok(Reply::Message("▶️ Playback resumed.".to_string()))
            }
        }
    }

    /// Skip the current track; start the next one or go idle
    pub(super) async fn skip(&self) -> Result<Reply, CommandError> {
        let mut session = self.state.lock().await;
        let skipped_title = session
            .queue
            .peek_current()
            .map(|t| t.title.clone())
            .ok_or_else(nothing_playing)?;

        let next = session.queue.skip();
        let was_paused = session.state == PlaybackState::Paused;
        let new_state = match &next {
            Some(track) => {
                if was_paused {
                    self.player.set_paused(false);
                }
                self.player.play(track);
                PlaybackState::Playing
            }
            None => {
                self.player.stop();
                PlaybackState::Idle
            }
        };
        let old = session.transition(new_state);
        let queue_len = session.queue.size();
        drop(session);

        self.emit_state_change(old, new_state);
        self.emit_queue_changed(QueueChangeTrigger::UserSkip, queue_len);

        match next {
            Some(track) => {
                self.emit_track_started(&track);
                info!(skipped = %skipped_title, next = %track.title, "Skipped track");
                Ok(Reply::Message(format!(
                    "⏭️ Skipped: **{}**\n🎵 Now playing: **{}**",
                    skipped_title, track.title
                )))
            }
            None => {
                info!(skipped = %skipped_title, "Skipped track, queue empty");
                Ok(Reply::Message(format!(
                    "⏭️ Skipped: **{}**\nThe queue is empty, playback finished.",
                    skipped_title
                )))
            }
        }
    }

    /// Current track, queue size and the next few titles
    pub(super) async fn queue_info(&self) -> Result<Reply, CommandError> {
        let session = self.state.lock().await;
        let current = session.queue.peek_current().cloned();
        let queue_len = session.queue.size();
        let upcoming = session.queue.upcoming(self.config.display_limit);
        let state = session.state;
        drop(session);

        Ok(Reply::Message(render_queue(
            current.as_ref(),
            state,
            queue_len,
            &upcoming,
        )))
    }

    /// React to the audio engine finishing a track
    ///
    /// Advances only when the signal allows it and names the current track;
    /// a signal for a track that is no longer current is ignored.
    /// Returns the track that was started, if any.
    pub async fn on_track_end(&self, signal: TrackEndSignal) -> Option<Track> {
        if !signal.may_advance {
            debug!(track_id = %signal.track_id, reason = ?signal.reason, "Track ended without advance");
            return None;
        }

        let mut session = self.state.lock().await;
        if !session.state.has_track() {
            debug!(track_id = %signal.track_id, reason = ?signal.reason, "Track ended while idle, ignoring");
            return None;
        }

        let current_id = session.queue.peek_current().map(|t| t.id);
        if current_id != Some(signal.track_id) {
            debug!(
                track_id = %signal.track_id,
                current_id = ?current_id,
                reason = ?signal.reason,
                "Track-end signal for a track that is no longer current, ignoring"
            );
            return None;
        }

        let next = session.queue.dequeue_next();
        let new_state = match &next {
            Some(track) => {
                self.player.play(track);
                PlaybackState::Playing
            }
            None => PlaybackState::Idle,
        };
        let old = session.transition(new_state);
        let queue_len = session.queue.size();
        drop(session);

        self.emit_state_change(old, new_state);
        self.emit_queue_changed(QueueChangeTrigger::TrackCompletion, queue_len);
        match &next {
            Some(track) => {
                self.emit_track_started(track);
                info!(title = %track.title, "Auto-advanced to next track");
            }
            None => info!("Queue finished, playback idle"),
        }
        next
    }

    /// Start `track` now (session idle) or append it to the queue
    ///
    /// Caller holds the session lock and has checked the generation.
    pub(super) fn start_or_enqueue(
        &self,
        session: &mut crate::state::Session,
        track: Track,
        trigger: QueueChangeTrigger,
    ) -> Placement {
        if !session.state.has_track() {
            session.queue.set_current(track.clone());
            self.player.play(&track);
            let old = session.transition(PlaybackState::Playing);
            self.emit_state_change(old, PlaybackState::Playing);
            self.emit_track_started(&track);
            info!(title = %track.title, "Started playback");
            Placement::Started(track)
        } else {
            let position = session.queue.enqueue(track.clone());
            self.state.broadcast_event(BotEvent::TrackQueued {
                track_id: track.id,
                title: track.title.clone(),
                position,
                timestamp: chrono::Utc::now(),
            });
            self.emit_queue_changed(trigger, session.queue.size());
            info!(title = %track.title, position, "Track added to queue");
            Placement::Queued { track, position }
        }
    }
}

/// Where a resolved track ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Placement {
    Started(Track),
    Queued { track: Track, position: usize },
}

impl Placement {
    pub(super) fn to_message(&self) -> String {
        match self {
            Placement::Started(track) => {
                format!("🎵 Now playing: **{}** ({})", track.title, track.duration)
            }
            Placement::Queued { track, position } => format!(
                "📝 Added to queue: **{}** ({})\n🔢 Queue position: {}",
                track.title, track.duration, position
            ),
        }
    }
}

fn nothing_playing() -> CommandError {
    CommandError::Precondition("Nothing is playing right now.".to_string())
}

fn render_queue(current: Option<&Track>, state: PlaybackState, queue_len: usize, upcoming: &[Track]) -> String {
    let mut text = String::from("🎵 **Playback queue:**\n");

    match current {
        Some(track) => {
            let paused = if state == PlaybackState::Paused { " [paused]" } else { "" };
            let _ = writeln!(text, "🔄 **Now playing:** {} ({}){}", track.title, track.duration, paused);
        }
        None => text.push_str("🔄 **Now playing:** nothing\n"),
    }

    if queue_len == 0 {
        text.push_str("📜 **Queue:** empty");
        return text;
    }

    let _ = write!(text, "📜 **Queue ({} tracks):**", queue_len);
    for (index, track) in upcoming.iter().enumerate() {
        let _ = write!(text, "\n{}. {} ({})", index + 1, track.title, track.duration);
    }
    if queue_len > upcoming.len() {
        let _ = write!(text, "\n... and {} more", queue_len - upcoming.len());
    }
    text
}
