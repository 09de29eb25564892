//! Orchestrator wired to recording collaborators

use super::mocks::{RecordingChat, RecordingPlayer, RecordingVoice, ScriptedLoader, ScriptedResolver};
use jukebox_bot::platform::MessageContext;
use jukebox_bot::playback::{
    OrchestratorConfig, PlaybackOrchestrator, Track, TrackEndReason, TrackEndSignal,
};
use jukebox_bot::playlist::MemoryPlaylistStore;
use jukebox_bot::resolver::{MediaResolver, TrackResolutionPipeline};
use jukebox_bot::state::SessionSnapshot;
use jukebox_bot::SharedState;
use jukebox_common::events::PlaybackState;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

pub const VOICE_CHANNEL: &str = "lounge";

pub struct Harness {
    pub orchestrator: PlaybackOrchestrator,
    pub state: Arc<SharedState>,
    pub chat: Arc<RecordingChat>,
    pub player: Arc<RecordingPlayer>,
    pub voice: Arc<RecordingVoice>,
    pub loader: Arc<ScriptedLoader>,
    pub playlists: Arc<MemoryPlaylistStore>,
    pub ctx: MessageContext,
}

impl Harness {
    /// Generic loader only
    pub fn new() -> Self {
        Self::build(None, OrchestratorConfig::default())
    }

    /// External resolver in front of the loader for youtube hosts
    pub fn with_resolver(resolver: Arc<ScriptedResolver>) -> Self {
        Self::build(Some(resolver), OrchestratorConfig::default())
    }

    pub fn with_config(config: OrchestratorConfig) -> Self {
        Self::build(None, config)
    }

    fn build(resolver: Option<Arc<ScriptedResolver>>, config: OrchestratorConfig) -> Self {
        let state = Arc::new(SharedState::new(64));
        let chat = RecordingChat::new();
        let player = RecordingPlayer::new();
        let voice = RecordingVoice::new();
        let loader = ScriptedLoader::new();
        let playlists = Arc::new(MemoryPlaylistStore::new());

        let resolver = resolver.map(|r| r as Arc<dyn MediaResolver>);
        let pipeline = TrackResolutionPipeline::new(
            loader.clone(),
            resolver,
            vec!["youtube.com".to_string(), "youtu.be".to_string()],
        );

        let orchestrator = PlaybackOrchestrator::new(
            state.clone(),
            Arc::new(pipeline),
            player.clone(),
            voice.clone(),
            playlists.clone(),
            config,
        );

        let ctx = MessageContext::new("u1", "tester", Some(VOICE_CHANNEL.to_string()), chat.clone());

        Self {
            orchestrator,
            state,
            chat,
            player,
            voice,
            loader,
            playlists,
            ctx,
        }
    }

    /// Same user, not in any voice channel
    pub fn ctx_without_voice(&self) -> MessageContext {
        MessageContext::new("u1", "tester", None, self.chat.clone())
    }

    /// Dispatch a message without waiting for background work
    pub async fn send(&self, text: &str) -> Option<JoinHandle<()>> {
        self.orchestrator.handle_message(&self.ctx, text).await
    }

    /// Dispatch a message and wait for any background work it started
    pub async fn send_and_wait(&self, text: &str) {
        if let Some(task) = self.send(text).await {
            task.await.expect("background task panicked");
        }
    }

    /// Id of the track in the current slot
    pub async fn current_track_id(&self) -> Option<Uuid> {
        self.state.lock().await.queue.peek_current().map(|t| t.id)
    }

    /// Deliver an end signal for `track_id`
    pub async fn end_track(&self, track_id: Uuid, reason: TrackEndReason) -> Option<Track> {
        self.orchestrator
            .on_track_end(TrackEndSignal::new(track_id, reason))
            .await
    }

    /// Finish whatever is current (an unknown track when idle)
    pub async fn finish_track(&self) -> Option<Track> {
        let track_id = self.current_track_id().await.unwrap_or_else(Uuid::new_v4);
        self.end_track(track_id, TrackEndReason::Finished).await
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.orchestrator.snapshot().await
    }

    pub async fn playback_state(&self) -> PlaybackState {
        self.state.get_playback_state().await
    }
}
