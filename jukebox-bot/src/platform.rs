//! Platform collaborators
//!
//! Chat transport, voice connection and audio engine sit behind these traits
//! so the orchestrator can run against a real platform, the console runtime
//! or test doubles.

use crate::error::Result;
use crate::playback::types::Track;
use async_trait::async_trait;
use std::sync::Arc;

/// Outbound chat channel
#[async_trait]
pub trait ChatChannel: Send + Sync {
    /// Send a plain text message; delivery failures are logged, not returned
    async fn send(&self, text: &str);
}

/// Audio playback engine
///
/// Calls are non-blocking instructions; completion is reported later through
/// a track-end signal.
pub trait AudioPlayer: Send + Sync {
    /// Start `track`, replacing whatever is playing
    fn play(&self, track: &Track);

    fn stop(&self);

    fn set_paused(&self, paused: bool);
}

/// Voice channel connection manager
#[async_trait]
pub trait VoiceGateway: Send + Sync {
    /// Route audio from `player` into the voice connection
    fn attach(&self, player: Arc<dyn AudioPlayer>);

    /// Join `channel`; joining the already-connected channel is a no-op
    async fn connect(&self, channel: &str) -> Result<()>;
}

/// Who sent a message and where replies go
#[derive(Clone)]
pub struct MessageContext {
    pub user_id: String,
    pub user_name: String,

    /// Voice channel the user is in, if any
    pub voice_channel: Option<String>,

    pub reply: Arc<dyn ChatChannel>,
}

impl MessageContext {
    pub fn new(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        voice_channel: Option<String>,
        reply: Arc<dyn ChatChannel>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            voice_channel,
            reply,
        }
    }
}

impl std::fmt::Debug for MessageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageContext")
            .field("user_id", &self.user_id)
            .field("user_name", &self.user_name)
            .field("voice_channel", &self.voice_channel)
            .finish_non_exhaustive()
    }
}
