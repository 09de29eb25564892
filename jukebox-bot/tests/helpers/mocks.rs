//! Recording and scripted collaborators

use async_trait::async_trait;
use jukebox_bot::platform::{AudioPlayer, ChatChannel, VoiceGateway};
use jukebox_bot::playback::{Track, TrackDuration};
use jukebox_bot::resolver::{LoadResult, MediaResolver, ResolvedMedia, ResolverError, TrackLoader};
use jukebox_bot::{Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// Chat channel that keeps every message
#[derive(Default)]
pub struct RecordingChat {
    messages: Mutex<Vec<String>>,
}

impl RecordingChat {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.messages.lock().unwrap().last().cloned()
    }

    pub fn any_contains(&self, needle: &str) -> bool {
        self.messages().iter().any(|m| m.contains(needle))
    }

    pub fn clear(&self) {
        self.messages.lock().unwrap().clear();
    }
}

#[async_trait]
impl ChatChannel for RecordingChat {
    async fn send(&self, text: &str) {
        self.messages.lock().unwrap().push(text.to_string());
    }
}

/// Instruction received by the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCall {
    Play(String),
    Stop,
    SetPaused(bool),
}

/// Audio player that records instructions by track title
#[derive(Default)]
pub struct RecordingPlayer {
    calls: Mutex<Vec<PlayerCall>>,
}

impl RecordingPlayer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<PlayerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn played(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlayerCall::Play(title) => Some(title),
                _ => None,
            })
            .collect()
    }
}

impl AudioPlayer for RecordingPlayer {
    fn play(&self, track: &Track) {
        self.calls.lock().unwrap().push(PlayerCall::Play(track.title.clone()));
    }

    fn stop(&self) {
        self.calls.lock().unwrap().push(PlayerCall::Stop);
    }

    fn set_paused(&self, paused: bool) {
        self.calls.lock().unwrap().push(PlayerCall::SetPaused(paused));
    }
}

/// Voice gateway recording connections; can be told to fail
#[derive(Default)]
pub struct RecordingVoice {
    connections: Mutex<Vec<String>>,
    attached: Mutex<usize>,
    fail: Mutex<bool>,
}

impl RecordingVoice {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn connections(&self) -> Vec<String> {
        self.connections.lock().unwrap().clone()
    }

    pub fn attach_count(&self) -> usize {
        *self.attached.lock().unwrap()
    }

    pub fn fail_connections(&self) {
        *self.fail.lock().unwrap() = true;
    }
}

#[async_trait]
impl VoiceGateway for RecordingVoice {
    fn attach(&self, _player: Arc<dyn AudioPlayer>) {
        *self.attached.lock().unwrap() += 1;
    }

    async fn connect(&self, channel: &str) -> Result<()> {
        if *self.fail.lock().unwrap() {
            return Err(Error::Voice("Could not join the voice channel".to_string()));
        }
        self.connections.lock().unwrap().push(channel.to_string());
        Ok(())
    }
}

/// Default length of tracks produced by [`ScriptedLoader`]
pub const DEFAULT_TRACK_MS: u64 = 180_000;

/// Loader with per-reference results and gates
///
/// Unscripted references load as a single track titled by the reference.
/// References starting with `panic://` panic inside the loader.
#[derive(Default)]
pub struct ScriptedLoader {
    results: Mutex<HashMap<String, LoadResult>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedLoader {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, reference: &str, result: LoadResult) {
        self.results
            .lock()
            .unwrap()
            .insert(reference.to_string(), result);
    }

    /// Hold loads of `reference` until [`Self::release`] is called
    pub fn hold(&self, reference: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(reference.to_string(), Arc::new(Notify::new()));
    }

    pub fn release(&self, reference: &str) {
        if let Some(gate) = self.gates.lock().unwrap().get(reference) {
            gate.notify_one();
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Wait until `reference` has been requested (up to two seconds)
    pub async fn wait_for_request(&self, reference: &str) {
        let waited = tokio::time::timeout(Duration::from_secs(2), async {
            while !self.requests().iter().any(|r| r == reference) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(waited.is_ok(), "loader never received {}", reference);
    }
}

#[async_trait]
impl TrackLoader for ScriptedLoader {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn load(&self, reference: &str) -> LoadResult {
        self.requests.lock().unwrap().push(reference.to_string());

        let gate = self.gates.lock().unwrap().get(reference).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if reference.starts_with("panic://") {
            panic!("loader exploded on {}", reference);
        }

        let scripted = self.results.lock().unwrap().get(reference).cloned();
        scripted.unwrap_or_else(|| {
            LoadResult::TrackLoaded(Track::new(
                reference,
                reference,
                TrackDuration::Millis(DEFAULT_TRACK_MS),
            ))
        })
    }
}

/// Resolver returning one fixed result
pub struct ScriptedResolver {
    result: std::result::Result<ResolvedMedia, ResolverError>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedResolver {
    pub fn resolving_to(title: &str, stream_url: &str, duration_text: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(ResolvedMedia {
                title: title.to_string(),
                stream_url: stream_url.to_string(),
                duration_text: duration_text.to_string(),
            }),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: ResolverError) -> Arc<Self> {
        Arc::new(Self {
            result: Err(error),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaResolver for ScriptedResolver {
    fn name(&self) -> &'static str {
        "scripted-resolver"
    }

    async fn resolve(&self, url: &str) -> std::result::Result<ResolvedMedia, ResolverError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.result.clone()
    }
}
