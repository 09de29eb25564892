//! Console runtime collaborators
//!
//! Stand-ins for a chat platform: replies go to stdout, the voice gateway
//! only records the channel, and [`SimulatedPlayer`] plays tracks on a timer
//! and reports track-end signals like a real audio engine would.

use crate::error::Result;
use crate::platform::{AudioPlayer, ChatChannel, VoiceGateway};
use crate::playback::types::{Track, TrackEndReason, TrackEndSignal};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Chat replies printed to stdout
#[derive(Debug, Default)]
pub struct ConsoleChat;

#[async_trait]
impl ChatChannel for ConsoleChat {
    async fn send(&self, text: &str) {
        println!("{}", text);
    }
}

/// Voice gateway that only tracks which channel it is "in"
#[derive(Default)]
pub struct ConsoleVoice {
    channel: Mutex<Option<String>>,
}

impl ConsoleVoice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connected_channel(&self) -> Option<String> {
        self.channel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl VoiceGateway for ConsoleVoice {
    fn attach(&self, _player: Arc<dyn AudioPlayer>) {
        debug!("Player attached to console voice");
    }

    async fn connect(&self, channel: &str) -> Result<()> {
        let mut current = self.channel.lock().unwrap_or_else(PoisonError::into_inner);
        if current.as_deref() != Some(channel) {
            info!(channel = %channel, "Joined voice channel");
            *current = Some(channel.to_string());
        }
        Ok(())
    }
}

/// Track the engine is outputting
#[derive(Debug, Clone)]
struct ActiveTrack {
    id: Uuid,
    title: String,
}

#[derive(Debug)]
struct PlayerState {
    /// Bumped whenever the running timer must be invalidated
    token: u64,
    active: Option<ActiveTrack>,
    paused: bool,
    remaining: Duration,
    resumed_at: Instant,
}

/// Timer-driven audio engine
///
/// A track "plays" for its duration (or the fallback when unknown/live) and
/// then reports `Finished`. Replacing or stopping a track reports `Replaced`
/// or `Stopped`, which never advance the queue. Every signal names the track
/// it is about.
pub struct SimulatedPlayer {
    state: Arc<Mutex<PlayerState>>,
    signals: mpsc::UnboundedSender<TrackEndSignal>,
    fallback: Duration,
}

impl SimulatedPlayer {
    /// Create the player and the receiver its track-end signals arrive on
    pub fn new(fallback: Duration) -> (Self, mpsc::UnboundedReceiver<TrackEndSignal>) {
        let (signals, rx) = mpsc::unbounded_channel();
        let player = Self {
            state: Arc::new(Mutex::new(PlayerState {
                token: 0,
                active: None,
                paused: false,
                remaining: Duration::ZERO,
                resumed_at: Instant::now(),
            })),
            signals,
            fallback,
        };
        (player, rx)
    }

    fn signal(&self, track_id: Uuid, reason: TrackEndReason) {
        if self.signals.send(TrackEndSignal::new(track_id, reason)).is_err() {
            warn!(track_id = %track_id, reason = ?reason, "Track-end listener gone");
        }
    }

    /// Fire `Finished` after `after` unless the token moved on
    fn schedule_end(&self, token: u64, after: Duration) {
        let state = Arc::clone(&self.state);
        let signals = self.signals.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;

            let finished = {
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                if state.token != token {
                    return;
                }
                state.active.take()
            };

            if let Some(track) = finished {
                info!(title = %track.title, "Track finished");
                let _ = signals.send(TrackEndSignal::new(track.id, TrackEndReason::Finished));
            }
        });
    }
}

impl AudioPlayer for SimulatedPlayer {
    fn play(&self, track: &Track) {
        let length = track.duration.as_duration().unwrap_or(self.fallback);

        let (token, replaced) = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            let replaced = state.active.replace(ActiveTrack {
                id: track.id,
                title: track.title.clone(),
            });
            state.token += 1;
            state.paused = false;
            state.remaining = length;
            state.resumed_at = Instant::now();
            (state.token, replaced)
        };

        if let Some(previous) = replaced {
            debug!(previous = %previous.title, "Track replaced");
            self.signal(previous.id, TrackEndReason::Replaced);
        }

        info!(title = %track.title, uri = %track.source_uri, length = ?length, "▶ Playing");
        self.schedule_end(token, length);
    }

    fn stop(&self) {
        let stopped = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.token += 1;
            state.paused = false;
            state.active.take()
        };

        if let Some(track) = stopped {
            info!(title = %track.title, "■ Stopped");
            self.signal(track.id, TrackEndReason::Stopped);
        }
    }

    fn set_paused(&self, paused: bool) {
        let resume = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.active.is_none() || state.paused == paused {
                return;
            }

            state.paused = paused;
            state.token += 1;
            if paused {
                let elapsed = state.resumed_at.elapsed();
                state.remaining = state.remaining.saturating_sub(elapsed);
                None
            } else {
                state.resumed_at = Instant::now();
                Some((state.token, state.remaining))
            }
        };

        match resume {
            Some((token, remaining)) => {
                info!(remaining = ?remaining, "▶ Resumed");
                self.schedule_end(token, remaining);
            }
            None => info!("⏸ Paused"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::types::TrackDuration;

    fn track(ms: u64) -> Track {
        Track::new("Song", "https://cdn.test/song", TrackDuration::from_millis(ms))
    }

    #[tokio::test(start_paused = true)]
    async fn test_track_finishes_after_duration() {
        let (player, mut rx) = SimulatedPlayer::new(Duration::from_secs(180));
        let song = track(2_000);
        player.play(&song);

        let signal = rx.recv().await.unwrap();
        assert_eq!(signal.track_id, song.id);
        assert_eq!(signal.reason, TrackEndReason::Finished);
        assert!(signal.may_advance);
    }

    #[tokio::test(start_paused = true)]
    async fn test_signals_name_the_track_they_end() {
        let (player, mut rx) = SimulatedPlayer::new(Duration::from_secs(180));
        let first = track(1_000);
        let second = track(60_000);

        player.play(&first);
        tokio::time::sleep(Duration::from_secs(2)).await;
        // First track already finished, so starting the next one replaces nothing
        player.play(&second);
        player.stop();

        let finished = rx.recv().await.unwrap();
        assert_eq!((finished.track_id, finished.reason), (first.id, TrackEndReason::Finished));

        let stopped = rx.recv().await.unwrap();
        assert_eq!((stopped.track_id, stopped.reason), (second.id, TrackEndReason::Stopped));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_replace_and_stop_do_not_advance() {
        let (player, mut rx) = SimulatedPlayer::new(Duration::from_secs(180));
        let first = track(60_000);
        player.play(&first);
        player.play(&track(60_000));

        let replaced = rx.recv().await.unwrap();
        assert_eq!(replaced.track_id, first.id);
        assert_eq!(replaced.reason, TrackEndReason::Replaced);
        assert!(!replaced.may_advance);

        player.stop();
        let stopped = rx.recv().await.unwrap();
        assert_eq!(stopped.reason, TrackEndReason::Stopped);
        assert!(!stopped.may_advance);

        // Cancelled timers never fire
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_paused_track_does_not_finish() {
        let (player, mut rx) = SimulatedPlayer::new(Duration::from_secs(180));
        player.play(&track(5_000));
        player.set_paused(true);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(rx.try_recv().is_err());

        player.set_paused(false);
        let signal = rx.recv().await.unwrap();
        assert_eq!(signal.reason, TrackEndReason::Finished);
    }

    #[tokio::test]
    async fn test_console_voice_records_channel() {
        let voice = ConsoleVoice::new();
        assert_eq!(voice.connected_channel(), None);
        voice.connect("lounge").await.unwrap();
        assert_eq!(voice.connected_channel(), Some("lounge".to_string()));
    }
}
