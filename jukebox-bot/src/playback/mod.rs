//! Playback queue, track types and the orchestrator state machine

pub mod engine;
pub mod queue;
pub mod types;

pub use engine::{OrchestratorConfig, PlaybackOrchestrator};
pub use queue::PlaybackQueue;
pub use types::{Track, TrackDuration, TrackEndReason, TrackEndSignal};
