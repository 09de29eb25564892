//! # Jukebox Bot Library (jukebox-bot)
//!
//! Chat-driven music playback: command interpretation, playback queue,
//! asynchronous track resolution and the playback state machine.
//!
//! **Architecture:** chat text → [`command`] → [`playback::PlaybackOrchestrator`]
//! → [`resolver::TrackResolutionPipeline`] (background) → queue mutation and
//! player instruction. Track-end signals from the audio engine feed back into
//! the orchestrator. All session mutations go through [`state::SharedState`].

pub mod command;
pub mod console;
pub mod error;
pub mod platform;
pub mod playback;
pub mod playlist;
pub mod resolver;
pub mod state;

pub use error::{CommandError, Error, Result};
pub use state::SharedState;
