//! Playback orchestrator
//!
//! **Module Structure:**
//! - `core.rs`: Struct, construction, message dispatch, event helpers
//! - `commands.rs`: play / stop / pause / resume / skip / queue, track-end handling
//! - `resolution.rs`: Background resolution and outcome application
//! - `playlist.rs`: Playlist subcommands

mod commands;
mod core;
mod playlist;
mod resolution;

pub use core::{OrchestratorConfig, PlaybackOrchestrator, Reply};
