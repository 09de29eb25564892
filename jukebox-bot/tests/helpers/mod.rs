//! Test helper modules for jukebox-bot integration tests
//!
//! Provides reusable test infrastructure components:
//! - Recording collaborators: chat channel, audio player, voice gateway
//! - ScriptedLoader / ScriptedResolver: scripted results with gates to hold
//!   resolutions in flight
//! - Harness: orchestrator wired to all of the above

#![allow(dead_code)]

pub mod harness;
pub mod mocks;

pub use harness::Harness;
pub use mocks::{PlayerCall, RecordingChat, RecordingPlayer, RecordingVoice, ScriptedLoader, ScriptedResolver};
