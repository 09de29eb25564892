//! # Jukebox Common Library
//!
//! Shared code for the jukebox crates:
//! - Error type
//! - Configuration loading (TOML bootstrap file)
//! - Event types and the EventBus
//! - Human-readable duration formatting

pub mod config;
pub mod error;
pub mod events;
pub mod human_time;

pub use error::{Error, Result};
