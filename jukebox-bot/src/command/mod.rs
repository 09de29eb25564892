//! Chat command interpretation
//!
//! Raw chat text becomes a [`ParsedCommand`], then a dispatchable [`Command`].

pub mod parser;
pub mod types;

pub use parser::{contains_media_url, parse_command, parse_playlist_command, tokenize_arguments, TRIGGER_PREFIX};
pub use types::{Command, CommandKind, ParsedCommand, PlaylistAction, PlaylistCommand};

/// Display form of a millisecond duration (`H:MM:SS`, `M:SS` or `unknown`)
pub use jukebox_common::human_time::format_duration;
