//! Command type definitions

use serde::{Deserialize, Serialize};

/// Known chat commands, identified by their `!`-prefixed token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    Play,
    Stop,
    Pause,
    Resume,
    Skip,
    Queue,
    Help,
    Playlist,
}

impl CommandKind {
    /// Every known command
    pub const ALL: [CommandKind; 8] = [
        CommandKind::Play,
        CommandKind::Stop,
        CommandKind::Pause,
        CommandKind::Resume,
        CommandKind::Skip,
        CommandKind::Queue,
        CommandKind::Help,
        CommandKind::Playlist,
    ];

    /// Canonical lowercase token including the trigger prefix
    pub fn token(&self) -> &'static str {
        match self {
            CommandKind::Play => "!play",
            CommandKind::Stop => "!stop",
            CommandKind::Pause => "!pause",
            CommandKind::Resume => "!resume",
            CommandKind::Skip => "!skip",
            CommandKind::Queue => "!queue",
            CommandKind::Help => "!help",
            CommandKind::Playlist => "!playlist",
        }
    }

    /// Case-insensitive lookup of a full command token
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.token().eq_ignore_ascii_case(token))
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Result of parsing one chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Recognized command, `None` when the text is not a command
    pub command: Option<CommandKind>,
    /// Ordered arguments; a recognized media URL is always a single argument
    pub args: Vec<String>,
    /// Text as received
    pub original_text: String,
}

impl ParsedCommand {
    pub(crate) fn invalid(original_text: &str) -> Self {
        Self {
            command: None,
            args: Vec::new(),
            original_text: original_text.to_string(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.command.is_some()
    }

    /// Arguments joined with single spaces
    pub fn args_as_string(&self) -> String {
        self.args.join(" ")
    }

    /// Convert into the dispatchable command form
    pub fn to_command(&self) -> Command {
        match self.command {
            None => Command::Invalid,
            Some(CommandKind::Play) => Command::Play(self.args.clone()),
            Some(CommandKind::Stop) => Command::Stop,
            Some(CommandKind::Pause) => Command::Pause,
            Some(CommandKind::Resume) => Command::Resume,
            Some(CommandKind::Skip) => Command::Skip,
            Some(CommandKind::Queue) => Command::QueueInfo,
            Some(CommandKind::Help) => Command::Help,
            Some(CommandKind::Playlist) => {
                Command::Playlist(super::parser::parse_playlist_command(&self.args))
            }
        }
    }
}

/// Dispatchable command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Play the first argument (URL or reference)
    Play(Vec<String>),
    Stop,
    Pause,
    Resume,
    Skip,
    QueueInfo,
    Help,
    Playlist(PlaylistCommand),
    /// Not a command; ignored by the dispatcher
    Invalid,
}

/// Playlist subcommand with its remaining arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistCommand {
    /// Lowercased first argument, `"help"` when none was given
    pub subcommand: String,
    pub args: Vec<String>,
}

impl PlaylistCommand {
    pub fn args_as_string(&self) -> String {
        self.args.join(" ")
    }

    /// Typed form of the subcommand; anything unrecognized is `Help`
    pub fn action(&self) -> PlaylistAction {
        match self.subcommand.as_str() {
            "create" => PlaylistAction::Create,
            "add" => PlaylistAction::Add,
            "list" => PlaylistAction::List,
            "show" => PlaylistAction::Show,
            "delete" => PlaylistAction::Delete,
            "remove" => PlaylistAction::Remove,
            "play" => PlaylistAction::Play,
            _ => PlaylistAction::Help,
        }
    }
}

/// Playlist subcommands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistAction {
    Create,
    Add,
    List,
    Show,
    Delete,
    Remove,
    Play,
    Help,
}
