//! Chat command parser
//!
//! Turns raw chat text into a [`ParsedCommand`]. Tolerates a missing space
//! between the command token and its argument (`!playhttps://...`) and keeps
//! recognized media URLs together as a single argument.

use super::types::{CommandKind, ParsedCommand, PlaylistCommand};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

/// Leading character marking chat text as a command
pub const TRIGGER_PREFIX: char = '!';

/// Recognized media URL: scheme, optional `www.`, allow-listed host, then any
/// non-whitespace run
static MEDIA_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)https?://(?:www\.)?(?:youtube\.com|youtu\.be|soundcloud\.com|spotify\.com)\S+")
        .expect("media URL pattern is valid")
});

/// Known commands ordered longest token first, so `!playlist...` is never
/// recovered as `!play` + `list...`
static RECOVERY_ORDER: Lazy<Vec<CommandKind>> = Lazy::new(|| {
    let mut kinds = CommandKind::ALL.to_vec();
    kinds.sort_by_key(|kind| std::cmp::Reverse(kind.token().len()));
    kinds
});

/// True when `text` contains a recognized media URL
pub fn contains_media_url(text: &str) -> bool {
    MEDIA_URL_PATTERN.is_match(text)
}

/// Parse raw chat text into a command and its arguments.
///
/// Text that is empty or does not start with [`TRIGGER_PREFIX`] is invalid.
/// When the first whitespace-delimited token is not a known command, each
/// known command is tried as a prefix of the text; the trailing content is
/// accepted as arguments if it looks like an argument.
pub fn parse_command(raw_text: &str) -> ParsedCommand {
    if raw_text.trim().is_empty() || !raw_text.starts_with(TRIGGER_PREFIX) {
        return ParsedCommand::invalid(raw_text);
    }

    let message = raw_text.trim();
    debug!(message = %message, "Parsing command");

    let (token, remainder) = match message.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest),
        None => (message, ""),
    };

    if let Some(kind) = CommandKind::from_token(token) {
        return ParsedCommand {
            command: Some(kind),
            args: tokenize_arguments(remainder),
            original_text: message.to_string(),
        };
    }

    if let Some(recovered) = recover_missing_space(message) {
        info!(
            message = %message,
            command = %recovered.command.map(|k| k.token()).unwrap_or_default(),
            args = %recovered.args_as_string(),
            "Recovered command with missing space"
        );
        return recovered;
    }

    ParsedCommand::invalid(message)
}

/// Try every known command as a case-insensitive prefix of `message`
fn recover_missing_space(message: &str) -> Option<ParsedCommand> {
    RECOVERY_ORDER.iter().find_map(|kind| {
        let token = kind.token();
        let prefix = message.get(..token.len())?;
        if !prefix.eq_ignore_ascii_case(token) || message.len() <= token.len() {
            return None;
        }

        let remaining = &message[token.len()..];
        if !looks_like_argument(remaining) {
            return None;
        }

        Some(ParsedCommand {
            command: Some(*kind),
            args: tokenize_arguments(remaining),
            original_text: message.to_string(),
        })
    })
}

/// An argument is a media URL or anything containing an alphanumeric character
fn looks_like_argument(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    contains_media_url(text) || text.chars().any(|c| c.is_ascii_alphanumeric())
}

/// Split an argument string, keeping the first media URL as one token.
///
/// Text before and after the URL is split on whitespace. Without a URL the
/// whole string is split on whitespace.
pub fn tokenize_arguments(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let Some(url) = MEDIA_URL_PATTERN.find(text) else {
        return split_whitespace(text);
    };

    let mut args = split_whitespace(&text[..url.start()]);
    args.push(url.as_str().to_string());
    args.extend(split_whitespace(&text[url.end()..]));
    args
}

fn split_whitespace(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Split playlist arguments into a lowercased subcommand and the rest.
///
/// No arguments yields the `"help"` subcommand.
pub fn parse_playlist_command(args: &[String]) -> PlaylistCommand {
    match args.split_first() {
        None => PlaylistCommand {
            subcommand: "help".to_string(),
            args: Vec::new(),
        },
        Some((first, rest)) => PlaylistCommand {
            subcommand: first.to_lowercase(),
            args: rest.to_vec(),
        },
    }
}
