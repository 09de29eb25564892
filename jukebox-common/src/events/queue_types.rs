//! Queue change type definitions

use serde::{Deserialize, Serialize};

/// Why the queue changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum QueueChangeTrigger {
    UserEnqueue,
    PlaylistEnqueue,
    UserSkip,
    TrackCompletion,
    UserStop,
}

impl std::fmt::Display for QueueChangeTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueChangeTrigger::UserEnqueue => write!(f, "UserEnqueue"),
            QueueChangeTrigger::PlaylistEnqueue => write!(f, "PlaylistEnqueue"),
            QueueChangeTrigger::UserSkip => write!(f, "UserSkip"),
            QueueChangeTrigger::TrackCompletion => write!(f, "TrackCompletion"),
            QueueChangeTrigger::UserStop => write!(f, "UserStop"),
        }
    }
}
