//! Background track resolution
//!
//! **Responsibilities:**
//! - Running the resolution pipeline off the command path
//! - Containing panics inside resolution work
//! - Applying outcomes under the session lock, discarding stale generations

use super::commands::Placement;
use super::core::PlaybackOrchestrator;
use crate::platform::ChatChannel;
use crate::resolver::TrackLoadOutcome;
use crate::state::BotEvent;
use jukebox_common::events::QueueChangeTrigger;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Reason reported when resolution work dies unexpectedly
const INTERNAL_FAILURE: &str = "an unexpected error occurred while loading the track";

/// What applying an outcome did
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Applied {
    Placed(Placement),

    /// Outcome had no track; message for the user
    Rejected(String),

    /// Session was stopped after the resolution started
    Stale,
}

impl PlaybackOrchestrator {
    /// Resolve `reference` in the background and report to `reply`
    pub(super) fn spawn_play_resolution(
        &self,
        reply: Arc<dyn ChatChannel>,
        reference: String,
        generation: u64,
    ) -> JoinHandle<()> {
        let orchestrator = self.clone();
        tokio::spawn(async move {
            let outcome = orchestrator.resolve_guarded(&reference).await;
            match orchestrator
                .apply_outcome(&reference, generation, outcome, QueueChangeTrigger::UserEnqueue)
                .await
            {
                Applied::Placed(placement) => reply.send(&placement.to_message()).await,
                Applied::Rejected(message) => reply.send(&message).await,
                Applied::Stale => {}
            }
        })
    }

    /// Run the pipeline in its own task so a panic becomes a `Failed` outcome
    pub(super) async fn resolve_guarded(&self, reference: &str) -> TrackLoadOutcome {
        let pipeline = self.pipeline.clone();
        let owned = reference.to_string();

        match tokio::spawn(async move { pipeline.resolve(&owned).await }).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(reference = %reference, error = %e, "Resolution task failed");
                TrackLoadOutcome::Failed(INTERNAL_FAILURE.to_string())
            }
        }
    }

    /// Apply an outcome to the session if its generation is still current
    pub(super) async fn apply_outcome(
        &self,
        reference: &str,
        generation: u64,
        outcome: TrackLoadOutcome,
        trigger: QueueChangeTrigger,
    ) -> Applied {
        let mut session = self.state.lock().await;

        if !session.is_current_generation(generation) {
            let current_generation = session.generation;
            drop(session);

            info!(
                reference = %reference,
                generation,
                current_generation,
                success = outcome.is_success(),
                "Discarding resolution outcome from before stop"
            );
            self.state.increment_stale_outcomes();
            self.state.broadcast_event(BotEvent::StaleOutcomeDiscarded {
                generation,
                current_generation,
                timestamp: chrono::Utc::now(),
            });
            return Applied::Stale;
        }

        let rejection = match outcome {
            TrackLoadOutcome::NoMatch => "No match found. Please check that the URL is correct.".to_string(),
            TrackLoadOutcome::Failed(reason) => format!("Failed to load the track: {}", reason),
            success => match success.into_track() {
                Some(track) => {
                    let placement = self.start_or_enqueue(&mut session, track, trigger);
                    return Applied::Placed(placement);
                }
                None => "No playable track found.".to_string(),
            },
        };
        drop(session);

        warn!(reference = %reference, reason = %rejection, "Resolution failed");
        self.state.broadcast_event(BotEvent::ResolutionFailed {
            reference: reference.to_string(),
            reason: rejection.clone(),
            timestamp: chrono::Utc::now(),
        });
        Applied::Rejected(format!("❌ {}", rejection))
    }
}
