//! Turning perceived events into prompts, and replies into effects.

use chrono::{DateTime, Utc};
use officelife_types::{
    Character, CompassDirection, Conversation, ConversationId, LoudnessBand, QueuedAction,
    RelationshipLabel, TranscriptLine, WitnessPrompt, WitnessResponse, WorldEvent,
};
use officelife_world::NavGrid;
use tracing::{debug, info, warn};

use crate::config::PerceptionConfig;
use crate::parse::parse_witness_response;
use crate::perception::{PerceptionReport, PerceptionSystem};
use crate::prompt::{PromptEngine, WitnessContext};

/// Log target for dialogue spoken outside any conversation.
pub const DIALOGUE_TARGET: &str = "officelife::dialogue";

/// What happened to a witness response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// An action was appended to the witness's action queue.
    Queued,
    /// A line was appended to the active conversation.
    Spoken(ConversationId),
    /// A line was spoken with no conversation to record it; it was logged.
    Logged,
    /// The response could not be understood and was discarded.
    Dropped,
}

/// Classifies witnesses and renders their prompts.
#[derive(Debug)]
pub struct WitnessProcessor {
    prompts: PromptEngine,
    perception: PerceptionConfig,
}

impl WitnessProcessor {
    /// Create a processor.
    pub const fn new(prompts: PromptEngine, perception: PerceptionConfig) -> Self {
        Self { prompts, perception }
    }

    /// Perception tuning in use.
    pub const fn perception_config(&self) -> &PerceptionConfig {
        &self.perception
    }

    /// Classify one witness against one event.
    pub fn classify(&self, grid: &NavGrid, witness: &Character, event: &WorldEvent) -> PerceptionReport {
        PerceptionSystem::new(grid, self.perception).classify(witness, event)
    }

    /// Build the prompt for one witness, or `None` if they noticed nothing.
    ///
    /// A template failure is logged and treated as no prompt; it never
    /// affects other witnesses.
    pub fn witness(&self, grid: &NavGrid, witness: &Character, event: &WorldEvent) -> Option<WitnessPrompt> {
        let report = self.classify(grid, witness, event);
        if !report.level.is_aware() {
            debug!(
                witness = %witness.name,
                event_id = %event.id,
                base_level = report.base_level.as_u8(),
                "witness unaware"
            );
            return None;
        }

        let context = self.context(witness, event, &report);
        match self.prompts.render(report.level, &context) {
            Ok(Some(text)) => Some(WitnessPrompt {
                event_id: event.id,
                witness_id: witness.id,
                level: report.level,
                text,
            }),
            Ok(None) => None,
            Err(e) => {
                warn!(witness = %witness.name, event_id = %event.id, error = %e, "failed to render witness prompt");
                None
            }
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn context(&self, witness: &Character, event: &WorldEvent, report: &PerceptionReport) -> WitnessContext {
        let relationship = RelationshipLabel::from_score(witness.relationship_with(event.actor_id));
        let band = LoudnessBand::classify(
            report.loudness,
            self.perception.moderate_loudness,
            self.perception.distinct_loudness,
        );
        WitnessContext {
            witness: witness.name.clone(),
            personality: witness.personality_tags.iter().cloned().collect(),
            actor: event.actor_name.clone(),
            description: event.description.clone(),
            location: event.location.clone(),
            distance: report.distance.round().max(0.0) as u32,
            relationship: relationship.label(),
            framing: report.framing.map(|f| f.label()),
            loudness: band.label(),
            sound: event.kind.sound_word(),
            direction: CompassDirection::from_bearing(report.bearing).label(),
            event_id: event.id.to_string(),
        }
    }
}

/// Apply a raw decision-layer response for `witness`.
///
/// `ACTION` goes on the witness's action queue. `DIALOGUE` goes into the
/// active `conversation`, whoever speaks it, and to the [`DIALOGUE_TARGET`]
/// log when there is none. Anything unparseable is logged and dropped.
pub fn apply_response(
    witness: &mut Character,
    raw: &str,
    conversation: Option<&mut Conversation>,
    now: DateTime<Utc>,
) -> ResponseOutcome {
    let response = match parse_witness_response(raw) {
        Ok(response) => response,
        Err(e) => {
            warn!(witness = %witness.name, error = %e, raw_response = raw, "dropping witness response");
            return ResponseOutcome::Dropped;
        }
    };

    match response {
        WitnessResponse::Action { event_id, action } => {
            debug!(witness = %witness.name, action = %action, "action queued");
            witness.action_queue.push_back(QueuedAction { event_id, action });
            ResponseOutcome::Queued
        }
        WitnessResponse::Dialogue { event_id, line } => match conversation {
            Some(conversation) => {
                if !conversation.includes(witness.id) {
                    debug!(witness = %witness.name, conversation = %conversation.id, "bystander joins the conversation");
                }
                conversation.lines.push(TranscriptLine {
                    speaker_id: witness.id,
                    speaker_name: witness.name.clone(),
                    text: line,
                    event_id,
                    spoken_at: now,
                });
                ResponseOutcome::Spoken(conversation.id)
            }
            None => {
                info!(target: DIALOGUE_TARGET, speaker = %witness.name, line = %line, "says");
                ResponseOutcome::Logged
            }
        },
    }
}
