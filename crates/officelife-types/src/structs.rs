//! Core entity structs: characters, world events, witness prompts and
//! responses, conversation transcripts, and renderer sync records.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ActionState, EventKind, Facing, PerceptionLevel};
use crate::geometry::Vec2;
use crate::ids::{CharacterId, ConversationId, EventId};

/// Affinity assumed towards anyone without a stored relationship score.
pub const DEFAULT_RELATIONSHIP: u8 = 50;

/// Sight range given to characters that do not specify one, in world units.
pub const DEFAULT_SIGHT_RANGE: f32 = 400.0;

// ---------------------------------------------------------------------------
// Character
// ---------------------------------------------------------------------------

/// A character in the office, reduced to the fields movement, perception
/// and witnessing need.
///
/// Position, facing and path are written by movement every frame. The
/// action state and relationships are written by the decision layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Unique character identifier.
    pub id: CharacterId,
    /// Display name.
    pub name: String,
    /// Position in continuous world units.
    pub position: Vec2,
    /// Heading in degrees within `[0, 360)`.
    pub facing_angle: f32,
    /// Maximum distance at which this character can see anything.
    pub max_sight_range: f32,
    /// Current activity.
    pub action_state: ActionState,
    /// Personality descriptors passed through to the decision layer.
    #[serde(default)]
    pub personality_tags: BTreeSet<String>,
    /// Affinity (0-100) towards other characters.
    #[serde(default)]
    pub relationships: BTreeMap<CharacterId, u8>,
    /// Disabled characters are neither moved nor asked to witness.
    pub is_enabled: bool,
    /// Remaining world-space waypoints, nearest first.
    #[serde(default)]
    pub path: VecDeque<Vec2>,
    /// Final destination of the current path, kept for re-pathing.
    #[serde(default)]
    pub destination: Option<Vec2>,
    /// Prompts waiting for the decision layer, oldest first.
    #[serde(default)]
    pub pending_prompts: VecDeque<WitnessPrompt>,
    /// Actions chosen in response to witnessed events, oldest first.
    #[serde(default)]
    pub action_queue: VecDeque<QueuedAction>,
}

impl Character {
    /// Create an enabled, idle character facing down with default sight.
    pub fn new(name: impl Into<String>, position: Vec2) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            position,
            facing_angle: Facing::Down.angle_degrees(),
            max_sight_range: DEFAULT_SIGHT_RANGE,
            action_state: ActionState::Idle,
            personality_tags: BTreeSet::new(),
            relationships: BTreeMap::new(),
            is_enabled: true,
            path: VecDeque::new(),
            destination: None,
            pending_prompts: VecDeque::new(),
            action_queue: VecDeque::new(),
        }
    }

    /// Set the heading in degrees.
    #[must_use]
    pub fn with_facing_angle(mut self, angle: f32) -> Self {
        self.facing_angle = crate::geometry::normalize_degrees(angle);
        self
    }

    /// Set the sight range.
    #[must_use]
    pub const fn with_sight_range(mut self, range: f32) -> Self {
        self.max_sight_range = range;
        self
    }

    /// Set the action state.
    #[must_use]
    pub const fn with_state(mut self, state: ActionState) -> Self {
        self.action_state = state;
        self
    }

    /// Add a personality tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.personality_tags.insert(tag.into());
        self
    }

    /// Store an affinity score towards another character (clamped to 100).
    #[must_use]
    pub fn with_relationship(mut self, other: CharacterId, score: u8) -> Self {
        self.relationships.insert(other, score.min(100));
        self
    }

    /// Affinity towards `other`, defaulting to [`DEFAULT_RELATIONSHIP`].
    pub fn relationship_with(&self, other: CharacterId) -> u8 {
        self.relationships
            .get(&other)
            .copied()
            .unwrap_or(DEFAULT_RELATIONSHIP)
    }

    /// Nearest cardinal facing.
    pub fn facing(&self) -> Facing {
        Facing::from_angle(self.facing_angle)
    }

    /// Turn to a cardinal facing.
    pub const fn set_facing(&mut self, facing: Facing) {
        self.facing_angle = facing.angle_degrees();
    }

    /// Whether any waypoints remain.
    pub fn has_path(&self) -> bool {
        !self.path.is_empty()
    }

    /// Drop the current path and destination.
    pub fn clear_path(&mut self) {
        self.path.clear();
        self.destination = None;
    }

    /// Snapshot for the rendering layer.
    pub fn sync(&self) -> CharacterSync {
        CharacterSync {
            id: self.id,
            position: self.position,
            facing: self.facing(),
            action_state: self.action_state,
        }
    }
}

/// Position and direction record consumed by the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CharacterSync {
    /// The character.
    pub id: CharacterId,
    /// Current position.
    pub position: Vec2,
    /// Current sprite facing.
    pub facing: Facing,
    /// Current activity.
    pub action_state: ActionState,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// What an actor supplies when performing an observable action.
///
/// The event system stamps id, time, position and actor onto it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventDraft {
    /// What happened, phrased as an action ("threw a stapler at the wall").
    pub description: String,
    /// Loudness of the action at its source (0 is silent).
    pub loudness: f32,
    /// Named area where it happened, e.g. "break room".
    pub location: String,
    /// Category used for sound descriptions.
    pub kind: EventKind,
}

impl EventDraft {
    /// Create a draft.
    pub fn new(
        description: impl Into<String>,
        loudness: f32,
        location: impl Into<String>,
        kind: EventKind,
    ) -> Self {
        Self {
            description: description.into(),
            loudness: loudness.max(0.0),
            location: location.into(),
            kind,
        }
    }
}

/// An immutable record of something a character did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldEvent {
    /// Unique event identifier.
    pub id: EventId,
    /// When the event was registered.
    pub timestamp: DateTime<Utc>,
    /// Actor's position at the time of the action.
    pub position: Vec2,
    /// The acting character.
    pub actor_id: CharacterId,
    /// The acting character's display name at the time of the action.
    pub actor_name: String,
    /// What happened.
    pub description: String,
    /// Loudness at the source (never negative).
    pub loudness: f32,
    /// Named area where it happened.
    pub location: String,
    /// Category used for sound descriptions.
    pub kind: EventKind,
}

// ---------------------------------------------------------------------------
// Witness prompts and responses
// ---------------------------------------------------------------------------

/// A rendered prompt waiting on a witness's queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WitnessPrompt {
    /// The event this prompt describes.
    pub event_id: EventId,
    /// The character the prompt is for.
    pub witness_id: CharacterId,
    /// How much of the event the witness perceived.
    pub level: PerceptionLevel,
    /// Prompt text for the decision layer.
    pub text: String,
}

/// A structured reaction returned by the decision layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WitnessResponse {
    /// The witness does something.
    Action {
        /// The event being reacted to, if the responder echoed it.
        event_id: Option<EventId>,
        /// Short description of the action.
        action: String,
    },
    /// The witness says something.
    Dialogue {
        /// The event being reacted to, if the responder echoed it.
        event_id: Option<EventId>,
        /// The spoken line.
        line: String,
    },
}

impl WitnessResponse {
    /// Correlated event, if any.
    pub const fn event_id(&self) -> Option<EventId> {
        match self {
            Self::Action { event_id, .. } | Self::Dialogue { event_id, .. } => *event_id,
        }
    }
}

/// An action waiting on a character's action queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct QueuedAction {
    /// The event that prompted the action, if known.
    pub event_id: Option<EventId>,
    /// Short description of the action.
    pub action: String,
}

// ---------------------------------------------------------------------------
// Conversations
// ---------------------------------------------------------------------------

/// One spoken line in a conversation transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TranscriptLine {
    /// Who spoke.
    pub speaker_id: CharacterId,
    /// Speaker's display name.
    pub speaker_name: String,
    /// What was said.
    pub text: String,
    /// The event being reacted to, if any.
    pub event_id: Option<EventId>,
    /// When the line was recorded.
    pub spoken_at: DateTime<Utc>,
}

/// An ongoing conversation between characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Conversation {
    /// Unique conversation identifier.
    pub id: ConversationId,
    /// Who is taking part.
    pub participants: BTreeSet<CharacterId>,
    /// Lines spoken so far, in order.
    pub lines: Vec<TranscriptLine>,
}

impl Conversation {
    /// Start an empty conversation between the given characters.
    pub fn new(participants: impl IntoIterator<Item = CharacterId>) -> Self {
        Self {
            id: ConversationId::new(),
            participants: participants.into_iter().collect(),
            lines: Vec::new(),
        }
    }

    /// Whether `id` takes part in this conversation.
    pub fn includes(&self, id: CharacterId) -> bool {
        self.participants.contains(&id)
    }
}
