//! Enumeration types for the office simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::geometry::normalize_degrees;

// ---------------------------------------------------------------------------
// Facing
// ---------------------------------------------------------------------------

/// Cardinal facing direction used by sprites and by movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    /// Towards negative `y` (270 degrees).
    Up,
    /// Towards positive `y` (90 degrees).
    #[default]
    Down,
    /// Towards negative `x` (180 degrees).
    Left,
    /// Towards positive `x` (0 degrees).
    Right,
}

impl Facing {
    /// Heading of this facing in degrees.
    pub const fn angle_degrees(self) -> f32 {
        match self {
            Self::Right => 0.0,
            Self::Down => 90.0,
            Self::Left => 180.0,
            Self::Up => 270.0,
        }
    }

    /// Facing from the dominant axis of a displacement.
    ///
    /// Horizontal wins ties. Returns `None` for a zero displacement so the
    /// caller keeps its previous facing.
    pub fn from_delta(dx: f32, dy: f32) -> Option<Self> {
        let (ax, ay) = (dx.abs(), dy.abs());
        if ax < f32::EPSILON && ay < f32::EPSILON {
            return None;
        }
        if ax >= ay {
            Some(if dx > 0.0 { Self::Right } else { Self::Left })
        } else {
            Some(if dy > 0.0 { Self::Down } else { Self::Up })
        }
    }

    /// Nearest cardinal facing for an arbitrary heading.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_angle(angle: f32) -> Self {
        let sector = (normalize_degrees(angle + 45.0) / 90.0).floor() as u32;
        match sector % 4 {
            0 => Self::Right,
            1 => Self::Down,
            2 => Self::Left,
            _ => Self::Up,
        }
    }
}

// ---------------------------------------------------------------------------
// Action state
// ---------------------------------------------------------------------------

/// What a character is currently doing.
///
/// Movement owns only the [`ActionState::Idle`] and [`ActionState::Walking`]
/// transitions. Every other state belongs to the decision layer and is never
/// overwritten by movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionState {
    /// Standing around.
    #[default]
    Idle,
    /// Following a path.
    Walking,
    /// Doing routine work at a desk.
    Working,
    /// Deeply absorbed in a task; notices little.
    FocusedOnTask,
    /// In a conversation.
    Talking,
    /// Generically distracted (phone, daydreaming).
    Distracted,
}

impl ActionState {
    /// Number of perception levels this state subtracts from a witness.
    pub const fn distraction_penalty(self) -> u8 {
        match self {
            Self::FocusedOnTask => 2,
            Self::Talking | Self::Distracted => 1,
            Self::Idle | Self::Walking | Self::Working => 0,
        }
    }

    /// Whether the movement system is allowed to replace this state.
    pub const fn is_movement_state(self) -> bool {
        matches!(self, Self::Idle | Self::Walking)
    }
}

// ---------------------------------------------------------------------------
// Event kinds
// ---------------------------------------------------------------------------

/// Category of a world event, used to pick the word for what a witness heard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Something thrown.
    Throw,
    /// Something broken.
    Break,
    /// Laughter.
    Laugh,
    /// Raised voices.
    Shout,
    /// A door or drawer slammed.
    Slam,
    /// Something dropped.
    Drop,
    /// Ordinary talking.
    Speech,
    /// Anything without a dedicated sound.
    #[default]
    #[serde(other)]
    Other,
}

impl EventKind {
    /// The word a witness uses for the sound of this event.
    pub const fn sound_word(self) -> &'static str {
        match self {
            Self::Throw => "thud",
            Self::Break => "crash",
            Self::Laugh => "laughter",
            Self::Shout => "shouting",
            Self::Slam => "slam",
            Self::Drop => "clatter",
            Self::Speech => "voices",
            Self::Other => "suspicious noise",
        }
    }

    /// Parse a free-form type tag. Unknown tags map to [`EventKind::Other`].
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "throw" => Self::Throw,
            "break" => Self::Break,
            "laugh" => Self::Laugh,
            "shout" | "yell" => Self::Shout,
            "slam" => Self::Slam,
            "drop" => Self::Drop,
            "speech" | "talk" => Self::Speech,
            _ => Self::Other,
        }
    }
}

// ---------------------------------------------------------------------------
// Perception
// ---------------------------------------------------------------------------

/// How aware a witness is of an event, from unaware to clearly saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum PerceptionLevel {
    /// Level 0: noticed nothing.
    #[default]
    Unaware,
    /// Level 1: heard it only.
    Heard,
    /// Level 2: glimpsed motion without detail.
    Glimpsed,
    /// Level 3: clearly saw it.
    Witnessed,
}

impl PerceptionLevel {
    /// Numeric level in `0..=3`.
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Unaware => 0,
            Self::Heard => 1,
            Self::Glimpsed => 2,
            Self::Witnessed => 3,
        }
    }

    /// Level from a number; anything above 3 clamps to [`PerceptionLevel::Witnessed`].
    pub const fn from_u8(level: u8) -> Self {
        match level {
            0 => Self::Unaware,
            1 => Self::Heard,
            2 => Self::Glimpsed,
            _ => Self::Witnessed,
        }
    }

    /// Lower the level by `steps`, stopping at [`PerceptionLevel::Unaware`].
    pub const fn reduced_by(self, steps: u8) -> Self {
        Self::from_u8(self.as_u8().saturating_sub(steps))
    }

    /// Whether the witness noticed anything at all.
    pub const fn is_aware(self) -> bool {
        !matches!(self, Self::Unaware)
    }
}

/// How a partial (level 2) sighting is framed in the witness prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum ViewFraming {
    /// A clear line of sight, but attention was elsewhere.
    Peripheral,
    /// In view, but something was in the way.
    Obstructed,
}

impl ViewFraming {
    /// Phrase used in prompts.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Peripheral => "peripheral vision",
            Self::Obstructed => "obstructed view",
        }
    }
}

/// Qualitative loudness of a sound as perceived by a witness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum LoudnessBand {
    /// Barely audible.
    Faint,
    /// Clearly audible.
    Moderate,
    /// Loud and unmistakable.
    Distinct,
}

impl LoudnessBand {
    /// Band a perceived loudness given the two band boundaries.
    pub fn classify(loudness: f32, moderate_from: f32, distinct_from: f32) -> Self {
        if loudness >= distinct_from {
            Self::Distinct
        } else if loudness >= moderate_from {
            Self::Moderate
        } else {
            Self::Faint
        }
    }

    /// Adjective used in prompts.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Faint => "faint",
            Self::Moderate => "moderate",
            Self::Distinct => "distinct",
        }
    }
}

/// One of the eight compass directions, relative to screen-up being north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum CompassDirection {
    /// Bearing around 0 degrees.
    East,
    /// Bearing around 45 degrees.
    SouthEast,
    /// Bearing around 90 degrees.
    South,
    /// Bearing around 135 degrees.
    SouthWest,
    /// Bearing around 180 degrees.
    West,
    /// Bearing around 225 degrees.
    NorthWest,
    /// Bearing around 270 degrees.
    North,
    /// Bearing around 315 degrees.
    NorthEast,
}

impl CompassDirection {
    /// Direction for a bearing in degrees.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_bearing(bearing: f32) -> Self {
        let sector = (normalize_degrees(bearing + 22.5) / 45.0).floor() as u32;
        match sector % 8 {
            0 => Self::East,
            1 => Self::SouthEast,
            2 => Self::South,
            3 => Self::SouthWest,
            4 => Self::West,
            5 => Self::NorthWest,
            6 => Self::North,
            _ => Self::NorthEast,
        }
    }

    /// Word used in prompts.
    pub const fn label(self) -> &'static str {
        match self {
            Self::East => "east",
            Self::SouthEast => "southeast",
            Self::South => "south",
            Self::SouthWest => "southwest",
            Self::West => "west",
            Self::NorthWest => "northwest",
            Self::North => "north",
            Self::NorthEast => "northeast",
        }
    }
}

// ---------------------------------------------------------------------------
// Relationships
// ---------------------------------------------------------------------------

/// Qualitative band of an affinity score (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum RelationshipLabel {
    /// Score 0-25.
    Hostile,
    /// Score 26-40.
    Unfriendly,
    /// Score 41-60.
    Neutral,
    /// Score 61-75.
    Friendly,
    /// Score above 75.
    CloseFriend,
}

impl RelationshipLabel {
    /// Band a relationship score.
    pub const fn from_score(score: u8) -> Self {
        if score > 75 {
            Self::CloseFriend
        } else if score > 60 {
            Self::Friendly
        } else if score > 40 {
            Self::Neutral
        } else if score > 25 {
            Self::Unfriendly
        } else {
            Self::Hostile
        }
    }

    /// Phrase used in prompts.
    pub const fn label(self) -> &'static str {
        match self {
            Self::CloseFriend => "close friend",
            Self::Friendly => "friendly",
            Self::Neutral => "neutral",
            Self::Unfriendly => "unfriendly",
            Self::Hostile => "hostile",
        }
    }
}
