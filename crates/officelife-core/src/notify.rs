//! Character change notifications.
//!
//! Movement and the decision layer never reach into the renderer. They
//! publish [`CharacterChange`] records into a [`ChangeSink`]; the renderer
//! (or a test) drains a [`ChangeFeed`] once per frame.

use officelife_types::{ActionState, CharacterId, Facing, Vec2};
use serde::Serialize;

/// Something about a character that observers may need to redraw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum CharacterChange {
    /// The character's position changed.
    Moved {
        /// The character.
        id: CharacterId,
        /// Position before the move.
        from: Vec2,
        /// Position after the move.
        to: Vec2,
    },
    /// The character turned.
    FacingChanged {
        /// The character.
        id: CharacterId,
        /// New facing.
        facing: Facing,
    },
    /// The character's activity changed.
    StateChanged {
        /// The character.
        id: CharacterId,
        /// Previous activity.
        from: ActionState,
        /// New activity.
        to: ActionState,
    },
}

impl CharacterChange {
    /// The character the change concerns.
    pub const fn character(&self) -> CharacterId {
        match self {
            Self::Moved { id, .. } | Self::FacingChanged { id, .. } | Self::StateChanged { id, .. } => {
                *id
            }
        }
    }
}

/// Receiver of character changes.
pub trait ChangeSink {
    /// Accept one change.
    fn publish(&mut self, change: CharacterChange);
}

/// Buffers changes until the consumer drains them.
#[derive(Debug, Clone, Default)]
pub struct ChangeFeed {
    pending: Vec<CharacterChange>,
}

impl ChangeFeed {
    /// Create an empty feed.
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Take every buffered change, oldest first.
    pub fn drain(&mut self) -> Vec<CharacterChange> {
        std::mem::take(&mut self.pending)
    }

    /// Buffered changes, oldest first.
    pub fn pending(&self) -> &[CharacterChange] {
        &self.pending
    }

    /// Number of buffered changes.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl ChangeSink for ChangeFeed {
    fn publish(&mut self, change: CharacterChange) {
        self.pending.push(change);
    }
}

impl ChangeSink for Vec<CharacterChange> {
    fn publish(&mut self, change: CharacterChange) {
        self.push(change);
    }
}
