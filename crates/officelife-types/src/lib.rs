//! Shared type definitions for the office simulation.
//!
//! Every crate in the workspace speaks in these types. Records that cross
//! into the browser renderer derive `ts-rs` so their `TypeScript` bindings
//! are generated alongside the Rust definitions.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for characters, events, conversations
//! - [`geometry`] -- World-space vectors, angles, and grid cells
//! - [`enums`] -- Facing, action state, event kinds, perception levels
//! - [`structs`] -- Characters, world events, witness prompts and responses

pub mod enums;
pub mod geometry;
pub mod ids;
pub mod structs;

pub use enums::{
    ActionState, CompassDirection, EventKind, Facing, LoudnessBand, PerceptionLevel,
    RelationshipLabel, ViewFraming,
};
pub use geometry::{Cell, Vec2, angular_difference, normalize_degrees};
pub use ids::{CharacterId, ConversationId, EventId};
pub use structs::{
    Character, CharacterSync, Conversation, DEFAULT_RELATIONSHIP, DEFAULT_SIGHT_RANGE,
    EventDraft, QueuedAction, TranscriptLine, WitnessPrompt, WitnessResponse, WorldEvent,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for renderer-facing types.

    #[test]
    fn export_bindings() {
        // Files land in `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::CharacterId::export_all();
        let _ = crate::ids::EventId::export_all();
        let _ = crate::geometry::Vec2::export_all();
        let _ = crate::enums::Facing::export_all();
        let _ = crate::enums::ActionState::export_all();
        let _ = crate::enums::EventKind::export_all();
        let _ = crate::enums::PerceptionLevel::export_all();
        let _ = crate::structs::CharacterSync::export_all();
        let _ = crate::structs::WorldEvent::export_all();
        let _ = crate::structs::WitnessPrompt::export_all();
        let _ = crate::structs::WitnessResponse::export_all();
        let _ = crate::structs::Conversation::export_all();
    }
}
