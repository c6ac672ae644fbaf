//! Error types for the `officelife-core` crate.

use officelife_types::CharacterId;

use crate::config::ConfigError;
use crate::prompt::PromptError;

/// Errors surfaced by the simulation API.
///
/// Geometry, pathing and witness fan-out never fail; these cover misuse of
/// the API and set-up problems.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// No character with this id exists.
    #[error("unknown character {id}")]
    UnknownCharacter {
        /// The id that was looked up.
        id: CharacterId,
    },

    /// Prompt templates could not be loaded.
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
