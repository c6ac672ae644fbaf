//! Error types for the engine binary.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: officelife_core::ConfigError,
    },

    /// The map could not be loaded.
    #[error("map error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: officelife_world::WorldError,
    },

    /// The simulation could not be set up.
    #[error("simulation error: {source}")]
    Sim {
        /// The underlying simulation error.
        #[from]
        source: officelife_core::SimError,
    },

    /// The roster could not be placed.
    #[error("spawner error: {message}")]
    Spawner {
        /// Description of the spawner failure.
        message: String,
    },
}
