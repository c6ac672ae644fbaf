//! Error types for the `officelife-world` crate.
//!
//! Only loading a map can fail. Grid queries, pathfinding and line of sight
//! are total: off-grid cells read as blocked and unreachable goals return
//! `None`.

use std::path::PathBuf;

/// Errors that can occur while loading tile-map data.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The map file could not be read.
    #[error("failed to read map file {path}: {source}")]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The map JSON did not match the expected shape.
    #[error("failed to parse map JSON: {source}")]
    Parse {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
