//! Spatial model for the office simulation.
//!
//! This crate turns an authored tile map into a walkability grid and
//! answers the spatial questions the simulation asks of it: which cells are
//! free, how to walk from one cell to another, and whether one cell can see
//! another.
//!
//! # Modules
//!
//! - [`error`] -- Error types for loading map data.
//! - [`tilemap`] -- Tiled JSON model: tile layers, chunks, object groups,
//!   spawn points.
//! - [`nav_grid`] -- [`NavGrid`], the boolean walkability matrix built from
//!   collision layers and obstacle objects.
//! - [`pathfinding`] -- Deterministic 4-directional A* and world-space route
//!   planning.
//! - [`line_of_sight`] -- Bresenham line iteration and sight checks.
//! - [`office_layout`] -- A built-in sample office for running without a
//!   map file.

pub mod error;
pub mod line_of_sight;
pub mod nav_grid;
pub mod office_layout;
pub mod pathfinding;
pub mod tilemap;

pub use error::WorldError;
pub use line_of_sight::{BresenhamLine, has_line_of_sight};
pub use nav_grid::{DEFAULT_TILE_SIZE, NavGrid, OBSTACLE_TYPES, is_obstacle};
pub use office_layout::{MEETING_ROOM_DOOR, sample_office};
pub use pathfinding::{find_path, plan_route};
pub use tilemap::{Layer, MapObject, SpawnPoint, TileLayer, TileMap};
