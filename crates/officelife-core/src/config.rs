//! Configuration loading and typed config structures for the office
//! simulation.
//!
//! The configuration lives in `officelife-config.yaml` at the project root.
//! Every field has a default, so an empty document (or a missing section)
//! yields the stock tuning: 48-unit tiles, 100 units/s walking, a 120-degree
//! view cone, 500-unit hearing falloff, and a 100 ms frame clamp.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use officelife_types::{ActionState, Vec2};
use serde::Deserialize;

/// Environment variable overriding `world.map_path`.
pub const MAP_PATH_ENV: &str = "OFFICELIFE_MAP";

/// Environment variable overriding `prompts.template_dir`.
pub const TEMPLATE_DIR_ENV: &str = "OFFICELIFE_TEMPLATES";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        #[from]
        source: serde_yml::Error,
    },
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `officelife-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Map source and seed.
    #[serde(default)]
    pub world: WorldConfig,

    /// Walking speed and arrival tolerance.
    #[serde(default)]
    pub movement: MovementConfig,

    /// Sight and hearing parameters.
    #[serde(default)]
    pub perception: PerceptionConfig,

    /// Event log retention.
    #[serde(default)]
    pub events: EventsConfig,

    /// Frame timing.
    #[serde(default)]
    pub frame: FrameConfig,

    /// Witness prompt templates.
    #[serde(default)]
    pub prompts: PromptsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Headless run length.
    #[serde(default)]
    pub run: RunConfig,

    /// Characters placed at start-up.
    #[serde(default)]
    pub roster: Vec<RosterEntry>,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override file values:
    /// - `OFFICELIFE_MAP` overrides `world.map_path`
    /// - `OFFICELIFE_TEMPLATES` overrides `prompts.template_dir`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var(MAP_PATH_ENV) {
            self.world.map_path = Some(PathBuf::from(path));
        }
        if let Ok(dir) = std::env::var(TEMPLATE_DIR_ENV) {
            self.prompts.template_dir = Some(PathBuf::from(dir));
        }
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Tiled JSON map to load. The built-in sample office is used when unset.
    #[serde(default)]
    pub map_path: Option<PathBuf>,

    /// Tile size used when the map file leaves `tilewidth` out or at zero.
    /// A map that declares a different size keeps its own, with a warning.
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,

    /// Random seed for reproducible runs.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            map_path: None,
            tile_size: default_tile_size(),
            seed: default_seed(),
        }
    }
}

/// Movement configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MovementConfig {
    /// Walking speed in world units per second.
    #[serde(default = "default_speed")]
    pub speed: f32,

    /// Distance below which a waypoint counts as reached.
    #[serde(default = "default_arrival_threshold")]
    pub arrival_threshold: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            arrival_threshold: default_arrival_threshold(),
        }
    }
}

/// Perception configuration.
///
/// Angles are in degrees, distances in world units, loudness in the same
/// raw units events are registered with.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PerceptionConfig {
    /// Half-width of the view cone.
    #[serde(default = "default_fov_half_angle")]
    pub fov_half_angle: f32,

    /// Distance at which sound falls off to nothing.
    #[serde(default = "default_hearing_cutoff")]
    pub hearing_cutoff: f32,

    /// Half-width of the unmuffled hearing arc around the facing.
    #[serde(default = "default_front_arc")]
    pub front_arc: f32,

    /// Loudness multiplier for sounds from behind.
    #[serde(default = "default_rear_muffling")]
    pub rear_muffling: f32,

    /// Loudness multiplier for sounds exactly to one side.
    #[serde(default = "default_side_factor")]
    pub side_factor: f32,

    /// Perceived loudness a sound must exceed to be heard.
    #[serde(default = "default_hearing_threshold")]
    pub hearing_threshold: f32,

    /// Perceived loudness from which a sound is described as moderate.
    #[serde(default = "default_moderate_loudness")]
    pub moderate_loudness: f32,

    /// Perceived loudness from which a sound is described as distinct.
    #[serde(default = "default_distinct_loudness")]
    pub distinct_loudness: f32,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            fov_half_angle: default_fov_half_angle(),
            hearing_cutoff: default_hearing_cutoff(),
            front_arc: default_front_arc(),
            rear_muffling: default_rear_muffling(),
            side_factor: default_side_factor(),
            hearing_threshold: default_hearing_threshold(),
            moderate_loudness: default_moderate_loudness(),
            distinct_loudness: default_distinct_loudness(),
        }
    }
}

/// Event log configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EventsConfig {
    /// Events older than this are pruned.
    #[serde(default = "default_retention_ms")]
    pub retention_ms: u64,

    /// Hard cap on retained events; the oldest are evicted first.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Prune the log every N frames.
    #[serde(default = "default_prune_interval_frames")]
    pub prune_interval_frames: u64,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            retention_ms: default_retention_ms(),
            max_entries: default_max_entries(),
            prune_interval_frames: default_prune_interval_frames(),
        }
    }
}

/// Frame clock configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FrameConfig {
    /// Longest elapsed time a single frame may simulate.
    #[serde(default = "default_max_delta_ms")]
    pub max_delta_ms: u64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_delta_ms: default_max_delta_ms(),
        }
    }
}

/// Prompt template configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PromptsConfig {
    /// Directory whose `.j2` files replace the built-in templates.
    #[serde(default)]
    pub template_dir: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Headless run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Number of frames to simulate.
    #[serde(default = "default_frames")]
    pub frames: u64,

    /// Simulated wall-clock time per frame.
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,

    /// Send an idle character somewhere new every N frames (0 disables).
    #[serde(default = "default_wander_every")]
    pub wander_every: u64,

    /// Stage a random office incident every N frames (0 disables).
    #[serde(default = "default_incident_every")]
    pub incident_every: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frames: default_frames(),
            frame_ms: default_frame_ms(),
            wander_every: default_wander_every(),
            incident_every: default_incident_every(),
        }
    }
}

/// One character of the initial roster.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RosterEntry {
    /// Display name; also matched against map spawn point names.
    pub name: String,

    /// Explicit start position. Falls back to the spawn point of the same
    /// name, then to the first unused spawn point.
    #[serde(default)]
    pub position: Option<Vec2>,

    /// Initial heading in degrees.
    #[serde(default = "default_facing_angle")]
    pub facing_angle: f32,

    /// How far the character can see.
    #[serde(default = "default_sight_range")]
    pub sight_range: f32,

    /// Initial activity.
    #[serde(default)]
    pub state: ActionState,

    /// Personality descriptors.
    #[serde(default)]
    pub personality: Vec<String>,

    /// Affinity towards other roster members, by name.
    #[serde(default)]
    pub relationships: BTreeMap<String, u8>,
}

impl RosterEntry {
    /// An entry with only a name; everything else takes its default.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: None,
            facing_angle: default_facing_angle(),
            sight_range: default_sight_range(),
            state: ActionState::default(),
            personality: Vec::new(),
            relationships: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_tile_size() -> u32 {
    48
}

const fn default_seed() -> u64 {
    7
}

const fn default_speed() -> f32 {
    100.0
}

const fn default_arrival_threshold() -> f32 {
    5.0
}

const fn default_fov_half_angle() -> f32 {
    60.0
}

const fn default_hearing_cutoff() -> f32 {
    500.0
}

const fn default_front_arc() -> f32 {
    90.0
}

const fn default_rear_muffling() -> f32 {
    0.3
}

const fn default_side_factor() -> f32 {
    0.85
}

const fn default_hearing_threshold() -> f32 {
    0.4
}

const fn default_moderate_loudness() -> f32 {
    20.0
}

const fn default_distinct_loudness() -> f32 {
    50.0
}

const fn default_retention_ms() -> u64 {
    300_000
}

const fn default_max_entries() -> usize {
    512
}

const fn default_prune_interval_frames() -> u64 {
    60
}

const fn default_max_delta_ms() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_frames() -> u64 {
    1_800
}

const fn default_frame_ms() -> u64 {
    33
}

const fn default_wander_every() -> u64 {
    90
}

const fn default_incident_every() -> u64 {
    240
}

const fn default_facing_angle() -> f32 {
    90.0
}

const fn default_sight_range() -> f32 {
    officelife_types::DEFAULT_SIGHT_RANGE
}
