//! Headless engine binary for the office simulation.
//!
//! Wires the map, the roster and the frame loop together and runs a fixed
//! number of frames with rule-based witness replies.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `officelife-config.yaml` (or the path given
//!    as the first argument)
//! 3. Load the map from `world.map_path`, or build the sample office
//! 4. Place the roster and build the navigation grid around it
//! 5. Spawn the characters; anyone starting in the `TALKING` state joins
//!    the opening conversation
//! 6. Run the frame loop with the director staging incidents
//! 7. Log the result and the conversation transcript

mod director;
mod error;
mod spawner;

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use officelife_core::{OfficeSim, RuleBasedDecisionSource, SimulationConfig, runner};
use officelife_types::{ActionState, Vec2};
use officelife_world::{NavGrid, TileMap, sample_office};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::director::Director;
use crate::error::EngineError;

/// Config file looked up in the working directory when no path is given.
const DEFAULT_CONFIG_PATH: &str = "officelife-config.yaml";

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = load_config(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        config = %config_path.display(),
        seed = config.world.seed,
        frames = config.run.frames,
        frame_ms = config.run.frame_ms,
        "officelife-engine starting"
    );
    if !config_path.exists() {
        info!("config file not found, using defaults");
    }

    let map = load_map(&config)?;
    let spawn_points = map.spawn_points();
    let roster = spawner::effective_roster(&config.roster, &spawn_points);
    let placements = spawner::place_roster(&roster, &spawn_points)?;
    let starts: Vec<Vec2> = placements.iter().map(|p| p.position).collect();
    let grid = NavGrid::build(&map, &starts);

    let mut sim = OfficeSim::from_config(&config, grid, Utc::now()).map_err(EngineError::from)?;
    let ids = spawner::spawn_roster(&mut sim, &placements);
    info!(characters = ids.len(), "roster spawned");

    let talkers: Vec<_> = ids
        .iter()
        .copied()
        .filter(|&id| sim.character(id).is_some_and(|c| c.action_state == ActionState::Talking))
        .collect();
    if talkers.len() >= 2 {
        sim.start_conversation(talkers).map_err(EngineError::from)?;
    }

    let mut director = Director::new(config.world.seed, config.run.wander_every, config.run.incident_every);
    let mut decisions = RuleBasedDecisionSource::new();
    let summary = runner::run_frames(
        &mut sim,
        config.run.frames,
        config.run.frame_ms,
        &mut decisions,
        &mut director,
    );
    runner::log_run_end(&summary);
    info!(
        incidents = director.incidents(),
        approaches = director.approaches(),
        "director totals"
    );

    if let Some(conversation) = sim.end_conversation() {
        for line in &conversation.lines {
            info!(conversation = %conversation.id, speaker = %line.speaker_name, text = %line.text, "transcript");
        }
    }

    info!("officelife-engine shutdown complete");
    Ok(())
}

/// Load the configuration, falling back to defaults when the file is
/// missing.
///
/// Runs before logging is initialized, so it reports nothing itself.
fn load_config(path: &Path) -> anyhow::Result<SimulationConfig> {
    if !path.exists() {
        return Ok(SimulationConfig::default());
    }
    SimulationConfig::from_file(path)
        .map_err(EngineError::from)
        .with_context(|| format!("loading {}", path.display()))
}

/// Load the configured map, or build the sample office.
fn load_map(config: &SimulationConfig) -> anyhow::Result<TileMap> {
    let Some(path) = &config.world.map_path else {
        info!("no map configured; using the sample office");
        return Ok(sample_office());
    };
    let map = TileMap::from_file(path)
        .map_err(EngineError::from)
        .with_context(|| format!("loading map {}", path.display()))?;
    if map.tile_width == 0 {
        info!(tile_size = config.world.tile_size, "map declares no tile size; using world.tile_size");
    } else if map.tile_width != config.world.tile_size {
        warn!(
            map_tile = map.tile_width,
            configured_tile = config.world.tile_size,
            "map tile size differs from world.tile_size; using the map's"
        );
    }
    let map = map.with_default_tile_size(config.world.tile_size);
    info!(
        map = %path.display(),
        width = map.width,
        height = map.height,
        spawn_points = map.spawn_points().len(),
        "map loaded"
    );
    Ok(map)
}
