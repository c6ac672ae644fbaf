//! Roster placement and spawning.
//!
//! Placement runs before the navigation grid is built so that every start
//! position can be forced walkable. Each roster entry gets, in order of
//! preference: its explicit position, the map spawn point carrying its
//! name, or the first spawn point nobody else claimed. Relationships in the
//! config are keyed by name and resolved to ids once every character
//! exists.

use std::collections::BTreeMap;

use officelife_core::{OfficeSim, RosterEntry};
use officelife_types::{Character, CharacterId, Vec2};
use officelife_world::SpawnPoint;
use tracing::{info, warn};

use crate::error::EngineError;

/// A roster entry with its resolved start position.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// The roster entry.
    pub entry: RosterEntry,
    /// Where the character starts.
    pub position: Vec2,
}

/// The roster to use: the configured one, or one character per spawn point
/// when none is configured.
pub fn effective_roster(configured: &[RosterEntry], spawns: &[SpawnPoint]) -> Vec<RosterEntry> {
    if !configured.is_empty() {
        return configured.to_vec();
    }
    info!(spawn_points = spawns.len(), "no roster configured; one character per spawn point");
    spawns
        .iter()
        .filter(|s| !s.name.is_empty())
        .map(|s| RosterEntry::named(s.name.clone()))
        .collect()
}

/// Resolve a start position for every roster entry.
///
/// # Errors
///
/// Returns [`EngineError::Spawner`] when an entry has no explicit position
/// and every spawn point is already taken.
pub fn place_roster(roster: &[RosterEntry], spawns: &[SpawnPoint]) -> Result<Vec<Placement>, EngineError> {
    let mut claimed = vec![false; spawns.len()];
    let mut positions: Vec<Option<Vec2>> = roster.iter().map(|e| e.position).collect();

    // Named spawn points first, so a later entry's name is not stolen by an
    // earlier entry falling back to "first free".
    for (entry, slot) in roster.iter().zip(positions.iter_mut()) {
        if slot.is_some() {
            continue;
        }
        if let Some(index) = free_spawn(spawns, &claimed, |s| s.name.eq_ignore_ascii_case(&entry.name)) {
            *slot = claim(spawns, &mut claimed, index);
        }
    }

    for (entry, slot) in roster.iter().zip(positions.iter_mut()) {
        if slot.is_some() {
            continue;
        }
        let index = free_spawn(spawns, &claimed, |_| true).ok_or_else(|| EngineError::Spawner {
            message: format!("no free spawn point left for {}", entry.name),
        })?;
        warn!(character = %entry.name, "no spawn point of that name; using the next free one");
        *slot = claim(spawns, &mut claimed, index);
    }

    roster
        .iter()
        .zip(positions)
        .map(|(entry, position)| {
            position
                .map(|position| Placement {
                    entry: entry.clone(),
                    position,
                })
                .ok_or_else(|| EngineError::Spawner {
                    message: format!("could not place {}", entry.name),
                })
        })
        .collect()
}

fn free_spawn(spawns: &[SpawnPoint], claimed: &[bool], accept: impl Fn(&SpawnPoint) -> bool) -> Option<usize> {
    spawns
        .iter()
        .zip(claimed)
        .position(|(spawn, &taken)| !taken && accept(spawn))
}

fn claim(spawns: &[SpawnPoint], claimed: &mut [bool], index: usize) -> Option<Vec2> {
    if let Some(taken) = claimed.get_mut(index) {
        *taken = true;
    }
    spawns.get(index).map(|s| s.position)
}

/// Create the characters and add them to `sim`. Returns their ids in
/// roster order.
pub fn spawn_roster(sim: &mut OfficeSim, placements: &[Placement]) -> Vec<CharacterId> {
    let mut characters: Vec<Character> = placements
        .iter()
        .map(|p| {
            let entry = &p.entry;
            let mut character = Character::new(entry.name.clone(), p.position)
                .with_facing_angle(entry.facing_angle)
                .with_sight_range(entry.sight_range)
                .with_state(entry.state);
            character.personality_tags.extend(entry.personality.iter().cloned());
            character
        })
        .collect();

    let ids_by_name: BTreeMap<String, CharacterId> =
        characters.iter().map(|c| (c.name.clone(), c.id)).collect();
    for (character, placement) in characters.iter_mut().zip(placements) {
        for (other, &score) in &placement.entry.relationships {
            match ids_by_name.get(other) {
                Some(&id) if id != character.id => {
                    character.relationships.insert(id, score.min(100));
                }
                Some(_) => warn!(character = %character.name, "ignoring relationship with self"),
                None => warn!(character = %character.name, other = %other, "relationship with unknown character"),
            }
        }
    }

    characters.into_iter().map(|c| sim.add_character(c)).collect()
}
