//! Path following.
//!
//! Movement owns exactly two action states, [`ActionState::Idle`] and
//! [`ActionState::Walking`]. A character in any other state (working,
//! talking, ...) still follows a path it was given, but its state is left
//! alone.
//!
//! A frame of movement does one of: settle an idle character, snap onto a
//! nearby waypoint, take one step towards the next waypoint, or, when that
//! step would enter a blocked cell, re-plan once towards the remembered
//! destination. A failed re-plan strands the character: path cleared,
//! state idle, nothing propagated.

use officelife_types::{ActionState, Character, Facing, Vec2};
use officelife_world::{NavGrid, plan_route};
use tracing::{debug, warn};

use crate::config::MovementConfig;
use crate::notify::{CharacterChange, ChangeSink};

/// What one frame of movement did to a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// No path (or the character is disabled); nothing moved.
    Idle,
    /// Took a step towards the current waypoint.
    Stepped,
    /// Snapped onto an intermediate waypoint.
    Arrived,
    /// Snapped onto the last waypoint; the path is done.
    ReachedDestination,
    /// The next step was blocked and a new path was installed.
    Rerouted,
    /// The next step was blocked and no new path exists.
    Stranded,
}

/// Advances characters along their paths.
#[derive(Debug, Clone, Copy)]
pub struct MovementSystem {
    speed: f32,
    arrival_threshold: f32,
}

impl MovementSystem {
    /// Create a movement system. Non-positive or non-finite settings fall
    /// back to the stock values.
    pub fn new(config: MovementConfig) -> Self {
        let stock = MovementConfig::default();
        let speed = if config.speed.is_finite() && config.speed > 0.0 {
            config.speed
        } else {
            warn!(speed = config.speed, "invalid movement speed; using stock value");
            stock.speed
        };
        let arrival_threshold = if config.arrival_threshold.is_finite() && config.arrival_threshold > 0.0
        {
            config.arrival_threshold
        } else {
            warn!(
                arrival_threshold = config.arrival_threshold,
                "invalid arrival threshold; using stock value"
            );
            stock.arrival_threshold
        };
        Self {
            speed,
            arrival_threshold,
        }
    }

    /// Walking speed in world units per second.
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Distance below which a waypoint counts as reached.
    pub const fn arrival_threshold(&self) -> f32 {
        self.arrival_threshold
    }

    /// Plan a path from the character's position to `destination` and
    /// install it, replacing any current path.
    ///
    /// On failure the old path is cleared as well, so the character stops
    /// at the next frame. Returns whether a path was installed.
    pub fn request_path(&self, character: &mut Character, grid: &NavGrid, destination: Vec2) -> bool {
        if let Some(route) = plan_route(grid, character.position, destination) {
            debug!(
                character = %character.name,
                waypoints = route.len(),
                x = destination.x,
                y = destination.y,
                "path installed"
            );
            character.destination = route.last().copied();
            character.path = route.into();
            true
        } else {
            debug!(
                character = %character.name,
                x = destination.x,
                y = destination.y,
                "no path; staying put"
            );
            character.clear_path();
            false
        }
    }

    /// Advance one character by `delta_seconds`.
    pub fn advance(
        &self,
        character: &mut Character,
        grid: &NavGrid,
        delta_seconds: f32,
        sink: &mut impl ChangeSink,
    ) -> MoveOutcome {
        if !character.is_enabled {
            return MoveOutcome::Idle;
        }
        let Some(&waypoint) = character.path.front() else {
            set_state(character, ActionState::Idle, sink);
            return MoveOutcome::Idle;
        };

        let offset = waypoint - character.position;
        // Facing first, so whatever reacts to the state change sees it.
        if let Some(facing) = Facing::from_delta(offset.x, offset.y) {
            turn(character, facing, sink);
        }
        set_state(character, ActionState::Walking, sink);

        let distance = offset.length();
        if distance < self.arrival_threshold {
            relocate(character, waypoint, sink);
            character.path.pop_front();
            if character.path.is_empty() {
                character.destination = None;
                set_state(character, ActionState::Idle, sink);
                return MoveOutcome::ReachedDestination;
            }
            return MoveOutcome::Arrived;
        }

        let Some(direction) = offset.normalized() else {
            return MoveOutcome::Idle;
        };
        let step = (self.speed * delta_seconds.max(0.0)).min(distance);
        let next = character.position + direction * step;

        if !grid.is_walkable_at(next) {
            return self.reroute(character, grid, sink);
        }
        relocate(character, next, sink);
        MoveOutcome::Stepped
    }

    /// One re-plan attempt from the current position to the remembered
    /// destination.
    fn reroute(&self, character: &mut Character, grid: &NavGrid, sink: &mut impl ChangeSink) -> MoveOutcome {
        let target = character.destination.or_else(|| character.path.back().copied());
        character.path.clear();

        let route = target.and_then(|target| plan_route(grid, character.position, target));
        match route {
            Some(route) => {
                debug!(character = %character.name, waypoints = route.len(), "path blocked; rerouted");
                character.path = route.into();
                character.destination = target;
                MoveOutcome::Rerouted
            }
            None => {
                warn!(
                    character = %character.name,
                    x = character.position.x,
                    y = character.position.y,
                    "path blocked and no alternative; stopping"
                );
                character.clear_path();
                set_state(character, ActionState::Idle, sink);
                MoveOutcome::Stranded
            }
        }
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new(MovementConfig::default())
    }
}

fn turn(character: &mut Character, facing: Facing, sink: &mut impl ChangeSink) {
    if character.facing() == facing {
        return;
    }
    character.set_facing(facing);
    sink.publish(CharacterChange::FacingChanged {
        id: character.id,
        facing,
    });
}

/// Switch between idle and walking; other states belong to the decision layer.
fn set_state(character: &mut Character, state: ActionState, sink: &mut impl ChangeSink) {
    let current = character.action_state;
    if current == state || !current.is_movement_state() {
        return;
    }
    character.action_state = state;
    sink.publish(CharacterChange::StateChanged {
        id: character.id,
        from: current,
        to: state,
    });
}

fn relocate(character: &mut Character, to: Vec2, sink: &mut impl ChangeSink) {
    let from = character.position;
    if from == to {
        return;
    }
    character.position = to;
    sink.publish(CharacterChange::Moved {
        id: character.id,
        from,
        to,
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::notify::ChangeFeed;
    use officelife_types::Cell;

    fn open_grid(width: u32, height: u32) -> NavGrid {
        NavGrid::new(width, height, 48)
    }

    fn at(grid: &NavGrid, col: i32, row: i32) -> Vec2 {
        grid.cell_center(Cell::new(col, row))
    }

    fn run_until_still(
        system: &MovementSystem,
        character: &mut Character,
        grid: &NavGrid,
        feed: &mut ChangeFeed,
    ) -> Vec<MoveOutcome> {
        let mut outcomes = Vec::new();
        for _ in 0..1_000 {
            let outcome = system.advance(character, grid, 0.05, feed);
            outcomes.push(outcome);
            if matches!(outcome, MoveOutcome::ReachedDestination | MoveOutcome::Stranded) {
                break;
            }
        }
        outcomes
    }

    #[test]
    fn idle_without_path_keeps_facing() {
        let grid = open_grid(3, 3);
        let system = MovementSystem::default();
        let mut alice = Character::new("Alice", at(&grid, 1, 1)).with_facing_angle(180.0);
        let mut feed = ChangeFeed::new();
        assert_eq!(system.advance(&mut alice, &grid, 0.1, &mut feed), MoveOutcome::Idle);
        assert_eq!(alice.facing(), Facing::Left);
        assert_eq!(alice.action_state, ActionState::Idle);
        assert!(feed.is_empty());
    }

    #[test]
    fn walks_a_straight_path_to_the_end() {
        let grid = open_grid(6, 3);
        let system = MovementSystem::default();
        let mut alice = Character::new("Alice", at(&grid, 0, 1));
        let mut feed = ChangeFeed::new();
        assert!(system.request_path(&mut alice, &grid, at(&grid, 4, 1)));
        assert_eq!(alice.path.len(), 4);

        let outcomes = run_until_still(&system, &mut alice, &grid, &mut feed);
        assert_eq!(outcomes.last(), Some(&MoveOutcome::ReachedDestination));
        assert_eq!(alice.position, at(&grid, 4, 1));
        assert_eq!(alice.action_state, ActionState::Idle);
        assert_eq!(alice.facing(), Facing::Right);
        assert!(alice.destination.is_none());
    }

    #[test]
    fn facing_is_published_before_walking() {
        let grid = open_grid(3, 3);
        let system = MovementSystem::default();
        let mut alice = Character::new("Alice", at(&grid, 1, 2));
        let mut feed = ChangeFeed::new();
        system.request_path(&mut alice, &grid, at(&grid, 1, 0));
        system.advance(&mut alice, &grid, 0.05, &mut feed);

        let changes = feed.drain();
        let turned = changes
            .iter()
            .position(|c| matches!(c, CharacterChange::FacingChanged { facing: Facing::Up, .. }))
            .unwrap();
        let walking = changes
            .iter()
            .position(|c| matches!(c, CharacterChange::StateChanged { to: ActionState::Walking, .. }))
            .unwrap();
        assert!(turned < walking);
    }

    #[test]
    fn horizontal_wins_facing_ties() {
        let grid = open_grid(4, 4);
        let system = MovementSystem::default();
        let mut alice = Character::new("Alice", Vec2::new(24.0, 24.0));
        alice.path.push_back(Vec2::new(124.0, 124.0));
        let mut feed = ChangeFeed::new();
        system.advance(&mut alice, &grid, 0.01, &mut feed);
        assert_eq!(alice.facing(), Facing::Right);
    }

    #[test]
    fn a_large_step_never_overshoots_the_waypoint() {
        let grid = open_grid(4, 1);
        let system = MovementSystem::default();
        let mut alice = Character::new("Alice", at(&grid, 0, 0));
        system.request_path(&mut alice, &grid, at(&grid, 1, 0));
        let mut feed = ChangeFeed::new();
        assert_eq!(system.advance(&mut alice, &grid, 10.0, &mut feed), MoveOutcome::Stepped);
        assert_eq!(alice.position, at(&grid, 1, 0));
        assert_eq!(
            system.advance(&mut alice, &grid, 10.0, &mut feed),
            MoveOutcome::ReachedDestination
        );
    }

    #[test]
    fn non_movement_states_are_left_alone() {
        let grid = open_grid(4, 1);
        let system = MovementSystem::default();
        let mut alice = Character::new("Alice", at(&grid, 0, 0)).with_state(ActionState::Talking);
        system.request_path(&mut alice, &grid, at(&grid, 2, 0));
        let mut feed = ChangeFeed::new();
        let outcomes = run_until_still(&system, &mut alice, &grid, &mut feed);
        assert_eq!(outcomes.last(), Some(&MoveOutcome::ReachedDestination));
        assert_eq!(alice.action_state, ActionState::Talking);
        assert!(
            feed.pending()
                .iter()
                .all(|c| !matches!(c, CharacterChange::StateChanged { .. }))
        );
    }

    #[test]
    fn unreachable_request_clears_the_old_path() {
        let mut grid = open_grid(5, 1);
        grid.set_blocked(Cell::new(4, 0), true);
        let system = MovementSystem::default();
        let mut alice = Character::new("Alice", at(&grid, 0, 0));
        assert!(system.request_path(&mut alice, &grid, at(&grid, 3, 0)));
        assert!(!system.request_path(&mut alice, &grid, at(&grid, 4, 0)));
        assert!(!alice.has_path());
        assert!(alice.destination.is_none());
    }

    #[test]
    fn blocked_step_reroutes_around_the_obstacle() {
        let mut grid = open_grid(5, 3);
        let system = MovementSystem::default();
        let mut alice = Character::new("Alice", at(&grid, 0, 1));
        system.request_path(&mut alice, &grid, at(&grid, 3, 1));
        grid.set_blocked(Cell::new(2, 1), true);

        let mut feed = ChangeFeed::new();
        let outcomes = run_until_still(&system, &mut alice, &grid, &mut feed);
        assert_eq!(outcomes.iter().filter(|o| **o == MoveOutcome::Rerouted).count(), 1);
        assert_eq!(outcomes.last(), Some(&MoveOutcome::ReachedDestination));
        assert_eq!(alice.position, at(&grid, 3, 1));
    }

    #[test]
    fn blocked_destination_strands_after_one_attempt() {
        let mut grid = open_grid(4, 1);
        let system = MovementSystem::default();
        let mut alice = Character::new("Alice", at(&grid, 0, 0));
        system.request_path(&mut alice, &grid, at(&grid, 3, 0));
        grid.set_blocked(Cell::new(1, 0), true);

        let mut feed = ChangeFeed::new();
        // Half a second covers the whole first hop, straight into the blocked cell.
        assert_eq!(system.advance(&mut alice, &grid, 0.5, &mut feed), MoveOutcome::Stranded);
        assert!(!alice.has_path());
        assert_eq!(alice.action_state, ActionState::Idle);
        assert_eq!(alice.position, at(&grid, 0, 0));
        assert_eq!(system.advance(&mut alice, &grid, 0.2, &mut feed), MoveOutcome::Idle);
    }

    #[test]
    fn invalid_config_falls_back() {
        let system = MovementSystem::new(MovementConfig {
            speed: -3.0,
            arrival_threshold: f32::NAN,
        });
        assert!((system.speed() - 100.0).abs() < f32::EPSILON);
        assert!((system.arrival_threshold() - 5.0).abs() < f32::EPSILON);
    }
}
