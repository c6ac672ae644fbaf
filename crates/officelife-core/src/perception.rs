//! What a witness perceives of an event.
//!
//! Three primitives, each usable on its own:
//!
//! - [`PerceptionSystem::is_in_fov`]: inside sight range and within the
//!   view cone around the witness's facing.
//! - [`PerceptionSystem::has_line_of_sight`]: grid raycast between the
//!   witness's cell and the target's cell.
//! - [`PerceptionSystem::perceived_loudness`]: source loudness after
//!   directional muffling, linear distance falloff and the side modifier.
//!
//! [`PerceptionSystem::classify`] combines them into a level (clear sight
//! over partial sight over hearing) and only then applies the witness's
//! distraction penalty. The penalty is a cognitive filter and never feeds
//! back into the geometry or the acoustics.

use officelife_types::{
    Character, PerceptionLevel, Vec2, ViewFraming, WorldEvent, angular_difference,
    geometry::POSITION_EPSILON,
};
use officelife_world::NavGrid;

use crate::config::PerceptionConfig;

/// Everything [`PerceptionSystem::classify`] worked out for one witness and
/// one event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerceptionReport {
    /// Level from the senses alone.
    pub base_level: PerceptionLevel,
    /// Level after the witness's distraction penalty.
    pub level: PerceptionLevel,
    /// Whether the event lies in the witness's view cone and range.
    pub in_fov: bool,
    /// Whether the grid ray from witness to event is clear.
    pub line_of_sight: bool,
    /// Loudness as heard by the witness.
    pub loudness: f32,
    /// Bearing from witness to event in degrees.
    pub bearing: f32,
    /// Angle between the witness's facing and the bearing.
    pub offset: f32,
    /// Distance from witness to event.
    pub distance: f32,
    /// How a partial sighting is worded; set only for level 2. A clear ray
    /// dimmed by distraction is peripheral, a blocked one obstructed.
    pub framing: Option<ViewFraming>,
}

/// Sight and hearing checks against one navigation grid.
#[derive(Debug, Clone, Copy)]
pub struct PerceptionSystem<'g> {
    grid: &'g NavGrid,
    config: PerceptionConfig,
}

impl<'g> PerceptionSystem<'g> {
    /// Create a perception system over `grid`.
    pub const fn new(grid: &'g NavGrid, config: PerceptionConfig) -> Self {
        Self { grid, config }
    }

    /// The tuning in use.
    pub const fn config(&self) -> &PerceptionConfig {
        &self.config
    }

    /// Whether `target` lies within the witness's sight range and view cone.
    ///
    /// A target on top of the witness is always in view.
    pub fn is_in_fov(&self, witness: &Character, target: Vec2) -> bool {
        let distance = witness.position.distance(target);
        if distance > witness.max_sight_range {
            return false;
        }
        if distance < POSITION_EPSILON {
            return true;
        }
        facing_offset(witness, target) <= self.config.fov_half_angle
    }

    /// Whether nothing on the grid blocks the ray from `from` to `to`.
    ///
    /// The target's own cell may be blocked (a character behind a desk is
    /// still seen); every cell before it must be free.
    pub fn has_line_of_sight(&self, from: Vec2, to: Vec2) -> bool {
        officelife_world::has_line_of_sight(
            self.grid,
            self.grid.world_to_cell(from),
            self.grid.world_to_cell(to),
        )
    }

    /// Loudness of a `loudness` source at `source` as heard by the witness.
    ///
    /// The product of four factors: the source loudness; 1.0 inside the
    /// front arc and `rear_muffling` behind it; `1 - d / hearing_cutoff`
    /// floored at zero; and a side modifier that eases from 1.0 straight
    /// ahead or behind down to `side_factor` at right angles.
    pub fn perceived_loudness(&self, witness: &Character, source: Vec2, loudness: f32) -> f32 {
        let loudness = loudness.max(0.0);
        let distance = witness.position.distance(source);
        let cutoff = self.config.hearing_cutoff;
        if cutoff <= 0.0 || distance >= cutoff {
            return 0.0;
        }
        let falloff = (1.0 - distance / cutoff).max(0.0);
        if distance < POSITION_EPSILON {
            return loudness * falloff;
        }

        let offset = facing_offset(witness, source);
        let muffling = if offset <= self.config.front_arc {
            1.0
        } else {
            self.config.rear_muffling
        };
        let side = 1.0 - (1.0 - self.config.side_factor) * offset.to_radians().sin().abs();
        loudness * muffling * falloff * side
    }

    /// Classify how much of `event` the witness perceived.
    pub fn classify(&self, witness: &Character, event: &WorldEvent) -> PerceptionReport {
        let distance = witness.position.distance(event.position);
        let bearing = witness.position.bearing_to(event.position);
        let offset = if distance < POSITION_EPSILON {
            0.0
        } else {
            facing_offset(witness, event.position)
        };
        let in_fov = self.is_in_fov(witness, event.position);
        let line_of_sight = self.has_line_of_sight(witness.position, event.position);
        let loudness = self.perceived_loudness(witness, event.position, event.loudness);

        let base_level = if in_fov && line_of_sight {
            PerceptionLevel::Witnessed
        } else if in_fov {
            PerceptionLevel::Glimpsed
        } else if loudness > self.config.hearing_threshold {
            PerceptionLevel::Heard
        } else {
            PerceptionLevel::Unaware
        };
        let level = base_level.reduced_by(witness.action_state.distraction_penalty());
        let framing = (level == PerceptionLevel::Glimpsed).then_some(if line_of_sight {
            ViewFraming::Peripheral
        } else {
            ViewFraming::Obstructed
        });

        PerceptionReport {
            base_level,
            level,
            in_fov,
            line_of_sight,
            loudness,
            bearing,
            offset,
            distance,
            framing,
        }
    }
}

/// Angle between the witness's facing and the bearing to `target`.
fn facing_offset(witness: &Character, target: Vec2) -> f32 {
    angular_difference(witness.facing_angle, witness.position.bearing_to(target))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use officelife_types::{ActionState, Cell, CharacterId, EventId, EventKind};

    use super::*;

    fn grid() -> NavGrid {
        NavGrid::new(30, 30, 48)
    }

    fn event_at(position: Vec2, loudness: f32) -> WorldEvent {
        WorldEvent {
            id: EventId::new(),
            timestamp: Utc::now(),
            position,
            actor_id: CharacterId::new(),
            actor_name: "Bob".to_owned(),
            description: "knocked over a mug".to_owned(),
            loudness,
            location: "open plan".to_owned(),
            kind: EventKind::Drop,
        }
    }

    fn polar(origin: Vec2, degrees: f32, distance: f32) -> Vec2 {
        let radians = degrees.to_radians();
        Vec2::new(origin.x + distance * radians.cos(), origin.y + distance * radians.sin())
    }

    #[test]
    fn fov_is_a_120_degree_cone() {
        let grid = grid();
        let perception = PerceptionSystem::new(&grid, PerceptionConfig::default());
        let alice = Character::new("Alice", Vec2::new(500.0, 500.0)).with_facing_angle(0.0);
        assert!(perception.is_in_fov(&alice, Vec2::new(600.0, 500.0)));
        // 59 degrees off the facing.
        let edge = polar(Vec2::new(500.0, 500.0), 59.0, 100.0);
        assert!(perception.is_in_fov(&alice, edge));
        let outside = polar(Vec2::new(500.0, 500.0), -61.0, 100.0);
        assert!(!perception.is_in_fov(&alice, outside));
        assert!(!perception.is_in_fov(&alice, Vec2::new(400.0, 500.0)));
    }

    #[test]
    fn fov_respects_sight_range() {
        let grid = grid();
        let perception = PerceptionSystem::new(&grid, PerceptionConfig::default());
        let alice = Character::new("Alice", Vec2::new(100.0, 100.0))
            .with_facing_angle(0.0)
            .with_sight_range(150.0);
        assert!(perception.is_in_fov(&alice, Vec2::new(240.0, 100.0)));
        assert!(!perception.is_in_fov(&alice, Vec2::new(260.0, 100.0)));
    }

    #[test]
    fn fov_wraps_around_north() {
        let grid = grid();
        let perception = PerceptionSystem::new(&grid, PerceptionConfig::default());
        let alice = Character::new("Alice", Vec2::new(500.0, 500.0)).with_facing_angle(350.0);
        // Bearing about 20 degrees: 30 degrees from the facing across 0.
        let target = polar(Vec2::new(500.0, 500.0), 20.0, 100.0);
        assert!(perception.is_in_fov(&alice, target));
    }

    #[test]
    fn walls_block_sight() {
        let mut grid = grid();
        grid.set_blocked(Cell::new(3, 1), true);
        let perception = PerceptionSystem::new(&grid, PerceptionConfig::default());
        let from = grid.cell_center(Cell::new(1, 1));
        assert!(!perception.has_line_of_sight(from, grid.cell_center(Cell::new(5, 1))));
        assert!(perception.has_line_of_sight(from, grid.cell_center(Cell::new(1, 5))));
    }

    #[test]
    fn loudness_falls_off_with_distance() {
        let grid = grid();
        let perception = PerceptionSystem::new(&grid, PerceptionConfig::default());
        let alice = Character::new("Alice", Vec2::new(100.0, 700.0)).with_facing_angle(0.0);
        let mut previous = f32::INFINITY;
        for step in 1..=10_u8 {
            let source = Vec2::new(100.0 + f32::from(step) * 45.0, 700.0);
            let heard = perception.perceived_loudness(&alice, source, 80.0);
            assert!(heard < previous, "loudness did not drop at step {step}");
            previous = heard;
        }
        assert!(perception.perceived_loudness(&alice, Vec2::new(600.0, 700.0), 80.0) <= 0.0);
        assert!(perception.perceived_loudness(&alice, Vec2::new(900.0, 700.0), 80.0) <= 0.0);
    }

    #[test]
    fn sounds_from_behind_are_muffled() {
        let grid = grid();
        // A front arc a little wider than 90 keeps the exact side sample unmuffled.
        let config = PerceptionConfig {
            front_arc: 100.0,
            ..PerceptionConfig::default()
        };
        let perception = PerceptionSystem::new(&grid, config);
        let alice = Character::new("Alice", Vec2::new(500.0, 500.0)).with_facing_angle(0.0);
        let ahead = perception.perceived_loudness(&alice, Vec2::new(600.0, 500.0), 50.0);
        let behind = perception.perceived_loudness(&alice, Vec2::new(400.0, 500.0), 50.0);
        let side = perception.perceived_loudness(&alice, Vec2::new(500.0, 600.0), 50.0);
        assert!((ahead - 40.0).abs() < 1e-3);
        assert!((behind - 12.0).abs() < 1e-3);
        assert!((side - 34.0).abs() < 1e-3);
    }

    #[test]
    fn clear_view_is_level_three() {
        let grid = grid();
        let perception = PerceptionSystem::new(&grid, PerceptionConfig::default());
        let alice = Character::new("Alice", Vec2::new(300.0, 300.0)).with_facing_angle(0.0);
        let report = perception.classify(&alice, &event_at(Vec2::new(350.0, 300.0), 10.0));
        assert_eq!(report.level, PerceptionLevel::Witnessed);
        assert!(report.framing.is_none());
    }

    #[test]
    fn obstructed_view_is_level_two_with_framing() {
        let mut grid = grid();
        let perception_config = PerceptionConfig::default();
        // Wall between (5,5) and (8,5).
        grid.set_blocked(Cell::new(6, 5), true);
        let perception = PerceptionSystem::new(&grid, perception_config);
        let alice = Character::new("Alice", grid.cell_center(Cell::new(5, 5))).with_facing_angle(0.0);
        let report = perception.classify(&alice, &event_at(grid.cell_center(Cell::new(8, 5)), 0.0));
        assert_eq!(report.level, PerceptionLevel::Glimpsed);
        assert_eq!(report.framing, Some(ViewFraming::Obstructed));

        // Turning within the cone does not change what the wall hides.
        let turned = alice.with_facing_angle(45.0);
        let report = perception.classify(&turned, &event_at(grid.cell_center(Cell::new(8, 5)), 0.0));
        assert_eq!(report.level, PerceptionLevel::Glimpsed);
        assert_eq!(report.framing, Some(ViewFraming::Obstructed));
    }

    #[test]
    fn distracted_clear_view_is_peripheral() {
        let grid = grid();
        let perception = PerceptionSystem::new(&grid, PerceptionConfig::default());
        let alice = Character::new("Alice", Vec2::new(300.0, 300.0))
            .with_facing_angle(0.0)
            .with_state(ActionState::Talking);
        let report = perception.classify(&alice, &event_at(Vec2::new(350.0, 300.0), 10.0));
        assert!(report.line_of_sight);
        assert_eq!(report.level, PerceptionLevel::Glimpsed);
        assert_eq!(report.framing, Some(ViewFraming::Peripheral));
    }

    #[test]
    fn out_of_view_but_loud_is_level_one() {
        let grid = grid();
        let perception = PerceptionSystem::new(&grid, PerceptionConfig::default());
        let alice = Character::new("Alice", Vec2::new(500.0, 500.0)).with_facing_angle(180.0);
        let report = perception.classify(&alice, &event_at(Vec2::new(700.0, 500.0), 60.0));
        assert!(!report.in_fov);
        assert_eq!(report.level, PerceptionLevel::Heard);
    }

    #[test]
    fn quiet_out_of_view_is_level_zero() {
        let grid = grid();
        let perception = PerceptionSystem::new(&grid, PerceptionConfig::default());
        let alice = Character::new("Alice", Vec2::new(500.0, 500.0)).with_facing_angle(180.0);
        let report = perception.classify(&alice, &event_at(Vec2::new(700.0, 500.0), 0.5));
        assert_eq!(report.level, PerceptionLevel::Unaware);
    }

    #[test]
    fn distraction_applies_after_the_senses() {
        let grid = grid();
        let perception = PerceptionSystem::new(&grid, PerceptionConfig::default());
        let event = event_at(Vec2::new(350.0, 300.0), 10.0);
        let base = Character::new("Alice", Vec2::new(300.0, 300.0)).with_facing_angle(0.0);

        let talking = base.clone().with_state(ActionState::Talking);
        let report = perception.classify(&talking, &event);
        assert_eq!(report.base_level, PerceptionLevel::Witnessed);
        assert_eq!(report.level, PerceptionLevel::Glimpsed);

        let focused = base.with_state(ActionState::FocusedOnTask);
        let report = perception.classify(&focused, &event);
        assert_eq!(report.level, PerceptionLevel::Heard);
    }

    #[test]
    fn facing_the_event_never_lowers_the_level() {
        let grid = grid();
        let perception = PerceptionSystem::new(&grid, PerceptionConfig::default());
        let event = event_at(Vec2::new(400.0, 420.0), 30.0);
        for angle in (0..360).step_by(15) {
            #[allow(clippy::cast_precision_loss)]
            let away = Character::new("Alice", Vec2::new(300.0, 300.0)).with_facing_angle(angle as f32);
            let toward = away
                .clone()
                .with_facing_angle(away.position.bearing_to(event.position));
            let away_level = perception.classify(&away, &event).level;
            let toward_level = perception.classify(&toward, &event).level;
            assert!(toward_level.as_u8() >= away_level.as_u8());
        }
    }
}
