//! Frame callback that keeps the headless office busy.
//!
//! Without a renderer or players nothing would ever happen, so the
//! director does three things after each frame:
//!
//! - acts on witness reactions: characters who decided to go and look walk
//!   over to where the event happened
//! - every `wander_every` frames, sends one idle character to a random
//!   free spot
//! - every `incident_every` frames, has a random character cause a small
//!   office incident
//!
//! All randomness comes from one seeded [`StdRng`], so a run is
//! reproducible from `world.seed`.

use officelife_core::{FrameCallback, FrameSummary, OfficeSim};
use officelife_types::{ActionState, Cell, CharacterId, EventDraft, EventKind, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// Log target for actions characters carry out.
pub const ACTIONS_TARGET: &str = "officelife::actions";

/// Actions that send the character towards the event they reacted to.
const APPROACH_PREFIXES: [&str; 3] = ["heads towards", "walks over", "turns to get a better look"];

/// Attempts at finding a free cell before a wander is skipped.
const WANDER_ATTEMPTS: u32 = 32;

struct Incident {
    description: &'static str,
    loudness: f32,
    location: &'static str,
    kind: EventKind,
}

const INCIDENTS: [Incident; 7] = [
    Incident {
        description: "slammed a desk drawer",
        loudness: 45.0,
        location: "open plan",
        kind: EventKind::Slam,
    },
    Incident {
        description: "dropped a stack of folders",
        loudness: 25.0,
        location: "open plan",
        kind: EventKind::Drop,
    },
    Incident {
        description: "laughed at something on their screen",
        loudness: 35.0,
        location: "open plan",
        kind: EventKind::Laugh,
    },
    Incident {
        description: "knocked a mug off the desk",
        loudness: 40.0,
        location: "kitchenette",
        kind: EventKind::Break,
    },
    Incident {
        description: "shouted at the printer",
        loudness: 70.0,
        location: "copy corner",
        kind: EventKind::Shout,
    },
    Incident {
        description: "threw a stress ball across the room",
        loudness: 20.0,
        location: "open plan",
        kind: EventKind::Throw,
    },
    Incident {
        description: "muttered about the deadline",
        loudness: 8.0,
        location: "open plan",
        kind: EventKind::Speech,
    },
];

/// Drives wandering, incidents and reactions for a headless run.
#[derive(Debug)]
pub struct Director {
    rng: StdRng,
    wander_every: u64,
    incident_every: u64,
    incidents: u64,
    approaches: u64,
}

impl Director {
    /// Create a director seeded with `seed`. A zero interval disables that
    /// activity.
    pub fn new(seed: u64, wander_every: u64, incident_every: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            wander_every,
            incident_every,
            incidents: 0,
            approaches: 0,
        }
    }

    /// Incidents staged so far.
    pub const fn incidents(&self) -> u64 {
        self.incidents
    }

    /// Characters sent to look at an event so far.
    pub const fn approaches(&self) -> u64 {
        self.approaches
    }

    fn act_on_reactions(&mut self, sim: &mut OfficeSim) {
        let ids: Vec<CharacterId> = sim.characters().iter().map(|c| c.id).collect();
        for id in ids {
            let Ok(actions) = sim.take_actions(id) else {
                continue;
            };
            for queued in actions {
                let name = sim.character(id).map(|c| c.name.clone()).unwrap_or_default();
                info!(target: ACTIONS_TARGET, character = %name, action = %queued.action, "acts");

                if !APPROACH_PREFIXES.iter().any(|p| queued.action.starts_with(p)) {
                    continue;
                }
                let target = queued
                    .event_id
                    .and_then(|event_id| sim.events().log().get(event_id))
                    .map(|event| event.position);
                let Some(target) = target else {
                    continue;
                };
                if sim.request_move(id, target).unwrap_or(false) {
                    self.approaches = self.approaches.saturating_add(1);
                }
            }
        }
    }

    fn wander(&mut self, sim: &mut OfficeSim) {
        let idle: Vec<CharacterId> = sim
            .characters()
            .iter()
            .filter(|c| c.is_enabled && c.action_state == ActionState::Idle && !c.has_path())
            .map(|c| c.id)
            .collect();
        if idle.is_empty() {
            return;
        }
        let Some(&id) = idle.get(self.rng.random_range(0..idle.len())) else {
            return;
        };
        let Some(spot) = self.free_spot(sim) else {
            debug!("no free spot found for wandering");
            return;
        };
        if sim.request_move(id, spot).unwrap_or(false) {
            debug!(%id, x = spot.x, y = spot.y, "wandering");
        }
    }

    fn free_spot(&mut self, sim: &OfficeSim) -> Option<Vec2> {
        let grid = sim.grid();
        if grid.width() == 0 || grid.height() == 0 {
            return None;
        }
        for _ in 0..WANDER_ATTEMPTS {
            let col = i32::try_from(self.rng.random_range(0..grid.width())).ok()?;
            let row = i32::try_from(self.rng.random_range(0..grid.height())).ok()?;
            let cell = Cell::new(col, row);
            if grid.is_walkable(cell) {
                return Some(grid.cell_center(cell));
            }
        }
        None
    }

    fn stage_incident(&mut self, sim: &mut OfficeSim) {
        let actors: Vec<CharacterId> = sim
            .characters()
            .iter()
            .filter(|c| c.is_enabled)
            .map(|c| c.id)
            .collect();
        let Some(&actor) = actors.get(self.rng.random_range(0..actors.len().max(1))) else {
            return;
        };
        let Some(incident) = INCIDENTS.get(self.rng.random_range(0..INCIDENTS.len())) else {
            return;
        };
        let draft = EventDraft::new(
            incident.description,
            incident.loudness,
            incident.location,
            incident.kind,
        );
        if let Ok(registration) = sim.perform(actor, draft) {
            self.incidents = self.incidents.saturating_add(1);
            debug!(
                event_id = %registration.event.id,
                prompted = registration.prompted.len(),
                "incident staged"
            );
        }
    }
}

impl FrameCallback for Director {
    fn on_frame(&mut self, sim: &mut OfficeSim, summary: &FrameSummary) {
        let frame = summary.step.tick.frame;
        self.act_on_reactions(sim);
        if self.wander_every > 0 && frame.checked_rem(self.wander_every) == Some(0) {
            self.wander(sim);
        }
        if self.incident_every > 0 && frame.checked_rem(self.incident_every) == Some(0) {
            self.stage_incident(sim);
        }
    }
}
