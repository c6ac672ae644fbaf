//! Event registration and witness fan-out.
//!
//! Registering an event stamps it, logs it, and then asks every other
//! enabled character what they perceived. Witnesses who noticed anything
//! get a prompt on their pending queue; the rest are left untouched.

use chrono::{DateTime, Utc};
use officelife_types::{
    Character, CharacterId, Conversation, EventDraft, EventId, PerceptionLevel, Vec2, WorldEvent,
};
use officelife_world::NavGrid;
use tracing::{debug, info};

use crate::config::EventsConfig;
use crate::error::SimError;
use crate::events::EventLog;
use crate::witness::{ResponseOutcome, WitnessProcessor, apply_response};

/// Result of registering one event.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    /// The stamped event as logged.
    pub event: WorldEvent,
    /// Level reached by every enabled witness considered, in roster order.
    pub levels: Vec<(CharacterId, PerceptionLevel)>,
    /// Witnesses that received a prompt, in roster order.
    pub prompted: Vec<CharacterId>,
}

/// The event bus.
#[derive(Debug)]
pub struct EventSystem {
    log: EventLog,
    witnesses: WitnessProcessor,
    prune_interval_frames: u64,
}

impl EventSystem {
    /// Create an event system with an empty log.
    pub fn new(config: EventsConfig, witnesses: WitnessProcessor) -> Self {
        Self {
            log: EventLog::new(config),
            witnesses,
            prune_interval_frames: config.prune_interval_frames.max(1),
        }
    }

    /// Register an event by `actor_id`, stamped with `now`.
    ///
    /// `now` is the caller's clock; under [`crate::OfficeSim`] that is the
    /// simulated frame time, so the event lines up with later pruning and
    /// recent-event queries. The event takes the actor's current position.
    /// Every other enabled character is classified; those at level 1 or
    /// above receive a prompt.
    pub fn register_event(
        &mut self,
        grid: &NavGrid,
        characters: &mut [Character],
        actor_id: CharacterId,
        draft: EventDraft,
        now: DateTime<Utc>,
    ) -> Result<Registration, SimError> {
        let actor = characters
            .iter()
            .find(|c| c.id == actor_id)
            .ok_or(SimError::UnknownCharacter { id: actor_id })?;
        let event = WorldEvent {
            id: EventId::new(),
            timestamp: now,
            position: actor.position,
            actor_id,
            actor_name: actor.name.clone(),
            description: draft.description,
            loudness: draft.loudness.max(0.0),
            location: draft.location,
            kind: draft.kind,
        };

        let mut levels = Vec::new();
        let mut prompted = Vec::new();
        for witness in characters.iter_mut() {
            if witness.id == actor_id || !witness.is_enabled {
                continue;
            }
            let prompt = self.witnesses.witness(grid, witness, &event);
            let level = prompt.as_ref().map_or(PerceptionLevel::Unaware, |p| p.level);
            levels.push((witness.id, level));
            if let Some(prompt) = prompt {
                witness.pending_prompts.push_back(prompt);
                prompted.push(witness.id);
            }
        }

        info!(
            event_id = %event.id,
            actor = %event.actor_name,
            kind = ?event.kind,
            loudness = event.loudness,
            witnesses = levels.len(),
            prompted = prompted.len(),
            "event registered"
        );
        self.log.push(event.clone());
        Ok(Registration {
            event,
            levels,
            prompted,
        })
    }

    /// Apply a raw response from the decision layer for `witness`.
    pub fn process_witness_response(
        &self,
        witness: &mut Character,
        raw: &str,
        conversation: Option<&mut Conversation>,
        now: DateTime<Utc>,
    ) -> ResponseOutcome {
        apply_response(witness, raw, conversation, now)
    }

    /// Events within `radius` of `position` and at most `max_age_ms` old.
    pub fn get_recent_events(
        &self,
        position: Vec2,
        radius: f32,
        max_age_ms: u64,
        now: DateTime<Utc>,
    ) -> Vec<&WorldEvent> {
        self.log.recent(position, radius, max_age_ms, now)
    }

    /// Per-frame upkeep: prune the log every `prune_interval_frames`.
    pub fn maintain(&mut self, frame: u64, now: DateTime<Utc>) -> usize {
        if frame.checked_rem(self.prune_interval_frames) != Some(0) {
            return 0;
        }
        let removed = self.log.prune(now);
        if removed > 0 {
            debug!(frame, removed, "event log pruned");
        }
        removed
    }

    /// The event log.
    pub const fn log(&self) -> &EventLog {
        &self.log
    }

    /// The witness processor.
    pub const fn witnesses(&self) -> &WitnessProcessor {
        &self.witnesses
    }
}
