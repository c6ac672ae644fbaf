//! The simulation state and its per-frame step.
//!
//! [`OfficeSim`] owns the navigation grid, the characters, the event log
//! and the frame clock. Everything runs on one thread: a frame moves every
//! character, then prunes the event log if the interval is due. Events are
//! registered synchronously between frames, so witness prompts for an
//! event are all queued before the call that registered it returns.

use chrono::{DateTime, Utc};
use officelife_types::{
    ActionState, Character, CharacterId, CharacterSync, Conversation, ConversationId, EventDraft,
    QueuedAction, Vec2, WorldEvent,
};
use officelife_world::NavGrid;
use tracing::{debug, info, warn};

use crate::clock::{FrameClock, FrameTick};
use crate::config::SimulationConfig;
use crate::decision::DecisionSource;
use crate::error::SimError;
use crate::event_system::{EventSystem, Registration};
use crate::movement::{MoveOutcome, MovementSystem};
use crate::notify::{ChangeFeed, ChangeSink, CharacterChange};
use crate::prompt::PromptEngine;
use crate::witness::{ResponseOutcome, WitnessProcessor};

/// What one frame did.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    /// The clamped frame step.
    pub tick: FrameTick,
    /// Characters that moved or snapped onto a waypoint.
    pub moving: usize,
    /// Characters that finished their path this frame.
    pub arrived: Vec<CharacterId>,
    /// Characters that hit an obstacle and were re-planned.
    pub rerouted: Vec<CharacterId>,
    /// Characters that hit an obstacle with no way round.
    pub stranded: Vec<CharacterId>,
    /// Events pruned from the log.
    pub pruned: usize,
}

/// Counts of how pending prompts were answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromptTally {
    /// Prompts handed to the decision source.
    pub answered: usize,
    /// Replies that queued an action.
    pub queued: usize,
    /// Replies that became spoken lines.
    pub spoken: usize,
    /// Prompts the decision source let pass.
    pub ignored: usize,
    /// Replies that could not be parsed.
    pub dropped: usize,
}

/// The office simulation.
#[derive(Debug)]
pub struct OfficeSim {
    grid: NavGrid,
    characters: Vec<Character>,
    movement: MovementSystem,
    events: EventSystem,
    clock: FrameClock,
    changes: ChangeFeed,
    conversation: Option<Conversation>,
}

impl OfficeSim {
    /// Create a simulation over `grid` with the given templates.
    pub fn new(
        config: &SimulationConfig,
        grid: NavGrid,
        prompts: PromptEngine,
        started_at: DateTime<Utc>,
    ) -> Self {
        let witnesses = WitnessProcessor::new(prompts, config.perception);
        Self {
            grid,
            characters: Vec::new(),
            movement: MovementSystem::new(config.movement),
            events: EventSystem::new(config.events, witnesses),
            clock: FrameClock::new(config.frame, started_at),
            changes: ChangeFeed::new(),
            conversation: None,
        }
    }

    /// Create a simulation, loading templates from `prompts.template_dir`
    /// when it is set.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Prompt`] if a template cannot be loaded.
    pub fn from_config(
        config: &SimulationConfig,
        grid: NavGrid,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SimError> {
        let prompts = match &config.prompts.template_dir {
            Some(dir) => PromptEngine::from_dir(dir)?,
            None => PromptEngine::builtin()?,
        };
        Ok(Self::new(config, grid, prompts, started_at))
    }

    /// Add a character. A blocked start cell is cleared.
    pub fn add_character(&mut self, character: Character) -> CharacterId {
        self.grid.ensure_walkable(character.position);
        let id = character.id;
        info!(
            character = %character.name,
            %id,
            x = character.position.x,
            y = character.position.y,
            "character added"
        );
        self.characters.push(character);
        id
    }

    /// Look up a character.
    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Look up a character for mutation.
    pub fn character_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    /// Find a character by display name.
    pub fn find_by_name(&self, name: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.name == name)
    }

    /// All characters, in insertion order.
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    /// The navigation grid.
    pub const fn grid(&self) -> &NavGrid {
        &self.grid
    }

    /// The navigation grid, for opening and closing cells at runtime.
    /// Characters already under way notice a closed cell when they reach it.
    pub const fn grid_mut(&mut self) -> &mut NavGrid {
        &mut self.grid
    }

    /// The event system.
    pub const fn events(&self) -> &EventSystem {
        &self.events
    }

    /// Current simulated time.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Frames advanced so far.
    pub const fn frame(&self) -> u64 {
        self.clock.frame()
    }

    /// Send a character towards `destination`. Returns whether a path was
    /// found.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownCharacter`] for an unknown id.
    pub fn request_move(&mut self, id: CharacterId, destination: Vec2) -> Result<bool, SimError> {
        let character = self
            .characters
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(SimError::UnknownCharacter { id })?;
        Ok(self.movement.request_path(character, &self.grid, destination))
    }

    /// Set a character's activity on behalf of the decision layer.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownCharacter`] for an unknown id.
    pub fn set_state(&mut self, id: CharacterId, state: ActionState) -> Result<(), SimError> {
        let character = self
            .characters
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(SimError::UnknownCharacter { id })?;
        let from = character.action_state;
        if from != state {
            character.action_state = state;
            self.changes
                .publish(CharacterChange::StateChanged { id, from, to: state });
        }
        Ok(())
    }

    /// Register an event performed by `actor`, stamped with simulated time.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownCharacter`] for an unknown actor.
    pub fn perform(&mut self, actor: CharacterId, draft: EventDraft) -> Result<Registration, SimError> {
        let now = self.clock.now();
        self.events
            .register_event(&self.grid, &mut self.characters, actor, draft, now)
    }

    /// Advance one frame by `elapsed_ms` of host time.
    pub fn step(&mut self, elapsed_ms: u64) -> StepReport {
        let tick = self.clock.advance(elapsed_ms);
        if tick.clamped {
            debug!(frame = tick.frame, elapsed_ms, delta_ms = tick.delta_ms, "frame delta clamped");
        }

        let mut report = StepReport {
            tick,
            moving: 0,
            arrived: Vec::new(),
            rerouted: Vec::new(),
            stranded: Vec::new(),
            pruned: 0,
        };
        for character in &mut self.characters {
            match self
                .movement
                .advance(character, &self.grid, tick.delta_seconds, &mut self.changes)
            {
                MoveOutcome::Idle => {}
                MoveOutcome::Stepped | MoveOutcome::Arrived => {
                    report.moving = report.moving.saturating_add(1);
                }
                MoveOutcome::ReachedDestination => {
                    report.moving = report.moving.saturating_add(1);
                    report.arrived.push(character.id);
                }
                MoveOutcome::Rerouted => report.rerouted.push(character.id),
                MoveOutcome::Stranded => report.stranded.push(character.id),
            }
        }
        report.pruned = self.events.maintain(tick.frame, self.clock.now());
        report
    }

    /// Start a conversation, replacing any active one.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownCharacter`] if any participant is unknown.
    pub fn start_conversation(
        &mut self,
        participants: impl IntoIterator<Item = CharacterId>,
    ) -> Result<ConversationId, SimError> {
        let participants: Vec<CharacterId> = participants.into_iter().collect();
        if let Some(&id) = participants.iter().find(|&&id| self.character(id).is_none()) {
            return Err(SimError::UnknownCharacter { id });
        }
        let conversation = Conversation::new(participants);
        let id = conversation.id;
        if let Some(previous) = self.conversation.replace(conversation) {
            debug!(conversation = %previous.id, lines = previous.lines.len(), "conversation replaced");
        }
        info!(conversation = %id, "conversation started");
        Ok(id)
    }

    /// The active conversation.
    pub const fn conversation(&self) -> Option<&Conversation> {
        self.conversation.as_ref()
    }

    /// End the active conversation and hand back its transcript.
    pub const fn end_conversation(&mut self) -> Option<Conversation> {
        self.conversation.take()
    }

    /// Apply a raw decision-layer response for `witness`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownCharacter`] for an unknown id.
    pub fn respond(&mut self, witness: CharacterId, raw: &str) -> Result<ResponseOutcome, SimError> {
        let now = self.clock.now();
        let character = self
            .characters
            .iter_mut()
            .find(|c| c.id == witness)
            .ok_or(SimError::UnknownCharacter { id: witness })?;
        Ok(self
            .events
            .process_witness_response(character, raw, self.conversation.as_mut(), now))
    }

    /// Hand every pending prompt to `decisions` and apply the replies.
    pub fn answer_prompts(&mut self, decisions: &mut dyn DecisionSource) -> PromptTally {
        let now = self.clock.now();
        let mut tally = PromptTally::default();
        for index in 0..self.characters.len() {
            while let Some(prompt) = self
                .characters
                .get_mut(index)
                .and_then(|c| c.pending_prompts.pop_front())
            {
                let Some(character) = self.characters.get(index) else {
                    break;
                };
                let event = self.events.log().get(prompt.event_id);
                if event.is_none() {
                    warn!(event_id = %prompt.event_id, witness = %character.name, "prompt refers to a pruned event");
                }
                let reply = decisions.respond(character, &prompt, event);
                tally.answered = tally.answered.saturating_add(1);
                let Some(raw) = reply else {
                    tally.ignored = tally.ignored.saturating_add(1);
                    continue;
                };
                let Some(character) = self.characters.get_mut(index) else {
                    break;
                };
                let outcome =
                    self.events
                        .process_witness_response(character, &raw, self.conversation.as_mut(), now);
                match outcome {
                    ResponseOutcome::Queued => tally.queued = tally.queued.saturating_add(1),
                    ResponseOutcome::Spoken(_) | ResponseOutcome::Logged => {
                        tally.spoken = tally.spoken.saturating_add(1);
                    }
                    ResponseOutcome::Dropped => tally.dropped = tally.dropped.saturating_add(1),
                }
            }
        }
        tally
    }

    /// Take a character's queued actions, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownCharacter`] for an unknown id.
    pub fn take_actions(&mut self, id: CharacterId) -> Result<Vec<QueuedAction>, SimError> {
        let character = self.character_mut(id).ok_or(SimError::UnknownCharacter { id })?;
        Ok(character.action_queue.drain(..).collect())
    }

    /// Events within `radius` of `position` and at most `max_age_ms` old.
    pub fn recent_events(&self, position: Vec2, radius: f32, max_age_ms: u64) -> Vec<&WorldEvent> {
        self.events
            .get_recent_events(position, radius, max_age_ms, self.clock.now())
    }

    /// Take every change published since the last drain.
    pub fn drain_changes(&mut self) -> Vec<CharacterChange> {
        self.changes.drain()
    }

    /// Position and direction snapshot of every character.
    pub fn syncs(&self) -> Vec<CharacterSync> {
        self.characters.iter().map(Character::sync).collect()
    }
}
