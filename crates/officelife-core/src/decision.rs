//! Decision source trait and rule-based implementation.
//!
//! Once a witness has a pending prompt, something has to answer it. The
//! [`DecisionSource`] trait abstracts that answerer: a language model
//! behind a network call, a scripted bot, or a test stub. Whatever it is,
//! it returns the raw text of a reply, which goes through the same
//! response parser regardless of where it came from.
//!
//! [`RuleBasedDecisionSource`] answers without any model, from the
//! perception level, the witness's relationship with the actor, and their
//! personality tags.

use officelife_types::{Character, PerceptionLevel, RelationshipLabel, WitnessPrompt, WorldEvent};
use serde_json::json;

/// A source of witness replies.
pub trait DecisionSource {
    /// Answer one prompt for `witness`.
    ///
    /// `event` is the logged event the prompt was built from, if it is
    /// still in the log. Returns the raw reply text, or `None` to let the
    /// prompt pass without a reaction.
    fn respond(
        &mut self,
        witness: &Character,
        prompt: &WitnessPrompt,
        event: Option<&WorldEvent>,
    ) -> Option<String>;
}

/// Personality tag that makes a witness ignore everything.
pub const OBLIVIOUS_TAG: &str = "oblivious";
/// Personality tag that makes a witness investigate.
pub const CURIOUS_TAG: &str = "curious";
/// Personality tag that makes a witness speak up about noises.
pub const ANXIOUS_TAG: &str = "anxious";

/// Deterministic replies from level, relationship and personality.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedDecisionSource;

impl RuleBasedDecisionSource {
    /// Create a rule-based decision source.
    pub const fn new() -> Self {
        Self
    }
}

impl DecisionSource for RuleBasedDecisionSource {
    fn respond(
        &mut self,
        witness: &Character,
        prompt: &WitnessPrompt,
        event: Option<&WorldEvent>,
    ) -> Option<String> {
        let has = |tag: &str| witness.personality_tags.contains(tag);
        if has(OBLIVIOUS_TAG) {
            return None;
        }
        let event_id = prompt.event_id.to_string();

        let reply = match prompt.level {
            PerceptionLevel::Unaware => return None,
            PerceptionLevel::Heard => {
                if has(ANXIOUS_TAG) {
                    json!({ "type": "DIALOGUE", "event_id": event_id, "line": "What was that?" })
                } else if has(CURIOUS_TAG) {
                    json!({ "type": "ACTION", "event_id": event_id, "action": "heads towards the noise" })
                } else {
                    json!({ "type": "ACTION", "event_id": event_id, "action": "pauses and listens" })
                }
            }
            PerceptionLevel::Glimpsed => {
                let action = if has(CURIOUS_TAG) {
                    "turns to get a better look"
                } else {
                    "glances over"
                };
                json!({ "type": "ACTION", "event_id": event_id, "action": action })
            }
            PerceptionLevel::Witnessed => {
                let event = event?;
                let label = RelationshipLabel::from_score(witness.relationship_with(event.actor_id));
                match label {
                    RelationshipLabel::CloseFriend | RelationshipLabel::Friendly => json!({
                        "type": "DIALOGUE",
                        "event_id": event_id,
                        "line": format!("{}, is everything alright?", event.actor_name),
                    }),
                    RelationshipLabel::Hostile | RelationshipLabel::Unfriendly => json!({
                        "type": "ACTION",
                        "event_id": event_id,
                        "action": format!("glares at {}", event.actor_name),
                    }),
                    RelationshipLabel::Neutral if has(CURIOUS_TAG) => json!({
                        "type": "ACTION",
                        "event_id": event_id,
                        "action": format!("walks over to {}", event.actor_name),
                    }),
                    RelationshipLabel::Neutral => json!({
                        "type": "ACTION",
                        "event_id": event_id,
                        "action": "raises an eyebrow",
                    }),
                }
            }
        };
        Some(reply.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use officelife_types::{EventId, EventKind, Vec2, WitnessResponse};

    use super::*;
    use crate::parse::parse_witness_response;

    fn event(actor: &Character) -> WorldEvent {
        WorldEvent {
            id: EventId::new(),
            timestamp: Utc::now(),
            position: actor.position,
            actor_id: actor.id,
            actor_name: actor.name.clone(),
            description: "knocked over a plant".to_owned(),
            loudness: 30.0,
            location: "lobby".to_owned(),
            kind: EventKind::Drop,
        }
    }

    fn prompt(witness: &Character, event: &WorldEvent, level: PerceptionLevel) -> WitnessPrompt {
        WitnessPrompt {
            event_id: event.id,
            witness_id: witness.id,
            level,
            text: String::new(),
        }
    }

    #[test]
    fn friends_speak_up_with_the_event_id() {
        let bob = Character::new("Bob", Vec2::ZERO);
        let alice = Character::new("Alice", Vec2::ZERO).with_relationship(bob.id, 80);
        let event = event(&bob);
        let raw = RuleBasedDecisionSource::new()
            .respond(&alice, &prompt(&alice, &event, PerceptionLevel::Witnessed), Some(&event))
            .unwrap();
        let response = parse_witness_response(&raw).unwrap();
        assert_eq!(response.event_id(), Some(event.id));
        assert!(matches!(response, WitnessResponse::Dialogue { ref line, .. } if line.starts_with("Bob")));
    }

    #[test]
    fn rivals_act() {
        let bob = Character::new("Bob", Vec2::ZERO);
        let alice = Character::new("Alice", Vec2::ZERO).with_relationship(bob.id, 10);
        let event = event(&bob);
        let raw = RuleBasedDecisionSource::new()
            .respond(&alice, &prompt(&alice, &event, PerceptionLevel::Witnessed), Some(&event))
            .unwrap();
        assert!(matches!(
            parse_witness_response(&raw).unwrap(),
            WitnessResponse::Action { ref action, .. } if action == "glares at Bob"
        ));
    }

    #[test]
    fn heard_reply_never_names_the_actor() {
        let bob = Character::new("Bob", Vec2::ZERO);
        let alice = Character::new("Alice", Vec2::ZERO).with_tag(ANXIOUS_TAG);
        let event = event(&bob);
        let raw = RuleBasedDecisionSource::new()
            .respond(&alice, &prompt(&alice, &event, PerceptionLevel::Heard), Some(&event))
            .unwrap();
        assert!(!raw.contains("Bob"));
        assert!(matches!(parse_witness_response(&raw).unwrap(), WitnessResponse::Dialogue { .. }));
    }

    #[test]
    fn oblivious_witnesses_and_missing_events_stay_silent() {
        let bob = Character::new("Bob", Vec2::ZERO);
        let event = event(&bob);
        let oblivious = Character::new("Dave", Vec2::ZERO).with_tag(OBLIVIOUS_TAG);
        let mut source = RuleBasedDecisionSource::new();
        assert!(source
            .respond(&oblivious, &prompt(&oblivious, &event, PerceptionLevel::Witnessed), Some(&event))
            .is_none());

        let alice = Character::new("Alice", Vec2::ZERO);
        assert!(source
            .respond(&alice, &prompt(&alice, &event, PerceptionLevel::Witnessed), None)
            .is_none());
    }
}
