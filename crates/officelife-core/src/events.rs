//! Rolling log of world events.
//!
//! Events are immutable once logged. The log is append-mostly: entries
//! leave only through age-based pruning or, when the hard cap is hit,
//! eviction of the oldest entry. Queries never remove anything.

use std::collections::VecDeque;

use chrono::{DateTime, TimeDelta, Utc};
use officelife_types::{EventId, Vec2, WorldEvent};
use tracing::debug;

use crate::config::EventsConfig;

/// Time-ordered, bounded event storage.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<WorldEvent>,
    retention: TimeDelta,
    max_entries: usize,
}

impl EventLog {
    /// Create an empty log. A zero cap is raised to 1.
    pub fn new(config: EventsConfig) -> Self {
        let retention = i64::try_from(config.retention_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .unwrap_or(TimeDelta::MAX);
        Self {
            entries: VecDeque::new(),
            retention,
            max_entries: config.max_entries.max(1),
        }
    }

    /// Append an event, evicting the oldest entry if the log is full.
    pub fn push(&mut self, event: WorldEvent) {
        while self.entries.len() >= self.max_entries {
            if let Some(evicted) = self.entries.pop_front() {
                debug!(event_id = %evicted.id, "event log full; evicted oldest entry");
            }
        }
        self.entries.push_back(event);
    }

    /// Drop events older than the retention age. Returns how many went.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let Some(cutoff) = now.checked_sub_signed(self.retention) else {
            return 0;
        };
        let before = self.entries.len();
        self.entries.retain(|event| event.timestamp >= cutoff);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, remaining = self.entries.len(), "pruned old events");
        }
        removed
    }

    /// Events within `radius` of `position` and at most `max_age_ms` old,
    /// oldest first.
    ///
    /// Events stamped after `now` are excluded.
    pub fn recent(
        &self,
        position: Vec2,
        radius: f32,
        max_age_ms: u64,
        now: DateTime<Utc>,
    ) -> Vec<&WorldEvent> {
        let cutoff = i64::try_from(max_age_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .and_then(|age| now.checked_sub_signed(age))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.entries
            .iter()
            .filter(|event| event.timestamp >= cutoff && event.timestamp <= now)
            .filter(|event| event.position.distance(position) <= radius)
            .collect()
    }

    /// Look up an event by id.
    pub fn get(&self, id: EventId) -> Option<&WorldEvent> {
        self.entries.iter().find(|event| event.id == id)
    }

    /// All retained events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &WorldEvent> {
        self.entries.iter()
    }

    /// Number of retained events.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(EventsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use officelife_types::{CharacterId, EventKind};

    use super::*;

    fn event(position: Vec2, at: DateTime<Utc>) -> WorldEvent {
        WorldEvent {
            id: EventId::new(),
            timestamp: at,
            position,
            actor_id: CharacterId::new(),
            actor_name: "Carol".to_owned(),
            description: "dropped a binder".to_owned(),
            loudness: 20.0,
            location: "copy room".to_owned(),
            kind: EventKind::Drop,
        }
    }

    fn epoch_plus(ms: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + TimeDelta::milliseconds(ms)
    }

    #[test]
    fn recent_filters_by_radius_and_age() {
        let mut log = EventLog::default();
        log.push(event(Vec2::new(0.0, 0.0), epoch_plus(1_000)));
        log.push(event(Vec2::new(50.0, 0.0), epoch_plus(9_000)));
        log.push(event(Vec2::new(500.0, 0.0), epoch_plus(9_500)));

        let now = epoch_plus(10_000);
        assert_eq!(log.recent(Vec2::ZERO, 100.0, 5_000, now).len(), 1);
        assert_eq!(log.recent(Vec2::ZERO, 100.0, 60_000, now).len(), 2);
        assert_eq!(log.recent(Vec2::ZERO, 1_000.0, 60_000, now).len(), 3);
        assert!(log.recent(Vec2::ZERO, 100.0, 5_000, epoch_plus(20_000)).is_empty());
    }

    #[test]
    fn queries_do_not_remove_entries() {
        let mut log = EventLog::default();
        log.push(event(Vec2::ZERO, epoch_plus(0)));
        let _ = log.recent(Vec2::ZERO, 10.0, 1, epoch_plus(100_000));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn prune_drops_only_old_entries() {
        let mut log = EventLog::new(EventsConfig {
            retention_ms: 1_000,
            ..EventsConfig::default()
        });
        log.push(event(Vec2::ZERO, epoch_plus(0)));
        log.push(event(Vec2::ZERO, epoch_plus(1_500)));
        assert_eq!(log.prune(epoch_plus(2_000)), 1);
        assert_eq!(log.len(), 1);
        assert_eq!(log.prune(epoch_plus(2_000)), 0);
    }

    #[test]
    fn cap_evicts_the_oldest() {
        let mut log = EventLog::new(EventsConfig {
            max_entries: 2,
            ..EventsConfig::default()
        });
        let first = event(Vec2::ZERO, epoch_plus(0));
        let first_id = first.id;
        log.push(first);
        log.push(event(Vec2::ZERO, epoch_plus(1)));
        log.push(event(Vec2::ZERO, epoch_plus(2)));
        assert_eq!(log.len(), 2);
        assert!(log.get(first_id).is_none());
    }
}
