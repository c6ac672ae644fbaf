//! Frame clock.
//!
//! The host loop reports how much wall-clock time passed since the last
//! frame. That figure is clamped before anything uses it: after the host
//! was suspended or backgrounded an unclamped delta would carry characters
//! through walls in a single step. Simulated time only ever advances by the
//! clamped amount, so event timestamps and recent-event windows follow the
//! simulation, not the wall clock.

use chrono::{DateTime, TimeDelta, Utc};

use crate::config::FrameConfig;

/// One clamped frame step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Frame number, starting at 1 for the first advance.
    pub frame: u64,
    /// Clamped elapsed time in milliseconds.
    pub delta_ms: u64,
    /// Clamped elapsed time in seconds, for movement.
    pub delta_seconds: f32,
    /// Whether the reported time was cut down to the maximum.
    pub clamped: bool,
}

/// Counts frames and accumulates clamped simulated time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameClock {
    frame: u64,
    max_delta_ms: u64,
    elapsed_ms: u64,
    started_at: DateTime<Utc>,
}

impl FrameClock {
    /// Start a clock at `started_at` with no frames elapsed.
    ///
    /// A zero `max_delta_ms` would freeze the simulation, so it is raised
    /// to 1.
    pub fn new(config: FrameConfig, started_at: DateTime<Utc>) -> Self {
        Self {
            frame: 0,
            max_delta_ms: config.max_delta_ms.max(1),
            elapsed_ms: 0,
            started_at,
        }
    }

    /// Advance by `elapsed_ms` of host time, clamped to the maximum.
    #[allow(clippy::cast_precision_loss)]
    pub fn advance(&mut self, elapsed_ms: u64) -> FrameTick {
        let delta_ms = elapsed_ms.min(self.max_delta_ms);
        self.frame = self.frame.saturating_add(1);
        self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
        FrameTick {
            frame: self.frame,
            delta_ms,
            delta_seconds: delta_ms as f32 / 1000.0,
            clamped: elapsed_ms > self.max_delta_ms,
        }
    }

    /// Frames advanced so far.
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Total simulated milliseconds.
    pub const fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Current simulated time.
    pub fn now(&self) -> DateTime<Utc> {
        i64::try_from(self.elapsed_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .and_then(|delta| self.started_at.checked_add_signed(delta))
            .unwrap_or(self.started_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(max_delta_ms: u64) -> FrameClock {
        FrameClock::new(FrameConfig { max_delta_ms }, DateTime::<Utc>::UNIX_EPOCH)
    }

    #[test]
    fn short_frames_pass_through() {
        let mut clock = clock(100);
        let tick = clock.advance(16);
        assert_eq!(tick.frame, 1);
        assert_eq!(tick.delta_ms, 16);
        assert!(!tick.clamped);
        assert!((tick.delta_seconds - 0.016).abs() < 1e-6);
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut clock = clock(100);
        let tick = clock.advance(5_000);
        assert_eq!(tick.delta_ms, 100);
        assert!(tick.clamped);
        assert_eq!(clock.elapsed_ms(), 100);
    }

    #[test]
    fn simulated_time_follows_clamped_deltas() {
        let mut clock = clock(100);
        clock.advance(50);
        clock.advance(10_000);
        assert_eq!(clock.frame(), 2);
        let expected = DateTime::<Utc>::UNIX_EPOCH + TimeDelta::milliseconds(150);
        assert_eq!(clock.now(), expected);
    }

    #[test]
    fn zero_max_delta_is_raised() {
        let mut clock = clock(0);
        assert_eq!(clock.advance(20).delta_ms, 1);
    }
}
