//! Headless frame loop.
//!
//! [`run_frames`] drives a fixed number of frames. Each frame:
//!
//! 1. **Step**: advance the clock, move everyone, prune the event log
//! 2. **Decide**: hand pending witness prompts to the decision source and
//!    apply the replies
//! 3. **Notify**: invoke the [`FrameCallback`], which may move characters
//!    or stage new events for the next frame

use tracing::{info, warn};

use crate::decision::DecisionSource;
use crate::simulation::{OfficeSim, PromptTally, StepReport};

/// Everything that happened in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSummary {
    /// Movement and pruning results.
    pub step: StepReport,
    /// How pending prompts were answered.
    pub prompts: PromptTally,
}

/// Totals over a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames executed.
    pub frames: u64,
    /// Paths completed.
    pub arrivals: usize,
    /// Obstacle re-plans.
    pub reroutes: usize,
    /// Characters stranded by obstacles.
    pub strandings: usize,
    /// Prompt answers, summed over all frames.
    pub prompts: PromptTally,
    /// Events still in the log at the end.
    pub events_logged: usize,
}

/// Callback invoked after each frame.
pub trait FrameCallback {
    /// Called once the frame's step and decisions are done.
    fn on_frame(&mut self, sim: &mut OfficeSim, summary: &FrameSummary);
}

/// A callback that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl FrameCallback for NoOpCallback {
    fn on_frame(&mut self, _sim: &mut OfficeSim, _summary: &FrameSummary) {}
}

/// Run `frames` frames of `frame_ms` host time each.
pub fn run_frames(
    sim: &mut OfficeSim,
    frames: u64,
    frame_ms: u64,
    decisions: &mut dyn DecisionSource,
    callback: &mut dyn FrameCallback,
) -> RunSummary {
    info!(frames, frame_ms, characters = sim.characters().len(), "simulation starting");

    let mut totals = RunSummary::default();
    for _ in 0..frames {
        let step = sim.step(frame_ms);
        let prompts = sim.answer_prompts(decisions);

        totals.frames = totals.frames.saturating_add(1);
        totals.arrivals = totals.arrivals.saturating_add(step.arrived.len());
        totals.reroutes = totals.reroutes.saturating_add(step.rerouted.len());
        totals.strandings = totals.strandings.saturating_add(step.stranded.len());
        totals.prompts = add_tallies(totals.prompts, prompts);

        let summary = FrameSummary { step, prompts };
        callback.on_frame(sim, &summary);
    }

    // Prompts raised by the callback on the last frame.
    let leftover = sim.answer_prompts(decisions);
    totals.prompts = add_tallies(totals.prompts, leftover);
    totals.events_logged = sim.events().log().len();
    totals
}

/// Log the end-of-run totals.
pub fn log_run_end(summary: &RunSummary) {
    info!(
        frames = summary.frames,
        arrivals = summary.arrivals,
        reroutes = summary.reroutes,
        strandings = summary.strandings,
        prompts_answered = summary.prompts.answered,
        actions_queued = summary.prompts.queued,
        lines_spoken = summary.prompts.spoken,
        events_logged = summary.events_logged,
        "simulation ended"
    );
    if summary.prompts.dropped > 0 {
        warn!(dropped = summary.prompts.dropped, "some witness responses could not be parsed");
    }
}

const fn add_tallies(a: PromptTally, b: PromptTally) -> PromptTally {
    PromptTally {
        answered: a.answered.saturating_add(b.answered),
        queued: a.queued.saturating_add(b.queued),
        spoken: a.spoken.saturating_add(b.spoken),
        ignored: a.ignored.saturating_add(b.ignored),
        dropped: a.dropped.saturating_add(b.dropped),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, Utc};
    use officelife_types::{Character, CharacterId, EventDraft, EventKind, Vec2};
    use officelife_world::NavGrid;

    use super::*;
    use crate::config::SimulationConfig;
    use crate::decision::RuleBasedDecisionSource;
    use crate::prompt::PromptEngine;

    fn sim() -> OfficeSim {
        OfficeSim::new(
            &SimulationConfig::default(),
            NavGrid::new(12, 12, 48),
            PromptEngine::builtin().unwrap(),
            DateTime::<Utc>::UNIX_EPOCH,
        )
    }

    /// Stages one slam by `actor` on the given frame.
    struct Stage {
        actor: CharacterId,
        on_frame: u64,
        seen: Vec<u64>,
    }

    impl FrameCallback for Stage {
        fn on_frame(&mut self, sim: &mut OfficeSim, summary: &FrameSummary) {
            self.seen.push(summary.step.tick.frame);
            if summary.step.tick.frame == self.on_frame {
                sim.perform(self.actor, EventDraft::new("slammed a door", 60.0, "hall", EventKind::Slam))
                    .unwrap();
            }
        }
    }

    #[test]
    fn runs_the_requested_frames() {
        let mut sim = sim();
        let summary = run_frames(&mut sim, 5, 33, &mut RuleBasedDecisionSource::new(), &mut NoOpCallback);
        assert_eq!(summary.frames, 5);
        assert_eq!(sim.frame(), 5);
        assert_eq!(summary.events_logged, 0);
    }

    #[test]
    fn prompts_raised_by_the_callback_are_answered() {
        let mut sim = sim();
        let bob = sim.add_character(Character::new("Bob", Vec2::new(300.0, 100.0)));
        let alice = sim.add_character(Character::new("Alice", Vec2::new(100.0, 100.0)).with_facing_angle(0.0));
        let mut stage = Stage {
            actor: bob,
            on_frame: 3,
            seen: Vec::new(),
        };
        let summary = run_frames(&mut sim, 3, 33, &mut RuleBasedDecisionSource::new(), &mut stage);
        assert_eq!(stage.seen, vec![1, 2, 3]);
        assert_eq!(summary.events_logged, 1);
        assert_eq!(summary.prompts.answered, 1);
        assert!(sim.character(alice).unwrap().pending_prompts.is_empty());
    }
}
