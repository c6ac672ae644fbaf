//! Movement, perception, witnessing, and the frame loop for the office
//! simulation.
//!
//! This crate turns a navigation grid and a roster into a living office:
//! characters walk their paths, events are registered and fanned out to
//! witnesses by how much each of them saw or heard, and the replies of a
//! decision layer are applied back onto the characters.
//!
//! # Modules
//!
//! - [`clock`] -- Frame counter with a clamped delta and simulated time.
//! - [`config`] -- Configuration loading from `officelife-config.yaml`.
//! - [`decision`] -- [`DecisionSource`] trait and [`RuleBasedDecisionSource`].
//! - [`error`] -- Simulation API errors.
//! - [`event_system`] -- Event registration and witness fan-out.
//! - [`events`] -- Bounded log of recent world events.
//! - [`movement`] -- Path following with obstacle re-planning.
//! - [`notify`] -- Character change notifications for the renderer.
//! - [`parse`] -- Tolerant witness response parsing.
//! - [`perception`] -- Field of view, line of sight, hearing, and levels.
//! - [`prompt`] -- Witness prompt templates.
//! - [`runner`] -- Headless frame loop.
//! - [`simulation`] -- [`OfficeSim`], the state the loop drives.
//! - [`witness`] -- Prompts for witnesses and effects of their replies.
//!
//! [`DecisionSource`]: decision::DecisionSource
//! [`RuleBasedDecisionSource`]: decision::RuleBasedDecisionSource
//! [`OfficeSim`]: simulation::OfficeSim

pub mod clock;
pub mod config;
pub mod decision;
pub mod error;
pub mod event_system;
pub mod events;
pub mod movement;
pub mod notify;
pub mod parse;
pub mod perception;
pub mod prompt;
pub mod runner;
pub mod simulation;
pub mod witness;

pub use clock::{FrameClock, FrameTick};
pub use config::{ConfigError, RosterEntry, SimulationConfig};
pub use decision::{DecisionSource, RuleBasedDecisionSource};
pub use error::SimError;
pub use event_system::{EventSystem, Registration};
pub use events::EventLog;
pub use movement::{MoveOutcome, MovementSystem};
pub use notify::{ChangeFeed, ChangeSink, CharacterChange};
pub use parse::{ResponseError, parse_witness_response};
pub use perception::{PerceptionReport, PerceptionSystem};
pub use prompt::{PromptEngine, PromptError};
pub use runner::{FrameCallback, FrameSummary, NoOpCallback, RunSummary, log_run_end, run_frames};
pub use simulation::{OfficeSim, PromptTally, StepReport};
pub use witness::{ResponseOutcome, WitnessProcessor, apply_response};
