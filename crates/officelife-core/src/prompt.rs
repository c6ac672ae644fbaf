//! Witness prompt templates via `minijinja`.
//!
//! The four templates ship inside the binary. Operators can override any of
//! them by pointing `prompts.template_dir` at a directory holding files of
//! the same names; files that are absent keep the built-in version.

use std::path::{Path, PathBuf};

use minijinja::Environment;
use officelife_types::PerceptionLevel;
use serde::Serialize;
use tracing::{debug, info};

/// Template for level 3.
pub const CLEAR_TEMPLATE: &str = "witness_clear.j2";
/// Template for level 2.
pub const PARTIAL_TEMPLATE: &str = "witness_partial.j2";
/// Template for level 1.
pub const SOUND_TEMPLATE: &str = "witness_sound.j2";
/// Reply instructions included by the other three.
pub const RESPONSE_FORMAT_TEMPLATE: &str = "response_format.j2";

const BUILTIN_TEMPLATES: [(&str, &str); 4] = [
    (CLEAR_TEMPLATE, include_str!("../templates/witness_clear.j2")),
    (PARTIAL_TEMPLATE, include_str!("../templates/witness_partial.j2")),
    (SOUND_TEMPLATE, include_str!("../templates/witness_sound.j2")),
    (RESPONSE_FORMAT_TEMPLATE, include_str!("../templates/response_format.j2")),
];

/// Errors from loading or rendering prompt templates.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// A template override could not be read.
    #[error("failed to read template {path}: {source}")]
    Io {
        /// The template file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A template failed to compile or render.
    #[error("template {name} failed: {source}")]
    Template {
        /// Template name.
        name: String,
        /// The underlying template error.
        source: minijinja::Error,
    },
}

/// Values a witness prompt is rendered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WitnessContext {
    /// Witness display name.
    pub witness: String,
    /// Witness personality tags.
    pub personality: Vec<String>,
    /// Actor display name.
    pub actor: String,
    /// What the actor did.
    pub description: String,
    /// Named area of the event.
    pub location: String,
    /// Distance in whole world units.
    pub distance: u32,
    /// Relationship label of the witness towards the actor.
    pub relationship: &'static str,
    /// Level 2 wording, "peripheral vision" or "obstructed view".
    pub framing: Option<&'static str>,
    /// Loudness band adjective.
    pub loudness: &'static str,
    /// Word for the sound.
    pub sound: &'static str,
    /// Compass direction of the sound.
    pub direction: &'static str,
    /// Event id to echo in the reply.
    pub event_id: String,
}

/// Renders witness prompts.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl std::fmt::Debug for PromptEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptEngine").finish_non_exhaustive()
    }
}

impl PromptEngine {
    /// Engine with the built-in templates.
    pub fn builtin() -> Result<Self, PromptError> {
        let mut env = Environment::new();
        for (name, source) in BUILTIN_TEMPLATES {
            env.add_template(name, source)
                .map_err(|source| PromptError::Template {
                    name: name.to_owned(),
                    source,
                })?;
        }
        Ok(Self { env })
    }

    /// Engine with the built-in templates, overridden by any same-named
    /// files in `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self, PromptError> {
        let mut engine = Self::builtin()?;
        let mut overridden = 0_usize;
        for (name, _) in BUILTIN_TEMPLATES {
            let path = dir.join(name);
            let source = match std::fs::read_to_string(&path) {
                Ok(source) => source,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(template = name, dir = %dir.display(), "no override; using built-in");
                    continue;
                }
                Err(source) => return Err(PromptError::Io { path, source }),
            };
            engine
                .env
                .add_template_owned(name, source)
                .map_err(|source| PromptError::Template {
                    name: name.to_owned(),
                    source,
                })?;
            overridden = overridden.saturating_add(1);
        }
        info!(dir = %dir.display(), overridden, "prompt templates loaded");
        Ok(engine)
    }

    /// Template used for a perception level; `None` for level 0.
    pub const fn template_for(level: PerceptionLevel) -> Option<&'static str> {
        match level {
            PerceptionLevel::Witnessed => Some(CLEAR_TEMPLATE),
            PerceptionLevel::Glimpsed => Some(PARTIAL_TEMPLATE),
            PerceptionLevel::Heard => Some(SOUND_TEMPLATE),
            PerceptionLevel::Unaware => None,
        }
    }

    /// Render the prompt for `level`. Level 0 renders nothing.
    pub fn render(
        &self,
        level: PerceptionLevel,
        context: &WitnessContext,
    ) -> Result<Option<String>, PromptError> {
        let Some(name) = Self::template_for(level) else {
            return Ok(None);
        };
        let wrap = |source| PromptError::Template {
            name: name.to_owned(),
            source,
        };
        let text = self
            .env
            .get_template(name)
            .map_err(wrap)?
            .render(context)
            .map_err(wrap)?;
        Ok(Some(text.trim().to_owned()))
    }
}
