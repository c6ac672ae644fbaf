//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every entity the simulation tracks has a strongly-typed ID so that a
//! character id can never be passed where an event id is expected. New ids
//! are UUID v7, so ids minted later sort later.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Declares a `Uuid` newtype that prints and parses as a bare UUID.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(transparent)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Mint a fresh time-ordered id.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl core::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

define_id! {
    /// Unique identifier for a character in the office.
    CharacterId
}

define_id! {
    /// Unique identifier for a world event in the event log.
    ///
    /// Witness prompts and the responses to them carry this id so a
    /// reaction can be correlated with the event that caused it.
    EventId
}

define_id! {
    /// Unique identifier for a conversation transcript.
    ConversationId
}
