//! Witness response parsing.
//!
//! The decision layer is asked for a single JSON object tagged `ACTION` or
//! `DIALOGUE`. What comes back is often less tidy, so parsing tries, in
//! order: the raw text, the contents of a markdown code block, and each of
//! those again with trailing commas removed. The tag is matched without
//! regard to case, and a few common field-name variants are accepted.

use officelife_types::{EventId, WitnessResponse};
use serde_json::Value;

/// Why a response could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponseError {
    /// No JSON object could be recovered from the text.
    #[error("response is not a JSON object")]
    NotJson,

    /// The object carries no response type tag.
    #[error("response has no type tag")]
    MissingType,

    /// The type tag is neither `ACTION` nor `DIALOGUE`.
    #[error("unknown response type: {0}")]
    UnknownType(String),

    /// The payload field for the tagged type is missing or empty.
    #[error("{kind} response is missing its {field}")]
    MissingField {
        /// The response type.
        kind: &'static str,
        /// The expected field.
        field: &'static str,
    },
}

const TYPE_KEYS: [&str; 3] = ["type", "response_type", "kind"];
const ACTION_KEYS: [&str; 3] = ["action", "content", "text"];
const DIALOGUE_KEYS: [&str; 4] = ["line", "dialogue", "content", "text"];

/// Parse raw decision-layer output into a [`WitnessResponse`].
pub fn parse_witness_response(raw: &str) -> Result<WitnessResponse, ResponseError> {
    let object = recover_object(raw).ok_or(ResponseError::NotJson)?;
    let tag = TYPE_KEYS
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
        .ok_or(ResponseError::MissingType)?;
    let event_id = object
        .get("event_id")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<EventId>().ok());

    match tag.trim().to_ascii_uppercase().as_str() {
        "ACTION" => {
            let action = first_text(&object, &ACTION_KEYS).ok_or(ResponseError::MissingField {
                kind: "ACTION",
                field: "action",
            })?;
            Ok(WitnessResponse::Action { event_id, action })
        }
        "DIALOGUE" | "SPEECH" | "SAY" => {
            let line = first_text(&object, &DIALOGUE_KEYS).ok_or(ResponseError::MissingField {
                kind: "DIALOGUE",
                field: "line",
            })?;
            Ok(WitnessResponse::Dialogue { event_id, line })
        }
        _ => Err(ResponseError::UnknownType(tag.to_owned())),
    }
}

/// Try each recovery strategy until one yields a JSON object.
fn recover_object(raw: &str) -> Option<serde_json::Map<String, Value>> {
    let trimmed = raw.trim();
    let block = extract_code_block(trimmed);
    let candidates = [Some(trimmed.to_owned()), block.map(str::to_owned)];
    candidates
        .iter()
        .flatten()
        .flat_map(|text| [text.clone(), strip_trailing_commas(text)])
        .find_map(|text| match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        })
}

/// First non-empty string among `keys`, trimmed.
fn first_text(object: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_owned)
}

/// The body of the first fenced code block, with any language tag dropped.
fn extract_code_block(text: &str) -> Option<&str> {
    let (_, after_fence) = text.split_once("```")?;
    // Skip the info string (e.g. `json`) up to the end of the fence line.
    let body = match after_fence.split_once('\n') {
        Some((info, rest)) if !info.trim_start().starts_with('{') => rest,
        _ => after_fence,
    };
    let (inner, _) = body.split_once("```")?;
    Some(inner.trim())
}

/// Remove commas that directly precede `}` or `]`, outside string literals.
fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        if c == '"' {
            in_string = true;
        }
        if c == ',' {
            let rest = chars.clone().find(|n| !n.is_whitespace());
            if matches!(rest, Some('}' | ']')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}
