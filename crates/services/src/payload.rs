//! Codec layer for structured answers carried in the opaque text payload.
//!
//! Several question types need more than a flat string (blank-fill maps,
//! orderings). The engine itself never inspects `answer_text`; widgets
//! encode one of these tagged payloads before `set_text_answer` and decode
//! after load. Swapping the wire shape touches only this module.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PayloadError {
    #[error("malformed answer payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Structured answer shapes that ride inside `answer_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnswerPayload {
    /// Plain free text.
    Text { value: String },
    /// Blank id → chosen word. `BTreeMap` keeps the encoding stable, so
    /// identical answers always serialize identically.
    Blanks { entries: BTreeMap<String, String> },
    /// Reordering answers: option indexes in chosen order.
    Ordering { order: Vec<usize> },
}

impl AnswerPayload {
    /// Serializes the payload for `set_text_answer`.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError::Malformed` if serialization fails.
    pub fn encode(&self) -> Result<String, PayloadError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a payload previously produced by `encode`.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError::Malformed` for anything else.
    pub fn decode(raw: &str) -> Result<Self, PayloadError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// True when the payload carries no actual answer content. Widgets
    /// clear `answer_text` instead of encoding an empty payload, so an
    /// empty answer never counts as answered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerPayload::Text { value } => value.trim().is_empty(),
            AnswerPayload::Blanks { entries } => {
                entries.values().all(|word| word.trim().is_empty())
            }
            AnswerPayload::Ordering { order } => order.is_empty(),
        }
    }
}
