use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

//
// ─── QUESTION KIND ─────────────────────────────────────────────────────────────
//

/// Answer-shape family of a question.
///
/// The engine only needs enough to know which mutation applies; everything
/// else about a question type (rendering, scoring) lives in its opaque
/// content blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Exactly one option may be selected at a time.
    SingleChoice,
    /// Any number of options may be selected.
    MultiChoice,
    /// Free-form text; structured answers are serialized into the text
    /// payload by a codec layer outside the engine.
    FreeText,
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// One attempt-scoped question: the answer state the candidate has built up,
/// plus the opaque content document the backend handed us.
///
/// `is_answered` is derived from answer content on every mutation and is
/// never writable on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    kind: QuestionKind,
    content: JsonValue,
    answer_option_indexes: Vec<usize>,
    answer_text: String,
    is_answered: bool,
    marked_for_review: bool,
    time_spent_secs: u32,
    correct: Option<bool>,
}

impl Question {
    /// Creates a fresh, unanswered question.
    #[must_use]
    pub fn new(kind: QuestionKind, content: JsonValue) -> Self {
        Self {
            kind,
            content,
            answer_option_indexes: Vec::new(),
            answer_text: String::new(),
            is_answered: false,
            marked_for_review: false,
            time_spent_secs: 0,
            correct: None,
        }
    }

    /// Rehydrates a question from a backend snapshot.
    ///
    /// The persisted answered flag is discarded: `is_answered` is always
    /// recomputed from the answer content, so a stale flag in the snapshot
    /// cannot drift out of sync. Duplicate option indexes are dropped,
    /// keeping first occurrences.
    #[must_use]
    pub fn from_snapshot(
        kind: QuestionKind,
        content: JsonValue,
        answer_option_indexes: Vec<usize>,
        answer_text: String,
        marked_for_review: bool,
        time_spent_secs: u32,
        correct: Option<bool>,
    ) -> Self {
        let mut seen = Vec::with_capacity(answer_option_indexes.len());
        for ix in answer_option_indexes {
            if !seen.contains(&ix) {
                seen.push(ix);
            }
        }

        let mut question = Self {
            kind,
            content,
            answer_option_indexes: seen,
            answer_text,
            is_answered: false,
            marked_for_review,
            time_spent_secs,
            correct,
        };
        question.recompute_answered();
        question
    }

    // Accessors

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    /// Opaque content document (question text, options, media references).
    #[must_use]
    pub fn content(&self) -> &JsonValue {
        &self.content
    }

    #[must_use]
    pub fn answer_option_indexes(&self) -> &[usize] {
        &self.answer_option_indexes
    }

    #[must_use]
    pub fn answer_text(&self) -> &str {
        &self.answer_text
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.is_answered
    }

    #[must_use]
    pub fn marked_for_review(&self) -> bool {
        self.marked_for_review
    }

    #[must_use]
    pub fn time_spent_secs(&self) -> u32 {
        self.time_spent_secs
    }

    /// Authoritative correctness, present only after the attempt was
    /// submitted and reloaded.
    #[must_use]
    pub fn correct(&self) -> Option<bool> {
        self.correct
    }

    // Mutation primitives. Attempt-level guards (status, active cursor)
    // live in the session that owns this question; these methods only
    // uphold the per-question invariants.

    /// Replaces the selection with a single option.
    pub fn replace_option_answer(&mut self, option_index: usize) {
        self.answer_option_indexes.clear();
        self.answer_option_indexes.push(option_index);
        self.recompute_answered();
    }

    /// Adds the option if absent, removes it if present.
    pub fn toggle_option_answer(&mut self, option_index: usize) {
        if let Some(pos) = self
            .answer_option_indexes
            .iter()
            .position(|ix| *ix == option_index)
        {
            self.answer_option_indexes.remove(pos);
        } else {
            self.answer_option_indexes.push(option_index);
        }
        self.recompute_answered();
    }

    /// Overwrites the text payload.
    pub fn set_text_answer(&mut self, value: impl Into<String>) {
        self.answer_text = value.into();
        self.recompute_answered();
    }

    /// Flips the review flag.
    pub fn toggle_review_flag(&mut self) {
        self.marked_for_review = !self.marked_for_review;
    }

    /// Accrues one second of active time.
    pub fn tick_time_spent(&mut self) {
        self.time_spent_secs = self.time_spent_secs.saturating_add(1);
    }

    fn recompute_answered(&mut self) {
        self.is_answered =
            !self.answer_option_indexes.is_empty() || !self.answer_text.trim().is_empty();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
