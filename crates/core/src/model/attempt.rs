use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::AttemptId;
use crate::model::question::Question;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("attempt has no sections")]
    NoSections,

    #[error("section {index} has no questions")]
    EmptySection { index: usize },
}

//
// ─── STATUS ENUMS ──────────────────────────────────────────────────────────────
//

/// Lifecycle status of an attempt. Terminal once it leaves `InProgress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    InProgress,
    Completed,
    Cancelled,
    Expired,
}

impl AttemptStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, AttemptStatus::InProgress)
    }
}

/// Advisory progress marker for a section. Not used for access control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// Whether the attempt runs the full exam ceremony (intro pages and
/// per-section instruction screens) or drops straight into questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    FullLength,
    Sectional,
}

//
// ─── RESUME METADATA ───────────────────────────────────────────────────────────
//

/// Coarse phase marker persisted alongside progress so a reload can
/// reconstruct the screen state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumePhase {
    Instructions,
    InSection,
    Review,
}

/// Persisted pointer for resuming an interrupted attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeMeta {
    pub phase: ResumePhase,
    pub section_index: usize,
    pub question_index: usize,
}

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

/// Aggregate statistics returned by the backend after submission.
///
/// Computed server-side; the engine only carries them to the results screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttemptResults {
    pub score: f64,
    pub max_score: f64,
    pub percentage: f64,
}

//
// ─── SECTION ───────────────────────────────────────────────────────────────────
//

/// A timed or untimed grouping of questions, navigated sequentially and
/// never revisited once left.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    title: String,
    duration_minutes: Option<u32>,
    status: SectionStatus,
    questions: Vec<Question>,
}

impl Section {
    /// Creates a section.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::EmptySection` if `questions` is empty. The
    /// caller supplies the section's position for the error message.
    pub fn new(
        title: impl Into<String>,
        duration_minutes: Option<u32>,
        status: SectionStatus,
        questions: Vec<Question>,
        index: usize,
    ) -> Result<Self, AttemptError> {
        if questions.is_empty() {
            return Err(AttemptError::EmptySection { index });
        }
        Ok(Self {
            title: title.into(),
            duration_minutes,
            status,
            questions,
        })
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// `None` means untimed: no countdown and no expiry transition.
    #[must_use]
    pub fn duration_minutes(&self) -> Option<u32> {
        self.duration_minutes
    }

    #[must_use]
    pub fn is_timed(&self) -> bool {
        self.duration_minutes.is_some()
    }

    #[must_use]
    pub fn status(&self) -> SectionStatus {
        self.status
    }

    pub fn set_status(&mut self, status: SectionStatus) {
        self.status = status;
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn question_mut(&mut self, index: usize) -> Option<&mut Question> {
        self.questions.get_mut(index)
    }

    /// Seconds already spent across all questions of this section.
    #[must_use]
    pub fn time_spent_secs(&self) -> u64 {
        self.questions
            .iter()
            .map(|q| u64::from(q.time_spent_secs()))
            .sum()
    }
}

//
// ─── ATTEMPT ───────────────────────────────────────────────────────────────────
//

/// The root aggregate for one test-taking session.
///
/// Section order is exam-defined and fixed for the attempt's lifetime.
/// Wall-clock counters only move while the attempt is `InProgress`; after
/// submission the backend snapshot is authoritative and the aggregate is
/// treated as immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    id: AttemptId,
    kind: TestKind,
    status: AttemptStatus,
    sections: Vec<Section>,
    total_time_used_secs: u64,
    resume_meta: Option<ResumeMeta>,
    results: Option<AttemptResults>,
    started_at: DateTime<Utc>,
}

impl Attempt {
    /// Assembles an attempt from a backend detail snapshot.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::NoSections` for an empty section list; a
    /// sectionless attempt cannot be run and is fatal to the session.
    #[allow(clippy::too_many_arguments)]
    pub fn from_detail(
        id: AttemptId,
        kind: TestKind,
        status: AttemptStatus,
        sections: Vec<Section>,
        total_time_used_secs: u64,
        resume_meta: Option<ResumeMeta>,
        results: Option<AttemptResults>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, AttemptError> {
        if sections.is_empty() {
            return Err(AttemptError::NoSections);
        }
        Ok(Self {
            id,
            kind,
            status,
            sections,
            total_time_used_secs,
            resume_meta,
            results,
            started_at,
        })
    }

    // Accessors

    #[must_use]
    pub fn id(&self) -> AttemptId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> TestKind {
        self.kind
    }

    #[must_use]
    pub fn status(&self) -> AttemptStatus {
        self.status
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.status == AttemptStatus::InProgress
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub fn section_mut(&mut self, index: usize) -> Option<&mut Section> {
        self.sections.get_mut(index)
    }

    #[must_use]
    pub fn question(&self, section_index: usize, question_index: usize) -> Option<&Question> {
        self.sections.get(section_index)?.question(question_index)
    }

    pub fn question_mut(
        &mut self,
        section_index: usize,
        question_index: usize,
    ) -> Option<&mut Question> {
        self.sections
            .get_mut(section_index)?
            .question_mut(question_index)
    }

    #[must_use]
    pub fn total_time_used_secs(&self) -> u64 {
        self.total_time_used_secs
    }

    /// Accrues one second of total attempt time. Only meaningful while
    /// `InProgress`; callers guard on status before ticking.
    pub fn tick_total_time(&mut self) {
        self.total_time_used_secs = self.total_time_used_secs.saturating_add(1);
    }

    #[must_use]
    pub fn resume_meta(&self) -> Option<ResumeMeta> {
        self.resume_meta
    }

    #[must_use]
    pub fn results(&self) -> Option<AttemptResults> {
        self.results
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Position of the first unanswered question, scanning sections and
    /// questions in order. `None` when everything is answered.
    #[must_use]
    pub fn first_unanswered(&self) -> Option<(usize, usize)> {
        for (s, section) in self.sections.iter().enumerate() {
            for (q, question) in section.questions().iter().enumerate() {
                if !question.is_answered() {
                    return Some((s, q));
                }
            }
        }
        None
    }

    /// Cursor of the last question of the last section.
    #[must_use]
    pub fn last_position(&self) -> (usize, usize) {
        let s = self.sections.len().saturating_sub(1);
        let q = self.sections[s].question_count().saturating_sub(1);
        (s, q)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::QuestionKind;
    use crate::time::fixed_now;
    use serde_json::json;
    use uuid::Uuid;

    fn question() -> Question {
        Question::new(QuestionKind::SingleChoice, json!({"prompt": "?"}))
    }

    fn attempt_id() -> AttemptId {
        AttemptId::new(Uuid::from_u128(7))
    }

    fn two_section_attempt() -> Attempt {
        let sections = vec![
            Section::new(
                "Reading",
                Some(10),
                SectionStatus::NotStarted,
                vec![question(), question()],
                0,
            )
            .unwrap(),
            Section::new(
                "Writing",
                None,
                SectionStatus::NotStarted,
                vec![question()],
                1,
            )
            .unwrap(),
        ];
        Attempt::from_detail(
            attempt_id(),
            TestKind::FullLength,
            AttemptStatus::InProgress,
            sections,
            0,
            None,
            None,
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn zero_sections_is_a_load_error() {
        let err = Attempt::from_detail(
            attempt_id(),
            TestKind::FullLength,
            AttemptStatus::InProgress,
            Vec::new(),
            0,
            None,
            None,
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, AttemptError::NoSections);
    }

    #[test]
    fn empty_section_is_a_load_error() {
        let err = Section::new("Empty", None, SectionStatus::NotStarted, Vec::new(), 3).unwrap_err();
        assert_eq!(err, AttemptError::EmptySection { index: 3 });
    }

    #[test]
    fn first_unanswered_scans_in_order() {
        let mut attempt = two_section_attempt();
        assert_eq!(attempt.first_unanswered(), Some((0, 0)));

        attempt
            .question_mut(0, 0)
            .unwrap()
            .replace_option_answer(1);
        assert_eq!(attempt.first_unanswered(), Some((0, 1)));

        attempt
            .question_mut(0, 1)
            .unwrap()
            .replace_option_answer(0);
        attempt.question_mut(1, 0).unwrap().set_text_answer("done");
        assert_eq!(attempt.first_unanswered(), None);
        assert_eq!(attempt.last_position(), (1, 0));
    }

    #[test]
    fn section_time_sums_question_time() {
        let mut attempt = two_section_attempt();
        for _ in 0..3 {
            attempt.question_mut(0, 0).unwrap().tick_time_spent();
        }
        attempt.question_mut(0, 1).unwrap().tick_time_spent();
        assert_eq!(attempt.section(0).unwrap().time_spent_secs(), 4);
        assert_eq!(attempt.section(1).unwrap().time_spent_secs(), 0);
    }

    #[test]
    fn total_time_is_monotonic() {
        let mut attempt = two_section_attempt();
        attempt.tick_total_time();
        attempt.tick_total_time();
        assert_eq!(attempt.total_time_used_secs(), 2);
    }

    #[test]
    fn terminal_statuses() {
        assert!(!AttemptStatus::InProgress.is_terminal());
        assert!(AttemptStatus::Completed.is_terminal());
        assert!(AttemptStatus::Cancelled.is_terminal());
        assert!(AttemptStatus::Expired.is_terminal());
    }
}
