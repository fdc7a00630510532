use std::fmt;

use exam_core::model::{Attempt, Question, Section, SectionStatus};

use super::progress::AttemptProgress;

//
// ─── ATTEMPT SESSION ───────────────────────────────────────────────────────────
//

/// In-memory state for one running attempt: the aggregate plus the cursor
/// naming the single active question.
///
/// Owns all mutation of attempt data. Every mutator is a guarded no-op
/// rather than an error: a user action can race a just-completed
/// submission, and dropping the mutation silently is the safe outcome.
pub struct AttemptSession {
    attempt: Attempt,
    section_ix: usize,
    question_ix: usize,
}

impl AttemptSession {
    /// Wraps a freshly loaded attempt with the cursor at the first
    /// question. Screen-flow initialization repositions the cursor from
    /// resume metadata before anything is shown.
    #[must_use]
    pub fn new(attempt: Attempt) -> Self {
        Self {
            attempt,
            section_ix: 0,
            question_ix: 0,
        }
    }

    #[must_use]
    pub fn attempt(&self) -> &Attempt {
        &self.attempt
    }

    #[must_use]
    pub fn section_index(&self) -> usize {
        self.section_ix
    }

    #[must_use]
    pub fn question_index(&self) -> usize {
        self.question_ix
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.attempt.is_in_progress()
    }

    #[must_use]
    pub fn active_section(&self) -> Option<&Section> {
        self.attempt.section(self.section_ix)
    }

    /// The question at the cursor, or `None` when the cursor is out of
    /// range (a stale resume pointer, or no attempt content).
    #[must_use]
    pub fn active_question(&self) -> Option<&Question> {
        self.attempt.question(self.section_ix, self.question_ix)
    }

    /// Moves the cursor if the target question exists. Returns whether it
    /// moved.
    pub(crate) fn set_cursor(&mut self, section_ix: usize, question_ix: usize) -> bool {
        if self.attempt.question(section_ix, question_ix).is_some() {
            self.section_ix = section_ix;
            self.question_ix = question_ix;
            true
        } else {
            false
        }
    }

    pub(crate) fn mark_active_section(&mut self, status: SectionStatus) {
        if let Some(section) = self.attempt.section_mut(self.section_ix) {
            section.set_status(status);
        }
    }

    /// Replaces the aggregate after an authoritative reload (submission).
    /// The cursor is clamped back to the first question.
    pub(crate) fn replace_attempt(&mut self, attempt: Attempt) {
        self.attempt = attempt;
        self.section_ix = 0;
        self.question_ix = 0;
    }

    // Guarded mutators. All of them are silent no-ops unless the attempt
    // is in progress and the cursor points at a real question.

    fn active_question_mut(&mut self) -> Option<&mut Question> {
        if !self.attempt.is_in_progress() {
            return None;
        }
        self.attempt.question_mut(self.section_ix, self.question_ix)
    }

    /// Single-select: replaces the selection with `option_index`.
    pub fn set_option_answer(&mut self, option_index: usize) {
        if let Some(question) = self.active_question_mut() {
            question.replace_option_answer(option_index);
        }
    }

    /// Multi-select: adds the option if absent, removes it if present.
    pub fn toggle_option_answer(&mut self, option_index: usize) {
        if let Some(question) = self.active_question_mut() {
            question.toggle_option_answer(option_index);
        }
    }

    /// Overwrites the free-text payload.
    pub fn set_text_answer(&mut self, value: impl Into<String>) {
        if let Some(question) = self.active_question_mut() {
            question.set_text_answer(value);
        }
    }

    /// Flips the review flag of the active question.
    pub fn toggle_review_flag(&mut self) {
        if let Some(question) = self.active_question_mut() {
            question.toggle_review_flag();
        }
    }

    /// Accrues one second on the active question and on the attempt
    /// total. Callers route this through the section timer so it only
    /// fires while the countdown is running.
    pub fn tick_active_question_time(&mut self) {
        let Some(question) = self.active_question_mut() else {
            return;
        };
        question.tick_time_spent();
        self.attempt.tick_total_time();
    }

    /// Returns a summary of the current attempt progress.
    #[must_use]
    pub fn progress(&self) -> AttemptProgress {
        let (section_total, section_answered, section_marked) = self
            .active_section()
            .map(|section| {
                let answered = section.questions().iter().filter(|q| q.is_answered()).count();
                let marked = section
                    .questions()
                    .iter()
                    .filter(|q| q.marked_for_review())
                    .count();
                (section.question_count(), answered, marked)
            })
            .unwrap_or((0, 0, 0));

        let overall_total = self
            .attempt
            .sections()
            .iter()
            .map(Section::question_count)
            .sum();
        let overall_answered = self
            .attempt
            .sections()
            .iter()
            .flat_map(Section::questions)
            .filter(|q| q.is_answered())
            .count();

        AttemptProgress {
            section_total,
            section_answered,
            section_marked,
            overall_total,
            overall_answered,
        }
    }
}

impl fmt::Debug for AttemptSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttemptSession")
            .field("attempt_id", &self.attempt.id())
            .field("status", &self.attempt.status())
            .field("section_ix", &self.section_ix)
            .field("question_ix", &self.question_ix)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempts::testutil::{attempt_with, timed_section, untimed_section};
    use exam_core::model::AttemptStatus;

    fn session() -> AttemptSession {
        AttemptSession::new(attempt_with(vec![
            timed_section("Reading", 10, 2),
            untimed_section("Writing", 1),
        ]))
    }

    #[test]
    fn answer_mutators_keep_is_answered_in_sync() {
        let mut session = session();

        session.set_option_answer(2);
        assert!(session.active_question().unwrap().is_answered());
        assert_eq!(
            session.active_question().unwrap().answer_option_indexes(),
            &[2]
        );

        session.toggle_option_answer(2);
        assert!(!session.active_question().unwrap().is_answered());

        session.set_text_answer("  ");
        assert!(!session.active_question().unwrap().is_answered());
        session.set_text_answer("essay");
        assert!(session.active_question().unwrap().is_answered());
    }

    #[test]
    fn mutators_are_no_ops_once_attempt_is_terminal() {
        let attempt = crate::attempts::testutil::attempt_with_status(
            vec![timed_section("Reading", 10, 2)],
            AttemptStatus::Completed,
        );
        let mut session = AttemptSession::new(attempt);
        let before = session.attempt().clone();

        session.set_option_answer(0);
        session.toggle_option_answer(1);
        session.set_text_answer("late");
        session.toggle_review_flag();
        session.tick_active_question_time();

        assert_eq!(session.attempt(), &before);
    }

    #[test]
    fn mutators_are_no_ops_on_out_of_range_cursor() {
        let mut session = session();
        session.section_ix = 9;
        let before = session.attempt().clone();

        session.set_text_answer("lost");
        session.tick_active_question_time();

        assert_eq!(session.attempt(), &before);
        assert!(session.active_question().is_none());
    }

    #[test]
    fn ticking_accrues_question_and_total_time() {
        let mut session = session();
        session.tick_active_question_time();
        session.tick_active_question_time();

        assert_eq!(session.active_question().unwrap().time_spent_secs(), 2);
        assert_eq!(session.attempt().total_time_used_secs(), 2);

        session.set_cursor(0, 1);
        session.tick_active_question_time();
        assert_eq!(session.active_question().unwrap().time_spent_secs(), 1);
        assert_eq!(session.attempt().total_time_used_secs(), 3);
    }

    #[test]
    fn progress_counts_section_and_overall() {
        let mut session = session();
        session.set_option_answer(0);
        session.toggle_review_flag();
        session.set_cursor(1, 0);
        session.set_text_answer("done");

        let progress = session.progress();
        assert_eq!(progress.section_total, 1);
        assert_eq!(progress.section_answered, 1);
        assert_eq!(progress.section_marked, 0);
        assert_eq!(progress.overall_total, 3);
        assert_eq!(progress.overall_answered, 2);
    }

    #[test]
    fn cursor_refuses_invalid_targets() {
        let mut session = session();
        assert!(!session.set_cursor(5, 0));
        assert!(!session.set_cursor(0, 9));
        assert_eq!(session.section_index(), 0);
        assert!(session.set_cursor(1, 0));
    }
}
