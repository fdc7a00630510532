use exam_core::model::{ResumePhase, SectionStatus, TestKind};

use super::store::AttemptSession;
use super::sync::SaveIntent;

//
// ─── SCREEN ────────────────────────────────────────────────────────────────────
//

/// The screen currently presented to the candidate.
///
/// A closed variant set so every transition is an exhaustive match; the
/// source of truth for what the UI renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Intro,
    SectionInstructions,
    Question,
    SectionReview,
    Results,
}

/// Outcome of confirming a section review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfirmAction {
    /// Moved into the next section; persist the given intent.
    NextSection(SaveIntent),
    /// Last section confirmed; the attempt should be submitted.
    Submit,
    /// Called outside `SectionReview`; nothing happened.
    Ignored,
}

//
// ─── SCREEN FLOW ───────────────────────────────────────────────────────────────
//

/// Finite-state machine governing screen presentation and the legal
/// transitions between screens.
///
/// Forward/backward movement inside a section is free; a section boundary
/// is one-way. Once a review is confirmed, the prior section's screens are
/// unreachable for the remainder of the attempt (there is no operation
/// that decreases the section cursor).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenFlow {
    screen: Screen,
}

impl ScreenFlow {
    /// Derives the initial screen from a freshly loaded attempt and
    /// positions the session cursor.
    ///
    /// A terminal attempt goes straight to results. An in-progress attempt
    /// resumes from its metadata when the pointer is still valid; a stale
    /// or absent pointer falls back to the first unanswered question (or
    /// the last question when everything is answered).
    #[must_use]
    pub fn init(session: &mut AttemptSession) -> Self {
        if !session.is_in_progress() {
            return Self {
                screen: Screen::Results,
            };
        }

        if let Some(meta) = session.attempt().resume_meta()
            && session.set_cursor(meta.section_index, meta.question_index)
        {
            let screen = match meta.phase {
                ResumePhase::InSection => Screen::Question,
                ResumePhase::Review => Screen::SectionReview,
                // Pre-section pointer: full-length tests restart their
                // ceremony from the intro pages.
                ResumePhase::Instructions => match session.attempt().kind() {
                    TestKind::FullLength => Screen::Intro,
                    TestKind::Sectional => Screen::Question,
                },
            };
            if screen == Screen::Question {
                session.mark_active_section(SectionStatus::InProgress);
            }
            return Self { screen };
        }

        // Best-effort fallback: no (usable) resume pointer yet.
        let (section_ix, question_ix) = session
            .attempt()
            .first_unanswered()
            .unwrap_or_else(|| session.attempt().last_position());
        session.set_cursor(section_ix, question_ix);
        Self {
            screen: Screen::Intro,
        }
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Leaves the intro pages. Full-length tests get per-section
    /// instructions first; sectional tests drop straight into questions.
    pub fn finish_intro(&mut self, session: &mut AttemptSession) {
        if self.screen != Screen::Intro {
            return;
        }
        self.screen = match session.attempt().kind() {
            TestKind::FullLength => Screen::SectionInstructions,
            TestKind::Sectional => {
                session.mark_active_section(SectionStatus::InProgress);
                Screen::Question
            }
        };
    }

    /// "Start Section" on the instruction screen.
    pub fn start_section(&mut self, session: &mut AttemptSession) {
        if self.screen != Screen::SectionInstructions {
            return;
        }
        session.mark_active_section(SectionStatus::InProgress);
        self.screen = Screen::Question;
    }

    /// Moves to the next question, or into section review past the last
    /// one. Returns what should be persisted for this step.
    pub fn advance(&mut self, session: &mut AttemptSession) -> Option<SaveIntent> {
        if self.screen != Screen::Question || !session.is_in_progress() {
            return None;
        }
        let section_ix = session.section_index();
        let question_ix = session.question_index();
        let count = session.active_section().map_or(0, |s| s.question_count());

        if question_ix + 1 < count {
            session.set_cursor(section_ix, question_ix + 1);
            Some(SaveIntent {
                snapshot_at: (section_ix, question_ix),
                phase: ResumePhase::InSection,
                resume_at: (section_ix, question_ix + 1),
            })
        } else {
            self.screen = Screen::SectionReview;
            Some(SaveIntent {
                snapshot_at: (section_ix, question_ix),
                phase: ResumePhase::Review,
                resume_at: (section_ix, question_ix),
            })
        }
    }

    /// Moves one question back, bounded by the start of the section. Never
    /// crosses a section boundary.
    pub fn back(&mut self, session: &mut AttemptSession) {
        if self.screen != Screen::Question || !session.is_in_progress() {
            return;
        }
        let question_ix = session.question_index();
        if question_ix > 0 {
            session.set_cursor(session.section_index(), question_ix - 1);
        }
    }

    /// Timer expiry forces the review screen regardless of answer state.
    /// The timer has already stopped; nothing is persisted here.
    pub fn handle_expiry(&mut self) {
        if self.screen == Screen::Question {
            self.screen = Screen::SectionReview;
        }
    }

    /// Confirms the review screen: advances into the next section, or
    /// requests submission after the last one.
    pub(crate) fn confirm_section(&mut self, session: &mut AttemptSession) -> ConfirmAction {
        if self.screen != Screen::SectionReview || !session.is_in_progress() {
            return ConfirmAction::Ignored;
        }
        let section_ix = session.section_index();
        if section_ix + 1 >= session.attempt().section_count() {
            return ConfirmAction::Submit;
        }

        session.mark_active_section(SectionStatus::Completed);
        session.set_cursor(section_ix + 1, 0);
        session.mark_active_section(SectionStatus::InProgress);
        self.screen = Screen::Question;
        ConfirmAction::NextSection(SaveIntent {
            snapshot_at: (section_ix + 1, 0),
            phase: ResumePhase::InSection,
            resume_at: (section_ix + 1, 0),
        })
    }

    /// Submission succeeded; the attempt is final.
    pub(crate) fn complete(&mut self) {
        self.screen = Screen::Results;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempts::testutil::{
        attempt_full, attempt_with, attempt_with_status, timed_section, untimed_section,
    };
    use exam_core::model::{AttemptStatus, ResumeMeta};

    fn two_sections() -> AttemptSession {
        AttemptSession::new(attempt_with(vec![
            timed_section("Reading", 10, 2),
            untimed_section("Writing", 2),
        ]))
    }

    #[test]
    fn completed_attempt_initializes_to_results() {
        let mut session = AttemptSession::new(attempt_with_status(
            vec![timed_section("S", 5, 1)],
            AttemptStatus::Completed,
        ));
        let flow = ScreenFlow::init(&mut session);
        assert_eq!(flow.screen(), Screen::Results);
    }

    #[test]
    fn resume_meta_lands_directly_in_section() {
        let meta = ResumeMeta {
            phase: ResumePhase::InSection,
            section_index: 1,
            question_index: 1,
        };
        let mut session = AttemptSession::new(attempt_full(
            TestKind::FullLength,
            AttemptStatus::InProgress,
            vec![timed_section("A", 5, 2), untimed_section("B", 2)],
            Some(meta),
        ));
        let flow = ScreenFlow::init(&mut session);

        assert_eq!(flow.screen(), Screen::Question);
        assert_eq!(session.section_index(), 1);
        assert_eq!(session.question_index(), 1);
        assert_eq!(
            session.active_section().unwrap().status(),
            SectionStatus::InProgress
        );
    }

    #[test]
    fn resume_meta_review_lands_on_review_screen() {
        let meta = ResumeMeta {
            phase: ResumePhase::Review,
            section_index: 0,
            question_index: 1,
        };
        let mut session = AttemptSession::new(attempt_full(
            TestKind::FullLength,
            AttemptStatus::InProgress,
            vec![timed_section("A", 5, 2)],
            Some(meta),
        ));
        let flow = ScreenFlow::init(&mut session);
        assert_eq!(flow.screen(), Screen::SectionReview);
    }

    #[test]
    fn resume_meta_instructions_depends_on_test_kind() {
        let meta = ResumeMeta {
            phase: ResumePhase::Instructions,
            section_index: 0,
            question_index: 0,
        };
        let mut full = AttemptSession::new(attempt_full(
            TestKind::FullLength,
            AttemptStatus::InProgress,
            vec![timed_section("A", 5, 2)],
            Some(meta),
        ));
        assert_eq!(ScreenFlow::init(&mut full).screen(), Screen::Intro);

        let mut sectional = AttemptSession::new(attempt_full(
            TestKind::Sectional,
            AttemptStatus::InProgress,
            vec![timed_section("A", 5, 2)],
            Some(meta),
        ));
        assert_eq!(ScreenFlow::init(&mut sectional).screen(), Screen::Question);
    }

    #[test]
    fn stale_resume_meta_falls_back_to_first_unanswered() {
        let meta = ResumeMeta {
            phase: ResumePhase::InSection,
            section_index: 7,
            question_index: 0,
        };
        let mut session = AttemptSession::new(attempt_full(
            TestKind::FullLength,
            AttemptStatus::InProgress,
            vec![timed_section("A", 5, 2)],
            Some(meta),
        ));
        let flow = ScreenFlow::init(&mut session);
        assert_eq!(flow.screen(), Screen::Intro);
        assert_eq!(session.section_index(), 0);
        assert_eq!(session.question_index(), 0);
    }

    #[test]
    fn no_meta_scans_for_first_unanswered() {
        let mut attempt = attempt_with(vec![timed_section("A", 5, 2), untimed_section("B", 2)]);
        attempt.question_mut(0, 0).unwrap().replace_option_answer(0);
        attempt.question_mut(0, 1).unwrap().replace_option_answer(1);
        let mut session = AttemptSession::new(attempt);

        let flow = ScreenFlow::init(&mut session);
        assert_eq!(flow.screen(), Screen::Intro);
        assert_eq!(session.section_index(), 1);
        assert_eq!(session.question_index(), 0);
    }

    #[test]
    fn fully_answered_attempt_positions_at_last_question() {
        let mut attempt = attempt_with(vec![timed_section("A", 5, 2)]);
        attempt.question_mut(0, 0).unwrap().replace_option_answer(0);
        attempt.question_mut(0, 1).unwrap().replace_option_answer(0);
        let mut session = AttemptSession::new(attempt);

        ScreenFlow::init(&mut session);
        assert_eq!(session.question_index(), 1);
    }

    #[test]
    fn intro_path_for_each_test_kind() {
        let mut full = two_sections();
        let mut flow = ScreenFlow::init(&mut full);
        flow.finish_intro(&mut full);
        assert_eq!(flow.screen(), Screen::SectionInstructions);
        flow.start_section(&mut full);
        assert_eq!(flow.screen(), Screen::Question);

        let mut sectional = AttemptSession::new(attempt_full(
            TestKind::Sectional,
            AttemptStatus::InProgress,
            vec![timed_section("A", 5, 2)],
            None,
        ));
        let mut flow = ScreenFlow::init(&mut sectional);
        flow.finish_intro(&mut sectional);
        assert_eq!(flow.screen(), Screen::Question);
    }

    #[test]
    fn advance_moves_within_section_then_into_review() {
        let mut session = two_sections();
        let mut flow = ScreenFlow::init(&mut session);
        flow.finish_intro(&mut session);
        flow.start_section(&mut session);

        let intent = flow.advance(&mut session).unwrap();
        assert_eq!(flow.screen(), Screen::Question);
        assert_eq!(session.question_index(), 1);
        assert_eq!(intent.phase, ResumePhase::InSection);
        assert_eq!(intent.snapshot_at, (0, 0));
        assert_eq!(intent.resume_at, (0, 1));

        let intent = flow.advance(&mut session).unwrap();
        assert_eq!(flow.screen(), Screen::SectionReview);
        assert_eq!(intent.phase, ResumePhase::Review);
        assert_eq!(intent.snapshot_at, (0, 1));
    }

    #[test]
    fn back_is_bounded_by_section_start() {
        let mut session = two_sections();
        let mut flow = ScreenFlow::init(&mut session);
        flow.finish_intro(&mut session);
        flow.start_section(&mut session);
        flow.advance(&mut session);

        flow.back(&mut session);
        assert_eq!(session.question_index(), 0);
        flow.back(&mut session);
        assert_eq!(session.question_index(), 0);
        assert_eq!(session.section_index(), 0);
    }

    #[test]
    fn confirm_moves_to_next_section_one_way() {
        let mut session = two_sections();
        let mut flow = ScreenFlow::init(&mut session);
        flow.finish_intro(&mut session);
        flow.start_section(&mut session);
        flow.advance(&mut session);
        flow.advance(&mut session);
        assert_eq!(flow.screen(), Screen::SectionReview);

        let action = flow.confirm_section(&mut session);
        let ConfirmAction::NextSection(intent) = action else {
            panic!("expected next-section action");
        };
        assert_eq!(flow.screen(), Screen::Question);
        assert_eq!(session.section_index(), 1);
        assert_eq!(session.question_index(), 0);
        assert_eq!(intent.resume_at, (1, 0));
        assert_eq!(
            session.attempt().section(0).unwrap().status(),
            SectionStatus::Completed
        );

        // No operation moves the cursor back across the boundary.
        flow.back(&mut session);
        assert_eq!(session.section_index(), 1);
        assert_eq!(session.question_index(), 0);
    }

    #[test]
    fn confirm_on_last_section_requests_submit() {
        let mut session = AttemptSession::new(attempt_with(vec![timed_section("A", 5, 1)]));
        let mut flow = ScreenFlow::init(&mut session);
        flow.finish_intro(&mut session);
        flow.start_section(&mut session);
        flow.advance(&mut session);
        assert_eq!(flow.screen(), Screen::SectionReview);

        assert_eq!(flow.confirm_section(&mut session), ConfirmAction::Submit);
        // Screen is unchanged until submission succeeds.
        assert_eq!(flow.screen(), Screen::SectionReview);
    }

    #[test]
    fn expiry_forces_review_exactly_from_question() {
        let mut session = two_sections();
        let mut flow = ScreenFlow::init(&mut session);
        flow.finish_intro(&mut session);
        flow.start_section(&mut session);

        flow.handle_expiry();
        assert_eq!(flow.screen(), Screen::SectionReview);

        // Further expiry notifications change nothing.
        flow.handle_expiry();
        assert_eq!(flow.screen(), Screen::SectionReview);
    }

    #[test]
    fn transitions_outside_their_source_screen_are_ignored() {
        let mut session = two_sections();
        let mut flow = ScreenFlow::init(&mut session);

        // Still on intro: question-screen operations do nothing.
        assert!(flow.advance(&mut session).is_none());
        flow.back(&mut session);
        flow.start_section(&mut session);
        assert_eq!(flow.screen(), Screen::Intro);
        assert_eq!(flow.confirm_section(&mut session), ConfirmAction::Ignored);
    }
}
