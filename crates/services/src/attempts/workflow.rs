use std::sync::Arc;

use client::ExamApi;
use exam_core::Clock;
use exam_core::model::{AttemptId, ResumePhase, TestTemplateId};

use super::progress::AttemptProgress;
use super::screen::{ConfirmAction, Screen, ScreenFlow};
use super::store::AttemptSession;
use super::sync::{ProgressSyncService, SaveIntent};
use super::timer::{SectionTimer, TimerTick};
use crate::error::FlowError;

//
// ─── RUNNER ────────────────────────────────────────────────────────────────────
//

/// One loaded attempt, ready to drive: session state, screen flow, and the
/// section countdown, kept consistent by `AttemptFlowService`.
#[derive(Debug)]
pub struct AttemptRunner {
    session: AttemptSession,
    flow: ScreenFlow,
    timer: SectionTimer,
}

impl AttemptRunner {
    fn new(mut session: AttemptSession) -> Self {
        let flow = ScreenFlow::init(&mut session);
        let timer = SectionTimer::recompute(&session, flow.screen());
        Self {
            session,
            flow,
            timer,
        }
    }

    #[must_use]
    pub fn session(&self) -> &AttemptSession {
        &self.session
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.flow.screen()
    }

    #[must_use]
    pub fn timer(&self) -> &SectionTimer {
        &self.timer
    }

    #[must_use]
    pub fn progress(&self) -> AttemptProgress {
        self.session.progress()
    }

    // Answer mutation passes straight through to the guarded session; no
    // network traffic until the next navigation.

    pub fn set_option_answer(&mut self, option_index: usize) {
        self.session.set_option_answer(option_index);
    }

    pub fn toggle_option_answer(&mut self, option_index: usize) {
        self.session.toggle_option_answer(option_index);
    }

    pub fn set_text_answer(&mut self, value: impl Into<String>) {
        self.session.set_text_answer(value);
    }

    pub fn toggle_review_flag(&mut self) {
        self.session.toggle_review_flag();
    }

    fn recompute_timer(&mut self) {
        self.timer = SectionTimer::recompute(&self.session, self.flow.screen());
    }
}

//
// ─── FLOW SERVICE ──────────────────────────────────────────────────────────────
//

/// Result of confirming a section review through the flow service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmStep {
    /// Moved into the next section.
    NextSection,
    /// Last section confirmed; the attempt was submitted and reloaded
    /// with authoritative results.
    Submitted,
    /// Confirmation was requested outside the review screen.
    Ignored,
}

/// Orchestrates attempt start, load, navigation, ticking, and submission
/// against the remote collaborator.
#[derive(Clone)]
pub struct AttemptFlowService {
    clock: Clock,
    api: Arc<dyn ExamApi>,
    sync: ProgressSyncService,
}

impl AttemptFlowService {
    #[must_use]
    pub fn new(api: Arc<dyn ExamApi>) -> Self {
        Self {
            clock: Clock::System,
            sync: ProgressSyncService::new(Arc::clone(&api)),
            api,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// The sync service, exposed so UI can observe the saving flag.
    #[must_use]
    pub fn sync(&self) -> &ProgressSyncService {
        &self.sync
    }

    /// Creates or resumes an attempt for a test template.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Load`; failing to start is fatal to the
    /// session, same as failing to load.
    pub async fn start(&self, template_id: TestTemplateId) -> Result<AttemptId, FlowError> {
        self.api.start(template_id).await.map_err(FlowError::Load)
    }

    /// Loads an attempt and derives its initial screen, cursor, and
    /// countdown.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Load` for transport failures or an unrunnable
    /// snapshot; both block the session behind an error view.
    pub async fn load(&self, attempt_id: AttemptId) -> Result<AttemptRunner, FlowError> {
        let attempt = self
            .api
            .attempt_detail(attempt_id)
            .await
            .map_err(FlowError::Load)?;
        tracing::debug!(
            %attempt_id,
            sections = attempt.section_count(),
            status = ?attempt.status(),
            "attempt loaded"
        );
        Ok(AttemptRunner::new(AttemptSession::new(attempt)))
    }

    /// Leaves the intro pages.
    pub fn finish_intro(&self, runner: &mut AttemptRunner) {
        runner.flow.finish_intro(&mut runner.session);
        runner.recompute_timer();
    }

    /// "Start Section" on the instruction screen.
    pub fn start_section(&self, runner: &mut AttemptRunner) {
        runner.flow.start_section(&mut runner.session);
        runner.recompute_timer();
    }

    /// Advances to the next question or into section review, dispatching
    /// the silent autosave for the step. Autosave failures are swallowed;
    /// the attempt continues either way.
    pub async fn advance(&self, runner: &mut AttemptRunner) -> Screen {
        let intent = runner.flow.advance(&mut runner.session);
        runner.recompute_timer();
        self.dispatch_silent(runner, intent).await;
        runner.screen()
    }

    /// Moves one question back within the section.
    pub fn back(&self, runner: &mut AttemptRunner) {
        runner.flow.back(&mut runner.session);
    }

    /// One second of wall clock. Drives time accrual and, on expiry,
    /// forces the section review screen.
    pub fn tick(&self, runner: &mut AttemptRunner) -> TimerTick {
        let outcome = runner.timer.tick(&mut runner.session);
        if outcome == TimerTick::Expired {
            tracing::debug!(
                section = runner.session.section_index(),
                "section time expired"
            );
            runner.flow.handle_expiry();
            runner.recompute_timer();
        }
        outcome
    }

    /// Confirms the section review: moves into the next section (silent
    /// autosave), or submits after the last one and reloads the attempt
    /// with authoritative results.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Submit` when submission fails — the attempt
    /// stays in progress and may be resubmitted — or `FlowError::Load`
    /// when the post-submit reload fails.
    pub async fn confirm_section(
        &self,
        runner: &mut AttemptRunner,
    ) -> Result<ConfirmStep, FlowError> {
        match runner.flow.confirm_section(&mut runner.session) {
            ConfirmAction::Ignored => Ok(ConfirmStep::Ignored),
            ConfirmAction::NextSection(intent) => {
                runner.recompute_timer();
                self.dispatch_silent(runner, Some(intent)).await;
                Ok(ConfirmStep::NextSection)
            }
            ConfirmAction::Submit => {
                let attempt_id = runner.session.attempt().id();
                self.api
                    .submit(attempt_id)
                    .await
                    .map_err(FlowError::Submit)?;
                let attempt = self
                    .api
                    .attempt_detail(attempt_id)
                    .await
                    .map_err(FlowError::Load)?;
                runner.session.replace_attempt(attempt);
                runner.flow.complete();
                runner.recompute_timer();
                tracing::info!(%attempt_id, "attempt submitted");
                Ok(ConfirmStep::Submitted)
            }
        }
    }

    /// Explicit, user-triggered save of the active question. Unlike
    /// autosaves, failures surface to the caller.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Save` on transport/backend failure. No
    /// automatic retry.
    pub async fn save_now(&self, runner: &AttemptRunner) -> Result<(), FlowError> {
        let cursor = (
            runner.session.section_index(),
            runner.session.question_index(),
        );
        let phase = match runner.screen() {
            Screen::SectionReview => ResumePhase::Review,
            _ => ResumePhase::InSection,
        };
        let intent = SaveIntent {
            snapshot_at: cursor,
            phase,
            resume_at: cursor,
        };
        let Some(upsert) = intent.to_upsert(&runner.session) else {
            return Ok(());
        };
        self.sync
            .save(runner.session.attempt().id(), upsert)
            .await
            .map_err(FlowError::Save)
    }

    async fn dispatch_silent(&self, runner: &AttemptRunner, intent: Option<SaveIntent>) {
        if let Some(intent) = intent
            && let Some(upsert) = intent.to_upsert(&runner.session)
        {
            self.sync
                .save_silent(runner.session.attempt().id(), upsert)
                .await;
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
