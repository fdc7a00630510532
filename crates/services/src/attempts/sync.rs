use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use client::{ApiError, ExamApi, ProgressUpsert};
use exam_core::model::{AttemptId, ResumePhase};

use super::store::AttemptSession;

//
// ─── SAVE INTENT ───────────────────────────────────────────────────────────────
//

/// What a navigation step wants persisted: which question to snapshot and
/// where a reload should resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveIntent {
    /// Cursor of the question whose state goes into the snapshot.
    pub snapshot_at: (usize, usize),
    pub phase: ResumePhase,
    /// Cursor the resume metadata should point at.
    pub resume_at: (usize, usize),
}

impl SaveIntent {
    /// Builds the wire upsert for this intent from current session state.
    ///
    /// Returns `None` when the snapshot cursor no longer points at a
    /// question; there is nothing coherent to persist then.
    #[must_use]
    pub fn to_upsert(&self, session: &AttemptSession) -> Option<ProgressUpsert> {
        let (section_ix, question_ix) = self.snapshot_at;
        let question = session.attempt().question(section_ix, question_ix)?;
        Some(ProgressUpsert {
            section_index: section_ix,
            question_index: question_ix,
            answer_option_indexes: question.answer_option_indexes().to_vec(),
            answer_text: question.answer_text().to_owned(),
            is_answered: question.is_answered(),
            marked_for_review: question.marked_for_review(),
            time_spent_seconds: question.time_spent_secs(),
            total_time_used_seconds: session.attempt().total_time_used_secs(),
            phase: Some(self.phase),
            current_section_index: Some(self.resume_at.0),
            current_question_index: Some(self.resume_at.1),
        })
    }
}

//
// ─── PROGRESS SYNC ─────────────────────────────────────────────────────────────
//

/// Dispatches progress snapshots to the remote collaborator.
///
/// Each snapshot is self-contained, so overlapping dispatches resolve as
/// last-write-wins; the shared `saving` flag only gates UI feedback, and
/// at most one save is ever user-visible as "saving".
#[derive(Clone)]
pub struct ProgressSyncService {
    api: Arc<dyn ExamApi>,
    saving: Arc<AtomicBool>,
}

impl ProgressSyncService {
    #[must_use]
    pub fn new(api: Arc<dyn ExamApi>) -> Self {
        Self {
            api,
            saving: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True while a user-visible save is in flight.
    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::SeqCst)
    }

    /// Best-effort autosave: transport failures are logged and swallowed.
    /// The next navigation carries a fresh snapshot, so transient failures
    /// self-heal as long as the candidate keeps interacting.
    pub async fn save_silent(&self, attempt_id: AttemptId, upsert: ProgressUpsert) {
        if let Err(err) = self.api.save_progress(attempt_id, &upsert).await {
            tracing::warn!(
                %attempt_id,
                section = upsert.section_index,
                question = upsert.question_index,
                error = %err,
                "silent progress save failed"
            );
        }
    }

    /// User-triggered save: failures are surfaced to the caller. No
    /// automatic retry.
    ///
    /// # Errors
    ///
    /// Returns the transport/backend error from `save_progress`.
    pub async fn save(&self, attempt_id: AttemptId, upsert: ProgressUpsert) -> Result<(), ApiError> {
        let _guard = SavingGuard::engage(&self.saving);
        self.api.save_progress(attempt_id, &upsert).await
    }
}

/// Clears the saving flag on every exit path.
struct SavingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> SavingGuard<'a> {
    fn engage(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self { flag }
    }
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
