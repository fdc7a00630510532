use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use exam_core::model::{Attempt, AttemptError, AttemptId, ResumePhase, TestTemplateId};

/// Errors surfaced by remote-API adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("not found")]
    NotFound,

    #[error("backend rejected the request with status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Deserialize(String),

    #[error(transparent)]
    InvalidDetail(#[from] AttemptError),
}

/// Idempotent upsert of one question's progress, plus optional resume
/// metadata pointing at wherever the candidate should land on reload.
///
/// Each upsert is self-contained; racing saves resolve as last-write-wins
/// on the backend, so no merge semantics are needed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpsert {
    pub section_index: usize,
    pub question_index: usize,
    pub answer_option_indexes: Vec<usize>,
    pub answer_text: String,
    pub is_answered: bool,
    pub marked_for_review: bool,
    pub time_spent_seconds: u32,
    pub total_time_used_seconds: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<ResumePhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_section_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_question_index: Option<usize>,
}

/// Remote collaborator contract for the exam backend.
///
/// The backend is the system of record: it mints attempt ids, stores
/// progress snapshots, and owns correctness/statistics after submission.
#[async_trait]
pub trait ExamApi: Send + Sync {
    /// Creates or resumes an attempt for a test template.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the backend refuses or cannot be reached.
    async fn start(&self, template_id: TestTemplateId) -> Result<AttemptId, ApiError>;

    /// Fetches the full attempt snapshot, nested question documents
    /// included.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown attempt and
    /// `ApiError::InvalidDetail` when the snapshot cannot be run (for
    /// instance, zero sections).
    async fn attempt_detail(&self, attempt_id: AttemptId) -> Result<Attempt, ApiError>;

    /// Upserts one question's progress and optional resume metadata.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or backend failure. Callers decide
    /// whether a failure is surfaced or swallowed (silent autosave).
    async fn save_progress(
        &self,
        attempt_id: AttemptId,
        upsert: &ProgressUpsert,
    ) -> Result<(), ApiError>;

    /// Finalizes the attempt. Subsequent detail reads return a completed
    /// snapshot with authoritative correctness and statistics.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or backend failure; the attempt
    /// stays in progress and submission may be retried.
    async fn submit(&self, attempt_id: AttemptId) -> Result<(), ApiError>;
}
