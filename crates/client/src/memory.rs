use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use exam_core::model::{
    Attempt, AttemptId, AttemptResults, AttemptStatus, Question, ResumeMeta, Section,
    TestTemplateId,
};

use crate::api::{ApiError, ExamApi, ProgressUpsert};

/// One `save_progress` call as the fake backend observed it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSave {
    pub attempt_id: AttemptId,
    pub upsert: ProgressUpsert,
}

struct StoredAttempt {
    base: Attempt,
    upserts: HashMap<(usize, usize), ProgressUpsert>,
    total_time_used_secs: u64,
    resume_meta: Option<ResumeMeta>,
    submitted: bool,
    results_on_submit: Option<AttemptResults>,
}

#[derive(Default)]
struct State {
    templates: HashMap<TestTemplateId, AttemptId>,
    attempts: HashMap<AttemptId, StoredAttempt>,
    saves: Vec<RecordedSave>,
}

/// In-memory `ExamApi` for tests and prototyping.
///
/// Stores seeded attempts behind a mutex, applies progress upserts the way
/// the real backend would (last write per question wins), records every
/// save in dispatch order, and can be scripted to fail saves or submits.
#[derive(Default)]
pub struct InMemoryExamApi {
    state: Mutex<State>,
    fail_saves: AtomicBool,
    fail_submit: AtomicBool,
}

impl InMemoryExamApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an attempt and maps a template id onto it for `start`.
    ///
    /// # Panics
    ///
    /// Panics if the fake's state mutex is poisoned.
    pub fn seed(&self, template_id: TestTemplateId, attempt: Attempt) {
        let mut state = self.state.lock().expect("fake state poisoned");
        state.templates.insert(template_id, attempt.id());
        state.attempts.insert(
            attempt.id(),
            StoredAttempt {
                total_time_used_secs: attempt.total_time_used_secs(),
                resume_meta: attempt.resume_meta(),
                base: attempt,
                upserts: HashMap::new(),
                submitted: false,
                results_on_submit: None,
            },
        );
    }

    /// Scripts every subsequent `save_progress` call to fail.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Scripts every subsequent `submit` call to fail.
    pub fn set_fail_submit(&self, fail: bool) {
        self.fail_submit.store(fail, Ordering::SeqCst);
    }

    /// Statistics the fake will attach once the attempt is submitted.
    ///
    /// # Panics
    ///
    /// Panics if the fake's state mutex is poisoned.
    pub fn set_results_on_submit(&self, attempt_id: AttemptId, results: AttemptResults) {
        let mut state = self.state.lock().expect("fake state poisoned");
        if let Some(stored) = state.attempts.get_mut(&attempt_id) {
            stored.results_on_submit = Some(results);
        }
    }

    /// Every save observed so far, in dispatch order.
    ///
    /// # Panics
    ///
    /// Panics if the fake's state mutex is poisoned.
    #[must_use]
    pub fn recorded_saves(&self) -> Vec<RecordedSave> {
        self.state.lock().expect("fake state poisoned").saves.clone()
    }

    fn lock_state(&self) -> Result<std::sync::MutexGuard<'_, State>, ApiError> {
        self.state
            .lock()
            .map_err(|e| ApiError::Transport(e.to_string()))
    }

    fn rebuild_detail(stored: &StoredAttempt) -> Result<Attempt, ApiError> {
        let base = &stored.base;
        let sections = base
            .sections()
            .iter()
            .enumerate()
            .map(|(s, section)| {
                let questions = section
                    .questions()
                    .iter()
                    .enumerate()
                    .map(|(q, question)| match stored.upserts.get(&(s, q)) {
                        Some(upsert) => Question::from_snapshot(
                            question.kind(),
                            question.content().clone(),
                            upsert.answer_option_indexes.clone(),
                            upsert.answer_text.clone(),
                            upsert.marked_for_review,
                            upsert.time_spent_seconds,
                            question.correct(),
                        ),
                        None => question.clone(),
                    })
                    .collect();
                Section::new(
                    section.title(),
                    section.duration_minutes(),
                    section.status(),
                    questions,
                    s,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let status = if stored.submitted {
            AttemptStatus::Completed
        } else {
            base.status()
        };
        let results = if stored.submitted {
            stored.results_on_submit.or(base.results())
        } else {
            base.results()
        };

        Ok(Attempt::from_detail(
            base.id(),
            base.kind(),
            status,
            sections,
            stored.total_time_used_secs,
            stored.resume_meta,
            results,
            base.started_at(),
        )?)
    }
}

#[async_trait]
impl ExamApi for InMemoryExamApi {
    async fn start(&self, template_id: TestTemplateId) -> Result<AttemptId, ApiError> {
        let state = self.lock_state()?;
        state
            .templates
            .get(&template_id)
            .copied()
            .ok_or(ApiError::NotFound)
    }

    async fn attempt_detail(&self, attempt_id: AttemptId) -> Result<Attempt, ApiError> {
        let state = self.lock_state()?;
        let stored = state.attempts.get(&attempt_id).ok_or(ApiError::NotFound)?;
        Self::rebuild_detail(stored)
    }

    async fn save_progress(
        &self,
        attempt_id: AttemptId,
        upsert: &ProgressUpsert,
    ) -> Result<(), ApiError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("scripted save failure".to_string()));
        }

        let mut state = self.lock_state()?;
        state.saves.push(RecordedSave {
            attempt_id,
            upsert: upsert.clone(),
        });
        let stored = state
            .attempts
            .get_mut(&attempt_id)
            .ok_or(ApiError::NotFound)?;

        stored
            .upserts
            .insert((upsert.section_index, upsert.question_index), upsert.clone());
        stored.total_time_used_secs = upsert.total_time_used_seconds;
        if let Some(phase) = upsert.phase {
            stored.resume_meta = Some(ResumeMeta {
                phase,
                section_index: upsert.current_section_index.unwrap_or(upsert.section_index),
                question_index: upsert
                    .current_question_index
                    .unwrap_or(upsert.question_index),
            });
        }
        Ok(())
    }

    async fn submit(&self, attempt_id: AttemptId) -> Result<(), ApiError> {
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(ApiError::Status(503));
        }

        let mut state = self.lock_state()?;
        let stored = state
            .attempts
            .get_mut(&attempt_id)
            .ok_or(ApiError::NotFound)?;
        stored.submitted = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{QuestionKind, ResumePhase, SectionStatus, TestKind};
    use exam_core::time::fixed_now;
    use serde_json::json;
    use uuid::Uuid;

    fn seeded() -> (InMemoryExamApi, TestTemplateId, AttemptId) {
        let template_id = TestTemplateId::new(Uuid::from_u128(1));
        let attempt_id = AttemptId::new(Uuid::from_u128(2));
        let section = Section::new(
            "Reading",
            Some(5),
            SectionStatus::NotStarted,
            vec![
                Question::new(QuestionKind::SingleChoice, json!({})),
                Question::new(QuestionKind::FreeText, json!({})),
            ],
            0,
        )
        .unwrap();
        let attempt = Attempt::from_detail(
            attempt_id,
            TestKind::FullLength,
            AttemptStatus::InProgress,
            vec![section],
            0,
            None,
            None,
            fixed_now(),
        )
        .unwrap();

        let api = InMemoryExamApi::new();
        api.seed(template_id, attempt);
        (api, template_id, attempt_id)
    }

    fn upsert_for(question_index: usize) -> ProgressUpsert {
        ProgressUpsert {
            section_index: 0,
            question_index,
            answer_option_indexes: vec![1],
            answer_text: String::new(),
            is_answered: true,
            marked_for_review: false,
            time_spent_seconds: 9,
            total_time_used_seconds: 9,
            phase: Some(ResumePhase::InSection),
            current_section_index: Some(0),
            current_question_index: Some(question_index),
        }
    }

    #[tokio::test]
    async fn start_resolves_seeded_template() {
        let (api, template_id, attempt_id) = seeded();
        assert_eq!(api.start(template_id).await.unwrap(), attempt_id);

        let unknown = TestTemplateId::new(Uuid::from_u128(99));
        assert!(matches!(
            api.start(unknown).await.unwrap_err(),
            ApiError::NotFound
        ));
    }

    #[tokio::test]
    async fn saves_are_applied_to_subsequent_detail_reads() {
        let (api, _, attempt_id) = seeded();
        api.save_progress(attempt_id, &upsert_for(0)).await.unwrap();

        let detail = api.attempt_detail(attempt_id).await.unwrap();
        assert_eq!(detail.question(0, 0).unwrap().answer_option_indexes(), &[1]);
        assert_eq!(detail.question(0, 0).unwrap().time_spent_secs(), 9);
        assert_eq!(detail.total_time_used_secs(), 9);
        let meta = detail.resume_meta().unwrap();
        assert_eq!(meta.phase, ResumePhase::InSection);
        assert_eq!(meta.question_index, 0);
        assert_eq!(api.recorded_saves().len(), 1);
    }

    #[tokio::test]
    async fn scripted_save_failure_records_nothing() {
        let (api, _, attempt_id) = seeded();
        api.set_fail_saves(true);
        let err = api
            .save_progress(attempt_id, &upsert_for(0))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(api.recorded_saves().is_empty());

        api.set_fail_saves(false);
        api.save_progress(attempt_id, &upsert_for(0)).await.unwrap();
        assert_eq!(api.recorded_saves().len(), 1);
    }

    #[tokio::test]
    async fn submit_completes_the_attempt_with_results() {
        let (api, _, attempt_id) = seeded();
        api.set_results_on_submit(
            attempt_id,
            AttemptResults {
                score: 8.0,
                max_score: 10.0,
                percentage: 80.0,
            },
        );
        api.submit(attempt_id).await.unwrap();

        let detail = api.attempt_detail(attempt_id).await.unwrap();
        assert_eq!(detail.status(), AttemptStatus::Completed);
        assert!((detail.results().unwrap().percentage - 80.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn failed_submit_leaves_attempt_in_progress() {
        let (api, _, attempt_id) = seeded();
        api.set_fail_submit(true);
        assert!(matches!(
            api.submit(attempt_id).await.unwrap_err(),
            ApiError::Status(503)
        ));

        let detail = api.attempt_detail(attempt_id).await.unwrap();
        assert_eq!(detail.status(), AttemptStatus::InProgress);
    }
}
