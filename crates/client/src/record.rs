use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use exam_core::model::{
    Attempt, AttemptError, AttemptId, AttemptResults, AttemptStatus, Question, QuestionKind,
    ResumeMeta, ResumePhase, Section, SectionStatus, TestKind,
};

//
// ─── WIRE RECORDS ──────────────────────────────────────────────────────────────
//

/// Wire shape of a full attempt snapshot.
///
/// Mirrors the domain aggregate so adapters can serialize/deserialize
/// without leaking transport concerns into the domain layer. Fields the
/// backend may omit for fresh attempts default to their zero values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub id: AttemptId,
    #[serde(default = "default_kind")]
    pub test_kind: TestKind,
    pub status: AttemptStatus,
    pub sections: Vec<SectionRecord>,
    #[serde(default)]
    pub total_time_used_seconds: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_meta: Option<ResumeMetaRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<ResultsRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
}

fn default_kind() -> TestKind {
    TestKind::FullLength
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default = "default_section_status")]
    pub status: SectionStatus,
    pub questions: Vec<QuestionRecord>,
}

fn default_section_status() -> SectionStatus {
    SectionStatus::NotStarted
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub kind: QuestionKind,
    /// Opaque question document: text, options, media, correctness data.
    #[serde(default)]
    pub content: JsonValue,
    #[serde(default)]
    pub answer_option_indexes: Vec<usize>,
    #[serde(default)]
    pub answer_text: String,
    /// Accepted from the wire but ignored on rehydration; the answered
    /// flag is always recomputed from answer content.
    #[serde(default)]
    pub is_answered: bool,
    #[serde(default)]
    pub marked_for_review: bool,
    #[serde(default)]
    pub time_spent_seconds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeMetaRecord {
    pub phase: ResumePhase,
    pub section_index: usize,
    pub question_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsRecord {
    pub score: f64,
    pub max_score: f64,
    pub percentage: f64,
}

//
// ─── REHYDRATION ───────────────────────────────────────────────────────────────
//

impl AttemptRecord {
    /// Converts the wire snapshot into the validated domain aggregate.
    ///
    /// `now` stamps `started_at` when the backend omitted it.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError` if the snapshot cannot be run (no sections,
    /// a section without questions).
    pub fn into_attempt(self, now: DateTime<Utc>) -> Result<Attempt, AttemptError> {
        let sections = self
            .sections
            .into_iter()
            .enumerate()
            .map(|(index, record)| record.into_section(index))
            .collect::<Result<Vec<_>, _>>()?;

        Attempt::from_detail(
            self.id,
            self.test_kind,
            self.status,
            sections,
            self.total_time_used_seconds,
            self.resume_meta.map(ResumeMetaRecord::into_meta),
            self.results.map(ResultsRecord::into_results),
            self.started_at.unwrap_or(now),
        )
    }

    /// Builds a wire snapshot from a domain aggregate (used by test fakes
    /// and fixtures).
    #[must_use]
    pub fn from_attempt(attempt: &Attempt) -> Self {
        Self {
            id: attempt.id(),
            test_kind: attempt.kind(),
            status: attempt.status(),
            sections: attempt
                .sections()
                .iter()
                .map(SectionRecord::from_section)
                .collect(),
            total_time_used_seconds: attempt.total_time_used_secs(),
            resume_meta: attempt.resume_meta().map(ResumeMetaRecord::from_meta),
            results: attempt.results().map(ResultsRecord::from_results),
            started_at: Some(attempt.started_at()),
        }
    }
}

impl SectionRecord {
    fn into_section(self, index: usize) -> Result<Section, AttemptError> {
        let questions = self
            .questions
            .into_iter()
            .map(QuestionRecord::into_question)
            .collect();
        Section::new(self.title, self.duration_minutes, self.status, questions, index)
    }

    #[must_use]
    fn from_section(section: &Section) -> Self {
        Self {
            title: section.title().to_owned(),
            duration_minutes: section.duration_minutes(),
            status: section.status(),
            questions: section
                .questions()
                .iter()
                .map(QuestionRecord::from_question)
                .collect(),
        }
    }
}

impl QuestionRecord {
    fn into_question(self) -> Question {
        Question::from_snapshot(
            self.kind,
            self.content,
            self.answer_option_indexes,
            self.answer_text,
            self.marked_for_review,
            self.time_spent_seconds,
            self.correct,
        )
    }

    #[must_use]
    fn from_question(question: &Question) -> Self {
        Self {
            kind: question.kind(),
            content: question.content().clone(),
            answer_option_indexes: question.answer_option_indexes().to_vec(),
            answer_text: question.answer_text().to_owned(),
            is_answered: question.is_answered(),
            marked_for_review: question.marked_for_review(),
            time_spent_seconds: question.time_spent_secs(),
            correct: question.correct(),
        }
    }
}

impl ResumeMetaRecord {
    fn into_meta(self) -> ResumeMeta {
        ResumeMeta {
            phase: self.phase,
            section_index: self.section_index,
            question_index: self.question_index,
        }
    }

    fn from_meta(meta: ResumeMeta) -> Self {
        Self {
            phase: meta.phase,
            section_index: meta.section_index,
            question_index: meta.question_index,
        }
    }
}

impl ResultsRecord {
    fn into_results(self) -> AttemptResults {
        AttemptResults {
            score: self.score,
            max_score: self.max_score,
            percentage: self.percentage,
        }
    }

    fn from_results(results: AttemptResults) -> Self {
        Self {
            score: results.score,
            max_score: results.max_score,
            percentage: results.percentage,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
