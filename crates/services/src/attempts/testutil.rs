//! Fixture builders shared by the attempt unit tests.

use serde_json::json;
use uuid::Uuid;

use exam_core::model::{
    Attempt, AttemptId, AttemptStatus, Question, QuestionKind, ResumeMeta, Section, SectionStatus,
    TestKind,
};
use exam_core::time::fixed_now;

pub(crate) fn single_choice() -> Question {
    Question::new(QuestionKind::SingleChoice, json!({"prompt": "?"}))
}

pub(crate) fn timed_section(title: &str, minutes: u32, count: usize) -> Section {
    Section::new(
        title,
        Some(minutes),
        SectionStatus::NotStarted,
        (0..count).map(|_| single_choice()).collect(),
        0,
    )
    .expect("fixture section must not be empty")
}

pub(crate) fn untimed_section(title: &str, count: usize) -> Section {
    Section::new(
        title,
        None,
        SectionStatus::NotStarted,
        (0..count).map(|_| single_choice()).collect(),
        0,
    )
    .expect("fixture section must not be empty")
}

pub(crate) fn attempt_full(
    kind: TestKind,
    status: AttemptStatus,
    sections: Vec<Section>,
    resume_meta: Option<ResumeMeta>,
) -> Attempt {
    Attempt::from_detail(
        AttemptId::new(Uuid::from_u128(42)),
        kind,
        status,
        sections,
        0,
        resume_meta,
        None,
        fixed_now(),
    )
    .expect("fixture attempt must be valid")
}

pub(crate) fn attempt_with(sections: Vec<Section>) -> Attempt {
    attempt_full(TestKind::FullLength, AttemptStatus::InProgress, sections, None)
}

pub(crate) fn attempt_with_status(sections: Vec<Section>, status: AttemptStatus) -> Attempt {
    attempt_full(TestKind::FullLength, status, sections, None)
}
