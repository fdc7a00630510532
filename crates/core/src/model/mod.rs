mod attempt;
mod ids;
mod question;

pub use attempt::{
    Attempt, AttemptError, AttemptResults, AttemptStatus, ResumeMeta, ResumePhase, Section,
    SectionStatus, TestKind,
};
pub use ids::{AttemptId, ParseIdError, TestTemplateId};
pub use question::{Question, QuestionKind};
