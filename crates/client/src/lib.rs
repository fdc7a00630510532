#![forbid(unsafe_code)]

pub mod api;
pub mod http;
pub mod memory;
pub mod record;

pub use api::{ApiError, ExamApi, ProgressUpsert};
pub use http::{ApiConfig, HttpExamApi};
pub use memory::{InMemoryExamApi, RecordedSave};
pub use record::{AttemptRecord, QuestionRecord, ResultsRecord, ResumeMetaRecord, SectionRecord};
