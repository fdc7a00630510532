#![forbid(unsafe_code)]

pub mod attempts;
pub mod error;
pub mod exam_services;
pub mod payload;
pub mod ticker;

pub use exam_core::Clock;

pub use attempts::{
    AttemptFlowService, AttemptProgress, AttemptRunner, AttemptSession, ConfirmStep, SaveIntent,
    Screen, ScreenFlow, SectionTimer, TimerTick,
};
pub use error::FlowError;
pub use exam_services::ExamServices;
pub use payload::{AnswerPayload, PayloadError};
pub use ticker::Ticker;
