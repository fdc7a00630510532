use std::sync::Arc;

use client::{ApiConfig, ExamApi, HttpExamApi};
use exam_core::Clock;

use crate::attempts::AttemptFlowService;

/// Assembles app-facing services over a remote collaborator.
#[derive(Clone)]
pub struct ExamServices {
    flow: Arc<AttemptFlowService>,
}

impl ExamServices {
    /// Builds services over any `ExamApi` implementation (the HTTP
    /// adapter in production, the in-memory fake in tests).
    #[must_use]
    pub fn new(api: Arc<dyn ExamApi>, clock: Clock) -> Self {
        let flow = Arc::new(AttemptFlowService::new(api).with_clock(clock));
        Self { flow }
    }

    /// Builds services over the HTTP backend configured from the
    /// environment. Returns `None` when `EXAM_API_BASE_URL` is unset.
    #[must_use]
    pub fn from_env(clock: Clock) -> Option<Self> {
        let config = ApiConfig::from_env()?;
        let api: Arc<dyn ExamApi> = Arc::new(HttpExamApi::new(config).with_clock(clock));
        Some(Self::new(api, clock))
    }

    #[must_use]
    pub fn flow(&self) -> Arc<AttemptFlowService> {
        Arc::clone(&self.flow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client::InMemoryExamApi;
    use exam_core::time::{fixed_clock, fixed_now};

    #[test]
    fn assembles_over_any_api_implementation() {
        let api: Arc<dyn ExamApi> = Arc::new(InMemoryExamApi::new());
        let services = ExamServices::new(api, fixed_clock());
        assert_eq!(services.flow().clock().now(), fixed_now());
    }
}
