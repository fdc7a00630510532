use std::env;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use exam_core::Clock;
use exam_core::model::{Attempt, AttemptId, TestTemplateId};

use crate::api::{ApiError, ExamApi, ProgressUpsert};
use crate::record::AttemptRecord;

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub bearer_token: Option<String>,
}

impl ApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: None,
        }
    }

    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Reads `EXAM_API_BASE_URL` (required) and `EXAM_API_TOKEN`
    /// (optional) from the environment.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("EXAM_API_BASE_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        let bearer_token = env::var("EXAM_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        Some(Self {
            base_url,
            bearer_token,
        })
    }
}

//
// ─── HTTP ADAPTER ──────────────────────────────────────────────────────────────
//

/// `ExamApi` over the backend's REST surface.
#[derive(Clone)]
pub struct HttpExamApi {
    client: Client,
    config: ApiConfig,
    clock: Clock,
}

impl HttpExamApi {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            clock: Clock::System,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.config.base_url, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn checked(builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(map_reqwest)?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            status if !status.is_success() => Err(ApiError::Status(status.as_u16())),
            _ => Ok(response),
        }
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn map_reqwest(err: reqwest::Error) -> ApiError {
    if err.is_decode() {
        ApiError::Deserialize(err.to_string())
    } else {
        ApiError::Transport(err.to_string())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartRequest {
    test_template_id: TestTemplateId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartResponse {
    attempt_id: AttemptId,
}

#[async_trait::async_trait]
impl ExamApi for HttpExamApi {
    async fn start(&self, template_id: TestTemplateId) -> Result<AttemptId, ApiError> {
        tracing::debug!(%template_id, "starting attempt");
        let response = Self::checked(
            self.authorize(self.client.post(self.url("attempts")))
                .json(&StartRequest {
                    test_template_id: template_id,
                }),
        )
        .await?;
        let body: StartResponse = response.json().await.map_err(map_reqwest)?;
        Ok(body.attempt_id)
    }

    async fn attempt_detail(&self, attempt_id: AttemptId) -> Result<Attempt, ApiError> {
        tracing::debug!(%attempt_id, "fetching attempt detail");
        let response = Self::checked(
            self.authorize(self.client.get(self.url(&format!("attempts/{attempt_id}")))),
        )
        .await?;
        let record: AttemptRecord = response.json().await.map_err(map_reqwest)?;
        Ok(record.into_attempt(self.clock.now())?)
    }

    async fn save_progress(
        &self,
        attempt_id: AttemptId,
        upsert: &ProgressUpsert,
    ) -> Result<(), ApiError> {
        tracing::debug!(
            %attempt_id,
            section = upsert.section_index,
            question = upsert.question_index,
            "saving progress"
        );
        Self::checked(
            self.authorize(
                self.client
                    .patch(self.url(&format!("attempts/{attempt_id}/progress"))),
            )
            .json(upsert),
        )
        .await?;
        Ok(())
    }

    async fn submit(&self, attempt_id: AttemptId) -> Result<(), ApiError> {
        tracing::debug!(%attempt_id, "submitting attempt");
        Self::checked(
            self.authorize(
                self.client
                    .post(self.url(&format!("attempts/{attempt_id}/submit"))),
            ),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joining_tolerates_slashes() {
        assert_eq!(
            join_url("https://api.example.com/v1/", "/attempts"),
            "https://api.example.com/v1/attempts"
        );
        assert_eq!(
            join_url("https://api.example.com", "attempts/x/submit"),
            "https://api.example.com/attempts/x/submit"
        );
    }

    #[test]
    fn config_builder_sets_token() {
        let config = ApiConfig::new("https://api.example.com").with_bearer_token("tok");
        assert_eq!(config.bearer_token.as_deref(), Some("tok"));
    }
}
