/// Backend client: the only module that talks HTTP to the coaching backend.
///
/// Two endpoints: `POST /chat` (NDJSON stream, consumed by `chat::session`)
/// and `POST /analyze-profile` (plain JSON, consumed by the questionnaire).
use std::time::Duration;

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::{RelationshipStage, Traits};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Chat streams have no overall deadline; analysis is a single short call.
const ANALYZE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    /// Sent as `null` until the backend has assigned one.
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_context: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub name: &'a str,
    pub stage: RelationshipStage,
    pub traits: Traits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileAnalysis {
    pub archetype: String,
    pub analysis: String,
}

/// FastAPI-style error body.
#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    detail: serde_json::Value,
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Opens a chat stream. The returned response has a success status; its
    /// body is the raw NDJSON byte stream.
    pub async fn open_chat(&self, request: &ChatRequest) -> Result<Response, AppError> {
        let url = format!("{}/chat", self.base_url);
        debug!(
            has_session = request.session_id.is_some(),
            has_context = request.profile_context.is_some(),
            "POST {url}"
        );
        let response = self.client.post(&url).json(request).send().await?;
        ensure_success(response).await
    }

    pub async fn analyze_profile(
        &self,
        request: &AnalyzeRequest<'_>,
    ) -> Result<ProfileAnalysis, AppError> {
        let url = format!("{}/analyze-profile", self.base_url);
        debug!(stage = request.stage.as_str(), "POST {url}");
        let response = self
            .client
            .post(&url)
            .timeout(ANALYZE_TIMEOUT)
            .json(request)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }
}

async fn ensure_success(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!("Backend returned {}: {}", status, body);
    Err(AppError::Backend {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Pulls `detail` out of an error body when present, else returns the body as-is.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<BackendErrorBody>(body) {
        Ok(BackendErrorBody {
            detail: serde_json::Value::String(s),
        }) => s,
        Ok(BackendErrorBody { detail }) => detail.to_string(),
        Err(_) => body.to_string(),
    }
}
