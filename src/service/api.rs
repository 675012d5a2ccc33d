//! REST API handlers for the summarization service
//!
//! Routes:
//! - `GET /` - greeting
//! - `GET /ping` - liveness
//! - `POST /summarize` - summarize, speak and upload one article

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

use crate::models::AudioData;
use crate::utils::is_truthy;

use super::server::AppState;

// ============================================================================
// API Response Types
// ============================================================================

/// Response envelope shared by every route
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse<()> {
    /// Success without payload
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
            data: None,
            error: None,
        }
    }

    /// Error with a short description
    pub fn error(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
            data: None,
            error: Some(error.into()),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// Success with payload
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success",
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }
}

/// Payload of a successful summarization
#[derive(Debug, Serialize)]
pub struct SummarizeData {
    /// Echoed exactly as received
    pub article_id: Value,
    pub audio_data: AudioData,
}

/// Validated summarization request
#[derive(Debug, Clone, PartialEq)]
pub struct SummarizeRequest {
    pub article_id: Value,
    pub article_title: String,
    pub article_description: String,
}

impl SummarizeRequest {
    /// Parse a request body; `None` when it is not JSON or a field is missing or falsy
    pub fn parse(body: &[u8]) -> Option<Self> {
        let value: Value = serde_json::from_slice(body).ok()?;
        let object = value.as_object()?;

        let field = |name: &str| object.get(name).filter(|v| is_truthy(v)).cloned();

        Some(Self {
            article_id: field("article_id")?,
            article_title: as_text(field("article_title")?),
            article_description: as_text(field("article_description")?),
        })
    }

    /// Article id as plain text (strings unquoted)
    pub fn article_key(&self) -> String {
        match &self.article_id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

fn as_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

// ============================================================================
// Router
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ping", get(ping))
        .route("/summarize", post(summarize))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

async fn index() -> impl IntoResponse {
    Json(ApiResponse::message("Hello from wikireel summarization!"))
}

async fn ping() -> impl IntoResponse {
    Json(ApiResponse::message("Pong!"))
}

/// Summarize an article and return the uploaded audio metadata
async fn summarize(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let Some(request) = SummarizeRequest::parse(&body) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Invalid request", "Missing required fields")),
        )
            .into_response();
    };

    let article_key = request.article_key();
    tracing::info!(article_id = %article_key, title = %request.article_title, "Summarization requested");

    match state
        .service
        .summarize_article(
            &article_key,
            &request.article_title,
            &request.article_description,
        )
        .await
    {
        Ok(audio_data) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                "Summarization successful",
                SummarizeData {
                    article_id: request.article_id,
                    audio_data,
                },
            )),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(article_id = %article_key, error = %e, "Summarization failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(
                    "Summarization failed",
                    "Failed to generate summary",
                )),
            )
                .into_response()
        }
    }
}
