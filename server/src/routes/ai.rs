//! Copy generation route.

#[cfg(test)]
#[path = "ai_test.rs"]
mod ai_test;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Json, Response};
use tracing::warn;

use crate::error::{ErrorCode, error_response};
use crate::services::content::{self, ContentError, ContentRequest, GeneratedContent};
use crate::state::AppState;

/// `POST /api/ai/generate`: three copy options for a poster.
pub async fn generate(
    State(state): State<AppState>,
    Json(body): Json<ContentRequest>,
) -> Result<Json<GeneratedContent>, Response> {
    content::generate(&state, &body).await.map(Json).map_err(|e| {
        warn!(error = %e, code = e.error_code(), "content generation failed");
        error_response(content_error_to_status(&e), &e)
    })
}

pub(crate) fn content_error_to_status(err: &ContentError) -> StatusCode {
    match err {
        ContentError::MissingBusinessType => StatusCode::BAD_REQUEST,
        ContentError::LlmNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        ContentError::Llm(_) => StatusCode::BAD_GATEWAY,
    }
}
