//! STK-push gateway routes.
//!
//! Failures keep the gateway's own reply shapes: `{success: false, message}`
//! for a rejected initiate and `{status: "failed", message}` for an unknown
//! transaction, so payment clients parse one body type per endpoint.

#[cfg(test)]
#[path = "payments_test.rs"]
mod payments_test;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use tracing::warn;

use crate::billing::{InitiateRequest, InitiateResponse, PaymentStatus, StatusResponse};
use crate::error::ErrorCode;
use crate::services::payments::{self, GatewayError};
use crate::state::AppState;

/// `POST /api/mpesa/initiate`: start a simulated charge.
pub async fn initiate(
    State(state): State<AppState>,
    Json(body): Json<InitiateRequest>,
) -> Result<Json<InitiateResponse>, (StatusCode, Json<InitiateResponse>)> {
    match payments::initiate(&state, body).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            warn!(error = %e, code = e.error_code(), "payment initiate rejected");
            let body = InitiateResponse { success: false, transaction_id: None, message: e.to_string() };
            Err((StatusCode::BAD_REQUEST, Json(body)))
        }
    }
}

/// `GET /api/mpesa/status/:transaction_id`: check and maybe settle a charge.
pub async fn status(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> (StatusCode, Json<StatusResponse>) {
    match payments::check_status(&state, &transaction_id).await {
        Ok(response) => (StatusCode::OK, Json(response)),
        Err(e @ GatewayError::UnknownTransaction(_)) => {
            warn!(%transaction_id, "status for unknown transaction");
            let body = StatusResponse {
                transaction_id,
                status: PaymentStatus::Failed,
                timestamp: None,
                message: Some(e.to_string()),
            };
            (StatusCode::NOT_FOUND, Json(body))
        }
        Err(e) => {
            let body = StatusResponse {
                transaction_id,
                status: PaymentStatus::Failed,
                timestamp: None,
                message: Some(e.to_string()),
            };
            (StatusCode::BAD_REQUEST, Json(body))
        }
    }
}
