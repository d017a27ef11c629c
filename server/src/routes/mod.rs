//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser editor talks to two JSON APIs: the simulated STK-push gateway
//! under `/api/mpesa` and copy generation under `/api/ai`. Both are plain
//! request/response endpoints sharing one `AppState`.

pub mod ai;
pub mod payments;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full API router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/mpesa/initiate", post(payments::initiate))
        .route("/api/mpesa/status/{transaction_id}", get(payments::status))
        .route("/api/ai/generate", post(ai::generate))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
