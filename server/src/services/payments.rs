//! Simulated STK-push gateway.
//!
//! DESIGN
//! ======
//! Stands in for a real mobile-money provider. `initiate` validates the
//! charge, mints a transaction id and records it as pending. Each `status`
//! check of a pending transaction settles it to completed with the configured
//! probability; settled transactions never change again.
//!
//! ERROR HANDLING
//! ==============
//! Validation failures map to 400, unknown ids to 404. The gateway never
//! produces `failed` on its own; the status exists for real providers and
//! for unknown transactions.

#[cfg(test)]
#[path = "payments_test.rs"]
mod payments_test;

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{info, warn};

use crate::billing::{
    InitiateRequest, InitiateResponse, PaymentError, PaymentStatus, Plan, StatusResponse, normalize_phone,
};
use crate::error::ErrorCode;
use crate::state::{AppState, Transaction};

/// Prefix of every transaction id.
pub const TRANSACTION_PREFIX: &str = "TXN";

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;
const DEFAULT_PROBABILITY: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatewayConfig {
    completion_probability: f64,
}

impl GatewayConfig {
    /// `probability` is clamped to `0.0..=1.0`; NaN uses the default.
    #[must_use]
    pub fn new(probability: f64) -> Self {
        let completion_probability =
            if probability.is_nan() { DEFAULT_PROBABILITY } else { probability.clamp(0.0, 1.0) };
        Self { completion_probability }
    }

    #[must_use]
    pub fn completion_probability(&self) -> f64 {
        self.completion_probability
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PROBABILITY)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Invalid(#[from] PaymentError),
    #[error("unknown transaction: {0}")]
    UnknownTransaction(String),
}

impl ErrorCode for GatewayError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid(e) => e.error_code(),
            Self::UnknownTransaction(_) => "E_UNKNOWN_TRANSACTION",
        }
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Validate and record a new pending charge.
///
/// # Errors
///
/// Returns [`GatewayError::Invalid`] for a bad phone number, a zero amount or
/// an unknown plan.
pub async fn initiate(state: &AppState, request: InitiateRequest) -> Result<InitiateResponse, GatewayError> {
    let phone_number = normalize_phone(&request.phone_number)?;
    let plan: Plan = request.plan.parse()?;
    if request.amount == 0 {
        return Err(PaymentError::InvalidAmount(request.amount.to_string()).into());
    }

    let created_at_ms = now_ms();
    let id = transaction_id(created_at_ms);
    let txn = Transaction {
        id: id.clone(),
        phone_number,
        amount: request.amount,
        plan,
        status: PaymentStatus::Pending,
        created_at_ms,
    };
    state.ledger.write().await.insert(id.clone(), txn);
    info!(transaction_id = %id, %plan, amount = request.amount, "payment initiated");

    Ok(InitiateResponse {
        success: true,
        transaction_id: Some(id),
        message: "Payment initiated successfully".into(),
    })
}

/// Report a transaction's status, rolling a pending one forward.
///
/// # Errors
///
/// Returns [`GatewayError::UnknownTransaction`] if the id was never issued.
pub async fn check_status(state: &AppState, transaction_id: &str) -> Result<StatusResponse, GatewayError> {
    let mut ledger = state.ledger.write().await;
    let Some(txn) = ledger.get_mut(transaction_id) else {
        return Err(GatewayError::UnknownTransaction(transaction_id.to_owned()));
    };
    if txn.status == PaymentStatus::Pending && settles(state.gateway.completion_probability()) {
        txn.status = PaymentStatus::Completed;
        info!(%transaction_id, "payment completed");
    }
    Ok(StatusResponse {
        transaction_id: txn.id.clone(),
        status: txn.status,
        timestamp: Some(rfc3339_now()),
        message: None,
    })
}

// =============================================================================
// HELPERS
// =============================================================================

fn settles(probability: f64) -> bool {
    rand::rng().random_bool(probability)
}

/// `TXN` + epoch milliseconds + nine lowercase base-36 characters.
#[must_use]
pub fn transaction_id(now_ms: u64) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect();
    format!("{TRANSACTION_PREFIX}{now_ms}{suffix}")
}

fn now_ms() -> u64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    u64::try_from(dur.as_millis()).unwrap_or(0)
}

fn rfc3339_now() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|e| {
        warn!(error = %e, "timestamp formatting failed");
        String::new()
    })
}
