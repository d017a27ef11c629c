//! Billing: the mobile-money (STK push) upgrade flow, client side.
//!
//! DESIGN
//! ======
//! The STK-push protocol is two calls: initiate a charge against a phone
//! number, then poll the transaction status until it settles. This module
//! holds the wire types shared with the stub endpoints in
//! [`crate::routes::payments`], the input normalization the upgrade dialog
//! applies before calling out, and the [`PaymentError`] taxonomy.
//!
//! - [`client`]: the [`client::PaymentApi`] seam and its `reqwest` backend
//! - [`flow`]: the [`flow::PaymentFlow`] state machine and bounded poller
//!
//! ERROR HANDLING
//! ==============
//! Validation errors (missing or malformed phone, bad amount, unknown plan)
//! are raised before any network call. Transport and HTTP failures surface as
//! [`PaymentError::Network`] / [`PaymentError::Rejected`].

pub mod client;
pub mod flow;


use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Digits in a normalized Kenyan MSISDN (`2547XXXXXXXX`).
pub const MSISDN_LEN: usize = 12;

/// Country code prefix for normalized numbers.
pub const COUNTRY_CODE: &str = "254";

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    #[error("phone number required")]
    MissingPhone,
    #[error("invalid phone number: {0}")]
    InvalidPhone(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("unknown plan: {0}")]
    UnknownPlan(String),
    #[error("payment request failed: {0}")]
    Network(String),
    #[error("payment rejected: status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected payment response: {0}")]
    UnexpectedResponse(String),
}

impl crate::error::ErrorCode for PaymentError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingPhone => "E_MISSING_PHONE",
            Self::InvalidPhone(_) => "E_INVALID_PHONE",
            Self::InvalidAmount(_) => "E_INVALID_AMOUNT",
            Self::UnknownPlan(_) => "E_UNKNOWN_PLAN",
            Self::Network(_) => "E_NETWORK",
            Self::Rejected { .. } => "E_REJECTED",
            Self::UnexpectedResponse(_) => "E_UNEXPECTED_RESPONSE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Rejected { status: 500..=599, .. })
    }
}

// =============================================================================
// PLANS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
    Enterprise,
}

impl Plan {
    pub const ALL: [Plan; 3] = [Plan::Free, Plan::Pro, Plan::Enterprise];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Enterprise => "enterprise",
        }
    }

    /// Monthly list price in whole shillings.
    #[must_use]
    pub fn price_ksh(self) -> u64 {
        match self {
            Self::Free => 0,
            Self::Pro => 1500,
            Self::Enterprise => 5000,
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| PaymentError::UnknownPlan(s.to_owned()))
    }
}

// =============================================================================
// INPUT NORMALIZATION
// =============================================================================

/// Normalize a Kenyan phone number to `254XXXXXXXXX`.
///
/// Non-digits are stripped. A leading `254` is kept, a leading `0` becomes
/// `254`, and a bare `7…`/`1…` subscriber number gets `254` prepended.
///
/// # Errors
///
/// [`PaymentError::MissingPhone`] for blank input, [`PaymentError::InvalidPhone`]
/// when the result is not exactly [`MSISDN_LEN`] digits.
pub fn normalize_phone(raw: &str) -> Result<String, PaymentError> {
    if raw.trim().is_empty() {
        return Err(PaymentError::MissingPhone);
    }
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let normalized = if digits.starts_with(COUNTRY_CODE) {
        digits
    } else if let Some(rest) = digits.strip_prefix('0') {
        format!("{COUNTRY_CODE}{rest}")
    } else if digits.starts_with('7') || digits.starts_with('1') {
        format!("{COUNTRY_CODE}{digits}")
    } else {
        digits
    };
    if normalized.len() == MSISDN_LEN {
        Ok(normalized)
    } else {
        Err(PaymentError::InvalidPhone(raw.to_owned()))
    }
}

/// Parse a displayed price such as `KSh 1,500` into whole shillings.
///
/// # Errors
///
/// [`PaymentError::InvalidAmount`] if nothing numeric remains.
pub fn parse_amount(raw: &str) -> Result<u64, PaymentError> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("KSh")
        .or_else(|| trimmed.strip_prefix("KES"))
        .unwrap_or(trimmed);
    let cleaned: String = body.chars().filter(|c| !matches!(c, ',' | ' ' | '_')).collect();
    let whole = cleaned.split_once('.').map_or(cleaned.as_str(), |(w, _)| w);
    whole
        .parse::<u64>()
        .map_err(|_| PaymentError::InvalidAmount(raw.to_owned()))
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// `POST /api/mpesa/initiate` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateRequest {
    pub phone_number: String,
    pub amount: u64,
    pub plan: String,
}

/// `POST /api/mpesa/initiate` reply. `transaction_id` is absent on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    #[must_use]
    pub fn is_settled(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// `GET /api/mpesa/status/{transactionId}` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(default)]
    pub transaction_id: String,
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
