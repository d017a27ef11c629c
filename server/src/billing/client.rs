//! Payment API seam and its HTTP backend.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;

use super::{InitiateRequest, InitiateResponse, PaymentError, StatusResponse};

const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// The two STK-push calls. Mocked in tests.
#[async_trait::async_trait]
pub trait PaymentApi: Send + Sync {
    /// Start a charge.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError`] on transport failure or a non-success reply.
    async fn initiate(&self, request: &InitiateRequest) -> Result<InitiateResponse, PaymentError>;

    /// Check a transaction.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError`] on transport failure or a malformed reply.
    async fn status(&self, transaction_id: &str) -> Result<StatusResponse, PaymentError>;
}

/// `reqwest` client for the `/api/mpesa/*` endpoints.
pub struct HttpPaymentApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpPaymentApi {
    /// # Errors
    ///
    /// Returns [`PaymentError::Network`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, PaymentError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| PaymentError::Network(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl PaymentApi for HttpPaymentApi {
    async fn initiate(&self, request: &InitiateRequest) -> Result<InitiateResponse, PaymentError> {
        let url = format!("{}/api/mpesa/initiate", self.base_url);
        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| PaymentError::Network(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PaymentError::Network(e.to_string()))?;
        debug!(status = status.as_u16(), "initiate replied");

        let body: InitiateResponse =
            serde_json::from_str(&text).map_err(|_| rejected_or_unexpected(status, &text))?;
        if !status.is_success() || !body.success {
            return Err(PaymentError::Rejected { status: status.as_u16(), message: body.message });
        }
        if body.transaction_id.is_none() {
            return Err(PaymentError::UnexpectedResponse("missing transactionId".into()));
        }
        Ok(body)
    }

    async fn status(&self, transaction_id: &str) -> Result<StatusResponse, PaymentError> {
        let url = format!("{}/api/mpesa/status/{transaction_id}", self.base_url);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| PaymentError::Network(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PaymentError::Network(e.to_string()))?;

        // A 404 still carries a `{status: "failed"}` body, which settles the flow.
        serde_json::from_str::<StatusResponse>(&text).map_err(|_| rejected_or_unexpected(status, &text))
    }
}

fn rejected_or_unexpected(status: StatusCode, body: &str) -> PaymentError {
    if status.is_success() {
        PaymentError::UnexpectedResponse(body.to_owned())
    } else {
        PaymentError::Rejected { status: status.as_u16(), message: body.to_owned() }
    }
}
