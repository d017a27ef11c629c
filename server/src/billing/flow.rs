//! Upgrade payment state machine and bounded status poller.
//!
//! DESIGN
//! ======
//! `idle → initiating → pending → succeeded | failed | timed_out`.
//!
//! [`PaymentFlow::start`] validates input before anything goes on the wire; a
//! validation error leaves the flow idle. Once a transaction is pending,
//! [`PaymentFlow::poll_until_settled`] checks its status once, then retries
//! every [`PollPolicy::interval`] up to [`PollPolicy::max_retries`] times. A
//! transport error counts as an attempt. Running out of attempts is terminal.

#[cfg(test)]
#[path = "flow_test.rs"]
mod flow_test;

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use super::client::PaymentApi;
use super::{InitiateRequest, PaymentError, PaymentStatus, Plan, normalize_phone};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_retries: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self { interval: Duration::from_secs(10), max_retries: 30 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PaymentState {
    Idle,
    Initiating,
    Pending { transaction_id: String },
    Succeeded { transaction_id: String },
    Failed { reason: String },
    TimedOut { transaction_id: String },
}

impl PaymentState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. } | Self::TimedOut { .. })
    }

    /// Message shown to the user for this state.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::Idle => "Enter your M-Pesa phone number to proceed with payment.",
            Self::Initiating => "Initiating M-Pesa payment...",
            Self::Pending { .. } => "Waiting for payment confirmation. Please check your phone for the M-Pesa prompt.",
            Self::Succeeded { .. } => "Payment successful! Your subscription has been upgraded.",
            Self::Failed { .. } => "Payment failed. Please try again or contact support.",
            Self::TimedOut { .. } => "Payment verification timed out. Please contact support.",
        }
    }
}

pub struct PaymentFlow<A> {
    api: A,
    policy: PollPolicy,
    state: PaymentState,
    status_checks: u32,
}

impl<A: PaymentApi> PaymentFlow<A> {
    pub fn new(api: A, policy: PollPolicy) -> Self {
        Self { api, policy, state: PaymentState::Idle, status_checks: 0 }
    }

    #[must_use]
    pub fn state(&self) -> &PaymentState {
        &self.state
    }

    /// Status requests made by the last poll, retries included.
    #[must_use]
    pub fn status_checks(&self) -> u32 {
        self.status_checks
    }

    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Validate the phone number and start a charge for `plan` at `amount`.
    ///
    /// # Errors
    ///
    /// A validation error leaves the flow idle. A failed initiation moves it
    /// to `failed` and returns the cause.
    pub async fn start(&mut self, phone: &str, amount: u64, plan: Plan) -> Result<&PaymentState, PaymentError> {
        let phone_number = normalize_phone(phone)?;
        self.state = PaymentState::Initiating;
        self.status_checks = 0;

        let request = InitiateRequest { phone_number, amount, plan: plan.to_string() };
        let reply = self.api.initiate(&request).await.and_then(|reply| {
            reply
                .transaction_id
                .filter(|id| !id.trim().is_empty())
                .ok_or_else(|| PaymentError::UnexpectedResponse("missing transactionId".into()))
        });
        match reply {
            Ok(transaction_id) => {
                info!(%transaction_id, %plan, amount, "payment initiated");
                self.state = PaymentState::Pending { transaction_id };
                Ok(&self.state)
            }
            Err(e) => {
                warn!(error = %e, %plan, "payment initiation failed");
                self.state = PaymentState::Failed { reason: e.to_string() };
                Err(e)
            }
        }
    }

    /// Poll until the pending transaction settles or the retry budget runs
    /// out. Does nothing unless the flow is pending.
    pub async fn poll_until_settled(&mut self) -> &PaymentState {
        let PaymentState::Pending { transaction_id } = &self.state else {
            return &self.state;
        };
        let transaction_id = transaction_id.clone();
        let mut retries = 0;

        loop {
            self.status_checks += 1;
            match self.api.status(&transaction_id).await {
                Ok(reply) if reply.status == PaymentStatus::Completed => {
                    info!(%transaction_id, checks = self.status_checks, "payment completed");
                    self.state = PaymentState::Succeeded { transaction_id };
                    return &self.state;
                }
                Ok(reply) if reply.status == PaymentStatus::Failed => {
                    let reason = reply.message.unwrap_or_else(|| "The M-Pesa payment was not completed.".into());
                    warn!(%transaction_id, %reason, "payment failed");
                    self.state = PaymentState::Failed { reason };
                    return &self.state;
                }
                Ok(_) => {}
                Err(e) => warn!(%transaction_id, error = %e, "status check failed"),
            }

            if retries >= self.policy.max_retries {
                warn!(%transaction_id, checks = self.status_checks, "payment verification timed out");
                self.state = PaymentState::TimedOut { transaction_id };
                return &self.state;
            }
            retries += 1;
            tokio::time::sleep(self.policy.interval).await;
        }
    }

    /// Start and poll to a terminal state.
    ///
    /// # Errors
    ///
    /// Returns the validation or initiation error from [`Self::start`].
    pub async fn run(&mut self, phone: &str, amount: u64, plan: Plan) -> Result<&PaymentState, PaymentError> {
        self.start(phone, amount, plan).await?;
        Ok(self.poll_until_settled().await)
    }
}
