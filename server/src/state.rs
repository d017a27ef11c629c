//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the in-memory transaction ledger of the simulated payment gateway
//! and the optional LLM client. Nothing is persisted: restarting the server
//! forgets every transaction.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::billing::{PaymentStatus, Plan};
use crate::config::ServerConfig;
use crate::llm::LlmChat;
use crate::services::payments::GatewayConfig;

// =============================================================================
// TRANSACTION
// =============================================================================

/// One simulated STK-push charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub id: String,
    pub phone_number: String,
    pub amount: u64,
    pub plan: Plan,
    pub status: PaymentStatus,
    /// Milliseconds since Unix epoch.
    pub created_at_ms: u64,
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Copy.
#[derive(Clone)]
pub struct AppState {
    /// Transactions keyed by id.
    pub ledger: Arc<RwLock<HashMap<String, Transaction>>>,
    pub gateway: GatewayConfig,
    /// Optional LLM client. `None` if LLM env vars are not configured.
    pub llm: Option<Arc<dyn LlmChat>>,
    pub ai_max_tokens: u32,
}

impl AppState {
    #[must_use]
    pub fn new(config: &ServerConfig, llm: Option<Arc<dyn LlmChat>>) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(HashMap::new())),
            gateway: config.gateway,
            llm,
            ai_max_tokens: config.ai_max_tokens,
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn new_state_has_empty_ledger() {
        let state = test_helpers::test_app_state();
        assert!(state.ledger.read().await.is_empty());
        assert!(state.llm.is_none());
        assert_eq!(state.ai_max_tokens, 200);
    }

    #[tokio::test]
    async fn clones_share_the_ledger() {
        let state = test_helpers::test_app_state();
        let other = state.clone();
        let id = test_helpers::seed_transaction(&state, PaymentStatus::Pending).await;
        assert!(other.ledger.read().await.contains_key(&id));
    }

    #[test]
    fn transaction_serializes_plan_and_status_lowercase() {
        let txn = Transaction {
            id: "TXN1".into(),
            phone_number: "254712345678".into(),
            amount: 5000,
            plan: Plan::Enterprise,
            status: PaymentStatus::Completed,
            created_at_ms: 1,
        };
        let value = serde_json::to_value(&txn).unwrap();
        assert_eq!(value["plan"], "enterprise");
        assert_eq!(value["status"], "completed");
    }
}
