use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use super::*;
use crate::billing::{InitiateResponse, StatusResponse};

// =========================================================================
// ScriptedApi
// =========================================================================

/// Replays scripted status replies; once the script runs out it repeats
/// `fallback` forever.
struct ScriptedApi {
    initiate: Result<InitiateResponse, PaymentError>,
    script: Mutex<VecDeque<Result<PaymentStatus, PaymentError>>>,
    fallback: PaymentStatus,
    initiated: AtomicU32,
    checks: AtomicU32,
}

impl ScriptedApi {
    fn new(script: Vec<Result<PaymentStatus, PaymentError>>, fallback: PaymentStatus) -> Self {
        Self {
            initiate: Ok(InitiateResponse {
                success: true,
                transaction_id: Some("TXN1".into()),
                message: "Payment initiated successfully".into(),
            }),
            script: Mutex::new(script.into()),
            fallback,
            initiated: AtomicU32::new(0),
            checks: AtomicU32::new(0),
        }
    }

    fn always(status: PaymentStatus) -> Self {
        Self::new(Vec::new(), status)
    }

    fn failing_initiate(err: PaymentError) -> Self {
        Self { initiate: Err(err), ..Self::always(PaymentStatus::Pending) }
    }
}

#[async_trait::async_trait]
impl PaymentApi for ScriptedApi {
    async fn initiate(&self, _request: &InitiateRequest) -> Result<InitiateResponse, PaymentError> {
        self.initiated.fetch_add(1, Ordering::SeqCst);
        self.initiate.clone()
    }

    async fn status(&self, transaction_id: &str) -> Result<StatusResponse, PaymentError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front().unwrap_or(Ok(self.fallback));
        next.map(|status| StatusResponse {
            transaction_id: transaction_id.to_owned(),
            status,
            timestamp: None,
            message: None,
        })
    }
}

fn flow(api: ScriptedApi) -> PaymentFlow<ScriptedApi> {
    PaymentFlow::new(api, PollPolicy::default())
}

// =========================================================================
// start
// =========================================================================

#[tokio::test]
async fn invalid_phone_is_not_attempted() {
    let mut flow = flow(ScriptedApi::always(PaymentStatus::Completed));
    let err = flow.start("12345", 1500, Plan::Pro).await.unwrap_err();
    assert!(matches!(err, PaymentError::InvalidPhone(_)));
    assert_eq!(flow.state(), &PaymentState::Idle);
    assert_eq!(flow.api().initiated.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_phone_is_not_attempted() {
    let mut flow = flow(ScriptedApi::always(PaymentStatus::Completed));
    assert_eq!(flow.start("", 1500, Plan::Pro).await.unwrap_err(), PaymentError::MissingPhone);
    assert_eq!(flow.state(), &PaymentState::Idle);
}

#[tokio::test]
async fn start_moves_to_pending() {
    let mut flow = flow(ScriptedApi::always(PaymentStatus::Completed));
    let state = flow.start("0712345678", 1500, Plan::Pro).await.unwrap();
    assert_eq!(state, &PaymentState::Pending { transaction_id: "TXN1".into() });
}

#[tokio::test]
async fn failed_initiation_is_terminal() {
    let mut flow = flow(ScriptedApi::failing_initiate(PaymentError::Network("refused".into())));
    let err = flow.start("0712345678", 1500, Plan::Pro).await.unwrap_err();
    assert_eq!(err, PaymentError::Network("refused".into()));
    assert!(matches!(flow.state(), PaymentState::Failed { .. }));
    assert!(flow.state().is_terminal());
}

#[tokio::test]
async fn reply_without_transaction_id_fails() {
    for transaction_id in [None, Some("  ".to_owned())] {
        let reply = InitiateResponse { success: true, transaction_id, message: "ok".into() };
        let api = ScriptedApi { initiate: Ok(reply), ..ScriptedApi::always(PaymentStatus::Completed) };
        let mut flow = flow(api);
        let err = flow.start("0712345678", 1500, Plan::Pro).await.unwrap_err();
        assert!(matches!(err, PaymentError::UnexpectedResponse(_)));
        assert!(matches!(flow.state(), PaymentState::Failed { .. }));

        // Nothing to poll once failed.
        flow.poll_until_settled().await;
        assert_eq!(flow.api().checks.load(Ordering::SeqCst), 0);
    }
}

// =========================================================================
// poll_until_settled
// =========================================================================

#[tokio::test(start_paused = true)]
async fn completes_on_first_check() {
    let mut flow = flow(ScriptedApi::always(PaymentStatus::Completed));
    let state = flow.run("0712345678", 1500, Plan::Pro).await.unwrap().clone();
    assert_eq!(state, PaymentState::Succeeded { transaction_id: "TXN1".into() });
    assert_eq!(flow.status_checks(), 1);
}

#[tokio::test(start_paused = true)]
async fn completes_after_pending_checks() {
    let script = vec![Ok(PaymentStatus::Pending), Ok(PaymentStatus::Pending), Ok(PaymentStatus::Completed)];
    let mut flow = flow(ScriptedApi::new(script, PaymentStatus::Pending));
    let started = tokio::time::Instant::now();
    flow.run("0712345678", 1500, Plan::Pro).await.unwrap();
    assert!(matches!(flow.state(), PaymentState::Succeeded { .. }));
    assert_eq!(flow.status_checks(), 3);
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(20) && waited < Duration::from_secs(21), "{waited:?}");
}

#[tokio::test(start_paused = true)]
async fn failed_status_stops_polling() {
    let script = vec![Ok(PaymentStatus::Pending), Ok(PaymentStatus::Failed)];
    let mut flow = flow(ScriptedApi::new(script, PaymentStatus::Completed));
    flow.run("0712345678", 1500, Plan::Pro).await.unwrap();
    assert!(matches!(flow.state(), PaymentState::Failed { .. }));
    assert_eq!(flow.api().checks.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn always_pending_times_out_after_thirty_retries() {
    let mut flow = flow(ScriptedApi::always(PaymentStatus::Pending));
    let started = tokio::time::Instant::now();
    let state = flow.run("0712345678", 1500, Plan::Pro).await.unwrap().clone();

    assert_eq!(state, PaymentState::TimedOut { transaction_id: "TXN1".into() });
    assert!(state.is_terminal());
    // One initial check plus 30 retries, 10 s apart.
    assert_eq!(flow.status_checks(), 31);
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(300) && waited < Duration::from_secs(301), "{waited:?}");

    // Terminal: polling again makes no further requests.
    flow.poll_until_settled().await;
    assert_eq!(flow.api().checks.load(Ordering::SeqCst), 31);
}

#[tokio::test(start_paused = true)]
async fn network_errors_count_as_attempts() {
    let script = vec![Err(PaymentError::Network("timeout".into())); 3];
    let api = ScriptedApi::new(script, PaymentStatus::Pending);
    let mut flow = PaymentFlow::new(api, PollPolicy { interval: Duration::from_secs(1), max_retries: 2 });
    flow.run("0712345678", 1500, Plan::Pro).await.unwrap();
    assert!(matches!(flow.state(), PaymentState::TimedOut { .. }));
    assert_eq!(flow.status_checks(), 3);
}

#[tokio::test(start_paused = true)]
async fn network_error_then_completion_succeeds() {
    let script = vec![Err(PaymentError::Network("reset".into())), Ok(PaymentStatus::Completed)];
    let mut flow = flow(ScriptedApi::new(script, PaymentStatus::Pending));
    flow.run("0712345678", 1500, Plan::Pro).await.unwrap();
    assert!(matches!(flow.state(), PaymentState::Succeeded { .. }));
}

#[tokio::test]
async fn poll_while_idle_is_noop() {
    let mut flow = flow(ScriptedApi::always(PaymentStatus::Completed));
    assert_eq!(flow.poll_until_settled().await, &PaymentState::Idle);
    assert_eq!(flow.status_checks(), 0);
}

// =========================================================================
// PaymentState
// =========================================================================

#[test]
fn state_serializes_with_tag() {
    let value = serde_json::to_value(PaymentState::Pending { transaction_id: "TXN9".into() }).unwrap();
    assert_eq!(value, serde_json::json!({"state": "pending", "transaction_id": "TXN9"}));
}

#[test]
fn only_settled_states_are_terminal() {
    assert!(!PaymentState::Idle.is_terminal());
    assert!(!PaymentState::Initiating.is_terminal());
    assert!(!PaymentState::Pending { transaction_id: String::new() }.is_terminal());
    assert!(PaymentState::TimedOut { transaction_id: String::new() }.is_terminal());
    assert!(PaymentState::TimedOut { transaction_id: String::new() }.message().contains("timed out"));
}
