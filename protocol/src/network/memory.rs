//! In-memory node for tests.
//!
//! Behaves like a single algod on a private network: rounds advance only when
//! someone waits for a block, submissions commit atomically after a
//! configurable number of rounds, and every call is counted so tests can
//! assert what did (and did not) reach the network.
//!
//! Clones share state, so a test can hand one clone to a sender and keep
//! another for inspection.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::ProtocolError;
use crate::identity::Address;
use crate::transaction::{transaction_id_from_signed, SuggestedParams};

use super::client::NodeClient;
use super::rpc::{AccountInfo, NodeStatus, PendingTransactionInfo};

const GENESIS_ID: &str = "memnet-v1";
const GENESIS_HASH: [u8; 32] = [0x6d; 32];
const FIRST_APP_ID: u64 = 1_001;
const FIRST_ASSET_ID: u64 = 5_001;
/// Compiled programs are the source behind this version byte.
const PROGRAM_VERSION: u8 = 0x08;

#[derive(Debug, Clone)]
struct Pending {
    submitted_round: u64,
    pool_error: String,
    created_app: Option<u64>,
    created_asset: Option<u64>,
}

#[derive(Debug, Default)]
struct Counters {
    params: usize,
    compile: usize,
    submit: usize,
    pending: usize,
    status: usize,
    account: usize,
}

#[derive(Debug)]
struct State {
    last_round: u64,
    fee_per_byte: u64,
    min_fee: u64,
    validity_window: u64,
    /// Rounds from submission to commit; `None` never commits.
    confirm_delay: Option<u64>,
    /// How long waiting for the next block takes; instant when `None`.
    block_time: Option<Duration>,
    reject_reason: Option<String>,
    /// Id answered to every submission instead of the real first id.
    reported_tx_id: Option<String>,
    offline: bool,
    submissions: Vec<Vec<Vec<u8>>>,
    pending: HashMap<String, Pending>,
    accounts: HashMap<Address, AccountInfo>,
    next_app_id: u64,
    next_asset_id: u64,
    calls: Counters,
}

impl Default for State {
    fn default() -> Self {
        Self {
            last_round: 1_000,
            fee_per_byte: 0,
            min_fee: 1_000,
            validity_window: 1_000,
            confirm_delay: Some(1),
            block_time: None,
            reject_reason: None,
            reported_tx_id: None,
            offline: false,
            submissions: Vec::new(),
            pending: HashMap::new(),
            accounts: HashMap::new(),
            next_app_id: FIRST_APP_ID,
            next_asset_id: FIRST_ASSET_ID,
            calls: Counters::default(),
        }
    }
}

impl State {
    fn check_online(&self) -> Result<(), ProtocolError> {
        if self.offline {
            return Err(ProtocolError::NetworkUnavailable("memory node is offline".into()));
        }
        Ok(())
    }

    fn confirmed_round(&self, pending: &Pending) -> Option<u64> {
        let delay = self.confirm_delay?;
        let round = pending.submitted_round + delay;
        (pending.pool_error.is_empty() && self.last_round >= round).then_some(round)
    }
}

/// Application create: an `appl` without an `apid`.
fn creates_app(payload: &[u8]) -> bool {
    contains(payload, b"\xa4appl") && !contains(payload, b"\xa4apid")
}

/// Asset create: an `acfg` without a `caid`.
fn creates_asset(payload: &[u8]) -> bool {
    contains(payload, b"\xa4acfg") && !contains(payload, b"\xa4caid")
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[derive(Debug, Clone, Default)]
pub struct MemoryNode {
    state: Arc<Mutex<State>>,
}

impl MemoryNode {
    pub fn new() -> Self {
        Self::default()
    }

    // -- configuration ------------------------------------------------------

    pub fn with_confirm_delay(self, rounds: Option<u64>) -> Self {
        self.state.lock().confirm_delay = rounds;
        self
    }

    pub fn with_block_time(self, block_time: Duration) -> Self {
        self.state.lock().block_time = Some(block_time);
        self
    }

    pub fn with_last_round(self, round: u64) -> Self {
        self.state.lock().last_round = round;
        self
    }

    pub fn with_fee_per_byte(self, fee: u64) -> Self {
        self.state.lock().fee_per_byte = fee;
        self
    }

    pub fn with_account(self, info: AccountInfo) -> Self {
        self.set_account(info);
        self
    }

    pub fn set_account(&self, info: AccountInfo) {
        self.state.lock().accounts.insert(info.address, info);
    }

    /// Refuse every following submission with `reason`.
    pub fn reject_submissions(&self, reason: impl Into<String>) {
        self.state.lock().reject_reason = Some(reason.into());
    }

    /// Answer every following submission with `tx_id`, as a misbehaving
    /// node would.
    pub fn report_tx_id(&self, tx_id: impl Into<String>) {
        self.state.lock().reported_tx_id = Some(tx_id.into());
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }

    /// Make `tx_id` report a pool error, as if it was evicted.
    pub fn set_pool_error(&self, tx_id: &str, error: impl Into<String>) {
        let mut state = self.state.lock();
        let round = state.last_round;
        state
            .pending
            .entry(tx_id.to_string())
            .or_insert(Pending {
                submitted_round: round,
                pool_error: String::new(),
                created_app: None,
                created_asset: None,
            })
            .pool_error = error.into();
    }

    // -- inspection ---------------------------------------------------------

    pub fn last_round(&self) -> u64 {
        self.state.lock().last_round
    }

    /// Every accepted submission call, payloads in submission order.
    pub fn submissions(&self) -> Vec<Vec<Vec<u8>>> {
        self.state.lock().submissions.clone()
    }

    /// Ids of every transaction the node accepted.
    pub fn accepted(&self) -> Vec<String> {
        self.state.lock().pending.keys().cloned().collect()
    }

    /// `true` once `tx_id` has been committed to a round.
    pub fn is_committed(&self, tx_id: &str) -> bool {
        let state = self.state.lock();
        state
            .pending
            .get(tx_id)
            .and_then(|p| state.confirmed_round(p))
            .is_some()
    }

    pub fn params_calls(&self) -> usize {
        self.state.lock().calls.params
    }

    pub fn compile_calls(&self) -> usize {
        self.state.lock().calls.compile
    }

    pub fn submit_calls(&self) -> usize {
        self.state.lock().calls.submit
    }

    pub fn pending_calls(&self) -> usize {
        self.state.lock().calls.pending
    }

    pub fn status_calls(&self) -> usize {
        self.state.lock().calls.status
    }

    /// Total calls of any kind.
    pub fn network_calls(&self) -> usize {
        let state = self.state.lock();
        let calls = &state.calls;
        calls.params + calls.compile + calls.submit + calls.pending + calls.status + calls.account
    }
}

#[async_trait]
impl NodeClient for MemoryNode {
    async fn suggested_params(&self) -> Result<SuggestedParams, ProtocolError> {
        let mut state = self.state.lock();
        state.calls.params += 1;
        state.check_online()?;
        Ok(SuggestedParams {
            fee: state.fee_per_byte,
            flat_fee: false,
            min_fee: state.min_fee,
            first_valid: state.last_round,
            last_valid: state.last_round + state.validity_window,
            genesis_id: GENESIS_ID.to_string(),
            genesis_hash: GENESIS_HASH,
        })
    }

    async fn compile_program(&self, source: &str) -> Result<Vec<u8>, ProtocolError> {
        let mut state = self.state.lock();
        state.calls.compile += 1;
        state.check_online()?;
        if source.trim().is_empty() {
            return Err(ProtocolError::InvalidArgument(
                "program does not compile: empty source".into(),
            ));
        }
        let mut program = vec![PROGRAM_VERSION];
        program.extend_from_slice(source.as_bytes());
        Ok(program)
    }

    async fn submit_signed_transactions(
        &self,
        payloads: &[Vec<u8>],
    ) -> Result<String, ProtocolError> {
        let mut state = self.state.lock();
        state.calls.submit += 1;
        state.check_online()?;
        if let Some(reason) = &state.reject_reason {
            return Err(ProtocolError::TransactionRejected(reason.clone()));
        }

        let ids = payloads
            .iter()
            .map(|p| {
                transaction_id_from_signed(p).ok_or_else(|| {
                    ProtocolError::TransactionRejected("payload is not a signed transaction".into())
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let first = ids.first().cloned().ok_or_else(|| {
            ProtocolError::TransactionRejected("empty submission".into())
        })?;

        let round = state.last_round;
        for (id, payload) in ids.into_iter().zip(payloads) {
            let created_app = creates_app(payload).then(|| {
                state.next_app_id += 1;
                state.next_app_id - 1
            });
            let created_asset = creates_asset(payload).then(|| {
                state.next_asset_id += 1;
                state.next_asset_id - 1
            });
            state.pending.insert(
                id,
                Pending {
                    submitted_round: round,
                    pool_error: String::new(),
                    created_app,
                    created_asset,
                },
            );
        }
        state.submissions.push(payloads.to_vec());
        Ok(state.reported_tx_id.clone().unwrap_or(first))
    }

    async fn account_info(&self, address: &Address) -> Result<AccountInfo, ProtocolError> {
        let mut state = self.state.lock();
        state.calls.account += 1;
        state.check_online()?;
        Ok(state
            .accounts
            .get(address)
            .cloned()
            .unwrap_or_else(|| AccountInfo::new(*address, 0)))
    }

    async fn pending_transaction_info(
        &self,
        tx_id: &str,
    ) -> Result<PendingTransactionInfo, ProtocolError> {
        let mut state = self.state.lock();
        state.calls.pending += 1;
        state.check_online()?;
        let Some(pending) = state.pending.get(tx_id) else {
            return Ok(PendingTransactionInfo::default());
        };
        Ok(PendingTransactionInfo {
            confirmed_round: state.confirmed_round(pending),
            pool_error: pending.pool_error.clone(),
            created_asset_id: pending.created_asset,
            created_application_id: pending.created_app,
        })
    }

    async fn status(&self) -> Result<NodeStatus, ProtocolError> {
        let mut state = self.state.lock();
        state.calls.status += 1;
        state.check_online()?;
        Ok(NodeStatus {
            last_round: state.last_round,
        })
    }

    async fn status_after_block(&self, round: u64) -> Result<NodeStatus, ProtocolError> {
        let block_time = self.state.lock().block_time;
        if let Some(block_time) = block_time {
            tokio::time::sleep(block_time).await;
        }
        let mut state = self.state.lock();
        state.calls.status += 1;
        state.check_online()?;
        state.last_round = state.last_round.max(round + 1);
        Ok(NodeStatus {
            last_round: state.last_round,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn waiting_advances_rounds() {
        let node = MemoryNode::new().with_last_round(10);
        let status = node.status_after_block(10).await.unwrap();
        assert_eq!(status.last_round, 11);
        // Waiting for a past round returns immediately.
        assert_eq!(node.status_after_block(3).await.unwrap().last_round, 11);
    }

    #[tokio::test]
    async fn offline_node_fails_every_call() {
        let node = MemoryNode::new();
        node.set_offline(true);
        assert!(matches!(
            node.suggested_params().await,
            Err(ProtocolError::NetworkUnavailable(_))
        ));
        assert!(matches!(node.status().await, Err(ProtocolError::NetworkUnavailable(_))));
    }

    #[tokio::test]
    async fn unknown_accounts_are_empty() {
        let node = MemoryNode::new();
        let info = node.account_info(&Address::ZERO).await.unwrap();
        assert_eq!(info.amount, 0);
    }

    #[tokio::test]
    async fn garbage_payload_is_rejected() {
        let node = MemoryNode::new();
        let err = node
            .submit_signed_transactions(&[b"nope".to_vec()])
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::TransactionRejected(_)));
        assert!(node.submissions().is_empty());
    }

    #[test]
    fn creation_detection() {
        assert!(creates_app(b"..\xa4type\xa4appl.."));
        assert!(!creates_app(b"\xa4apid\x05\xa4type\xa4appl"));
        assert!(creates_asset(b"\xa4apar..\xa4type\xa4acfg"));
        assert!(!creates_asset(b"\xa4caid\x07\xa4type\xa4acfg"));
    }
}
