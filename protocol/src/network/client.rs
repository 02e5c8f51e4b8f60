//! The node seam.
//!
//! Everything the pipeline needs from an Algorand node, as one object-safe
//! trait. [`super::AlgodClient`] speaks REST to a real algod; tests plug in
//! [`super::memory::MemoryNode`].

use async_trait::async_trait;

use crate::error::ProtocolError;
use crate::identity::Address;
use crate::transaction::SuggestedParams;

use super::confirmation;
use super::rpc::{AccountInfo, NodeStatus, PendingTransactionInfo};

#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Current network parameters, with the fee still per byte.
    async fn suggested_params(&self) -> Result<SuggestedParams, ProtocolError>;

    /// Compile TEAL source into program bytes.
    async fn compile_program(&self, source: &str) -> Result<Vec<u8>, ProtocolError>;

    /// Submit signed payloads in one call. Returns the first transaction id.
    async fn submit_signed_transactions(
        &self,
        payloads: &[Vec<u8>],
    ) -> Result<String, ProtocolError>;

    async fn account_info(&self, address: &Address) -> Result<AccountInfo, ProtocolError>;

    async fn pending_transaction_info(
        &self,
        tx_id: &str,
    ) -> Result<PendingTransactionInfo, ProtocolError>;

    async fn status(&self) -> Result<NodeStatus, ProtocolError>;

    /// Block until the node has seen a round after `round`.
    async fn status_after_block(&self, round: u64) -> Result<NodeStatus, ProtocolError>;

    /// Poll until `tx_id` is committed. See [`confirmation::wait_for_confirmation`].
    async fn wait_for_confirmation(
        &self,
        tx_id: &str,
        max_rounds: u64,
    ) -> Result<u64, ProtocolError> {
        confirmation::wait_for_confirmation(self, tx_id, max_rounds).await
    }
}
