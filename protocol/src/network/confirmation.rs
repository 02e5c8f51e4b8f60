//! # Confirmation Polling
//!
//! Submission is the commit point; confirmation is only observation. The
//! poller asks the node about one transaction once per round, starting with
//! the round after the current one, and gives up after `max_rounds` rounds.
//!
//! ```text
//! start = last_round + 1
//! for round in start..start + max_rounds:
//!     pending(tx) confirmed  → Ok(round)
//!     pending(tx) pool error → TransactionRejected
//!     wait for block after round
//! → ConfirmationTimeout
//! ```
//!
//! A timeout does not mean the transaction failed. It may land later; the
//! caller decides whether to keep looking.

use tracing::{debug, warn};

use crate::error::ProtocolError;

use super::client::NodeClient;

/// Wait until `tx_id` is confirmed and return its round.
pub async fn wait_for_confirmation<C>(
    client: &C,
    tx_id: &str,
    max_rounds: u64,
) -> Result<u64, ProtocolError>
where
    C: NodeClient + ?Sized,
{
    if max_rounds == 0 {
        return Err(ProtocolError::InvalidArgument(
            "max_rounds must be at least 1".into(),
        ));
    }

    let start = client.status().await?.last_round + 1;
    let mut current = start;

    while current < start + max_rounds {
        let info = client.pending_transaction_info(tx_id).await?;
        if let Some(round) = info.confirmed_round.filter(|r| *r > 0) {
            debug!(tx_id, round, "transaction confirmed");
            return Ok(round);
        }
        if !info.pool_error.is_empty() {
            warn!(tx_id, pool_error = %info.pool_error, "transaction dropped from pool");
            return Err(ProtocolError::TransactionRejected(info.pool_error));
        }
        client.status_after_block(current).await?;
        current += 1;
    }

    warn!(tx_id, rounds = max_rounds, "confirmation timed out");
    Err(ProtocolError::ConfirmationTimeout {
        tx_id: tx_id.to_string(),
        rounds: max_rounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::memory::MemoryNode;

    #[tokio::test]
    async fn zero_rounds_is_rejected_locally() {
        let node = MemoryNode::new();
        let err = wait_for_confirmation(&node, "TX", 0).await.unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidArgument(_)));
        assert_eq!(node.status_calls(), 0);
    }

    #[tokio::test]
    async fn never_confirmed_times_out_after_max_rounds() {
        let node = MemoryNode::new().with_confirm_delay(None);
        let start = node.last_round();
        let err = wait_for_confirmation(&node, "UNKNOWN", 4).await.unwrap_err();
        assert!(matches!(err, ProtocolError::ConfirmationTimeout { rounds: 4, .. }));
        assert_eq!(node.pending_calls(), 4);
        // Waited for a block after each of start+1 ..= start+4.
        assert_eq!(node.last_round(), start + 5);
    }

    #[tokio::test]
    async fn pool_error_is_a_rejection() {
        let node = MemoryNode::new();
        node.set_pool_error("UNKNOWN", "overspend");
        let err = wait_for_confirmation(&node, "UNKNOWN", 4).await.unwrap_err();
        assert!(matches!(err, ProtocolError::TransactionRejected(reason) if reason == "overspend"));
    }
}
