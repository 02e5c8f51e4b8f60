//! # Error Taxonomy
//!
//! One error type for the whole pipeline. Variants are ordered by where in
//! the pipeline they can happen: the first three are caught locally before
//! any network call, the rest come back from the node.
//!
//! Nothing in this crate retries. A failed group is rebuilt by the caller
//! from scratch, never resumed.

use thiserror::Error;

use crate::crypto::mnemonic::MnemonicError;
use crate::identity::address::AddressError;

/// Everything that can go wrong between "here is what I want to do" and
/// "it landed in round N".
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A typed argument or transaction field is malformed: bad address,
    /// empty required string, oversized asset name, wrong lease length.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The group as a whole is unusable: too many members, duplicate
    /// members, or a pipeline step called out of order.
    #[error("invalid group composition: {0}")]
    InvalidGroupComposition(String),

    /// A member's signing credential could not be turned into a key.
    #[error("invalid credential for group member {index}: {reason}")]
    InvalidCredential { index: usize, reason: String },

    /// Transport-level failure talking to the node.
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    /// The node answered, but not with anything we can parse.
    #[error("malformed node response: {0}")]
    MalformedResponse(String),

    /// Submitted but not confirmed within the round ceiling. The transaction
    /// may still land later.
    #[error("transaction {tx_id} not confirmed within {rounds} rounds")]
    ConfirmationTimeout { tx_id: String, rounds: u64 },

    /// The node explicitly refused the submission.
    #[error("transaction rejected: {0}")]
    TransactionRejected(String),
}

impl ProtocolError {
    /// `true` for errors detected before anything touched the network.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ProtocolError::InvalidArgument(_)
                | ProtocolError::InvalidGroupComposition(_)
                | ProtocolError::InvalidCredential { .. }
        )
    }
}

impl From<AddressError> for ProtocolError {
    fn from(err: AddressError) -> Self {
        ProtocolError::InvalidArgument(err.to_string())
    }
}

impl From<MnemonicError> for ProtocolError {
    fn from(err: MnemonicError) -> Self {
        ProtocolError::InvalidArgument(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_errors_are_flagged() {
        assert!(ProtocolError::InvalidArgument("x".into()).is_local());
        assert!(ProtocolError::InvalidCredential {
            index: 1,
            reason: "bad".into()
        }
        .is_local());
        assert!(!ProtocolError::NetworkUnavailable("down".into()).is_local());
        assert!(!ProtocolError::ConfirmationTimeout {
            tx_id: "T".into(),
            rounds: 4
        }
        .is_local());
    }

    #[test]
    fn address_errors_become_invalid_argument() {
        let err: ProtocolError = AddressError::InvalidLength(3).into();
        assert!(matches!(err, ProtocolError::InvalidArgument(_)));
    }

    #[test]
    fn timeout_message_names_the_transaction() {
        let err = ProtocolError::ConfirmationTimeout {
            tx_id: "ABC".into(),
            rounds: 4,
        };
        assert_eq!(
            err.to_string(),
            "transaction ABC not confirmed within 4 rounds"
        );
    }
}
