//! Transaction signing with Ed25519 keypairs.
//!
//! Signing is a separate step from building because, inside a group, it has
//! to wait until the group id has been stamped on every member. The signed
//! payload is the canonical msgpack map `{"sig": <64 bytes>, "txn": <txn>}`.

use crate::crypto::keys::{verify_signature, SIGNATURE_LENGTH};
use crate::crypto::hash::{sha512_256_prefixed, TX_DOMAIN};
use crate::identity::Account;

use super::builder::Transaction;
use super::encoding::CanonicalMap;

/// Framing in front of the transaction map in a signed payload:
/// map header, `"sig"`, bin8 header + 64 signature bytes, `"txn"`.
const SIGNED_PREFIX_LENGTH: usize = 1 + 4 + 2 + SIGNATURE_LENGTH + 4;

/// A transaction together with its sender's signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signature: [u8; SIGNATURE_LENGTH],
}

impl SignedTransaction {
    /// The bytes submitted to the network.
    pub fn encode(&self) -> Vec<u8> {
        let mut map = CanonicalMap::new();
        map.bytes("sig", &self.signature)
            .raw("txn", self.transaction.encode());
        map.finish()
    }

    pub fn id(&self) -> String {
        self.transaction.id()
    }

    /// Check the signature against the sender address.
    pub fn verify(&self) -> bool {
        verify_signature(
            self.transaction.sender.public_key(),
            &self.transaction.bytes_to_sign(),
            &self.signature,
        )
    }
}

/// Signs a transaction with the sender's account.
///
/// The caller guarantees `account` is the transaction's sender; a mismatch
/// produces a payload the node will reject, and [`SignedTransaction::verify`]
/// will report `false`.
pub fn sign_transaction(transaction: Transaction, account: &Account) -> SignedTransaction {
    let signature = account.sign(&transaction.bytes_to_sign());
    SignedTransaction {
        transaction,
        signature,
    }
}

/// Recover the transaction id from a signed payload produced by
/// [`SignedTransaction::encode`]. Returns `None` for anything else.
pub fn transaction_id_from_signed(payload: &[u8]) -> Option<String> {
    let prefix = payload.get(..SIGNED_PREFIX_LENGTH)?;
    let framed = prefix[0] == 0x82
        && &prefix[1..5] == b"\xa3sig"
        && prefix[5] == 0xc4
        && usize::from(prefix[6]) == SIGNATURE_LENGTH
        && &prefix[SIGNED_PREFIX_LENGTH - 4..] == b"\xa3txn";
    if !framed {
        return None;
    }
    let digest = sha512_256_prefixed(TX_DOMAIN, &payload[SIGNED_PREFIX_LENGTH..]);
    Some(data_encoding::BASE32_NOPAD.encode(&digest))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
