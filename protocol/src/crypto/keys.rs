//! # Key Management
//!
//! Ed25519 keypairs for Algorand accounts. An Algorand secret is a 32-byte
//! seed; the public key derived from it *is* the account (the address is just
//! the public key plus a checksum, see [`crate::identity::address`]).
//!
//! ## Security considerations
//!
//! - Signing keys are zeroized on drop (ed25519-dalek does this for us).
//! - Generation uses `OsRng`.
//! - Key bytes are never logged, and `Debug` only ever shows the public half.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use std::fmt;
use thiserror::Error;

/// Length of an Ed25519 signature.
pub const SIGNATURE_LENGTH: usize = 64;

/// Errors that can occur during key operations.
///
/// Deliberately terse. Error messages are not the place to describe key
/// material.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: expected 32")]
    InvalidSecretKey,

    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,
}

/// An Ed25519 signing keypair.
///
/// Intentionally not `Serialize`. Exporting a secret goes through
/// [`Keypair::seed`] or a mnemonic, both of which are explicit.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Deterministic keypair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Keypair from a seed slice of unknown length.
    pub fn try_from_slice(seed: &[u8]) -> Result<Self, KeyError> {
        let seed: [u8; 32] = seed.try_into().map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self::from_seed(&seed))
    }

    /// The 32-byte public key.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// The 32-byte seed. Handle with care.
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Deterministic Ed25519 signature over `message`.
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Check a signature against this keypair's public key.
    pub fn verify(&self, message: &[u8], signature: &[u8; SIGNATURE_LENGTH]) -> bool {
        verify_signature(&self.public_key_bytes(), message, signature)
    }
}

/// Check `signature` over `message` against a raw 32-byte public key.
///
/// Returns `false` rather than an error for anything that doesn't verify,
/// including public keys that aren't valid curve points.
pub fn verify_signature(
    public_key: &[u8; 32],
    message: &[u8],
    signature: &[u8; SIGNATURE_LENGTH],
) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    verifying_key
        .verify(message, &Signature::from_bytes(signature))
        .is_ok()
}

impl Clone for Keypair {
    fn clone(&self) -> Self {
        Self::from_seed(&self.signing_key.to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair(pub={})", hex::encode(self.public_key_bytes()))
    }
}

impl PartialEq for Keypair {
    /// Compares public keys only.
    fn eq(&self, other: &Self) -> bool {
        self.public_key_bytes() == other.public_key_bytes()
    }
}

impl Eq for Keypair {}
