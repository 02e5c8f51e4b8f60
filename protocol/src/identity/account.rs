//! An Algorand account: a keypair plus the address derived from it.

use std::fmt;

use super::address::Address;
use crate::crypto::keys::{Keypair, SIGNATURE_LENGTH};
use crate::crypto::mnemonic::{mnemonic_from_seed, seed_from_mnemonic, MnemonicError};

/// A signing account.
///
/// Never serialized and never logged beyond its address. Accounts are meant
/// to live for the duration of one signing step; long-lived code holds a
/// [`super::Credential`] instead and resolves it when it needs to sign.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    keypair: Keypair,
    address: Address,
}

impl Account {
    /// Brand new account from the OS RNG.
    pub fn generate() -> Self {
        Self::from_keypair(Keypair::generate())
    }

    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self::from_keypair(Keypair::from_seed(seed))
    }

    pub fn from_mnemonic(phrase: &str) -> Result<Self, MnemonicError> {
        Ok(Self::from_seed(&seed_from_mnemonic(phrase)?))
    }

    fn from_keypair(keypair: Keypair) -> Self {
        let address = Address::from_public_key(keypair.public_key_bytes());
        Self { keypair, address }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The 25-word backup phrase for this account.
    pub fn to_mnemonic(&self) -> String {
        mnemonic_from_seed(&self.keypair.seed())
    }

    pub fn seed(&self) -> [u8; 32] {
        self.keypair.seed()
    }

    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        self.keypair.sign(message)
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Account({})", self.address)
    }
}
