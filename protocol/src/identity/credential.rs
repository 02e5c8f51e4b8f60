//! # Signing Credentials
//!
//! A [`Credential`] is the secret an intent carries in place of a resolved
//! account. It stays inert text (or bytes) until the group pipeline resolves
//! it, immediately before the first network call, into an [`Account`] that
//! lives exactly as long as the signing step.

use std::fmt;

use super::account::Account;
use super::address::Address;
use crate::crypto::mnemonic::MnemonicError;

/// The secret behind a transaction sender.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// A 25-word mnemonic phrase.
    Mnemonic(String),
    /// A raw 32-byte seed.
    Seed([u8; 32]),
}

impl Credential {
    pub fn mnemonic(phrase: impl Into<String>) -> Self {
        Credential::Mnemonic(phrase.into())
    }

    pub fn seed(seed: [u8; 32]) -> Self {
        Credential::Seed(seed)
    }

    /// Derive the signing account.
    pub fn resolve(&self) -> Result<Account, MnemonicError> {
        match self {
            Credential::Mnemonic(phrase) => Account::from_mnemonic(phrase),
            Credential::Seed(seed) => Ok(Account::from_seed(seed)),
        }
    }

    /// The sender address, without keeping the account around.
    pub fn address(&self) -> Result<Address, MnemonicError> {
        self.resolve().map(|account| *account.address())
    }
}

impl From<&Account> for Credential {
    fn from(account: &Account) -> Self {
        Credential::Seed(account.seed())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Mnemonic(_) => f.write_str("Credential::Mnemonic(<redacted>)"),
            Credential::Seed(_) => f.write_str("Credential::Seed(<redacted>)"),
        }
    }
}
