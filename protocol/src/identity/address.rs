//! # Algorand Addresses
//!
//! An address is a 32-byte Ed25519 public key. Its textual form appends a
//! 4-byte checksum (the last four bytes of SHA-512/256 of the key) and
//! base32-encodes the 36 bytes without padding, giving 58 characters.
//!
//! Parsing always validates the checksum, which catches nearly every typo
//! before it can become a transaction to nowhere.

use data_encoding::BASE32_NOPAD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::crypto::hash::{sha512_256, sha512_256_prefixed, APP_ID_DOMAIN};

/// Length of the textual form.
pub const ADDRESS_LENGTH: usize = 58;

const PUBLIC_KEY_LENGTH: usize = 32;
const CHECKSUM_LENGTH: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address must be {ADDRESS_LENGTH} characters, got {0}")]
    InvalidLength(usize),

    #[error("address is not valid base32")]
    InvalidEncoding,

    #[error("address checksum mismatch")]
    ChecksumMismatch,
}

/// A checksummed Algorand account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; PUBLIC_KEY_LENGTH]);

impl Address {
    /// The all-zero address. Used as "nobody" in application arguments.
    pub const ZERO: Address = Address([0u8; PUBLIC_KEY_LENGTH]);

    pub const fn from_public_key(public_key: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self(public_key)
    }

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; PUBLIC_KEY_LENGTH]
    }

    /// The escrow account controlled by application `app_id`.
    pub fn for_application(app_id: u64) -> Self {
        Self(sha512_256_prefixed(APP_ID_DOMAIN, &app_id.to_be_bytes()))
    }

    fn checksum(&self) -> [u8; CHECKSUM_LENGTH] {
        let digest = sha512_256(&self.0);
        let mut checksum = [0u8; CHECKSUM_LENGTH];
        checksum.copy_from_slice(&digest[PUBLIC_KEY_LENGTH - CHECKSUM_LENGTH..]);
        checksum
    }

    /// The 58-character textual form.
    pub fn encode(&self) -> String {
        let mut bytes = [0u8; PUBLIC_KEY_LENGTH + CHECKSUM_LENGTH];
        bytes[..PUBLIC_KEY_LENGTH].copy_from_slice(&self.0);
        bytes[PUBLIC_KEY_LENGTH..].copy_from_slice(&self.checksum());
        BASE32_NOPAD.encode(&bytes)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ADDRESS_LENGTH {
            return Err(AddressError::InvalidLength(s.len()));
        }
        let bytes = BASE32_NOPAD
            .decode(s.as_bytes())
            .map_err(|_| AddressError::InvalidEncoding)?;
        if bytes.len() != PUBLIC_KEY_LENGTH + CHECKSUM_LENGTH {
            return Err(AddressError::InvalidEncoding);
        }

        let mut public_key = [0u8; PUBLIC_KEY_LENGTH];
        public_key.copy_from_slice(&bytes[..PUBLIC_KEY_LENGTH]);
        let address = Self(public_key);
        if address.checksum()[..] != bytes[PUBLIC_KEY_LENGTH..] {
            return Err(AddressError::ChecksumMismatch);
        }
        Ok(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.encode())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
