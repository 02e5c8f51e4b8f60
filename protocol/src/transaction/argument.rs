//! # Application Call Arguments
//!
//! On-chain programs read their arguments as raw byte strings and decide for
//! themselves how to interpret them. The convention Plato's programs use:
//!
//! | variant | encoding |
//! |---|---|
//! | `Address` | the 32 raw public-key bytes (no checksum) |
//! | `Number`  | 8 bytes, big-endian (`btoi` on chain) |
//! | `String`  | UTF-8 bytes, variable length |
//! | `Raw`     | bytes as given |
//!
//! The same encoding is used for transaction notes and leases, so every
//! byte payload that enters a transaction goes through [`AppArgument`].
//!
//! Validation happens when an argument is constructed, so a malformed
//! address or an empty string fails on the caller's line, long before the
//! pipeline reaches the network.

use crate::error::ProtocolError;
use crate::identity::Address;

/// A typed, pre-validated call argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppArgument {
    Address(Address),
    Number(u64),
    String(String),
    Raw(Vec<u8>),
}

impl AppArgument {
    /// Parse and checksum-validate an address argument.
    pub fn address(address: &str) -> Result<Self, ProtocolError> {
        let parsed: Address = address
            .parse()
            .map_err(|e| ProtocolError::InvalidArgument(format!("address {address:?}: {e}")))?;
        Ok(AppArgument::Address(parsed))
    }

    pub fn number(value: u64) -> Self {
        AppArgument::Number(value)
    }

    /// A non-empty string argument.
    pub fn string(value: impl Into<String>) -> Result<Self, ProtocolError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ProtocolError::InvalidArgument(
                "string argument must not be empty".into(),
            ));
        }
        Ok(AppArgument::String(value))
    }

    pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
        AppArgument::Raw(bytes.into())
    }

    /// Re-check the invariants of a variant that may have been built
    /// directly rather than through the constructors.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            AppArgument::String(s) if s.is_empty() => Err(ProtocolError::InvalidArgument(
                "string argument must not be empty".into(),
            )),
            _ => Ok(()),
        }
    }

    /// The on-chain byte representation.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            AppArgument::Address(address) => address.public_key().to_vec(),
            AppArgument::Number(n) => n.to_be_bytes().to_vec(),
            AppArgument::String(s) => s.as_bytes().to_vec(),
            AppArgument::Raw(bytes) => bytes.clone(),
        }
    }
}

impl From<Address> for AppArgument {
    fn from(address: Address) -> Self {
        AppArgument::Address(address)
    }
}

impl From<u64> for AppArgument {
    fn from(value: u64) -> Self {
        AppArgument::Number(value)
    }
}

impl TryFrom<i64> for AppArgument {
    type Error = ProtocolError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value).map(AppArgument::Number).map_err(|_| {
            ProtocolError::InvalidArgument(format!("{value} is not an unsigned 64-bit integer"))
        })
    }
}

impl TryFrom<u128> for AppArgument {
    type Error = ProtocolError;

    fn try_from(value: u128) -> Result<Self, Self::Error> {
        u64::try_from(value).map(AppArgument::Number).map_err(|_| {
            ProtocolError::InvalidArgument(format!("{value} does not fit in 64 bits"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ";

    #[test]
    fn address_encodes_to_public_key() {
        let arg = AppArgument::address(ZERO).unwrap();
        assert_eq!(arg.encode(), vec![0u8; 32]);
    }

    #[test]
    fn address_encoding_is_deterministic() {
        let account = crate::identity::Account::from_seed(&[1u8; 32]);
        let text = account.address().to_string();
        let a = AppArgument::address(&text).unwrap().encode();
        let b = AppArgument::address(&text).unwrap().encode();
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn malformed_addresses_fail() {
        let bad_checksum = format!("B{}", &ZERO[1..]);
        let cases: [&str; 4] = ["", "nope", &ZERO[1..], &bad_checksum];
        for bad in cases {
            let err = AppArgument::address(bad).unwrap_err();
            assert!(matches!(err, ProtocolError::InvalidArgument(_)), "{bad}");
        }
    }

    #[test]
    fn numbers_are_big_endian() {
        assert_eq!(
            AppArgument::number(0x0102).encode(),
            vec![0, 0, 0, 0, 0, 0, 1, 2]
        );
        assert_eq!(AppArgument::number(u64::MAX).encode(), vec![0xff; 8]);
    }

    #[test]
    fn negative_and_oversized_numbers_fail() {
        assert!(AppArgument::try_from(-1i64).is_err());
        assert!(AppArgument::try_from(u128::from(u64::MAX) + 1).is_err());
        assert_eq!(
            AppArgument::try_from(5i64).unwrap(),
            AppArgument::Number(5)
        );
    }

    #[test]
    fn strings_must_be_non_empty() {
        assert!(AppArgument::string("").is_err());
        assert_eq!(
            AppArgument::string("CANCEL").unwrap().encode(),
            b"CANCEL".to_vec()
        );
    }

    #[test]
    fn validate_catches_directly_built_empty_string() {
        assert!(AppArgument::String(String::new()).validate().is_err());
        assert!(AppArgument::Raw(Vec::new()).validate().is_ok());
    }
}
