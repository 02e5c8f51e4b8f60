//! # Hashing Utilities
//!
//! Algorand uses SHA-512/256 (SHA-512 truncated to 256 bits with its own IVs,
//! not SHA-512 with the tail chopped off) everywhere a digest is needed.
//! Anything that gets hashed for an identifier is first prefixed with a short
//! ASCII domain tag so that a transaction can never collide with a group or
//! an application id.

use sha2::{Digest, Sha512_256};

/// Domain tag for transaction ids and signatures.
pub const TX_DOMAIN: &[u8] = b"TX";

/// Domain tag for transaction group ids.
pub const TX_GROUP_DOMAIN: &[u8] = b"TG";

/// Domain tag for application escrow addresses.
pub const APP_ID_DOMAIN: &[u8] = b"appID";

/// SHA-512/256 of `data`.
pub fn sha512_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha512_256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-512/256 of `domain || data`, without concatenating into a new buffer.
pub fn sha512_256_prefixed(domain: &[u8], data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha512_256::new();
    hasher.update(domain);
    hasher.update(data);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_known_vector() {
        // FIPS 180-4 test vector for SHA-512/256("").
        assert_eq!(
            hex::encode(sha512_256(b"")),
            "c672b8d1ef56ed28ab87c3622c5114069bdd3ad7b8f9737498d0c01ecef0967a"
        );
    }

    #[test]
    fn abc_known_vector() {
        assert_eq!(
            hex::encode(sha512_256(b"abc")),
            "53048e2681941ef99b2e29b76b4c7dabe4c2d0c634fc6d46e0e2f13107e7af23"
        );
    }

    #[test]
    fn prefixed_equals_concatenated() {
        let mut joined = TX_DOMAIN.to_vec();
        joined.extend_from_slice(b"payload");
        assert_eq!(sha512_256_prefixed(TX_DOMAIN, b"payload"), sha512_256(&joined));
    }

    #[test]
    fn domains_separate() {
        assert_ne!(
            sha512_256_prefixed(TX_DOMAIN, b"x"),
            sha512_256_prefixed(TX_GROUP_DOMAIN, b"x")
        );
    }
}
