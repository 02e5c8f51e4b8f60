//! # Cryptographic Primitives
//!
//! The small set of primitives Algorand asks of a client:
//!
//! - **SHA-512/256** for transaction ids, group ids, address checksums and
//!   application addresses.
//! - **Ed25519** for signatures.
//! - **25-word mnemonics** for carrying a 32-byte seed around as text.
//!
//! Nothing here is hand-rolled crypto. The hashing is `sha2`, the curve is
//! `ed25519-dalek` and the word list is BIP-39's.

pub mod hash;
pub mod keys;
pub mod mnemonic;

pub use hash::{sha512_256, sha512_256_prefixed};
pub use keys::{KeyError, Keypair};
pub use mnemonic::{mnemonic_from_seed, seed_from_mnemonic, MnemonicError};
