//! # Identity Module
//!
//! Who is sending what. Three layers:
//!
//! 1. **Address**: a checksummed public key, the only form of identity that
//!    appears on chain.
//! 2. **Account**: keypair plus address. Signs things.
//! 3. **Credential**: the secret an intent carries until the pipeline needs
//!    an account. Keeps secrets out of long-lived structs.

pub mod account;
pub mod address;
pub mod credential;

pub use account::Account;
pub use address::{Address, AddressError, ADDRESS_LENGTH};
pub use credential::Credential;
