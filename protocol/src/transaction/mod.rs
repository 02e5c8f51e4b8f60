//! # Transaction Module
//!
//! From "what I want to do" to signed bytes.
//!
//! ## Architecture
//!
//! ```text
//! argument.rs  Typed application arguments (AppArgument) and their encoding
//! types.rs     Kinds, OnComplete, StateSchema, AssetParams, SuggestedParams
//! intent.rs    TransactionIntent: unsigned, network-independent operations
//! builder.rs   TransactionBuilder for intents; concrete Transaction + encoding
//! factory.rs   Structural validation and intent → Transaction instantiation
//! encoding.rs  Canonical msgpack writer
//! signing.rs   Ed25519 signing and signed payload framing
//! group.rs     Group ids and the AtomicGroup state machine
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build**: [`TransactionBuilder`] validates structure and yields an intent.
//! 2. **Instantiate**: the factory applies a sender and a parameter snapshot.
//! 3. **Group**: [`assign_group_id`] stamps every member.
//! 4. **Sign**: [`sign_transaction`] per member, with that member's key.
//! 5. **Submit**: handled by [`crate::network::TransactionSender`].

pub mod argument;
pub mod builder;
pub(crate) mod encoding;
pub mod factory;
pub mod group;
pub mod intent;
pub mod signing;
pub mod types;

pub use argument::AppArgument;
pub use builder::{ApplicationCall, Transaction, TransactionBuilder, TransactionPayload};
pub use factory::instantiate;
pub use group::{assign_group_id, compute_group_id, AtomicGroup, GroupState, SignedGroup};
pub use intent::{AppCallArgs, TransactionBody, TransactionIntent};
pub use signing::{sign_transaction, transaction_id_from_signed, SignedTransaction};
pub use types::{AssetParams, OnComplete, StateSchema, SuggestedParams, TransactionKind};
