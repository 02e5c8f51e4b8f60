// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Plato Protocol: Core Library
//!
//! The client-side half of Plato's delivery network on Algorand. The on-chain
//! programs (escrow, identity, rewards) do the bookkeeping; this crate gets
//! well-formed, correctly signed transactions to them.
//!
//! Most of what lives here is plumbing: keys, addresses, canonical msgpack,
//! an algod REST client. The part with real design weight is the atomic group
//! pipeline in [`transaction::group`] and [`network::sender`]: build every
//! member, stamp one group id, sign each member with its own key and submit
//! the whole bundle in a single call. The network commits all of it or none.
//!
//! ## Architecture
//!
//! - **config**: Protocol constants and the [`config::ClientConfig`] struct.
//! - **error**: The [`error::ProtocolError`] taxonomy every operation returns.
//! - **crypto**: SHA-512/256, Ed25519 keys, 25-word mnemonics.
//! - **identity**: Addresses, accounts and signing credentials.
//! - **transaction**: Typed arguments, intents, the factory, canonical
//!   encoding, signing and atomic groups.
//! - **network**: The [`network::NodeClient`] seam, its algod implementation,
//!   confirmation polling and the [`network::TransactionSender`] pipeline.
//!
//! ## Design Philosophy
//!
//! 1. Everything that can be checked locally is checked before the first
//!    network call.
//! 2. Submission is the commit point. Nothing before it leaves the process.
//! 3. Secrets are resolved late, used once and dropped.

pub mod config;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod network;
pub mod transaction;

pub use config::{ClientConfig, FeePolicy};
pub use error::ProtocolError;
pub use identity::{Account, Address, Credential};
pub use network::{AlgodClient, GroupReceipt, NodeClient, TransactionSender};
pub use transaction::{AppArgument, TransactionBuilder, TransactionIntent};
