//! # Network Module
//!
//! Everything that talks to an Algorand node. The transaction layer never
//! sees a socket; it hands signed bytes to this module and gets rounds back.
//!
//! ## Architecture
//!
//! ```text
//! client.rs        NodeClient trait: the seam between pipeline and node
//! rpc.rs           algod v2 JSON payloads and the domain types they become
//! algod.rs         AlgodClient: NodeClient over reqwest
//! confirmation.rs  Bounded round-by-round confirmation polling
//! sender.rs        TransactionSender: intents → confirmed atomic groups
//! memory.rs        MemoryNode, an in-process node for tests (test-utils)
//! ```
//!
//! ## Design Decisions
//!
//! - `NodeClient` is object-safe and `Send + Sync`, so a sender holds an
//!   `Arc<dyn NodeClient>` and clones freely across tasks.
//! - Nothing here retries. A rejected or timed-out group is reported and the
//!   caller rebuilds from intents if it wants another attempt.
//! - Confirmation is bounded in rounds, not wall time. Wall-time deadlines
//!   are layered on top with `tokio::time::timeout`.

pub mod algod;
pub mod client;
pub mod confirmation;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod rpc;
pub mod sender;

pub use algod::AlgodClient;
pub use client::NodeClient;
pub use confirmation::wait_for_confirmation;
pub use rpc::{AccountInfo, AssetHolding, NodeStatus, PendingTransactionInfo};
pub use sender::{GroupReceipt, TransactionSender};
