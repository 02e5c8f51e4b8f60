//! # Protocol Configuration & Constants
//!
//! Every magic number Plato needs from the Algorand protocol lives here,
//! along with [`ClientConfig`], the one struct the sender pipeline and the
//! domain clients are parameterized by. Module-level constants are defaults,
//! not policy: anything an operator might want to tune is a config field.

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Node Defaults
// ---------------------------------------------------------------------------

/// Default algod host. Matches the sandbox the project has always developed
/// against.
pub const DEFAULT_ALGOD_HOST: &str = "http://localhost";

/// Default algod REST port (sandbox).
pub const DEFAULT_ALGOD_PORT: u16 = 4001;

/// Sandbox API token. Sixty-four `a`s, famously secure.
pub const DEFAULT_ALGOD_TOKEN: &str =
    "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

/// Header algod expects the API token in.
pub const ALGOD_TOKEN_HEADER: &str = "X-Algo-API-Token";

/// Per-request HTTP timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Fees & Balances
// ---------------------------------------------------------------------------

/// Minimum transaction fee in microAlgos.
pub const MIN_TX_FEE: u64 = 1_000;

/// Minimum balance of a plain account in microAlgos. Every asset an account
/// opts into raises its minimum by the same amount.
pub const MIN_ACCOUNT_BALANCE: u64 = 100_000;

/// Minimum balance increase for opting into an application.
pub const APP_OPT_IN_MIN_BALANCE: u64 = 100_000;

/// Minimum balance increase per integer slot of local state.
pub const SCHEMA_UINT_MIN_BALANCE: u64 = 28_500;

/// Minimum balance increase per byte-slice slot of local state.
pub const SCHEMA_BYTES_MIN_BALANCE: u64 = 50_000;

/// Bytes a signature adds on top of the bare transaction encoding
/// (`{"sig": bin64, "txn": ...}` framing). Used for fee estimation.
pub const SIGNED_TX_OVERHEAD: u64 = 75;

// ---------------------------------------------------------------------------
// Rounds
// ---------------------------------------------------------------------------

/// How many rounds past the current one a transaction stays valid.
pub const DEFAULT_VALIDITY_WINDOW: u64 = 1_000;

/// How many rounds we poll for confirmation before giving up.
pub const DEFAULT_MAX_WAIT_ROUNDS: u64 = 4;

// ---------------------------------------------------------------------------
// Structural Limits
// ---------------------------------------------------------------------------

/// Maximum number of transactions in an atomic group.
pub const MAX_GROUP_SIZE: usize = 16;

/// Maximum number of application call arguments.
pub const MAX_APP_ARGS: usize = 16;

/// Maximum note length in bytes.
pub const MAX_NOTE_LENGTH: usize = 1_024;

/// Lease fields are exactly this many bytes.
pub const LEASE_LENGTH: usize = 32;

/// Asset metadata hashes are exactly this many bytes.
pub const METADATA_HASH_LENGTH: usize = 32;

/// Maximum asset unit name length in bytes.
pub const MAX_ASSET_UNIT_NAME_LENGTH: usize = 8;

/// Maximum asset name length in bytes.
pub const MAX_ASSET_NAME_LENGTH: usize = 32;

/// Maximum asset URL length in bytes.
pub const MAX_ASSET_URL_LENGTH: usize = 96;

/// Maximum number of decimals an asset may declare.
pub const MAX_ASSET_DECIMALS: u32 = 19;

/// Maximum extra program pages an application may request.
pub const MAX_EXTRA_PROGRAM_PAGES: u32 = 3;

// ---------------------------------------------------------------------------
// Fee Policy
// ---------------------------------------------------------------------------

/// How the fee of each transaction is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeePolicy {
    /// Pay exactly this many microAlgos per transaction.
    Flat(u64),
    /// Pay the node's suggested fee per byte times the estimated signed size,
    /// never less than the configured minimum fee.
    Suggested,
}

impl Default for FeePolicy {
    fn default() -> Self {
        FeePolicy::Flat(MIN_TX_FEE)
    }
}

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// Everything the pipeline needs to know about the network it talks to.
///
/// Built with [`ClientConfig::default`] (sandbox) or [`ClientConfig::new`]
/// and refined with the `with_*` setters:
///
/// ```
/// use plato_protocol::config::{ClientConfig, FeePolicy};
///
/// let config = ClientConfig::new("https://testnet-api.example", 443, "token")
///     .with_max_wait_rounds(8)
///     .with_fee_policy(FeePolicy::Suggested);
/// assert_eq!(config.base_url(), "https://testnet-api.example:443");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// algod host including scheme.
    pub host: String,
    /// algod port.
    pub port: u16,
    /// API token sent in the `X-Algo-API-Token` header.
    pub token: String,
    /// Minimum fee per transaction, also the floor for suggested fees.
    pub min_fee: u64,
    /// Minimum account balance, used by the domain clients to size fundings.
    pub min_account_balance: u64,
    /// Confirmation polling ceiling in rounds.
    pub max_wait_rounds: u64,
    /// Rounds between first-valid and last-valid.
    pub validity_window: u64,
    /// Fee selection.
    pub fee_policy: FeePolicy,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_ALGOD_HOST.to_string(),
            port: DEFAULT_ALGOD_PORT,
            token: DEFAULT_ALGOD_TOKEN.to_string(),
            min_fee: MIN_TX_FEE,
            min_account_balance: MIN_ACCOUNT_BALANCE,
            max_wait_rounds: DEFAULT_MAX_WAIT_ROUNDS,
            validity_window: DEFAULT_VALIDITY_WINDOW,
            fee_policy: FeePolicy::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Config for a specific node, everything else at defaults.
    pub fn new(host: impl Into<String>, port: u16, token: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            token: token.into(),
            ..Self::default()
        }
    }

    pub fn with_min_fee(mut self, min_fee: u64) -> Self {
        self.min_fee = min_fee;
        self
    }

    pub fn with_min_account_balance(mut self, balance: u64) -> Self {
        self.min_account_balance = balance;
        self
    }

    pub fn with_max_wait_rounds(mut self, rounds: u64) -> Self {
        self.max_wait_rounds = rounds;
        self
    }

    pub fn with_validity_window(mut self, rounds: u64) -> Self {
        self.validity_window = rounds;
        self
    }

    pub fn with_fee_policy(mut self, policy: FeePolicy) -> Self {
        self.fee_policy = policy;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// `host:port` with any trailing slash on the host removed.
    pub fn base_url(&self) -> String {
        format!("{}:{}", self.host.trim_end_matches('/'), self.port)
    }
}
