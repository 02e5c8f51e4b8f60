//! # algod REST Payloads
//!
//! Type-safe definitions for the slice of the algod v2 API Plato uses, plus
//! the domain types the [`super::NodeClient`] trait hands back. The wire
//! structs mirror algod's kebab-case JSON; conversion into domain types is
//! where malformed fields are caught.
//!
//! ## Endpoint Index
//!
//! | Endpoint | Wire type |
//! |---|---|
//! | `GET  /v2/transactions/params` | [`TransactionParamsResponse`] |
//! | `POST /v2/teal/compile` | [`CompileResponse`] |
//! | `POST /v2/transactions` | [`SubmitResponse`] |
//! | `GET  /v2/transactions/pending/{txid}` | [`PendingTransactionInfo`] |
//! | `GET  /v2/status`, `/v2/status/wait-for-block-after/{round}` | [`NodeStatus`] |
//! | `GET  /v2/accounts/{address}` | [`AccountInfo`] |
//! | any error | [`ErrorResponse`] |

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::identity::Address;
use crate::transaction::SuggestedParams;

// ---------------------------------------------------------------------------
// Transaction parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransactionParamsResponse {
    #[serde(default)]
    pub consensus_version: String,
    /// Suggested fee per byte.
    pub fee: u64,
    /// Base64 of the 32-byte genesis hash.
    pub genesis_hash: String,
    pub genesis_id: String,
    pub last_round: u64,
    pub min_fee: u64,
}

impl TransactionParamsResponse {
    /// Domain params valid from `last-round` for `validity_window` rounds.
    /// The fee stays per-byte here; the sender applies its fee policy.
    pub fn into_suggested(self, validity_window: u64) -> Result<SuggestedParams, ProtocolError> {
        let hash = BASE64
            .decode(&self.genesis_hash)
            .map_err(|e| ProtocolError::MalformedResponse(format!("genesis-hash: {e}")))?;
        let genesis_hash: [u8; 32] = hash.try_into().map_err(|h: Vec<u8>| {
            ProtocolError::MalformedResponse(format!(
                "genesis-hash must be 32 bytes, got {}",
                h.len()
            ))
        })?;

        Ok(SuggestedParams {
            fee: self.fee,
            flat_fee: false,
            min_fee: self.min_fee,
            first_valid: self.last_round,
            last_valid: self.last_round + validity_window,
            genesis_id: self.genesis_id,
            genesis_hash,
        })
    }
}

// ---------------------------------------------------------------------------
// Compile / submit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileResponse {
    /// Program hash (the logic-sig address of the program).
    pub hash: String,
    /// Base64 of the compiled bytecode.
    pub result: String,
}

impl CompileResponse {
    pub fn bytecode(&self) -> Result<Vec<u8>, ProtocolError> {
        BASE64
            .decode(&self.result)
            .map_err(|e| ProtocolError::MalformedResponse(format!("compile result: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(rename = "txId")]
    pub tx_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Pending transactions & status
// ---------------------------------------------------------------------------

/// What the node knows about a transaction it has seen.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PendingTransactionInfo {
    /// Round the transaction was committed in, if it has been.
    #[serde(default)]
    pub confirmed_round: Option<u64>,
    /// Non-empty when the pool kicked the transaction out.
    #[serde(default)]
    pub pool_error: String,
    /// Id of the asset this transaction created.
    #[serde(default, rename = "asset-index")]
    pub created_asset_id: Option<u64>,
    /// Id of the application this transaction created.
    #[serde(default, rename = "application-index")]
    pub created_application_id: Option<u64>,
}

impl PendingTransactionInfo {
    pub fn is_confirmed(&self) -> bool {
        self.confirmed_round.is_some_and(|round| round > 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NodeStatus {
    pub last_round: u64,
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AssetHolding {
    pub asset_id: u64,
    pub amount: u64,
    #[serde(default)]
    pub is_frozen: bool,
}

/// Balance and holdings of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AccountInfo {
    pub address: Address,
    /// Balance in microAlgos.
    pub amount: u64,
    #[serde(default)]
    pub min_balance: u64,
    #[serde(default)]
    pub assets: Vec<AssetHolding>,
}

impl AccountInfo {
    pub fn new(address: Address, amount: u64) -> Self {
        Self {
            address,
            amount,
            min_balance: 0,
            assets: Vec::new(),
        }
    }

    pub fn asset(&self, asset_id: u64) -> Option<&AssetHolding> {
        self.assets.iter().find(|a| a.asset_id == asset_id)
    }
}
