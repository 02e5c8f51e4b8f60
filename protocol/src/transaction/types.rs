//! Core type definitions shared by intents and concrete transactions.
//!
//! These are the vocabulary of the transaction layer: what kind of
//! transaction, which network snapshot it was built against, how big an
//! application's state is, what an asset looks like.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::FeePolicy;
use crate::identity::Address;

// ---------------------------------------------------------------------------
// TransactionKind
// ---------------------------------------------------------------------------

/// The four Algorand transaction types Plato uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Algo transfer.
    Payment,
    /// Asset transfer, opt-in (zero to self) or clawback.
    AssetTransfer,
    /// Asset creation.
    AssetConfig,
    /// Application create, update, call, opt-in, close-out, delete.
    ApplicationCall,
}

impl TransactionKind {
    /// The `type` field value on the wire.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Payment => "pay",
            Self::AssetTransfer => "axfer",
            Self::AssetConfig => "acfg",
            Self::ApplicationCall => "appl",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_tag())
    }
}

// ---------------------------------------------------------------------------
// OnComplete
// ---------------------------------------------------------------------------

/// What an application call does to the caller's relationship with the app
/// after the approval program runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OnComplete {
    #[default]
    NoOp,
    OptIn,
    CloseOut,
    ClearState,
    UpdateApplication,
    DeleteApplication,
}

impl OnComplete {
    /// Wire value of the `apan` field.
    pub fn code(&self) -> u64 {
        match self {
            Self::NoOp => 0,
            Self::OptIn => 1,
            Self::CloseOut => 2,
            Self::ClearState => 3,
            Self::UpdateApplication => 4,
            Self::DeleteApplication => 5,
        }
    }
}

// ---------------------------------------------------------------------------
// StateSchema
// ---------------------------------------------------------------------------

/// Number of integer and byte-slice slots an application reserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StateSchema {
    pub ints: u64,
    pub bytes: u64,
}

impl StateSchema {
    pub const fn new(ints: u64, bytes: u64) -> Self {
        Self { ints, bytes }
    }
}

// ---------------------------------------------------------------------------
// AssetParams
// ---------------------------------------------------------------------------

/// Parameters of a new Algorand Standard Asset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetParams {
    /// Total supply in base units.
    pub total: u64,
    pub decimals: u32,
    pub default_frozen: bool,
    pub unit_name: Option<String>,
    pub asset_name: Option<String>,
    pub url: Option<String>,
    /// Must be exactly 32 bytes when present.
    pub metadata_hash: Option<Vec<u8>>,
    pub manager: Option<Address>,
    pub reserve: Option<Address>,
    pub freeze: Option<Address>,
    pub clawback: Option<Address>,
}

impl AssetParams {
    pub fn new(total: u64, decimals: u32) -> Self {
        Self {
            total,
            decimals,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// SuggestedParams
// ---------------------------------------------------------------------------

/// A snapshot of network parameters. Shared read-only by every member of a
/// group and never reused across groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedParams {
    /// Flat fee when `flat_fee` is set, fee per byte otherwise.
    pub fee: u64,
    pub flat_fee: bool,
    pub min_fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: String,
    pub genesis_hash: [u8; 32],
}

impl SuggestedParams {
    /// Apply a configured fee policy to the node's suggestion.
    pub fn with_fee_policy(mut self, policy: FeePolicy, min_fee: u64) -> Self {
        match policy {
            FeePolicy::Flat(fee) => {
                self.fee = fee;
                self.flat_fee = true;
            }
            FeePolicy::Suggested => {
                self.flat_fee = false;
            }
        }
        self.min_fee = self.min_fee.max(min_fee);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SuggestedParams {
        SuggestedParams {
            fee: 3,
            flat_fee: false,
            min_fee: 1_000,
            first_valid: 10,
            last_valid: 1_010,
            genesis_id: "sandnet-v1".into(),
            genesis_hash: [1u8; 32],
        }
    }

    #[test]
    fn kind_tags() {
        assert_eq!(TransactionKind::Payment.to_string(), "pay");
        assert_eq!(TransactionKind::AssetTransfer.type_tag(), "axfer");
        assert_eq!(TransactionKind::AssetConfig.type_tag(), "acfg");
        assert_eq!(TransactionKind::ApplicationCall.type_tag(), "appl");
    }

    #[test]
    fn on_complete_codes() {
        let codes: Vec<u64> = [
            OnComplete::NoOp,
            OnComplete::OptIn,
            OnComplete::CloseOut,
            OnComplete::ClearState,
            OnComplete::UpdateApplication,
            OnComplete::DeleteApplication,
        ]
        .iter()
        .map(OnComplete::code)
        .collect();
        assert_eq!(codes, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn flat_policy_overrides_fee() {
        let p = params().with_fee_policy(FeePolicy::Flat(1_000), 1_000);
        assert!(p.flat_fee);
        assert_eq!(p.fee, 1_000);
    }

    #[test]
    fn suggested_policy_keeps_per_byte_fee_and_raises_floor() {
        let p = params().with_fee_policy(FeePolicy::Suggested, 2_000);
        assert!(!p.flat_fee);
        assert_eq!(p.fee, 3);
        assert_eq!(p.min_fee, 2_000);
    }
}
