//! # Transaction Intents
//!
//! An intent is a transaction that doesn't exist yet: what to do and who
//! does it, minus everything that depends on the network at send time (fee,
//! validity window, genesis, group id). The sender is a [`Credential`], not
//! an address; the pipeline resolves it late and drops the key right after
//! signing.
//!
//! Intents are built with [`super::TransactionBuilder`], which validates
//! structure up front, and are immutable afterwards.

use crate::identity::{Address, Credential};

use super::argument::AppArgument;
use super::types::{AssetParams, OnComplete, StateSchema, TransactionKind};

// ---------------------------------------------------------------------------
// AppCallArgs
// ---------------------------------------------------------------------------

/// Arguments and foreign references of an application call.
///
/// References are passed through untouched; whether the program expects a
/// given asset or account is the program's business, not ours.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppCallArgs {
    pub args: Vec<AppArgument>,
    pub accounts: Vec<Address>,
    pub foreign_apps: Vec<u64>,
    pub foreign_assets: Vec<u64>,
}

impl AppCallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, arg: impl Into<AppArgument>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = AppArgument>) -> Self {
        self.args.extend(args);
        self
    }

    pub fn account(mut self, account: Address) -> Self {
        self.accounts.push(account);
        self
    }

    pub fn foreign_app(mut self, app_id: u64) -> Self {
        self.foreign_apps.push(app_id);
        self
    }

    pub fn foreign_asset(mut self, asset_id: u64) -> Self {
        self.foreign_assets.push(asset_id);
        self
    }

    /// Encoded argument payloads, in order.
    pub fn encoded_args(&self) -> Vec<Vec<u8>> {
        self.args.iter().map(AppArgument::encode).collect()
    }
}

// ---------------------------------------------------------------------------
// TransactionBody
// ---------------------------------------------------------------------------

/// Kind-specific fields of an intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionBody {
    Payment {
        receiver: Address,
        amount: u64,
        close_remainder_to: Option<Address>,
    },
    AssetTransfer {
        receiver: Address,
        asset_id: u64,
        amount: u64,
        close_to: Option<Address>,
        /// Clawback source. The sender must be the asset's clawback account.
        revocation_target: Option<Address>,
    },
    AssetCreate(AssetParams),
    ApplicationCreate {
        approval_program: Vec<u8>,
        clear_program: Vec<u8>,
        local_schema: StateSchema,
        global_schema: StateSchema,
        extra_pages: u32,
        call: AppCallArgs,
    },
    ApplicationUpdate {
        app_id: u64,
        approval_program: Vec<u8>,
        clear_program: Vec<u8>,
        call: AppCallArgs,
    },
    /// NoOp, OptIn, CloseOut, ClearState or Delete against an existing app.
    ApplicationCall {
        app_id: u64,
        on_complete: OnComplete,
        call: AppCallArgs,
    },
}

impl TransactionBody {
    pub fn kind(&self) -> TransactionKind {
        match self {
            Self::Payment { .. } => TransactionKind::Payment,
            Self::AssetTransfer { .. } => TransactionKind::AssetTransfer,
            Self::AssetCreate(_) => TransactionKind::AssetConfig,
            Self::ApplicationCreate { .. }
            | Self::ApplicationUpdate { .. }
            | Self::ApplicationCall { .. } => TransactionKind::ApplicationCall,
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionIntent
// ---------------------------------------------------------------------------

/// A validated, unsigned description of one future transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionIntent {
    pub(crate) sender: Credential,
    pub(crate) body: TransactionBody,
    pub(crate) note: Option<AppArgument>,
    pub(crate) lease: Option<AppArgument>,
    pub(crate) rekey_to: Option<Address>,
}

impl TransactionIntent {
    pub fn sender(&self) -> &Credential {
        &self.sender
    }

    pub fn body(&self) -> &TransactionBody {
        &self.body
    }

    pub fn kind(&self) -> TransactionKind {
        self.body.kind()
    }

    pub fn note(&self) -> Option<&AppArgument> {
        self.note.as_ref()
    }

    pub fn lease(&self) -> Option<&AppArgument> {
        self.lease.as_ref()
    }

    pub fn rekey_to(&self) -> Option<&Address> {
        self.rekey_to.as_ref()
    }

    /// Whether two intents would produce the same transaction when sent by
    /// the same address. Such a pair in one group can never be accepted.
    pub(crate) fn same_operation(&self, other: &TransactionIntent) -> bool {
        self.body == other.body
            && self.note == other.note
            && self.lease == other.lease
            && self.rekey_to == other.rekey_to
    }
}
