//! Algo and asset movements.
//!
//! Payments, asset transfers, asset opt-ins and asset creation, each with an
//! intent-returning variant so they can be composed into atomic groups with
//! application calls.

use plato_protocol::identity::{Address, Credential};
use plato_protocol::network::{AccountInfo, GroupReceipt, NodeClient, TransactionSender};
use plato_protocol::transaction::{AppArgument, AssetParams, TransactionBuilder, TransactionIntent};
use plato_protocol::ProtocolError;
use tracing::info;

use crate::error::{ContractError, Result};

/// Optional fields of a payment or asset transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferOptions {
    pub note: Option<AppArgument>,
    pub lease: Option<AppArgument>,
    pub rekey_to: Option<Address>,
    /// Send the sender's remaining balance (or holding) here afterwards.
    pub close_to: Option<Address>,
}

impl TransferOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note(mut self, note: AppArgument) -> Self {
        self.note = Some(note);
        self
    }

    pub fn close_to(mut self, address: Address) -> Self {
        self.close_to = Some(address);
        self
    }

    fn apply(self, mut builder: TransactionBuilder) -> TransactionBuilder {
        if let Some(note) = self.note {
            builder = builder.note(note);
        }
        if let Some(lease) = self.lease {
            builder = builder.lease(lease);
        }
        if let Some(address) = self.rekey_to {
            builder = builder.rekey_to(address);
        }
        if let Some(address) = self.close_to {
            builder = builder.close_remainder_to(address);
        }
        builder
    }
}

#[derive(Debug, Clone)]
pub struct MonetaryManager {
    sender: TransactionSender,
}

impl MonetaryManager {
    pub fn new(sender: TransactionSender) -> Self {
        Self { sender }
    }

    pub fn sender(&self) -> &TransactionSender {
        &self.sender
    }

    // -- algos --------------------------------------------------------------

    pub fn algo_transfer_intent(
        &self,
        from: Credential,
        to: Address,
        amount: u64,
        options: TransferOptions,
    ) -> Result<TransactionIntent> {
        Ok(options
            .apply(TransactionBuilder::payment(to, amount))
            .build(from)?)
    }

    pub async fn algo_transfer(
        &self,
        from: Credential,
        to: Address,
        amount: u64,
        options: TransferOptions,
    ) -> Result<GroupReceipt> {
        let intent = self.algo_transfer_intent(from, to, amount, options)?;
        Ok(self.sender.send_transaction(intent).await?)
    }

    // -- assets -------------------------------------------------------------

    pub fn asset_transfer_intent(
        &self,
        from: Credential,
        to: Address,
        asset_id: u64,
        amount: u64,
        options: TransferOptions,
    ) -> Result<TransactionIntent> {
        Ok(options
            .apply(TransactionBuilder::asset_transfer(to, asset_id, amount))
            .build(from)?)
    }

    pub async fn asset_transfer(
        &self,
        from: Credential,
        to: Address,
        asset_id: u64,
        amount: u64,
        options: TransferOptions,
    ) -> Result<GroupReceipt> {
        let intent = self.asset_transfer_intent(from, to, asset_id, amount, options)?;
        Ok(self.sender.send_transaction(intent).await?)
    }

    /// Zero-amount transfer to oneself, which registers the holding.
    pub fn asset_opt_in_intent(&self, account: Credential, asset_id: u64) -> Result<TransactionIntent> {
        let address = account.address().map_err(ProtocolError::from)?;
        Ok(TransactionBuilder::asset_opt_in(address, asset_id).build(account)?)
    }

    pub async fn asset_opt_in(&self, account: Credential, asset_id: u64) -> Result<GroupReceipt> {
        let intent = self.asset_opt_in_intent(account, asset_id)?;
        Ok(self.sender.send_transaction(intent).await?)
    }

    /// Create an asset and return its id.
    pub async fn create_asset(
        &self,
        creator: Credential,
        params: AssetParams,
        note: Option<AppArgument>,
    ) -> Result<u64> {
        let mut builder = TransactionBuilder::asset_create(params);
        if let Some(note) = note {
            builder = builder.note(note);
        }
        let receipt = self.sender.send_transaction(builder.build(creator)?).await?;

        let info = self
            .sender
            .client()
            .pending_transaction_info(receipt.first_tx_id())
            .await?;
        let asset_id = info
            .created_asset_id
            .ok_or(ContractError::MissingCreatedId("asset"))?;
        info!(asset_id, round = receipt.confirmed_round, "asset created");
        Ok(asset_id)
    }

    // -- accounts -----------------------------------------------------------

    pub async fn account_info(&self, address: &Address) -> Result<AccountInfo> {
        Ok(self.sender.client().account_info(address).await?)
    }

    /// Fail with [`ContractError::InsufficientBalance`] unless `address`
    /// holds at least `required` microAlgos.
    pub async fn ensure_balance(&self, address: &Address, required: u64) -> Result<AccountInfo> {
        let info = self.account_info(address).await?;
        if info.amount < required {
            return Err(ContractError::InsufficientBalance {
                address: *address,
                required,
                available: info.amount,
            });
        }
        Ok(info)
    }
}
