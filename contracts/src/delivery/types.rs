//! Delivery escrow vocabulary.

use std::fmt;

use plato_protocol::identity::Address;
use plato_protocol::transaction::{AppArgument, StateSchema};
use serde::Serialize;

use crate::app_manager::{AppSchema, DeployedApp};
use crate::error::{ContractError, Result};

/// The escrow keeps the order state in global storage only.
pub const ESCROW_SCHEMA: AppSchema = AppSchema::new(StateSchema::new(0, 0), StateSchema::new(3, 2));

/// First argument of every escrow call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeliveryAction {
    CompleteOrder,
    Delivered,
    ClaimFunds,
    AssetOptIn,
    StartDispute,
    Cancel,
    PickUpOrder,
}

impl DeliveryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CompleteOrder => "COMPLETE_ORDER",
            Self::Delivered => "DELIVERED",
            Self::ClaimFunds => "CLAIM_FUNDS",
            Self::AssetOptIn => "ASA_OPT_IN",
            Self::StartDispute => "START_DISPUTE",
            Self::Cancel => "CANCEL",
            Self::PickUpOrder => "PICK_UP_ORDER",
        }
    }
}

impl fmt::Display for DeliveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DeliveryAction> for AppArgument {
    fn from(action: DeliveryAction) -> Self {
        AppArgument::String(action.as_str().to_owned())
    }
}

/// What the customer agrees to when opening an escrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryOrder {
    pub courier: Address,
    pub merchant: Address,
    /// Order price in microAlgos, courier reward included.
    pub price: u64,
    /// Part of the price that goes to the courier.
    pub courier_reward: u64,
    /// Tips in units of `asset_id`.
    pub tips: u64,
    pub asset_id: u64,
}

impl DeliveryOrder {
    pub fn validate(&self) -> Result<()> {
        if self.price == 0 {
            return Err(ContractError::InvalidOrder("price must be positive".into()));
        }
        if self.courier_reward == 0 {
            return Err(ContractError::InvalidOrder(
                "courier reward must be positive".into(),
            ));
        }
        if self.courier_reward >= self.price {
            return Err(ContractError::InvalidOrder(format!(
                "courier reward {} must be below the price {}",
                self.courier_reward, self.price
            )));
        }
        if self.asset_id == 0 {
            return Err(ContractError::InvalidOrder("tips asset id must be set".into()));
        }
        Ok(())
    }
}

/// Everything the parties need to address a live escrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EscrowRef {
    pub app_id: u64,
    pub courier: Address,
    pub merchant: Address,
    pub asset_id: u64,
}

impl EscrowRef {
    pub fn address(&self) -> Address {
        Address::for_application(self.app_id)
    }
}

/// A deployed and funded escrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Escrow {
    pub app: DeployedApp,
    pub order: DeliveryOrder,
    /// microAlgos moved into the escrow account.
    pub funding: u64,
    /// Round the funding group landed in.
    pub funded_round: u64,
}

impl Escrow {
    pub fn reference(&self) -> EscrowRef {
        EscrowRef {
            app_id: self.app.id,
            courier: self.order.courier,
            merchant: self.order.merchant,
            asset_id: self.order.asset_id,
        }
    }
}
