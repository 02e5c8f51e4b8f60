//! The courier's side of a delivery.

use plato_protocol::identity::Credential;
use plato_protocol::network::GroupReceipt;
use plato_protocol::transaction::AppCallArgs;

use crate::app_manager::{AppCallOptions, AppManager};
use crate::error::Result;

use super::types::{DeliveryAction, EscrowRef};

#[derive(Debug, Clone)]
pub struct CourierDeliveryClient {
    apps: AppManager,
}

impl CourierDeliveryClient {
    pub fn new(apps: AppManager) -> Self {
        Self { apps }
    }

    async fn act(
        &self,
        courier: Credential,
        escrow: &EscrowRef,
        call: AppCallArgs,
    ) -> Result<GroupReceipt> {
        self.apps
            .invoke(escrow.app_id, courier, AppCallOptions::with_call(call))
            .await
    }

    pub async fn pick_up_order(&self, courier: Credential, escrow: &EscrowRef) -> Result<GroupReceipt> {
        self.act(courier, escrow, AppCallArgs::new().arg(DeliveryAction::PickUpOrder))
            .await
    }

    pub async fn delivered(&self, courier: Credential, escrow: &EscrowRef) -> Result<GroupReceipt> {
        self.act(courier, escrow, AppCallArgs::new().arg(DeliveryAction::Delivered))
            .await
    }

    /// Collect the reward after delivery when the customer never completed
    /// the order.
    pub async fn claim_funds(&self, courier: Credential, escrow: &EscrowRef) -> Result<GroupReceipt> {
        let call = AppCallArgs::new()
            .arg(DeliveryAction::ClaimFunds)
            .account(escrow.merchant)
            .foreign_asset(escrow.asset_id);
        self.act(courier, escrow, call).await
    }

    pub async fn cancel_order(&self, courier: Credential, escrow: &EscrowRef) -> Result<GroupReceipt> {
        let call = AppCallArgs::new()
            .arg(DeliveryAction::Cancel)
            .foreign_asset(escrow.asset_id);
        self.act(courier, escrow, call).await
    }
}
