//! The customer's side of a delivery.
//!
//! A customer opens one escrow per order: the application is created, then
//! funded in a single atomic group so the escrow never exists half-funded.

use plato_protocol::config::ClientConfig;
use plato_protocol::identity::Credential;
use plato_protocol::network::GroupReceipt;
use plato_protocol::transaction::{AppArgument, AppCallArgs};
use tracing::info;

use crate::app_manager::{AppCallOptions, AppManager};
use crate::error::{ContractError, Result};
use crate::monetary::{MonetaryManager, TransferOptions};
use crate::programs::ProgramSource;

use super::types::{DeliveryAction, DeliveryOrder, Escrow, EscrowRef, ESCROW_SCHEMA};

/// microAlgos a customer moves into a new escrow: two minimum balances (the
/// account and its asset holding), three fees for the escrow's own payouts,
/// and the order price.
///
/// A price too large to fund is an [`ContractError::InvalidOrder`].
pub fn escrow_funding(config: &ClientConfig, price: u64) -> Result<u64> {
    config
        .min_account_balance
        .checked_mul(2)
        .zip(config.min_fee.checked_mul(3))
        .and_then(|(balances, fees)| balances.checked_add(fees))
        .and_then(|overhead| overhead.checked_add(price))
        .ok_or_else(|| ContractError::InvalidOrder(format!("price {price} is too large to fund")))
}

#[derive(Debug, Clone)]
pub struct CustomerDeliveryClient {
    apps: AppManager,
    monetary: MonetaryManager,
}

impl CustomerDeliveryClient {
    pub fn new(apps: AppManager, monetary: MonetaryManager) -> Self {
        Self { apps, monetary }
    }

    /// Create and fund the escrow for `order`.
    ///
    /// The funding group is `[payment, ASA_OPT_IN call, tips transfer]`, all
    /// from the customer. If it fails, the created application is left
    /// unfunded and the error is returned.
    pub async fn deploy(
        &self,
        customer: Credential,
        source: &ProgramSource,
        order: DeliveryOrder,
    ) -> Result<Escrow> {
        order.validate()?;
        let funding = escrow_funding(self.apps.sender().config(), order.price)?;

        let create_args = AppCallArgs::new()
            .arg(order.courier)
            .arg(order.merchant)
            .arg(order.courier_reward);
        let app = self
            .apps
            .create(
                customer.clone(),
                source,
                ESCROW_SCHEMA,
                AppCallOptions::with_call(create_args),
            )
            .await?;

        let group = vec![
            self.monetary.algo_transfer_intent(
                customer.clone(),
                app.address,
                funding,
                TransferOptions::new(),
            )?,
            self.apps.invoke_intent(
                app.id,
                customer.clone(),
                AppCallOptions::with_call(
                    AppCallArgs::new()
                        .arg(DeliveryAction::AssetOptIn)
                        .foreign_asset(order.asset_id),
                ),
            )?,
            self.monetary.asset_transfer_intent(
                customer,
                app.address,
                order.asset_id,
                order.tips,
                TransferOptions::new(),
            )?,
        ];
        let receipt = self
            .apps
            .sender()
            .send_group(group)
            .await?;

        info!(app_id = app.id, funding, round = receipt.confirmed_round, "escrow funded");
        Ok(Escrow {
            app,
            order,
            funding,
            funded_round: receipt.confirmed_round,
        })
    }

    /// Release the escrow: merchant and courier are paid by the program.
    pub async fn complete_order(
        &self,
        customer: Credential,
        escrow: &EscrowRef,
    ) -> Result<GroupReceipt> {
        let call = AppCallArgs::new()
            .arg(DeliveryAction::CompleteOrder)
            .account(escrow.courier)
            .account(escrow.merchant)
            .foreign_asset(escrow.asset_id);
        self.apps
            .invoke(escrow.app_id, customer, AppCallOptions::with_call(call))
            .await
    }

    pub async fn cancel_order(
        &self,
        customer: Credential,
        escrow: &EscrowRef,
    ) -> Result<GroupReceipt> {
        let call = AppCallArgs::new()
            .arg(DeliveryAction::Cancel)
            .foreign_asset(escrow.asset_id);
        self.apps
            .invoke(escrow.app_id, customer, AppCallOptions::with_call(call))
            .await
    }

    pub async fn start_dispute(
        &self,
        customer: Credential,
        escrow: &EscrowRef,
        reason: Option<&str>,
    ) -> Result<GroupReceipt> {
        let mut options =
            AppCallOptions::with_call(AppCallArgs::new().arg(DeliveryAction::StartDispute));
        if let Some(reason) = reason {
            options = options.note(AppArgument::string(reason)?);
        }
        self.apps.invoke(escrow.app_id, customer, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn funding_covers_balances_fees_and_price() {
        let config = ClientConfig::default();
        assert_eq!(escrow_funding(&config, 50_000).unwrap(), 200_000 + 3_000 + 50_000);

        let pricey = ClientConfig::default()
            .with_min_fee(2_000)
            .with_min_account_balance(0);
        assert_eq!(escrow_funding(&pricey, 1).unwrap(), 6_001);
    }

    #[test]
    fn unfundable_price_is_an_invalid_order() {
        let err = escrow_funding(&ClientConfig::default(), u64::MAX - 10).unwrap_err();
        assert!(matches!(err, ContractError::InvalidOrder(_)));
    }
}
