//! # Referral Rewards
//!
//! The reward application pays PLATO tokens to users whose referrals order
//! from a restaurant. It reads referrers from the identity registry, so it
//! is deployed against an identity app id, then funded with algos (for its
//! own fees and minimum balance) and tokens in one atomic group.

use plato_protocol::identity::{Address, Credential};
use plato_protocol::network::GroupReceipt;
use plato_protocol::transaction::{AppArgument, AppCallArgs, StateSchema};
use plato_protocol::ProtocolError;
use serde::Serialize;
use tracing::info;

use crate::app_manager::{AppCallOptions, AppManager, AppSchema, DeployedApp};
use crate::error::{ContractError, Result};
use crate::identity::start_time;
use crate::monetary::{MonetaryManager, TransferOptions};
use crate::programs::ProgramSource;

pub const REWARD_SCHEMA: AppSchema =
    AppSchema::new(StateSchema::new(0, 0), StateSchema::new(3, 3));

/// The only reward kind the program knows.
pub const RESTAURANT_REFERRAL: &str = "resto_referral";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardAction {
    CheckReward,
    AssetOptIn,
}

impl RewardAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckReward => "check_reward",
            Self::AssetOptIn => "asset_opt_in",
        }
    }
}

impl From<RewardAction> for AppArgument {
    fn from(action: RewardAction) -> Self {
        AppArgument::String(action.as_str().to_owned())
    }
}

/// A deployed reward application and what it is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RewardApp {
    pub app: DeployedApp,
    pub asset_id: u64,
    pub identity_app_id: u64,
}

#[derive(Debug, Clone)]
pub struct RewardClient {
    apps: AppManager,
    monetary: MonetaryManager,
}

impl RewardClient {
    pub fn new(apps: AppManager, monetary: MonetaryManager) -> Self {
        Self { apps, monetary }
    }

    /// Smallest algo funding the app accepts: its own minimum balance, the
    /// asset holding's, and three fees.
    pub fn minimum_funding(&self) -> u64 {
        let config = self.apps.sender().config();
        config
            .min_account_balance
            .saturating_mul(2)
            .saturating_add(config.min_fee.saturating_mul(3))
    }

    pub async fn deploy(
        &self,
        owner: Credential,
        source: &ProgramSource,
        asset_id: u64,
        identity_app_id: u64,
    ) -> Result<RewardApp> {
        let owner_address = owner.address().map_err(ProtocolError::from)?;
        let call = AppCallArgs::new()
            .arg(owner_address)
            .arg(asset_id)
            .arg(start_time())
            .arg(identity_app_id)
            .foreign_asset(asset_id);
        let app = self
            .apps
            .create(owner, source, REWARD_SCHEMA, AppCallOptions::with_call(call))
            .await?;
        Ok(RewardApp {
            app,
            asset_id,
            identity_app_id,
        })
    }

    /// Fund the app with `algos` microAlgos and `tokens` units of its asset.
    ///
    /// Checks the amount and the owner's balance first; then sends
    /// `[payment, asset_opt_in call, asset transfer]` as one group.
    pub async fn fund_app(
        &self,
        owner: Credential,
        reward: &RewardApp,
        algos: u64,
        tokens: u64,
    ) -> Result<GroupReceipt> {
        let required = self.minimum_funding();
        if algos < required {
            return Err(ContractError::InsufficientFunding {
                required,
                provided: algos,
            });
        }

        let needed = self
            .apps
            .sender()
            .config()
            .min_fee
            .checked_mul(3)
            .and_then(|fees| fees.checked_add(algos))
            .ok_or(ContractError::AmountOverflow("reward funding plus fees"))?;

        let owner_address = owner.address().map_err(ProtocolError::from)?;
        self.monetary
            .ensure_balance(&owner_address, needed)
            .await?;

        let app_address = reward.app.address;
        let group = vec![
            self.monetary
                .algo_transfer_intent(owner.clone(), app_address, algos, TransferOptions::new())?,
            self.apps.invoke_intent(
                reward.app.id,
                owner.clone(),
                AppCallOptions::with_call(
                    AppCallArgs::new()
                        .arg(RewardAction::AssetOptIn)
                        .foreign_asset(reward.asset_id),
                ),
            )?,
            self.monetary.asset_transfer_intent(
                owner,
                app_address,
                reward.asset_id,
                tokens,
                TransferOptions::new(),
            )?,
        ];
        let receipt = self
            .apps
            .sender()
            .send_group(group)
            .await?;
        info!(app_id = reward.app.id, algos, tokens, "reward app funded");
        Ok(receipt)
    }

    /// Ask the program to credit `customer`'s order at `merchant` toward
    /// whoever referred the merchant.
    pub async fn check_customer_reward(
        &self,
        customer: Credential,
        reward: &RewardApp,
        merchant: Address,
    ) -> Result<GroupReceipt> {
        let customer_address = customer.address().map_err(ProtocolError::from)?;
        let call = AppCallArgs::new()
            .arg(RewardAction::CheckReward)
            .arg(customer_address)
            .arg(merchant)
            .arg(start_time())
            .arg(AppArgument::String(RESTAURANT_REFERRAL.to_owned()))
            .account(merchant)
            .foreign_app(reward.identity_app_id)
            .foreign_asset(reward.asset_id);
        self.apps
            .invoke(reward.app.id, customer, AppCallOptions::with_call(call))
            .await
    }
}
