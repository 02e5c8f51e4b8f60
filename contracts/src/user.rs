//! User onboarding.
//!
//! A new user needs algos to exist, a PLATO holding and an identity
//! registration. [`UserManager::init_account`] does all three in one group
//! funded by an existing holder, so a user is either fully onboarded or not
//! at all.

use plato_protocol::config::ClientConfig;
use plato_protocol::identity::{Account, Credential};
use plato_protocol::network::GroupReceipt;
use plato_protocol::ProtocolError;
use tracing::info;

use crate::error::Result;
use crate::identity::{IdentityClient, UserProfile, OPT_IN_COST};
use crate::monetary::{MonetaryManager, TransferOptions};

/// microAlgos a holder sends a new user: two minimum balances (account and
/// asset holding), the identity opt-in cost and five fees of headroom.
pub fn onboarding_funding(config: &ClientConfig) -> u64 {
    5 * config.min_fee + 2 * config.min_account_balance + OPT_IN_COST
}

#[derive(Debug, Clone)]
pub struct UserManager {
    monetary: MonetaryManager,
    identity: IdentityClient,
}

impl UserManager {
    pub fn new(monetary: MonetaryManager, identity: IdentityClient) -> Self {
        Self { monetary, identity }
    }

    /// A fresh random account. Nothing touches the network.
    pub fn create_user_account(&self) -> Account {
        Account::generate()
    }

    /// Fund `user`, opt it into `asset_id` and register it with the identity
    /// app, atomically. The holder signs the payment, the user the rest.
    pub async fn init_account(
        &self,
        holder: Credential,
        user: Credential,
        asset_id: u64,
        identity_app_id: u64,
        profile: &UserProfile,
    ) -> Result<GroupReceipt> {
        let user_address = user.address().map_err(ProtocolError::from)?;
        let funding = onboarding_funding(self.monetary.sender().config());

        let group = vec![
            self.monetary
                .algo_transfer_intent(holder, user_address, funding, TransferOptions::new())?,
            self.monetary.asset_opt_in_intent(user.clone(), asset_id)?,
            self.identity.opt_in_intent(identity_app_id, user, profile)?,
        ];
        let receipt = self
            .monetary
            .sender()
            .send_group(group)
            .await?;
        info!(user = %user_address, funding, round = receipt.confirmed_round, "user onboarded");
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn funding_covers_opt_in() {
        let config = ClientConfig::default();
        assert_eq!(onboarding_funding(&config), 5_000 + 200_000 + 728_000);
    }
}
