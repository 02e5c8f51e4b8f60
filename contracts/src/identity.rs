//! # Identity Registry
//!
//! Every Plato user opts into the identity application once. Opting in
//! records the user's role, location and referrer in local state; stores and
//! buyers later vouch for couriers and merchants through validation calls.
//!
//! Local state is 8 integers and 8 byte slices, which is what makes opting
//! in cost [`OPT_IN_COST`] microAlgos of minimum balance.

use chrono::Utc;
use plato_protocol::config::{
    APP_OPT_IN_MIN_BALANCE, SCHEMA_BYTES_MIN_BALANCE, SCHEMA_UINT_MIN_BALANCE,
};
use plato_protocol::identity::{Address, Credential};
use plato_protocol::network::GroupReceipt;
use plato_protocol::transaction::{AppArgument, AppCallArgs, StateSchema, TransactionIntent};
use plato_protocol::ProtocolError;
use serde::Serialize;

use crate::app_manager::{AppCallOptions, AppManager, AppSchema, DeployedApp};
use crate::error::Result;
use crate::programs::ProgramSource;

pub const IDENTITY_LOCAL_SCHEMA: StateSchema = StateSchema::new(8, 8);
pub const IDENTITY_GLOBAL_SCHEMA: StateSchema = StateSchema::new(1, 1);

/// Minimum-balance increase for an account opted into the identity app.
pub const OPT_IN_COST: u64 = APP_OPT_IN_MIN_BALANCE
    + IDENTITY_LOCAL_SCHEMA.ints * SCHEMA_UINT_MIN_BALANCE
    + IDENTITY_LOCAL_SCHEMA.bytes * SCHEMA_BYTES_MIN_BALANCE;

/// Seconds between deployment and the registry accepting opt-ins.
const START_DELAY_SECS: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UserType {
    Buyer,
    Store,
    Courier,
}

impl UserType {
    pub fn code(&self) -> u64 {
        match self {
            Self::Buyer => 1,
            Self::Store => 2,
            Self::Courier => 3,
        }
    }
}

impl From<UserType> for AppArgument {
    fn from(user_type: UserType) -> Self {
        AppArgument::Number(user_type.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityAction {
    /// A store vouches for a courier.
    CourierValidation,
    /// A buyer vouches for a merchant.
    StoreValidation,
}

impl IdentityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CourierValidation => "cou_val",
            Self::StoreValidation => "sto_val",
        }
    }
}

impl From<IdentityAction> for AppArgument {
    fn from(action: IdentityAction) -> Self {
        AppArgument::String(action.as_str().to_owned())
    }
}

/// What a user registers when opting in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_type: UserType,
    /// Decimal latitude, e.g. `"40.4168"`.
    pub latitude: String,
    pub longitude: String,
    /// Who referred the user; the zero address when nobody did.
    pub referrer: Option<Address>,
}

impl UserProfile {
    pub fn new(user_type: UserType, latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            user_type,
            latitude: latitude.into(),
            longitude: longitude.into(),
            referrer: None,
        }
    }

    pub fn referred_by(mut self, referrer: Address) -> Self {
        self.referrer = Some(referrer);
        self
    }
}

/// Unix time, in seconds, at which a registry deployed now starts.
pub fn start_time() -> u64 {
    u64::try_from(Utc::now().timestamp() + START_DELAY_SECS).unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct IdentityClient {
    apps: AppManager,
}

impl IdentityClient {
    pub fn new(apps: AppManager) -> Self {
        Self { apps }
    }

    pub async fn deploy(&self, owner: Credential, source: &ProgramSource) -> Result<DeployedApp> {
        let call = AppCallArgs::new().arg(start_time());
        self.apps
            .create(
                owner,
                source,
                AppSchema::new(IDENTITY_LOCAL_SCHEMA, IDENTITY_GLOBAL_SCHEMA),
                AppCallOptions::with_call(call),
            )
            .await
    }

    pub fn opt_in_intent(
        &self,
        app_id: u64,
        user: Credential,
        profile: &UserProfile,
    ) -> Result<TransactionIntent> {
        let address = user.address().map_err(ProtocolError::from)?;
        let call = AppCallArgs::new()
            .arg(address)
            .arg(profile.user_type)
            .arg(start_time())
            .arg(AppArgument::string(profile.latitude.as_str())?)
            .arg(AppArgument::string(profile.longitude.as_str())?)
            .arg(profile.referrer.unwrap_or(Address::ZERO));
        self.apps
            .opt_in_intent(app_id, user, AppCallOptions::with_call(call))
    }

    pub async fn opt_in(
        &self,
        app_id: u64,
        user: Credential,
        profile: &UserProfile,
    ) -> Result<GroupReceipt> {
        let intent = self.opt_in_intent(app_id, user, profile)?;
        Ok(self.apps.sender().send_transaction(intent).await?)
    }

    /// A store vouches for `courier`.
    pub async fn validate_courier(
        &self,
        app_id: u64,
        store: Credential,
        courier: Address,
    ) -> Result<GroupReceipt> {
        let call = validation_call(IdentityAction::CourierValidation, courier);
        self.apps
            .invoke(app_id, store, AppCallOptions::with_call(call))
            .await
    }

    /// A buyer vouches for `merchant`.
    pub async fn validate_merchant(
        &self,
        app_id: u64,
        buyer: Credential,
        merchant: Address,
    ) -> Result<GroupReceipt> {
        let call = validation_call(IdentityAction::StoreValidation, merchant);
        self.apps
            .invoke(app_id, buyer, AppCallOptions::with_call(call))
            .await
    }
}

/// `[action, Buyer, start, subject]` with the subject also in the accounts
/// array: the program reads it from argument 3 and its local state through
/// the accounts. The user-type slot always carries `Buyer`.
fn validation_call(action: IdentityAction, subject: Address) -> AppCallArgs {
    AppCallArgs::new()
        .arg(action)
        .arg(UserType::Buyer)
        .arg(start_time())
        .arg(subject)
        .account(subject)
}
