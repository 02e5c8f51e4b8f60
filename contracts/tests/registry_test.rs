//! Integration tests for identity, rewards and user onboarding.

use std::sync::Arc;

use plato_contracts::identity::{IdentityClient, UserProfile, UserType};
use plato_contracts::reward::RewardClient;
use plato_contracts::user::{onboarding_funding, UserManager};
use plato_contracts::{AppManager, ContractError, MonetaryManager, ProgramSource};
use plato_protocol::config::ClientConfig;
use plato_protocol::identity::{Address, Credential};
use plato_protocol::network::memory::MemoryNode;
use plato_protocol::network::{AccountInfo, TransactionSender};
use plato_protocol::transaction::AssetParams;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

struct Clients {
    monetary: MonetaryManager,
    identity: IdentityClient,
    reward: RewardClient,
    users: UserManager,
}

fn clients(node: &MemoryNode) -> Clients {
    let sender = TransactionSender::new(Arc::new(node.clone()), ClientConfig::default());
    let apps = AppManager::new(sender.clone());
    let monetary = MonetaryManager::new(sender);
    let identity = IdentityClient::new(apps.clone());
    Clients {
        reward: RewardClient::new(apps, monetary.clone()),
        users: UserManager::new(monetary.clone(), identity.clone()),
        identity,
        monetary,
    }
}

fn holder() -> Credential {
    Credential::seed([0x01; 32])
}

fn source() -> ProgramSource {
    ProgramSource::new("#pragma version 8\nint 1", "#pragma version 8\nint 1")
}

fn profile(user_type: UserType) -> UserProfile {
    UserProfile::new(user_type, "40.4168", "-3.7038")
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[tokio::test]
async fn identity_deploy_opt_in_and_validate() {
    let node = MemoryNode::new();
    let c = clients(&node);
    let app = c.identity.deploy(holder(), &source()).await.unwrap();

    let store = Credential::seed([0x51; 32]);
    let courier = Credential::seed([0x52; 32]);
    c.identity
        .opt_in(app.id, store.clone(), &profile(UserType::Store))
        .await
        .unwrap();
    c.identity
        .opt_in(
            app.id,
            courier.clone(),
            &profile(UserType::Courier).referred_by(store.address().unwrap()),
        )
        .await
        .unwrap();
    c.identity
        .validate_courier(app.id, store, courier.address().unwrap())
        .await
        .unwrap();

    assert_eq!(node.submissions().len(), 4);
}

#[tokio::test]
async fn empty_location_fails_locally() {
    let node = MemoryNode::new();
    let c = clients(&node);
    let err = c
        .identity
        .opt_in(9, holder(), &UserProfile::new(UserType::Buyer, "", "1.0"))
        .await
        .unwrap_err();
    assert!(matches!(err, ContractError::Protocol(_)));
    assert_eq!(node.network_calls(), 0);
}

// ---------------------------------------------------------------------------
// Rewards
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reward_funding_below_minimum_is_refused() {
    let node = MemoryNode::new();
    let c = clients(&node);
    let reward = c.reward.deploy(holder(), &source(), 5_001, 1_001).await.unwrap();
    let calls = node.network_calls();

    let err = c
        .reward
        .fund_app(holder(), &reward, c.reward.minimum_funding() - 1, 100)
        .await
        .unwrap_err();
    assert!(matches!(err, ContractError::InsufficientFunding { .. }));
    assert_eq!(node.network_calls(), calls);
}

#[tokio::test]
async fn reward_funding_that_overflows_is_refused() {
    let node = MemoryNode::new();
    let c = clients(&node);
    let reward = c.reward.deploy(holder(), &source(), 5_001, 1_001).await.unwrap();
    let calls = node.network_calls();

    let err = c
        .reward
        .fund_app(holder(), &reward, u64::MAX, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ContractError::AmountOverflow(_)));
    assert_eq!(node.network_calls(), calls);
}

#[tokio::test]
async fn reward_funding_checks_owner_balance() {
    let owner = holder().address().unwrap();
    let node = MemoryNode::new().with_account(AccountInfo::new(owner, 1_000));
    let c = clients(&node);
    let reward = c.reward.deploy(holder(), &source(), 5_001, 1_001).await.unwrap();
    let submitted = node.submissions().len();

    let err = c
        .reward
        .fund_app(holder(), &reward, c.reward.minimum_funding(), 100)
        .await
        .unwrap_err();
    assert!(matches!(err, ContractError::InsufficientBalance { available: 1_000, .. }));
    assert_eq!(node.submissions().len(), submitted);
}

#[tokio::test]
async fn reward_funded_in_one_group_then_checked() {
    let owner = holder().address().unwrap();
    let node = MemoryNode::new().with_account(AccountInfo::new(owner, 10_000_000));
    let c = clients(&node);

    let asset_id = c
        .monetary
        .create_asset(holder(), AssetParams::new(1_000_000, 0), None)
        .await
        .unwrap();
    let identity = c.identity.deploy(holder(), &source()).await.unwrap();
    let reward = c
        .reward
        .deploy(holder(), &source(), asset_id, identity.id)
        .await
        .unwrap();

    c.reward
        .fund_app(holder(), &reward, c.reward.minimum_funding(), 500)
        .await
        .unwrap();
    let last = node.submissions().last().cloned().unwrap();
    assert_eq!(last.len(), 3);

    c.reward
        .check_customer_reward(Credential::seed([0x77; 32]), &reward, Address::from_public_key([9; 32]))
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Onboarding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn init_account_is_one_cross_party_group() {
    let node = MemoryNode::new();
    let c = clients(&node);
    let user = c.users.create_user_account();

    let receipt = c
        .users
        .init_account(
            holder(),
            Credential::from(&user),
            5_001,
            1_001,
            &profile(UserType::Buyer),
        )
        .await
        .unwrap();

    assert_eq!(receipt.tx_ids.len(), 3);
    assert_eq!(node.submissions().len(), 1);
    assert_eq!(onboarding_funding(&ClientConfig::default()), 933_000);
}

#[tokio::test]
async fn init_account_with_bad_user_credential_sends_nothing() {
    let node = MemoryNode::new();
    let c = clients(&node);
    let err = c
        .users
        .init_account(
            holder(),
            Credential::mnemonic("definitely not twenty five words"),
            5_001,
            1_001,
            &profile(UserType::Buyer),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ContractError::Protocol(_)));
    assert_eq!(node.network_calls(), 0);
}
