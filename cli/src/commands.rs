//! Subcommand handlers. Each one builds its clients from the node
//! arguments, performs one operation, and prints the result as JSON on
//! stdout.

use anyhow::{Context, Result};
use plato_contracts::delivery::{CourierDeliveryClient, CustomerDeliveryClient, DeliveryOrder};
use plato_contracts::identity::IdentityClient;
use plato_contracts::reward::RewardClient;
use plato_contracts::{AppCallOptions, AppManager, MonetaryManager, ProgramSource, TransferOptions};
use plato_protocol::identity::Account;
use plato_protocol::network::{GroupReceipt, TransactionSender};
use plato_protocol::transaction::AssetParams;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::cli::{Commands, CreateAssetArgs, DeployEscrowArgs, InitArgs, NodeArgs, PlatoCli};

/// Managers shared by every handler, all over one sender.
struct Clients {
    apps: AppManager,
    monetary: MonetaryManager,
}

impl Clients {
    fn connect(node: &NodeArgs) -> Result<Self> {
        let config = node.config();
        let base_url = config.base_url();
        let sender = TransactionSender::connect(config)
            .with_context(|| format!("failed to build client for {base_url}"))?;
        Ok(Self {
            apps: AppManager::new(sender.clone()),
            monetary: MonetaryManager::new(sender),
        })
    }
}

pub async fn run(cli: PlatoCli) -> Result<()> {
    match cli.command {
        Commands::GenerateAccount => generate_account(),
        Commands::AccountInfo { address } => {
            let clients = Clients::connect(&cli.node)?;
            let info = clients
                .monetary
                .account_info(&address)
                .await
                .with_context(|| format!("failed to fetch account {address}"))?;
            print_json(&info)
        }
        Commands::CreateAsset(args) => create_asset(&cli.node, args).await,
        Commands::AssetOptIn { signer, asset_id } => {
            let clients = Clients::connect(&cli.node)?;
            let receipt = clients
                .monetary
                .asset_opt_in(signer.credential(), asset_id)
                .await
                .with_context(|| format!("opt-in to asset {asset_id} failed"))?;
            print_receipt(&receipt)
        }
        Commands::AssetTransfer {
            signer,
            to,
            asset_id,
            amount,
        } => {
            let clients = Clients::connect(&cli.node)?;
            let receipt = clients
                .monetary
                .asset_transfer(signer.credential(), to, asset_id, amount, TransferOptions::new())
                .await
                .context("asset transfer failed")?;
            print_receipt(&receipt)
        }
        Commands::DeployEscrow(args) => deploy_escrow(&cli.node, args).await,
        Commands::UpdateApp {
            signer,
            app_id,
            programs,
        } => {
            let clients = Clients::connect(&cli.node)?;
            let source = load_source(&programs.approval, &programs.clear).await?;
            let receipt = clients
                .apps
                .update(app_id, signer.credential(), &source, AppCallOptions::new())
                .await
                .with_context(|| format!("update of application {app_id} failed"))?;
            print_receipt(&receipt)
        }
        Commands::DeleteApp { signer, app_id } => {
            let clients = Clients::connect(&cli.node)?;
            let receipt = clients
                .apps
                .delete(app_id, signer.credential(), AppCallOptions::new())
                .await
                .with_context(|| format!("deletion of application {app_id} failed"))?;
            print_receipt(&receipt)
        }
        Commands::CompleteOrder { signer, escrow } => {
            let clients = Clients::connect(&cli.node)?;
            let customer = CustomerDeliveryClient::new(clients.apps, clients.monetary);
            let receipt = customer
                .complete_order(signer.credential(), &escrow.reference())
                .await
                .with_context(|| format!("completing escrow {} failed", escrow.app_id))?;
            print_receipt(&receipt)
        }
        Commands::Delivered { signer, escrow } => {
            let clients = Clients::connect(&cli.node)?;
            let receipt = CourierDeliveryClient::new(clients.apps)
                .delivered(signer.credential(), &escrow.reference())
                .await
                .with_context(|| format!("marking escrow {} delivered failed", escrow.app_id))?;
            print_receipt(&receipt)
        }
        Commands::ClaimFunds { signer, escrow } => {
            let clients = Clients::connect(&cli.node)?;
            let receipt = CourierDeliveryClient::new(clients.apps)
                .claim_funds(signer.credential(), &escrow.reference())
                .await
                .with_context(|| format!("claiming escrow {} failed", escrow.app_id))?;
            print_receipt(&receipt)
        }
        Commands::Init(args) => init(&cli.node, args).await,
    }
}

fn generate_account() -> Result<()> {
    let account = Account::generate();
    print_json(&json!({
        "address": account.address(),
        "mnemonic": account.to_mnemonic(),
    }))
}

async fn create_asset(node: &NodeArgs, args: CreateAssetArgs) -> Result<()> {
    let clients = Clients::connect(node)?;
    let params = AssetParams {
        unit_name: args.unit_name,
        asset_name: args.asset_name,
        url: args.url,
        ..AssetParams::new(args.total, args.decimals)
    };
    let asset_id = clients
        .monetary
        .create_asset(args.signer.credential(), params, None)
        .await
        .context("asset creation failed")?;
    print_json(&json!({ "asset_id": asset_id }))
}

async fn deploy_escrow(node: &NodeArgs, args: DeployEscrowArgs) -> Result<()> {
    let clients = Clients::connect(node)?;
    let source = load_source(&args.programs.approval, &args.programs.clear).await?;
    let order = DeliveryOrder {
        courier: args.courier,
        merchant: args.merchant,
        price: args.price,
        courier_reward: args.courier_reward,
        tips: args.tips,
        asset_id: args.asset_id,
    };
    let escrow = CustomerDeliveryClient::new(clients.apps, clients.monetary)
        .deploy(args.signer.credential(), &source, order)
        .await
        .context("escrow deployment failed")?;
    print_json(&escrow)
}

/// Create the PLATO asset, the identity registry and the reward app, in
/// that order, each one feeding the next.
async fn init(node: &NodeArgs, args: InitArgs) -> Result<()> {
    let clients = Clients::connect(node)?;
    let holder = args.signer.credential();

    let (identity_source, reward_source) = load_init_sources(&args).await?;

    let params = AssetParams {
        unit_name: Some("PLATO".to_owned()),
        asset_name: Some("Plato".to_owned()),
        ..AssetParams::new(args.total_supply, args.decimals)
    };
    let asset_id = clients
        .monetary
        .create_asset(holder.clone(), params, None)
        .await
        .context("PLATO asset creation failed")?;
    info!(asset_id, "PLATO asset created");

    let identity = IdentityClient::new(clients.apps.clone())
        .deploy(holder.clone(), &identity_source)
        .await
        .context("identity app deployment failed")?;

    let rewards = RewardClient::new(clients.apps, clients.monetary);
    let reward = rewards
        .deploy(holder.clone(), &reward_source, asset_id, identity.id)
        .await
        .context("reward app deployment failed")?;

    let funding = match args.fund_algos {
        Some(algos) => Some(
            rewards
                .fund_app(holder, &reward, algos, args.fund_tokens)
                .await
                .context("reward app funding failed")?,
        ),
        None => None,
    };

    print_json(&json!({
        "asset_id": asset_id,
        "identity_app": identity,
        "reward_app": reward,
        "reward_funding": funding.as_ref().map(receipt_json),
    }))
}

async fn load_init_sources(args: &InitArgs) -> Result<(ProgramSource, ProgramSource)> {
    let identity = load_source(&args.identity_approval, &args.identity_clear);
    let reward = load_source(&args.reward_approval, &args.reward_clear);
    tokio::try_join!(identity, reward)
}

async fn load_source(approval: &std::path::Path, clear: &std::path::Path) -> Result<ProgramSource> {
    ProgramSource::load(approval, clear)
        .await
        .with_context(|| format!("failed to read programs {}", approval.display()))
}

fn receipt_json(receipt: &GroupReceipt) -> serde_json::Value {
    json!({
        "group_id": hex::encode(receipt.group_id),
        "tx_ids": receipt.tx_ids,
        "confirmed_round": receipt.confirmed_round,
    })
}

fn print_receipt(receipt: &GroupReceipt) -> Result<()> {
    print_json(&receipt_json(receipt))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}
