//! # CLI Interface
//!
//! `clap` derive definitions for the `plato` binary. Node coordinates and
//! secrets fall back to environment variables so scripts never have to put
//! a mnemonic on the command line.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use plato_contracts::delivery::EscrowRef;
use plato_contracts::programs::{
    DELIVERY_APPROVAL_PATH, DELIVERY_CLEAR_PATH, IDENTITY_APPROVAL_PATH, IDENTITY_CLEAR_PATH,
    REWARD_APPROVAL_PATH, REWARD_CLEAR_PATH,
};
use plato_protocol::config::{
    ClientConfig, FeePolicy, DEFAULT_ALGOD_HOST, DEFAULT_ALGOD_PORT, DEFAULT_ALGOD_TOKEN,
    DEFAULT_MAX_WAIT_ROUNDS,
};
use plato_protocol::identity::{Address, Credential};

use crate::logging::LogFormat;

/// Operator tool for Plato's delivery, identity and reward applications.
#[derive(Parser, Debug)]
#[command(name = "plato", version, propagate_version = true)]
pub struct PlatoCli {
    #[command(flatten)]
    pub node: NodeArgs,

    /// Log format: pretty or json.
    #[arg(long, env = "PLATO_LOG_FORMAT", default_value = "pretty", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the algod node is and how to talk to it.
#[derive(Args, Debug, Clone)]
pub struct NodeArgs {
    /// algod host, scheme included.
    #[arg(long, env = "ALGO_HOST_URL", default_value = DEFAULT_ALGOD_HOST, global = true)]
    pub host: String,

    #[arg(long, env = "ALGO_HOST_PORT", default_value_t = DEFAULT_ALGOD_PORT, global = true)]
    pub port: u16,

    #[arg(
        long,
        env = "ALGO_HOST_ACCESS_TOKEN",
        default_value = DEFAULT_ALGOD_TOKEN,
        hide_default_value = true,
        hide_env_values = true,
        global = true
    )]
    pub token: String,

    /// Rounds to wait for confirmation before giving up.
    #[arg(long, env = "PLATO_MAX_WAIT_ROUNDS", default_value_t = DEFAULT_MAX_WAIT_ROUNDS, global = true)]
    pub max_wait_rounds: u64,

    /// Pay the node's suggested per-byte fee instead of the flat minimum.
    #[arg(long, global = true)]
    pub suggested_fee: bool,
}

impl NodeArgs {
    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(&self.host, self.port, &self.token)
            .with_max_wait_rounds(self.max_wait_rounds);
        if self.suggested_fee {
            config = config.with_fee_policy(FeePolicy::Suggested);
        }
        config
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show an account's balance and asset holdings.
    AccountInfo {
        address: Address,
    },
    /// Generate a new account and print its address and mnemonic.
    GenerateAccount,
    /// Create an asset.
    CreateAsset(CreateAssetArgs),
    /// Opt an account into an asset.
    AssetOptIn {
        #[command(flatten)]
        signer: Signer,
        #[arg(long, env = "PLATO_ASSET_ID")]
        asset_id: u64,
    },
    /// Transfer units of an asset.
    AssetTransfer {
        #[command(flatten)]
        signer: Signer,
        #[arg(long)]
        to: Address,
        #[arg(long, env = "PLATO_ASSET_ID")]
        asset_id: u64,
        #[arg(long)]
        amount: u64,
    },
    /// Create and fund a delivery escrow as the customer.
    DeployEscrow(DeployEscrowArgs),
    /// Replace an application's programs.
    UpdateApp {
        #[command(flatten)]
        signer: Signer,
        #[arg(long)]
        app_id: u64,
        #[command(flatten)]
        programs: ProgramPaths,
    },
    /// Delete an application.
    DeleteApp {
        #[command(flatten)]
        signer: Signer,
        #[arg(long)]
        app_id: u64,
    },
    /// Release an escrow as the customer.
    CompleteOrder {
        #[command(flatten)]
        signer: Signer,
        #[command(flatten)]
        escrow: EscrowArgs,
    },
    /// Mark an order delivered as the courier.
    Delivered {
        #[command(flatten)]
        signer: Signer,
        #[command(flatten)]
        escrow: EscrowArgs,
    },
    /// Collect the courier's funds from an escrow.
    ClaimFunds {
        #[command(flatten)]
        signer: Signer,
        #[command(flatten)]
        escrow: EscrowArgs,
    },
    /// Bootstrap a network: PLATO asset, identity app and reward app.
    Init(InitArgs),
}

/// The account that signs.
#[derive(Args, Debug, Clone)]
pub struct Signer {
    /// 25-word mnemonic of the signing account.
    #[arg(long, env = "PLATO_MNEMONIC", hide_env_values = true)]
    pub mnemonic: String,
}

impl Signer {
    pub fn credential(&self) -> Credential {
        Credential::mnemonic(self.mnemonic.as_str())
    }
}

#[derive(Args, Debug, Clone)]
pub struct ProgramPaths {
    #[arg(long, default_value = DELIVERY_APPROVAL_PATH)]
    pub approval: PathBuf,
    #[arg(long, default_value = DELIVERY_CLEAR_PATH)]
    pub clear: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct EscrowArgs {
    #[arg(long, env = "PLATO_ESCROW_APP_ID")]
    pub app_id: u64,
    #[arg(long, env = "PLATO_COURIER")]
    pub courier: Address,
    #[arg(long, env = "PLATO_MERCHANT")]
    pub merchant: Address,
    #[arg(long, env = "PLATO_ASSET_ID")]
    pub asset_id: u64,
}

impl EscrowArgs {
    pub fn reference(&self) -> EscrowRef {
        EscrowRef {
            app_id: self.app_id,
            courier: self.courier,
            merchant: self.merchant,
            asset_id: self.asset_id,
        }
    }
}

#[derive(Args, Debug)]
pub struct CreateAssetArgs {
    #[command(flatten)]
    pub signer: Signer,
    #[arg(long)]
    pub total: u64,
    #[arg(long, default_value_t = 0)]
    pub decimals: u32,
    #[arg(long)]
    pub unit_name: Option<String>,
    #[arg(long)]
    pub asset_name: Option<String>,
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeployEscrowArgs {
    #[command(flatten)]
    pub signer: Signer,
    #[arg(long, env = "PLATO_COURIER")]
    pub courier: Address,
    #[arg(long, env = "PLATO_MERCHANT")]
    pub merchant: Address,
    /// Order price in microAlgos.
    #[arg(long)]
    pub price: u64,
    /// Courier's share of the price in microAlgos.
    #[arg(long)]
    pub courier_reward: u64,
    /// Tips in asset units.
    #[arg(long, default_value_t = 0)]
    pub tips: u64,
    #[arg(long, env = "PLATO_ASSET_ID")]
    pub asset_id: u64,
    #[command(flatten)]
    pub programs: ProgramPaths,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    #[command(flatten)]
    pub signer: Signer,
    /// Total PLATO supply in base units.
    #[arg(long, default_value_t = 1_000_000_000)]
    pub total_supply: u64,
    #[arg(long, default_value_t = 6)]
    pub decimals: u32,
    #[arg(long, default_value = IDENTITY_APPROVAL_PATH)]
    pub identity_approval: PathBuf,
    #[arg(long, default_value = IDENTITY_CLEAR_PATH)]
    pub identity_clear: PathBuf,
    #[arg(long, default_value = REWARD_APPROVAL_PATH)]
    pub reward_approval: PathBuf,
    #[arg(long, default_value = REWARD_CLEAR_PATH)]
    pub reward_clear: PathBuf,
    /// Fund the reward app with this many microAlgos after creating it.
    #[arg(long)]
    pub fund_algos: Option<u64>,
    /// PLATO units sent along with the funding.
    #[arg(long, default_value_t = 0)]
    pub fund_tokens: u64,
}
