// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # plato
//!
//! Operator CLI for the Plato applications on Algorand. Creates assets,
//! deploys and drives delivery escrows, and bootstraps the identity and
//! reward apps against any algod node.
//!
//! ## Usage
//!
//! ```bash
//! export ALGO_HOST_URL=http://localhost ALGO_HOST_PORT=4001
//! plato generate-account
//! PLATO_MNEMONIC="..." plato init --fund-algos 500000 --fund-tokens 1000000
//! PLATO_MNEMONIC="..." plato deploy-escrow --courier ... --merchant ... \
//!     --price 80000 --courier-reward 15000 --asset-id 5001
//! ```

mod cli;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;

use crate::cli::PlatoCli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = PlatoCli::parse();
    logging::init_logging(logging::DEFAULT_FILTER, cli.log_format);

    tracing::debug!(node = %cli.node.config().base_url(), "plato starting");
    commands::run(cli).await
}
