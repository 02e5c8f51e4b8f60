// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Plato Application Clients
//!
//! Business operations on Plato's three on-chain applications, expressed as
//! transactions for the pipeline in `plato-protocol`:
//!
//! - **Delivery**: a per-order escrow between customer, merchant and
//!   courier.
//! - **Identity**: the user registry: roles, locations, referrers and
//!   mutual validation.
//! - **Reward**: referral payouts in PLATO tokens.
//!
//! Plus the generic pieces they share: [`app_manager::AppManager`] for
//! application lifecycle, [`monetary::MonetaryManager`] for algo and asset
//! movements, [`user::UserManager`] for onboarding, and
//! [`programs::ProgramSource`] for TEAL on disk.
//!
//! ## Design Principles
//!
//! 1. The programs are opaque. Nothing here reimplements their rules beyond
//!    the arithmetic needed to fund them.
//! 2. Any operation that moves value into a new account does it in one
//!    atomic group.
//! 3. Business checks (order terms, funding, balances) run before the first
//!    transaction is built.

pub mod app_manager;
pub mod delivery;
pub mod error;
pub mod identity;
pub mod monetary;
pub mod programs;
pub mod reward;
pub mod user;

pub use app_manager::{AppCallOptions, AppManager, AppSchema, DeployedApp};
pub use error::{ContractError, Result};
pub use monetary::{MonetaryManager, TransferOptions};
pub use programs::ProgramSource;
