//! TEAL program sources on disk.
//!
//! Every application ships as an approval/clear pair built into `./dist`.
//! Both files are read concurrently; compilation happens later, through the
//! node.

use std::path::{Path, PathBuf};

use crate::error::{ContractError, Result};

pub const DELIVERY_APPROVAL_PATH: &str = "./dist/escrow_approval.teal";
pub const DELIVERY_CLEAR_PATH: &str = "./dist/escrow_clear_program.teal";
pub const IDENTITY_APPROVAL_PATH: &str = "./dist/identity_approval.teal";
pub const IDENTITY_CLEAR_PATH: &str = "./dist/identity_clear_program.teal";
pub const REWARD_APPROVAL_PATH: &str = "./dist/rewards_approval.teal";
pub const REWARD_CLEAR_PATH: &str = "./dist/rewards_clear_state.teal";

/// Approval and clear-state source of one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSource {
    pub approval: String,
    pub clear: String,
}

impl ProgramSource {
    pub fn new(approval: impl Into<String>, clear: impl Into<String>) -> Self {
        Self {
            approval: approval.into(),
            clear: clear.into(),
        }
    }

    /// Read both files concurrently.
    pub async fn load(approval: impl AsRef<Path>, clear: impl AsRef<Path>) -> Result<Self> {
        let (approval, clear) =
            futures::try_join!(read_source(approval.as_ref()), read_source(clear.as_ref()))?;
        Ok(Self { approval, clear })
    }

    pub async fn delivery() -> Result<Self> {
        Self::load(DELIVERY_APPROVAL_PATH, DELIVERY_CLEAR_PATH).await
    }

    pub async fn identity() -> Result<Self> {
        Self::load(IDENTITY_APPROVAL_PATH, IDENTITY_CLEAR_PATH).await
    }

    pub async fn reward() -> Result<Self> {
        Self::load(REWARD_APPROVAL_PATH, REWARD_CLEAR_PATH).await
    }
}

async fn read_source(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ContractError::ProgramSource {
            path: PathBuf::from(path),
            source,
        })
}
