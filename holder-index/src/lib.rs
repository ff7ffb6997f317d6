// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Read-only queries against the persisted mirror of ledger account state:
//! ranked holder lists for a mosaic and the recent network fee multiplier.

pub mod fees;
pub mod holders;
pub mod sqlite;

use async_trait::async_trait;
use core_types::{Address, MosaicId};
use thiserror::Error;

pub use fees::{average_fee_multiplier, fee_multiplier, FALLBACK_FEE_MULTIPLIER, FEE_SAMPLE_BLOCKS};
pub use holders::{get_holders, rank_holders};
pub use sqlite::SqliteAccountIndex;

pub type Result<T> = std::result::Result<T, IndexError>;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("account mirror unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
    #[error("invalid account record: {0}")]
    InvalidRecord(String),
}

/// Balance of one account for the queried mosaic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBalance {
    pub address: Address,
    pub amount: u64,
}

/// Access to the account mirror. Implementations never write.
#[async_trait]
pub trait AccountIndex: Send + Sync {
    /// Accounts holding strictly more than `minimum` of `mosaic`, highest balance first.
    async fn balances_above(&self, mosaic: MosaicId, minimum: u64) -> Result<Vec<AccountBalance>>;

    /// Fee multipliers of the `limit` most recently indexed blocks, newest first.
    async fn recent_fee_multipliers(&self, limit: usize) -> Result<Vec<u64>>;
}
