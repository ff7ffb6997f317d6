// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! sqlite-backed account mirror.
//!
//! The mirror is populated by an external indexer; this crate only reads it.

use crate::{AccountBalance, AccountIndex, IndexError, Result};
use async_trait::async_trait;
use core_types::{Address, MosaicId};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Tables the indexer maintains. Mosaic ids are stored as 16 hex digits.
pub const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS account_mosaics (
        address TEXT NOT NULL,
        mosaic_id TEXT NOT NULL,
        amount INTEGER NOT NULL,
        PRIMARY KEY (address, mosaic_id)
    )",
    "CREATE INDEX IF NOT EXISTS account_mosaics_by_mosaic
        ON account_mosaics (mosaic_id, amount DESC)",
    "CREATE TABLE IF NOT EXISTS blocks (
        height INTEGER PRIMARY KEY,
        fee_multiplier INTEGER NOT NULL
    )",
];

const BALANCES_ABOVE: &str = "SELECT address, amount FROM account_mosaics \
     WHERE mosaic_id = ?1 AND amount > ?2 ORDER BY amount DESC";

const RECENT_FEE_MULTIPLIERS: &str =
    "SELECT fee_multiplier FROM blocks ORDER BY height DESC LIMIT ?1";

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct SqliteAccountIndex {
    pool: SqlitePool,
}

impl SqliteAccountIndex {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens the mirror read-only without touching it; connection failures
    /// surface on the first query as [`IndexError::Unavailable`].
    pub fn connect_lazy(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_lazy_with(options);
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl AccountIndex for SqliteAccountIndex {
    async fn balances_above(&self, mosaic: MosaicId, minimum: u64) -> Result<Vec<AccountBalance>> {
        let floor = i64::try_from(minimum).unwrap_or(i64::MAX);
        let rows: Vec<(String, i64)> = sqlx::query_as(BALANCES_ABOVE)
            .bind(mosaic.to_string())
            .bind(floor)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|(address, amount)| {
                let parsed = Address::from_str(&address)
                    .map_err(|err| IndexError::InvalidRecord(format!("{address}: {err}")))?;
                let amount = u64::try_from(amount).map_err(|_| {
                    IndexError::InvalidRecord(format!("{address}: negative amount {amount}"))
                })?;
                Ok(AccountBalance {
                    address: parsed,
                    amount,
                })
            })
            .collect()
    }

    async fn recent_fee_multipliers(&self, limit: usize) -> Result<Vec<u64>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<(i64,)> = sqlx::query_as(RECENT_FEE_MULTIPLIERS)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(value,)| u64::try_from(value).unwrap_or(0))
            .collect())
    }
}
