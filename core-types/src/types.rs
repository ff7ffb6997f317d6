// Copyright (c) James Kassemi, SC, US. All rights reserved.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest number of transfers carried by one aggregate.
pub const MAX_BATCH_SIZE: usize = 1000;

/// Scale between human-entered amounts and on-ledger minor units.
pub const MINOR_UNITS_PER_WHOLE: u64 = 1_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseIdError {
    #[error("mosaic id must be 1-16 hex digits, got '{0}'")]
    Mosaic(String),
    #[error("address must not be empty")]
    EmptyAddress,
}

/// 64-bit mosaic identifier, rendered as 16 uppercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MosaicId(u64);

impl MosaicId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl FromStr for MosaicId {
    type Err = ParseIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.is_empty() || digits.len() > 16 {
            return Err(ParseIdError::Mosaic(value.to_string()));
        }
        u64::from_str_radix(digits, 16)
            .map(MosaicId)
            .map_err(|_| ParseIdError::Mosaic(value.to_string()))
    }
}

impl fmt::Display for MosaicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

/// Account address in its plain (undashed, uppercase) form.
///
/// Pretty-printed addresses (`TB2Z-...`) are normalized on parse so ignore
/// lists compare equal regardless of how the caller formatted them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = ParseIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let plain: String = value
            .trim()
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if plain.is_empty() {
            return Err(ParseIdError::EmptyAddress);
        }
        Ok(Address(plain))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash of an announced transaction, uppercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionHash(String);

impl TransactionHash {
    pub fn new(hash: impl AsRef<str>) -> Self {
        Self(hash.as_ref().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! string_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }
    };
    ($ty:ty, parse) => {
        string_serde!($ty);

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(de::Error::custom)
            }
        }
    };
}

string_serde!(MosaicId, parse);
string_serde!(Address, parse);
string_serde!(TransactionHash);

impl<'de> Deserialize<'de> for TransactionHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(TransactionHash::new)
    }
}

/// One qualifying holder with its share of the filtered balance pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holder {
    pub address: Address,
    pub balance: u64,
    #[serde(with = "rust_decimal::serde::str")]
    pub share: Decimal,
}

/// Point-in-time list of holders, highest share first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldersSnapshot {
    mosaic: MosaicId,
    taken_at: DateTime<Utc>,
    holders: Vec<Holder>,
}

impl HoldersSnapshot {
    /// Wraps an already ranked holder list.
    pub fn new(mosaic: MosaicId, holders: Vec<Holder>) -> Self {
        Self {
            mosaic,
            taken_at: Utc::now(),
            holders,
        }
    }

    pub fn mosaic(&self) -> MosaicId {
        self.mosaic
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    pub fn holders(&self) -> &[Holder] {
        &self.holders
    }

    pub fn len(&self) -> usize {
        self.holders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holders.is_empty()
    }

    pub fn share_sum(&self) -> Decimal {
        self.holders.iter().map(|h| h.share).sum()
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.holders.iter().any(|h| &h.address == address)
    }
}

/// Recipient of a single transfer, amount in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beneficiary {
    pub address: Address,
    pub amount: u64,
}

/// Outcome of one submitted batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReport {
    pub beneficiaries: Vec<Beneficiary>,
    pub transaction: Option<TransactionHash>,
    pub success: bool,
}

impl TransferReport {
    pub fn new(beneficiaries: Vec<Beneficiary>, transaction: Option<TransactionHash>) -> Self {
        let success = transaction.is_some();
        Self {
            beneficiaries,
            transaction,
            success,
        }
    }

    pub fn total_amount(&self) -> u64 {
        self.beneficiaries.iter().map(|b| b.amount).sum()
    }
}
