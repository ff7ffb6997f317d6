// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Ad-hoc beneficiary lists: `address,amount` rows with human-unit amounts.

use core_types::{Address, Beneficiary, MAX_BATCH_SIZE, MINOR_UNITS_PER_WHOLE};
use csv_async::{AsyncReaderBuilder, Trim};
use futures::StreamExt;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BeneficiaryError {
    #[error("csv error: {0}")]
    Csv(#[from] csv_async::Error),
    #[error("row {row}: invalid address '{value}'")]
    InvalidAddress { row: usize, value: String },
    #[error("row {row}: invalid amount '{value}'")]
    InvalidAmount { row: usize, value: String },
    #[error("beneficiaries list is empty")]
    Empty,
}

/// Parses up to [`MAX_BATCH_SIZE`] beneficiaries from CSV text.
///
/// Rows without exactly two fields are skipped, as are rows whose amount
/// rounds to zero or below. Amounts are scaled by 10^6 and rounded to the
/// nearest minor unit, ties toward zero.
pub async fn parse_beneficiaries(text: &str) -> Result<Vec<Beneficiary>, BeneficiaryError> {
    let mut reader = AsyncReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .create_reader(text.as_bytes());
    let mut records = reader.records();
    let mut beneficiaries = Vec::new();
    let mut row = 0;

    while let Some(record) = records.next().await {
        let record = record?;
        row += 1;
        if record.len() != 2 {
            continue;
        }
        let amount = scale_amount(&record[1]).ok_or_else(|| BeneficiaryError::InvalidAmount {
            row,
            value: record[1].to_string(),
        })?;
        if amount == 0 {
            continue;
        }
        let address =
            Address::from_str(&record[0]).map_err(|_| BeneficiaryError::InvalidAddress {
                row,
                value: record[0].to_string(),
            })?;
        beneficiaries.push(Beneficiary { address, amount });
        if beneficiaries.len() >= MAX_BATCH_SIZE {
            break;
        }
    }

    if beneficiaries.is_empty() {
        return Err(BeneficiaryError::Empty);
    }
    Ok(beneficiaries)
}

/// Human amount to minor units; non-positive results map to `Some(0)`.
fn scale_amount(raw: &str) -> Option<u64> {
    let value = Decimal::from_str(raw).ok()?;
    let scaled = value
        .checked_mul(Decimal::from(MINOR_UNITS_PER_WHOLE))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointTowardZero);
    if scaled <= Decimal::ZERO {
        return Some(0);
    }
    scaled.to_u64()
}
