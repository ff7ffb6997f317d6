// Copyright (c) James Kassemi, SC, US. All rights reserved.

use crate::AccountIndex;
use log::warn;
use rust_decimal::Decimal;

/// Multiplier used when recent block data is missing or unusable.
pub const FALLBACK_FEE_MULTIPLIER: Decimal = Decimal::ONE;

/// Number of most recent blocks averaged for the estimate.
pub const FEE_SAMPLE_BLOCKS: usize = 3;

/// Current fee multiplier. Never fails: mirror errors fall back to 1.
pub async fn fee_multiplier<I>(index: &I) -> Decimal
where
    I: AccountIndex + ?Sized,
{
    match index.recent_fee_multipliers(FEE_SAMPLE_BLOCKS).await {
        Ok(values) => average_fee_multiplier(&values).unwrap_or(FALLBACK_FEE_MULTIPLIER),
        Err(err) => {
            warn!("fee multiplier unavailable, using fallback: {}", err);
            FALLBACK_FEE_MULTIPLIER
        }
    }
}

/// Mean of the sampled multipliers, `None` when empty or not positive.
pub fn average_fee_multiplier(values: &[u64]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().copied().map(Decimal::from).sum();
    if sum <= Decimal::ZERO {
        return None;
    }
    Some(sum / Decimal::from(values.len()))
}
