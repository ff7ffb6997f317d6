// Copyright (c) James Kassemi, SC, US. All rights reserved.

use crate::{AccountBalance, AccountIndex, Result};
use core_types::{Address, Holder, MosaicId};
use log::debug;
use rust_decimal::Decimal;
use std::collections::HashSet;

/// Qualifying holders of `mosaic`, highest share first.
///
/// An empty vector means nobody passed the filters; a mirror failure is an
/// `Err`, never an empty list.
pub async fn get_holders<I>(
    index: &I,
    mosaic: MosaicId,
    minimum: u64,
    ignored: &[Address],
) -> Result<Vec<Holder>>
where
    I: AccountIndex + ?Sized,
{
    let balances = index.balances_above(mosaic, minimum).await?;
    let ignored: HashSet<&Address> = ignored.iter().collect();
    let holders = rank_holders(balances, minimum, &ignored);
    debug!(
        "mosaic {}: {} holders above {} ({} ignored addresses)",
        mosaic,
        holders.len(),
        minimum,
        ignored.len()
    );
    Ok(holders)
}

/// Filters raw balances and normalizes shares over the survivors.
///
/// Shares are relative to the filtered pool, not the mosaic supply. The sort
/// is stable so equal shares keep the order the mirror returned.
pub fn rank_holders(
    balances: Vec<AccountBalance>,
    minimum: u64,
    ignored: &HashSet<&Address>,
) -> Vec<Holder> {
    let kept: Vec<AccountBalance> = balances
        .into_iter()
        .filter(|b| b.amount > minimum && !ignored.contains(&b.address))
        .collect();
    let total: Decimal = kept.iter().map(|b| Decimal::from(b.amount)).sum();
    if total.is_zero() {
        return Vec::new();
    }

    let mut holders: Vec<Holder> = kept
        .into_iter()
        .map(|b| Holder {
            share: Decimal::from(b.amount) / total,
            address: b.address,
            balance: b.amount,
        })
        .collect();
    holders.sort_by(|a, b| b.share.cmp(&a.share));
    holders
}
