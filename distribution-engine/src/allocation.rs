// Copyright (c) James Kassemi, SC, US. All rights reserved.

use core_types::{Beneficiary, Holder, MAX_BATCH_SIZE};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Splits `total` across `holders` and groups the transfers into batches.
///
/// Holders are chunked into groups of at most [`MAX_BATCH_SIZE`] first, in
/// snapshot order. Each holder receives `floor(share * total) - fee`. The
/// first holder whose allocation does not exceed `fee` ends the whole run:
/// holders are sorted by share, so nobody after it can clear the fee either.
/// Batches left empty by that cutoff are dropped.
///
/// When every holder carries its balance, the share is taken as the exact
/// ratio `balance / pool` so repeating fractions do not lose a unit.
pub fn allocate(holders: &[Holder], total: u64, fee: Decimal) -> Vec<Vec<Beneficiary>> {
    let basis = ShareBasis::of(holders);
    let mut batches = Vec::new();
    for chunk in holders.chunks(MAX_BATCH_SIZE) {
        let mut batch = Vec::with_capacity(chunk.len());
        let mut exhausted = false;
        for holder in chunk {
            let allocation = basis.allocation(holder, total);
            match allocation.and_then(|allocation| payout(allocation, fee)) {
                Some(amount) => batch.push(Beneficiary {
                    address: holder.address.clone(),
                    amount,
                }),
                None => {
                    exhausted = true;
                    break;
                }
            }
        }
        if !batch.is_empty() {
            batches.push(batch);
        }
        if exhausted {
            break;
        }
    }
    batches
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShareBasis {
    /// Sum of the holders' balances.
    Balances(u128),
    /// Only the decimal shares are known.
    Shares,
}

impl ShareBasis {
    fn of(holders: &[Holder]) -> Self {
        if holders.is_empty() || holders.iter().any(|h| h.balance == 0) {
            return Self::Shares;
        }
        Self::Balances(holders.iter().map(|h| u128::from(h.balance)).sum())
    }

    /// Gross allocation, floored to whole minor units.
    fn allocation(self, holder: &Holder, total: u64) -> Option<Decimal> {
        match self {
            Self::Balances(pool) => {
                let exact = u128::from(holder.balance) * u128::from(total) / pool;
                u64::try_from(exact).ok().map(Decimal::from)
            }
            Self::Shares => Some(holder.share.checked_mul(Decimal::from(total))?.floor()),
        }
    }
}

/// Net transfer for one holder, `None` when it is dust.
///
/// A fractional fee can leave less than one minor unit above it; that is
/// dust too.
fn payout(allocation: Decimal, fee: Decimal) -> Option<u64> {
    if allocation <= fee {
        return None;
    }
    (allocation - fee).floor().to_u64().filter(|amount| *amount > 0)
}
