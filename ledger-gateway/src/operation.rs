// Copyright (c) James Kassemi, SC, US. All rights reserved.

use crate::error::{GatewayError, Result};
use core_types::{Address, Beneficiary, MosaicId, MAX_BATCH_SIZE};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

/// Estimated serialized size of a mosaic definition aggregate.
pub const MOSAIC_CREATION_SIZE: u64 = 312;

/// Estimated serialized size contributed by one embedded transfer.
pub const MOSAIC_TRANSFER_SIZE: u64 = 177;

/// Headroom over `size * multiplier` so the offered fee is never short.
pub const FEE_SAFETY_FACTOR: Decimal = Decimal::from_parts(12, 0, 0, false, 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MosaicFlags {
    pub supply_mutable: bool,
    pub transferable: bool,
    pub restrictable: bool,
}

/// One embedded operation of an aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Operation {
    #[serde(rename_all = "camelCase")]
    Transfer {
        recipient: Address,
        mosaic: MosaicId,
        amount: u64,
    },
    #[serde(rename_all = "camelCase")]
    MosaicDefinition {
        nonce: u32,
        mosaic: MosaicId,
        flags: MosaicFlags,
        divisibility: u8,
        duration: u64,
    },
    #[serde(rename_all = "camelCase")]
    MosaicSupplyChange {
        mosaic: MosaicId,
        increase: bool,
        delta: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperationKind {
    Definition,
    Transfer,
}

/// Operations announced together as one complete aggregate: they confirm or
/// fail as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSet {
    kind: OperationKind,
    operations: Vec<Operation>,
}

impl OperationSet {
    /// One transfer of `mosaic` per beneficiary.
    pub fn transfers(mosaic: MosaicId, beneficiaries: &[Beneficiary]) -> Result<Self> {
        if beneficiaries.is_empty() {
            return Err(GatewayError::EmptyOperationSet);
        }
        if beneficiaries.len() > MAX_BATCH_SIZE {
            return Err(GatewayError::TooManyOperations {
                count: beneficiaries.len(),
                limit: MAX_BATCH_SIZE,
            });
        }
        let operations = beneficiaries
            .iter()
            .map(|b| {
                if b.amount == 0 {
                    return Err(GatewayError::ZeroAmount(b.address.clone()));
                }
                Ok(Operation::Transfer {
                    recipient: b.address.clone(),
                    mosaic,
                    amount: b.amount,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            kind: OperationKind::Transfer,
            operations,
        })
    }

    /// Definition of a new non-expiring, transferable, fixed-supply mosaic
    /// with its initial supply.
    pub fn mosaic_definition(nonce: u32, mosaic: MosaicId, divisibility: u8, supply: u64) -> Self {
        Self {
            kind: OperationKind::Definition,
            operations: vec![
                Operation::MosaicDefinition {
                    nonce,
                    mosaic,
                    flags: MosaicFlags {
                        supply_mutable: false,
                        transferable: true,
                        restrictable: false,
                    },
                    divisibility,
                    duration: 0,
                },
                Operation::MosaicSupplyChange {
                    mosaic,
                    increase: true,
                    delta: supply,
                },
            ],
        }
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn estimated_size(&self) -> u64 {
        match self.kind {
            OperationKind::Definition => MOSAIC_CREATION_SIZE,
            OperationKind::Transfer => MOSAIC_TRANSFER_SIZE * self.operations.len() as u64,
        }
    }

    /// `ceil(size * multiplier * 1.2)`, saturating at `u64::MAX`.
    pub fn max_fee(&self, fee_multiplier: Decimal) -> u64 {
        max_fee_for_size(self.estimated_size(), fee_multiplier)
    }
}

pub fn max_fee_for_size(size: u64, fee_multiplier: Decimal) -> u64 {
    Decimal::from(size)
        .checked_mul(fee_multiplier)
        .and_then(|fee| fee.checked_mul(FEE_SAFETY_FACTOR))
        .map(|fee| fee.ceil())
        .and_then(|fee| fee.to_u64())
        .unwrap_or(u64::MAX)
}
