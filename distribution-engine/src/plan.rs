// Copyright (c) James Kassemi, SC, US. All rights reserved.
use core_types::MosaicId;
use serde::Serialize;

/// Which mosaic a distribution moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetSelector {
    /// The network currency configured for the service.
    Currency,
    /// The mosaic whose holders were snapshotted.
    Tracked,
}

/// Variant of a distribution run. Every variant shares one pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionPlan {
    pub asset: AssetSelector,
    /// Deduct the per-transfer fee from each allocation and drop dust.
    pub fee_aware: bool,
}

impl DistributionPlan {
    pub const DIVIDEND: Self = Self {
        asset: AssetSelector::Currency,
        fee_aware: true,
    };

    pub const STAKING: Self = Self {
        asset: AssetSelector::Tracked,
        fee_aware: false,
    };

    pub fn label(&self) -> &'static str {
        match (self.asset, self.fee_aware) {
            (AssetSelector::Currency, true) => "dividend",
            (AssetSelector::Tracked, false) => "staking",
            (AssetSelector::Currency, false) => "currency",
            (AssetSelector::Tracked, true) => "tracked",
        }
    }

    pub fn resolve(&self, currency: MosaicId, tracked: MosaicId) -> MosaicId {
        match self.asset {
            AssetSelector::Currency => currency,
            AssetSelector::Tracked => tracked,
        }
    }
}
