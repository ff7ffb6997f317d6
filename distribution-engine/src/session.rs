// Copyright (c) James Kassemi, SC, US. All rights reserved.

use crate::engine::Distributor;
use crate::error::Result;
use crate::plan::DistributionPlan;
use core_types::{Address, HoldersSnapshot, MosaicId, TransferReport};
use holder_index::AccountIndex;
use ledger_gateway::{LedgerNode, TransactionSigner};

/// Snapshot-then-distribute workflow for holders of one mosaic.
///
/// The snapshot is taken once and kept for the life of the session so the
/// caller can inspect it before committing to any transfer.
pub struct DistributionSession<'a, I, N, S> {
    distributor: &'a Distributor<I, N, S>,
    mosaic: MosaicId,
    snapshot: Option<HoldersSnapshot>,
}

impl<'a, I, N, S> DistributionSession<'a, I, N, S>
where
    I: AccountIndex,
    N: LedgerNode,
    S: TransactionSigner,
{
    pub fn new(distributor: &'a Distributor<I, N, S>, mosaic: MosaicId) -> Self {
        Self {
            distributor,
            mosaic,
            snapshot: None,
        }
    }

    pub async fn create_snapshot(
        &mut self,
        minimum: u64,
        ignored: Vec<Address>,
    ) -> Result<&HoldersSnapshot> {
        let snapshot = self
            .distributor
            .create_snapshot(self.mosaic, minimum, ignored)
            .await?;
        Ok(&*self.snapshot.insert(snapshot))
    }

    pub fn snapshot(&self) -> Option<&HoldersSnapshot> {
        self.snapshot.as_ref()
    }

    pub async fn distribute(
        &self,
        plan: DistributionPlan,
        total: u64,
    ) -> Result<Vec<TransferReport>> {
        self.distributor
            .distribute(self.snapshot.as_ref(), plan, total)
            .await
    }

    /// Pays `total` of the network currency, net of transfer fees.
    pub async fn send_dividend(&self, total: u64) -> Result<Vec<TransferReport>> {
        self.distribute(DistributionPlan::DIVIDEND, total).await
    }

    /// Pays `total` of the tracked mosaic itself.
    pub async fn send_staking(&self, total: u64) -> Result<Vec<TransferReport>> {
        self.distribute(DistributionPlan::STAKING, total).await
    }
}
