// Copyright (c) James Kassemi, SC, US. All rights reserved.

use crate::allocation::allocate;
use crate::error::{DistributionError, Result};
use crate::plan::DistributionPlan;
use crate::session::DistributionSession;
use core_types::{Address, Beneficiary, HoldersSnapshot, MosaicId, TransactionHash, TransferReport};
use holder_index::{fee_multiplier, get_holders, AccountIndex};
use ledger_gateway::{
    LedgerGateway, LedgerNode, OperationSet, TransactionSigner, MOSAIC_TRANSFER_SIZE,
};
use log::{error, info, warn};
use rust_decimal::Decimal;

/// Balances of the distributing account, in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccountBalances {
    pub currency: u64,
    pub mosaic: u64,
}

/// Drives snapshots and distribution runs for one distributing account.
pub struct Distributor<I, N, S> {
    index: I,
    gateway: LedgerGateway<N, S>,
    account: Address,
    currency: MosaicId,
}

impl<I, N, S> Distributor<I, N, S>
where
    I: AccountIndex,
    N: LedgerNode,
    S: TransactionSigner,
{
    pub fn new(index: I, gateway: LedgerGateway<N, S>, account: Address, currency: MosaicId) -> Self {
        Self {
            index,
            gateway,
            account,
            currency,
        }
    }

    pub fn account(&self) -> &Address {
        &self.account
    }

    pub fn currency(&self) -> MosaicId {
        self.currency
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn gateway(&self) -> &LedgerGateway<N, S> {
        &self.gateway
    }

    /// Starts a snapshot-then-distribute session for holders of `mosaic`.
    pub fn session(&self, mosaic: MosaicId) -> DistributionSession<'_, I, N, S> {
        DistributionSession::new(self, mosaic)
    }

    /// Ranked holders of `mosaic`, never including the distributing account.
    pub async fn create_snapshot(
        &self,
        mosaic: MosaicId,
        minimum: u64,
        mut ignored: Vec<Address>,
    ) -> Result<HoldersSnapshot> {
        ignored.push(self.account.clone());
        let holders = get_holders(&self.index, mosaic, minimum, &ignored).await?;
        info!(
            "snapshot of {} taken: {} holders above {}",
            mosaic,
            holders.len(),
            minimum
        );
        Ok(HoldersSnapshot::new(mosaic, holders))
    }

    /// Splits `total` over `snapshot` and submits one aggregate per batch,
    /// strictly one after another.
    ///
    /// Fails before any submission when `total` is zero or no snapshot is
    /// given. A batch that is rejected or times out is reported with
    /// `success: false` and the run moves on to the next batch.
    pub async fn distribute(
        &self,
        snapshot: Option<&HoldersSnapshot>,
        plan: DistributionPlan,
        total: u64,
    ) -> Result<Vec<TransferReport>> {
        if total == 0 {
            return Err(DistributionError::InvalidInput(
                "total amount must be positive".to_string(),
            ));
        }
        let snapshot = snapshot.ok_or(DistributionError::MissingSnapshot)?;
        let mosaic = plan.resolve(self.currency, snapshot.mosaic());

        let multiplier = fee_multiplier(&self.index).await;
        let fee = if plan.fee_aware {
            multiplier * Decimal::from(MOSAIC_TRANSFER_SIZE)
        } else {
            Decimal::ZERO
        };
        let batches = allocate(snapshot.holders(), total, fee);
        info!(
            "{} of {} {} across {} holders (snapshot {}): {} batches (fee multiplier {}, per-transfer fee {})",
            plan.label(),
            total,
            mosaic,
            snapshot.len(),
            snapshot.taken_at().to_rfc3339(),
            batches.len(),
            multiplier,
            fee
        );

        let mut reports = Vec::with_capacity(batches.len());
        for (idx, batch) in batches.into_iter().enumerate() {
            let set = OperationSet::transfers(mosaic, &batch)?;
            let hash = self.gateway.submit(&set, multiplier).await?;
            match &hash {
                Some(hash) => info!("batch {} ({} transfers) confirmed as {}", idx, batch.len(), hash),
                None => warn!("batch {} ({} transfers) failed", idx, batch.len()),
            }
            reports.push(TransferReport::new(batch, hash));
        }
        Ok(reports)
    }

    /// Sends an explicit beneficiary list as one aggregate.
    pub async fn send_to_beneficiaries(
        &self,
        mosaic: MosaicId,
        beneficiaries: &[Beneficiary],
    ) -> Result<Option<TransactionHash>> {
        if beneficiaries.is_empty() {
            return Err(DistributionError::InvalidInput(
                "beneficiaries list is empty".to_string(),
            ));
        }
        let multiplier = fee_multiplier(&self.index).await;
        Ok(self
            .gateway
            .send_mosaic(mosaic, beneficiaries, multiplier)
            .await?)
    }

    /// Defines a new mosaic owned by the distributing account.
    pub async fn create_mosaic(&self) -> Result<Option<MosaicId>> {
        let multiplier = fee_multiplier(&self.index).await;
        Ok(self.gateway.create_mosaic(multiplier).await?)
    }

    /// Current balances of the distributing account; `None` if the node
    /// cannot be read.
    pub async fn balances(&self, mosaic: MosaicId) -> Option<AccountBalances> {
        match self.gateway.node().account_mosaics(&self.account).await {
            Ok(mosaics) => {
                let amount_of = |id: MosaicId| {
                    mosaics
                        .iter()
                        .find(|m| m.id == id)
                        .map(|m| m.amount)
                        .unwrap_or(0)
                };
                Some(AccountBalances {
                    currency: amount_of(self.currency),
                    mosaic: amount_of(mosaic),
                })
            }
            Err(err) => {
                error!("failed to read balances of {}: {}", self.account, err);
                None
            }
        }
    }
}
