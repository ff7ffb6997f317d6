// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! In-memory fakes for the index, node and signer seams.

use crate::engine::Distributor;
use async_trait::async_trait;
use core_types::{Address, Holder, MosaicId, PollPolicy, TransactionHash};
use holder_index::{AccountBalance, AccountIndex, IndexError};
use ledger_gateway::{
    AccountMosaic, LedgerGateway, LedgerNode, Operation, SignedTransaction, SigningRequest,
    TransactionGroup, TransactionSigner, TransactionStatus,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const SELF: &str = "TSELF";
pub const CURRENCY: MosaicId = MosaicId::new(0x6BED_913F_A202_23F8);
pub const TRACKED: MosaicId = MosaicId::new(0x1234_5678_9ABC_DEF0);

pub type TestDistributor = Distributor<FakeIndex, FakeNode, FakeSigner>;

pub fn distributor(index: FakeIndex, node: FakeNode) -> TestDistributor {
    let gateway = LedgerGateway::new(node, FakeSigner::default(), PollPolicy::ledger_confirmation());
    Distributor::new(index, gateway, address(SELF), CURRENCY)
}

pub fn address(raw: &str) -> Address {
    Address::from_str(raw).unwrap()
}

pub fn holder(raw: &str, share: Decimal) -> Holder {
    Holder {
        address: address(raw),
        balance: 0,
        share,
    }
}

#[derive(Default)]
pub struct FakeIndex {
    pub balances: Vec<AccountBalance>,
    pub multipliers: Option<Vec<u64>>,
    pub down: bool,
    pub(crate) fee_reads: AtomicUsize,
}

impl FakeIndex {
    pub fn fee_reads(&self) -> usize {
        self.fee_reads.load(Ordering::SeqCst)
    }

    pub fn with_balances(rows: &[(&str, u64)]) -> Self {
        Self {
            balances: rows
                .iter()
                .map(|(raw, amount)| AccountBalance {
                    address: address(raw),
                    amount: *amount,
                })
                .collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl AccountIndex for FakeIndex {
    async fn balances_above(
        &self,
        _: MosaicId,
        minimum: u64,
    ) -> holder_index::Result<Vec<AccountBalance>> {
        if self.down {
            return Err(IndexError::Unavailable(sqlx::Error::PoolTimedOut));
        }
        let mut rows: Vec<AccountBalance> = self
            .balances
            .iter()
            .filter(|b| b.amount > minimum)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.amount.cmp(&a.amount));
        Ok(rows)
    }

    async fn recent_fee_multipliers(&self, _: usize) -> holder_index::Result<Vec<u64>> {
        self.fee_reads.fetch_add(1, Ordering::SeqCst);
        if self.down {
            return Err(IndexError::Unavailable(sqlx::Error::PoolTimedOut));
        }
        Ok(self.multipliers.clone().unwrap_or_default())
    }
}

/// Settles the n-th announced aggregate according to `outcomes[n]`:
/// `Some(true)` confirms, `Some(false)` fails, `None` never settles.
/// Aggregates beyond the script confirm.
#[derive(Default)]
pub struct FakeNode {
    outcomes: Vec<Option<bool>>,
    announced: Mutex<Vec<TransactionHash>>,
    polls: AtomicUsize,
    mosaics: Vec<AccountMosaic>,
}

impl FakeNode {
    pub fn confirming() -> Self {
        Self::default()
    }

    pub fn scripted(outcomes: Vec<Option<bool>>) -> Self {
        Self {
            outcomes,
            ..Self::default()
        }
    }

    pub fn with_mosaics(mut self, mosaics: Vec<(MosaicId, u64)>) -> Self {
        self.mosaics = mosaics
            .into_iter()
            .map(|(id, amount)| AccountMosaic { id, amount })
            .collect();
        self
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerNode for FakeNode {
    async fn announce(&self, signed: &SignedTransaction) -> ledger_gateway::Result<()> {
        self.announced.lock().unwrap().push(signed.hash.clone());
        Ok(())
    }

    async fn transaction_status(
        &self,
        hash: &TransactionHash,
    ) -> ledger_gateway::Result<TransactionStatus> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let position = self
            .announced
            .lock()
            .unwrap()
            .iter()
            .position(|h| h == hash)
            .unwrap();
        let group = match self.outcomes.get(position).copied().unwrap_or(Some(true)) {
            Some(true) => TransactionGroup::Confirmed,
            Some(false) => TransactionGroup::Failed,
            None => TransactionGroup::Unconfirmed,
        };
        Ok(TransactionStatus { group, code: None })
    }

    async fn account_mosaics(&self, _: &Address) -> ledger_gateway::Result<Vec<AccountMosaic>> {
        Ok(self.mosaics.clone())
    }
}

/// Hands out sequential hashes and records what it signed.
#[derive(Default)]
pub struct FakeSigner {
    signed: Mutex<Vec<Vec<Operation>>>,
}

impl FakeSigner {
    pub fn signed(&self) -> Vec<Vec<Operation>> {
        self.signed.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionSigner for FakeSigner {
    async fn sign(&self, request: &SigningRequest<'_>) -> ledger_gateway::Result<SignedTransaction> {
        let mut signed = self.signed.lock().unwrap();
        signed.push(request.operations.to_vec());
        Ok(SignedTransaction {
            hash: TransactionHash::new(format!("{:064X}", signed.len())),
            payload: String::new(),
        })
    }

    async fn mosaic_id_for_nonce(&self, nonce: u32) -> ledger_gateway::Result<MosaicId> {
        Ok(MosaicId::new(u64::from(nonce)))
    }
}
