// Copyright (c) James Kassemi, SC, US. All rights reserved.

use crate::error::Result;
use crate::node::{LedgerNode, TransactionGroup};
use crate::operation::OperationSet;
use crate::signer::{SigningRequest, TransactionSigner};
use chrono::Utc;
use core_types::{Beneficiary, MosaicId, PollPolicy, TransactionHash};
use log::{debug, error, info, warn};
use rand::Rng;
use rust_decimal::Decimal;

/// Divisibility of mosaics created by this service.
pub const MOSAIC_DIVISIBILITY: u8 = 6;

/// Initial supply of mosaics created by this service, in minor units.
pub const MOSAIC_INITIAL_SUPPLY: u64 = 1_000_000_000_000_000;

/// How long an announced aggregate stays valid.
const DEADLINE_HOURS: i64 = 2;

/// Terminal outcome of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed(TransactionHash),
    Rejected {
        hash: TransactionHash,
        group: TransactionGroup,
        code: Option<String>,
    },
    /// No terminal classification within the poll budget.
    TimedOut(TransactionHash),
    /// Signing or announcing failed; nothing is known to have reached the
    /// network.
    NotAnnounced,
}

impl Confirmation {
    /// The hash on success; every failure collapses to `None`.
    pub fn into_hash(self) -> Option<TransactionHash> {
        match self {
            Confirmation::Confirmed(hash) => Some(hash),
            _ => None,
        }
    }
}

/// Signs, announces and confirms aggregate operation sets.
pub struct LedgerGateway<N, S> {
    node: N,
    signer: S,
    poll: PollPolicy,
}

impl<N, S> LedgerGateway<N, S>
where
    N: LedgerNode,
    S: TransactionSigner,
{
    pub fn new(node: N, signer: S, poll: PollPolicy) -> Self {
        Self { node, signer, poll }
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn signer(&self) -> &S {
        &self.signer
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.poll
    }

    /// Submits `set` and waits for its settlement.
    ///
    /// `Ok(None)` covers rejection, timeout and network failure alike.
    pub async fn submit(
        &self,
        set: &OperationSet,
        fee_multiplier: Decimal,
    ) -> Result<Option<TransactionHash>> {
        Ok(self.submit_with_outcome(set, fee_multiplier).await?.into_hash())
    }

    /// Like [`LedgerGateway::submit`] but keeps the reason for failure.
    pub async fn submit_with_outcome(
        &self,
        set: &OperationSet,
        fee_multiplier: Decimal,
    ) -> Result<Confirmation> {
        let max_fee = set.max_fee(fee_multiplier);
        let request = SigningRequest {
            operations: set.operations(),
            max_fee,
            deadline: Utc::now() + chrono::Duration::hours(DEADLINE_HOURS),
        };
        let signed = match self.signer.sign(&request).await {
            Ok(signed) => signed,
            Err(err) => {
                error!("failed to sign aggregate of {} operations: {}", set.len(), err);
                return Ok(Confirmation::NotAnnounced);
            }
        };
        if let Err(err) = self.node.announce(&signed).await {
            error!("failed to announce {}: {}", signed.hash, err);
            return Ok(Confirmation::NotAnnounced);
        }
        info!(
            "announced {} ({} operations, max fee {})",
            signed.hash,
            set.len(),
            max_fee
        );
        Ok(self.await_confirmation(signed.hash).await)
    }

    async fn await_confirmation(&self, hash: TransactionHash) -> Confirmation {
        let node = &self.node;
        let hash_ref = &hash;
        let outcome = self
            .poll
            .poll_until(|attempt| async move {
                match node.transaction_status(hash_ref).await {
                    Ok(status) if status.group.is_pending() => {
                        debug!("{} still {:?} (attempt {})", hash_ref, status.group, attempt);
                        None
                    }
                    Ok(status) => Some(status),
                    Err(err) => {
                        debug!("status poll for {} failed (attempt {}): {}", hash_ref, attempt, err);
                        None
                    }
                }
            })
            .await;

        match outcome {
            Some(status) if status.group == TransactionGroup::Confirmed => {
                info!("{} confirmed", hash);
                Confirmation::Confirmed(hash)
            }
            Some(status) => {
                warn!(
                    "{} rejected: {:?} ({})",
                    hash,
                    status.group,
                    status.code.as_deref().unwrap_or("no code")
                );
                Confirmation::Rejected {
                    hash,
                    group: status.group,
                    code: status.code,
                }
            }
            None => {
                warn!(
                    "{} not settled after {} attempts",
                    hash, self.poll.max_attempts
                );
                Confirmation::TimedOut(hash)
            }
        }
    }

    /// Transfers `mosaic` to every beneficiary in one aggregate.
    pub async fn send_mosaic(
        &self,
        mosaic: MosaicId,
        beneficiaries: &[Beneficiary],
        fee_multiplier: Decimal,
    ) -> Result<Option<TransactionHash>> {
        let set = OperationSet::transfers(mosaic, beneficiaries)?;
        self.submit(&set, fee_multiplier).await
    }

    /// Defines a new mosaic owned by the signing account and mints its
    /// initial supply. Returns the new identifier once confirmed.
    pub async fn create_mosaic(&self, fee_multiplier: Decimal) -> Result<Option<MosaicId>> {
        let nonce: u32 = rand::thread_rng().gen();
        let mosaic = match self.signer.mosaic_id_for_nonce(nonce).await {
            Ok(mosaic) => mosaic,
            Err(err) => {
                error!("failed to derive mosaic id for nonce {}: {}", nonce, err);
                return Ok(None);
            }
        };
        let set = OperationSet::mosaic_definition(
            nonce,
            mosaic,
            MOSAIC_DIVISIBILITY,
            MOSAIC_INITIAL_SUPPLY,
        );
        Ok(self
            .submit(&set, fee_multiplier)
            .await?
            .map(|_| mosaic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::node::{AccountMosaic, TransactionStatus};
    use crate::operation::Operation;
    use crate::signer::SignedTransaction;
    use async_trait::async_trait;
    use core_types::Address;
    use std::collections::VecDeque;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Replays a script of poll answers; once exhausted, keeps reporting
    /// `unconfirmed`.
    #[derive(Default)]
    struct ScriptedNode {
        script: Mutex<VecDeque<Result<TransactionGroup>>>,
        announced: Mutex<Vec<String>>,
        polls: AtomicUsize,
        announce_fails: bool,
    }

    impl ScriptedNode {
        fn with(script: Vec<Result<TransactionGroup>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl LedgerNode for ScriptedNode {
        async fn announce(&self, signed: &SignedTransaction) -> Result<()> {
            if self.announce_fails {
                return Err(GatewayError::Node {
                    status: 503,
                    path: "transactions".into(),
                });
            }
            self.announced.lock().unwrap().push(signed.payload.clone());
            Ok(())
        }

        async fn transaction_status(&self, _: &TransactionHash) -> Result<TransactionStatus> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(TransactionGroup::Unconfirmed));
            next.map(|group| TransactionStatus {
                group,
                code: Some("Failure_Core_Insufficient_Balance".into()),
            })
        }

        async fn account_mosaics(&self, _: &Address) -> Result<Vec<AccountMosaic>> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct RecordingSigner {
        max_fees: Mutex<Vec<u64>>,
        operations: Mutex<Vec<Vec<Operation>>>,
    }

    #[async_trait]
    impl TransactionSigner for RecordingSigner {
        async fn sign(&self, request: &SigningRequest<'_>) -> Result<SignedTransaction> {
            self.max_fees.lock().unwrap().push(request.max_fee);
            self.operations
                .lock()
                .unwrap()
                .push(request.operations.to_vec());
            Ok(SignedTransaction {
                hash: TransactionHash::new("c0ffee"),
                payload: "00AA".into(),
            })
        }

        async fn mosaic_id_for_nonce(&self, nonce: u32) -> Result<MosaicId> {
            Ok(MosaicId::new(u64::from(nonce) | 0x4000_0000_0000_0000))
        }
    }

    fn policy() -> PollPolicy {
        PollPolicy::ledger_confirmation()
    }

    fn transfer_set() -> OperationSet {
        OperationSet::transfers(
            MosaicId::new(1),
            &[Beneficiary {
                address: Address::from_str("TA").unwrap(),
                amount: 10,
            }],
        )
        .unwrap()
    }

    fn not_found() -> Result<TransactionGroup> {
        Err(GatewayError::Node {
            status: 404,
            path: "transactionStatus/C0FFEE".into(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn confirmed_on_third_poll() {
        let node = ScriptedNode::with(vec![
            not_found(),
            Ok(TransactionGroup::Unconfirmed),
            Ok(TransactionGroup::Confirmed),
        ]);
        let gateway = LedgerGateway::new(node, RecordingSigner::default(), policy());
        let start = Instant::now();

        let hash = gateway.submit(&transfer_set(), Decimal::ONE).await.unwrap();

        assert_eq!(hash, Some(TransactionHash::new("C0FFEE")));
        assert_eq!(gateway.node.polls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_millis(7_500));
        assert_eq!(gateway.node.announced.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_twenty_five_attempts() {
        let gateway = LedgerGateway::new(
            ScriptedNode::default(),
            RecordingSigner::default(),
            policy(),
        );
        let start = Instant::now();

        let outcome = gateway
            .submit_with_outcome(&transfer_set(), Decimal::ONE)
            .await
            .unwrap();

        assert_eq!(outcome, Confirmation::TimedOut(TransactionHash::new("C0FFEE")));
        assert_eq!(gateway.node.polls.load(Ordering::SeqCst), 25);
        assert_eq!(start.elapsed(), Duration::from_millis(62_500));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_group_is_terminal_rejection() {
        let node = ScriptedNode::with(vec![Ok(TransactionGroup::Failed)]);
        let gateway = LedgerGateway::new(node, RecordingSigner::default(), policy());

        let outcome = gateway
            .submit_with_outcome(&transfer_set(), Decimal::ONE)
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            Confirmation::Rejected { group: TransactionGroup::Failed, .. }
        ));
        assert_eq!(gateway.node.polls.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.into_hash(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_errors_are_swallowed_until_budget() {
        let node = ScriptedNode::with((0..30).map(|_| not_found()).collect());
        let gateway = LedgerGateway::new(node, RecordingSigner::default(), policy());

        let hash = gateway.submit(&transfer_set(), Decimal::ONE).await.unwrap();

        assert_eq!(hash, None);
        assert_eq!(gateway.node.polls.load(Ordering::SeqCst), 25);
    }

    #[tokio::test(start_paused = true)]
    async fn announce_failure_skips_polling() {
        let node = ScriptedNode {
            announce_fails: true,
            ..ScriptedNode::default()
        };
        let gateway = LedgerGateway::new(node, RecordingSigner::default(), policy());

        let outcome = gateway
            .submit_with_outcome(&transfer_set(), Decimal::ONE)
            .await
            .unwrap();

        assert_eq!(outcome, Confirmation::NotAnnounced);
        assert_eq!(gateway.node.polls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn max_fee_tracks_multiplier() {
        let node = ScriptedNode::with(vec![Ok(TransactionGroup::Confirmed)]);
        let gateway = LedgerGateway::new(node, RecordingSigner::default(), policy());

        gateway
            .send_mosaic(
                MosaicId::new(5),
                &[
                    Beneficiary {
                        address: Address::from_str("TA").unwrap(),
                        amount: 1,
                    },
                    Beneficiary {
                        address: Address::from_str("TB").unwrap(),
                        amount: 2,
                    },
                ],
                Decimal::from(10),
            )
            .await
            .unwrap();

        // 2 * 177 * 10 * 1.2
        assert_eq!(*gateway.signer.max_fees.lock().unwrap(), vec![4_248]);
    }

    #[tokio::test]
    async fn send_mosaic_rejects_empty_list_before_signing() {
        let gateway = LedgerGateway::new(
            ScriptedNode::default(),
            RecordingSigner::default(),
            policy(),
        );
        let err = gateway
            .send_mosaic(MosaicId::new(5), &[], Decimal::ONE)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::EmptyOperationSet));
        assert!(gateway.signer.max_fees.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn create_mosaic_returns_derived_id() {
        let node = ScriptedNode::with(vec![Ok(TransactionGroup::Confirmed)]);
        let gateway = LedgerGateway::new(node, RecordingSigner::default(), policy());

        let mosaic = gateway.create_mosaic(Decimal::ONE).await.unwrap().unwrap();

        let ops = gateway.signer.operations.lock().unwrap();
        assert_eq!(ops.len(), 1);
        match &ops[0][..] {
            [Operation::MosaicDefinition {
                mosaic: defined,
                divisibility,
                ..
            }, Operation::MosaicSupplyChange { delta, increase, .. }] => {
                assert_eq!(*defined, mosaic);
                assert_eq!(*divisibility, MOSAIC_DIVISIBILITY);
                assert_eq!(*delta, MOSAIC_INITIAL_SUPPLY);
                assert!(*increase);
            }
            other => panic!("unexpected operations: {other:?}"),
        }
        assert_eq!(*gateway.signer.max_fees.lock().unwrap(), vec![375]);
    }
}
