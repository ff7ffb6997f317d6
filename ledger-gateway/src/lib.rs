// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Ledger gateway: sizes, signs and announces aggregate operation sets, then
//! polls the node until the set is confirmed, rejected or the poll budget
//! runs out.
//!
//! - [`LedgerGateway`]: submit/poll/confirm driver.
//! - [`OperationSet`]: validated aggregate plus fee sizing.
//! - [`LedgerNode`] / [`HttpLedgerNode`]: node REST capability.
//! - [`TransactionSigner`] / [`RemoteSigner`]: opaque signing seam.

pub mod error;
pub mod gateway;
pub mod node;
pub mod operation;
pub mod signer;

pub use error::{GatewayError, Result};
pub use gateway::{Confirmation, LedgerGateway};
pub use node::{AccountMosaic, HttpLedgerNode, LedgerNode, TransactionGroup, TransactionStatus};
pub use operation::{
    max_fee_for_size, MosaicFlags, Operation, OperationSet, FEE_SAFETY_FACTOR,
    MOSAIC_CREATION_SIZE, MOSAIC_TRANSFER_SIZE,
};
pub use signer::{RemoteSigner, SignedTransaction, SigningRequest, TransactionSigner};
