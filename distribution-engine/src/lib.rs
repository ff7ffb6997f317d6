// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Holder distributions: snapshot qualifying holders of a mosaic, split an
//! amount by share, and pay it out in sequential aggregate batches.
//!
//! - [`Distributor`]: snapshots, distribution runs, ad-hoc transfers.
//! - [`DistributionSession`]: snapshot-then-distribute workflow.
//! - [`allocate`]: share/fee/dust math and batching.
//! - [`parse_beneficiaries`]: CSV beneficiary lists.

pub mod allocation;
pub mod beneficiaries;
pub mod engine;
pub mod error;
pub mod plan;
pub mod session;

#[cfg(test)]
mod testing;

pub use allocation::allocate;
pub use beneficiaries::{parse_beneficiaries, BeneficiaryError};
pub use engine::{AccountBalances, Distributor};
pub use error::{DistributionError, Result};
pub use plan::{AssetSelector, DistributionPlan};
pub use session::DistributionSession;
