// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Shared domain types, runtime configuration and the confirmation poll policy
//! used across the distribution service.

pub mod config;
pub mod poll;
pub mod types;

pub use crate::config::{AppConfig, Network};
pub use poll::PollPolicy;
pub use types::{
    Address, Beneficiary, Holder, HoldersSnapshot, MosaicId, ParseIdError, TransactionHash,
    TransferReport, MAX_BATCH_SIZE, MINOR_UNITS_PER_WHOLE,
};
