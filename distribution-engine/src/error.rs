// Copyright (c) James Kassemi, SC, US. All rights reserved.
use crate::beneficiaries::BeneficiaryError;
use holder_index::IndexError;
use ledger_gateway::GatewayError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DistributionError>;

#[derive(Debug, Error)]
pub enum DistributionError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("no holders snapshot has been taken")]
    MissingSnapshot,
    #[error("holder index error: {0}")]
    Index(#[from] IndexError),
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("beneficiaries error: {0}")]
    Beneficiaries(#[from] BeneficiaryError),
}
