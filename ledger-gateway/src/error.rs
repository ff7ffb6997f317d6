// Copyright (c) James Kassemi, SC, US. All rights reserved.
use core_types::Address;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("operation set is empty")]
    EmptyOperationSet,
    #[error("operation set holds {count} operations, limit is {limit}")]
    TooManyOperations { count: usize, limit: usize },
    #[error("transfer to {0} has a zero amount")]
    ZeroAmount(Address),
    #[error("signer error: {0}")]
    Signer(String),
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("node answered HTTP {status} for {path}")]
    Node { status: u16, path: String },
}
