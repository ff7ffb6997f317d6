// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Signing seam. Key material never enters this service: operation sets are
//! handed to a signing service that owns the distributing account's key.

use crate::error::{GatewayError, Result};
use crate::node::base_url;
use crate::operation::Operation;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_types::{MosaicId, Network, TransactionHash};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

/// Everything needed to produce one signed aggregate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningRequest<'a> {
    pub operations: &'a [Operation],
    pub max_fee: u64,
    pub deadline: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignedTransaction {
    pub hash: TransactionHash,
    pub payload: String,
}

#[async_trait]
pub trait TransactionSigner: Send + Sync {
    async fn sign(&self, request: &SigningRequest<'_>) -> Result<SignedTransaction>;

    /// Identifier of a mosaic defined by the signing account with `nonce`.
    async fn mosaic_id_for_nonce(&self, nonce: u32) -> Result<MosaicId>;
}

/// [`TransactionSigner`] backed by an HTTP signing service.
#[derive(Clone)]
pub struct RemoteSigner {
    client: Client,
    base_url: Url,
    network: Network,
    generation_hash: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignBody<'a> {
    #[serde(flatten)]
    request: &'a SigningRequest<'a>,
    network: Network,
    generation_hash: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MosaicIdBody {
    nonce: u32,
}

#[derive(Deserialize)]
struct MosaicIdResponse {
    id: MosaicId,
}

impl RemoteSigner {
    pub fn new(
        client: Client,
        raw_url: &str,
        network: Network,
        generation_hash: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            client,
            base_url: base_url(raw_url)?,
            network,
            generation_hash: generation_hash.into(),
        })
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized + Sync,
        R: for<'de> Deserialize<'de>,
    {
        let url = self.base_url.join(path)?;
        let resp = self.client.post(url).json(body).send().await?;
        if !resp.status().is_success() {
            return Err(GatewayError::Signer(format!(
                "{} answered HTTP {}",
                path,
                resp.status().as_u16()
            )));
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl TransactionSigner for RemoteSigner {
    async fn sign(&self, request: &SigningRequest<'_>) -> Result<SignedTransaction> {
        let body = SignBody {
            request,
            network: self.network,
            generation_hash: &self.generation_hash,
        };
        self.post("sign", &body).await
    }

    async fn mosaic_id_for_nonce(&self, nonce: u32) -> Result<MosaicId> {
        let resp: MosaicIdResponse = self.post("mosaic-id", &MosaicIdBody { nonce }).await?;
        Ok(resp.id)
    }
}
