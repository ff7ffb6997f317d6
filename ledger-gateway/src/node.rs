// Copyright (c) James Kassemi, SC, US. All rights reserved.

use crate::error::{GatewayError, Result};
use crate::signer::SignedTransaction;
use async_trait::async_trait;
use core_types::{Address, MosaicId, TransactionHash};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

/// Settlement classification reported by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionGroup {
    Unconfirmed,
    Partial,
    Confirmed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl TransactionGroup {
    /// Still waiting on the network; anything else is terminal.
    pub fn is_pending(self) -> bool {
        matches!(self, TransactionGroup::Unconfirmed | TransactionGroup::Partial)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransactionStatus {
    pub group: TransactionGroup,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountMosaic {
    pub id: MosaicId,
    pub amount: u64,
}

/// Remote ledger node capability.
#[async_trait]
pub trait LedgerNode: Send + Sync {
    async fn announce(&self, signed: &SignedTransaction) -> Result<()>;

    /// Errors while the node does not know the hash yet are expected and
    /// retried by the caller.
    async fn transaction_status(&self, hash: &TransactionHash) -> Result<TransactionStatus>;

    async fn account_mosaics(&self, address: &Address) -> Result<Vec<AccountMosaic>>;
}

/// REST client for a ledger node.
#[derive(Clone)]
pub struct HttpLedgerNode {
    client: Client,
    base_url: Url,
}

#[derive(Serialize)]
struct AnnounceBody<'a> {
    payload: &'a str,
}

#[derive(Deserialize)]
struct AccountInfoResponse {
    account: AccountInfo,
}

#[derive(Deserialize)]
struct AccountInfo {
    #[serde(default)]
    mosaics: Vec<RawMosaic>,
}

#[derive(Deserialize)]
struct RawMosaic {
    id: MosaicId,
    amount: String,
}

impl HttpLedgerNode {
    pub fn new(client: Client, node_url: &str) -> Result<Self> {
        Ok(Self {
            client,
            base_url: base_url(node_url)?,
        })
    }

    fn check(path: &str, resp: &reqwest::Response) -> Result<()> {
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(GatewayError::Node {
                status: resp.status().as_u16(),
                path: path.to_string(),
            })
        }
    }
}

#[async_trait]
impl LedgerNode for HttpLedgerNode {
    async fn announce(&self, signed: &SignedTransaction) -> Result<()> {
        let path = "transactions";
        let resp = self
            .client
            .put(self.base_url.join(path)?)
            .json(&AnnounceBody {
                payload: &signed.payload,
            })
            .send()
            .await?;
        Self::check(path, &resp)
    }

    async fn transaction_status(&self, hash: &TransactionHash) -> Result<TransactionStatus> {
        let path = format!("transactionStatus/{}", hash);
        let resp = self.client.get(self.base_url.join(&path)?).send().await?;
        Self::check(&path, &resp)?;
        Ok(resp.json().await?)
    }

    async fn account_mosaics(&self, address: &Address) -> Result<Vec<AccountMosaic>> {
        let path = format!("accounts/{}", address);
        let resp = self.client.get(self.base_url.join(&path)?).send().await?;
        Self::check(&path, &resp)?;
        let parsed: AccountInfoResponse = resp.json().await?;
        parsed
            .account
            .mosaics
            .into_iter()
            .map(|raw| {
                let amount = raw.amount.parse::<u64>().map_err(|_| GatewayError::Node {
                    status: 200,
                    path: format!("{path} (bad amount '{}')", raw.amount),
                })?;
                Ok(AccountMosaic { id: raw.id, amount })
            })
            .collect()
    }
}

/// Parses a service root so relative paths append instead of replacing the
/// last segment.
pub(crate) fn base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
