// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! JSON API. Every routed request answers HTTP 200 with a
//! `{status, message, data?}` envelope; only unknown routes get a 404.

use crate::metrics::ApiMetrics;
use core_types::{Address, MosaicId, TransferReport};
use distribution_engine::{parse_beneficiaries, BeneficiaryError, DistributionPlan, Distributor};
use holder_index::{get_holders, AccountIndex};
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::{Body, Bytes, Incoming};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use ledger_gateway::{LedgerNode, TransactionSigner};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::convert::Infallible;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

/// Request body cap; a full 1000-row beneficiary list is well below it.
const MAX_BODY_BYTES: usize = 256 * 1024;

pub struct ApiState<I, N, S> {
    pub distributor: Distributor<I, N, S>,
    /// Minimum balance a holder needs to be listed or paid.
    pub minimum_share: u64,
    pub metrics: Arc<ApiMetrics>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    CreateMosaic,
    GetBalances,
    GetHolders,
    SendDividend,
    SendMosaic,
    SendStaking,
}

impl Endpoint {
    pub fn from_path(path: &str) -> Option<Self> {
        match path.strip_prefix("/api/")? {
            "createMosaic" => Some(Self::CreateMosaic),
            "getBalances" => Some(Self::GetBalances),
            "getHolders" => Some(Self::GetHolders),
            "sendDividend" => Some(Self::SendDividend),
            "sendMosaic" => Some(Self::SendMosaic),
            "sendStaking" => Some(Self::SendStaking),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::CreateMosaic => "createMosaic",
            Self::GetBalances => "getBalances",
            Self::GetHolders => "getHolders",
            Self::SendDividend => "sendDividend",
            Self::SendMosaic => "sendMosaic",
            Self::SendStaking => "sendStaking",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub status: Status,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    pub fn success(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: Status::Failure,
            message: message.into(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

/// Union of every endpoint's parameters; each handler checks what it needs.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest {
    mosaic_identifier: Option<String>,
    dividend: Option<Value>,
    staking: Option<Value>,
    ignored_holders: Option<String>,
    beneficiaries: Option<String>,
}

/// Handler failures; the display text is the envelope message.
#[derive(Debug, Error)]
enum ApiError {
    #[error("Invalid request body: {0}")]
    Body(String),
    #[error("Missing parameter: {0}.")]
    Missing(&'static str),
    #[error("Parameter {0} must be positive.")]
    NotPositive(&'static str),
    #[error("Invalid parameter {name}: {value}.")]
    Invalid { name: &'static str, value: String },
    #[error("{0}")]
    Beneficiaries(#[from] BeneficiaryError),
    #[error("{0}")]
    Failed(&'static str),
}

pub async fn serve<I, N, S>(
    listener: TcpListener,
    state: Arc<ApiState<I, N, S>>,
) -> std::io::Result<()>
where
    I: AccountIndex + 'static,
    N: LedgerNode + 'static,
    S: TransactionSigner + 'static,
{
    loop {
        let (socket, peer) = listener.accept().await?;
        debug!("api connection from {}", peer);
        let io = TokioIo::new(socket);
        let state = state.clone();
        let service = service_fn(move |req| {
            let state = state.clone();
            async move { handle(&state, req).await }
        });
        tokio::spawn(async move {
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                warn!("error serving api connection: {:?}", err);
            }
        });
    }
}

async fn handle<I, N, S>(
    state: &ApiState<I, N, S>,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    I: AccountIndex,
    N: LedgerNode,
    S: TransactionSigner,
{
    let endpoint = match Endpoint::from_path(req.uri().path()) {
        Some(endpoint) if req.method() == Method::POST => endpoint,
        _ => {
            let message = format!("No route for {} {}.", req.method(), req.uri().path());
            return Ok(respond(StatusCode::NOT_FOUND, &Envelope::failure(message)));
        }
    };
    let envelope = match read_body(req.into_body()).await {
        Ok(body) => dispatch(state, endpoint, &body).await,
        Err(err) => {
            info!("{} rejected: {}", endpoint.name(), err);
            Envelope::failure(err.to_string())
        }
    };
    Ok(respond(StatusCode::OK, &envelope))
}

async fn read_body<B>(body: B) -> Result<Bytes, ApiError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    Limited::new(body, MAX_BODY_BYTES)
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .map_err(|err| ApiError::Body(err.to_string()))
}

fn respond(status: StatusCode, envelope: &Envelope) -> Response<Full<Bytes>> {
    let body = match serde_json::to_vec(envelope) {
        Ok(body) => body,
        Err(err) => {
            error!("failed to encode envelope: {}", err);
            br#"{"status":"failure","message":"Internal error."}"#.to_vec()
        }
    };
    let mut resp = Response::new(Full::new(Bytes::from(body)));
    *resp.status_mut() = status;
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    resp
}

/// Runs one endpoint against a raw JSON body. An empty body counts as `{}`.
pub async fn dispatch<I, N, S>(state: &ApiState<I, N, S>, endpoint: Endpoint, body: &[u8]) -> Envelope
where
    I: AccountIndex,
    N: LedgerNode,
    S: TransactionSigner,
{
    state.metrics.inc_request(endpoint.name());
    let result = match parse_request(body) {
        Ok(req) => match endpoint {
            Endpoint::CreateMosaic => create_mosaic(state).await,
            Endpoint::GetBalances => get_balances(state, &req).await,
            Endpoint::GetHolders => list_holders(state, &req).await,
            Endpoint::SendDividend => distribute(state, &req, DistributionPlan::DIVIDEND).await,
            Endpoint::SendMosaic => send_mosaic(state, &req).await,
            Endpoint::SendStaking => distribute(state, &req, DistributionPlan::STAKING).await,
        },
        Err(err) => Err(err),
    };
    match result {
        Ok(envelope) => envelope,
        Err(err) => {
            info!("{} failed: {}", endpoint.name(), err);
            Envelope::failure(err.to_string())
        }
    }
}

fn parse_request(body: &[u8]) -> Result<ApiRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ApiRequest::default());
    }
    serde_json::from_slice(body).map_err(|err| ApiError::Body(err.to_string()))
}

fn mosaic_param(req: &ApiRequest) -> Result<MosaicId, ApiError> {
    let raw = req
        .mosaic_identifier
        .as_deref()
        .ok_or(ApiError::Missing("mosaicIdentifier"))?;
    MosaicId::from_str(raw).map_err(|_| ApiError::Invalid {
        name: "mosaicIdentifier",
        value: raw.to_string(),
    })
}

/// Amounts arrive as JSON integers or digit strings, in minor units.
fn amount_param(name: &'static str, value: Option<&Value>) -> Result<u64, ApiError> {
    let value = value.ok_or(ApiError::Missing(name))?;
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    match parsed {
        Some(0) => Err(ApiError::NotPositive(name)),
        Some(amount) => Ok(amount),
        None => Err(ApiError::Invalid {
            name,
            value: value.to_string(),
        }),
    }
}

/// Comma-separated addresses; blank entries are ignored.
fn ignored_holders(raw: Option<&str>) -> Result<Vec<Address>, ApiError> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            Address::from_str(entry).map_err(|_| ApiError::Invalid {
                name: "ignoredHolders",
                value: entry.to_string(),
            })
        })
        .collect()
}

fn to_data<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|err| {
        error!("failed to encode response data: {}", err);
        ApiError::Failed("Failed to encode response.")
    })
}

async fn create_mosaic<I, N, S>(state: &ApiState<I, N, S>) -> Result<Envelope, ApiError>
where
    I: AccountIndex,
    N: LedgerNode,
    S: TransactionSigner,
{
    match state.distributor.create_mosaic().await {
        Ok(Some(mosaic)) => {
            state.metrics.record_operation_set(true);
            Ok(Envelope::success(
                "Mosaic created.",
                Some(json!({ "mosaicIdentifier": mosaic })),
            ))
        }
        Ok(None) => {
            state.metrics.record_operation_set(false);
            Err(ApiError::Failed("Failed to create mosaic."))
        }
        Err(err) => {
            error!("mosaic creation failed: {}", err);
            Err(ApiError::Failed("Failed to create mosaic."))
        }
    }
}

async fn get_balances<I, N, S>(
    state: &ApiState<I, N, S>,
    req: &ApiRequest,
) -> Result<Envelope, ApiError>
where
    I: AccountIndex,
    N: LedgerNode,
    S: TransactionSigner,
{
    let mosaic = mosaic_param(req)?;
    let data = match state.distributor.balances(mosaic).await {
        Some(balances) => json!({
            "currency": balances.currency.to_string(),
            "mosaic": balances.mosaic.to_string(),
        }),
        None => json!({}),
    };
    Ok(Envelope::success("Balances retrieved.", Some(data)))
}

async fn list_holders<I, N, S>(
    state: &ApiState<I, N, S>,
    req: &ApiRequest,
) -> Result<Envelope, ApiError>
where
    I: AccountIndex,
    N: LedgerNode,
    S: TransactionSigner,
{
    let mosaic = mosaic_param(req)?;
    let holders = get_holders(state.distributor.index(), mosaic, state.minimum_share, &[])
        .await
        .map_err(|err| {
            error!("holders of {} unavailable: {}", mosaic, err);
            ApiError::Failed("Failed to retrieve holders list.")
        })?;
    if holders.is_empty() {
        return Err(ApiError::Failed("Empty holders list."));
    }
    Ok(Envelope::success("Holders retrieved.", Some(to_data(&holders)?)))
}

async fn distribute<I, N, S>(
    state: &ApiState<I, N, S>,
    req: &ApiRequest,
    plan: DistributionPlan,
) -> Result<Envelope, ApiError>
where
    I: AccountIndex,
    N: LedgerNode,
    S: TransactionSigner,
{
    let mosaic = mosaic_param(req)?;
    let amount = if plan == DistributionPlan::DIVIDEND {
        amount_param("dividend", req.dividend.as_ref())?
    } else {
        amount_param("staking", req.staking.as_ref())?
    };
    let ignored = ignored_holders(req.ignored_holders.as_deref())?;

    let mut session = state.distributor.session(mosaic);
    let empty = session
        .create_snapshot(state.minimum_share, ignored)
        .await
        .map_err(|err| {
            error!("snapshot of {} failed: {}", mosaic, err);
            ApiError::Failed("Failed to retrieve holders snapshot.")
        })?
        .is_empty();
    if empty {
        return Err(ApiError::Failed("No applicable holders found."));
    }

    let reports = session.distribute(plan, amount).await.map_err(|err| {
        error!("{} of {} failed: {}", plan.label(), mosaic, err);
        ApiError::Failed("Distribution failed.")
    })?;
    state.metrics.inc_distribution(plan.label());
    for report in &reports {
        state.metrics.record_operation_set(report.success);
    }
    Ok(Envelope::success(
        "Distribution completed.",
        Some(json!({
            "success": all_succeeded(&reports),
            "reports": to_data(&reports)?,
        })),
    ))
}

fn all_succeeded(reports: &[TransferReport]) -> bool {
    reports.iter().all(|report| report.success)
}

async fn send_mosaic<I, N, S>(
    state: &ApiState<I, N, S>,
    req: &ApiRequest,
) -> Result<Envelope, ApiError>
where
    I: AccountIndex,
    N: LedgerNode,
    S: TransactionSigner,
{
    let mosaic = mosaic_param(req)?;
    let text = req
        .beneficiaries
        .as_deref()
        .ok_or(ApiError::Missing("beneficiaries"))?;
    let beneficiaries = parse_beneficiaries(text).await?;

    let hash = state
        .distributor
        .send_to_beneficiaries(mosaic, &beneficiaries)
        .await
        .map_err(|err| {
            error!("transfer of {} failed: {}", mosaic, err);
            ApiError::Failed("Failed to send tokens.")
        })?;
    state.metrics.record_operation_set(hash.is_some());
    match hash {
        Some(hash) => Ok(Envelope::success(
            "Tokens sent.",
            Some(json!({ "transaction": hash, "beneficiaries": beneficiaries.len() })),
        )),
        None => Err(ApiError::Failed("Failed to send tokens.")),
    }
}
