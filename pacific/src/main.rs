// Copyright (c) James Kassemi, SC, US. All rights reserved.
mod api;
mod metrics;

use std::{process, sync::Arc, time::Duration};

use api::ApiState;
use config::ConfigError;
use core_types::AppConfig;
use distribution_engine::Distributor;
use holder_index::{IndexError, SqliteAccountIndex};
use ledger_gateway::{GatewayError, HttpLedgerNode, LedgerGateway, RemoteSigner};
use log::{error, info};
use metrics::ApiMetrics;
use thiserror::Error;
use tokio::net::TcpListener;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error("metrics registry: {0}")]
    Metrics(#[from] prometheus::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run().await {
        error!("pacific failed: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = AppConfig::load()?;

    let client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
    let node = HttpLedgerNode::new(client.clone(), &config.node_url)?;
    let signer = RemoteSigner::new(
        client,
        &config.signer_url,
        config.network,
        config.generation_hash.clone(),
    )?;
    let gateway = LedgerGateway::new(node, signer, config.poll_policy());
    let index = SqliteAccountIndex::connect_lazy(&config.database_url)?;
    let distributor = Distributor::new(
        index,
        gateway,
        config.account()?.clone(),
        config.currency()?,
    );

    let metrics = Arc::new(ApiMetrics::new()?);
    let state = Arc::new(ApiState {
        distributor,
        minimum_share: config.minimum_share,
        metrics: metrics.clone(),
    });

    let metrics_listener = TcpListener::bind(&config.metrics_addr).await?;
    tokio::spawn(async move {
        if let Err(err) = metrics.serve(metrics_listener).await {
            error!("metrics server stopped: {}", err);
        }
    });

    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!(
        "pacific listening on {} ({:?}, account {}, currency {}); metrics on {}",
        config.listen_addr,
        config.network,
        state.distributor.account(),
        state.distributor.currency(),
        config.metrics_addr
    );

    tokio::select! {
        served = api::serve(listener, state) => served?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("shutdown requested");
        }
    }
    Ok(())
}
