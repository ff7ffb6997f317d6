// Copyright (c) James Kassemi, SC, US. All rights reserved.

use crate::poll::PollPolicy;
use crate::types::{Address, MosaicId};
use config::{Config, ConfigError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Network the distributing account lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
}

/// Process-wide settings, loaded once at start-up and passed down explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub node_url: String,
    #[serde(default)]
    pub signer_url: String,
    #[serde(default)]
    pub generation_hash: String,
    #[serde(default)]
    pub network: Network,
    pub account_address: Option<Address>,
    pub currency_mosaic: Option<MosaicId>,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_metrics_addr")]
    pub metrics_addr: String,
    /// Holders must hold strictly more than this many minor units.
    #[serde(default)]
    pub minimum_share: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_poll_max_attempts")]
    pub poll_max_attempts: usize,
}

fn default_database_url() -> String {
    "sqlite://mirror.db".to_string()
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_metrics_addr() -> String {
    "127.0.0.1:9095".to_string()
}

fn default_poll_interval_ms() -> u64 {
    2_500
}

fn default_poll_max_attempts() -> usize {
    25
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(config::File::with_name("pacific.toml").required(false))
            .add_source(config::Environment::with_prefix("PACIFIC"))
            .add_source(config::Environment::default())
            .build()?;
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_url.is_empty() {
            return Err(ConfigError::Message("NODE_URL is required".to_string()));
        }
        if self.signer_url.is_empty() {
            return Err(ConfigError::Message("SIGNER_URL is required".to_string()));
        }
        if self.account_address.is_none() {
            return Err(ConfigError::Message("ACCOUNT_ADDRESS is required".to_string()));
        }
        if self.currency_mosaic.is_none() {
            return Err(ConfigError::Message("CURRENCY_MOSAIC is required".to_string()));
        }
        Ok(())
    }

    /// Distributing account. Only meaningful after [`AppConfig::validate`].
    pub fn account(&self) -> Result<&Address, ConfigError> {
        self.account_address
            .as_ref()
            .ok_or_else(|| ConfigError::Message("ACCOUNT_ADDRESS is required".to_string()))
    }

    pub fn currency(&self) -> Result<MosaicId, ConfigError> {
        self.currency_mosaic
            .ok_or_else(|| ConfigError::Message("CURRENCY_MOSAIC is required".to_string()))
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            self.poll_max_attempts,
            Duration::from_millis(self.poll_interval_ms),
        )
    }
}
