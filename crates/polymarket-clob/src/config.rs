//! Client configuration.

use alloy_primitives::Address;
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;

use crate::error::UnsupportedConfig;
use crate::signing::{SignatureType, POLYGON_AMOY_CHAIN_ID, POLYGON_CHAIN_ID};
use crate::{Error, Result};

pub const DEFAULT_HOST: &str = "https://clob.polymarket.com";

/// Settings shared by every request the client makes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub chain_id: u64,
    /// How the order maker's funds are held.
    pub signature_type: SignatureType,
    /// Funding address for proxy and Safe wallets; the signer address when `None`.
    pub funder: Option<Address>,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            chain_id: POLYGON_CHAIN_ID,
            signature_type: SignatureType::Eoa,
            funder: None,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, chain_id: u64) -> Self {
        Self {
            host: host.into(),
            chain_id,
            ..Self::default()
        }
    }

    /// Load configuration from `POLY_*` environment variables (and `.env`).
    ///
    /// Unset variables keep their defaults.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let config = Self {
            host: env::var("POLY_HOST").unwrap_or(defaults.host),
            chain_id: parse_var("POLY_CHAIN_ID")?.unwrap_or(defaults.chain_id),
            signature_type: match parse_var::<u8>("POLY_SIGNATURE_TYPE")? {
                Some(raw) => SignatureType::try_from(raw)?,
                None => defaults.signature_type,
            },
            funder: parse_var("POLY_FUNDER")?,
            request_timeout_secs: parse_var("POLY_REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout_secs),
            connect_timeout_secs: parse_var("POLY_CONNECT_TIMEOUT_SECS")?
                .unwrap_or(defaults.connect_timeout_secs),
        };
        config.validate()?;
        Ok(config)
    }

    /// Layer an optional config file (TOML, YAML or JSON by extension) under
    /// `POLY_*` environment overrides.
    #[allow(clippy::result_large_err)]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("POLY").try_parsing(true))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject networks without exchange contracts and unusable settings.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.chain_id, POLYGON_CHAIN_ID | POLYGON_AMOY_CHAIN_ID) {
            return Err(UnsupportedConfig::ChainId(self.chain_id).into());
        }
        if self.host.trim().is_empty() {
            return Err(Error::Config {
                message: "host must not be empty".to_string(),
            });
        }
        if self.request_timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(Error::Config {
                message: "timeouts must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Host without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.host.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[allow(clippy::result_large_err)]
/// Serializes tests that read or write `POLY_*` variables.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map(Some).map_err(|e| Error::Config {
                message: format!("{} is invalid: {}", name, e),
            })
        }
        _ => Ok(None),
    }
}
