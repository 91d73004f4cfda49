//! Error types for the CLOB client.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::auth::AuthLevel;
use crate::order::TickSize;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] config::ConfigError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Required key or API credentials are missing for the requested operation.
    #[error("{level} authentication unavailable: {message}")]
    AuthUnavailable {
        level: AuthLevel,
        message: &'static str,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unsupported configuration: {0}")]
    Unsupported(#[from] UnsupportedConfig),

    /// Non-2xx status or a body that does not match the endpoint schema.
    #[error("Upstream error (status {status:?}): {body}")]
    Upstream { status: Option<u16>, body: String },

    /// The order book cannot fill the requested market order.
    #[error("no match: {0}")]
    Liquidity(String),

    #[error("Signing error: {message}")]
    Signing { message: String },
}

/// Order parameters rejected before signing. Each variant carries the offending values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("invalid tick size ({requested}), minimum for the market is {minimum}")]
    TickSizeTooSmall {
        requested: TickSize,
        minimum: TickSize,
    },

    #[error("price ({price}), min: {min} - max: {max}")]
    PriceOutOfRange {
        price: Decimal,
        min: Decimal,
        max: Decimal,
    },

    #[error("invalid user provided fee rate: ({requested}), fee rate for the market must be {market}")]
    FeeRateMismatch { requested: u32, market: u32 },

    #[error("{field} must be positive, got {value}")]
    NonPositiveAmount { field: &'static str, value: Decimal },

    #[error("{field} out of range: {value}")]
    AmountOverflow { field: &'static str, value: Decimal },

    #[error("invalid token id: {0}")]
    InvalidTokenId(String),
}

/// Values that no supported market or network uses.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedConfig {
    #[error("unsupported tick size: {0}")]
    TickSize(String),

    #[error("invalid chain id: {0}")]
    ChainId(u64),

    #[error("unsupported signature type: {0}")]
    SignatureType(u8),
}

impl Error {
    pub(crate) fn upstream(status: Option<u16>, body: impl Into<String>) -> Self {
        Error::Upstream {
            status,
            body: body.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
