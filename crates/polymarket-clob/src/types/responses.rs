//! Typed response schemas for the REST endpoints.
//!
//! Endpoints whose payload shape is not stable keep a `serde_json::Value`
//! field so nothing is lost in decoding.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::book::decimal_from_str_or_number;
use crate::auth::ApiCredentials;
use crate::order::{OrderType, TickSize};
use crate::signing::{OrderSide, SignedOrder};

/// Credentials as returned by `/auth/api-key` and `/auth/derive-api-key`.
#[derive(Clone, Deserialize)]
pub struct ApiKeyResponse {
    #[serde(rename = "apiKey")]
    pub api_key: String,
    pub secret: String,
    pub passphrase: String,
}

impl From<ApiKeyResponse> for ApiCredentials {
    fn from(r: ApiKeyResponse) -> Self {
        ApiCredentials::new(r.api_key, r.secret, r.passphrase)
    }
}

/// The derive endpoint answers with either one object or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub(crate) fn into_first(self) -> Option<T> {
        match self {
            OneOrMany::One(item) => Some(item),
            OneOrMany::Many(items) => items.into_iter().next(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeysResponse {
    #[serde(rename = "apiKeys", default)]
    pub api_keys: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClosedOnlyResponse {
    #[serde(default)]
    pub closed_only: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TickSizeResponse {
    pub minimum_tick_size: TickSize,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NegRiskResponse {
    pub neg_risk: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FeeRateResponse {
    #[serde(alias = "baseFee", alias = "fee_rate_bps", default)]
    pub base_fee: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MidpointResponse {
    #[serde(deserialize_with = "decimal_from_str_or_number")]
    pub mid: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceResponse {
    #[serde(deserialize_with = "decimal_from_str_or_number")]
    pub price: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpreadResponse {
    #[serde(deserialize_with = "decimal_from_str_or_number")]
    pub spread: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LastTradePriceResponse {
    /// Only set in `/last-trades-prices` entries.
    #[serde(default)]
    pub token_id: String,
    #[serde(deserialize_with = "decimal_from_str_or_number")]
    pub price: Decimal,
    #[serde(default)]
    pub side: Option<OrderSide>,
}

/// A bare decimal value inside a batch map, e.g. `{"123": "0.45"}`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(transparent)]
pub(crate) struct DecimalValue(#[serde(deserialize_with = "decimal_from_str_or_number")] pub Decimal);

/// Request body for `POST /order`.
#[derive(Debug, Clone, Serialize)]
pub struct PostOrderRequest<'a> {
    pub order: &'a SignedOrder,
    /// API key of the order owner.
    pub owner: &'a str,
    #[serde(rename = "orderType")]
    pub order_type: OrderType,
}

/// Response from posting an order.
#[derive(Debug, Clone, Deserialize)]
pub struct PostOrderResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(rename = "errorMsg", default)]
    pub error_msg: String,
    #[serde(rename = "orderID", default)]
    pub order_id: String,
    /// e.g. "matched", "live", "delayed", "unmatched".
    #[serde(default)]
    pub status: String,
    #[serde(rename = "transactionsHashes", alias = "transactionHash", default)]
    pub transaction_hashes: serde_json::Value,
}

impl PostOrderResponse {
    /// FOK orders that cannot fill come back "unmatched".
    pub fn is_filled(&self) -> bool {
        let s = self.status.to_lowercase();
        s == "matched" || s == "live" || s == "delayed"
    }
}

/// Response from the cancel endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelResponse {
    #[serde(default)]
    pub canceled: Vec<String>,
    /// Order id to reason.
    #[serde(default)]
    pub not_canceled: serde_json::Map<String, serde_json::Value>,
}

/// Open order information.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenOrder {
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub market: String,
    pub asset_id: String,
    pub side: OrderSide,
    #[serde(deserialize_with = "decimal_from_str_or_number")]
    pub price: Decimal,
    #[serde(deserialize_with = "decimal_from_str_or_number")]
    pub original_size: Decimal,
    #[serde(default, deserialize_with = "decimal_from_str_or_number")]
    pub size_matched: Decimal,
    #[serde(default)]
    pub order_type: Option<OrderType>,
    #[serde(default)]
    pub created_at: Option<u64>,
}

/// Paginated `/data/orders` page.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OpenOrdersPage {
    #[serde(default)]
    pub data: Vec<OpenOrder>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}
