//! Order book snapshots as returned by `/book` and `/books`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use crate::order::TickSize;
use crate::signing::OrderSide;

/// A single price level in the order book.
///
/// Shared by book fetching and market price resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    #[serde(deserialize_with = "decimal_from_str_or_number")]
    pub price: Decimal,
    #[serde(deserialize_with = "decimal_from_str_or_number")]
    pub size: Decimal,
}

impl PriceLevel {
    pub fn new(price: Decimal, size: Decimal) -> Self {
        Self { price, size }
    }

    /// Collateral needed to take the whole level. `None` on overflow.
    pub fn notional(&self) -> Option<Decimal> {
        self.price.checked_mul(self.size)
    }
}

/// Real-time order book for one outcome token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    #[serde(default)]
    pub market: String,
    pub asset_id: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub bids: Vec<PriceLevel>,
    #[serde(default)]
    pub asks: Vec<PriceLevel>,
    #[serde(default)]
    pub min_order_size: Option<String>,
    #[serde(default)]
    pub tick_size: Option<TickSize>,
    #[serde(default)]
    pub neg_risk: Option<bool>,
}

impl OrderBookSnapshot {
    /// Highest bid price, whatever order the levels arrived in.
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.iter().map(|l| l.price).max()
    }

    /// Lowest ask price, whatever order the levels arrived in.
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.iter().map(|l| l.price).min()
    }
}

/// One entry of a batch market-data request (`/books`, `/midpoints`, `/prices`, ...).
///
/// `side` is only read by `/prices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookParams {
    pub token_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<OrderSide>,
}

impl BookParams {
    pub fn new(token_id: impl Into<String>) -> Self {
        Self {
            token_id: token_id.into(),
            side: None,
        }
    }

    pub fn with_side(mut self, side: OrderSide) -> Self {
        self.side = Some(side);
        self
    }
}

/// The API sends decimals as strings ("0.45"), occasionally as bare numbers.
pub(crate) fn decimal_from_str_or_number<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    let raw = match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    };
    Decimal::from_str(raw.trim())
        .or_else(|_| Decimal::from_scientific(raw.trim()))
        .map_err(serde::de::Error::custom)
}
