//! Caller-facing order intents.

use alloy_primitives::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::rounding::TickSize;
use crate::signing::OrderSide;

/// Time-in-force for submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Good-till-cancelled.
    #[default]
    Gtc,
    /// Fill-or-kill: the whole size fills immediately or nothing does.
    Fok,
    /// Good-till-date.
    Gtd,
    /// Fill-and-kill: fill what is available immediately, cancel the rest.
    Fak,
}

impl OrderType {
    /// Whether the market price must be achievable for the full target.
    pub fn requires_full_fill(&self) -> bool {
        matches!(self, OrderType::Fok)
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderType::Gtc => "GTC",
            OrderType::Fok => "FOK",
            OrderType::Gtd => "GTD",
            OrderType::Fak => "FAK",
        };
        f.write_str(s)
    }
}

/// A limit order: buy or sell `size` shares at `price`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderArgs {
    pub token_id: String,
    pub price: Decimal,
    pub size: Decimal,
    pub side: OrderSide,
    /// Zero means "use the market's fee rate".
    pub fee_rate_bps: u32,
    pub nonce: u64,
    /// Unix seconds; zero for no expiry.
    pub expiration: u64,
    /// `None` lets any counterparty fill.
    pub taker: Option<Address>,
}

impl OrderArgs {
    pub fn new(token_id: impl Into<String>, price: Decimal, size: Decimal, side: OrderSide) -> Self {
        Self {
            token_id: token_id.into(),
            price,
            size,
            side,
            fee_rate_bps: 0,
            nonce: 0,
            expiration: 0,
            taker: None,
        }
    }
}

/// A market order for a notional `amount`.
///
/// For BUY, `amount` is collateral to spend; for SELL it is shares to sell.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketOrderArgs {
    pub token_id: String,
    pub amount: Decimal,
    pub side: OrderSide,
    /// Worst acceptable price. Resolved from the order book when `None`.
    pub price: Option<Decimal>,
    /// Zero means "use the market's fee rate".
    pub fee_rate_bps: u32,
    pub nonce: u64,
    pub taker: Option<Address>,
    pub order_type: OrderType,
}

impl MarketOrderArgs {
    pub fn new(token_id: impl Into<String>, amount: Decimal, side: OrderSide) -> Self {
        Self {
            token_id: token_id.into(),
            amount,
            side,
            price: None,
            fee_rate_bps: 0,
            nonce: 0,
            taker: None,
            order_type: OrderType::Fok,
        }
    }
}

/// Per-order overrides of cached market metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateOrderOptions {
    pub tick_size: Option<TickSize>,
    pub neg_risk: Option<bool>,
}
