//! Order construction.
//!
//! ```text
//! OrderArgs / MarketOrderArgs
//!   │   tick size, neg-risk, fee rate resolved by the client
//!   │   market price resolved from the book when not supplied
//!   ▼
//! OrderBuilder ── validate_price ── get_*_amounts(RoundConfig) ── OrderData
//!   │
//!   └── contract_config(chain, neg_risk) ── Signer::sign_order ──► SignedOrder
//! ```

pub mod amounts;
pub mod args;
pub mod builder;
pub mod market_price;
pub mod rounding;

pub use amounts::{get_market_order_amounts, get_order_amounts, OrderAmounts};
pub use args::{CreateOrderOptions, MarketOrderArgs, OrderArgs, OrderType};
pub use builder::{
    price_valid, resolve_fee_rate, resolve_tick_size, validate_price, MarketParams, OrderBuilder,
};
pub use market_price::{calculate_market_price, FillTarget};
pub use rounding::{
    decimal_places, round_down, round_normal, round_up, to_token_decimals, RoundConfig, TickSize,
    TOKEN_DECIMALS,
};
