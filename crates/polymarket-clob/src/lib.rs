//! Polymarket CLOB Client
//!
//! Order construction, EIP-712 signing and request authentication for the
//! Polymarket central limit order book.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod order;
pub mod signing;
pub mod types;

pub use api::{ClobClient, HttpRequest, OpenOrderParams, ReqwestTransport, ResponseBody, Transport};
pub use auth::{ApiCredentials, AuthLevel};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use order::{CreateOrderOptions, MarketOrderArgs, OrderArgs, OrderType, TickSize};
pub use signing::{OrderSide, SignatureType, SignedOrder, Signer};
