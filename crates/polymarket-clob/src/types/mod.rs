//! Wire types shared across the client.

mod book;
mod responses;

pub use book::{BookParams, OrderBookSnapshot, PriceLevel};
pub(crate) use responses::{
    DecimalValue, FeeRateResponse, NegRiskResponse, OneOrMany, OpenOrdersPage, TickSizeResponse,
};
pub use responses::{
    ApiKeyResponse, ApiKeysResponse, CancelResponse, ClosedOnlyResponse,
    LastTradePriceResponse, MidpointResponse, OpenOrder, PostOrderRequest, PostOrderResponse,
    PriceResponse, SpreadResponse,
};
