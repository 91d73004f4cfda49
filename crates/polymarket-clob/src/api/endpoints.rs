//! REST paths, relative to the CLOB host.

pub const OK: &str = "/";
pub const TIME: &str = "/time";

pub const CREATE_API_KEY: &str = "/auth/api-key";
pub const DERIVE_API_KEY: &str = "/auth/derive-api-key";
pub const GET_API_KEYS: &str = "/auth/api-keys";
pub const DELETE_API_KEY: &str = "/auth/api-key";
pub const CLOSED_ONLY: &str = "/auth/ban-status/closed-only";

pub const GET_ORDER_BOOK: &str = "/book";
pub const GET_ORDER_BOOKS: &str = "/books";
pub const MID_POINT: &str = "/midpoint";
pub const MID_POINTS: &str = "/midpoints";
pub const PRICE: &str = "/price";
pub const GET_PRICES: &str = "/prices";
pub const GET_SPREAD: &str = "/spread";
pub const GET_SPREADS: &str = "/spreads";
pub const GET_LAST_TRADE_PRICE: &str = "/last-trade-price";
pub const GET_LAST_TRADES_PRICES: &str = "/last-trades-prices";
pub const GET_TICK_SIZE: &str = "/tick-size";
pub const GET_NEG_RISK: &str = "/neg-risk";
pub const GET_FEE_RATE: &str = "/fee-rate";

pub const POST_ORDER: &str = "/order";
pub const CANCEL: &str = "/order";
pub const CANCEL_ORDERS: &str = "/orders";
pub const CANCEL_ALL: &str = "/cancel-all";
pub const ORDERS: &str = "/data/orders";

/// Cursor value marking the last page of a paginated listing.
pub const END_CURSOR: &str = "LTE=";
