//! Polymarket CLOB API client.
//!
//! One client serves all three trust tiers: public market data (L0), key
//! management signed with the private key (L1), and trading signed with API
//! credentials (L2). Privileged calls check the tier before any network or
//! signing work.

use alloy_primitives::Address;
use reqwest::Method;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::endpoints;
use super::transport::{HttpRequest, ReqwestTransport, Transport};
use crate::auth::{
    create_level_1_headers, create_level_2_headers, ApiCredentials, AuthLevel, RequestArgs,
    L1_AUTH_UNAVAILABLE, L2_AUTH_UNAVAILABLE,
};
use crate::cache::MarketMetadataCache;
use crate::config::ClientConfig;
use crate::order::{
    calculate_market_price, resolve_tick_size, CreateOrderOptions, FillTarget, MarketOrderArgs,
    MarketParams, OrderArgs, OrderBuilder, OrderType, TickSize,
};
use crate::signing::{OrderSide, SignedOrder, Signer};
use crate::types::{
    ApiKeyResponse, ApiKeysResponse, BookParams, CancelResponse, ClosedOnlyResponse,
    DecimalValue, FeeRateResponse, LastTradePriceResponse, MidpointResponse, NegRiskResponse, OneOrMany,
    OpenOrder, OpenOrdersPage, OrderBookSnapshot, PostOrderRequest, PostOrderResponse,
    PriceResponse, SpreadResponse, TickSizeResponse,
};
use crate::{Error, Result};

/// Filters for [`ClobClient::get_open_orders`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenOrderParams {
    pub id: Option<String>,
    pub market: Option<String>,
    pub asset_id: Option<String>,
}

impl OpenOrderParams {
    fn query(&self, cursor: &str) -> String {
        let mut parts = Vec::new();
        if let Some(id) = &self.id {
            parts.push(format!("id={}", id));
        }
        if let Some(market) = &self.market {
            parts.push(format!("market={}", market));
        }
        if let Some(asset_id) = &self.asset_id {
            parts.push(format!("asset_id={}", asset_id));
        }
        parts.push(format!("next_cursor={}", cursor));
        parts.join("&")
    }
}

#[derive(Serialize)]
struct CancelOrderBody<'a> {
    #[serde(rename = "orderID")]
    order_id: &'a str,
}

/// Polymarket CLOB API client.
pub struct ClobClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    signer: Option<Signer>,
    credentials: Option<ApiCredentials>,
    cache: MarketMetadataCache,
}

impl ClobClient {
    /// Public (L0) client over HTTP.
    #[allow(clippy::result_large_err)]
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Client over a caller-supplied transport.
    #[allow(clippy::result_large_err)]
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            transport,
            signer: None,
            credentials: None,
            cache: MarketMetadataCache::new(),
        })
    }

    /// Attach a private key, enabling L1 operations. Its chain must match the config.
    #[allow(clippy::result_large_err)]
    pub fn with_signer(mut self, signer: Signer) -> Result<Self> {
        if signer.chain_id() != self.config.chain_id {
            return Err(Error::Config {
                message: format!(
                    "signer chain {} does not match client chain {}",
                    signer.chain_id(),
                    self.config.chain_id
                ),
            });
        }
        self.signer = Some(signer);
        Ok(self)
    }

    /// Attach API credentials, enabling L2 operations once a signer is present.
    pub fn with_credentials(mut self, credentials: ApiCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn set_credentials(&mut self, credentials: ApiCredentials) {
        self.credentials = Some(credentials);
    }

    pub fn credentials(&self) -> Option<&ApiCredentials> {
        self.credentials.as_ref()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache(&self) -> &MarketMetadataCache {
        &self.cache
    }

    /// Signer address, when a key is attached.
    pub fn address(&self) -> Option<Address> {
        self.signer.as_ref().map(Signer::address)
    }

    pub fn auth_level(&self) -> AuthLevel {
        match (&self.signer, &self.credentials) {
            (Some(_), Some(_)) => AuthLevel::L2,
            (Some(_), None) => AuthLevel::L1,
            _ => AuthLevel::L0,
        }
    }

    #[allow(clippy::result_large_err)]
    fn assert_level_1_auth(&self) -> Result<&Signer> {
        self.signer.as_ref().ok_or(Error::AuthUnavailable {
            level: AuthLevel::L1,
            message: L1_AUTH_UNAVAILABLE,
        })
    }

    #[allow(clippy::result_large_err)]
    fn assert_level_2_auth(&self) -> Result<(&Signer, &ApiCredentials)> {
        let signer = self.assert_level_1_auth()?;
        let credentials = self.credentials.as_ref().ok_or(Error::AuthUnavailable {
            level: AuthLevel::L2,
            message: L2_AUTH_UNAVAILABLE,
        })?;
        Ok((signer, credentials))
    }

    fn order_builder<'a>(&self, signer: &'a Signer) -> OrderBuilder<'a> {
        OrderBuilder::new(signer)
            .signature_type(self.config.signature_type)
            .funder(self.config.funder)
    }

    /// Build an L2-signed request. Only `path` is signed; `query` is appended after.
    #[allow(clippy::result_large_err)]
    fn l2_request(
        &self,
        method: Method,
        path: &str,
        query: Option<String>,
        body: Option<String>,
    ) -> Result<HttpRequest> {
        let (signer, credentials) = self.assert_level_2_auth()?;

        let mut args = RequestArgs::new(method.as_str(), path);
        if let Some(body) = body.as_deref() {
            args = args.with_body(body);
        }
        let headers = create_level_2_headers(signer, credentials, &args)?;

        let full_path = match query {
            Some(q) => format!("{}?{}", path, q),
            None => path.to_string(),
        };
        let mut request = HttpRequest::new(method, full_path).with_headers(headers);
        if let Some(body) = body {
            request = request.with_body(body);
        }
        Ok(request)
    }

    // ---- L0: public market data ----

    /// Health check.
    pub async fn get_ok(&self) -> Result<serde_json::Value> {
        let body = self.transport.send(HttpRequest::get(endpoints::OK)).await?;
        Ok(body.into_value())
    }

    /// Server time in Unix seconds.
    pub async fn get_server_time(&self) -> Result<u64> {
        self.transport
            .send(HttpRequest::get(endpoints::TIME))
            .await?
            .decode()
    }

    pub async fn get_order_book(&self, token_id: &str) -> Result<OrderBookSnapshot> {
        let path = format!("{}?token_id={}", endpoints::GET_ORDER_BOOK, token_id);
        self.transport.send(HttpRequest::get(path)).await?.decode()
    }

    pub async fn get_order_books(&self, params: &[BookParams]) -> Result<Vec<OrderBookSnapshot>> {
        self.post_batch(endpoints::GET_ORDER_BOOKS, params).await
    }

    /// Midpoints keyed by token id.
    pub async fn get_midpoints(&self, params: &[BookParams]) -> Result<HashMap<String, Decimal>> {
        let resp: HashMap<String, DecimalValue> =
            self.post_batch(endpoints::MID_POINTS, params).await?;
        Ok(resp.into_iter().map(|(token, v)| (token, v.0)).collect())
    }

    /// Prices keyed by token id, then by the side each entry asked for.
    pub async fn get_prices(
        &self,
        params: &[BookParams],
    ) -> Result<HashMap<String, HashMap<OrderSide, Decimal>>> {
        let resp: HashMap<String, HashMap<OrderSide, DecimalValue>> =
            self.post_batch(endpoints::GET_PRICES, params).await?;
        Ok(resp
            .into_iter()
            .map(|(token, sides)| (token, sides.into_iter().map(|(s, v)| (s, v.0)).collect()))
            .collect())
    }

    /// Spreads keyed by token id.
    pub async fn get_spreads(&self, params: &[BookParams]) -> Result<HashMap<String, Decimal>> {
        let resp: HashMap<String, DecimalValue> =
            self.post_batch(endpoints::GET_SPREADS, params).await?;
        Ok(resp.into_iter().map(|(token, v)| (token, v.0)).collect())
    }

    pub async fn get_last_trades_prices(
        &self,
        params: &[BookParams],
    ) -> Result<Vec<LastTradePriceResponse>> {
        self.post_batch(endpoints::GET_LAST_TRADES_PRICES, params).await
    }

    async fn post_batch<T: DeserializeOwned>(&self, path: &str, params: &[BookParams]) -> Result<T> {
        let body = serde_json::to_string(params)?;
        debug!(path, tokens = params.len(), "Batch market data request");
        let request = HttpRequest::post(path).with_body(body);
        self.transport.send(request).await?.decode()
    }

    pub async fn get_midpoint(&self, token_id: &str) -> Result<Decimal> {
        let path = format!("{}?token_id={}", endpoints::MID_POINT, token_id);
        let resp: MidpointResponse = self.transport.send(HttpRequest::get(path)).await?.decode()?;
        Ok(resp.mid)
    }

    /// Best price available to a taker on `side`.
    pub async fn get_price(&self, token_id: &str, side: OrderSide) -> Result<Decimal> {
        let path = format!("{}?token_id={}&side={}", endpoints::PRICE, token_id, side);
        let resp: PriceResponse = self.transport.send(HttpRequest::get(path)).await?.decode()?;
        Ok(resp.price)
    }

    pub async fn get_spread(&self, token_id: &str) -> Result<Decimal> {
        let path = format!("{}?token_id={}", endpoints::GET_SPREAD, token_id);
        let resp: SpreadResponse = self.transport.send(HttpRequest::get(path)).await?.decode()?;
        Ok(resp.spread)
    }

    pub async fn get_last_trade_price(&self, token_id: &str) -> Result<LastTradePriceResponse> {
        let path = format!("{}?token_id={}", endpoints::GET_LAST_TRADE_PRICE, token_id);
        self.transport.send(HttpRequest::get(path)).await?.decode()
    }

    /// Market minimum tick size. Cached per token.
    pub async fn get_tick_size(&self, token_id: &str) -> Result<TickSize> {
        if let Some(cached) = self.cache.tick_size(token_id) {
            return Ok(cached);
        }

        let path = format!("{}?token_id={}", endpoints::GET_TICK_SIZE, token_id);
        let resp: TickSizeResponse = self.transport.send(HttpRequest::get(path)).await?.decode()?;
        Ok(self.cache.insert_tick_size(token_id, resp.minimum_tick_size))
    }

    /// Whether the token settles on the neg-risk exchange. Cached per token.
    pub async fn get_neg_risk(&self, token_id: &str) -> Result<bool> {
        if let Some(cached) = self.cache.neg_risk(token_id) {
            return Ok(cached);
        }

        let path = format!("{}?token_id={}", endpoints::GET_NEG_RISK, token_id);
        let resp: NegRiskResponse = self.transport.send(HttpRequest::get(path)).await?.decode()?;
        Ok(self.cache.insert_neg_risk(token_id, resp.neg_risk))
    }

    /// Market base fee in basis points. Cached per token.
    pub async fn get_fee_rate_bps(&self, token_id: &str) -> Result<u32> {
        if let Some(cached) = self.cache.fee_rate_bps(token_id) {
            return Ok(cached);
        }

        let path = format!("{}?token_id={}", endpoints::GET_FEE_RATE, token_id);
        let resp: FeeRateResponse = self.transport.send(HttpRequest::get(path)).await?.decode()?;
        Ok(self.cache.insert_fee_rate_bps(token_id, resp.base_fee))
    }

    // ---- L1: credentials ----

    /// Create new API credentials and keep them on the client.
    ///
    /// Credentials cannot be recovered after creation; store them safely.
    pub async fn create_api_key(&mut self, nonce: Option<u64>) -> Result<ApiCredentials> {
        let signer = self.assert_level_1_auth()?;
        let headers = create_level_1_headers(signer, nonce)?;

        let request = HttpRequest::post(endpoints::CREATE_API_KEY).with_headers(headers);
        let resp: ApiKeyResponse = self.transport.send(request).await?.decode()?;

        let credentials: ApiCredentials = resp.into();
        self.credentials = Some(credentials.clone());
        info!("Created API credentials");
        Ok(credentials)
    }

    /// Derive the existing API credentials for this key and nonce.
    pub async fn derive_api_key(&mut self, nonce: Option<u64>) -> Result<ApiCredentials> {
        let signer = self.assert_level_1_auth()?;
        let headers = create_level_1_headers(signer, nonce)?;

        let request = HttpRequest::get(endpoints::DERIVE_API_KEY).with_headers(headers);
        let body = self.transport.send(request).await?;
        let resp = body
            .clone()
            .decode::<OneOrMany<ApiKeyResponse>>()?
            .into_first()
            .ok_or_else(|| Error::upstream(None, body.into_value().to_string()))?;

        let credentials: ApiCredentials = resp.into();
        self.credentials = Some(credentials.clone());
        info!("Derived API credentials");
        Ok(credentials)
    }

    /// Create credentials, falling back to deriving the existing ones.
    pub async fn create_or_derive_api_key(&mut self, nonce: Option<u64>) -> Result<ApiCredentials> {
        match self.create_api_key(nonce).await {
            Ok(credentials) => Ok(credentials),
            Err(err @ Error::AuthUnavailable { .. }) => Err(err),
            Err(create_err) => {
                warn!(error = %create_err, "create_api_key failed, trying derive");
                self.derive_api_key(nonce).await
            }
        }
    }

    // ---- L2: credentials ----

    pub async fn get_api_keys(&self) -> Result<ApiKeysResponse> {
        let request = self.l2_request(Method::GET, endpoints::GET_API_KEYS, None, None)?;
        self.transport.send(request).await?.decode()
    }

    pub async fn delete_api_key(&self) -> Result<serde_json::Value> {
        let request = self.l2_request(Method::DELETE, endpoints::DELETE_API_KEY, None, None)?;
        let body = self.transport.send(request).await?;
        info!("Deleted API key");
        Ok(body.into_value())
    }

    pub async fn get_closed_only_mode(&self) -> Result<ClosedOnlyResponse> {
        let request = self.l2_request(Method::GET, endpoints::CLOSED_ONLY, None, None)?;
        self.transport.send(request).await?.decode()
    }

    // ---- order construction (L1) ----

    /// Resolve the book's achievable average price for a market order.
    ///
    /// BUY `amount` is collateral, SELL `amount` is shares.
    pub async fn calculate_market_price(
        &self,
        token_id: &str,
        side: OrderSide,
        amount: Decimal,
        order_type: OrderType,
    ) -> Result<Decimal> {
        let book = self.get_order_book(token_id).await?;
        let levels = match side {
            OrderSide::Buy => &book.asks,
            OrderSide::Sell => &book.bids,
        };
        calculate_market_price(levels, side, FillTarget::for_side(side, amount), order_type)
    }

    async fn resolve_market(
        &self,
        token_id: &str,
        options: CreateOrderOptions,
    ) -> Result<(TickSize, bool, u32)> {
        let minimum = self.get_tick_size(token_id).await?;
        let tick_size = resolve_tick_size(options.tick_size, minimum)?;
        let neg_risk = match options.neg_risk {
            Some(flag) => flag,
            None => self.get_neg_risk(token_id).await?,
        };
        let market_fee = self.get_fee_rate_bps(token_id).await?;
        Ok((tick_size, neg_risk, market_fee))
    }

    /// Build and sign a limit order.
    pub async fn create_order(
        &self,
        args: &OrderArgs,
        options: CreateOrderOptions,
    ) -> Result<SignedOrder> {
        let signer = self.assert_level_1_auth()?;
        let (tick_size, neg_risk, fee_rate_bps) =
            self.resolve_market(&args.token_id, options).await?;

        self.order_builder(signer).build_signed_order(
            args,
            MarketParams {
                tick_size,
                neg_risk,
                fee_rate_bps,
            },
        )
    }

    /// Build and sign a market order, pricing it from the book when no price is given.
    pub async fn create_market_order(
        &self,
        args: &MarketOrderArgs,
        options: CreateOrderOptions,
    ) -> Result<SignedOrder> {
        let signer = self.assert_level_1_auth()?;
        let minimum = self.get_tick_size(&args.token_id).await?;
        let tick_size = resolve_tick_size(options.tick_size, minimum)?;

        let price = match args.price {
            Some(price) if price > Decimal::ZERO => price,
            _ => {
                self.calculate_market_price(&args.token_id, args.side, args.amount, args.order_type)
                    .await?
            }
        };

        let neg_risk = match options.neg_risk {
            Some(flag) => flag,
            None => self.get_neg_risk(&args.token_id).await?,
        };
        let fee_rate_bps = self.get_fee_rate_bps(&args.token_id).await?;

        self.order_builder(signer).build_signed_market_order(
            args,
            price,
            MarketParams {
                tick_size,
                neg_risk,
                fee_rate_bps,
            },
        )
    }

    // ---- trading (L2) ----

    /// Submit a signed order.
    pub async fn post_order(
        &self,
        order: &SignedOrder,
        order_type: OrderType,
    ) -> Result<PostOrderResponse> {
        let (_, credentials) = self.assert_level_2_auth()?;
        let body = serde_json::to_string(&PostOrderRequest {
            order,
            owner: &credentials.api_key,
            order_type,
        })?;
        debug!(payload = %body, "POST /order request body");

        let request = self.l2_request(Method::POST, endpoints::POST_ORDER, None, Some(body))?;
        let resp: PostOrderResponse = self.transport.send(request).await?.decode()?;
        info!(
            order_id = %resp.order_id,
            status = %resp.status,
            success = resp.success,
            "Order posted"
        );
        Ok(resp)
    }

    /// Sign a limit order and submit it as GTC.
    pub async fn create_and_post_order(
        &self,
        args: &OrderArgs,
        options: CreateOrderOptions,
    ) -> Result<PostOrderResponse> {
        self.assert_level_2_auth()?;
        let order = self.create_order(args, options).await?;
        self.post_order(&order, OrderType::Gtc).await
    }

    pub async fn cancel_order(&self, order_id: &str) -> Result<CancelResponse> {
        let body = serde_json::to_string(&CancelOrderBody { order_id })?;
        let request = self.l2_request(Method::DELETE, endpoints::CANCEL, None, Some(body))?;
        let resp: CancelResponse = self.transport.send(request).await?.decode()?;
        info!(order_id, canceled = resp.canceled.len(), "Cancel order");
        Ok(resp)
    }

    pub async fn cancel_orders(&self, order_ids: &[String]) -> Result<CancelResponse> {
        let body = serde_json::to_string(order_ids)?;
        let request = self.l2_request(Method::DELETE, endpoints::CANCEL_ORDERS, None, Some(body))?;
        let resp: CancelResponse = self.transport.send(request).await?.decode()?;
        info!(
            requested = order_ids.len(),
            canceled = resp.canceled.len(),
            "Cancel orders"
        );
        Ok(resp)
    }

    pub async fn cancel_all(&self) -> Result<CancelResponse> {
        let request = self.l2_request(Method::DELETE, endpoints::CANCEL_ALL, None, None)?;
        let resp: CancelResponse = self.transport.send(request).await?.decode()?;
        info!(canceled = resp.canceled.len(), "Cancel all orders");
        Ok(resp)
    }

    /// Open orders for the authenticated user, following pagination to the end.
    pub async fn get_open_orders(&self, params: &OpenOrderParams) -> Result<Vec<OpenOrder>> {
        let mut orders = Vec::new();
        let mut cursor = String::from("MA==");

        loop {
            // L2 signs the path only, never the query string.
            let request = self.l2_request(
                Method::GET,
                endpoints::ORDERS,
                Some(params.query(&cursor)),
                None,
            )?;
            let page: OpenOrdersPage = self.transport.send(request).await?.decode()?;
            orders.extend(page.data);

            match page.next_cursor {
                Some(next) if !next.is_empty() && next != endpoints::END_CURSOR && next != cursor => {
                    cursor = next
                }
                _ => break,
            }
        }

        debug!(count = orders.len(), "Fetched open orders");
        Ok(orders)
    }
}

impl std::fmt::Debug for ClobClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClobClient")
            .field("host", &self.config.host)
            .field("chain_id", &self.config.chain_id)
            .field("address", &self.address())
            .field("auth_level", &self.auth_level())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::{MockTransport, ResponseBody};
    use crate::auth::{POLY_API_KEY, POLY_NONCE, POLY_PASSPHRASE, POLY_SIGNATURE};
    use crate::error::ValidationError;
    use crate::signing::POLYGON_CHAIN_ID;
    use serde_json::json;
    use std::str::FromStr;

    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TOKEN_ID: &str = "1234567890";

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn credentials() -> ApiCredentials {
        ApiCredentials::new(
            "test-key".to_string(),
            "c2VjcmV0LXNlY3JldC1zZWNyZXQ=".to_string(),
            "test-pass".to_string(),
        )
    }

    fn client(mock: MockTransport) -> ClobClient {
        ClobClient::with_transport(ClientConfig::default(), Arc::new(mock)).unwrap()
    }

    fn l1_client(mock: MockTransport) -> ClobClient {
        let signer = Signer::new(TEST_PRIVATE_KEY, POLYGON_CHAIN_ID).unwrap();
        client(mock).with_signer(signer).unwrap()
    }

    fn l2_client(mock: MockTransport) -> ClobClient {
        l1_client(mock).with_credentials(credentials())
    }

    /// Answers the metadata and book endpoints for one test market.
    fn market_responses(request: &HttpRequest) -> Result<ResponseBody> {
        let path = request.path.split('?').next().unwrap_or_default();
        let value = match path {
            "/tick-size" => json!({"minimum_tick_size": 0.01}),
            "/neg-risk" => json!({"neg_risk": false}),
            "/fee-rate" => json!({"base_fee": 0}),
            "/book" => json!({
                "market": "0xm",
                "asset_id": TOKEN_ID,
                "bids": [{"price": "0.48", "size": "100"}],
                "asks": [{"price": "0.52", "size": "50"}, {"price": "0.50", "size": "10"}]
            }),
            other => return Err(Error::upstream(Some(404), other)),
        };
        Ok(ResponseBody::Json(value))
    }

    #[test]
    fn test_auth_levels() {
        let l0 = client(MockTransport::new());
        assert_eq!(l0.auth_level(), AuthLevel::L0);
        assert!(l0.address().is_none());

        let l1 = l1_client(MockTransport::new());
        assert_eq!(l1.auth_level(), AuthLevel::L1);

        let l2 = l1.with_credentials(credentials());
        assert_eq!(l2.auth_level(), AuthLevel::L2);
    }

    #[test]
    fn test_signer_chain_must_match() {
        let signer = Signer::new(TEST_PRIVATE_KEY, 80002).unwrap();
        assert!(matches!(
            client(MockTransport::new()).with_signer(signer),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_debug_does_not_expose_credentials() {
        let client = l2_client(MockTransport::new());
        let debug_str = format!("{:?}", client);
        assert!(!debug_str.contains("test-key"));
        assert!(!debug_str.contains("test-pass"));
        assert!(debug_str.contains("L2"));
    }

    #[tokio::test]
    async fn test_privileged_calls_gated_before_network() {
        // No expectations: any send would panic.
        let mut public = client(MockTransport::new());
        assert!(matches!(
            public.create_api_key(None).await,
            Err(Error::AuthUnavailable {
                level: AuthLevel::L1,
                ..
            })
        ));
        assert!(matches!(
            public
                .create_order(
                    &OrderArgs::new(TOKEN_ID, d("0.5"), d("10"), OrderSide::Buy),
                    CreateOrderOptions::default()
                )
                .await,
            Err(Error::AuthUnavailable {
                level: AuthLevel::L1,
                ..
            })
        ));

        let l1 = l1_client(MockTransport::new());
        assert!(matches!(
            l1.cancel_all().await,
            Err(Error::AuthUnavailable {
                level: AuthLevel::L2,
                ..
            })
        ));
        assert!(matches!(
            l1.get_open_orders(&OpenOrderParams::default()).await,
            Err(Error::AuthUnavailable {
                level: AuthLevel::L2,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_metadata_is_cached() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|r| r.path == "/tick-size?token_id=1234567890")
            .times(1)
            .returning(|_| Ok(ResponseBody::Json(json!({"minimum_tick_size": "0.001"}))));
        mock.expect_send()
            .withf(|r| r.path.starts_with("/neg-risk"))
            .times(1)
            .returning(|_| Ok(ResponseBody::Json(json!({"neg_risk": true}))));
        mock.expect_send()
            .withf(|r| r.path.starts_with("/fee-rate"))
            .times(1)
            .returning(|_| Ok(ResponseBody::Json(json!({"base_fee": 10}))));

        let client = client(mock);
        for _ in 0..3 {
            assert_eq!(client.get_tick_size(TOKEN_ID).await.unwrap(), TickSize::Thousandth);
            assert!(client.get_neg_risk(TOKEN_ID).await.unwrap());
            assert_eq!(client.get_fee_rate_bps(TOKEN_ID).await.unwrap(), 10);
        }
    }

    #[tokio::test]
    async fn test_upstream_errors_propagate_and_are_not_cached() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .times(2)
            .returning(|_| Err(Error::upstream(Some(500), "boom")));

        let client = client(mock);
        for _ in 0..2 {
            assert!(matches!(
                client.get_tick_size(TOKEN_ID).await,
                Err(Error::Upstream {
                    status: Some(500),
                    ..
                })
            ));
        }
        assert!(client.cache().is_empty());
    }

    #[tokio::test]
    async fn test_create_api_key_sends_l1_headers_and_stores_credentials() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|r| {
                r.method == Method::POST
                    && r.path == "/auth/api-key"
                    && r.headers.get(POLY_NONCE).map(String::as_str) == Some("3")
                    && r.headers.contains_key(POLY_SIGNATURE)
            })
            .times(1)
            .returning(|_| {
                Ok(ResponseBody::Json(
                    json!({"apiKey": "k", "secret": "c2VjcmV0", "passphrase": "p"}),
                ))
            });

        let mut client = l1_client(mock);
        let creds = client.create_api_key(Some(3)).await.unwrap();
        assert_eq!(creds.api_key, "k");
        assert_eq!(client.auth_level(), AuthLevel::L2);
    }

    #[tokio::test]
    async fn test_create_or_derive_falls_back_to_derive_array() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|r| r.method == Method::POST)
            .times(1)
            .returning(|_| Err(Error::upstream(Some(400), "key exists")));
        mock.expect_send()
            .withf(|r| r.method == Method::GET && r.path == "/auth/derive-api-key")
            .times(1)
            .returning(|_| {
                Ok(ResponseBody::Json(
                    json!([{"apiKey": "derived", "secret": "c2VjcmV0", "passphrase": "p"}]),
                ))
            });

        let mut client = l1_client(mock);
        let creds = client.create_or_derive_api_key(None).await.unwrap();
        assert_eq!(creds.api_key, "derived");
        assert_eq!(client.credentials().map(|c| c.api_key.as_str()), Some("derived"));
    }

    #[tokio::test]
    async fn test_derive_empty_array_is_upstream_error() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .returning(|_| Ok(ResponseBody::Json(json!([]))));

        let mut client = l1_client(mock);
        assert!(matches!(
            client.derive_api_key(None).await,
            Err(Error::Upstream { .. })
        ));
        assert_eq!(client.auth_level(), AuthLevel::L1);
    }

    #[tokio::test]
    async fn test_create_order_resolves_metadata() {
        let mut mock = MockTransport::new();
        mock.expect_send().returning(|r| market_responses(&r));

        let client = l1_client(mock);
        let args = OrderArgs::new(TOKEN_ID, d("0.50"), d("10"), OrderSide::Buy);
        let signed = client
            .create_order(&args, CreateOrderOptions::default())
            .await
            .unwrap();

        assert_eq!(signed.maker_amount, "5000000");
        assert_eq!(signed.taker_amount, "10000000");
        assert_eq!(signed.token_id, TOKEN_ID);
    }

    #[tokio::test]
    async fn test_create_order_rejects_finer_tick() {
        let mut mock = MockTransport::new();
        mock.expect_send().returning(|r| market_responses(&r));

        let client = l1_client(mock);
        let args = OrderArgs::new(TOKEN_ID, d("0.505"), d("10"), OrderSide::Buy);
        let options = CreateOrderOptions {
            tick_size: Some(TickSize::Thousandth),
            neg_risk: None,
        };
        assert!(matches!(
            client.create_order(&args, options).await,
            Err(Error::Validation(ValidationError::TickSizeTooSmall { .. }))
        ));
    }

    #[tokio::test]
    async fn test_create_market_order_prices_from_book() {
        let mut mock = MockTransport::new();
        mock.expect_send().returning(|r| market_responses(&r));

        let client = l1_client(mock);
        // $5 at the 0.50 level
        let args = MarketOrderArgs::new(TOKEN_ID, d("5"), OrderSide::Buy);
        let signed = client
            .create_market_order(&args, CreateOrderOptions::default())
            .await
            .unwrap();

        assert_eq!(signed.maker_amount, "5000000");
        assert_eq!(signed.taker_amount, "10000000");
        assert_eq!(signed.expiration, "0");
    }

    #[tokio::test]
    async fn test_calculate_market_price_fok_no_match() {
        let mut mock = MockTransport::new();
        mock.expect_send().returning(|r| market_responses(&r));

        let client = l1_client(mock);
        let result = client
            .calculate_market_price(TOKEN_ID, OrderSide::Sell, d("500"), OrderType::Fok)
            .await;
        assert!(matches!(result, Err(Error::Liquidity(_))));

        let fak = client
            .calculate_market_price(TOKEN_ID, OrderSide::Sell, d("500"), OrderType::Fak)
            .await
            .unwrap();
        assert_eq!(fak, d("0.48"));
    }

    #[tokio::test]
    async fn test_post_order_signs_exact_body() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|r| {
                let body = r.body.clone().unwrap_or_default();
                let ts = r.headers.get("POLY_TIMESTAMP").cloned().unwrap_or_default();
                let expected = crate::auth::build_hmac_signature(
                    "c2VjcmV0LXNlY3JldC1zZWNyZXQ=",
                    &ts,
                    "POST",
                    "/order",
                    Some(&body),
                )
                .unwrap();
                r.path == "/order"
                    && !body.contains(' ')
                    && body.contains(r#""owner":"test-key""#)
                    && body.contains(r#""orderType":"FOK""#)
                    && r.headers.get(POLY_SIGNATURE) == Some(&expected)
                    && r.headers.get(POLY_API_KEY).map(String::as_str) == Some("test-key")
                    && r.headers.get(POLY_PASSPHRASE).map(String::as_str) == Some("test-pass")
            })
            .times(1)
            .returning(|_| {
                Ok(ResponseBody::Json(
                    json!({"success": true, "orderID": "0xabc", "status": "matched"}),
                ))
            });

        let client = l2_client(mock);
        let signer = Signer::new(TEST_PRIVATE_KEY, POLYGON_CHAIN_ID).unwrap();
        let order = OrderBuilder::new(&signer)
            .build_signed_order(
                &OrderArgs::new(TOKEN_ID, d("0.5"), d("10"), OrderSide::Buy),
                MarketParams {
                    tick_size: TickSize::Hundredth,
                    neg_risk: false,
                    fee_rate_bps: 0,
                },
            )
            .unwrap();

        let resp = client.post_order(&order, OrderType::Fok).await.unwrap();
        assert_eq!(resp.order_id, "0xabc");
        assert!(resp.is_filled());
    }

    #[tokio::test]
    async fn test_cancel_order_body() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|r| {
                r.method == Method::DELETE
                    && r.path == "/order"
                    && r.body.as_deref() == Some(r#"{"orderID":"0x1"}"#)
            })
            .times(1)
            .returning(|_| Ok(ResponseBody::Json(json!({"canceled": ["0x1"], "not_canceled": {}}))));

        let client = l2_client(mock);
        let resp = client.cancel_order("0x1").await.unwrap();
        assert_eq!(resp.canceled, vec!["0x1"]);
    }

    #[tokio::test]
    async fn test_get_open_orders_follows_cursor() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|r| r.path == "/data/orders?market=0xm&next_cursor=MA==")
            .times(1)
            .returning(|_| {
                Ok(ResponseBody::Json(json!({
                    "data": [{"id": "1", "asset_id": "42", "side": "BUY", "price": "0.5", "original_size": "10"}],
                    "next_cursor": "MTAw"
                })))
            });
        mock.expect_send()
            .withf(|r| r.path == "/data/orders?market=0xm&next_cursor=MTAw")
            .times(1)
            .returning(|_| {
                Ok(ResponseBody::Json(json!({
                    "data": [{"id": "2", "asset_id": "42", "side": "SELL", "price": "0.6", "original_size": "5"}],
                    "next_cursor": "LTE="
                })))
            });

        let client = l2_client(mock);
        let params = OpenOrderParams {
            market: Some("0xm".to_string()),
            ..Default::default()
        };
        let orders = client.get_open_orders(&params).await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[1].side, OrderSide::Sell);
    }

    #[tokio::test]
    async fn test_public_market_data() {
        let mut mock = MockTransport::new();
        mock.expect_send().returning(|r| {
            let value = match r.path.as_str() {
                "/" => return Ok(ResponseBody::Raw("OK".to_string())),
                "/time" => json!(1700000000u64),
                "/midpoint?token_id=7" => json!({"mid": "0.45"}),
                "/price?token_id=7&side=BUY" => json!({"price": "0.46"}),
                "/spread?token_id=7" => json!({"spread": "0.02"}),
                "/books" => json!([{"asset_id": "7"}, {"asset_id": "8"}]),
                other => return Err(Error::upstream(Some(404), other)),
            };
            Ok(ResponseBody::Json(value))
        });

        let client = client(mock);
        assert_eq!(client.get_ok().await.unwrap(), json!("OK"));
        assert_eq!(client.get_server_time().await.unwrap(), 1_700_000_000);
        assert_eq!(client.get_midpoint("7").await.unwrap(), d("0.45"));
        assert_eq!(client.get_price("7", OrderSide::Buy).await.unwrap(), d("0.46"));
        assert_eq!(client.get_spread("7").await.unwrap(), d("0.02"));

        let books = client
            .get_order_books(&[BookParams::new("7"), BookParams::new("8")])
            .await
            .unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[1].asset_id, "8");
    }

    #[tokio::test]
    async fn test_batch_market_data() {
        let mut mock = MockTransport::new();
        mock.expect_send().returning(|r| {
            assert_eq!(r.method, Method::POST);
            let body: serde_json::Value = serde_json::from_str(r.body.as_deref().unwrap()).unwrap();
            let value = match r.path.as_str() {
                "/midpoints" => {
                    assert_eq!(body, json!([{"token_id": "7"}, {"token_id": "8"}]));
                    json!({"7": "0.45", "8": "0.6"})
                }
                "/prices" => {
                    assert_eq!(
                        body,
                        json!([{"token_id": "7", "side": "BUY"}, {"token_id": "8", "side": "SELL"}])
                    );
                    json!({"7": {"BUY": "0.46"}, "8": {"SELL": "0.59"}})
                }
                "/spreads" => json!({"7": "0.02", "8": 0.01}),
                "/last-trades-prices" => json!([
                    {"token_id": "7", "price": "0.44", "side": "BUY"},
                    {"token_id": "8", "price": "0.61", "side": "SELL"}
                ]),
                other => return Err(Error::upstream(Some(404), other)),
            };
            Ok(ResponseBody::Json(value))
        });

        let client = client(mock);
        let tokens = [BookParams::new("7"), BookParams::new("8")];

        let mids = client.get_midpoints(&tokens).await.unwrap();
        assert_eq!(mids["7"], d("0.45"));
        assert_eq!(mids["8"], d("0.6"));

        let priced = [
            BookParams::new("7").with_side(OrderSide::Buy),
            BookParams::new("8").with_side(OrderSide::Sell),
        ];
        let prices = client.get_prices(&priced).await.unwrap();
        assert_eq!(prices["7"][&OrderSide::Buy], d("0.46"));
        assert_eq!(prices["8"][&OrderSide::Sell], d("0.59"));

        let spreads = client.get_spreads(&tokens).await.unwrap();
        assert_eq!(spreads["8"], d("0.01"));

        let last = client.get_last_trades_prices(&tokens).await.unwrap();
        assert_eq!(last.len(), 2);
        assert_eq!(last[1].token_id, "8");
        assert_eq!(last[1].price, d("0.61"));
        assert_eq!(last[1].side, Some(OrderSide::Sell));
    }
}
