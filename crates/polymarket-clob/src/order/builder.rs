//! Order assembly: validation, amounts, contract selection and signing.
//!
//! The client resolves market metadata (tick size, neg-risk, fee rate) and the
//! market price; [`OrderBuilder`] turns the resolved inputs into a signed order
//! without touching the network.

use alloy_primitives::{Address, U256};
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::amounts::{get_market_order_amounts, get_order_amounts, OrderAmounts};
use super::args::{MarketOrderArgs, OrderArgs};
use super::rounding::TickSize;
use crate::error::ValidationError;
use crate::signing::{
    contract_config, generate_salt, Eip712Domain, OrderData, SignatureType, SignedOrder, Signer,
};
use crate::Result;

/// Market metadata an order is built against, already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketParams {
    pub tick_size: TickSize,
    pub neg_risk: bool,
    pub fee_rate_bps: u32,
}

/// Pick the order's tick size. A caller value finer than the market minimum is rejected.
pub fn resolve_tick_size(
    requested: Option<TickSize>,
    minimum: TickSize,
) -> std::result::Result<TickSize, ValidationError> {
    match requested {
        Some(tick) if tick.is_smaller_than(&minimum) => Err(ValidationError::TickSizeTooSmall {
            requested: tick,
            minimum,
        }),
        Some(tick) => Ok(tick),
        None => Ok(minimum),
    }
}

/// Whether `price` lies in `[tick, 1 - tick]`.
pub fn price_valid(price: Decimal, tick_size: TickSize) -> bool {
    let tick = tick_size.as_decimal();
    price >= tick && price <= Decimal::ONE - tick
}

pub fn validate_price(
    price: Decimal,
    tick_size: TickSize,
) -> std::result::Result<(), ValidationError> {
    if price_valid(price, tick_size) {
        Ok(())
    } else {
        let tick = tick_size.as_decimal();
        Err(ValidationError::PriceOutOfRange {
            price,
            min: tick,
            max: Decimal::ONE - tick,
        })
    }
}

/// Reconcile the caller's fee rate with the market's.
///
/// Both non-zero and different is an error; otherwise the non-zero one wins
/// (zero when both are zero).
pub fn resolve_fee_rate(requested: u32, market: u32) -> std::result::Result<u32, ValidationError> {
    match (requested, market) {
        (r, m) if r > 0 && m > 0 && r != m => Err(ValidationError::FeeRateMismatch {
            requested: r,
            market: m,
        }),
        (_, m) if m > 0 => Ok(m),
        (r, _) => Ok(r),
    }
}

/// Builds and signs exchange orders for one signer.
#[derive(Debug, Clone)]
pub struct OrderBuilder<'a> {
    signer: &'a Signer,
    signature_type: SignatureType,
    funder: Option<Address>,
}

impl<'a> OrderBuilder<'a> {
    pub fn new(signer: &'a Signer) -> Self {
        Self {
            signer,
            signature_type: SignatureType::Eoa,
            funder: None,
        }
    }

    pub fn signature_type(mut self, signature_type: SignatureType) -> Self {
        self.signature_type = signature_type;
        self
    }

    /// Address holding the funds; defaults to the signer (EOA wallets).
    pub fn funder(mut self, funder: Option<Address>) -> Self {
        self.funder = funder;
        self
    }

    pub fn maker(&self) -> Address {
        self.funder.unwrap_or_else(|| self.signer.address())
    }

    /// Sign a limit order.
    #[allow(clippy::result_large_err)]
    pub fn build_signed_order(&self, args: &OrderArgs, market: MarketParams) -> Result<SignedOrder> {
        validate_price(args.price, market.tick_size)?;
        let fee_rate_bps = resolve_fee_rate(args.fee_rate_bps, market.fee_rate_bps)?;
        let amounts = get_order_amounts(
            args.side,
            args.size,
            args.price,
            market.tick_size.round_config(),
        )?;

        info!(
            token_id = %args.token_id,
            side = %args.side,
            price = %args.price,
            size = %args.size,
            tick_size = %market.tick_size,
            neg_risk = market.neg_risk,
            fee_rate_bps,
            "Building limit order"
        );

        let order = self.order_data(
            &args.token_id,
            amounts,
            args.taker,
            fee_rate_bps,
            args.nonce,
            args.expiration,
        )?;
        self.sign(order, market.neg_risk)
    }

    /// Sign a market order at the already resolved worst `price`.
    ///
    /// Expiration is always zero.
    #[allow(clippy::result_large_err)]
    pub fn build_signed_market_order(
        &self,
        args: &MarketOrderArgs,
        price: Decimal,
        market: MarketParams,
    ) -> Result<SignedOrder> {
        validate_price(price, market.tick_size)?;
        let fee_rate_bps = resolve_fee_rate(args.fee_rate_bps, market.fee_rate_bps)?;
        let amounts = get_market_order_amounts(
            args.side,
            args.amount,
            price,
            market.tick_size.round_config(),
        )?;

        info!(
            token_id = %args.token_id,
            side = %args.side,
            amount = %args.amount,
            price = %price,
            order_type = %args.order_type,
            neg_risk = market.neg_risk,
            fee_rate_bps,
            "Building market order"
        );

        let order = self.order_data(&args.token_id, amounts, args.taker, fee_rate_bps, args.nonce, 0)?;
        self.sign(order, market.neg_risk)
    }

    #[allow(clippy::result_large_err)]
    fn order_data(
        &self,
        token_id: &str,
        amounts: OrderAmounts,
        taker: Option<Address>,
        fee_rate_bps: u32,
        nonce: u64,
        expiration: u64,
    ) -> Result<OrderData> {
        Ok(OrderData {
            salt: generate_salt(),
            maker: self.maker(),
            signer: self.signer.address(),
            taker: taker.unwrap_or(Address::ZERO),
            token_id: parse_token_id(token_id)?,
            maker_amount: amounts.maker_amount,
            taker_amount: amounts.taker_amount,
            expiration: U256::from(expiration),
            nonce: U256::from(nonce),
            fee_rate_bps: U256::from(fee_rate_bps),
            side: amounts.side,
            signature_type: self.signature_type,
        })
    }

    #[allow(clippy::result_large_err)]
    fn sign(&self, order: OrderData, neg_risk: bool) -> Result<SignedOrder> {
        let chain_id = self.signer.chain_id();
        let contracts = contract_config(chain_id, neg_risk)?;
        let domain = Eip712Domain::exchange(chain_id, contracts.exchange);

        debug!(
            exchange = %contracts.exchange,
            maker_amount = %order.maker_amount,
            taker_amount = %order.taker_amount,
            salt = %order.salt,
            "Signing order"
        );
        self.signer.sign_order(&order, &domain)
    }
}

/// Token ids are decimal uint256 strings.
fn parse_token_id(token_id: &str) -> std::result::Result<U256, ValidationError> {
    let trimmed = token_id.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidTokenId(token_id.to_string()));
    }
    U256::from_str_radix(trimmed, 10).map_err(|_| ValidationError::InvalidTokenId(token_id.to_string()))
}
