//! Maker/taker amount calculation.
//!
//! Price and size are rounded independently under the tick's [`RoundConfig`]
//! before multiplying, so the signed amount ratio matches the price the
//! exchange sees. BUY makers pay collateral for shares; SELL makers give shares
//! for collateral.

use alloy_primitives::U256;
use rust_decimal::Decimal;

use super::rounding::{
    decimal_places, round_down, round_normal, round_up, to_token_decimals, RoundConfig,
};
use crate::error::ValidationError;
use crate::signing::OrderSide;

/// Both legs of an order in 6-decimal base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderAmounts {
    pub side: OrderSide,
    pub maker_amount: U256,
    pub taker_amount: U256,
}

/// Amounts for a limit order of `size` shares at `price`.
pub fn get_order_amounts(
    side: OrderSide,
    size: Decimal,
    price: Decimal,
    round_config: RoundConfig,
) -> Result<OrderAmounts, ValidationError> {
    ensure_positive("size", size)?;
    let raw_price = round_normal(price, round_config.price);
    ensure_positive("price", raw_price)?;

    let shares = round_down(size, round_config.size);
    let collateral = shares
        .checked_mul(raw_price)
        .ok_or(ValidationError::AmountOverflow {
            field: "size",
            value: size,
        })?;
    let collateral = fit_amount(collateral, round_config.amount);

    match side {
        OrderSide::Buy => finish(side, collateral, shares),
        OrderSide::Sell => finish(side, shares, collateral),
    }
}

/// Amounts for a market order.
///
/// `amount` is collateral to spend for BUY and shares to sell for SELL.
pub fn get_market_order_amounts(
    side: OrderSide,
    amount: Decimal,
    price: Decimal,
    round_config: RoundConfig,
) -> Result<OrderAmounts, ValidationError> {
    ensure_positive("amount", amount)?;
    let raw_price = round_normal(price, round_config.price);
    ensure_positive("price", raw_price)?;

    let maker = round_down(amount, round_config.size);
    let taker = match side {
        OrderSide::Buy => maker.checked_div(raw_price),
        OrderSide::Sell => maker.checked_mul(raw_price),
    }
    .ok_or(ValidationError::AmountOverflow {
        field: "amount",
        value: amount,
    })?;

    finish(side, maker, fit_amount(taker, round_config.amount))
}

/// Trim a computed leg to at most `digits` decimals.
///
/// Rounds up at `digits + 4` first so values one ulp under a boundary
/// (e.g. 2.999999999) land on it, then floors if still too long.
fn fit_amount(x: Decimal, digits: u32) -> Decimal {
    if decimal_places(x) <= digits {
        return x;
    }
    let widened = round_up(x, digits + 4);
    if decimal_places(widened) > digits {
        round_down(widened, digits)
    } else {
        widened
    }
}

fn finish(
    side: OrderSide,
    maker: Decimal,
    taker: Decimal,
) -> Result<OrderAmounts, ValidationError> {
    ensure_positive("maker amount", maker)?;
    ensure_positive("taker amount", taker)?;

    let maker_amount = to_token_decimals(maker)?;
    let taker_amount = to_token_decimals(taker)?;
    if maker_amount.is_zero() {
        return Err(ValidationError::NonPositiveAmount {
            field: "maker amount",
            value: maker,
        });
    }
    if taker_amount.is_zero() {
        return Err(ValidationError::NonPositiveAmount {
            field: "taker amount",
            value: taker,
        });
    }

    Ok(OrderAmounts {
        side,
        maker_amount,
        taker_amount,
    })
}

fn ensure_positive(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if value > Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::NonPositiveAmount { field, value })
    }
}
