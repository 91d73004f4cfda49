//! Market price discovery by walking one side of the order book.
//!
//! BUY walks asks from the lowest price up, SELL walks bids from the highest
//! price down. Levels are re-sorted here, so the order they arrived in from
//! the API does not matter.

use rust_decimal::Decimal;
use tracing::debug;

use super::args::OrderType;
use crate::signing::OrderSide;
use crate::types::PriceLevel;
use crate::{Error, Result};

/// How much of the book a market order needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillTarget {
    /// Collateral to spend.
    Notional(Decimal),
    /// Shares to trade.
    Shares(Decimal),
}

impl FillTarget {
    /// Market BUY amounts are collateral, SELL amounts are shares.
    pub fn for_side(side: OrderSide, amount: Decimal) -> Self {
        match side {
            OrderSide::Buy => FillTarget::Notional(amount),
            OrderSide::Sell => FillTarget::Shares(amount),
        }
    }

    fn amount(&self) -> Decimal {
        match self {
            FillTarget::Notional(x) | FillTarget::Shares(x) => *x,
        }
    }
}

/// Volume-weighted average price achievable for `target` against `levels`.
///
/// `levels` is the side being taken: asks for BUY, bids for SELL. FOK needs
/// the full target to be fillable; other order types accept the average over
/// whatever depth exists.
pub fn calculate_market_price(
    levels: &[PriceLevel],
    side: OrderSide,
    target: FillTarget,
    order_type: OrderType,
) -> Result<Decimal> {
    if target.amount() <= Decimal::ZERO {
        return Err(Error::Liquidity(format!(
            "fill target must be positive, got {}",
            target.amount()
        )));
    }

    let mut book: Vec<PriceLevel> = levels
        .iter()
        .copied()
        .filter(|l| l.price > Decimal::ZERO && l.size > Decimal::ZERO)
        .collect();
    if book.is_empty() {
        return Err(Error::Liquidity(format!("no {} liquidity", opposite(side))));
    }
    match side {
        OrderSide::Buy => book.sort_by(|a, b| a.price.cmp(&b.price)),
        OrderSide::Sell => book.sort_by(|a, b| b.price.cmp(&a.price)),
    }

    let mut remaining = target.amount();
    let mut shares = Decimal::ZERO;
    let mut notional = Decimal::ZERO;

    for level in &book {
        if remaining <= Decimal::ZERO {
            break;
        }
        let (take_shares, take_notional, used) = match target {
            FillTarget::Shares(_) => {
                let take = remaining.min(level.size);
                let cost = take.checked_mul(level.price).ok_or_else(|| out_of_range(level))?;
                (take, cost, take)
            }
            FillTarget::Notional(_) => {
                let depth = level.notional().ok_or_else(|| out_of_range(level))?;
                let take = remaining.min(depth);
                let bought = take.checked_div(level.price).ok_or_else(|| out_of_range(level))?;
                (bought, take, take)
            }
        };
        shares = shares
            .checked_add(take_shares)
            .ok_or_else(|| out_of_range(level))?;
        notional = notional
            .checked_add(take_notional)
            .ok_or_else(|| out_of_range(level))?;
        remaining -= used;
    }

    if remaining > Decimal::ZERO && order_type.requires_full_fill() {
        return Err(Error::Liquidity(format!(
            "insufficient depth: {} of {} unfilled",
            remaining,
            target.amount()
        )));
    }

    let price = notional
        .checked_div(shares)
        .ok_or_else(|| Error::upstream(None, format!("unpriceable fill: {} / {}", notional, shares)))?;
    debug!(
        side = %side,
        levels = book.len(),
        filled_shares = %shares,
        unfilled = %remaining.max(Decimal::ZERO),
        price = %price,
        "Resolved market price"
    );
    Ok(price)
}

/// Book levels whose arithmetic leaves the decimal range cannot come from a real market.
fn out_of_range(level: &PriceLevel) -> Error {
    Error::upstream(
        None,
        format!("order book level out of range: {} @ {}", level.size, level.price),
    )
}

fn opposite(side: OrderSide) -> &'static str {
    match side {
        OrderSide::Buy => "ask",
        OrderSide::Sell => "bid",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::rounding::round_normal;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn level(price: &str, size: &str) -> PriceLevel {
        PriceLevel::new(d(price), d(size))
    }

    fn asks() -> Vec<PriceLevel> {
        vec![level("0.40", "5"), level("0.45", "10")]
    }

    #[test]
    fn test_buy_shares_weighted_average() {
        let price =
            calculate_market_price(&asks(), OrderSide::Buy, FillTarget::Shares(d("8")), OrderType::Fok)
                .unwrap();

        // (0.40 * 5 + 0.45 * 3) / 8
        assert_eq!(price, d("0.41875"));
        assert_eq!(round_normal(price, 4), d("0.4188"));
    }

    #[test]
    fn test_fok_insufficient_depth() {
        let result = calculate_market_price(
            &asks(),
            OrderSide::Buy,
            FillTarget::Shares(d("20")),
            OrderType::Fok,
        );
        assert!(matches!(result, Err(Error::Liquidity(_))));
    }

    #[test]
    fn test_fak_averages_available_depth() {
        let price = calculate_market_price(
            &asks(),
            OrderSide::Buy,
            FillTarget::Shares(d("20")),
            OrderType::Fak,
        )
        .unwrap();

        // all 15 shares: (2.00 + 4.50) / 15
        assert_eq!(price, d("6.5") / d("15"));
    }

    #[test]
    fn test_buy_notional_target() {
        // $3 buys 5 @ 0.40 ($2) then $1 / 0.45 shares
        let price = calculate_market_price(
            &asks(),
            OrderSide::Buy,
            FillTarget::for_side(OrderSide::Buy, d("3")),
            OrderType::Fok,
        )
        .unwrap();

        let expected = d("3") / (d("5") + d("1") / d("0.45"));
        assert_eq!(price, expected);
        assert!(price > d("0.40") && price < d("0.45"));
    }

    #[test]
    fn test_sell_walks_bids_from_highest() {
        // unsorted on purpose
        let bids = vec![level("0.30", "100"), level("0.35", "4"), level("0.33", "6")];
        let price = calculate_market_price(
            &bids,
            OrderSide::Sell,
            FillTarget::for_side(OrderSide::Sell, d("10")),
            OrderType::Fok,
        )
        .unwrap();

        // 4 @ 0.35 + 6 @ 0.33
        assert_eq!(price, d("0.338"));
    }

    #[test]
    fn test_single_level_is_its_price() {
        let book = vec![level("0.52", "1000")];
        for order_type in [OrderType::Fok, OrderType::Fak, OrderType::Gtc] {
            let price = calculate_market_price(
                &book,
                OrderSide::Buy,
                FillTarget::Notional(d("100")),
                order_type,
            )
            .unwrap();
            assert_eq!(price, d("0.52"));
        }
    }

    #[test]
    fn test_empty_side_is_no_match() {
        for order_type in [OrderType::Fok, OrderType::Fak] {
            let result = calculate_market_price(
                &[],
                OrderSide::Sell,
                FillTarget::Shares(d("1")),
                order_type,
            );
            assert!(matches!(result, Err(Error::Liquidity(_))));
        }

        let zero_only = vec![level("0.5", "0")];
        assert!(calculate_market_price(
            &zero_only,
            OrderSide::Buy,
            FillTarget::Shares(d("1")),
            OrderType::Fak
        )
        .is_err());
    }

    #[test]
    fn test_overflowing_level_is_upstream_error() {
        let huge = vec![PriceLevel::new(d("2"), Decimal::MAX)];
        for target in [FillTarget::Notional(d("10")), FillTarget::Shares(Decimal::MAX)] {
            let result = calculate_market_price(&huge, OrderSide::Buy, target, OrderType::Fak);
            assert!(
                matches!(result, Err(Error::Upstream { status: None, .. })),
                "{:?}",
                target
            );
        }

        // The first level fits; the second overflows once it is reached.
        let wide = vec![level("0.5", "1"), PriceLevel::new(d("2"), Decimal::MAX)];
        assert!(matches!(
            calculate_market_price(
                &wide,
                OrderSide::Buy,
                FillTarget::Shares(Decimal::MAX),
                OrderType::Fak
            ),
            Err(Error::Upstream { .. })
        ));
    }

    #[test]
    fn test_exact_depth_fills_under_fok() {
        let price = calculate_market_price(
            &asks(),
            OrderSide::Buy,
            FillTarget::Shares(d("15")),
            OrderType::Fok,
        )
        .unwrap();
        assert_eq!(price, d("6.5") / d("15"));
    }
}
