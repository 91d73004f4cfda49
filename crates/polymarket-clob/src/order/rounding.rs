//! Tick sizes, per-tick rounding rules and on-chain amount conversion.
//!
//! All arithmetic is exact base-10 `Decimal`; rounding to `d` places is the
//! scale-multiply-round-descale operation without any binary floating drift.

use alloy_primitives::U256;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::{UnsupportedConfig, ValidationError};

/// On-chain collateral and conditional tokens use 6 decimals.
pub const TOKEN_DECIMALS: u32 = 6;

/// Minimum price increment a market accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSize {
    /// "0.1"
    Tenth,
    /// "0.01"
    Hundredth,
    /// "0.001"
    Thousandth,
    /// "0.0001"
    TenThousandth,
}

/// Decimal places for price, size and amount under one tick size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundConfig {
    pub price: u32,
    pub size: u32,
    pub amount: u32,
}

impl TickSize {
    pub const ALL: [TickSize; 4] = [
        TickSize::Tenth,
        TickSize::Hundredth,
        TickSize::Thousandth,
        TickSize::TenThousandth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TickSize::Tenth => "0.1",
            TickSize::Hundredth => "0.01",
            TickSize::Thousandth => "0.001",
            TickSize::TenThousandth => "0.0001",
        }
    }

    pub fn as_decimal(&self) -> Decimal {
        match self {
            TickSize::Tenth => Decimal::new(1, 1),
            TickSize::Hundredth => Decimal::new(1, 2),
            TickSize::Thousandth => Decimal::new(1, 3),
            TickSize::TenThousandth => Decimal::new(1, 4),
        }
    }

    /// Rounding rules for orders priced at this tick size.
    pub fn round_config(&self) -> RoundConfig {
        match self {
            TickSize::Tenth => RoundConfig {
                price: 1,
                size: 2,
                amount: 3,
            },
            TickSize::Hundredth => RoundConfig {
                price: 2,
                size: 2,
                amount: 4,
            },
            TickSize::Thousandth => RoundConfig {
                price: 3,
                size: 2,
                amount: 5,
            },
            TickSize::TenThousandth => RoundConfig {
                price: 4,
                size: 2,
                amount: 6,
            },
        }
    }

    /// True when `self` is a finer increment than `other`.
    pub fn is_smaller_than(&self, other: &TickSize) -> bool {
        self.as_decimal() < other.as_decimal()
    }
}

impl PartialOrd for TickSize {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TickSize {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_decimal().cmp(&other.as_decimal())
    }
}

impl std::fmt::Display for TickSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TickSize {
    type Err = UnsupportedConfig;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|_| UnsupportedConfig::TickSize(s.to_string()))?
            .normalize();

        TickSize::ALL
            .into_iter()
            .find(|tick| tick.as_decimal() == value)
            .ok_or_else(|| UnsupportedConfig::TickSize(s.to_string()))
    }
}

impl Serialize for TickSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TickSize {
    /// Accepts `"0.01"` as well as the bare number `0.01` the API sometimes returns.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
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
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Floor to `digits` decimal places.
pub fn round_down(x: Decimal, digits: u32) -> Decimal {
    x.round_dp_with_strategy(digits, RoundingStrategy::ToNegativeInfinity)
}

/// Round half away from zero to `digits` decimal places.
pub fn round_normal(x: Decimal, digits: u32) -> Decimal {
    x.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero)
}

/// Ceil to `digits` decimal places.
pub fn round_up(x: Decimal, digits: u32) -> Decimal {
    x.round_dp_with_strategy(digits, RoundingStrategy::ToPositiveInfinity)
}

/// Significant decimal places, ignoring trailing zeros.
pub fn decimal_places(x: Decimal) -> u32 {
    x.normalize().scale()
}

/// Convert a human amount to 6-decimal base units, rounding to the nearest unit.
pub fn to_token_decimals(x: Decimal) -> Result<U256, ValidationError> {
    let scaled = x
        .checked_mul(Decimal::from(10u64.pow(TOKEN_DECIMALS)))
        .ok_or(ValidationError::AmountOverflow {
            field: "amount",
            value: x,
        })?;

    let units = if decimal_places(scaled) > 0 {
        round_normal(scaled, 0)
    } else {
        scaled
    };

    units
        .to_u128()
        .map(U256::from)
        .ok_or(ValidationError::NonPositiveAmount {
            field: "amount",
            value: x,
        })
}
