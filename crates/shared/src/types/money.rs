//! Currency and percentage types with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations. Monetary
//! amounts are `rust_decimal::Decimal` values tagged with the owning
//! document's [`Currency`]. Rounding to a currency's minor unit uses
//! banker's rounding (`MidpointNearestEven`) and happens only at
//! aggregation boundaries.

use rust_decimal::prelude::RoundingStrategy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar
    Usd,
    /// Euro
    Eur,
    /// British Pound
    Gbp,
    /// Indonesian Rupiah
    Idr,
    /// Japanese Yen
    Jpy,
}

impl Currency {
    /// Number of minor-unit decimal places for the currency.
    ///
    /// Yen and rupiah amounts are expressed in whole units.
    #[must_use]
    pub const fn minor_units(self) -> u32 {
        match self {
            Self::Usd | Self::Eur | Self::Gbp => 2,
            Self::Idr | Self::Jpy => 0,
        }
    }

    /// Rounds an amount to this currency's minor unit.
    #[must_use]
    pub fn round(self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.minor_units(), RoundingStrategy::MidpointNearestEven)
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Usd => write!(f, "USD"),
            Self::Eur => write!(f, "EUR"),
            Self::Gbp => write!(f, "GBP"),
            Self::Idr => write!(f, "IDR"),
            Self::Jpy => write!(f, "JPY"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "GBP" => Ok(Self::Gbp),
            "IDR" => Ok(Self::Idr),
            "JPY" => Ok(Self::Jpy),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}

/// Error returned when a percentage falls outside `[0, 100]`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Percentage out of range [0, 100]: {0}")]
pub struct PercentOutOfRange(pub Decimal);

/// A percentage constrained to the closed range `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percent(Decimal);

impl Percent {
    /// A zero percentage.
    pub const ZERO: Self = Self(Decimal::ZERO);
    /// One hundred percent.
    pub const HUNDRED: Self = Self(Decimal::ONE_HUNDRED);

    /// Creates a percentage, rejecting values outside `[0, 100]`.
    pub fn new(value: Decimal) -> Result<Self, PercentOutOfRange> {
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
            return Err(PercentOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Returns the raw percentage value.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Computes this percentage of an amount, at full precision.
    #[must_use]
    pub fn of(self, amount: Decimal) -> Decimal {
        amount * self.0 / Decimal::ONE_HUNDRED
    }
}

impl std::fmt::Display for Percent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_round_bankers() {
        // Banker's rounding: ties go to the even digit
        assert_eq!(Currency::Usd.round(dec!(1.125)), dec!(1.12));
        assert_eq!(Currency::Usd.round(dec!(1.135)), dec!(1.14));
    }

    #[test]
    fn test_round_zero_decimal_currency() {
        assert_eq!(Currency::Jpy.round(dec!(100.4)), dec!(100));
    }

    #[rstest::rstest]
    #[case(Currency::Usd, 2)]
    #[case(Currency::Eur, 2)]
    #[case(Currency::Gbp, 2)]
    #[case(Currency::Idr, 0)]
    #[case(Currency::Jpy, 0)]
    fn test_minor_units(#[case] currency: Currency, #[case] expected: u32) {
        assert_eq!(currency.minor_units(), expected);
    }

    #[test]
    fn test_currency_display_and_from_str() {
        assert_eq!(Currency::Usd.to_string(), "USD");
        assert_eq!(Currency::from_str("usd").unwrap(), Currency::Usd);
        assert_eq!(Currency::from_str("GBP").unwrap(), Currency::Gbp);
        assert!(Currency::from_str("XXX").is_err());
        assert!(Currency::from_str("").is_err());
    }

    #[test]
    fn test_percent_range() {
        assert!(Percent::new(dec!(0)).is_ok());
        assert!(Percent::new(dec!(100)).is_ok());
        assert!(Percent::new(dec!(50.5)).is_ok());
        assert_eq!(
            Percent::new(dec!(-0.01)),
            Err(PercentOutOfRange(dec!(-0.01)))
        );
        assert_eq!(
            Percent::new(dec!(100.01)),
            Err(PercentOutOfRange(dec!(100.01)))
        );
    }

    #[test]
    fn test_percent_of() {
        let pct = Percent::new(dec!(10)).unwrap();
        assert_eq!(pct.of(dec!(200)), dec!(20));

        // Full precision: no rounding at this stage
        let pct = Percent::new(dec!(8)).unwrap();
        assert_eq!(pct.of(dec!(180)), dec!(14.4));
    }
}
