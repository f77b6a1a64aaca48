//! Money and the total computations shared by carts and orders.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Money amount represented in cents to avoid floating point issues.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a new Money amount from cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns zero money.
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies by a quantity. Returns None on overflow.
    pub fn checked_multiply(&self, quantity: u32) -> Option<Money> {
        self.0.checked_mul(i64::from(quantity)).map(Money)
    }

    /// Adds two amounts. Returns None on overflow.
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}${}.{:02}", abs / 100, abs % 100)
    }
}

/// Error returned when a total does not fit in the money range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Total amount out of range")]
pub struct TotalOutOfRange;

/// Price of `quantity` units at `unit_price`.
pub fn line_total(quantity: u32, unit_price: Money) -> Result<Money, TotalOutOfRange> {
    unit_price.checked_multiply(quantity).ok_or(TotalOutOfRange)
}

/// Sums `(quantity, unit_price)` pairs.
///
/// Carts feed current catalog prices and orders feed their frozen purchase
/// prices; both go through this function.
pub fn sum_line_totals<I>(lines: I) -> Result<Money, TotalOutOfRange>
where
    I: IntoIterator<Item = (u32, Money)>,
{
    lines
        .into_iter()
        .try_fold(Money::zero(), |acc, (quantity, price)| {
            acc.checked_add(line_total(quantity, price)?)
                .ok_or(TotalOutOfRange)
        })
}

/// How a cart's total price is derived from its items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartPricing {
    /// Carts always total zero.
    Placeholder,
    /// Carts total the current catalog price of each item.
    #[default]
    Catalog,
}

impl CartPricing {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartPricing::Placeholder => "placeholder",
            CartPricing::Catalog => "catalog",
        }
    }
}

impl fmt::Display for CartPricing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown cart pricing mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cart pricing mode {0:?}, expected \"catalog\" or \"placeholder\"")]
pub struct UnknownCartPricing(pub String);

impl FromStr for CartPricing {
    type Err = UnknownCartPricing;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "placeholder" => Ok(CartPricing::Placeholder),
            "catalog" => Ok(CartPricing::Catalog),
            _ => Err(UnknownCartPricing(s.to_string())),
        }
    }
}
