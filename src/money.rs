//! Money
//!
//! Every amount in the marketplace is a whole number of Rupiah. Amounts are
//! unsigned, so a negative price or total cannot be represented, and all
//! arithmetic saturates rather than wrapping.

use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign},
};

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::{Deserialize, Serialize};

/// Currency all marketplace amounts are denominated in.
pub const CURRENCY: &Currency = iso::IDR;

/// A non-negative amount of whole Rupiah.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Rupiah(u64);

impl Rupiah {
    /// Zero Rupiah.
    pub const ZERO: Self = Self(0);

    /// Create an amount from whole Rupiah.
    #[must_use]
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    /// Amount in whole Rupiah.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Check whether the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Multiply a unit price by a quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(u64::from(quantity)))
    }

    /// Subtract, flooring at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Apply a percentage, rounding half-up to the nearest whole Rupiah.
    #[must_use]
    pub fn percent(self, percent: Percentage) -> Self {
        // decimal_percentage doesn't expose the inner Decimal
        self.apply_rate(percent * Decimal::ONE)
    }

    /// Multiply by a fractional rate (e.g. `0.005` for 0.5%), rounding half-up to
    /// the nearest whole Rupiah.
    ///
    /// Negative results floor at zero; results too large to represent saturate.
    #[must_use]
    pub fn apply_rate(self, rate: Decimal) -> Self {
        let Some(applied) = rate.checked_mul(Decimal::from(self.0)) else {
            return Self(u64::MAX);
        };

        Self::from_decimal(applied).unwrap_or(if applied.is_sign_negative() {
            Self::ZERO
        } else {
            Self(u64::MAX)
        })
    }

    /// Convert a decimal amount of Rupiah, rounding half-up to a whole Rupiah.
    ///
    /// Returns `None` for negative amounts or amounts that do not fit.
    #[must_use]
    pub fn from_decimal(amount: Decimal) -> Option<Self> {
        let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        if rounded.is_zero() {
            return Some(Self::ZERO);
        }

        if rounded.is_sign_negative() {
            return None;
        }

        rounded.to_u64().map(Self)
    }

    /// Convert a floating point amount received over the wire.
    ///
    /// Returns `None` for non-finite or negative values.
    #[must_use]
    pub fn from_f64(amount: f64) -> Option<Self> {
        if !amount.is_finite() || amount < 0.0 {
            return None;
        }

        Decimal::from_f64(amount).and_then(Self::from_decimal)
    }

    /// Amount as a [`Money`] value, for formatting.
    #[must_use]
    pub fn to_money(self) -> Money<'static, Currency> {
        Money::from_major(i64::try_from(self.0).unwrap_or(i64::MAX), CURRENCY)
    }
}

impl From<u64> for Rupiah {
    fn from(amount: u64) -> Self {
        Self(amount)
    }
}

impl Add for Rupiah {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Rupiah {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Rupiah {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Rupiah> for Rupiah {
    fn sum<I: Iterator<Item = &'a Rupiah>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for Rupiah {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_money())
    }
}
