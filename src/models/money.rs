//! Money type for budget and expenditure amounts
//!
//! Stored as integer cents so opex/capex sums are exact; only derived
//! figures such as per-month budget shares and ratios are computed as f64.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};
use thiserror::Error;

/// An amount in cents (hundredths of the currency unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Largest amount accepted from input or stored on a record: one trillion units
    ///
    /// Keeps the sum of any realistic number of records far inside `i64`.
    pub const MAX: Money = Money::from_units(1_000_000_000_000);

    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use capex_ledger::models::Money;
    /// let amount = Money::from_cents(1050); // 10.50
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a Money amount from whole currency units
    ///
    /// # Examples
    /// ```
    /// use capex_ledger::models::Money;
    /// let budget = Money::from_units(900_000);
    /// assert_eq!(budget.cents(), 90_000_000);
    /// ```
    pub const fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Whether the magnitude is above [`Money::MAX`]
    pub const fn exceeds_max(&self) -> bool {
        self.0.unsigned_abs() > Self::MAX.0 as u64
    }

    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Sum `amounts`, or `None` if the total leaves the `i64` range
    pub fn checked_sum<I: IntoIterator<Item = Self>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Self::zero(), |total, amount| total.checked_add(amount))
    }

    /// The amount in currency units as a float, for ratios and even splits
    pub fn to_units(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Parse an amount typed by a user
    ///
    /// A bare integer is whole units ("9000" is 9000.00). Up to two decimal
    /// places are accepted, as are a leading `$` and `,` digit grouping.
    /// Amounts beyond [`Money::MAX`] are rejected.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let trimmed = s.trim();
        let invalid = || MoneyParseError::InvalidFormat(trimmed.to_string());

        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let digits: String = rest
            .strip_prefix('$')
            .unwrap_or(rest)
            .chars()
            .filter(|c| *c != ',')
            .collect();

        let (whole, fraction) = digits.split_once('.').unwrap_or((&digits, ""));
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if fraction.len() > 2 {
            return Err(MoneyParseError::TooPrecise(trimmed.to_string()));
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let fraction: i64 = format!("{:0<2}", fraction).parse().map_err(|_| invalid())?;
        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction))
            .ok_or_else(invalid)?;

        let money = Self(if negative { -cents } else { cents });
        if money.exceeds_max() {
            return Err(MoneyParseError::OutOfRange(trimmed.to_string()));
        }
        Ok(money)
    }

    /// Format with a currency symbol, e.g. `-€12.05`
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{}{}{}.{:02}", sign, symbol, abs / 100, abs % 100)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with_symbol("$"))
    }
}

/// Saturates at the `i64` bounds; totals that must be exact use
/// [`Money::checked_sum`]
impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

/// Serde adapter writing `Money` as a float in currency units
///
/// Used by derived report payloads, which mix exact sums with the
/// straight-line budget share and must present both on the same scale.
pub mod as_units {
    use super::Money;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(money.to_units())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let units = f64::deserialize(deserializer)?;
        Ok(Money::from_cents((units * 100.0).round() as i64))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyParseError {
    #[error("Invalid money format: {0}")]
    InvalidFormat(String),
    #[error("At most two decimal places are allowed: {0}")]
    TooPrecise(String),
    #[error("Amount is larger than 1,000,000,000,000: {0}")]
    OutOfRange(String),
}
