//! Invoice amounts.
//!
//! Every price, fee, discount and tax flowing through the engine is a
//! [`Money`]: a `rust_decimal::Decimal` pinned to 4 decimal places. Amounts
//! are re-pinned after each operation, so two invoices with the same lines
//! always produce byte-identical totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

/// An invoice amount in currency units, kept at 4 decimal places.
///
/// Negative amounts are allowed: an invalid unit price must survive parsing
/// so the validator can report it, and a discount larger than the subtotal
/// yields a negative taxable base.
///
/// The operator impls panic on `Decimal` overflow. Inputs of unknown size
/// go through the `checked_*` methods first; the validator does this for
/// every line so that a valid invoice stays far below the overflow range.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use invoice_pricing::Money;
///
/// let price = Money::from_str("10.5").unwrap();
/// assert_eq!(price.to_string(), "10.5000");
/// assert_eq!((price * 2).to_string(), "21.0000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    /// Decimal places every amount is pinned to.
    pub const SCALE: u32 = 4;

    pub const ZERO: Self = Money(Decimal::ZERO);

    /// Largest amount, in whole units, a line, an invoice subtotal or a
    /// configured fee may reach. Keeps every later sum and rate product well
    /// inside the `Decimal` range.
    pub const LIMIT_UNITS: i64 = 1_000_000_000_000_000;

    pub fn limit() -> Self {
        Money::from_units(Self::LIMIT_UNITS)
    }

    /// Pins `value` to [`Money::SCALE`] places, rounding half away from zero.
    pub fn new(value: Decimal) -> Self {
        let mut pinned = value;
        pinned.rescale(Self::SCALE);
        Money(pinned)
    }

    /// Creates a whole-unit amount.
    pub fn from_units(units: i64) -> Self {
        Money::new(Decimal::from(units))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns `true` if this value is below zero.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Multiplies this amount by a fractional rate such as `0.07`.
    ///
    /// The exact product is rounded to 4 places, half away from zero:
    /// `0.0005 * 0.1` becomes `0.0001`, `-0.0005 * 0.1` becomes `-0.0001`.
    pub fn apply_rate(self, rate: Decimal) -> Self {
        Money::new(self.0 * rate)
    }

    /// `self + rhs`, or `None` when the sum leaves the `Decimal` range.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Money::new)
    }

    /// `self * qty`, or `None` when the product leaves the `Decimal` range.
    pub fn checked_mul(self, qty: i64) -> Option<Self> {
        self.0.checked_mul(Decimal::from(qty)).map(Money::new)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Money::new(value)
    }
}

/// Parses a price cell such as `" 19.99 "`; surrounding whitespace is ignored.
impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Money::new)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Money::new(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
        self.0.rescale(Self::SCALE);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Money::new(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
        self.0.rescale(Self::SCALE);
    }
}

/// Scales a unit amount by an item quantity.
impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, qty: i64) -> Self::Output {
        Money::new(self.0 * Decimal::from(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

/// Amounts travel as strings (`"274.0000"`) so no float ever touches them.
impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:.4}", self.0))
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
