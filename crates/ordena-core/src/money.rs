//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Centavos                                         │
//! │    Every amount is an i64 count of the smallest currency unit.          │
//! │    Sums, differences and products are exact; the only place rounding    │
//! │    happens is explicit division (report averages) and percentage        │
//! │    discounts, both half-up at two fraction digits.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ordena_core::money::Money;
//!
//! let price = Money::from_cents(10_99); // R$ 10.99
//! let line = price * 3;                 // R$ 32.97
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in centavos (the smallest currency unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: allows negative values for refunds and adjustments
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Transparent serde**: serializes as a plain integer
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (reais and centavos).
    ///
    /// For negative amounts only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -R$ 5.50, not -R$ 4.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies by a quantity (line total = unit price × quantity).
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Computes a percentage of this amount, in basis points, rounding
    /// half-up to the centavo.
    ///
    /// 1000 bps = 10%. Uses i128 internally so large order totals cannot
    /// overflow.
    ///
    /// ```rust
    /// use ordena_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(100_000); // R$ 1000.00
    /// assert_eq!(subtotal.percentage_bps(1000).cents(), 10_000); // R$ 100.00
    /// ```
    pub fn percentage_bps(&self, bps: u32) -> Money {
        let part = (self.0 as i128 * bps as i128 + 5000) / 10_000;
        Money(part as i64)
    }

    /// Divides by an integer count, rounding half away from zero to the
    /// centavo.
    ///
    /// Used for report averages (sum of totals / order count). Returns zero
    /// when `count` is zero rather than panicking; callers report an empty
    /// period as an average of zero. Negative amounts round on magnitude,
    /// so `-2.5` centavos becomes `-3`.
    pub fn div_round(&self, count: i64) -> Money {
        if count == 0 {
            return Money::zero();
        }
        let negative = (self.0 < 0) != (count < 0);
        let amount = (self.0 as i128).unsigned_abs();
        let divisor = (count as i128).unsigned_abs();
        let rounded = ((amount + divisor / 2) / divisor) as i64;
        Money(if negative { -rounded } else { rounded })
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display: `R$ 10.99`. Frontend formatting owns localization.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}R$ {}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
