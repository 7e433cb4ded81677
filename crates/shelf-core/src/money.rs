//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Fixed-Point Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    299.99 * 3 = 899.9699999999999  ❌                                   │
//! │                                                                         │
//! │  Rounding to paise after every step compounds the error when the        │
//! │  cart is recomputed on every click.                                     │
//! │                                                                         │
//! │  OUR SOLUTION: four decimal places in an i64                            │
//! │    ₹299.99 = 2_999_900 units                                            │
//! │    18% GST on any whole-paise amount is exact                           │
//! │    Rounding to paise happens only when a value is displayed            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shelf_core::money::Money;
//!
//! let price = Money::from_paise(29_999); // ₹299.99
//! let line = price * 3u32;
//! assert_eq!(line.rounded_paise(), 89_997);
//! assert_eq!(line.to_string(), "₹899.97");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Rate;

/// Internal units per rupee (four decimal places).
pub const UNITS_PER_RUPEE: i64 = 10_000;

/// Internal units per paisa.
const UNITS_PER_PAISA: i64 = UNITS_PER_RUPEE / 100;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in ten-thousandths of a rupee.
///
/// ## Design Decisions
/// - **i64 (signed)**: differences such as `total - discount` stay representable
/// - **Four decimals**: tax and whole-percent discounts on paise amounts are exact
/// - **Derives**: serde support for the storage mirror and API payloads
///
/// ## Where Money is Used
/// ```text
/// book.price (JSON number) ──► Money::from_decimal ──► CartLine.unit_price
///                                                            │
///          CartLine.line_total ◄─────────────────────────────┘
///                 │
///                 ▼
/// subtotal ──► tax / shipping / discount ──► total ──► rounded_paise() ──► UI
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from raw internal units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    /// Creates a Money value from paise (the smallest displayed unit).
    ///
    /// ## Example
    /// ```rust
    /// use shelf_core::money::Money;
    ///
    /// let price = Money::from_paise(50_001); // ₹500.01
    /// assert_eq!(price.rounded_paise(), 50_001);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise * UNITS_PER_PAISA)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * UNITS_PER_RUPEE)
    }

    /// Converts a decimal amount as it arrives in JSON (`"price": 299.99`).
    ///
    /// The value is rounded to the nearest paisa; this is the only place a
    /// float ever becomes Money. Returns `None` for NaN and infinities.
    ///
    /// ## Example
    /// ```rust
    /// use shelf_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(299.99), Some(Money::from_paise(29_999)));
    /// assert_eq!(Money::from_decimal(f64::NAN), None);
    /// ```
    pub fn from_decimal(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        let paise = (amount * 100.0).round();
        if paise.abs() > (i64::MAX / UNITS_PER_PAISA) as f64 {
            return None;
        }
        Some(Money::from_paise(paise as i64))
    }

    /// Returns the raw internal units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Rounds to whole paise, half away from zero.
    ///
    /// This is the presentation boundary: nothing inside the engine rounds.
    ///
    /// ## Example
    /// ```rust
    /// use shelf_core::money::Money;
    ///
    /// assert_eq!(Money::from_units(1_050).rounded_paise(), 11);
    /// assert_eq!(Money::from_units(1_049).rounded_paise(), 10);
    /// assert_eq!(Money::from_units(-1_050).rounded_paise(), -11);
    /// ```
    pub const fn rounded_paise(&self) -> i64 {
        let half = UNITS_PER_PAISA / 2;
        if self.0 >= 0 {
            (self.0 + half) / UNITS_PER_PAISA
        } else {
            (self.0 - half) / UNITS_PER_PAISA
        }
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negative amounts to zero.
    #[inline]
    pub const fn non_negative(self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            self
        }
    }

    /// Applies a rate and returns that share of the amount.
    ///
    /// Uses the half-up integer form `(units * bps + 5000) / 10000`. For
    /// whole-paise inputs and whole-percent rates the division is exact, so
    /// the rounding term never changes the result.
    ///
    /// ## Example
    /// ```rust
    /// use shelf_core::money::Money;
    /// use shelf_core::types::Rate;
    ///
    /// let subtotal = Money::from_rupees(600);
    /// let tax = subtotal.apply_rate(Rate::from_bps(1800)); // 18%
    /// assert_eq!(tax, Money::from_rupees(108));
    /// ```
    pub fn apply_rate(&self, rate: Rate) -> Money {
        // i128 keeps large carts from overflowing the intermediate product
        let share = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money(share as i64)
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0 * qty as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Displays the presentation-rounded amount, e.g. `₹648.00`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let paise = self.rounded_paise();
        let sign = if paise < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, (paise / 100).abs(), (paise % 100).abs())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
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

/// Multiplication by a cart quantity.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
