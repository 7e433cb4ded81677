//! # Coupons
//!
//! The static coupon table and the rules for applying a code to a cart.
//!
//! ## Coupon Table
//! ```text
//! ┌───────────┬───────────────┬──────────┬───────────────────┐
//! │ Code      │ Kind          │ Value    │ Minimum subtotal  │
//! ├───────────┼───────────────┼──────────┼───────────────────┤
//! │ WELCOME10 │ percentage    │ 10%      │ ₹500              │
//! │ SAVE50    │ fixed         │ ₹50      │ ₹1000             │
//! │ FREESHIP  │ free-shipping │ -        │ ₹0                │
//! └───────────┴───────────────┴──────────┴───────────────────┘
//! ```
//!
//! ## Applying a Code
//! ```text
//! "welcome10" ──► trim + uppercase ──► lookup ──┬── missing? → UnknownCoupon
//!                                               │
//!                                               ▼
//!                            subtotal < minimum? → MinimumNotMet { minimum }
//!                                               │
//!                                               ▼
//!                                         Ok(Coupon)
//! ```

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::CouponError;
use crate::money::Money;
use crate::types::Rate;

// =============================================================================
// Coupon
// =============================================================================

/// What a coupon gives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "discountValue", rename_all = "kebab-case")]
#[ts(export)]
pub enum CouponKind {
    /// A share of the subtotal.
    Percentage(Rate),
    /// A flat amount off, never more than the subtotal.
    Fixed(Money),
    /// Shipping waived; no discount line.
    FreeShipping,
}

/// A resolved coupon from the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Coupon {
    /// Always upper-case.
    pub code: String,
    pub kind: CouponKind,
    pub minimum_subtotal: Money,
}

impl Coupon {
    pub fn new(code: &str, kind: CouponKind, minimum_subtotal: Money) -> Self {
        Coupon {
            code: normalize_code(code),
            kind,
            minimum_subtotal,
        }
    }

    /// Whether a cart with this subtotal qualifies.
    #[inline]
    pub fn is_eligible(&self, subtotal: Money) -> bool {
        subtotal >= self.minimum_subtotal
    }

    /// Discount this coupon grants on `subtotal`.
    ///
    /// Fixed discounts are capped at the subtotal so a total can never go
    /// negative because of a coupon.
    pub fn discount_on(&self, subtotal: Money) -> Money {
        match self.kind {
            CouponKind::Percentage(rate) => subtotal.apply_rate(rate),
            CouponKind::Fixed(amount) => amount.min(subtotal),
            CouponKind::FreeShipping => Money::zero(),
        }
    }

    #[inline]
    pub fn waives_shipping(&self) -> bool {
        matches!(self.kind, CouponKind::FreeShipping)
    }
}

/// Trims and upper-cases a user-entered code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

// =============================================================================
// Coupon Policy
// =============================================================================

/// What happens to an applied coupon when the cart later shrinks below its
/// minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponPolicy {
    /// Re-check after every cart change and drop the coupon once the cart no
    /// longer qualifies.
    #[default]
    Revalidate,
    /// Keep the coupon until it is removed or the cart is emptied.
    Sticky,
}

impl std::str::FromStr for CouponPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "revalidate" => Ok(CouponPolicy::Revalidate),
            "sticky" => Ok(CouponPolicy::Sticky),
            other => Err(format!(
                "Unknown coupon policy: '{}'. Valid options: revalidate, sticky",
                other
            )),
        }
    }
}

// =============================================================================
// Coupon Book
// =============================================================================

/// An immutable coupon table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponBook {
    coupons: Vec<Coupon>,
}

impl CouponBook {
    pub fn new(coupons: Vec<Coupon>) -> Self {
        CouponBook { coupons }
    }

    /// The storefront's built-in table.
    pub fn standard() -> Self {
        CouponBook::new(vec![
            Coupon::new(
                "WELCOME10",
                CouponKind::Percentage(Rate::from_percent(10)),
                Money::from_rupees(500),
            ),
            Coupon::new(
                "SAVE50",
                CouponKind::Fixed(Money::from_rupees(50)),
                Money::from_rupees(1000),
            ),
            Coupon::new("FREESHIP", CouponKind::FreeShipping, Money::zero()),
        ])
    }

    /// Case-insensitive lookup.
    pub fn lookup(&self, code: &str) -> Option<&Coupon> {
        let code = normalize_code(code);
        self.coupons.iter().find(|c| c.code == code)
    }

    /// Resolves `code` for a cart with the given subtotal.
    pub fn validate(&self, code: &str, subtotal: Money) -> Result<Coupon, CouponError> {
        let coupon = self
            .lookup(code)
            .ok_or_else(|| CouponError::UnknownCoupon {
                code: normalize_code(code),
            })?;

        if !coupon.is_eligible(subtotal) {
            return Err(CouponError::MinimumNotMet {
                code: coupon.code.clone(),
                minimum: coupon.minimum_subtotal,
            });
        }

        Ok(coupon.clone())
    }

    /// Resolves `code` against a cart. Empty carts never take a coupon.
    pub fn apply(&self, code: &str, cart: &Cart) -> Result<Coupon, CouponError> {
        if cart.is_empty() {
            return Err(CouponError::EmptyCart);
        }
        self.validate(code, cart.subtotal())
    }
}

impl Default for CouponBook {
    fn default() -> Self {
        CouponBook::standard()
    }
}

/// Applies a code from the standard table to `cart`.
///
/// ## Example
/// ```rust
/// use shelf_core::{apply_coupon, Cart, CouponError, Money};
///
/// let mut cart = Cart::new();
/// cart.upsert("b1", Money::from_rupees(300), 2).unwrap();
///
/// let coupon = apply_coupon("welcome10", &cart).unwrap();
/// assert_eq!(coupon.code, "WELCOME10");
///
/// assert!(matches!(
///     apply_coupon("SAVE50", &cart),
///     Err(CouponError::MinimumNotMet { .. })
/// ));
/// ```
pub fn apply_coupon(code: &str, cart: &Cart) -> Result<Coupon, CouponError> {
    static STANDARD: OnceLock<CouponBook> = OnceLock::new();
    STANDARD.get_or_init(CouponBook::standard).apply(code, cart)
}

// =============================================================================
// Unit Tests
// =============================================================================
