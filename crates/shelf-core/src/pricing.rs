//! # Pricing Engine
//!
//! Derives subtotal, shipping, tax, discount and total from a cart snapshot
//! and an optional coupon. Pure: nothing is cached, so the result can never
//! go stale.
//!
//! ## Calculation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subtotal = Σ unit_price × quantity                                     │
//! │                                                                         │
//! │  shipping = 0   if subtotal > ₹500 or coupon is FREESHIP                │
//! │           = ₹50 otherwise                                               │
//! │                                                                         │
//! │  tax      = subtotal × 18%        (before discount)                     │
//! │                                                                         │
//! │  discount = percentage → subtotal × pct                                 │
//! │             fixed      → min(value, subtotal)                           │
//! │             freeship   → 0                                              │
//! │                                                                         │
//! │  total    = subtotal + shipping + tax − discount   (never below 0)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use shelf_core::{apply_coupon, compute_pricing, Cart, Money};
//!
//! let mut cart = Cart::new();
//! cart.upsert("b1", Money::from_rupees(300), 2).unwrap();
//! let coupon = apply_coupon("WELCOME10", &cart).unwrap();
//!
//! let pricing = compute_pricing(&cart, Some(&coupon));
//! assert_eq!(pricing.subtotal, Money::from_rupees(600));
//! assert_eq!(pricing.tax_amount, Money::from_rupees(108));
//! assert_eq!(pricing.shipping, Money::zero());
//! assert_eq!(pricing.discount_amount, Money::from_rupees(60));
//! assert_eq!(pricing.total, Money::from_rupees(648));
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::coupon::Coupon;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Rate;
use crate::{FLAT_SHIPPING_FEE_RUPEES, FREE_SHIPPING_THRESHOLD_RUPEES, GST_RATE_BPS};

// =============================================================================
// Pricing Rules
// =============================================================================

/// The store-wide constants the engine prices with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRules {
    pub tax_rate: Rate,
    /// Shipping is free when the subtotal is strictly above this.
    pub free_shipping_threshold: Money,
    pub flat_shipping_fee: Money,
}

impl Default for PricingRules {
    /// 18% GST, free shipping above ₹500, otherwise ₹50.
    fn default() -> Self {
        PricingRules {
            tax_rate: Rate::from_bps(GST_RATE_BPS),
            free_shipping_threshold: Money::from_rupees(FREE_SHIPPING_THRESHOLD_RUPEES),
            flat_shipping_fee: Money::from_rupees(FLAT_SHIPPING_FEE_RUPEES),
        }
    }
}

impl PricingRules {
    /// Prices `cart` with an optional applied coupon.
    ///
    /// The coupon is trusted as given: eligibility is the caller's concern
    /// (see [`crate::cart::CartStore`]).
    pub fn compute(&self, cart: &Cart, coupon: Option<&Coupon>) -> PricingResult {
        let subtotal = cart.subtotal();

        let free_shipping = subtotal > self.free_shipping_threshold
            || coupon.is_some_and(Coupon::waives_shipping);
        let shipping = if free_shipping {
            Money::zero()
        } else {
            self.flat_shipping_fee
        };

        let tax_amount = subtotal.apply_rate(self.tax_rate);
        let discount_amount = coupon.map_or(Money::zero(), |c| c.discount_on(subtotal));

        let raw_total = subtotal + shipping + tax_amount - discount_amount;
        debug_assert!(
            !raw_total.is_negative(),
            "negative total {raw_total} for subtotal {subtotal}"
        );

        PricingResult {
            subtotal,
            shipping,
            tax_amount,
            discount_amount,
            total: raw_total.non_negative(),
        }
    }
}

/// Prices `cart` with the default rules.
pub fn compute_pricing(cart: &Cart, coupon: Option<&Coupon>) -> PricingResult {
    PricingRules::default().compute(cart, coupon)
}

// =============================================================================
// Pricing Result
// =============================================================================

/// Full-precision pricing breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PricingResult {
    pub subtotal: Money,
    pub shipping: Money,
    pub tax_amount: Money,
    pub discount_amount: Money,
    pub total: Money,
}

impl PricingResult {
    /// Rounds every amount to paise for display.
    pub fn totals(&self) -> PricingTotals {
        PricingTotals {
            subtotal_paise: self.subtotal.rounded_paise(),
            shipping_paise: self.shipping.rounded_paise(),
            tax_paise: self.tax_amount.rounded_paise(),
            discount_paise: self.discount_amount.rounded_paise(),
            total_paise: self.total.rounded_paise(),
        }
    }

    /// Checks that the parts add up and nothing is negative.
    pub fn check_invariants(&self) -> CoreResult<()> {
        let expected = self.subtotal + self.shipping + self.tax_amount - self.discount_amount;
        if expected.is_negative() || expected != self.total {
            return Err(CoreError::ArithmeticInvariantViolation { total: expected });
        }
        Ok(())
    }
}

/// Presentation-rounded totals, in paise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PricingTotals {
    pub subtotal_paise: i64,
    pub shipping_paise: i64,
    pub tax_paise: i64,
    pub discount_paise: i64,
    pub total_paise: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coupon::{apply_coupon, CouponBook, CouponKind};

    fn cart_of(lines: &[(&str, i64, i64)]) -> Cart {
        let mut cart = Cart::new();
        for (id, paise, qty) in lines {
            cart.upsert(*id, Money::from_paise(*paise), *qty).unwrap();
        }
        cart
    }

    #[test]
    fn test_reference_scenario() {
        let cart = cart_of(&[("b1", 30_000, 2)]);
        let coupon = apply_coupon("WELCOME10", &cart).unwrap();
        let pricing = compute_pricing(&cart, Some(&coupon));

        assert_eq!(pricing.subtotal, Money::from_rupees(600));
        assert_eq!(pricing.tax_amount, Money::from_rupees(108));
        assert_eq!(pricing.shipping, Money::zero());
        assert_eq!(pricing.discount_amount, Money::from_rupees(60));
        assert_eq!(pricing.total, Money::from_rupees(648));
        assert_eq!(pricing.totals().total_paise, 64_800);
    }

    #[test]
    fn test_subtotal_is_exact_sum() {
        let cart = cart_of(&[("a", 29_999, 3), ("b", 1, 99), ("c", 0, 5)]);
        let pricing = compute_pricing(&cart, None);
        assert_eq!(pricing.subtotal, Money::from_paise(29_999 * 3 + 99));
    }

    #[test]
    fn test_shipping_threshold_is_strict() {
        let at = compute_pricing(&cart_of(&[("a", 50_000, 1)]), None);
        assert_eq!(at.shipping, Money::from_rupees(50));

        let above = compute_pricing(&cart_of(&[("a", 50_001, 1)]), None);
        assert_eq!(above.shipping, Money::zero());
    }

    #[test]
    fn test_empty_cart_still_quotes_shipping() {
        let pricing = compute_pricing(&Cart::new(), None);
        assert_eq!(pricing.subtotal, Money::zero());
        assert_eq!(pricing.shipping, Money::from_rupees(50));
        assert_eq!(pricing.total, Money::from_rupees(50));
    }

    #[test]
    fn test_tax_ignores_discount_and_shipping() {
        let cart = cart_of(&[("a", 120_000, 1)]);
        let without = compute_pricing(&cart, None);
        let save = apply_coupon("SAVE50", &cart).unwrap();
        let with = compute_pricing(&cart, Some(&save));

        assert_eq!(without.tax_amount, with.tax_amount);
        assert_eq!(with.tax_amount, Money::from_rupees(216));
        assert_eq!(with.discount_amount, Money::from_rupees(50));
        assert_eq!(with.total, Money::from_rupees(1200 + 216 - 50));
    }

    #[test]
    fn test_tax_keeps_sub_paise_precision() {
        let cart = cart_of(&[("a", 50_001, 1)]);
        let pricing = compute_pricing(&cart, None);
        // 500.01 × 0.18 = 90.0018
        assert_eq!(pricing.tax_amount.units(), 900_018);
        assert_eq!(pricing.totals().tax_paise, 9_000);
    }

    #[test]
    fn test_free_shipping_coupon() {
        let cart = cart_of(&[("a", 10_000, 1)]);
        let coupon = apply_coupon("freeship", &cart).unwrap();
        let pricing = compute_pricing(&cart, Some(&coupon));

        assert_eq!(pricing.shipping, Money::zero());
        assert_eq!(pricing.discount_amount, Money::zero());
        assert_eq!(pricing.subtotal, Money::from_rupees(100));
        assert_eq!(pricing.total, Money::from_rupees(118));
    }

    #[test]
    fn test_fixed_discount_capped_at_subtotal() {
        // Bypass the minimum check to exercise the cap directly
        let generous = CouponBook::new(vec![crate::coupon::Coupon::new(
            "BIG",
            CouponKind::Fixed(Money::from_rupees(5000)),
            Money::zero(),
        )]);
        let cart = cart_of(&[("a", 3_000, 1)]);
        let coupon = generous.apply("BIG", &cart).unwrap();
        let pricing = compute_pricing(&cart, Some(&coupon));

        assert_eq!(pricing.discount_amount, pricing.subtotal);
        assert!(!pricing.total.is_negative());
        assert!(pricing.check_invariants().is_ok());
    }

    #[test]
    fn test_idempotent() {
        let cart = cart_of(&[("a", 33_333, 7), ("b", 19_999, 2)]);
        let coupon = apply_coupon("WELCOME10", &cart).unwrap();
        let first = compute_pricing(&cart, Some(&coupon));
        let second = compute_pricing(&cart, Some(&coupon));
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_rules() {
        let rules = PricingRules {
            tax_rate: Rate::from_percent(5),
            free_shipping_threshold: Money::from_rupees(1000),
            flat_shipping_fee: Money::from_rupees(40),
        };
        let pricing = rules.compute(&cart_of(&[("a", 60_000, 1)]), None);
        assert_eq!(pricing.shipping, Money::from_rupees(40));
        assert_eq!(pricing.tax_amount, Money::from_rupees(30));
        assert_eq!(pricing.total, Money::from_rupees(670));
    }

    #[test]
    fn test_check_invariants_detects_tampering() {
        let mut pricing = compute_pricing(&cart_of(&[("a", 10_000, 1)]), None);
        pricing.discount_amount = Money::from_rupees(1000);
        assert!(matches!(
            pricing.check_invariants(),
            Err(CoreError::ArithmeticInvariantViolation { .. })
        ));
    }
}
