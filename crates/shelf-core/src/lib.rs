//! # shelf-core: Pure Checkout Logic for the Shelf Bookstore
//!
//! This crate holds the parts of the storefront that have real rules:
//! cart pricing, coupons, payment field validation and attempt limiting.
//! Everything here is synchronous and free of I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shelf Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Storefront UI (browser)                      │   │
//! │  │    Catalog ──► Cart ──► Coupon ──► Payment form ──► Receipt     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    storefront (app crate)                       │   │
//! │  │    get_cart, apply_coupon, submit_payment, ...                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shelf-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │   cart   │ │ pricing  │ │  coupon  │ │ validation       │  │   │
//! │  │   │CartStore │ │ Pricing  │ │CouponBook│ │ Luhn, expiry,    │  │   │
//! │  │   │ Wishlist │ │ Result   │ │          │ │ CVV, UPI         │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                         ┌──────────────┐                        │   │
//! │  │                         │  rate_limit  │                        │   │
//! │  │                         └──────────────┘                        │   │
//! │  │   NO I/O • NO ASYNC • NO GLOBALS (stores are injected)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Fixed-point Money (four decimals, rounded only for display)
//! - [`types`] - Cart lines, remote cart shape, card types
//! - [`cart`] - Cart, CartStore and the key-value mirror
//! - [`pricing`] - Subtotal, shipping, tax, discount, total
//! - [`coupon`] - Coupon table and eligibility
//! - [`validation`] - Card / expiry / CVV / UPI checks
//! - [`rate_limit`] - Sliding-window attempt limiter
//! - [`wishlist`] - Saved books
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use shelf_core::cart::{CartStore, MemoryStore};
//! use shelf_core::Money;
//!
//! let mut store = CartStore::new(MemoryStore::new());
//! store.add("book-1", Money::from_rupees(300), 2).unwrap();
//! store.apply_coupon("welcome10").unwrap();
//!
//! let pricing = store.pricing();
//! assert_eq!(pricing.total.to_string(), "₹648.00");
//! ```

pub mod cart;
pub mod coupon;
pub mod error;
pub mod money;
pub mod pricing;
pub mod rate_limit;
pub mod types;
pub mod validation;
pub mod wishlist;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartStore, KeyValueStore, MemoryStore};
pub use coupon::{apply_coupon, Coupon, CouponBook, CouponKind, CouponPolicy};
pub use error::{CoreError, CoreResult, CouponError, StoreError, ValidationError};
pub use money::Money;
pub use pricing::{compute_pricing, PricingResult, PricingRules, PricingTotals};
pub use rate_limit::{RateLimitDecision, RateLimitPolicy, RateLimiter};
pub use types::*;
pub use wishlist::Wishlist;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Smallest quantity a cart line can hold.
pub const MIN_LINE_QUANTITY: u32 = 1;

/// Largest quantity a cart line can hold.
///
/// ## Business Reason
/// Stops a fat-fingered "999" from becoming a bulk order.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// Largest rupee amount accepted for a catalog price or a configured fee.
///
/// Keeps `price × 99` and every cart total far inside `i64` internal units.
pub const MAX_AMOUNT_RUPEES: i64 = 10_000_000;

/// GST applied to the subtotal, in basis points (18%).
pub const GST_RATE_BPS: u32 = 1800;

/// Orders strictly above this subtotal ship free.
pub const FREE_SHIPPING_THRESHOLD_RUPEES: i64 = 500;

/// Domestic shipping fee below the threshold.
pub const FLAT_SHIPPING_FEE_RUPEES: i64 = 50;

/// Payment attempts allowed per identity inside the window.
pub const RATE_LIMIT_MAX_ATTEMPTS: usize = 5;

/// Sliding window for payment attempts (15 minutes).
pub const RATE_LIMIT_WINDOW_MS: u64 = 15 * 60 * 1000;
