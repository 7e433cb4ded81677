//! # Error Types
//!
//! Domain-specific error types for shelf-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shelf-core errors (this file)                                         │
//! │  ├── CoreError        - Umbrella for cart / checkout operations        │
//! │  ├── ValidationError  - Malformed field input                          │
//! │  ├── CouponError      - Coupon lookup and eligibility                  │
//! │  └── StoreError       - Key-value mirror failures                      │
//! │                                                                         │
//! │  storefront errors (app crate)                                         │
//! │  └── ApiError         - What the UI sees (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → UI                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every fallible operation in this crate returns one of these; nothing
//! panics across the pricing/validation boundary.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Errors from cart, coupon and checkout-gate operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The book is not a line in the cart.
    #[error("Book {0} is not in the cart")]
    BookNotInCart(String),

    /// Too many attempts inside the sliding window.
    ///
    /// ## User Workflow
    /// ```text
    /// 6th payment attempt within 15 minutes
    ///      │
    ///      ▼
    /// RateLimitExceeded { retry_after_ms: 840_000 }
    ///      │
    ///      ▼
    /// UI shows: "Too many attempts, try again in 14 minutes"
    /// ```
    #[error("Too many attempts, retry after {retry_after_ms} ms")]
    RateLimitExceeded { retry_after_ms: u64 },

    /// A computed total came out negative. Indicates a caller bug.
    #[error("Pricing invariant violated: total {total} is negative")]
    ArithmeticInvariantViolation { total: Money },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Coupon error: {0}")]
    Coupon(#[from] CouponError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Each variant names the field so the UI can render the message next to it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative. Raised for caller bugs such as a
    /// negative quantity, which are never clamped.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (wrong characters, wrong length, wrong shape).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Well-formed number whose Luhn checksum does not hold.
    #[error("{field} failed checksum validation")]
    ChecksumFailed { field: String },

    /// Correctly formatted expiry date that is already in the past.
    #[error("{field} has expired")]
    Expired { field: String },
}

impl ValidationError {
    /// The form field this error belongs to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::Negative { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::ChecksumFailed { field }
            | ValidationError::Expired { field } => field,
        }
    }
}

// =============================================================================
// Coupon Error
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponError {
    /// Code is not in the coupon table.
    #[error("Invalid coupon code: {code}")]
    UnknownCoupon { code: String },

    /// Cart subtotal is below the coupon's minimum.
    ///
    /// Carries the minimum so the UI can say "Add items worth ₹1000.00".
    #[error("Coupon {code} requires a minimum order of {minimum}")]
    MinimumNotMet { code: String, minimum: Money },

    /// Coupons cannot be applied to an empty cart.
    #[error("Cannot apply a coupon to an empty cart")]
    EmptyCart,
}

// =============================================================================
// Store Error
// =============================================================================

/// Failures of the injected key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A mirrored value could not be encoded or decoded.
    #[error("Corrupt value under '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backing store refused the operation (quota, unavailable, ...).
    #[error("Store backend failed: {0}")]
    Backend(String),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
