//! # Domain Types
//!
//! Core domain types shared by the pricing, coupon and validation modules.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    CartLine     │   │ RemoteCartItem  │   │   CardDetails   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  book_id        │   │  book._id       │   │  number         │       │
//! │  │  unit_price     │◄──│  book.price     │   │  expiry (MM/YY) │       │
//! │  │  quantity 1..99 │   │  quantity       │   │  cvv            │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │      Rate       │   │    CardType     │                             │
//! │  │  bps (u32)      │   │  visa, amex...  │                             │
//! │  │  1800 = 18%     │   │  unknown        │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{validate_unit_price, ValidationResult};
use crate::{MAX_LINE_QUANTITY, MIN_LINE_QUANTITY};

// =============================================================================
// Rate
// =============================================================================

/// A rate in basis points (1 bps = 0.01%).
///
/// Used for the GST rate (1800 = 18%) and percentage coupons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a whole percentage.
    #[inline]
    pub const fn from_percent(pct: u32) -> Self {
        Rate(pct * 100)
    }

    /// Creates a rate from a fractional percentage (config input).
    pub fn from_percentage(pct: f64) -> Self {
        Rate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One book and its quantity in the cart.
///
/// ## Invariants
/// - `quantity` is always within `MIN_LINE_QUANTITY..=MAX_LINE_QUANTITY`
/// - `unit_price` is never negative; it comes from the catalog and the engine
///   never edits it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub book_id: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl CartLine {
    /// Builds a line, clamping the quantity into range.
    ///
    /// ## Preconditions
    /// A negative quantity or price is a caller bug, not something to clamp:
    /// it fails immediately with a typed error.
    ///
    /// ## Example
    /// ```rust
    /// use shelf_core::{CartLine, Money};
    ///
    /// let line = CartLine::new("b1", Money::from_rupees(300), 150).unwrap();
    /// assert_eq!(line.quantity, 99);
    /// assert!(CartLine::new("b1", Money::from_rupees(300), -1).is_err());
    /// ```
    pub fn new(
        book_id: impl Into<String>,
        unit_price: Money,
        quantity: i64,
    ) -> ValidationResult<Self> {
        let book_id = book_id.into();
        if book_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "bookId".to_string(),
            });
        }
        validate_unit_price(unit_price)?;

        Ok(CartLine {
            book_id,
            unit_price,
            quantity: clamp_quantity(quantity)?,
        })
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

/// Clamps a requested quantity into `[1, 99]`.
///
/// Zero becomes one (a line cannot be empty); negatives are rejected.
pub fn clamp_quantity(quantity: i64) -> ValidationResult<u32> {
    if quantity < 0 {
        return Err(ValidationError::Negative {
            field: "quantity".to_string(),
        });
    }
    Ok(quantity.clamp(MIN_LINE_QUANTITY as i64, MAX_LINE_QUANTITY as i64) as u32)
}

// =============================================================================
// Remote Cart Shape
// =============================================================================

/// A book reference as returned inside `/api/cart` items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteBook {
    #[serde(rename = "_id")]
    pub id: String,
    pub price: f64,
}

/// One entry of the remote cart response `data.items`.
///
/// ```json
/// { "book": { "_id": "64f1...", "price": 300 }, "quantity": 2 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCartItem {
    pub book: RemoteBook,
    pub quantity: i64,
}

impl RemoteCartItem {
    /// Converts the wire shape into a validated cart line.
    pub fn to_line(&self) -> ValidationResult<CartLine> {
        let price = Money::from_decimal(self.book.price).ok_or_else(|| {
            ValidationError::InvalidFormat {
                field: "price".to_string(),
                reason: "must be a finite number".to_string(),
            }
        })?;
        CartLine::new(self.book.id.clone(), price, self.quantity)
    }
}

// =============================================================================
// Card Type
// =============================================================================

/// Card network, derived from the number's prefix and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum CardType {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Diners,
    Unknown,
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CardType::Visa => "visa",
            CardType::Mastercard => "mastercard",
            CardType::Amex => "amex",
            CardType::Discover => "discover",
            CardType::Diners => "diners",
            CardType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Payment Input
// =============================================================================

/// Card fields as typed into the checkout form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub number: String,
    /// `MM/YY`
    pub expiry: String,
    pub cvv: String,
    pub holder_name: String,
}

/// How the customer pays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentInstrument {
    Card(CardDetails),
    Upi {
        #[serde(rename = "upiId")]
        upi_id: String,
    },
}

// =============================================================================
// Unit Tests
// =============================================================================
