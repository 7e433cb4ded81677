//! # Cart Commands
//!
//! Commands for cart and coupon manipulation.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Coupon   │────►│ Checkout │       │
//! │  │  Cart    │     │          │     │ Applied  │     │          │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                │             │
//! │                   add_to_cart       apply_coupon    submit_payment     │
//! │                   update_item       remove_coupon   (checkout.rs)      │
//! │                   remove_item                             │             │
//! │                        │                                  │             │
//! │                        ▼                                  ▼             │
//! │                   clear_cart ◄──────────────────── cleared on success  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use shelf_core::{
    CartLine, CartStore, KeyValueStore, Money, PricingTotals, RemoteCartItem, ValidationError,
};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::CartState;

/// Cart response including lines, coupon and totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLine>,
    /// Code of the applied coupon, if any
    pub coupon: Option<String>,
    /// Set when the applied coupon no longer qualifies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_warning: Option<String>,
    pub totals: PricingTotals,
    /// Sum of quantities for the header badge
    pub badge_count: u32,
}

impl<S: KeyValueStore> From<&CartStore<S>> for CartResponse {
    fn from(store: &CartStore<S>) -> Self {
        let coupon_warning = match store.coupon_status() {
            Some(Err(err)) => Some(err.to_string()),
            _ => None,
        };
        CartResponse {
            lines: store.cart().lines().to_vec(),
            coupon: store.applied_coupon().map(|c| c.code.clone()),
            coupon_warning,
            totals: store.pricing().totals(),
            badge_count: store.badge_count(),
        }
    }
}

/// Book as shown in the catalog when the customer clicks "Add to cart".
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub book_id: String,
    /// Catalog price in rupees
    pub price: f64,
    pub quantity: Option<i64>,
}

/// Gets the current cart contents.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Cart page                                                              │
/// │                                                                         │
/// │  ┌────────────────────────────────────────────────────────────────┐    │
/// │  │  CART                                              2 items     │    │
/// │  ├────────────────────────────────────────────────────────────────┤    │
/// │  │  The Rust Programming Language  x2              ₹600.00       │    │
/// │  ├────────────────────────────────────────────────────────────────┤    │
/// │  │  Subtotal                                       ₹600.00       │    │
/// │  │  Shipping                                         FREE        │    │
/// │  │  GST (18%)                                      ₹108.00       │    │
/// │  │  Coupon WELCOME10                               -₹60.00       │    │
/// │  │  ──────────────────────────────────────────────────────       │    │
/// │  │  TOTAL                                          ₹648.00       │    │
/// │  └────────────────────────────────────────────────────────────────┘    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn get_cart<S: KeyValueStore>(cart: &CartState<S>) -> CartResponse {
    debug!("get_cart command");
    cart.with_cart(cart_response)
}

/// `CartResponse::from` as a function over any borrow lifetime.
fn cart_response<S: KeyValueStore>(store: &CartStore<S>) -> CartResponse {
    CartResponse::from(store)
}

/// Replaces the local cart with the server's copy.
///
/// Called after login and whenever the cart API answers.
pub fn sync_cart<S: KeyValueStore>(
    cart: &CartState<S>,
    items: &[RemoteCartItem],
) -> Result<CartResponse, ApiError> {
    debug!(lines = items.len(), "sync_cart command");

    cart.with_cart_mut(|store| -> Result<CartResponse, ApiError> {
        store.sync_from_remote(items)?;
        Ok(CartResponse::from(&*store))
    })
}

/// Adds a book to the cart.
///
/// ## Behavior
/// - Already in cart: quantities merge, capped at 99
/// - Not in cart: added as a new line
/// - The latest catalog price replaces the stored one
pub fn add_to_cart<S: KeyValueStore>(
    cart: &CartState<S>,
    request: AddToCartRequest,
) -> Result<CartResponse, ApiError> {
    let quantity = request.quantity.unwrap_or(1);
    debug!(book_id = %request.book_id, quantity, "add_to_cart command");

    let price = Money::from_decimal(request.price).ok_or_else(|| ValidationError::InvalidFormat {
        field: "price".to_string(),
        reason: "must be a finite amount".to_string(),
    })?;

    cart.with_cart_mut(|store| -> Result<CartResponse, ApiError> {
        store.add(&request.book_id, price, quantity)?;
        Ok(CartResponse::from(&*store))
    })
}

/// Sets the quantity of a line (clamped to 1..=99).
pub fn update_cart_item<S: KeyValueStore>(
    cart: &CartState<S>,
    book_id: &str,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(book_id, quantity, "update_cart_item command");

    cart.with_cart_mut(|store| -> Result<CartResponse, ApiError> {
        store.update_quantity(book_id, quantity)?;
        Ok(CartResponse::from(&*store))
    })
}

/// Removes a line from the cart.
pub fn remove_from_cart<S: KeyValueStore>(
    cart: &CartState<S>,
    book_id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(book_id, "remove_from_cart command");

    cart.with_cart_mut(|store| -> Result<CartResponse, ApiError> {
        store.remove(book_id)?;
        Ok(CartResponse::from(&*store))
    })
}

/// Empties the cart and drops the coupon.
pub fn clear_cart<S: KeyValueStore>(cart: &CartState<S>) -> Result<CartResponse, ApiError> {
    debug!("clear_cart command");

    cart.with_cart_mut(|store| -> Result<CartResponse, ApiError> {
        store.clear()?;
        Ok(CartResponse::from(&*store))
    })
}

/// Applies a coupon code (case-insensitive).
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Customer types "welcome10" and presses Apply                          │
/// │       │                                                                 │
/// │       ├── unknown code      → COUPON_ERROR "Invalid coupon code"       │
/// │       ├── below minimum     → COUPON_ERROR "requires a minimum ..."    │
/// │       ├── empty cart        → COUPON_ERROR                              │
/// │       └── OK                → cart with coupon and new totals          │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn apply_coupon<S: KeyValueStore>(
    cart: &CartState<S>,
    code: &str,
) -> Result<CartResponse, ApiError> {
    debug!(code, "apply_coupon command");

    cart.with_cart_mut(|store| -> Result<CartResponse, ApiError> {
        if let Err(err) = store.apply_coupon(code) {
            warn!(code, error = %err, "coupon rejected");
            return Err(err.into());
        }
        Ok(CartResponse::from(&*store))
    })
}

pub fn remove_coupon<S: KeyValueStore>(cart: &CartState<S>) -> Result<CartResponse, ApiError> {
    debug!("remove_coupon command");

    cart.with_cart_mut(|store| -> Result<CartResponse, ApiError> {
        store.remove_coupon()?;
        Ok(CartResponse::from(&*store))
    })
}
