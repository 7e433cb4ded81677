//! # Storefront Commands
//!
//! Everything the UI can ask the backend to do.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── cart.rs      ◄─── Cart and coupon manipulation
//! ├── wishlist.rs  ◄─── Saved books
//! └── checkout.rs  ◄─── Payment submission
//! ```
//!
//! ## State Injection
//! Each command takes only the state it needs:
//! ```rust,ignore
//! // Only needs the cart
//! fn get_cart(cart: &CartState) -> Result<CartResponse, ApiError>
//!
//! // Needs cart, limiter and gateway
//! async fn submit_payment(cart, limiter, processor, request, now)
//! ```
//!
//! Responses are presentation-ready: amounts are rounded to paise and wrapped
//! in [`crate::ApiResponse`] by the transport layer.

pub mod cart;
pub mod checkout;
pub mod wishlist;

pub use cart::*;
pub use checkout::*;
pub use wishlist::*;
