//! # State Module
//!
//! Shared state for the storefront. Each concern gets its own state type so
//! a command only locks what it touches.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────┐      │
//! │  │   CartState      │  │ RateLimitState   │  │   ConfigState    │      │
//! │  │                  │  │                  │  │                  │      │
//! │  │  Arc<Mutex<      │  │  Arc<Mutex<      │  │  pricing rules   │      │
//! │  │   CartStore>>    │  │   RateLimiter>>  │  │  limiter policy  │      │
//! │  │  Arc<Mutex<      │  │                  │  │  coupon policy   │      │
//! │  │   Wishlist>>     │  │                  │  │  (read-only)     │      │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Locks are `std::sync::Mutex` and are never held across an `.await`.

mod cart;
mod config;
mod rate_limit;

pub use cart::CartState;
pub use config::ConfigState;
pub use rate_limit::RateLimitState;
