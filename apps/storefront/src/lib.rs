//! # Shelf Storefront
//!
//! Application layer for the Shelf bookstore checkout. It wires the pure
//! `shelf-core` rules to shared state, configuration, logging and the
//! external payment gateway.
//!
//! ## Application Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Storefront Startup Sequence                          │
//! │                                                                         │
//! │  1. init_tracing()                                                      │
//! │     └─► RUST_LOG or "info,shelf=debug"                                  │
//! │                                                                         │
//! │  2. ConfigState::from_env()                                             │
//! │     └─► SHELF_* overrides, ConfigError on bad values                    │
//! │                                                                         │
//! │  3. Initialize State                                                    │
//! │     ├─► CartState::new(&config, MemoryStore)   (restores the mirror)    │
//! │     └─► RateLimitState::new(config.rate_limit_policy())                 │
//! │                                                                         │
//! │  4. Serve commands                                                      │
//! │     ├─► commands::cart      (cart, coupon, wishlist)                    │
//! │     └─► commands::checkout  (submit_payment → PaymentProcessor)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod payment;
pub mod state;

pub use error::{ApiError, ApiResponse, ConfigError, ErrorCode};
pub use payment::{ChargeRequest, PaymentError, PaymentProcessor, Receipt};
pub use state::{CartState, ConfigState, RateLimitState};

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,shelf=debug";

/// Initializes the tracing subscriber for logging.
///
/// ## Log Levels
/// - ERROR: Unrecoverable errors
/// - WARN: Recoverable issues (rejected coupon, declined card, rate limit)
/// - INFO: Checkout milestones
/// - DEBUG: Cart mutations
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
