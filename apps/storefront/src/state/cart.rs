//! # Cart State
//!
//! Shared handle to the shopper's [`CartStore`] and [`Wishlist`].
//!
//! Both are wrapped in `Arc<Mutex<T>>` so every command sees the same cart.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Lifecycle                                 │
//! │                                                                         │
//! │  startup            CartState::new ── restore() ── mirror → memory      │
//! │  login / refresh    sync_cart ─────── server cart replaces local        │
//! │  browsing           add / update / remove / coupon                      │
//! │  checkout success   clear ─────────── mirror emptied, coupon dropped    │
//! │                                                                         │
//! │  NOTE: Locks are released before any payment call is awaited.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use shelf_core::{CartStore, CoreResult, KeyValueStore, MemoryStore, Wishlist};

use super::ConfigState;

/// Shared cart and wishlist state.
#[derive(Debug)]
pub struct CartState<S: KeyValueStore = MemoryStore> {
    cart: Arc<Mutex<CartStore<S>>>,
    wishlist: Arc<Mutex<Wishlist<S>>>,
}

impl<S: KeyValueStore> Clone for CartState<S> {
    fn clone(&self) -> Self {
        CartState {
            cart: Arc::clone(&self.cart),
            wishlist: Arc::clone(&self.wishlist),
        }
    }
}

impl CartState<MemoryStore> {
    /// Empty in-memory state with the configured rules.
    pub fn in_memory(config: &ConfigState) -> Self {
        CartState::from_parts(
            CartStore::new(MemoryStore::new())
                .with_rules(config.pricing_rules())
                .with_policy(config.coupon_policy),
            Wishlist::new(MemoryStore::new()),
        )
    }
}

impl<S: KeyValueStore> CartState<S> {
    /// Builds state over the given mirrors and restores whatever they hold.
    pub fn new(config: &ConfigState, cart_mirror: S, wishlist_mirror: S) -> CoreResult<Self> {
        let mut cart = CartStore::new(cart_mirror)
            .with_rules(config.pricing_rules())
            .with_policy(config.coupon_policy);
        cart.restore()?;

        let mut wishlist = Wishlist::new(wishlist_mirror);
        wishlist.restore()?;

        Ok(CartState::from_parts(cart, wishlist))
    }

    pub fn from_parts(cart: CartStore<S>, wishlist: Wishlist<S>) -> Self {
        CartState {
            cart: Arc::new(Mutex::new(cart)),
            wishlist: Arc::new(Mutex::new(wishlist)),
        }
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let pricing = cart_state.with_cart(|store| store.pricing());
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CartStore<S>) -> R,
    {
        let store = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&store)
    }

    /// Executes a function with write access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// cart_state.with_cart_mut(|store| store.add("b1", price, 1))?;
    /// ```
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut CartStore<S>) -> R,
    {
        let mut store = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut store)
    }

    pub fn with_wishlist<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Wishlist<S>) -> R,
    {
        let wishlist = self.wishlist.lock().unwrap_or_else(PoisonError::into_inner);
        f(&wishlist)
    }

    pub fn with_wishlist_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Wishlist<S>) -> R,
    {
        let mut wishlist = self.wishlist.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut wishlist)
    }
}
