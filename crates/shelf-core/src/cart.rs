//! # Cart
//!
//! The cart lines, the store that owns them, and the key-value mirror used
//! for offline display and the header badge.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CartStore Operations                                 │
//! │                                                                         │
//! │  UI Action               CartStore                Cart Change           │
//! │  ─────────               ─────────                ───────────           │
//! │                                                                         │
//! │  Page load ────────────► sync_from_remote() ────► lines = server cart   │
//! │  Offline page load ────► restore() ─────────────► lines = mirror        │
//! │  Add to cart ──────────► add() ─────────────────► upsert (qty clamped)  │
//! │  Change quantity ──────► update_quantity() ─────► qty = clamp(n)        │
//! │  Click remove ─────────► remove() ──────────────► line removed          │
//! │  Empty cart ───────────► clear() ───────────────► lines + coupon gone   │
//! │  Enter coupon ─────────► apply_coupon() ────────► coupon = Some(..)     │
//! │                                                                         │
//! │  Order paid ───────────► settle() ──────────────► paid lines removed    │
//! │                                                                         │
//! │  Every change is staged: reconcile coupon, mirror, then commit          │
//! │    cart          → JSON lines                                           │
//! │    cartCount     → badge count                                          │
//! │    appliedCoupon → code (removed when none)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::coupon::{Coupon, CouponBook, CouponPolicy};
use crate::error::{CoreError, CoreResult, CouponError, StoreError, ValidationError};
use crate::money::Money;
use crate::pricing::{PricingResult, PricingRules};
use crate::types::{clamp_quantity, CartLine, RemoteCartItem};
use crate::validation::{validate_unit_price, ValidationResult};

/// Mirror key for the cart lines.
pub const CART_KEY: &str = "cart";
/// Mirror key for the header badge count.
pub const CART_COUNT_KEY: &str = "cartCount";
/// Mirror key for the applied coupon code.
pub const COUPON_KEY: &str = "appliedCoupon";

// =============================================================================
// Key-Value Store
// =============================================================================

/// String key-value storage, the shape of browser local storage.
///
/// Injected into [`CartStore`] and [`crate::wishlist::Wishlist`] instead of
/// being reached as a global.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-process [`KeyValueStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Reads and decodes a JSON value from the store.
pub(crate) fn load_json<S, T>(store: &S, key: &str) -> Result<Option<T>, StoreError>
where
    S: KeyValueStore + ?Sized,
    T: for<'de> Deserialize<'de>,
{
    match store.get(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Serialization {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Encodes and writes a JSON value to the store.
pub(crate) fn save_json<S, T>(store: &mut S, key: &str, value: &T) -> Result<(), StoreError>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialization {
        key: key.to_string(),
        source,
    })?;
    store.set(key, raw)
}

// =============================================================================
// Cart
// =============================================================================

/// Ordered cart lines, unique by book id.
///
/// ## Invariants
/// - No two lines share a `book_id` (adding an existing book merges)
/// - Every quantity is within `[1, 99]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart from the remote `data.items` payload.
    ///
    /// Duplicate book ids are merged the same way repeated adds are.
    pub fn from_remote(items: &[RemoteCartItem]) -> ValidationResult<Self> {
        let mut cart = Cart::new();
        for item in items {
            let line = item.to_line()?;
            cart.upsert(line.book_id, line.unit_price, line.quantity as i64)?;
        }
        Ok(cart)
    }

    /// Adds `quantity` of a book, merging with an existing line.
    ///
    /// The merged quantity is clamped to `[1, 99]` and the price is
    /// refreshed to `unit_price` (the catalog is authoritative).
    pub fn upsert(
        &mut self,
        book_id: impl Into<String>,
        unit_price: Money,
        quantity: i64,
    ) -> ValidationResult<()> {
        let book_id = book_id.into();

        if let Some(line) = self.lines.iter_mut().find(|l| l.book_id == book_id) {
            if quantity < 0 {
                return Err(ValidationError::Negative {
                    field: "quantity".to_string(),
                });
            }
            validate_unit_price(unit_price)?;
            line.quantity = clamp_quantity(line.quantity as i64 + quantity)?;
            line.unit_price = unit_price;
            return Ok(());
        }

        self.lines.push(CartLine::new(book_id, unit_price, quantity)?);
        Ok(())
    }

    /// Sets a line's quantity, clamped to `[1, 99]`.
    ///
    /// Returns `false` when the book is not in the cart.
    pub fn set_quantity(&mut self, book_id: &str, quantity: i64) -> ValidationResult<bool> {
        let quantity = clamp_quantity(quantity)?;
        match self.lines.iter_mut().find(|l| l.book_id == book_id) {
            Some(line) => {
                line.quantity = quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Removes a line. Returns `false` when the book was not in the cart.
    pub fn remove(&mut self, book_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.book_id != book_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, book_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.book_id == book_id)
    }

    /// Σ unit_price × quantity.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Sum of quantities (the badge number).
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Cart Store
// =============================================================================

/// Owns the cart and its applied coupon, and mirrors both into `S`.
#[derive(Debug)]
pub struct CartStore<S: KeyValueStore> {
    cart: Cart,
    coupon: Option<Coupon>,
    store: S,
    rules: PricingRules,
    coupons: CouponBook,
    policy: CouponPolicy,
}

impl<S: KeyValueStore> CartStore<S> {
    /// An empty cart with default pricing, the standard coupon table and
    /// [`CouponPolicy::Revalidate`].
    pub fn new(store: S) -> Self {
        CartStore {
            cart: Cart::new(),
            coupon: None,
            store,
            rules: PricingRules::default(),
            coupons: CouponBook::standard(),
            policy: CouponPolicy::default(),
        }
    }

    pub fn with_rules(mut self, rules: PricingRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_policy(mut self, policy: CouponPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_coupons(mut self, coupons: CouponBook) -> Self {
        self.coupons = coupons;
        self
    }

    /// Loads the mirrored cart and coupon (offline display).
    ///
    /// A mirrored coupon that no longer resolves is discarded.
    pub fn restore(&mut self) -> CoreResult<()> {
        let lines: Vec<CartLine> = load_json(&self.store, CART_KEY)?.unwrap_or_default();
        let mut cart = Cart::new();
        for line in lines {
            cart.upsert(line.book_id, line.unit_price, line.quantity as i64)?;
        }

        let coupon = match self.store.get(COUPON_KEY)? {
            Some(code) => self.coupons.lookup(&code).cloned(),
            None => None,
        };
        self.commit(cart, coupon)
    }

    /// Replaces the cart with the authoritative server cart.
    pub fn sync_from_remote(&mut self, items: &[RemoteCartItem]) -> CoreResult<()> {
        let cart = Cart::from_remote(items)?;
        let coupon = self.coupon.clone();
        self.commit(cart, coupon)
    }

    /// Adds a book (upsert, quantity clamped).
    pub fn add(&mut self, book_id: &str, unit_price: Money, quantity: i64) -> CoreResult<()> {
        let mut cart = self.cart.clone();
        cart.upsert(book_id, unit_price, quantity)?;
        let coupon = self.coupon.clone();
        self.commit(cart, coupon)
    }

    /// Sets a line's quantity (clamped to `[1, 99]`).
    pub fn update_quantity(&mut self, book_id: &str, quantity: i64) -> CoreResult<()> {
        let mut cart = self.cart.clone();
        if !cart.set_quantity(book_id, quantity)? {
            return Err(CoreError::BookNotInCart(book_id.to_string()));
        }
        let coupon = self.coupon.clone();
        self.commit(cart, coupon)
    }

    pub fn remove(&mut self, book_id: &str) -> CoreResult<()> {
        let mut cart = self.cart.clone();
        if !cart.remove(book_id) {
            return Err(CoreError::BookNotInCart(book_id.to_string()));
        }
        let coupon = self.coupon.clone();
        self.commit(cart, coupon)
    }

    /// Empties the cart. The coupon goes with it.
    pub fn clear(&mut self) -> CoreResult<()> {
        self.commit(Cart::new(), None)
    }

    /// Removes what a paid order covered and keeps anything added since.
    ///
    /// `paid` is the snapshot of lines that was charged. Each matching line
    /// loses the paid quantity and disappears when nothing is left. The
    /// coupon was spent on the order, so it is dropped either way.
    pub fn settle(&mut self, paid: &[CartLine]) -> CoreResult<()> {
        let mut cart = self.cart.clone();
        for paid_line in paid {
            cart.lines.retain_mut(|line| {
                if line.book_id != paid_line.book_id {
                    return true;
                }
                line.quantity = line.quantity.saturating_sub(paid_line.quantity);
                line.quantity > 0
            });
        }
        self.commit(cart, None)
    }

    /// Validates `code` against the current cart and keeps it applied.
    pub fn apply_coupon(&mut self, code: &str) -> CoreResult<&Coupon> {
        let coupon = self.coupons.apply(code, &self.cart)?;
        self.store.set(COUPON_KEY, coupon.code.clone())?;
        Ok(&*self.coupon.insert(coupon))
    }

    pub fn remove_coupon(&mut self) -> CoreResult<()> {
        self.store.remove(COUPON_KEY)?;
        self.coupon = None;
        Ok(())
    }

    pub fn applied_coupon(&self) -> Option<&Coupon> {
        self.coupon.as_ref()
    }

    /// Eligibility of the applied coupon against the current cart, or
    /// `None` when no coupon is applied.
    pub fn coupon_status(&self) -> Option<Result<&Coupon, CouponError>> {
        self.coupon.as_ref().map(|c| {
            if c.is_eligible(self.cart.subtotal()) {
                Ok(c)
            } else {
                Err(CouponError::MinimumNotMet {
                    code: c.code.clone(),
                    minimum: c.minimum_subtotal,
                })
            }
        })
    }

    /// Prices the current cart.
    ///
    /// Under [`CouponPolicy::Revalidate`] an ineligible coupon is ignored
    /// even if it is still held; under [`CouponPolicy::Sticky`] it applies.
    pub fn pricing(&self) -> PricingResult {
        let coupon = match self.policy {
            CouponPolicy::Revalidate => self
                .coupon
                .as_ref()
                .filter(|c| c.is_eligible(self.cart.subtotal())),
            CouponPolicy::Sticky => self.coupon.as_ref(),
        };
        self.rules.compute(&self.cart, coupon)
    }

    pub fn badge_count(&self) -> u32 {
        self.cart.total_quantity()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn rules(&self) -> &PricingRules {
        &self.rules
    }

    pub fn policy(&self) -> CouponPolicy {
        self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mirrors the staged cart and keeps it only once every write succeeded.
    fn commit(&mut self, cart: Cart, coupon: Option<Coupon>) -> CoreResult<()> {
        let coupon = self.reconcile_coupon(&cart, coupon);
        self.mirror(&cart, coupon.as_ref())?;
        self.cart = cart;
        self.coupon = coupon;
        Ok(())
    }

    fn reconcile_coupon(&self, cart: &Cart, coupon: Option<Coupon>) -> Option<Coupon> {
        if cart.is_empty() {
            return None;
        }
        match self.policy {
            CouponPolicy::Revalidate => coupon.filter(|c| c.is_eligible(cart.subtotal())),
            CouponPolicy::Sticky => coupon,
        }
    }

    fn mirror(&mut self, cart: &Cart, coupon: Option<&Coupon>) -> CoreResult<()> {
        save_json(&mut self.store, CART_KEY, cart.lines())?;
        self.store.set(CART_COUNT_KEY, cart.total_quantity().to_string())?;
        match coupon {
            Some(coupon) => self.store.set(COUPON_KEY, coupon.code.clone())?,
            None => self.store.remove(COUPON_KEY)?,
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RemoteBook;

    fn remote(id: &str, price: f64, quantity: i64) -> RemoteCartItem {
        RemoteCartItem {
            book: RemoteBook {
                id: id.to_string(),
                price,
            },
            quantity,
        }
    }

    /// A store that refuses writes, for error propagation tests.
    struct FullStore;

    impl KeyValueStore for FullStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }
        fn set(&mut self, _key: &str, _value: String) -> Result<(), StoreError> {
            Err(StoreError::Backend("quota exceeded".to_string()))
        }
        fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn test_upsert_merges_lines() {
        let mut cart = Cart::new();
        cart.upsert("b1", Money::from_rupees(300), 2).unwrap();
        cart.upsert("b1", Money::from_rupees(280), 3).unwrap();

        assert_eq!(cart.len(), 1);
        let line = cart.line("b1").unwrap();
        assert_eq!(line.quantity, 5);
        assert_eq!(line.unit_price, Money::from_rupees(280));
    }

    #[test]
    fn test_upsert_clamps_merged_quantity() {
        let mut cart = Cart::new();
        cart.upsert("b1", Money::from_rupees(1), 90).unwrap();
        cart.upsert("b1", Money::from_rupees(1), 20).unwrap();
        assert_eq!(cart.line("b1").unwrap().quantity, 99);
    }

    #[test]
    fn test_negative_quantity_fails_fast() {
        let mut cart = Cart::new();
        assert!(cart.upsert("b1", Money::from_rupees(1), -1).is_err());
        cart.upsert("b1", Money::from_rupees(1), 1).unwrap();
        assert!(cart.upsert("b1", Money::from_rupees(1), -1).is_err());
        assert!(cart.set_quantity("b1", -5).is_err());
        assert_eq!(cart.line("b1").unwrap().quantity, 1);
    }

    #[test]
    fn test_set_quantity_and_remove() {
        let mut cart = Cart::new();
        cart.upsert("b1", Money::from_rupees(10), 1).unwrap();

        assert!(cart.set_quantity("b1", 0).unwrap());
        assert_eq!(cart.line("b1").unwrap().quantity, 1);
        assert!(cart.set_quantity("b1", 500).unwrap());
        assert_eq!(cart.line("b1").unwrap().quantity, 99);
        assert!(!cart.set_quantity("missing", 2).unwrap());

        assert!(cart.remove("b1"));
        assert!(!cart.remove("b1"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_from_remote_merges_duplicates() {
        let items = [remote("a", 300.0, 2), remote("a", 300.0, 1), remote("b", 99.5, 1)];
        let cart = Cart::from_remote(&items).unwrap();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total_quantity(), 4);
        assert_eq!(cart.subtotal(), Money::from_paise(90_000 + 9_950));
    }

    #[test]
    fn test_from_remote_rejects_bad_price() {
        assert!(Cart::from_remote(&[remote("a", f64::NAN, 1)]).is_err());
        assert!(Cart::from_remote(&[remote("a", -1.0, 1)]).is_err());
    }

    #[test]
    fn test_sync_rejects_price_that_would_overflow() {
        let mut store = CartStore::new(MemoryStore::new());
        store.add("kept", Money::from_rupees(300), 1).unwrap();

        let result = store.sync_from_remote(&[remote("b", 9.0e14, 2)]);
        assert!(matches!(
            result,
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(store.add("b", Money::from_rupees(crate::MAX_AMOUNT_RUPEES + 1), 1).is_err());

        // The cart that was there still prices normally
        assert_eq!(store.badge_count(), 1);
        assert_eq!(store.pricing().subtotal, Money::from_rupees(300));
    }

    #[test]
    fn test_largest_cart_prices_without_overflow() {
        let mut store = CartStore::new(MemoryStore::new());
        let top = Money::from_rupees(crate::MAX_AMOUNT_RUPEES);
        for i in 0..50 {
            store.add(&format!("b{i}"), top, 99).unwrap();
        }
        let pricing = store.pricing();
        assert_eq!(pricing.subtotal, Money::from_rupees(crate::MAX_AMOUNT_RUPEES * 99 * 50));
        assert!(pricing.check_invariants().is_ok());
    }

    #[test]
    fn test_store_mirrors_every_mutation() {
        let mut store = CartStore::new(MemoryStore::new());
        store.add("b1", Money::from_rupees(300), 2).unwrap();
        store.add("b2", Money::from_rupees(100), 1).unwrap();

        let kv = store.store();
        assert_eq!(kv.get(CART_COUNT_KEY).unwrap().as_deref(), Some("3"));
        let mirrored: Vec<CartLine> = load_json(kv, CART_KEY).unwrap().unwrap();
        assert_eq!(mirrored, store.cart().lines());

        store.remove("b2").unwrap();
        assert_eq!(store.store().get(CART_COUNT_KEY).unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_restore_from_mirror() {
        let mut first = CartStore::new(MemoryStore::new());
        first.add("b1", Money::from_rupees(300), 2).unwrap();
        first.apply_coupon("welcome10").unwrap();
        let kv = first.store().clone();

        let mut second = CartStore::new(kv);
        second.restore().unwrap();
        assert_eq!(second.cart(), first.cart());
        assert_eq!(second.applied_coupon().map(|c| c.code.as_str()), Some("WELCOME10"));
        assert_eq!(second.pricing(), first.pricing());
    }

    #[test]
    fn test_restore_rejects_corrupt_mirror() {
        let mut kv = MemoryStore::new();
        kv.set(CART_KEY, "{not json".to_string()).unwrap();
        let mut store = CartStore::new(kv);
        assert!(matches!(
            store.restore(),
            Err(CoreError::Store(StoreError::Serialization { .. }))
        ));
    }

    #[test]
    fn test_store_errors_propagate() {
        let mut store = CartStore::new(FullStore);
        assert!(matches!(
            store.add("b1", Money::from_rupees(1), 1),
            Err(CoreError::Store(StoreError::Backend(_)))
        ));
        assert!(store.cart().is_empty());
        assert_eq!(store.badge_count(), 0);
    }

    /// Accepts writes until `fail` is set.
    #[derive(Default)]
    struct SwitchableStore {
        inner: MemoryStore,
        fail: bool,
    }

    impl KeyValueStore for SwitchableStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }
        fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
            if self.fail {
                return Err(StoreError::Backend("quota exceeded".to_string()));
            }
            self.inner.set(key, value)
        }
        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_failed_mirror_leaves_cart_and_coupon_untouched() {
        let mut store = CartStore::new(SwitchableStore::default());
        store.add("b1", Money::from_rupees(600), 1).unwrap();
        store.apply_coupon("WELCOME10").unwrap();
        let before = store.cart().clone();

        store.store.fail = true;
        assert!(store.add("b2", Money::from_rupees(10), 1).is_err());
        assert!(store.update_quantity("b1", 5).is_err());
        // Would drop the coupon below its minimum if it went through
        assert!(store.remove("b1").is_err());
        assert!(store.clear().is_err());
        assert!(store.sync_from_remote(&[remote("x", 5.0, 1)]).is_err());

        assert_eq!(store.cart(), &before);
        assert_eq!(store.applied_coupon().map(|c| c.code.as_str()), Some("WELCOME10"));
    }

    #[test]
    fn test_update_missing_book() {
        let mut store = CartStore::new(MemoryStore::new());
        assert!(matches!(
            store.update_quantity("ghost", 2),
            Err(CoreError::BookNotInCart(_))
        ));
        assert!(matches!(store.remove("ghost"), Err(CoreError::BookNotInCart(_))));
    }

    #[test]
    fn test_clear_drops_coupon() {
        let mut store = CartStore::new(MemoryStore::new());
        store.add("b1", Money::from_rupees(300), 1).unwrap();
        store.apply_coupon("FREESHIP").unwrap();
        assert!(store.store().get(COUPON_KEY).unwrap().is_some());

        store.clear().unwrap();
        assert!(store.applied_coupon().is_none());
        assert!(store.store().get(COUPON_KEY).unwrap().is_none());
        assert_eq!(store.badge_count(), 0);
    }

    #[test]
    fn test_removing_last_line_drops_coupon_even_when_sticky() {
        let mut store = CartStore::new(MemoryStore::new()).with_policy(CouponPolicy::Sticky);
        store.add("b1", Money::from_rupees(300), 1).unwrap();
        store.apply_coupon("FREESHIP").unwrap();

        store.remove("b1").unwrap();
        assert!(store.applied_coupon().is_none());
    }

    #[test]
    fn test_revalidate_policy_drops_ineligible_coupon() {
        let mut store = CartStore::new(MemoryStore::new());
        store.add("b1", Money::from_rupees(300), 2).unwrap();
        store.apply_coupon("WELCOME10").unwrap();
        assert_eq!(store.pricing().discount_amount, Money::from_rupees(60));

        // ₹300 < ₹500 minimum
        store.update_quantity("b1", 1).unwrap();
        assert!(store.applied_coupon().is_none());
        assert_eq!(store.pricing().discount_amount, Money::zero());
        assert!(store.store().get(COUPON_KEY).unwrap().is_none());

        // Growing the cart again does not bring it back
        store.update_quantity("b1", 3).unwrap();
        assert!(store.applied_coupon().is_none());
    }

    #[test]
    fn test_sticky_policy_keeps_coupon() {
        let mut store = CartStore::new(MemoryStore::new()).with_policy(CouponPolicy::Sticky);
        store.add("b1", Money::from_rupees(300), 2).unwrap();
        store.apply_coupon("WELCOME10").unwrap();

        store.update_quantity("b1", 1).unwrap();
        assert_eq!(store.applied_coupon().map(|c| c.code.as_str()), Some("WELCOME10"));
        assert!(matches!(
            store.coupon_status(),
            Some(Err(CouponError::MinimumNotMet { .. }))
        ));

        let pricing = store.pricing();
        assert_eq!(pricing.discount_amount, Money::from_rupees(30));
        // 300 + 50 shipping + 54 tax − 30
        assert_eq!(pricing.total, Money::from_rupees(374));
    }

    #[test]
    fn test_apply_coupon_errors_leave_state_untouched() {
        let mut store = CartStore::new(MemoryStore::new());
        assert!(matches!(
            store.apply_coupon("WELCOME10"),
            Err(CoreError::Coupon(CouponError::EmptyCart))
        ));

        store.add("b1", Money::from_rupees(30), 1).unwrap();
        assert!(matches!(
            store.apply_coupon("SAVE50"),
            Err(CoreError::Coupon(CouponError::MinimumNotMet { .. }))
        ));
        assert!(store.applied_coupon().is_none());

        store.apply_coupon("FREESHIP").unwrap();
        store.remove_coupon().unwrap();
        assert!(store.applied_coupon().is_none());
        assert_eq!(store.pricing().shipping, Money::from_rupees(50));
    }

    #[test]
    fn test_settle_keeps_lines_added_after_snapshot() {
        let mut store = CartStore::new(MemoryStore::new());
        store.add("paid", Money::from_rupees(300), 2).unwrap();
        store.add("grown", Money::from_rupees(100), 1).unwrap();
        store.apply_coupon("WELCOME10").unwrap();
        let paid = store.cart().lines().to_vec();

        store.add("late", Money::from_rupees(999), 1).unwrap();
        store.add("grown", Money::from_rupees(100), 2).unwrap();
        store.settle(&paid).unwrap();

        assert!(store.cart().line("paid").is_none());
        assert_eq!(store.cart().line("grown").unwrap().quantity, 2);
        assert_eq!(store.cart().line("late").unwrap().quantity, 1);
        assert!(store.applied_coupon().is_none());
        assert_eq!(store.store().get(CART_COUNT_KEY).unwrap().as_deref(), Some("3"));
    }

    #[test]
    fn test_settle_unchanged_cart_empties_it() {
        let mut store = CartStore::new(MemoryStore::new());
        store.add("b1", Money::from_rupees(300), 2).unwrap();
        let paid = store.cart().lines().to_vec();

        store.settle(&paid).unwrap();
        assert!(store.cart().is_empty());
        assert_eq!(store.badge_count(), 0);
    }

    #[test]
    fn test_sync_from_remote_replaces_cart() {
        let mut store = CartStore::new(MemoryStore::new());
        store.add("local", Money::from_rupees(10), 1).unwrap();
        store
            .sync_from_remote(&[remote("a", 300.0, 2), remote("b", 50.0, 1)])
            .unwrap();

        assert!(store.cart().line("local").is_none());
        assert_eq!(store.badge_count(), 3);
        assert_eq!(store.pricing().subtotal, Money::from_rupees(650));
    }
}
