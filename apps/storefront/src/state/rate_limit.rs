//! # Rate Limit State
//!
//! Shared payment attempt limiter. Identities are whatever the checkout
//! passes in (user id, session id or client IP).

use std::sync::{Arc, Mutex, PoisonError};

use shelf_core::rate_limit::{AttemptStore, MemoryAttempts};
use shelf_core::{RateLimitDecision, RateLimitPolicy, RateLimiter, StoreError};
use tracing::debug;

#[derive(Debug)]
pub struct RateLimitState<A: AttemptStore = MemoryAttempts> {
    limiter: Arc<Mutex<RateLimiter<A>>>,
}

impl<A: AttemptStore> Clone for RateLimitState<A> {
    fn clone(&self) -> Self {
        RateLimitState {
            limiter: Arc::clone(&self.limiter),
        }
    }
}

impl RateLimitState<MemoryAttempts> {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self::with_limiter(RateLimiter::in_memory(policy))
    }

    /// Sweeps identities whose attempts have all aged out. Meant to run
    /// from a periodic task next to the server loop.
    pub fn prune(&self, now_ms: u64) -> usize {
        let removed = self.lock().prune(now_ms);
        if removed > 0 {
            debug!(removed, "pruned idle payment attempt entries");
        }
        removed
    }
}

impl<A: AttemptStore> RateLimitState<A> {
    pub fn with_limiter(limiter: RateLimiter<A>) -> Self {
        RateLimitState {
            limiter: Arc::new(Mutex::new(limiter)),
        }
    }

    /// Records an attempt for `identity` if one is allowed.
    pub fn check_and_record(
        &self,
        identity: &str,
        now_ms: u64,
    ) -> Result<RateLimitDecision, StoreError> {
        self.lock().check_and_record(identity, now_ms)
    }

    pub fn peek(&self, identity: &str, now_ms: u64) -> Result<RateLimitDecision, StoreError> {
        self.lock().peek(identity, now_ms)
    }

    /// Forgets every attempt for `identity`.
    pub fn reset(&self, identity: &str) -> Result<(), StoreError> {
        self.lock().reset(identity)
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.lock().policy()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RateLimiter<A>> {
        self.limiter.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
