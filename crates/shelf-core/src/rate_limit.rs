//! # Rate Limiting
//!
//! Sliding-window attempt counter used to gate payment submissions.
//!
//! ## Sliding Window
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  max_attempts = 5, window = 15 min                                      │
//! │                                                                         │
//! │  t=0s   ● ● ● ● ●          five attempts, all allowed                   │
//! │  t=1s             ✗        sixth denied, retry after ≈ 14m59s           │
//! │  t=15m  ●                  first attempt aged out → one slot frees      │
//! │                                                                         │
//! │  Unlike a fixed bucket the boundary moves with `now`: only attempts     │
//! │  younger than one window count.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! State lives behind the [`AttemptStore`] trait: [`MemoryAttempts`] for a
//! single process, [`KeyValueAttempts`] to keep it in the same key-value
//! store as the cart mirror.

use serde::Serialize;
use std::collections::HashMap;
use ts_rs::TS;

use crate::cart::{load_json, save_json, KeyValueStore};
use crate::error::{CoreError, CoreResult, StoreError};
use crate::{RATE_LIMIT_MAX_ATTEMPTS, RATE_LIMIT_WINDOW_MS};

// =============================================================================
// Policy & Decision
// =============================================================================

/// Limit and window for a [`RateLimiter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_attempts: usize,
    pub window_ms: u64,
}

impl Default for RateLimitPolicy {
    /// 5 attempts per 15 minutes.
    fn default() -> Self {
        RateLimitPolicy {
            max_attempts: RATE_LIMIT_MAX_ATTEMPTS,
            window_ms: RATE_LIMIT_WINDOW_MS,
        }
    }
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Set only when denied; always greater than zero.
    #[ts(type = "number | null")]
    pub retry_after_ms: Option<u64>,
}

impl RateLimitDecision {
    fn allow() -> Self {
        RateLimitDecision {
            allowed: true,
            retry_after_ms: None,
        }
    }

    fn deny(retry_after_ms: u64) -> Self {
        RateLimitDecision {
            allowed: false,
            retry_after_ms: Some(retry_after_ms),
        }
    }

    /// Turns a denial into [`CoreError::RateLimitExceeded`].
    pub fn into_result(self) -> CoreResult<()> {
        match self.retry_after_ms {
            Some(retry_after_ms) if !self.allowed => {
                Err(CoreError::RateLimitExceeded { retry_after_ms })
            }
            _ => Ok(()),
        }
    }
}

// =============================================================================
// Attempt Store
// =============================================================================

/// Per-identity attempt timestamps (epoch milliseconds, oldest first).
pub trait AttemptStore {
    fn load(&self, identity: &str) -> Result<Vec<u64>, StoreError>;
    fn save(&mut self, identity: &str, attempts: Vec<u64>) -> Result<(), StoreError>;
    fn clear(&mut self, identity: &str) -> Result<(), StoreError>;
}

/// Process-local [`AttemptStore`]. Nothing survives a restart.
///
/// An identity that never comes back keeps its entry until
/// [`MemoryAttempts::prune`] sweeps it.
#[derive(Debug, Clone, Default)]
pub struct MemoryAttempts {
    attempts: HashMap<String, Vec<u64>>,
}

impl MemoryAttempts {
    /// Drops timestamps a full window old and every identity left empty.
    /// Returns how many identities were removed.
    pub fn prune(&mut self, now_ms: u64, window_ms: u64) -> usize {
        let before = self.attempts.len();
        self.attempts.retain(|_, attempts| {
            attempts.retain(|&t| now_ms.saturating_sub(t) < window_ms);
            !attempts.is_empty()
        });
        before - self.attempts.len()
    }

    /// Number of identities currently tracked.
    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }
}

impl AttemptStore for MemoryAttempts {
    fn load(&self, identity: &str) -> Result<Vec<u64>, StoreError> {
        Ok(self.attempts.get(identity).cloned().unwrap_or_default())
    }

    fn save(&mut self, identity: &str, attempts: Vec<u64>) -> Result<(), StoreError> {
        if attempts.is_empty() {
            self.attempts.remove(identity);
        } else {
            self.attempts.insert(identity.to_string(), attempts);
        }
        Ok(())
    }

    fn clear(&mut self, identity: &str) -> Result<(), StoreError> {
        self.attempts.remove(identity);
        Ok(())
    }
}

/// [`AttemptStore`] over a [`KeyValueStore`], one JSON array per identity
/// under `rate_limit:<identity>`.
#[derive(Debug, Clone, Default)]
pub struct KeyValueAttempts<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> KeyValueAttempts<S> {
    pub fn new(store: S) -> Self {
        KeyValueAttempts { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn key(identity: &str) -> String {
        format!("rate_limit:{identity}")
    }
}

impl<S: KeyValueStore> AttemptStore for KeyValueAttempts<S> {
    fn load(&self, identity: &str) -> Result<Vec<u64>, StoreError> {
        Ok(load_json(&self.store, &Self::key(identity))?.unwrap_or_default())
    }

    fn save(&mut self, identity: &str, attempts: Vec<u64>) -> Result<(), StoreError> {
        save_json(&mut self.store, &Self::key(identity), &attempts)
    }

    fn clear(&mut self, identity: &str) -> Result<(), StoreError> {
        self.store.remove(&Self::key(identity))
    }
}

// =============================================================================
// Rate Limiter
// =============================================================================

/// Sliding-window limiter keyed by identity (user id, email, session).
///
/// Not synchronized; share it behind a mutex when several handlers use it.
#[derive(Debug, Default)]
pub struct RateLimiter<A: AttemptStore = MemoryAttempts> {
    policy: RateLimitPolicy,
    attempts: A,
}

impl RateLimiter<MemoryAttempts> {
    /// In-memory limiter with the given policy.
    pub fn in_memory(policy: RateLimitPolicy) -> Self {
        RateLimiter::new(policy, MemoryAttempts::default())
    }

    /// Forgets identities with no attempt left inside the window.
    pub fn prune(&mut self, now_ms: u64) -> usize {
        self.attempts.prune(now_ms, self.policy.window_ms)
    }

    pub fn tracked_identities(&self) -> usize {
        self.attempts.len()
    }
}

impl<A: AttemptStore> RateLimiter<A> {
    pub fn new(policy: RateLimitPolicy, attempts: A) -> Self {
        RateLimiter { policy, attempts }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Checks the limit for `identity` and records the attempt if allowed.
    ///
    /// ## Behavior
    /// 1. Drop timestamps that are a full window old or older
    /// 2. If `max_attempts` remain → deny, retry when the oldest ages out
    /// 3. Otherwise record `now` and allow
    ///
    /// ## Example
    /// ```rust
    /// use shelf_core::rate_limit::{RateLimiter, RateLimitPolicy};
    ///
    /// let mut limiter = RateLimiter::in_memory(RateLimitPolicy::default());
    /// for i in 0..5 {
    ///     assert!(limiter.check_and_record("u1", 1_000 + i).unwrap().allowed);
    /// }
    /// let denied = limiter.check_and_record("u1", 1_500).unwrap();
    /// assert!(!denied.allowed);
    /// assert_eq!(denied.retry_after_ms, Some(900_000 - 500));
    /// ```
    pub fn check_and_record(
        &mut self,
        identity: &str,
        now_ms: u64,
    ) -> Result<RateLimitDecision, StoreError> {
        let mut attempts = self.live_attempts(identity, now_ms)?;

        if let Some(retry_after_ms) = self.retry_after(&attempts, now_ms) {
            self.attempts.save(identity, attempts)?;
            return Ok(RateLimitDecision::deny(retry_after_ms));
        }

        attempts.push(now_ms);
        self.attempts.save(identity, attempts)?;
        Ok(RateLimitDecision::allow())
    }

    /// Same decision as [`Self::check_and_record`] without recording.
    pub fn peek(&self, identity: &str, now_ms: u64) -> Result<RateLimitDecision, StoreError> {
        let attempts = self.live_attempts(identity, now_ms)?;
        Ok(match self.retry_after(&attempts, now_ms) {
            Some(retry_after_ms) => RateLimitDecision::deny(retry_after_ms),
            None => RateLimitDecision::allow(),
        })
    }

    /// Forgets every attempt for `identity` (e.g. after a successful payment).
    pub fn reset(&mut self, identity: &str) -> Result<(), StoreError> {
        self.attempts.clear(identity)
    }

    fn live_attempts(&self, identity: &str, now_ms: u64) -> Result<Vec<u64>, StoreError> {
        let window_ms = self.policy.window_ms;
        let mut attempts = self.attempts.load(identity)?;
        // Timestamps from the future (clock skew) have age 0 and still count
        attempts.retain(|&t| now_ms.saturating_sub(t) < window_ms);
        attempts.sort_unstable();
        Ok(attempts)
    }

    fn retry_after(&self, attempts: &[u64], now_ms: u64) -> Option<u64> {
        if attempts.len() < self.policy.max_attempts {
            return None;
        }
        let oldest = attempts.first().copied().unwrap_or(now_ms);
        let age = now_ms.saturating_sub(oldest);
        Some(self.policy.window_ms.saturating_sub(age))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::MemoryStore;

    const WINDOW: u64 = RATE_LIMIT_WINDOW_MS;

    #[test]
    fn test_five_allowed_sixth_denied() {
        let mut limiter = RateLimiter::in_memory(RateLimitPolicy::default());
        let t0 = 1_700_000_000_000;

        for i in 0..5 {
            let decision = limiter.check_and_record("user", t0 + i * 100).unwrap();
            assert!(decision.allowed, "attempt {i} should pass");
            assert_eq!(decision.retry_after_ms, None);
        }

        let denied = limiter.check_and_record("user", t0 + 999).unwrap();
        assert!(!denied.allowed);
        assert_eq!(denied.retry_after_ms, Some(WINDOW - 999));
    }

    #[test]
    fn test_window_slides_from_first_attempt() {
        let mut limiter = RateLimiter::in_memory(RateLimitPolicy::default());
        let t0 = 1_700_000_000_000;
        for i in 0..5 {
            limiter.check_and_record("user", t0 + i).unwrap();
        }

        // Still blocked just before the first attempt ages out
        assert!(!limiter.check_and_record("user", t0 + WINDOW - 1).unwrap().allowed);
        // First attempt has aged out: exactly one slot frees
        assert!(limiter.check_and_record("user", t0 + WINDOW).unwrap().allowed);
        assert!(!limiter.check_and_record("user", t0 + WINDOW).unwrap().allowed);
        // Well past the window everything has aged out
        assert!(limiter.peek("user", t0 + 2 * WINDOW + 5).unwrap().allowed);
    }

    #[test]
    fn test_denied_attempts_are_not_recorded() {
        let policy = RateLimitPolicy {
            max_attempts: 2,
            window_ms: 1_000,
        };
        let mut limiter = RateLimiter::in_memory(policy);
        limiter.check_and_record("u", 10_000).unwrap();
        limiter.check_and_record("u", 10_100).unwrap();
        for t in [10_200, 10_300, 10_400] {
            assert!(!limiter.check_and_record("u", t).unwrap().allowed);
        }
        // Denials did not extend the block
        assert!(limiter.check_and_record("u", 11_001).unwrap().allowed);
    }

    #[test]
    fn test_prune_forgets_idle_identities() {
        let policy = RateLimitPolicy {
            max_attempts: 3,
            window_ms: 1_000,
        };
        let mut limiter = RateLimiter::in_memory(policy);
        limiter.check_and_record("gone", 1_000).unwrap();
        limiter.check_and_record("busy", 1_000).unwrap();
        limiter.check_and_record("busy", 2_500).unwrap();
        assert_eq!(limiter.tracked_identities(), 2);

        assert_eq!(limiter.prune(1_999), 0);
        assert_eq!(limiter.prune(2_600), 1);
        assert_eq!(limiter.tracked_identities(), 1);

        // The surviving identity kept only its live attempt
        limiter.check_and_record("busy", 2_700).unwrap();
        limiter.check_and_record("busy", 2_800).unwrap();
        assert!(!limiter.check_and_record("busy", 2_900).unwrap().allowed);
    }

    #[test]
    fn test_identities_are_independent() {
        let policy = RateLimitPolicy {
            max_attempts: 1,
            window_ms: 1_000,
        };
        let mut limiter = RateLimiter::in_memory(policy);
        assert!(limiter.check_and_record("a", 5_000).unwrap().allowed);
        assert!(!limiter.check_and_record("a", 5_001).unwrap().allowed);
        assert!(limiter.check_and_record("b", 5_001).unwrap().allowed);
    }

    #[test]
    fn test_peek_does_not_record() {
        let policy = RateLimitPolicy {
            max_attempts: 1,
            window_ms: 1_000,
        };
        let mut limiter = RateLimiter::in_memory(policy);
        assert!(limiter.peek("a", 5_000).unwrap().allowed);
        assert!(limiter.peek("a", 5_000).unwrap().allowed);
        limiter.check_and_record("a", 5_000).unwrap();
        assert_eq!(limiter.peek("a", 5_400).unwrap().retry_after_ms, Some(600));
    }

    #[test]
    fn test_reset_clears_identity() {
        let policy = RateLimitPolicy {
            max_attempts: 1,
            window_ms: 1_000,
        };
        let mut limiter = RateLimiter::in_memory(policy);
        limiter.check_and_record("a", 5_000).unwrap();
        limiter.reset("a").unwrap();
        assert!(limiter.check_and_record("a", 5_001).unwrap().allowed);
    }

    #[test]
    fn test_early_clock_values() {
        // Timestamps near zero must not underflow the cutoff
        let policy = RateLimitPolicy {
            max_attempts: 1,
            window_ms: 1_000,
        };
        let mut limiter = RateLimiter::in_memory(policy);
        assert!(limiter.check_and_record("a", 0).unwrap().allowed);
        assert!(!limiter.check_and_record("a", 500).unwrap().allowed);
        assert!(!limiter.check_and_record("a", 999).unwrap().allowed);
        assert!(limiter.check_and_record("a", 1_000).unwrap().allowed);
    }

    #[test]
    fn test_into_result() {
        assert!(RateLimitDecision::allow().into_result().is_ok());
        assert!(matches!(
            RateLimitDecision::deny(42).into_result(),
            Err(CoreError::RateLimitExceeded { retry_after_ms: 42 })
        ));
    }

    #[test]
    fn test_key_value_backed_attempts() {
        let policy = RateLimitPolicy {
            max_attempts: 2,
            window_ms: 1_000,
        };
        let mut limiter = RateLimiter::new(policy, KeyValueAttempts::new(MemoryStore::new()));
        limiter.check_and_record("reader@example.com", 1_000).unwrap();
        limiter.check_and_record("reader@example.com", 1_100).unwrap();

        let kv = limiter.attempts.clone().into_inner();
        assert_eq!(
            kv.get("rate_limit:reader@example.com").unwrap().as_deref(),
            Some("[1000,1100]")
        );

        // A fresh limiter over the same store sees the history
        let mut revived = RateLimiter::new(policy, KeyValueAttempts::new(kv));
        assert!(!revived.check_and_record("reader@example.com", 1_200).unwrap().allowed);
    }
}
