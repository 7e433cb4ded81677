//! # Configuration State
//!
//! Store configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`SHELF_*`)
//! 2. Defaults (this file)
//!
//! Configuration is read-only after initialization, so no mutex.

use serde::Serialize;
use shelf_core::{CouponPolicy, Money, PricingRules, Rate, RateLimitPolicy, MAX_AMOUNT_RUPEES};

use crate::error::ConfigError;

/// Storefront configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// GST in basis points, e.g. 1800 = 18%
    pub tax_rate_bps: u32,

    /// Shipping is free strictly above this many rupees
    pub free_shipping_threshold_rupees: i64,

    /// Flat shipping fee in rupees
    pub shipping_fee_rupees: i64,

    /// Payment attempts allowed per window
    pub rate_limit_max_attempts: usize,

    /// Window length in seconds
    pub rate_limit_window_secs: u64,

    /// What happens to a coupon whose minimum stops being met
    pub coupon_policy: CouponPolicy,
}

impl Default for ConfigState {
    /// ## Default Values
    /// - Currency: INR (₹)
    /// - GST: 18%
    /// - Free shipping above ₹500, otherwise ₹50
    /// - 5 payment attempts per 15 minutes
    /// - Coupons re-validated after each cart change
    fn default() -> Self {
        let rules = PricingRules::default();
        let limits = RateLimitPolicy::default();
        ConfigState {
            currency_symbol: "₹".to_string(),
            tax_rate_bps: rules.tax_rate.bps(),
            free_shipping_threshold_rupees: shelf_core::FREE_SHIPPING_THRESHOLD_RUPEES,
            shipping_fee_rupees: shelf_core::FLAT_SHIPPING_FEE_RUPEES,
            rate_limit_max_attempts: limits.max_attempts,
            rate_limit_window_secs: limits.window_ms / 1000,
            coupon_policy: CouponPolicy::default(),
        }
    }
}

impl ConfigState {
    /// Creates a ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `SHELF_TAX_RATE`: GST percent (e.g., "18" or "12.5")
    /// - `SHELF_FREE_SHIPPING_THRESHOLD`: Rupees, at most `MAX_AMOUNT_RUPEES`
    /// - `SHELF_SHIPPING_FEE`: Rupees, at most `MAX_AMOUNT_RUPEES`
    /// - `SHELF_RATE_LIMIT_MAX_ATTEMPTS`: Attempts per window
    /// - `SHELF_RATE_LIMIT_WINDOW_SECS`: Window length
    /// - `SHELF_COUPON_POLICY`: `revalidate` or `sticky`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ConfigState::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ConfigState::default();

        if let Some(raw) = lookup("SHELF_TAX_RATE") {
            let pct: f64 = parse("SHELF_TAX_RATE", &raw)?;
            if !(0.0..=100.0).contains(&pct) {
                return Err(invalid("SHELF_TAX_RATE", &raw));
            }
            config.tax_rate_bps = Rate::from_percentage(pct).bps();
        }

        if let Some(raw) = lookup("SHELF_FREE_SHIPPING_THRESHOLD") {
            config.free_shipping_threshold_rupees =
                parse_amount("SHELF_FREE_SHIPPING_THRESHOLD", &raw)?;
        }

        if let Some(raw) = lookup("SHELF_SHIPPING_FEE") {
            config.shipping_fee_rupees = parse_amount("SHELF_SHIPPING_FEE", &raw)?;
        }

        if let Some(raw) = lookup("SHELF_RATE_LIMIT_MAX_ATTEMPTS") {
            let max: usize = parse("SHELF_RATE_LIMIT_MAX_ATTEMPTS", &raw)?;
            if max == 0 {
                return Err(invalid("SHELF_RATE_LIMIT_MAX_ATTEMPTS", &raw));
            }
            config.rate_limit_max_attempts = max;
        }

        if let Some(raw) = lookup("SHELF_RATE_LIMIT_WINDOW_SECS") {
            let secs: u64 = parse("SHELF_RATE_LIMIT_WINDOW_SECS", &raw)?;
            if secs == 0 {
                return Err(invalid("SHELF_RATE_LIMIT_WINDOW_SECS", &raw));
            }
            config.rate_limit_window_secs = secs;
        }

        if let Some(raw) = lookup("SHELF_COUPON_POLICY") {
            config.coupon_policy = raw
                .parse()
                .map_err(|_| invalid("SHELF_COUPON_POLICY", &raw))?;
        }

        Ok(config)
    }

    pub fn pricing_rules(&self) -> PricingRules {
        PricingRules {
            tax_rate: Rate::from_bps(self.tax_rate_bps),
            free_shipping_threshold: Money::from_rupees(self.free_shipping_threshold_rupees),
            flat_shipping_fee: Money::from_rupees(self.shipping_fee_rupees),
        }
    }

    pub fn rate_limit_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy {
            max_attempts: self.rate_limit_max_attempts,
            window_ms: self.rate_limit_window_secs.saturating_mul(1000),
        }
    }

    /// Formats a paise amount as a currency string.
    ///
    /// ## Example
    /// ```rust
    /// let config = shelf_storefront::ConfigState::default();
    /// assert_eq!(config.format_currency(64800), "₹648.00");
    /// ```
    pub fn format_currency(&self, paise: i64) -> String {
        format!(
            "{}{}{}.{:02}",
            if paise < 0 { "-" } else { "" },
            self.currency_symbol,
            (paise / 100).abs(),
            (paise % 100).abs()
        )
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| invalid(key, raw))
}

/// Rupee amount in `0..=MAX_AMOUNT_RUPEES`.
fn parse_amount(key: &str, raw: &str) -> Result<i64, ConfigError> {
    let value: i64 = parse(key, raw)?;
    if !(0..=MAX_AMOUNT_RUPEES).contains(&value) {
        return Err(invalid(key, raw));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_core_rules() {
        let config = ConfigState::default();
        assert_eq!(config.pricing_rules(), PricingRules::default());
        assert_eq!(config.rate_limit_policy(), RateLimitPolicy::default());
        assert_eq!(config.coupon_policy, CouponPolicy::Revalidate);
    }

    #[test]
    fn test_overrides() {
        let config = ConfigState::from_lookup(lookup(&[
            ("SHELF_TAX_RATE", "12.5"),
            ("SHELF_FREE_SHIPPING_THRESHOLD", "999"),
            ("SHELF_SHIPPING_FEE", "40"),
            ("SHELF_RATE_LIMIT_MAX_ATTEMPTS", "3"),
            ("SHELF_RATE_LIMIT_WINDOW_SECS", "60"),
            ("SHELF_COUPON_POLICY", "sticky"),
        ]))
        .unwrap();

        assert_eq!(config.tax_rate_bps, 1250);
        assert_eq!(
            config.pricing_rules().free_shipping_threshold,
            Money::from_rupees(999)
        );
        assert_eq!(config.pricing_rules().flat_shipping_fee, Money::from_rupees(40));
        assert_eq!(
            config.rate_limit_policy(),
            RateLimitPolicy {
                max_attempts: 3,
                window_ms: 60_000
            }
        );
        assert_eq!(config.coupon_policy, CouponPolicy::Sticky);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for (key, value) in [
            ("SHELF_TAX_RATE", "abc"),
            ("SHELF_TAX_RATE", "150"),
            ("SHELF_SHIPPING_FEE", "-1"),
            ("SHELF_SHIPPING_FEE", "9223372036854775807"),
            ("SHELF_FREE_SHIPPING_THRESHOLD", "10000001"),
            ("SHELF_RATE_LIMIT_MAX_ATTEMPTS", "0"),
            ("SHELF_RATE_LIMIT_WINDOW_SECS", "soon"),
            ("SHELF_COUPON_POLICY", "forever"),
        ] {
            let err = ConfigState::from_lookup(lookup(&[(key, value)])).unwrap_err();
            assert!(err.to_string().contains(key), "{key}={value}");
        }
    }

    #[test]
    fn test_largest_amounts_still_price() {
        let top = MAX_AMOUNT_RUPEES.to_string();
        let config = ConfigState::from_lookup(lookup(&[
            ("SHELF_FREE_SHIPPING_THRESHOLD", top.as_str()),
            ("SHELF_SHIPPING_FEE", top.as_str()),
        ]))
        .unwrap();

        let rules = config.pricing_rules();
        assert_eq!(rules.flat_shipping_fee, Money::from_rupees(MAX_AMOUNT_RUPEES));
        assert_eq!(rules.free_shipping_threshold, Money::from_rupees(MAX_AMOUNT_RUPEES));
    }

    #[test]
    fn test_format_currency() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(64800), "₹648.00");
        assert_eq!(config.format_currency(5), "₹0.05");
        assert_eq!(config.format_currency(0), "₹0.00");
        assert_eq!(config.format_currency(-550), "-₹5.50");
    }
}
