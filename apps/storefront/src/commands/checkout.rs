//! # Checkout Command
//!
//! Submits the payment form.
//!
//! ## Payment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    submit_payment                                       │
//! │                                                                         │
//! │  1. Validate fields        card: number, expiry, CVV, holder            │
//! │     │                      upi:  handle@provider                        │
//! │     │  errors ──────────►  VALIDATION_ERROR (no attempt recorded)       │
//! │     ▼                                                                   │
//! │  2. Non-empty cart?  ───►  VALIDATION_ERROR                             │
//! │     ▼                                                                   │
//! │  3. Rate limit gate        5 attempts / 15 min per identity             │
//! │     │  denied ──────────►  RATE_LIMITED { retryAfterMs }                │
//! │     ▼                                                                   │
//! │  4. Price + line snapshot  cart lock released before step 5             │
//! │     ▼                                                                   │
//! │  5. processor.charge().await                                            │
//! │     │  Err ─────────────►  PAYMENT_ERROR (cart kept, attempt counted)   │
//! │     ▼                                                                   │
//! │  6. Reset limiter, settle paid lines, return receipt                    │
//! │     (books added while the charge ran stay in the cart)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shelf_core::validation::{normalize_card_number, validate_card_details, validate_upi};
use shelf_core::rate_limit::AttemptStore;
use shelf_core::{CardDetails, KeyValueStore, PaymentInstrument, PricingTotals};
use tracing::{info, warn};

use crate::error::{ApiError, ErrorCode};
use crate::payment::{ChargeRequest, PaymentError, PaymentProcessor, Receipt};
use crate::state::{CartState, RateLimitState};

/// How long the gateway gets before the charge is reported as unavailable.
pub const CHARGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Payment form submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Rate limit identity (user id, or session id for guests)
    pub identity: String,
    pub instrument: PaymentInstrument,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub receipt: Receipt,
    pub totals: PricingTotals,
    /// Coupon that was honoured, if any
    pub coupon: Option<String>,
}

/// Validates and normalizes the instrument, reporting every bad field.
pub fn prepare_instrument(
    instrument: &PaymentInstrument,
    now: DateTime<Utc>,
) -> Result<PaymentInstrument, ApiError> {
    match instrument {
        PaymentInstrument::Card(card) => {
            let errors = validate_card_details(card, now.date_naive());
            if !errors.is_empty() {
                return Err(ApiError::invalid_fields(&errors));
            }
            Ok(PaymentInstrument::Card(CardDetails {
                number: normalize_card_number(&card.number),
                expiry: card.expiry.trim().to_string(),
                cvv: card.cvv.trim().to_string(),
                holder_name: card.holder_name.trim().to_string(),
            }))
        }
        PaymentInstrument::Upi { upi_id } => {
            let upi_id = upi_id.trim();
            validate_upi(upi_id)?;
            Ok(PaymentInstrument::Upi {
                upi_id: upi_id.to_string(),
            })
        }
    }
}

/// Runs the full checkout for the current cart.
///
/// `now` is the wall clock reading used for expiry and rate limiting.
pub async fn submit_payment<S, A, P>(
    cart: &CartState<S>,
    limiter: &RateLimitState<A>,
    processor: &P,
    request: CheckoutRequest,
    now: DateTime<Utc>,
) -> Result<CheckoutResponse, ApiError>
where
    S: KeyValueStore,
    A: AttemptStore,
    P: PaymentProcessor + ?Sized,
{
    let identity = request.identity.as_str();

    let instrument = prepare_instrument(&request.instrument, now).inspect_err(|err| {
        warn!(identity, fields = err.fields.len(), "payment form rejected");
    })?;

    if cart.with_cart(|store| store.cart().is_empty()) {
        return Err(ApiError::new(ErrorCode::ValidationError, "Your cart is empty"));
    }

    let now_ms = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    let decision = limiter.check_and_record(identity, now_ms)?;
    if let Err(err) = decision.into_result() {
        warn!(identity, retry_after_ms = ?decision.retry_after_ms, "payment rate limited");
        return Err(err.into());
    }

    let (pricing, coupon, paid_lines) = cart.with_cart(|store| {
        (
            store.pricing(),
            store.applied_coupon().map(|c| c.code.clone()),
            store.cart().lines().to_vec(),
        )
    });
    pricing.check_invariants()?;
    let totals = pricing.totals();

    let charge = ChargeRequest::new(identity, pricing.total, instrument);
    info!(
        order_id = %charge.order_id,
        identity,
        amount = %pricing.total,
        instrument = %charge.instrument_summary(),
        "submitting payment"
    );

    let outcome = match tokio::time::timeout(CHARGE_TIMEOUT, processor.charge(&charge)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(PaymentError::GatewayUnavailable("timed out".to_string())),
    };
    let receipt = outcome.inspect_err(|err| {
        warn!(order_id = %charge.order_id, identity, error = %err, "payment failed");
    })?;

    info!(
        order_id = %receipt.order_id,
        transaction_id = %receipt.transaction_id,
        "payment captured"
    );

    if let Err(err) = limiter.reset(identity) {
        warn!(identity, error = %err, "could not reset payment attempts");
    }
    let settled = cart.with_cart_mut(|store| {
        store.settle(&paid_lines).map(|()| store.badge_count())
    });
    match settled {
        Ok(0) => {}
        Ok(remaining) => info!(
            order_id = %receipt.order_id,
            remaining,
            "cart changed during payment, unpaid books kept"
        ),
        Err(err) => warn!(error = %err, "could not settle cart after payment"),
    }

    Ok(CheckoutResponse {
        receipt,
        totals,
        coupon,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_prepare_card_normalizes() {
        let instrument = PaymentInstrument::Card(CardDetails {
            number: "4532 0151 1283 0366".to_string(),
            expiry: " 12/27 ".to_string(),
            cvv: "123".to_string(),
            holder_name: " Asha Rao ".to_string(),
        });

        match prepare_instrument(&instrument, now()).unwrap() {
            PaymentInstrument::Card(card) => {
                assert_eq!(card.number, "4532015112830366");
                assert_eq!(card.expiry, "12/27");
                assert_eq!(card.holder_name, "Asha Rao");
            }
            other => panic!("unexpected instrument {other:?}"),
        }
    }

    #[test]
    fn test_prepare_card_reports_all_fields() {
        let instrument = PaymentInstrument::Card(CardDetails {
            number: "4532015112830367".to_string(),
            expiry: "01/20".to_string(),
            cvv: "12".to_string(),
            holder_name: String::new(),
        });

        let err = prepare_instrument(&instrument, now()).unwrap_err();
        let fields: Vec<&str> = err.fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, ["cardNumber", "expiry", "cvv", "holderName"]);
    }

    #[test]
    fn test_prepare_upi() {
        let ok = PaymentInstrument::Upi {
            upi_id: " reader@okbank ".to_string(),
        };
        assert!(prepare_instrument(&ok, now()).is_ok());

        let bad = PaymentInstrument::Upi {
            upi_id: "reader".to_string(),
        };
        let err = prepare_instrument(&bad, now()).unwrap_err();
        assert_eq!(err.fields[0].field, "upiId");
    }
}
