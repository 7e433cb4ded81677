//! # Payment Gateway Seam
//!
//! The storefront never talks to a gateway directly. Infrastructure supplies
//! a [`PaymentProcessor`]; checkout hands it a [`ChargeRequest`] built from an
//! already validated instrument and a priced cart.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  submit_payment ──► ChargeRequest ──► PaymentProcessor::charge().await  │
//! │                                            │                            │
//! │                          ┌─────────────────┴──────────────┐             │
//! │                          ▼                                ▼             │
//! │                    Ok(Receipt)                    Err(PaymentError)     │
//! │                  reset limiter,                   cart untouched,       │
//! │                  settle paid lines                attempt still counted │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use shelf_core::validation::{classify_card, mask_card_number};
use shelf_core::{Money, PaymentInstrument};
use thiserror::Error;
use uuid::Uuid;

/// Gateway-facing failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaymentError {
    #[error("Payment declined: {reason}")]
    Declined { reason: String },

    #[error("Payment gateway unavailable: {0}")]
    GatewayUnavailable(String),
}

/// One charge against one instrument.
///
/// `Debug` prints the masked instrument only.
#[derive(Clone)]
pub struct ChargeRequest {
    pub order_id: Uuid,
    /// Who is paying; also the rate limit identity.
    pub identity: String,
    /// Presentation-rounded order total.
    pub amount: Money,
    /// Normalized instrument (card number without separators).
    pub instrument: PaymentInstrument,
}

impl ChargeRequest {
    pub fn new(identity: impl Into<String>, amount: Money, instrument: PaymentInstrument) -> Self {
        ChargeRequest {
            order_id: Uuid::new_v4(),
            identity: identity.into(),
            amount,
            instrument,
        }
    }

    /// Amount in paise, the unit gateways bill in.
    pub fn amount_paise(&self) -> i64 {
        self.amount.rounded_paise()
    }

    /// Safe-to-log instrument summary, e.g. `visa ************0366`.
    pub fn instrument_summary(&self) -> String {
        describe_instrument(&self.instrument)
    }
}

impl fmt::Debug for ChargeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChargeRequest")
            .field("order_id", &self.order_id)
            .field("identity", &self.identity)
            .field("amount", &self.amount)
            .field("instrument", &self.instrument_summary())
            .finish()
    }
}

/// Masked description of an instrument.
pub fn describe_instrument(instrument: &PaymentInstrument) -> String {
    match instrument {
        PaymentInstrument::Card(card) => format!(
            "{} {}",
            classify_card(&card.number),
            mask_card_number(&card.number)
        ),
        PaymentInstrument::Upi { upi_id } => format!("upi {upi_id}"),
    }
}

/// Proof of a successful charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Gateway reference
    pub transaction_id: String,
    pub order_id: Uuid,
    pub amount_paise: i64,
    pub paid_at: DateTime<Utc>,
}

/// External payment gateway.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn charge(&self, request: &ChargeRequest) -> Result<Receipt, PaymentError>;
}
