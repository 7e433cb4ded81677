//! # Validation Module
//!
//! Field validators for the checkout form and cart inputs.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI (TypeScript)                                              │
//! │  ├── Input masks, maxlength                                            │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Card number format + Luhn checksum + network                      │
//! │  ├── Expiry (MM/YY, not in the past), CVV, UPI id                      │
//! │  └── Quantity / price preconditions                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Payment gateway                                              │
//! │  └── Authorisation (external)                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All validators are pure and return typed results; none of them panic.
//!
//! ## Usage
//! ```rust
//! use shelf_core::validation::{validate_card_number, validate_cvv};
//! use shelf_core::CardType;
//!
//! let check = validate_card_number("4532015112830366");
//! assert!(check.valid);
//! assert_eq!(check.card_type, CardType::Visa);
//!
//! assert!(validate_cvv("123").is_ok());
//! ```

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{CardDetails, CardType};
use crate::MAX_AMOUNT_RUPEES;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const CARD_NUMBER_FIELD: &str = "cardNumber";
const EXPIRY_FIELD: &str = "expiry";
const CVV_FIELD: &str = "cvv";
const UPI_FIELD: &str = "upiId";
const HOLDER_FIELD: &str = "holderName";

// =============================================================================
// Card Number
// =============================================================================

/// Outcome of a card number check.
///
/// `card_type` is reported even when `valid` is false so the UI can show the
/// network logo while the customer is still typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CardNumberCheck {
    pub valid: bool,
    pub card_type: CardType,
}

impl CardNumberCheck {
    /// Converts the check into a field error for form-level validation.
    pub fn into_result(self, number: &str) -> ValidationResult<CardType> {
        if self.valid {
            return Ok(self.card_type);
        }
        if is_card_number_format(number) {
            Err(ValidationError::ChecksumFailed {
                field: CARD_NUMBER_FIELD.to_string(),
            })
        } else if number.is_empty() {
            Err(ValidationError::Required {
                field: CARD_NUMBER_FIELD.to_string(),
            })
        } else {
            Err(ValidationError::InvalidFormat {
                field: CARD_NUMBER_FIELD.to_string(),
                reason: "must be 13 to 19 digits".to_string(),
            })
        }
    }
}

/// Validates a card number: 13-19 ASCII digits and a valid Luhn checksum.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Customer types card number                                            │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_card_number(s) ← THIS FUNCTION                               │
/// │       │                                                                 │
/// │       ├── not 13-19 digits? → { valid: false }                         │
/// │       ├── Luhn fails?       → { valid: false }                         │
/// │       └── OK → { valid: true, cardType: visa | ... | unknown }         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_card_number(number: &str) -> CardNumberCheck {
    CardNumberCheck {
        valid: is_card_number_format(number) && passes_luhn(number),
        card_type: classify_card(number),
    }
}

fn is_card_number_format(number: &str) -> bool {
    (13..=19).contains(&number.len()) && number.bytes().all(|b| b.is_ascii_digit())
}

/// Standard mod-10 (Luhn) checksum.
///
/// Every second digit from the right is doubled, 9 is subtracted from
/// doubled values above 9, and the sum must be divisible by 10. Returns false
/// for empty input or any non-digit.
///
/// ## Example
/// ```rust
/// use shelf_core::validation::passes_luhn;
///
/// assert!(passes_luhn("4532015112830366"));
/// assert!(!passes_luhn("4532015112830367"));
/// ```
pub fn passes_luhn(digits: &str) -> bool {
    if digits.is_empty() {
        return false;
    }

    let mut sum = 0u32;
    for (i, b) in digits.bytes().rev().enumerate() {
        if !b.is_ascii_digit() {
            return false;
        }
        let mut d = u32::from(b - b'0');
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}

/// Classifies a card number by prefix family and length.
///
/// | Network    | Prefix              | Length     |
/// |------------|---------------------|------------|
/// | Visa       | 4                   | 13, 16, 19 |
/// | Mastercard | 51-55               | 16         |
/// | Amex       | 34, 37              | 15         |
/// | Discover   | 6011, 65            | 16         |
/// | Diners     | 30, 36, 38, 39      | 14         |
///
/// Anything else, including non-digit input, is `Unknown`.
pub fn classify_card(number: &str) -> CardType {
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return CardType::Unknown;
    }

    let len = number.len();
    let two: u8 = number.get(..2).and_then(|p| p.parse().ok()).unwrap_or(0);

    if number.starts_with('4') && matches!(len, 13 | 16 | 19) {
        CardType::Visa
    } else if (51..=55).contains(&two) && len == 16 {
        CardType::Mastercard
    } else if matches!(two, 34 | 37) && len == 15 {
        CardType::Amex
    } else if (number.starts_with("6011") || two == 65) && len == 16 {
        CardType::Discover
    } else if matches!(two, 30 | 36 | 38 | 39) && len == 14 {
        CardType::Diners
    } else {
        CardType::Unknown
    }
}

/// Strips the spaces and dashes customers type between digit groups.
///
/// ## Example
/// ```rust
/// use shelf_core::validation::normalize_card_number;
///
/// assert_eq!(normalize_card_number(" 4532 0151-1283 0366 "), "4532015112830366");
/// ```
pub fn normalize_card_number(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Masks all but the last four digits, e.g. `************0366`.
pub fn mask_card_number(number: &str) -> String {
    let digits: Vec<char> = number.chars().filter(|c| c.is_ascii_digit()).collect();
    let visible = digits.len().saturating_sub(4);
    digits
        .iter()
        .enumerate()
        .map(|(i, c)| if i < visible { '*' } else { *c })
        .collect()
}

// =============================================================================
// Expiry, CVV, UPI, Holder
// =============================================================================

/// Validates an `MM/YY` expiry against a reference date.
///
/// The card is valid through the last day of its expiry month in year
/// `2000 + YY`; it is rejected only when that day is strictly before `today`.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use shelf_core::validation::validate_expiry;
///
/// let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
/// assert!(validate_expiry("01/20", today).is_err());
/// assert!(validate_expiry("06/24", today).is_ok());
/// assert!(validate_expiry("01/30", today).is_ok());
/// ```
pub fn validate_expiry(expiry: &str, today: NaiveDate) -> ValidationResult<()> {
    if expiry.trim().is_empty() {
        return Err(ValidationError::Required {
            field: EXPIRY_FIELD.to_string(),
        });
    }

    let (month, year) = parse_expiry(expiry).ok_or_else(|| ValidationError::InvalidFormat {
        field: EXPIRY_FIELD.to_string(),
        reason: "must be MM/YY".to_string(),
    })?;

    if end_of_month(year, month) < today {
        return Err(ValidationError::Expired {
            field: EXPIRY_FIELD.to_string(),
        });
    }

    Ok(())
}

/// Parses `MM/YY` (month 01-12, two-digit year) into `(month, 2000 + YY)`.
fn parse_expiry(expiry: &str) -> Option<(u32, i32)> {
    let bytes = expiry.as_bytes();
    if bytes.len() != 5 || bytes[2] != b'/' {
        return None;
    }
    let (mm, yy) = (&expiry[..2], &expiry[3..]);
    if !mm.bytes().chain(yy.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let month: u32 = mm.parse().ok()?;
    let year: i32 = yy.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some((month, 2000 + year))
}

fn end_of_month(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// Validates a CVV: exactly 3 or 4 digits.
pub fn validate_cvv(cvv: &str) -> ValidationResult<()> {
    if cvv.is_empty() {
        return Err(ValidationError::Required {
            field: CVV_FIELD.to_string(),
        });
    }

    if !matches!(cvv.len(), 3 | 4) || !cvv.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: CVV_FIELD.to_string(),
            reason: "must be 3 or 4 digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a UPI id of the form `handle@provider`.
///
/// ## Rules
/// - handle: letters, digits, `.`, `_`, `-`
/// - provider: letters, digits, `.`, `-`
/// - exactly one `@`, both sides non-empty
///
/// ## Example
/// ```rust
/// use shelf_core::validation::validate_upi;
///
/// assert!(validate_upi("reader.42@okbank").is_ok());
/// assert!(validate_upi("reader@").is_err());
/// assert!(validate_upi("a@b@c").is_err());
/// ```
pub fn validate_upi(upi_id: &str) -> ValidationResult<()> {
    if upi_id.is_empty() {
        return Err(ValidationError::Required {
            field: UPI_FIELD.to_string(),
        });
    }

    let valid = upi_id.split_once('@').is_some_and(|(handle, provider)| {
        !handle.is_empty()
            && !provider.is_empty()
            && handle
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            && provider
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-'))
    });

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: UPI_FIELD.to_string(),
            reason: "must look like name@bank".to_string(),
        });
    }

    Ok(())
}

/// Validates the name printed on the card.
pub fn validate_cardholder_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: HOLDER_FIELD.to_string(),
        });
    }

    if name.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: HOLDER_FIELD.to_string(),
            max: 100,
        });
    }

    if !name
        .chars()
        .all(|c| c.is_alphabetic() || c == ' ' || matches!(c, '.' | '\'' | '-'))
    {
        return Err(ValidationError::InvalidFormat {
            field: HOLDER_FIELD.to_string(),
            reason: "must contain only letters, spaces, dots, apostrophes and hyphens"
                .to_string(),
        });
    }

    Ok(())
}

/// Runs every card field check and collects all failures.
///
/// The card number is normalized first, so `4532 0151 1283 0366` is accepted.
/// An empty vector means the form may be submitted.
pub fn validate_card_details(details: &CardDetails, today: NaiveDate) -> Vec<ValidationError> {
    let number = normalize_card_number(&details.number);

    [
        validate_card_number(&number).into_result(&number).map(|_| ()),
        validate_expiry(details.expiry.trim(), today),
        validate_cvv(details.cvv.trim()),
        validate_cardholder_name(&details.holder_name),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect()
}

// =============================================================================
// Cart Preconditions
// =============================================================================

/// Validates a catalog unit price.
///
/// Zero is allowed (free books). Anything above [`MAX_AMOUNT_RUPEES`] is
/// rejected so line totals cannot overflow.
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }
    if price > Money::from_rupees(MAX_AMOUNT_RUPEES) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_AMOUNT_RUPEES,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
