//! # API Error Type
//!
//! Unified error type for storefront commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Shelf                                  │
//! │                                                                         │
//! │  UI                          Rust Backend                               │
//! │  ──                          ────────────                               │
//! │                                                                         │
//! │  apply_coupon("SAVE50")                                                 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  CouponError::MinimumNotMet ──► CoreError ──► ApiError ─────────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ────────────────────► ApiResponse { success, data } ───►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "success": false, "code": "COUPON_ERROR",                            │
//! │    "message": "Coupon SAVE50 requires a minimum order of ₹1000.00" }    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The envelope mirrors the REST API's `{ success, data | message }` shape so
//! the UI handles both the same way.

use serde::Serialize;
use shelf_core::{CoreError, CouponError, StoreError, ValidationError};
use thiserror::Error;

use crate::payment::PaymentError;

/// API error returned from storefront commands.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Field-level messages for form rendering
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,

    /// Set for rate limit denials
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
}

/// One message attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl From<&ValidationError> for FieldError {
    fn from(err: &ValidationError) -> Self {
        FieldError {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Coupon rejected (422)
    CouponError,

    /// Too many attempts (429)
    RateLimited,

    /// Gateway declined or failed
    PaymentError,

    /// Local storage mirror failed
    StorageError,

    /// Internal error (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            fields: Vec::new(),
            retry_after_ms: None,
        }
    }

    /// A validation error carrying every failed field.
    pub fn invalid_fields(errors: &[ValidationError]) -> Self {
        ApiError {
            fields: errors.iter().map(FieldError::from).collect(),
            ..ApiError::new(ErrorCode::ValidationError, "Please correct the highlighted fields")
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::invalid_fields(std::slice::from_ref(&err))
    }
}

impl From<CouponError> for ApiError {
    fn from(err: CouponError) -> Self {
        ApiError::new(ErrorCode::CouponError, err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::new(ErrorCode::StorageError, err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::BookNotInCart(_) => ApiError::not_found(err.to_string()),
            CoreError::RateLimitExceeded { retry_after_ms } => ApiError {
                retry_after_ms: Some(retry_after_ms),
                ..ApiError::new(ErrorCode::RateLimited, err.to_string())
            },
            CoreError::ArithmeticInvariantViolation { .. } => ApiError::internal(err.to_string()),
            CoreError::Validation(e) => e.into(),
            CoreError::Coupon(e) => e.into(),
            CoreError::Store(e) => e.into(),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        ApiError::new(ErrorCode::PaymentError, err.to_string())
    }
}

// =============================================================================
// Response Envelope
// =============================================================================

/// `{ success, data | message }` response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl<T: Serialize> From<Result<T, ApiError>> for ApiResponse<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(data) => ApiResponse {
                success: true,
                data: Some(data),
                message: None,
                error: None,
            },
            Err(err) => ApiResponse {
                success: false,
                data: None,
                message: Some(err.message.clone()),
                error: Some(err),
            },
        }
    }
}

// =============================================================================
// Config Error
// =============================================================================

/// Invalid configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::Money;

    #[test]
    fn test_rate_limit_maps_with_retry() {
        let err: ApiError = CoreError::RateLimitExceeded {
            retry_after_ms: 1_000,
        }
        .into();
        assert_eq!(err.code, ErrorCode::RateLimited);
        assert_eq!(err.retry_after_ms, Some(1_000));
    }

    #[test]
    fn test_coupon_error_maps() {
        let err: ApiError = CoreError::Coupon(CouponError::MinimumNotMet {
            code: "SAVE50".to_string(),
            minimum: Money::from_rupees(1000),
        })
        .into();
        assert_eq!(err.code, ErrorCode::CouponError);
        assert!(err.message.contains("₹1000.00"));
    }

    #[test]
    fn test_envelope_shape() {
        let ok: ApiResponse<u32> = Ok(3).into();
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "data": 3 }));

        let missing = ApiError::not_found("Book b1 is not in the cart");
        let failed: ApiResponse<u32> = Err(missing).into();
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Book b1 is not in the cart");
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_validation_fields_serialize() {
        let err = ApiError::invalid_fields(&[ValidationError::Required {
            field: "cvv".to_string(),
        }]);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["fields"][0]["field"], "cvv");
        assert_eq!(json["fields"][0]["message"], "cvv is required");
    }
}
