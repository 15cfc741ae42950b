//! # Error Types
//!
//! Domain-specific error types for ordena-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ordena-core errors (this file)                                         │
//! │  ├── CoreError        - Domain rule and decode failures                 │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  ordena-db errors     - DbError (database operation failures)           │
//! │  ordena-service errors- ServiceError (what a transport layer sees)      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → caller              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A persisted integer code does not map to any enum variant.
    /// This is a fatal decode error, never a silent default.
    #[error("Invalid code for {kind}: {code}")]
    InvalidEnumCode { kind: &'static str, code: i32 },

    /// A guarded lifecycle transition was rejected by the transition table.
    #[error("{entity} cannot transition from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, raised before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., non-numeric card digits).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidEnumCode { kind: "OrderStatus", code: 9 };
        assert_eq!(err.to_string(), "Invalid code for OrderStatus: 9");

        let err = CoreError::InvalidTransition {
            entity: "Payment",
            from: "approved".to_string(),
            to: "cancelled".to_string(),
        };
        assert_eq!(err.to_string(), "Payment cannot transition from approved to cancelled");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required { field: "title".to_string() };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
