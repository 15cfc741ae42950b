//! # Validation Module
//!
//! Input validation for catalog, order and payment requests. Runs before
//! business logic; the database constraints are the last line of defense
//! behind these checks.

use crate::error::ValidationError;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates a product title: non-empty after trimming, at most 150 chars.
pub fn validate_title(title: &str) -> ValidationResult<()> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ValidationError::Required { field: "title".to_string() });
    }
    if title.len() > 150 {
        return Err(ValidationError::TooLong { field: "title".to_string(), max: 150 });
    }

    Ok(())
}

/// Validates a product price: strictly positive.
pub fn validate_price_cents(price_cents: i64) -> ValidationResult<()> {
    if price_cents <= 0 {
        return Err(ValidationError::MustBePositive { field: "price".to_string() });
    }
    Ok(())
}

// =============================================================================
// Order Validators
// =============================================================================

/// Validates a line-item quantity: at least 1, bounded above to catch typos.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 1 || quantity > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

// =============================================================================
// Payment Validators
// =============================================================================

/// Validates an installment count: at least 1.
pub fn validate_installments(installments: i64) -> ValidationResult<()> {
    if installments < 1 {
        return Err(ValidationError::MustBePositive { field: "installments".to_string() });
    }
    Ok(())
}

/// Validates card last digits when present: exactly four ASCII digits.
pub fn validate_card_last_digits(digits: &str) -> ValidationResult<()> {
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "card_last_digits".to_string(),
            reason: "expected exactly four digits".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
