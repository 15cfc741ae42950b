//! Service-level error types.
//!
//! Every service operation returns [`ServiceError`]. The variants map onto
//! transport status codes one-to-one: `NotFound` → 404, `Validation` → 400,
//! `BusinessRule` → 422, `Conflict` → 409, `Forbidden` → 403, the rest → 500.

use thiserror::Error;

use ordena_core::error::{CoreError, ValidationError};
use ordena_db::DbError;

/// Errors surfaced by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The referenced entity does not exist. Lookup by id and lookup by
    /// any alternate key (order number, transaction code) both end here.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Input failed validation before touching the database.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A domain rule rejected the operation (illegal status transition,
    /// duplicate username, archived product in an order, ...).
    #[error("business rule violated: {0}")]
    BusinessRule(String),

    /// A concurrent writer got there first; the caller should reload and
    /// retry with fresh state.
    #[error("concurrent modification of {entity} {id}")]
    Conflict { entity: &'static str, id: String },

    /// The authenticated role is not allowed to perform this operation.
    #[error("role {role} may not {action}")]
    Forbidden { role: &'static str, action: &'static str },

    /// The payment gateway rejected or failed the request.
    #[error("gateway error: {0}")]
    Gateway(String),

    /// Persistence failure not attributable to the caller.
    #[error("database error: {0}")]
    Database(DbError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        ServiceError::NotFound { entity, id: id.into() }
    }

    pub fn business_rule(msg: impl Into<String>) -> Self {
        ServiceError::BusinessRule(msg.into())
    }
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            DbError::Conflict { entity, id } => ServiceError::Conflict { entity, id },
            other => ServiceError::Database(other),
        }
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => ServiceError::Validation(v),
            CoreError::InvalidTransition { entity, from, to } => {
                ServiceError::BusinessRule(format!(
                    "{entity} cannot move from {from} to {to}"
                ))
            }
            other @ CoreError::InvalidEnumCode { .. } => {
                ServiceError::BusinessRule(other.to_string())
            }
        }
    }
}

/// Result alias for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_not_found_maps_to_not_found() {
        let err: ServiceError = DbError::not_found("Order", "abc").into();
        assert!(matches!(err, ServiceError::NotFound { entity: "Order", .. }));
    }

    #[test]
    fn test_db_conflict_maps_to_conflict() {
        let err: ServiceError = DbError::conflict("Payment", "abc").into();
        assert!(matches!(err, ServiceError::Conflict { entity: "Payment", .. }));
    }

    #[test]
    fn test_invalid_transition_is_business_rule() {
        let err: ServiceError = CoreError::InvalidTransition {
            entity: "Payment",
            from: "approved".to_string(),
            to: "pending".to_string(),
        }
        .into();
        assert!(matches!(err, ServiceError::BusinessRule(_)));
    }
}
