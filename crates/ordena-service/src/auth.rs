//! Role gates.
//!
//! Token issuance and verification live in the auth gateway in front of this
//! layer; by the time a service method runs, the caller's [`Role`] is already
//! resolved. This module only answers "may this role do that" with the
//! per-operation policy constants.

use ordena_core::Role;

use crate::error::{ServiceError, ServiceResult};

/// Roles allowed to create and update catalog products.
pub const PRODUCT_WRITE: &[Role] = &[Role::Admin, Role::Operador];

/// Roles allowed to delete catalog products.
pub const PRODUCT_DELETE: &[Role] = &[Role::Admin];

/// Roles allowed to create orders and payments.
pub const ORDER_CREATE: &[Role] = &[Role::Admin, Role::Operador, Role::Cliente];

/// Roles allowed to update orders and drive payment lifecycles.
pub const ORDER_WRITE: &[Role] = &[Role::Admin, Role::Operador];

/// Roles allowed to delete orders and to refund payments.
pub const ORDER_DELETE: &[Role] = &[Role::Admin];

/// Roles allowed to run reports.
pub const REPORT_READ: &[Role] = &[Role::Admin, Role::Operador];

/// Checks that `role` is in `allowed`, or returns a Forbidden error naming
/// the rejected action.
pub fn require_role(role: Role, allowed: &[Role], action: &'static str) -> ServiceResult<()> {
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden { role: role.authority(), action })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_passes_every_gate() {
        for gate in [PRODUCT_WRITE, PRODUCT_DELETE, ORDER_CREATE, ORDER_WRITE, ORDER_DELETE, REPORT_READ] {
            assert!(require_role(Role::Admin, gate, "anything").is_ok());
        }
    }

    #[test]
    fn test_cliente_may_create_but_not_manage() {
        assert!(require_role(Role::Cliente, ORDER_CREATE, "create order").is_ok());
        assert!(require_role(Role::Cliente, ORDER_WRITE, "update order").is_err());
        assert!(require_role(Role::Cliente, REPORT_READ, "run report").is_err());
    }

    #[test]
    fn test_operador_cannot_delete() {
        assert!(require_role(Role::Operador, PRODUCT_WRITE, "update product").is_ok());
        let err = require_role(Role::Operador, ORDER_DELETE, "delete order").unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden { role: "ROLE_OPERADOR", .. }));
    }
}
