//! # Lifecycle State Machines
//!
//! Explicit transition tables for order and payment statuses.
//!
//! ## State Machines
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Order                                                                  │
//! │                                                                         │
//! │    AwaitingPayment ──► Paid ──► Cancelled                              │
//! │           │                        ▲                                    │
//! │           └────────────────────────┘                                    │
//! │    (no transition out of Cancelled)                                     │
//! │                                                                         │
//! │  Payment                                                                │
//! │                                                                         │
//! │    Pending ──► Processing ──► Approved ──► Refunded                    │
//! │       │             │             ▲                                     │
//! │       │             ├──► Declined │ (terminal)                          │
//! │       └──► Cancelled◄┘                                                  │
//! │    (Declined, Cancelled, Refunded are terminal)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Guarded operations in the service layer consult these tables and reject
//! anything else as a business-rule violation. A separate administrative
//! force-set bypasses the table and is audited via `tracing::warn!` at the
//! call site.

use crate::error::{CoreError, CoreResult};
use crate::types::{OrderStatus, PaymentStatus};

// =============================================================================
// Order Transitions
// =============================================================================

impl OrderStatus {
    /// Whether the guarded lifecycle permits moving to `next`.
    pub const fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (AwaitingPayment, Paid) | (AwaitingPayment, Cancelled) | (Paid, Cancelled)
        )
    }

    /// Checks the transition table, returning the rejected pair on failure.
    pub fn transition_to(self, next: OrderStatus) -> CoreResult<OrderStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidTransition {
                entity: "Order",
                from: format!("{self:?}"),
                to: format!("{next:?}"),
            })
        }
    }

    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Cancelled)
    }
}

// =============================================================================
// Payment Transitions
// =============================================================================

impl PaymentStatus {
    /// Whether the guarded lifecycle permits moving to `next`.
    pub const fn can_transition_to(self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Pending, Cancelled)
                | (Processing, Approved)
                | (Processing, Declined)
                | (Processing, Cancelled)
                | (Approved, Refunded)
        )
    }

    /// Checks the transition table, returning the rejected pair on failure.
    pub fn transition_to(self, next: PaymentStatus) -> CoreResult<PaymentStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidTransition {
                entity: "Payment",
                from: format!("{self:?}"),
                to: format!("{next:?}"),
            })
        }
    }

    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            PaymentStatus::Declined | PaymentStatus::Cancelled | PaymentStatus::Refunded
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_transitions() {
        assert!(OrderStatus::AwaitingPayment.can_transition_to(OrderStatus::Paid));
        assert!(OrderStatus::AwaitingPayment.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Paid.can_transition_to(OrderStatus::Cancelled));

        // No way out of Cancelled
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Paid));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::AwaitingPayment));
        // Paid never goes back to awaiting
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::AwaitingPayment));
    }

    #[test]
    fn test_payment_transitions() {
        use PaymentStatus::*;

        assert!(Pending.can_transition_to(Processing));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Processing.can_transition_to(Approved));
        assert!(Processing.can_transition_to(Declined));
        assert!(Processing.can_transition_to(Cancelled));
        assert!(Approved.can_transition_to(Refunded));

        // Approved cannot be cancelled, only refunded
        assert!(!Approved.can_transition_to(Cancelled));
        // Terminal states go nowhere
        for terminal in [Declined, Cancelled, Refunded] {
            assert!(terminal.is_terminal());
            for next in [Pending, Processing, Approved, Declined, Cancelled, Refunded] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_transition_to_error_message() {
        let err = PaymentStatus::Approved
            .transition_to(PaymentStatus::Cancelled)
            .unwrap_err();
        assert_eq!(err.to_string(), "Payment cannot transition from Approved to Cancelled");
    }
}
