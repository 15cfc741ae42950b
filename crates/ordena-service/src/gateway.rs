//! # Payment Gateway
//!
//! Seam between payment processing and the external acquirer. The service
//! layer only ever talks to the [`PaymentGateway`] trait; swapping the
//! simulated implementation for a real acquirer integration touches nothing
//! else.

use async_trait::async_trait;
use rand::Rng;

use crate::error::ServiceResult;
use ordena_core::Payment;

/// Outcome of an authorization attempt against the acquirer.
#[derive(Debug, Clone)]
pub struct GatewayAuthorization {
    /// Whether the acquirer approved the charge.
    pub approved: bool,

    /// Acquirer authorization code (8 uppercase alphanumeric chars).
    pub authorization_code: String,

    /// Acquirer NSU reference (12 digits, zero-padded).
    pub nsu: String,

    /// Human-readable acquirer message, set on declines.
    pub message: Option<String>,
}

/// An external payment acquirer.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Submits a payment for authorization. A declined charge is a normal
    /// `Ok` outcome with `approved == false`; `Err` means the gateway itself
    /// failed (timeout, malformed response).
    async fn authorize(&self, payment: &Payment) -> ServiceResult<GatewayAuthorization>;
}

/// In-process gateway that fabricates acquirer codes. Approves everything by
/// default; construct with [`SimulatedGateway::declining`] to exercise the
/// decline path.
#[derive(Debug, Clone, Default)]
pub struct SimulatedGateway {
    decline_all: bool,
}

impl SimulatedGateway {
    pub fn new() -> Self {
        SimulatedGateway { decline_all: false }
    }

    /// A gateway that declines every charge.
    pub fn declining() -> Self {
        SimulatedGateway { decline_all: true }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn authorize(&self, _payment: &Payment) -> ServiceResult<GatewayAuthorization> {
        if self.decline_all {
            return Ok(GatewayAuthorization {
                approved: false,
                authorization_code: random_authorization_code(),
                nsu: random_nsu(),
                message: Some("transaction declined by issuer".to_string()),
            });
        }

        Ok(GatewayAuthorization {
            approved: true,
            authorization_code: random_authorization_code(),
            nsu: random_nsu(),
            message: None,
        })
    }
}

const AUTH_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const AUTH_CODE_LEN: usize = 8;

fn random_authorization_code() -> String {
    let mut rng = rand::thread_rng();
    (0..AUTH_CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..AUTH_CODE_CHARSET.len());
            AUTH_CODE_CHARSET[idx] as char
        })
        .collect()
}

fn random_nsu() -> String {
    let mut rng = rand::thread_rng();
    format!("{:012}", rng.gen_range(0..1_000_000_000_000u64))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ordena_core::{PaymentMethod, PaymentStatus};

    fn sample_payment() -> Payment {
        let now = Utc::now();
        Payment {
            id: "p1".to_string(),
            order_id: "o1".to_string(),
            method: PaymentMethod::CreditCard,
            status: PaymentStatus::Processing,
            amount_cents: 10_000,
            installments: 1,
            transaction_code: "t1".to_string(),
            authorization_code: None,
            nsu: None,
            card_brand: None,
            card_last_digits: None,
            due_date: None,
            paid_at: None,
            note: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_simulated_gateway_approves_with_codes() {
        let gateway = SimulatedGateway::new();
        let auth = gateway.authorize(&sample_payment()).await.unwrap();

        assert!(auth.approved);
        assert_eq!(auth.authorization_code.len(), 8);
        assert!(auth
            .authorization_code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        assert_eq!(auth.nsu.len(), 12);
        assert!(auth.nsu.chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn test_declining_gateway_declines() {
        let gateway = SimulatedGateway::declining();
        let auth = gateway.authorize(&sample_payment()).await.unwrap();

        assert!(!auth.approved);
        assert!(auth.message.is_some());
    }
}
