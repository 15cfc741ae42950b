//! # Payment Lifecycle Manager
//!
//! Creates payment attempts against orders and drives them through the
//! payment status machine via the pluggable [`PaymentGateway`].
//!
//! ## Atomicity
//! Approval and refund mutate both the payment and its owning order. Those
//! two writes always go through `PaymentRepository::update_with_order`, one
//! SQL transaction, so a declined CAS on either row rolls back both.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use ordena_core::validation::{validate_card_last_digits, validate_installments};
use ordena_core::{
    Order, OrderStatus, Payment, PaymentMethod, PaymentStatus, BANK_SLIP_DUE_DAYS,
};
use ordena_db::{Database, PaymentFilter};

use crate::error::{ServiceError, ServiceResult};
use crate::gateway::PaymentGateway;

/// Input for creating a payment attempt.
#[derive(Debug, Clone, Default)]
pub struct PaymentInput {
    /// Defaults to the order total when absent.
    pub amount_cents: Option<i64>,
    /// Defaults to 1 when absent.
    pub installments: Option<i64>,
    pub card_brand: Option<String>,
    pub card_last_digits: Option<String>,
    pub note: Option<String>,
}

/// Payment management service.
#[derive(Clone)]
pub struct PaymentService {
    db: Arc<Database>,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentService {
    pub fn new(db: Arc<Database>, gateway: Arc<dyn PaymentGateway>) -> Self {
        PaymentService { db, gateway }
    }

    /// Creates a Pending payment against an order. The amount defaults to
    /// the order total; bank slips fall due three days out.
    pub async fn create_payment(
        &self,
        order_id: &str,
        method: PaymentMethod,
        input: PaymentInput,
    ) -> ServiceResult<Payment> {
        let order = self.get_order(order_id).await?;
        if order.status != OrderStatus::AwaitingPayment {
            return Err(ServiceError::business_rule(
                "payments can only be created for orders awaiting payment",
            ));
        }

        let installments = input.installments.unwrap_or(1);
        validate_installments(installments)?;
        if let Some(digits) = &input.card_last_digits {
            validate_card_last_digits(digits)?;
        }

        let amount_cents = input.amount_cents.unwrap_or(order.total_cents);
        if amount_cents <= 0 {
            return Err(ServiceError::business_rule("payment amount must be positive"));
        }

        let now = Utc::now();
        let due_date = match method {
            PaymentMethod::BankSlip => Some(now + Duration::days(BANK_SLIP_DUE_DAYS)),
            _ => None,
        };

        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            order_id: order.id.clone(),
            method,
            status: PaymentStatus::Pending,
            amount_cents,
            installments,
            transaction_code: Uuid::new_v4().to_string(),
            authorization_code: None,
            nsu: None,
            card_brand: input.card_brand,
            card_last_digits: input.card_last_digits,
            due_date,
            paid_at: None,
            note: input.note,
            version: 0,
            created_at: now,
            updated_at: now,
        };

        self.db.payments().insert(&payment).await?;
        info!(
            id = %payment.id,
            order_id = %payment.order_id,
            method = ?payment.method,
            amount_cents = payment.amount_cents,
            "Payment created"
        );
        Ok(payment)
    }

    /// Sends a Pending payment through the gateway. An approval stamps the
    /// acquirer codes and paid_at and flips the order to Paid atomically; a
    /// decline marks the payment Declined and leaves the order untouched.
    pub async fn process_payment(&self, id: &str) -> ServiceResult<Payment> {
        let mut payment = self.get(id).await?;
        if payment.status != PaymentStatus::Pending {
            return Err(ServiceError::business_rule(format!(
                "only pending payments can be processed, found {:?}",
                payment.status
            )));
        }

        payment.status = payment.status.transition_to(PaymentStatus::Processing)?;
        payment.updated_at = Utc::now();
        self.db.payments().update(&payment).await?;
        payment.version += 1;

        let auth = self.gateway.authorize(&payment).await?;
        payment.authorization_code = Some(auth.authorization_code);
        payment.nsu = Some(auth.nsu);
        payment.updated_at = Utc::now();

        if auth.approved {
            payment.status = payment.status.transition_to(PaymentStatus::Approved)?;
            payment.paid_at = Some(payment.updated_at);

            let order = self.paid_order(&payment).await?;
            self.db.payments().update_with_order(&payment, &order).await?;
            payment.version += 1;

            info!(id = %payment.id, order_id = %payment.order_id, "Payment approved");
        } else {
            payment.status = payment.status.transition_to(PaymentStatus::Declined)?;
            payment.note = auth.message;

            self.db.payments().update(&payment).await?;
            payment.version += 1;

            info!(id = %payment.id, order_id = %payment.order_id, "Payment declined");
        }

        Ok(payment)
    }

    /// Guarded status transition per the payment status table. Moving to
    /// Approved also stamps paid_at and flips the order to Paid.
    pub async fn update_status(
        &self,
        id: &str,
        next: PaymentStatus,
    ) -> ServiceResult<Payment> {
        let mut payment = self.get(id).await?;
        payment.status = payment.status.transition_to(next)?;
        payment.updated_at = Utc::now();

        if next == PaymentStatus::Approved {
            payment.paid_at = Some(payment.updated_at);
            let order = self.paid_order(&payment).await?;
            self.db.payments().update_with_order(&payment, &order).await?;
        } else {
            self.db.payments().update(&payment).await?;
        }

        self.get(id).await
    }

    /// Administrative override: sets the status regardless of the
    /// transition table and leaves an audit record in the log. Forcing to
    /// Approved carries the same side effect as the guarded path: paid_at
    /// is stamped and an order still awaiting payment flips to Paid.
    pub async fn force_set_status(
        &self,
        id: &str,
        next: PaymentStatus,
    ) -> ServiceResult<Payment> {
        let mut payment = self.get(id).await?;

        warn!(
            id = %payment.id,
            order_id = %payment.order_id,
            from = ?payment.status,
            to = ?next,
            "Payment status force-set, bypassing transition table"
        );

        payment.status = next;
        payment.updated_at = Utc::now();

        if next == PaymentStatus::Approved {
            payment.paid_at = Some(payment.updated_at);
            let mut order = self.get_order(&payment.order_id).await?;
            if order.status == OrderStatus::AwaitingPayment {
                order.status = OrderStatus::Paid;
                order.updated_at = payment.updated_at;
                self.db.payments().update_with_order(&payment, &order).await?;
            } else {
                self.db.payments().update(&payment).await?;
            }
        } else {
            self.db.payments().update(&payment).await?;
        }

        self.get(id).await
    }

    /// Cancels a payment that has not yet settled. Approved payments must
    /// be refunded instead.
    pub async fn cancel_payment(&self, id: &str) -> ServiceResult<Payment> {
        let payment = self.get(id).await?;
        if payment.status == PaymentStatus::Approved {
            return Err(ServiceError::business_rule(
                "approved payments cannot be cancelled, refund instead",
            ));
        }
        if payment.status.is_terminal() {
            return Err(ServiceError::business_rule(format!(
                "payment is already settled as {:?}",
                payment.status
            )));
        }

        self.update_status(id, PaymentStatus::Cancelled).await
    }

    /// Refunds an approved payment: Payment → Refunded and Order →
    /// Cancelled in one transaction.
    pub async fn refund_payment(&self, id: &str) -> ServiceResult<Payment> {
        let mut payment = self.get(id).await?;
        payment.status = payment.status.transition_to(PaymentStatus::Refunded)?;
        payment.updated_at = Utc::now();

        let mut order = self.get_order(&payment.order_id).await?;
        order.status = order.status.transition_to(OrderStatus::Cancelled)?;
        order.updated_at = payment.updated_at;

        self.db.payments().update_with_order(&payment, &order).await?;

        info!(id = %payment.id, order_id = %order.id, "Payment refunded, order cancelled");
        self.get(id).await
    }

    /// Gets a payment or fails with NotFound.
    pub async fn get(&self, id: &str) -> ServiceResult<Payment> {
        self.db
            .payments()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Payment", id))
    }

    /// All payment attempts against an order, oldest first.
    pub async fn find_by_order(&self, order_id: &str) -> ServiceResult<Vec<Payment>> {
        Ok(self.db.payments().find_by_order(order_id).await?)
    }

    /// All payments with a method.
    pub async fn find_by_method(&self, method: PaymentMethod) -> ServiceResult<Vec<Payment>> {
        Ok(self.db.payments().find_by_method(method).await?)
    }

    /// All payments in a status.
    pub async fn find_by_status(&self, status: PaymentStatus) -> ServiceResult<Vec<Payment>> {
        Ok(self.db.payments().find_by_status(status).await?)
    }

    /// Composite filter query; absent fields impose no constraint.
    pub async fn find_by_filters(&self, filter: &PaymentFilter) -> ServiceResult<Vec<Payment>> {
        Ok(self.db.payments().find_by_filters(filter).await?)
    }

    async fn get_order(&self, order_id: &str) -> ServiceResult<Order> {
        self.db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", order_id))
    }

    /// The owning order moved to Paid, with the transition guard applied.
    async fn paid_order(&self, payment: &Payment) -> ServiceResult<Order> {
        let mut order = self.get_order(&payment.order_id).await?;
        order.status = order.status.transition_to(OrderStatus::Paid)?;
        order.updated_at = payment.updated_at;
        Ok(order)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ProductInput, ProductService};
    use crate::gateway::SimulatedGateway;
    use crate::orders::{OrderItemInput, OrderService, PricingOverrides};

    async fn setup(gateway: SimulatedGateway) -> (OrderService, PaymentService, String) {
        let db = Arc::new(
            Database::new(ordena_db::DbConfig::in_memory())
                .await
                .unwrap(),
        );
        let orders = OrderService::new(db.clone());
        let payments = PaymentService::new(db.clone(), Arc::new(gateway));

        let product = ProductService::new(db)
            .create(ProductInput {
                title: "Monitor".to_string(),
                description: None,
                price_cents: 30_000,
                category: None,
                status: None,
            })
            .await
            .unwrap();
        let detail = orders
            .create_order(
                &[OrderItemInput { product_id: product.id, quantity: 1 }],
                PricingOverrides::default(),
            )
            .await
            .unwrap();

        (orders, payments, detail.order.id)
    }

    #[tokio::test]
    async fn test_create_defaults_amount_to_order_total() {
        let (_orders, payments, order_id) = setup(SimulatedGateway::new()).await;

        let payment = payments
            .create_payment(&order_id, PaymentMethod::Pix, PaymentInput::default())
            .await
            .unwrap();
        assert_eq!(payment.status, PaymentStatus::Pending);
        // 300.00 subtotal ⇒ no discount, reduced freight 20.00
        assert_eq!(payment.amount_cents, 32_000);
        assert_eq!(payment.installments, 1);
        assert!(payment.due_date.is_none());
    }

    #[tokio::test]
    async fn test_bank_slip_gets_due_date() {
        let (_orders, payments, order_id) = setup(SimulatedGateway::new()).await;

        let payment = payments
            .create_payment(&order_id, PaymentMethod::BankSlip, PaymentInput::default())
            .await
            .unwrap();

        let due = payment.due_date.expect("bank slip must have a due date");
        let days = (due - payment.created_at).num_days();
        assert_eq!(days, 3);
    }

    #[tokio::test]
    async fn test_process_approves_and_pays_order() {
        let (orders, payments, order_id) = setup(SimulatedGateway::new()).await;

        let payment = payments
            .create_payment(&order_id, PaymentMethod::Pix, PaymentInput::default())
            .await
            .unwrap();
        let processed = payments.process_payment(&payment.id).await.unwrap();

        assert_eq!(processed.status, PaymentStatus::Approved);
        assert!(processed.paid_at.is_some());
        assert_eq!(processed.authorization_code.as_ref().unwrap().len(), 8);
        assert_eq!(processed.nsu.as_ref().unwrap().len(), 12);

        let order = orders.get(&order_id).await.unwrap().order;
        assert_eq!(order.status, OrderStatus::Paid);

        // Settled payments cannot be processed again
        let err = payments.process_payment(&payment.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn test_decline_leaves_order_untouched() {
        let (orders, payments, order_id) = setup(SimulatedGateway::declining()).await;

        let payment = payments
            .create_payment(&order_id, PaymentMethod::Pix, PaymentInput::default())
            .await
            .unwrap();
        let processed = payments.process_payment(&payment.id).await.unwrap();

        assert_eq!(processed.status, PaymentStatus::Declined);
        assert!(processed.paid_at.is_none());
        assert!(processed.note.is_some());

        let order = orders.get(&order_id).await.unwrap().order;
        assert_eq!(order.status, OrderStatus::AwaitingPayment);

        // A new attempt against the same order is allowed
        let retry = payments
            .create_payment(&order_id, PaymentMethod::Pix, PaymentInput::default())
            .await
            .unwrap();
        assert_eq!(retry.status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_cancel_rules() {
        let (_orders, payments, order_id) = setup(SimulatedGateway::new()).await;

        let payment = payments
            .create_payment(&order_id, PaymentMethod::Pix, PaymentInput::default())
            .await
            .unwrap();

        // Pending cancels fine
        let cancelled = payments.cancel_payment(&payment.id).await.unwrap();
        assert_eq!(cancelled.status, PaymentStatus::Cancelled);

        // and a cancelled payment is terminal
        let err = payments.cancel_payment(&payment.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn test_refund_cancels_order() {
        let (orders, payments, order_id) = setup(SimulatedGateway::new()).await;

        let payment = payments
            .create_payment(&order_id, PaymentMethod::Pix, PaymentInput::default())
            .await
            .unwrap();
        payments.process_payment(&payment.id).await.unwrap();

        // Refund requires Approved; a fresh pending payment cannot refund
        let refunded = payments.refund_payment(&payment.id).await.unwrap();
        assert_eq!(refunded.status, PaymentStatus::Refunded);

        let order = orders.get(&order_id).await.unwrap().order;
        assert_eq!(order.status, OrderStatus::Cancelled);

        // Refunded is terminal
        let err = payments.refund_payment(&payment.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn test_update_status_is_guarded_but_force_set_is_not() {
        let (orders, payments, order_id) = setup(SimulatedGateway::new()).await;

        let payment = payments
            .create_payment(&order_id, PaymentMethod::Pix, PaymentInput::default())
            .await
            .unwrap();

        // Pending cannot jump straight to Approved
        let err = payments
            .update_status(&payment.id, PaymentStatus::Approved)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BusinessRule(_)));

        // Forcing to Approved carries the approval side effects
        let forced = payments
            .force_set_status(&payment.id, PaymentStatus::Approved)
            .await
            .unwrap();
        assert_eq!(forced.status, PaymentStatus::Approved);
        assert!(forced.paid_at.is_some());

        let order = orders.get(&order_id).await.unwrap().order;
        assert_eq!(order.status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let (_orders, payments, order_id) = setup(SimulatedGateway::new()).await;

        let err = payments
            .create_payment(
                &order_id,
                PaymentMethod::CreditCard,
                PaymentInput { installments: Some(0), ..Default::default() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = payments
            .create_payment(
                &order_id,
                PaymentMethod::CreditCard,
                PaymentInput { card_last_digits: Some("12a4".to_string()), ..Default::default() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = payments
            .create_payment("nope", PaymentMethod::Pix, PaymentInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: "Order", .. }));
    }
}
