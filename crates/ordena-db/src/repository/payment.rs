//! # Payment Repository
//!
//! Database operations for payments.
//!
//! ## Transactions
//! Approval and refund touch both the payment and its owning order. Those
//! writes go through [`PaymentRepository::update_with_order`], which commits
//! both rows in one SQL transaction: if the order CAS fails, the payment
//! update rolls back with it.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use ordena_core::{Order, Payment, PaymentMethod, PaymentStatus};

const PAYMENT_COLUMNS: &str = "id, order_id, method, status, amount_cents, installments, \
                               transaction_code, authorization_code, nsu, card_brand, \
                               card_last_digits, due_date, paid_at, note, version, \
                               created_at, updated_at";

/// Optional filters for the composite payment query.
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub method: Option<PaymentMethod>,
    pub status: Option<PaymentStatus>,
    pub created_from: Option<chrono::DateTime<chrono::Utc>>,
    pub created_to: Option<chrono::DateTime<chrono::Utc>>,
}

/// Repository for payment database operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Inserts a payment row.
    pub async fn insert(&self, payment: &Payment) -> DbResult<()> {
        debug!(id = %payment.id, order_id = %payment.order_id, "Inserting payment");

        sqlx::query(
            r#"
            INSERT INTO payments (id, order_id, method, status, amount_cents, installments,
                                  transaction_code, authorization_code, nsu, card_brand,
                                  card_last_digits, due_date, paid_at, note, version,
                                  created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.order_id)
        .bind(payment.method)
        .bind(payment.status)
        .bind(payment.amount_cents)
        .bind(payment.installments)
        .bind(&payment.transaction_code)
        .bind(&payment.authorization_code)
        .bind(&payment.nsu)
        .bind(&payment.card_brand)
        .bind(&payment.card_last_digits)
        .bind(payment.due_date)
        .bind(payment.paid_at)
        .bind(&payment.note)
        .bind(payment.version)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a payment by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Updates a payment's mutable fields (CAS on `payment.version`; the
    /// stored version becomes `payment.version + 1`).
    pub async fn update(&self, payment: &Payment) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        update_payment_row(&mut tx, payment).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Updates a payment and its owning order in one transaction
    /// (all-or-nothing). Both rows are CAS-guarded; a conflict on either
    /// rolls back the whole write.
    pub async fn update_with_order(&self, payment: &Payment, order: &Order) -> DbResult<()> {
        debug!(
            payment_id = %payment.id,
            order_id = %order.id,
            payment_status = ?payment.status,
            order_status = ?order.status,
            "Updating payment with owning order"
        );

        let mut tx = self.pool.begin().await?;

        update_payment_row(&mut tx, payment).await?;

        let result = sqlx::query(
            r#"
            UPDATE orders SET status = ?2, version = version + 1, updated_at = ?3
            WHERE id = ?1 AND version = ?4
            "#,
        )
        .bind(&order.id)
        .bind(order.status)
        .bind(order.updated_at)
        .bind(order.version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict("Order", &order.id));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets all payments for an order, oldest first.
    pub async fn find_by_order(&self, order_id: &str) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE order_id = ?1 ORDER BY created_at, id"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Finds payments by method.
    pub async fn find_by_method(&self, method: PaymentMethod) -> DbResult<Vec<Payment>> {
        self.find_by_filters(&PaymentFilter { method: Some(method), ..Default::default() })
            .await
    }

    /// Finds payments by status.
    pub async fn find_by_status(&self, status: PaymentStatus) -> DbResult<Vec<Payment>> {
        self.find_by_filters(&PaymentFilter { status: Some(status), ..Default::default() })
            .await
    }

    /// Finds a payment by its unique transaction code.
    pub async fn find_by_transaction_code(&self, code: &str) -> DbResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE transaction_code = ?1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Composite filter query; absent fields impose no constraint.
    pub async fn find_by_filters(&self, filter: &PaymentFilter) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS} FROM payments
            WHERE (?1 IS NULL OR method = ?1)
              AND (?2 IS NULL OR status = ?2)
              AND (?3 IS NULL OR created_at >= ?3)
              AND (?4 IS NULL OR created_at < ?4)
            ORDER BY created_at, id
            "#
        ))
        .bind(filter.method.map(|m| m.code()))
        .bind(filter.status.map(|s| s.code()))
        .bind(filter.created_from)
        .bind(filter.created_to)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }
}

async fn update_payment_row(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    payment: &Payment,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE payments SET
            status = ?2,
            authorization_code = ?3,
            nsu = ?4,
            paid_at = ?5,
            note = ?6,
            version = version + 1,
            updated_at = ?7
        WHERE id = ?1 AND version = ?8
        "#,
    )
    .bind(&payment.id)
    .bind(payment.status)
    .bind(&payment.authorization_code)
    .bind(&payment.nsu)
    .bind(payment.paid_at)
    .bind(&payment.note)
    .bind(payment.updated_at)
    .bind(payment.version)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::conflict("Payment", &payment.id));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
