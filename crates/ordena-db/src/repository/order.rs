//! # Order Repository
//!
//! Database operations for orders and their line items.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  orders ──┬── order_items   (ON DELETE CASCADE, replaced wholesale)    │
//! │           └── payments      (ON DELETE CASCADE)                        │
//! │                                                                         │
//! │  Deleting an order deletes its items and payments. Updating an         │
//! │  order's item list discards the old items - there is no merge.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Optimistic Concurrency
//! Every order write is a compare-and-swap on the `version` column. A write
//! whose expected version no longer matches affects zero rows and surfaces
//! as [`DbError::Conflict`]; the caller re-reads and retries.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use ordena_core::{Order, OrderItem, OrderStatus};

const ORDER_COLUMNS: &str = "id, order_number, status, subtotal_cents, discount_cents, \
                             freight_cents, total_cents, manual_discount_cents, \
                             manual_freight_cents, version, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, title_snapshot, unit_price_cents, \
                            quantity, line_total_cents, created_at";

/// Optional filters for the composite order query. Absent fields impose no
/// constraint.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub created_from: Option<chrono::DateTime<chrono::Utc>>,
    pub created_to: Option<chrono::DateTime<chrono::Utc>>,
    pub min_total_cents: Option<i64>,
    pub max_total_cents: Option<i64>,
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order together with its items in one transaction.
    ///
    /// A duplicate `order_number` fails with UniqueViolation; the service
    /// layer retries with a fresh random number.
    pub async fn insert_with_items(&self, order: &Order, items: &[OrderItem]) -> DbResult<()> {
        debug!(id = %order.id, order_number = order.order_number, "Inserting order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, order_number, status, subtotal_cents, discount_cents,
                                freight_cents, total_cents, manual_discount_cents,
                                manual_freight_cents, version, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&order.id)
        .bind(order.order_number)
        .bind(order.status)
        .bind(order.subtotal_cents)
        .bind(order.discount_cents)
        .bind(order.freight_cents)
        .bind(order.total_cents)
        .bind(order.manual_discount_cents)
        .bind(order.manual_freight_cents)
        .bind(order.version)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            insert_item(&mut tx, item).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets all items for an order, in insertion order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ?1 ORDER BY created_at, id"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Replaces an order's item list and totals in one transaction.
    ///
    /// Old items are deleted, not merged. The order row is updated via CAS
    /// on `order.version`; the stored version becomes `order.version + 1`.
    pub async fn replace_items(&self, order: &Order, items: &[OrderItem]) -> DbResult<()> {
        debug!(id = %order.id, item_count = items.len(), "Replacing order items");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = ?2,
                subtotal_cents = ?3,
                discount_cents = ?4,
                freight_cents = ?5,
                total_cents = ?6,
                manual_discount_cents = ?7,
                manual_freight_cents = ?8,
                version = version + 1,
                updated_at = ?9
            WHERE id = ?1 AND version = ?10
            "#,
        )
        .bind(&order.id)
        .bind(order.status)
        .bind(order.subtotal_cents)
        .bind(order.discount_cents)
        .bind(order.freight_cents)
        .bind(order.total_cents)
        .bind(order.manual_discount_cents)
        .bind(order.manual_freight_cents)
        .bind(order.updated_at)
        .bind(order.version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict("Order", &order.id));
        }

        sqlx::query("DELETE FROM order_items WHERE order_id = ?1")
            .bind(&order.id)
            .execute(&mut *tx)
            .await?;

        for item in items {
            insert_item(&mut tx, item).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Updates an order's totals and overrides without touching items
    /// (recalculation). CAS on `order.version`.
    pub async fn update_totals(&self, order: &Order) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                subtotal_cents = ?2,
                discount_cents = ?3,
                freight_cents = ?4,
                total_cents = ?5,
                manual_discount_cents = ?6,
                manual_freight_cents = ?7,
                version = version + 1,
                updated_at = ?8
            WHERE id = ?1 AND version = ?9
            "#,
        )
        .bind(&order.id)
        .bind(order.subtotal_cents)
        .bind(order.discount_cents)
        .bind(order.freight_cents)
        .bind(order.total_cents)
        .bind(order.manual_discount_cents)
        .bind(order.manual_freight_cents)
        .bind(order.updated_at)
        .bind(order.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict("Order", &order.id));
        }

        Ok(())
    }

    /// Sets an order's status (CAS on the expected version).
    pub async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        expected_version: i64,
    ) -> DbResult<()> {
        let now = chrono::Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders SET status = ?2, version = version + 1, updated_at = ?3
            WHERE id = ?1 AND version = ?4
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(now)
        .bind(expected_version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict("Order", id));
        }

        Ok(())
    }

    /// Deletes an order; items and payments cascade.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }

    /// Lists all orders in insertion order.
    pub async fn list(&self) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Finds orders by status.
    pub async fn find_by_status(&self, status: OrderStatus) -> DbResult<Vec<Order>> {
        self.find_by_filters(&OrderFilter { status: Some(status), ..Default::default() })
            .await
    }

    /// Finds orders created in the half-open range `[from, to)`.
    pub async fn find_by_date_range(
        &self,
        from: chrono::DateTime<chrono::Utc>,
        to: chrono::DateTime<chrono::Utc>,
    ) -> DbResult<Vec<Order>> {
        self.find_by_filters(&OrderFilter {
            created_from: Some(from),
            created_to: Some(to),
            ..Default::default()
        })
        .await
    }

    /// Finds orders whose total falls in the inclusive value range.
    pub async fn find_by_value_range(
        &self,
        min_cents: i64,
        max_cents: i64,
    ) -> DbResult<Vec<Order>> {
        self.find_by_filters(&OrderFilter {
            min_total_cents: Some(min_cents),
            max_total_cents: Some(max_cents),
            ..Default::default()
        })
        .await
    }

    /// Composite filter query. Each absent field is no constraint; present
    /// fields combine with AND.
    pub async fn find_by_filters(&self, filter: &OrderFilter) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE (?1 IS NULL OR status = ?1)
              AND (?2 IS NULL OR created_at >= ?2)
              AND (?3 IS NULL OR created_at < ?3)
              AND (?4 IS NULL OR total_cents >= ?4)
              AND (?5 IS NULL OR total_cents <= ?5)
            ORDER BY created_at, id
            "#
        ))
        .bind(filter.status.map(|s| s.code()))
        .bind(filter.created_from)
        .bind(filter.created_to)
        .bind(filter.min_total_cents)
        .bind(filter.max_total_cents)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }
}

async fn insert_item(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    item: &OrderItem,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_items (id, order_id, product_id, title_snapshot,
                                 unit_price_cents, quantity, line_total_cents, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&item.id)
    .bind(&item.order_id)
    .bind(&item.product_id)
    .bind(&item.title_snapshot)
    .bind(item.unit_price_cents)
    .bind(item.quantity)
    .bind(item.line_total_cents)
    .bind(item.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use ordena_core::ProductStatus;
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn order_row(number: i64, total_cents: i64) -> Order {
        let now = Utc::now();
        Order {
            id: Uuid::new_v4().to_string(),
            order_number: number,
            status: OrderStatus::AwaitingPayment,
            subtotal_cents: total_cents,
            discount_cents: 0,
            freight_cents: 0,
            total_cents,
            manual_discount_cents: None,
            manual_freight_cents: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn item_row(order: &Order, product_id: &str, unit_cents: i64, qty: i64) -> OrderItem {
        OrderItem {
            id: Uuid::new_v4().to_string(),
            order_id: order.id.clone(),
            product_id: product_id.to_string(),
            title_snapshot: "Produto".to_string(),
            unit_price_cents: unit_cents,
            quantity: qty,
            line_total_cents: unit_cents * qty,
            created_at: Utc::now(),
        }
    }

    async fn seed_product(db: &Database) -> String {
        db.products()
            .insert("Produto", None, 1_000, None, ProductStatus::Active)
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_insert_get_and_items() {
        let db = test_db().await;
        let repo = db.orders();
        let product_id = seed_product(&db).await;

        let order = order_row(123_456, 2_000);
        let items = vec![item_row(&order, &product_id, 1_000, 2)];
        repo.insert_with_items(&order, &items).await.unwrap();

        let found = repo.get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(found.order_number, 123_456);
        assert_eq!(found.status, OrderStatus::AwaitingPayment);

        let found_items = repo.get_items(&order.id).await.unwrap();
        assert_eq!(found_items.len(), 1);
        assert_eq!(found_items[0].line_total_cents, 2_000);
    }

    #[tokio::test]
    async fn test_duplicate_order_number_is_unique_violation() {
        let db = test_db().await;
        let repo = db.orders();

        repo.insert_with_items(&order_row(111_111, 100), &[]).await.unwrap();
        let err = repo.insert_with_items(&order_row(111_111, 200), &[]).await.unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_replace_items_discards_old_rows() {
        let db = test_db().await;
        let repo = db.orders();
        let product_id = seed_product(&db).await;

        let mut order = order_row(222_222, 3_000);
        let items = vec![item_row(&order, &product_id, 1_000, 3)];
        repo.insert_with_items(&order, &items).await.unwrap();

        order.subtotal_cents = 5_000;
        order.total_cents = 5_000;
        let replacement = vec![item_row(&order, &product_id, 5_000, 1)];
        repo.replace_items(&order, &replacement).await.unwrap();

        let found_items = repo.get_items(&order.id).await.unwrap();
        assert_eq!(found_items.len(), 1);
        assert_eq!(found_items[0].quantity, 1);

        let found = repo.get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(found.total_cents, 5_000);
        assert_eq!(found.version, 1);
    }

    #[tokio::test]
    async fn test_stale_version_is_conflict() {
        let db = test_db().await;
        let repo = db.orders();

        let order = order_row(333_333, 100);
        repo.insert_with_items(&order, &[]).await.unwrap();

        // First writer wins
        repo.update_status(&order.id, OrderStatus::Paid, 0).await.unwrap();

        // Second writer still holds version 0
        let err = repo
            .update_status(&order.id, OrderStatus::Cancelled, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_delete_cascades_items() {
        let db = test_db().await;
        let repo = db.orders();
        let product_id = seed_product(&db).await;

        let order = order_row(444_444, 1_000);
        let items = vec![item_row(&order, &product_id, 1_000, 1)];
        repo.insert_with_items(&order, &items).await.unwrap();

        repo.delete(&order.id).await.unwrap();
        assert!(repo.get_by_id(&order.id).await.unwrap().is_none());
        assert!(repo.get_items(&order.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filters() {
        let db = test_db().await;
        let repo = db.orders();

        let mut a = order_row(500_001, 10_000);
        a.status = OrderStatus::Paid;
        let b = order_row(500_002, 90_000);
        repo.insert_with_items(&a, &[]).await.unwrap();
        repo.insert_with_items(&b, &[]).await.unwrap();

        let paid = repo.find_by_status(OrderStatus::Paid).await.unwrap();
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].id, a.id);

        let big = repo.find_by_value_range(50_000, 100_000).await.unwrap();
        assert_eq!(big.len(), 1);
        assert_eq!(big[0].id, b.id);

        // Empty filter matches everything
        let all = repo.find_by_filters(&OrderFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
