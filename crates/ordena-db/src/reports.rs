//! # Report Queries
//!
//! Read-only aggregation queries over orders, items and payments. All period
//! parameters are half-open `[start, end)` on `created_at`; the all-time
//! variants take no period at all.
//!
//! The rows returned here are raw SQL aggregates. Shaping them into report
//! documents (averages, labels, consolidation) happens in the service layer.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::DbResult;

/// Order count, gross revenue and the discount/freight sums for a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct SalesTotalsRow {
    pub order_count: i64,
    pub total_cents: i64,
    pub discount_cents: i64,
    pub freight_cents: i64,
}

/// Per-status order count and revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct StatusTotalsRow {
    pub status: i32,
    pub order_count: i64,
    pub total_cents: i64,
}

/// Units sold and revenue for one product.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TopProductRow {
    pub product_id: String,
    pub title: String,
    pub quantity_sold: i64,
    pub revenue_cents: i64,
    pub order_count: i64,
}

/// Payment count and collected amount for one payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct MethodTotalsRow {
    pub method: i32,
    pub payment_count: i64,
    pub amount_cents: i64,
}

/// Read-only repository for aggregated report rows.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Count and gross total of orders created in `[start, end)`, regardless
    /// of status. The per-status split comes from [`status_totals`].
    ///
    /// [`status_totals`]: ReportRepository::status_totals
    pub async fn sales_totals(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<SalesTotalsRow> {
        let row = sqlx::query_as::<_, SalesTotalsRow>(
            r#"
            SELECT COUNT(*) AS order_count,
                   COALESCE(SUM(total_cents), 0) AS total_cents,
                   COALESCE(SUM(discount_cents), 0) AS discount_cents,
                   COALESCE(SUM(freight_cents), 0) AS freight_cents
            FROM orders
            WHERE created_at >= ?1 AND created_at < ?2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Total units sold by orders created in `[start, end)`.
    pub async fn items_sold(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DbResult<i64> {
        let quantity: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(oi.quantity), 0)
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            WHERE o.created_at >= ?1 AND o.created_at < ?2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(quantity)
    }

    /// Per-status order counts and totals for `[start, end)`. Statuses with
    /// no orders in the period produce no row.
    pub async fn status_totals(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<StatusTotalsRow>> {
        let rows = sqlx::query_as::<_, StatusTotalsRow>(
            r#"
            SELECT status,
                   COUNT(*) AS order_count,
                   COALESCE(SUM(total_cents), 0) AS total_cents
            FROM orders
            WHERE created_at >= ?1 AND created_at < ?2
            GROUP BY status
            ORDER BY status
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Per-status order counts and totals over the whole table.
    pub async fn status_totals_all_time(&self) -> DbResult<Vec<StatusTotalsRow>> {
        let rows = sqlx::query_as::<_, StatusTotalsRow>(
            r#"
            SELECT status,
                   COUNT(*) AS order_count,
                   COALESCE(SUM(total_cents), 0) AS total_cents
            FROM orders
            GROUP BY status
            ORDER BY status
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Best-selling products of orders in `[start, end)`, by units sold
    /// descending, capped at `limit`.
    pub async fn top_products(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: i64,
    ) -> DbResult<Vec<TopProductRow>> {
        let rows = sqlx::query_as::<_, TopProductRow>(
            r#"
            SELECT oi.product_id,
                   oi.title_snapshot AS title,
                   SUM(oi.quantity) AS quantity_sold,
                   SUM(oi.line_total_cents) AS revenue_cents,
                   COUNT(DISTINCT oi.order_id) AS order_count
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            WHERE o.created_at >= ?1 AND o.created_at < ?2
            GROUP BY oi.product_id, oi.title_snapshot
            ORDER BY quantity_sold DESC, revenue_cents DESC
            LIMIT ?3
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Payment counts and amounts per method in `[start, end)`, all statuses.
    pub async fn payments_by_method(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<MethodTotalsRow>> {
        let rows = sqlx::query_as::<_, MethodTotalsRow>(
            r#"
            SELECT method,
                   COUNT(*) AS payment_count,
                   COALESCE(SUM(amount_cents), 0) AS amount_cents
            FROM payments
            WHERE created_at >= ?1 AND created_at < ?2
            GROUP BY method
            ORDER BY method
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
