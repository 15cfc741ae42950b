//! # Reporting Aggregator
//!
//! Shapes the raw SQL aggregates from `ordena-db::reports` into report
//! documents: sales summaries, status breakdowns, best-sellers and
//! payment-method splits, plus the consolidated document combining them.
//!
//! All periods are half-open `[start, end)`; the convenience views (daily,
//! monthly, current month) only compute the boundaries and delegate.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use ordena_core::{Money, OrderStatus, PaymentMethod};
use ordena_db::Database;

use crate::error::{ServiceError, ServiceResult};

/// How many products the consolidated report ranks.
const TOP_PRODUCTS_LIMIT: i64 = 10;

/// Sales summary for a period, covering every order regardless of status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesReport {
    /// `dd/mm/yyyy a dd/mm/yyyy`, inclusive on both ends.
    pub period_label: String,
    pub order_count: i64,
    pub total_cents: i64,
    /// Half-up average ticket; zero when the period has no orders.
    pub average_ticket_cents: i64,
    pub discount_cents: i64,
    pub freight_cents: i64,
    pub items_sold: i64,
}

/// One order-status bucket. Every status gets a bucket, zero counts
/// included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusBucket {
    pub status: OrderStatus,
    pub order_count: i64,
    pub total_cents: i64,
    /// Share of the range's order count, in percent. Zero when the range
    /// holds no orders at all.
    pub percentage: f64,
}

/// One best-selling product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopProduct {
    pub product_id: String,
    pub title: String,
    pub quantity_sold: i64,
    pub revenue_cents: i64,
    /// Distinct orders that included this product.
    pub order_count: i64,
}

/// One payment-method bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodBucket {
    pub method: PaymentMethod,
    pub label: String,
    pub payment_count: i64,
    pub amount_cents: i64,
    /// Share of the range's payment count, in percent.
    pub percentage: f64,
}

/// Everything about a period in one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidatedReport {
    pub sales: SalesReport,
    pub status_breakdown: Vec<StatusBucket>,
    pub top_products: Vec<TopProduct>,
    pub payment_methods: Vec<MethodBucket>,
}

/// Report assembly service.
#[derive(Debug, Clone)]
pub struct ReportService {
    db: Arc<Database>,
}

impl ReportService {
    pub fn new(db: Arc<Database>) -> Self {
        ReportService { db }
    }

    /// Sales summary over `[start, end)`.
    pub async fn sales_report(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ServiceResult<SalesReport> {
        let totals = self.db.reports().sales_totals(start, end).await?;
        let items_sold = self.db.reports().items_sold(start, end).await?;

        let average_ticket_cents = Money::from_cents(totals.total_cents)
            .div_round(totals.order_count)
            .cents();

        Ok(SalesReport {
            period_label: period_label(start, end),
            order_count: totals.order_count,
            total_cents: totals.total_cents,
            average_ticket_cents,
            discount_cents: totals.discount_cents,
            freight_cents: totals.freight_cents,
            items_sold,
        })
    }

    /// Status breakdown over `[start, end)`, one bucket per status.
    pub async fn status_breakdown(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ServiceResult<Vec<StatusBucket>> {
        let rows = self.db.reports().status_totals(start, end).await?;
        buckets_from_rows(&rows)
    }

    /// Status breakdown over the full order history.
    pub async fn status_breakdown_all_time(&self) -> ServiceResult<Vec<StatusBucket>> {
        let rows = self.db.reports().status_totals_all_time().await?;
        buckets_from_rows(&rows)
    }

    /// Best sellers of the period, by units sold descending.
    pub async fn top_products(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: i64,
    ) -> ServiceResult<Vec<TopProduct>> {
        let rows = self.db.reports().top_products(start, end, limit).await?;
        Ok(rows
            .into_iter()
            .map(|row| TopProduct {
                product_id: row.product_id,
                title: row.title,
                quantity_sold: row.quantity_sold,
                revenue_cents: row.revenue_cents,
                order_count: row.order_count,
            })
            .collect())
    }

    /// Payments of the period split by method, all statuses included.
    pub async fn payments_by_method(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ServiceResult<Vec<MethodBucket>> {
        let rows = self.db.reports().payments_by_method(start, end).await?;
        let total_count: i64 = rows.iter().map(|r| r.payment_count).sum();

        rows.into_iter()
            .map(|row| {
                let method = PaymentMethod::from_code(row.method)?;
                Ok(MethodBucket {
                    method,
                    label: method.label().to_string(),
                    payment_count: row.payment_count,
                    amount_cents: row.amount_cents,
                    percentage: percentage_of(row.payment_count, total_count),
                })
            })
            .collect::<Result<Vec<_>, ordena_core::CoreError>>()
            .map_err(ServiceError::from)
    }

    /// Full report document for `[start, end)`.
    pub async fn consolidated(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ServiceResult<ConsolidatedReport> {
        Ok(ConsolidatedReport {
            sales: self.sales_report(start, end).await?,
            status_breakdown: self.status_breakdown(start, end).await?,
            top_products: self.top_products(start, end, TOP_PRODUCTS_LIMIT).await?,
            payment_methods: self.payments_by_method(start, end).await?,
        })
    }

    /// One calendar day, midnight to midnight UTC.
    pub async fn daily(&self, date: NaiveDate) -> ServiceResult<ConsolidatedReport> {
        let (start, end) = day_bounds(date);
        self.consolidated(start, end).await
    }

    /// One calendar month.
    pub async fn monthly(&self, year: i32, month: u32) -> ServiceResult<ConsolidatedReport> {
        let (start, end) = month_bounds(year, month)?;
        self.consolidated(start, end).await
    }

    /// The month containing today.
    pub async fn current_month(&self) -> ServiceResult<ConsolidatedReport> {
        let today = Utc::now().date_naive();
        self.monthly(today.year(), today.month()).await
    }
}

/// Fills the per-status buckets, adding zero buckets for statuses absent
/// from the rows.
fn buckets_from_rows(
    rows: &[ordena_db::reports::StatusTotalsRow],
) -> ServiceResult<Vec<StatusBucket>> {
    let total_count: i64 = rows.iter().map(|r| r.order_count).sum();

    OrderStatus::ALL
        .iter()
        .map(|&status| {
            let row = rows.iter().find(|r| r.status == status.code());
            let (order_count, total_cents) =
                row.map_or((0, 0), |r| (r.order_count, r.total_cents));
            Ok(StatusBucket {
                status,
                order_count,
                total_cents,
                percentage: percentage_of(order_count, total_count),
            })
        })
        .collect()
}

fn percentage_of(count: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (count as f64 / total as f64) * 100.0
    }
}

/// `dd/mm/yyyy a dd/mm/yyyy`, both dates inclusive (the half-open end
/// rolls back one second before formatting).
fn period_label(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let last = end - chrono::Duration::seconds(1);
    format!("{} a {}", start.format("%d/%m/%Y"), last.format("%d/%m/%Y"))
}

fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    let end = (date + Days::new(1)).and_time(NaiveTime::MIN).and_utc();
    (start, end)
}

fn month_bounds(year: i32, month: u32) -> ServiceResult<(DateTime<Utc>, DateTime<Utc>)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ServiceError::business_rule(format!("invalid month {year}-{month:02}")))?;
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or_else(|| ServiceError::business_rule(format!("invalid month {year}-{month:02}")))?;

    Ok((
        first.and_time(NaiveTime::MIN).and_utc(),
        next.and_time(NaiveTime::MIN).and_utc(),
    ))
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
    use crate::payments::{PaymentInput, PaymentService};
    use chrono::Duration;

    struct Fixture {
        orders: OrderService,
        payments: PaymentService,
        products: ProductService,
        reports: ReportService,
    }

    async fn fixture() -> Fixture {
        let db = Arc::new(
            Database::new(ordena_db::DbConfig::in_memory())
                .await
                .unwrap(),
        );
        Fixture {
            orders: OrderService::new(db.clone()),
            payments: PaymentService::new(db.clone(), Arc::new(SimulatedGateway::new())),
            products: ProductService::new(db.clone()),
            reports: ReportService::new(db),
        }
    }

    async fn paid_order(fx: &Fixture, product_id: &str, quantity: i64) -> String {
        let detail = fx
            .orders
            .create_order(
                &[OrderItemInput { product_id: product_id.to_string(), quantity }],
                PricingOverrides::default(),
            )
            .await
            .unwrap();
        let payment = fx
            .payments
            .create_payment(&detail.order.id, PaymentMethod::Pix, PaymentInput::default())
            .await
            .unwrap();
        fx.payments.process_payment(&payment.id).await.unwrap();
        detail.order.id
    }

    fn wide_period() -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc::now();
        (now - Duration::hours(1), now + Duration::hours(1))
    }

    #[tokio::test]
    async fn test_sales_report_averages_half_up() {
        let fx = fixture().await;
        let product = fx
            .products
            .create(ProductInput {
                title: "Monitor".to_string(),
                description: None,
                price_cents: 30_000,
                category: None,
                status: None,
            })
            .await
            .unwrap();

        // two orders: 1×300.00 ⇒ 320.00, 2×300.00 ⇒ 600.00-5% ⇒ 570.00
        paid_order(&fx, &product.id, 1).await;
        paid_order(&fx, &product.id, 2).await;

        let (start, end) = wide_period();
        let report = fx.reports.sales_report(start, end).await.unwrap();

        assert_eq!(report.order_count, 2);
        assert_eq!(report.total_cents, 32_000 + 57_000);
        assert_eq!(report.average_ticket_cents, 44_500);
        assert_eq!(report.items_sold, 3);
        assert_eq!(report.discount_cents, 3_000);
    }

    #[tokio::test]
    async fn test_sales_report_counts_orders_of_any_status() {
        let fx = fixture().await;
        let product = fx
            .products
            .create(ProductInput {
                title: "Webcam".to_string(),
                description: None,
                price_cents: 20_000,
                category: None,
                status: None,
            })
            .await
            .unwrap();

        paid_order(&fx, &product.id, 1).await;
        // Still awaiting payment, counts all the same
        fx.orders
            .create_order(
                &[OrderItemInput { product_id: product.id.clone(), quantity: 1 }],
                PricingOverrides::default(),
            )
            .await
            .unwrap();

        let (start, end) = wide_period();
        let report = fx.reports.sales_report(start, end).await.unwrap();
        assert_eq!(report.order_count, 2);
        assert_eq!(report.items_sold, 2);

        let top = fx.reports.top_products(start, end, 10).await.unwrap();
        assert_eq!(top[0].quantity_sold, 2);
        assert_eq!(top[0].order_count, 2);
    }

    #[tokio::test]
    async fn test_empty_period_reports_zeroes() {
        let fx = fixture().await;
        let start = Utc::now() - Duration::days(60);
        let end = start + Duration::days(1);

        let report = fx.reports.sales_report(start, end).await.unwrap();
        assert_eq!(report.order_count, 0);
        assert_eq!(report.total_cents, 0);
        assert_eq!(report.average_ticket_cents, 0);

        let breakdown = fx.reports.status_breakdown(start, end).await.unwrap();
        assert_eq!(breakdown.len(), OrderStatus::ALL.len());
        assert!(breakdown.iter().all(|b| b.order_count == 0 && b.percentage == 0.0));
    }

    #[tokio::test]
    async fn test_status_breakdown_percentages_sum_to_100() {
        let fx = fixture().await;
        let product = fx
            .products
            .create(ProductInput {
                title: "Mouse".to_string(),
                description: None,
                price_cents: 5_000,
                category: None,
                status: None,
            })
            .await
            .unwrap();

        paid_order(&fx, &product.id, 1).await;
        paid_order(&fx, &product.id, 1).await;
        fx.orders
            .create_order(
                &[OrderItemInput { product_id: product.id.clone(), quantity: 1 }],
                PricingOverrides::default(),
            )
            .await
            .unwrap();

        let (start, end) = wide_period();
        let breakdown = fx.reports.status_breakdown(start, end).await.unwrap();

        let sum: f64 = breakdown.iter().map(|b| b.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);

        let paid = breakdown
            .iter()
            .find(|b| b.status == OrderStatus::Paid)
            .unwrap();
        assert_eq!(paid.order_count, 2);
    }

    #[tokio::test]
    async fn test_consolidated_report_and_method_split() {
        let fx = fixture().await;
        let product = fx
            .products
            .create(ProductInput {
                title: "Headset".to_string(),
                description: None,
                price_cents: 15_000,
                category: None,
                status: None,
            })
            .await
            .unwrap();
        paid_order(&fx, &product.id, 2).await;

        let (start, end) = wide_period();
        let report = fx.reports.consolidated(start, end).await.unwrap();

        assert_eq!(report.sales.order_count, 1);
        assert_eq!(report.top_products.len(), 1);
        assert_eq!(report.top_products[0].quantity_sold, 2);

        assert_eq!(report.payment_methods.len(), 1);
        let pix = &report.payment_methods[0];
        assert_eq!(pix.method, PaymentMethod::Pix);
        assert_eq!(pix.label, "PIX");
        assert!((pix.percentage - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_period_label_format() {
        let (start, end) = day_bounds(NaiveDate::from_ymd_opt(2026, 8, 30).unwrap());
        assert_eq!(period_label(start, end), "30/08/2026 a 30/08/2026");

        let (start, end) = month_bounds(2026, 2).unwrap();
        assert_eq!(period_label(start, end), "01/02/2026 a 28/02/2026");
    }

    #[test]
    fn test_month_bounds_roll_over_december() {
        let (start, end) = month_bounds(2025, 12).unwrap();
        assert_eq!(start.date_naive(), NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(end.date_naive(), NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());

        assert!(month_bounds(2026, 13).is_err());
    }
}
