//! # Order Lifecycle Manager
//!
//! Creates and updates orders, runs the pricing engine over their items and
//! enforces the order status machine.
//!
//! ## Pricing
//! Item snapshots freeze the product title and unit price at add-time, so
//! totals survive later catalog edits. Every item change reruns
//! `compute_order_totals`; callers never set totals directly.
//!
//! ## Concurrency
//! Orders carry an optimistic version. Writes go through CAS repository
//! methods; a lost race surfaces as [`ServiceError::Conflict`] and the caller
//! retries with fresh state.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tracing::{info, warn};
use uuid::Uuid;

use ordena_core::validation::validate_quantity;
use ordena_core::{
    compute_order_totals, Money, Order, OrderItem, OrderStatus, ProductStatus,
    ORDER_NUMBER_MAX, ORDER_NUMBER_MIN,
};
use ordena_db::{Database, OrderFilter};

use crate::error::{ServiceError, ServiceResult};

/// How many random order numbers to try before giving up on a collision
/// streak.
const ORDER_NUMBER_ATTEMPTS: u32 = 5;

/// One requested line item: which product, how many.
#[derive(Debug, Clone)]
pub struct OrderItemInput {
    pub product_id: String,
    pub quantity: i64,
}

/// Manual pricing overrides. `None` fields leave the automatic tiers in
/// charge.
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingOverrides {
    pub manual_discount_cents: Option<i64>,
    pub manual_freight_cents: Option<i64>,
}

/// An order together with its line items.
#[derive(Debug, Clone)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Order management service.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<Database>,
}

impl OrderService {
    pub fn new(db: Arc<Database>) -> Self {
        OrderService { db }
    }

    /// Creates an order in AwaitingPayment with a fresh unique 6-digit
    /// order number. Product titles and prices are snapshotted into the
    /// items; totals come from the pricing engine.
    pub async fn create_order(
        &self,
        items: &[OrderItemInput],
        overrides: PricingOverrides,
    ) -> ServiceResult<OrderDetail> {
        let order_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let resolved = self.resolve_items(&order_id, items, now).await?;

        let totals = compute_order_totals(
            &resolved,
            overrides.manual_discount_cents.map(Money::from_cents),
            overrides.manual_freight_cents.map(Money::from_cents),
        );

        let mut order = Order {
            id: order_id,
            order_number: random_order_number(),
            status: OrderStatus::AwaitingPayment,
            subtotal_cents: totals.subtotal_cents,
            discount_cents: totals.discount_cents,
            freight_cents: totals.freight_cents,
            total_cents: totals.total_cents,
            manual_discount_cents: overrides.manual_discount_cents,
            manual_freight_cents: overrides.manual_freight_cents,
            version: 0,
            created_at: now,
            updated_at: now,
        };

        // The order number is random; on the rare collision the UNIQUE
        // constraint fires and we redraw.
        let mut attempts = 0;
        loop {
            match self.db.orders().insert_with_items(&order, &resolved).await {
                Ok(()) => break,
                Err(e) if e.is_unique_violation() && attempts < ORDER_NUMBER_ATTEMPTS => {
                    attempts += 1;
                    order.order_number = random_order_number();
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!(
            id = %order.id,
            order_number = order.order_number,
            total_cents = order.total_cents,
            "Order created"
        );

        Ok(OrderDetail { order, items: resolved })
    }

    /// Gets an order with its items, or fails with NotFound.
    pub async fn get(&self, id: &str) -> ServiceResult<OrderDetail> {
        let order = self.get_order(id).await?;
        let items = self.db.orders().get_items(id).await?;
        Ok(OrderDetail { order, items })
    }

    /// Replaces an order's item list and reprices it. Only orders still
    /// awaiting payment may be edited.
    pub async fn update_order(
        &self,
        id: &str,
        items: &[OrderItemInput],
        overrides: PricingOverrides,
    ) -> ServiceResult<OrderDetail> {
        let mut order = self.get_order(id).await?;
        if order.status != OrderStatus::AwaitingPayment {
            return Err(ServiceError::business_rule(
                "only orders awaiting payment can be edited",
            ));
        }

        let now = Utc::now();
        let resolved = self.resolve_items(&order.id, items, now).await?;

        let totals = compute_order_totals(
            &resolved,
            overrides.manual_discount_cents.map(Money::from_cents),
            overrides.manual_freight_cents.map(Money::from_cents),
        );

        order.subtotal_cents = totals.subtotal_cents;
        order.discount_cents = totals.discount_cents;
        order.freight_cents = totals.freight_cents;
        order.total_cents = totals.total_cents;
        order.manual_discount_cents = overrides.manual_discount_cents;
        order.manual_freight_cents = overrides.manual_freight_cents;
        order.updated_at = now;

        self.db.orders().replace_items(&order, &resolved).await?;
        self.get(id).await
    }

    /// Guarded status transition per the order status table.
    pub async fn update_order_status(&self, id: &str, next: OrderStatus) -> ServiceResult<Order> {
        let order = self.get_order(id).await?;
        order.status.transition_to(next)?;

        self.db.orders().update_status(id, next, order.version).await?;
        self.get_order(id).await
    }

    /// Administrative override: sets the status regardless of the
    /// transition table and leaves an audit record in the log.
    pub async fn force_set_order_status(
        &self,
        id: &str,
        next: OrderStatus,
    ) -> ServiceResult<Order> {
        let order = self.get_order(id).await?;

        warn!(
            id = %order.id,
            order_number = order.order_number,
            from = ?order.status,
            to = ?next,
            "Order status force-set, bypassing transition table"
        );

        self.db.orders().update_status(id, next, order.version).await?;
        self.get_order(id).await
    }

    /// Clears the manual overrides and reruns the automatic tiers over the
    /// current items.
    pub async fn recalculate(&self, id: &str) -> ServiceResult<Order> {
        let mut order = self.get_order(id).await?;
        let items = self.db.orders().get_items(id).await?;

        let totals = compute_order_totals(&items, None, None);
        order.subtotal_cents = totals.subtotal_cents;
        order.discount_cents = totals.discount_cents;
        order.freight_cents = totals.freight_cents;
        order.total_cents = totals.total_cents;
        order.manual_discount_cents = None;
        order.manual_freight_cents = None;
        order.updated_at = Utc::now();

        self.db.orders().update_totals(&order).await?;
        self.get_order(id).await
    }

    /// Deletes an order; its items and payments cascade away with it.
    pub async fn delete_order(&self, id: &str) -> ServiceResult<()> {
        self.db.orders().delete(id).await?;
        info!(id, "Order deleted");
        Ok(())
    }

    /// Lists all orders.
    pub async fn list(&self) -> ServiceResult<Vec<Order>> {
        Ok(self.db.orders().list().await?)
    }

    /// All orders in a status.
    pub async fn find_by_status(&self, status: OrderStatus) -> ServiceResult<Vec<Order>> {
        Ok(self.db.orders().find_by_status(status).await?)
    }

    /// Orders created in `[start, end)`.
    pub async fn find_by_date_range(
        &self,
        start: chrono::DateTime<Utc>,
        end: chrono::DateTime<Utc>,
    ) -> ServiceResult<Vec<Order>> {
        Ok(self.db.orders().find_by_date_range(start, end).await?)
    }

    /// Orders with `min <= total_cents <= max`.
    pub async fn find_by_value_range(&self, min: i64, max: i64) -> ServiceResult<Vec<Order>> {
        Ok(self.db.orders().find_by_value_range(min, max).await?)
    }

    /// Composite filter query; absent fields impose no constraint.
    pub async fn find_by_filters(&self, filter: &OrderFilter) -> ServiceResult<Vec<Order>> {
        Ok(self.db.orders().find_by_filters(filter).await?)
    }

    async fn get_order(&self, id: &str) -> ServiceResult<Order> {
        self.db
            .orders()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", id))
    }

    /// Resolves inputs into snapshot items: the product must exist and not
    /// be archived, and quantities must be in range.
    async fn resolve_items(
        &self,
        order_id: &str,
        items: &[OrderItemInput],
        now: chrono::DateTime<Utc>,
    ) -> ServiceResult<Vec<OrderItem>> {
        let mut resolved = Vec::with_capacity(items.len());

        for input in items {
            validate_quantity(input.quantity)?;

            let product = self
                .db
                .products()
                .get_by_id(&input.product_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Product", &input.product_id))?;

            if product.status == ProductStatus::Archived {
                return Err(ServiceError::business_rule(format!(
                    "product '{}' is archived and cannot be ordered",
                    product.title
                )));
            }

            let line_total_cents = product.price_cents * input.quantity;
            resolved.push(OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.to_string(),
                product_id: product.id,
                title_snapshot: product.title,
                unit_price_cents: product.price_cents,
                quantity: input.quantity,
                line_total_cents,
                created_at: now,
            });
        }

        Ok(resolved)
    }
}

fn random_order_number() -> i64 {
    rand::thread_rng().gen_range(ORDER_NUMBER_MIN..ORDER_NUMBER_MAX)
}

// =============================================================================
// Unit Tests
// =============================================================================
