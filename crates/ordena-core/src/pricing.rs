//! # Pricing Engine
//!
//! Pure computation of an order's subtotal, discount, freight and total.
//!
//! ## Pricing Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Pricing Pipeline                            │
//! │                                                                         │
//! │  items ──► subtotal = Σ line totals                                    │
//! │                │                                                        │
//! │                ▼                                                        │
//! │  discount:  manual override (> 0) wins, otherwise tiered:              │
//! │             subtotal ≥ 1000.00 → 10%                                   │
//! │             subtotal ≥  500.00 →  5%                                   │
//! │             else               →  0                                    │
//! │                │                                                        │
//! │                ▼                                                        │
//! │  freight:   manual override (≥ 0) wins, otherwise on the              │
//! │             discounted subtotal:                                       │
//! │             ≥ 500.00 → free                                            │
//! │             ≥ 200.00 → 20.00                                           │
//! │             else     → 30.00                                           │
//! │                │                                                        │
//! │                ▼                                                        │
//! │  total = (subtotal - discount) + freight                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No side effects: the engine is a pure function of its inputs and is
//! idempotent under re-runs with the same item list and overrides.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::OrderItem;

// =============================================================================
// Tier Constants
// =============================================================================

/// Subtotal threshold for the 10% discount tier.
pub const DISCOUNT_TIER_HIGH_CENTS: i64 = 100_000;

/// Subtotal threshold for the 5% discount tier.
pub const DISCOUNT_TIER_LOW_CENTS: i64 = 50_000;

/// Discounted-subtotal threshold for free freight.
pub const FREIGHT_FREE_THRESHOLD_CENTS: i64 = 50_000;

/// Discounted-subtotal threshold for the reduced freight rate.
pub const FREIGHT_REDUCED_THRESHOLD_CENTS: i64 = 20_000;

/// Reduced freight rate.
pub const FREIGHT_REDUCED_CENTS: i64 = 2_000;

/// Standard freight rate.
pub const FREIGHT_STANDARD_CENTS: i64 = 3_000;

// =============================================================================
// Order Totals
// =============================================================================

/// The four computed monetary components of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub freight_cents: i64,
    pub total_cents: i64,
}

impl OrderTotals {
    /// `total == (subtotal - discount) + freight`, by construction.
    #[inline]
    pub const fn is_consistent(&self) -> bool {
        self.total_cents == (self.subtotal_cents - self.discount_cents) + self.freight_cents
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Sums the item line totals. Empty item list ⇒ zero.
pub fn compute_subtotal(items: &[OrderItem]) -> Money {
    items.iter().map(OrderItem::line_total).sum()
}

/// Applies the discount rule.
///
/// A manual discount strictly greater than zero wins verbatim; otherwise the
/// tiered percentage applies (half-up at the centavo).
pub fn compute_discount(subtotal: Money, manual_discount: Option<Money>) -> Money {
    if let Some(manual) = manual_discount {
        if manual.is_positive() {
            return manual;
        }
    }

    if subtotal.cents() >= DISCOUNT_TIER_HIGH_CENTS {
        subtotal.percentage_bps(1000)
    } else if subtotal.cents() >= DISCOUNT_TIER_LOW_CENTS {
        subtotal.percentage_bps(500)
    } else {
        Money::zero()
    }
}

/// Applies the freight rule to the discounted subtotal.
///
/// A manual freight of zero or more wins verbatim (zero is a valid "seller
/// pays shipping" override); otherwise the tiered fixed rates apply.
pub fn compute_freight(discounted_subtotal: Money, manual_freight: Option<Money>) -> Money {
    if let Some(manual) = manual_freight {
        if !manual.is_negative() {
            return manual;
        }
    }

    if discounted_subtotal.cents() >= FREIGHT_FREE_THRESHOLD_CENTS {
        Money::zero()
    } else if discounted_subtotal.cents() >= FREIGHT_REDUCED_THRESHOLD_CENTS {
        Money::from_cents(FREIGHT_REDUCED_CENTS)
    } else {
        Money::from_cents(FREIGHT_STANDARD_CENTS)
    }
}

/// Computes all four order totals from the item list and optional manual
/// overrides. Pure and idempotent.
pub fn compute_order_totals(
    items: &[OrderItem],
    manual_discount: Option<Money>,
    manual_freight: Option<Money>,
) -> OrderTotals {
    let subtotal = compute_subtotal(items);
    let discount = compute_discount(subtotal, manual_discount);
    let discounted = subtotal - discount;
    let freight = compute_freight(discounted, manual_freight);
    let total = discounted + freight;

    OrderTotals {
        subtotal_cents: subtotal.cents(),
        discount_cents: discount.cents(),
        freight_cents: freight.cents(),
        total_cents: total.cents(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(unit_price_cents: i64, quantity: i64) -> OrderItem {
        OrderItem {
            id: "item".to_string(),
            order_id: "order".to_string(),
            product_id: "product".to_string(),
            title_snapshot: "Produto".to_string(),
            unit_price_cents,
            quantity,
            line_total_cents: unit_price_cents * quantity,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_subtotal_empty_items() {
        assert_eq!(compute_subtotal(&[]).cents(), 0);
    }

    #[test]
    fn test_discount_tiers() {
        // 499.99 ⇒ no discount
        assert_eq!(compute_discount(Money::from_cents(49_999), None).cents(), 0);
        // 500.00 ⇒ 5% = 25.00
        assert_eq!(compute_discount(Money::from_cents(50_000), None).cents(), 2_500);
        // 999.99 ⇒ still the 5% tier = 50.00 (rounded)
        assert_eq!(compute_discount(Money::from_cents(99_999), None).cents(), 5_000);
        // 1000.00 ⇒ 10% = 100.00
        assert_eq!(compute_discount(Money::from_cents(100_000), None).cents(), 10_000);
    }

    #[test]
    fn test_manual_discount_wins() {
        let manual = Some(Money::from_cents(1_234));
        assert_eq!(compute_discount(Money::from_cents(100_000), manual).cents(), 1_234);
        // Zero or negative manual discount falls back to the tiers
        assert_eq!(
            compute_discount(Money::from_cents(100_000), Some(Money::zero())).cents(),
            10_000
        );
    }

    #[test]
    fn test_freight_tiers() {
        // 500.00 ⇒ free
        assert_eq!(compute_freight(Money::from_cents(50_000), None).cents(), 0);
        // 200.00 ⇒ 20.00
        assert_eq!(compute_freight(Money::from_cents(20_000), None).cents(), 2_000);
        // 199.99 ⇒ 30.00
        assert_eq!(compute_freight(Money::from_cents(19_999), None).cents(), 3_000);
    }

    #[test]
    fn test_manual_freight_wins_including_zero() {
        // Zero is a valid override: seller pays shipping
        assert_eq!(compute_freight(Money::from_cents(100), Some(Money::zero())).cents(), 0);
        assert_eq!(
            compute_freight(Money::from_cents(100), Some(Money::from_cents(999))).cents(),
            999
        );
        // Negative manual freight is ignored
        assert_eq!(
            compute_freight(Money::from_cents(100), Some(Money::from_cents(-1))).cents(),
            3_000
        );
    }

    #[test]
    fn test_scenario_tiered_order() {
        // Two items: qty 3 @ 50.00 and qty 1 @ 450.00
        // subtotal 600.00 → 5% discount 30.00 → discounted 570.00
        // → free freight (≥ 500) → total 570.00
        let items = [item(5_000, 3), item(45_000, 1)];
        let totals = compute_order_totals(&items, None, None);

        assert_eq!(totals.subtotal_cents, 60_000);
        assert_eq!(totals.discount_cents, 3_000);
        assert_eq!(totals.freight_cents, 0);
        assert_eq!(totals.total_cents, 57_000);
        assert!(totals.is_consistent());
    }

    #[test]
    fn test_scenario_empty_order() {
        // Empty order: subtotal 0, no discount, standard freight 30.00
        let totals = compute_order_totals(&[], None, None);

        assert_eq!(totals.subtotal_cents, 0);
        assert_eq!(totals.discount_cents, 0);
        assert_eq!(totals.freight_cents, 3_000);
        assert_eq!(totals.total_cents, 3_000);
        assert!(totals.is_consistent());
    }

    #[test]
    fn test_idempotence() {
        let items = [item(12_345, 2), item(999, 7)];
        let first = compute_order_totals(&items, Some(Money::from_cents(500)), None);
        let second = compute_order_totals(&items, Some(Money::from_cents(500)), None);
        assert_eq!(first, second);
    }

    #[test]
    fn test_total_identity_across_tiers() {
        for cents in [0, 19_999, 20_000, 49_999, 50_000, 99_999, 100_000, 250_000] {
            let items = [item(cents.max(1), 1)];
            let totals = compute_order_totals(&items, None, None);
            assert!(totals.is_consistent(), "identity broken at subtotal {cents}");
        }
    }

    #[test]
    fn test_discount_applies_before_freight() {
        // subtotal 520.00 → 5% discount 26.00 → discounted 494.00,
        // which is below the free-freight threshold → 20.00 freight
        let items = [item(52_000, 1)];
        let totals = compute_order_totals(&items, None, None);

        assert_eq!(totals.discount_cents, 2_600);
        assert_eq!(totals.freight_cents, 2_000);
        assert_eq!(totals.total_cents, 51_400);
    }
}
