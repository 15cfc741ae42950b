//! # ordena-core: Pure Business Logic for Ordena
//!
//! The heart of the order-management backend: pricing math, lifecycle state
//! machines and domain types, all as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ordena Architecture                              │
//! │                                                                         │
//! │  Transport layer (REST, out of scope)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ordena-service  ── order/payment lifecycle managers, reports           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ★ ordena-core (THIS CRATE) ★                                          │
//! │    types • money • pricing • lifecycle • validation                     │
//! │    NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS                  │
//! │       ▲                                                                 │
//! │       │                                                                 │
//! │  ordena-db ── SQLite repositories, migrations, aggregate queries        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, OrderItem, Payment, User)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Tiered discount/freight engine
//! - [`lifecycle`] - Order and payment transition tables
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types

pub mod error;
pub mod lifecycle;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{compute_order_totals, OrderTotals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single line item.
///
/// Guards against accidental over-ordering (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Display order numbers are random 6-digit values in this half-open range.
pub const ORDER_NUMBER_MIN: i64 = 100_000;
pub const ORDER_NUMBER_MAX: i64 = 1_000_000;

/// Bank-slip payments fall due this many days after creation.
pub const BANK_SLIP_DUE_DAYS: i64 = 3;
