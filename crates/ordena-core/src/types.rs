//! # Domain Types
//!
//! Core domain types for the order-management backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  title          │   │  order_number   │   │  order_id (FK)  │       │
//! │  │  price_cents    │   │  status         │   │  method/status  │       │
//! │  │  status         │   │  totals         │   │  amount_cents   │       │
//! │  └─────────────────┘   └───────┬─────────┘   └─────────────────┘       │
//! │                                │                                        │
//! │                        ┌───────▼─────────┐                              │
//! │                        │   OrderItem     │  quantity × snapshot price   │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Enum Codes
//! Every enumeration is persisted as a small integer code with a fixed
//! id↔name mapping. Decoding an unknown code is a hard error
//! ([`CoreError::InvalidEnumCode`]), never a silent default - a corrupt row
//! must not masquerade as a valid state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Product Status
// =============================================================================

/// Catalog status of a product. Transitions are free-form: the catalog API
/// may move a product between any two statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[repr(i32)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Active = 1,
    Inactive = 2,
    Pending = 3,
    OutOfStock = 4,
    Archived = 5,
}

impl ProductStatus {
    /// Resolves a persisted integer code. Unknown codes are a decode error.
    pub fn from_code(code: i32) -> Result<Self, CoreError> {
        match code {
            1 => Ok(ProductStatus::Active),
            2 => Ok(ProductStatus::Inactive),
            3 => Ok(ProductStatus::Pending),
            4 => Ok(ProductStatus::OutOfStock),
            5 => Ok(ProductStatus::Archived),
            _ => Err(CoreError::InvalidEnumCode { kind: "ProductStatus", code }),
        }
    }

    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle status of an order.
///
/// Codes match the persisted mapping: Paid=1, AwaitingPayment=2, Cancelled=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[repr(i32)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Paid = 1,
    AwaitingPayment = 2,
    Cancelled = 3,
}

impl OrderStatus {
    pub fn from_code(code: i32) -> Result<Self, CoreError> {
        match code {
            1 => Ok(OrderStatus::Paid),
            2 => Ok(OrderStatus::AwaitingPayment),
            3 => Ok(OrderStatus::Cancelled),
            _ => Err(CoreError::InvalidEnumCode { kind: "OrderStatus", code }),
        }
    }

    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// All statuses, in code order. Reports iterate this so zero-count
    /// buckets still appear in the breakdown.
    pub const ALL: [OrderStatus; 3] = [
        OrderStatus::Paid,
        OrderStatus::AwaitingPayment,
        OrderStatus::Cancelled,
    ];
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a payment is tendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[repr(i32)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard = 1,
    DebitCard = 2,
    BankSlip = 3,
    BankTransfer = 4,
    Pix = 5,
}

impl PaymentMethod {
    pub fn from_code(code: i32) -> Result<Self, CoreError> {
        match code {
            1 => Ok(PaymentMethod::CreditCard),
            2 => Ok(PaymentMethod::DebitCard),
            3 => Ok(PaymentMethod::BankSlip),
            4 => Ok(PaymentMethod::BankTransfer),
            5 => Ok(PaymentMethod::Pix),
            _ => Err(CoreError::InvalidEnumCode { kind: "PaymentMethod", code }),
        }
    }

    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Human-readable label for receipts and reports.
    pub const fn label(self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "Cartão de Crédito",
            PaymentMethod::DebitCard => "Cartão de Débito",
            PaymentMethod::BankSlip => "Boleto Bancário",
            PaymentMethod::BankTransfer => "Transferência Bancária",
            PaymentMethod::Pix => "PIX",
        }
    }

    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::BankSlip,
        PaymentMethod::BankTransfer,
        PaymentMethod::Pix,
    ];
}

// =============================================================================
// Payment Status
// =============================================================================

/// Lifecycle status of a payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[repr(i32)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending = 1,
    Processing = 2,
    Approved = 3,
    Declined = 4,
    Cancelled = 5,
    Refunded = 6,
}

impl PaymentStatus {
    pub fn from_code(code: i32) -> Result<Self, CoreError> {
        match code {
            1 => Ok(PaymentStatus::Pending),
            2 => Ok(PaymentStatus::Processing),
            3 => Ok(PaymentStatus::Approved),
            4 => Ok(PaymentStatus::Declined),
            5 => Ok(PaymentStatus::Cancelled),
            6 => Ok(PaymentStatus::Refunded),
            _ => Err(CoreError::InvalidEnumCode { kind: "PaymentStatus", code }),
        }
    }

    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

// =============================================================================
// Role
// =============================================================================

/// Authorization role of an authenticated principal. Token issuance and
/// verification belong to the auth gateway; the core only gates operations
/// on the resolved role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[repr(i32)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin = 1,
    Cliente = 2,
    Operador = 3,
}

impl Role {
    pub fn from_code(code: i32) -> Result<Self, CoreError> {
        match code {
            1 => Ok(Role::Admin),
            2 => Ok(Role::Cliente),
            3 => Ok(Role::Operador),
            _ => Err(CoreError::InvalidEnumCode { kind: "Role", code }),
        }
    }

    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Spring-style authority string, kept for interoperability with the
    /// auth gateway.
    pub const fn authority(self) -> &'static str {
        match self {
            Role::Admin => "ROLE_ADMIN",
            Role::Cliente => "ROLE_CLIENTE",
            Role::Operador => "ROLE_OPERADOR",
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display title.
    pub title: String,

    /// Optional long description.
    pub description: Option<String>,

    /// Price in centavos.
    pub price_cents: i64,

    /// Free-form category name.
    pub category: Option<String>,

    /// Catalog status.
    pub status: ProductStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A customer purchase aggregate.
///
/// ## Invariant
/// `total_cents == (subtotal_cents - discount_cents) + freight_cents`,
/// always recomputed by the pricing engine, never set directly by callers.
/// The `version` column is an optimistic counter: every write is a
/// compare-and-swap on it, and a mismatch surfaces as a conflict.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,

    /// Random 6-digit display number, unique across orders.
    pub order_number: i64,

    pub status: OrderStatus,

    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub freight_cents: i64,
    pub total_cents: i64,

    /// Manual discount override captured at creation/update time. `None`
    /// means the tiered rule applies on recalculation.
    pub manual_discount_cents: Option<i64>,

    /// Manual freight override. `None` means the tiered rule applies.
    pub manual_freight_cents: Option<i64>,

    /// Optimistic concurrency counter.
    pub version: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item in an order.
///
/// Uses the snapshot pattern: the product's title and unit price are frozen
/// at add-time so history survives later catalog edits. Items are owned
/// exclusively by their order and are discarded when the item list is
/// replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,

    /// Product title at time of sale (frozen).
    pub title_snapshot: String,

    /// Unit price in centavos at time of sale (frozen).
    pub unit_price_cents: i64,

    /// Quantity sold (≥ 1).
    pub quantity: i64,

    /// Line total = unit price × quantity.
    pub line_total_cents: i64,

    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A payment attempt against an order. Multiple attempts per order are
/// allowed (retries after a decline or cancellation).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    pub order_id: String,

    pub method: PaymentMethod,
    pub status: PaymentStatus,

    pub amount_cents: i64,

    /// Installment count (≥ 1, default 1).
    pub installments: i64,

    /// Unique transaction code assigned at creation.
    pub transaction_code: String,

    /// Gateway authorization code, set while processing.
    pub authorization_code: Option<String>,

    /// Gateway NSU reference number, set while processing.
    pub nsu: Option<String>,

    pub card_brand: Option<String>,
    pub card_last_digits: Option<String>,

    /// Due date; set for bank slips (creation + 3 days).
    pub due_date: Option<DateTime<Utc>>,

    /// When the payment reached Approved.
    pub paid_at: Option<DateTime<Utc>>,

    pub note: Option<String>,

    /// Optimistic concurrency counter.
    pub version: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered user. Credentials are the auth gateway's concern; this row
/// carries the identity and role the gate checks against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
