//! # ordena-db: Database Layer for Ordena
//!
//! This crate provides database access for the Ordena order-management
//! backend. It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Ordena Data Flow                                │
//! │                                                                         │
//! │  Service call (OrderService::create_order)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     ordena-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │ (order.rs...) │    │  (embedded)  │   │   │
//! │  │   │               │    │               │    │              │   │   │
//! │  │   │ SqlitePool    │    │ ProductRepo   │    │ 001_init.sql │   │   │
//! │  │   │ Connection    │◄───│ OrderRepo     │    │              │   │   │
//! │  │   │ Management    │    │ PaymentRepo   │    │              │   │   │
//! │  │   │               │    │ UserRepo      │    │              │   │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │              /var/lib/ordena/ordena.db (WAL mode)               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, order, payment, user)
//! - [`reports`] - Read-only aggregate queries for reporting
//!
//! ## Concurrency
//!
//! Orders and payments carry a `version` column. Every repository write to
//! those rows is a compare-and-swap (`WHERE id = ? AND version = ?`); a
//! mismatch maps to [`DbError::Conflict`] and never silently overwrites a
//! concurrent update.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ordena_db::{Database, DbConfig};
//!
//! // Create database with default config (runs migrations)
//! let config = DbConfig::new("path/to/db.sqlite");
//! let db = Database::new(config).await?;
//!
//! // Use repositories
//! let order = db.orders().get_by_id(&id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod reports;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::order::{OrderFilter, OrderRepository};
pub use repository::payment::{PaymentFilter, PaymentRepository};
pub use repository::product::ProductRepository;
pub use repository::user::UserRepository;
pub use reports::ReportRepository;
