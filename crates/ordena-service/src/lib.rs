//! # ordena-service: Business Services for Ordena
//!
//! The application layer of the order-management backend. Orchestrates
//! `ordena-core` (pure pricing and lifecycle rules) and `ordena-db`
//! (SQLite repositories) into the operations a transport layer exposes.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ordena Service Layer                             │
//! │                                                                         │
//! │  Transport layer (REST, out of scope)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  ordena-service (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │  ProductService   OrderService    PaymentService   ReportService│   │
//! │  │  (catalog.rs)     (orders.rs)     (payments.rs)    (reports.rs) │   │
//! │  │                                        │                        │   │
//! │  │  UserService      role gates      PaymentGateway trait          │   │
//! │  │  (users.rs)       (auth.rs)       (gateway.rs)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                    │                                            │
//! │       ▼                    ▼                                            │
//! │  ordena-core          ordena-db                                         │
//! │  (pricing, rules)     (SQLite repositories)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`catalog`] - Product CRUD and catalog queries
//! - [`orders`] - Order creation, pricing and lifecycle
//! - [`payments`] - Payment attempts and the payment state machine
//! - [`gateway`] - The acquirer seam ([`PaymentGateway`]) and its simulator
//! - [`reports`] - Sales, status, best-seller and method reports
//! - [`users`] - User registration
//! - [`auth`] - Role gates
//! - [`error`] - [`ServiceError`], what a transport layer sees

pub mod auth;
pub mod catalog;
pub mod error;
pub mod gateway;
pub mod orders;
pub mod payments;
pub mod reports;
pub mod users;

pub use catalog::{ProductInput, ProductService};
pub use error::{ServiceError, ServiceResult};
pub use gateway::{GatewayAuthorization, PaymentGateway, SimulatedGateway};
pub use orders::{OrderDetail, OrderItemInput, OrderService, PricingOverrides};
pub use payments::{PaymentInput, PaymentService};
pub use reports::{ConsolidatedReport, ReportService, SalesReport};
pub use users::UserService;
