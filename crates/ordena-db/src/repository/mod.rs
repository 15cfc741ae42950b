//! Repository layer: one repository per aggregate, each a thin handle over
//! the shared connection pool.

pub mod order;
pub mod payment;
pub mod product;
pub mod user;

pub use order::{OrderFilter, OrderRepository};
pub use payment::{PaymentFilter, PaymentRepository};
pub use product::ProductRepository;
pub use user::UserRepository;
