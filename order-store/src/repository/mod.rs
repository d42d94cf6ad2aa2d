//! Repository Module
//!
//! Data access layer for the order read model.
//! Repositories translate domain values into parameterized SQL and back; they
//! hold no order state of their own.
//!
//! Repositories are trait-based so the service layer can swap implementations.

mod orders;

// Re-export trait
pub use orders::OrderRepository;

// Re-export implementations
pub use orders::PgOrderRepository;
