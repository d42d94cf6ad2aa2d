//! Order Core
//!
//! Core types for the order read model.
//!
//! This crate contains:
//! - Domain types: the order aggregate (Order and its OrderItems)
//!
//! The types carry no persistence or transport logic; they are built by the
//! service layer and handed to `order-store` for persistence.

pub mod domain;
