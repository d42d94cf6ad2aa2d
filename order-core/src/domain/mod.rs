//! Core domain types
//!
//! This module contains the domain structures shared between the service layer
//! (which builds and validates them) and the store (which persists them).

pub mod order;
