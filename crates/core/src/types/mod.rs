//! Core value types for Packline.
//!
//! This module provides type-safe wrappers for item references and
//! quantities.

pub mod id;
pub mod quantity;

pub use id::ItemId;
pub use quantity::{Quantity, QuantityError, Unit};
