//! Menu cache domain model.
//!
//! # Responsibility
//! - Define the hall, menu item, allergen and availability records exchanged
//!   with callers.
//! - Own the closed code tables for hall and item-type enumerations.
//!
//! # Invariants
//! - Enumeration codes are stable; decoding an unknown code yields `None` and
//!   the storage layer turns that into a data-integrity error.
//! - Menu dates are UTC-midnight epoch milliseconds.

pub mod availability;
pub mod hall;
pub mod menu;
