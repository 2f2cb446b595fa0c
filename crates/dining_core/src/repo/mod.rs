//! Repository layer contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the menu store data-access contract.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Every multi-row mutation runs in one transaction.
//! - Storage constraint failures are mapped to semantic errors
//!   (`ConstraintViolation`, `DuplicateKey`) rather than leaked as raw SQLite
//!   errors.

pub mod menu_repo;
