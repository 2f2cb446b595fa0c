//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate menu store calls into use-case level APIs for the refresh
//!   and presentation collaborators.
//! - Keep callers decoupled from storage details.

pub mod menu_service;
