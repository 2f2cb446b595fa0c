//! Local relational cache for dining-hall menus.
//! This crate is the single owner of the cache schema and its invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::CacheConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::availability::{DayAvailability, HallAvailability};
pub use model::hall::{DiningHall, DiningHallType, HallId, UnknownHallId};
pub use model::menu::{
    menu_date_from_epoch_ms, Allergen, AllergenId, ItemType, MenuDate, MenuEntry, MenuItem,
    MenuItemId, MenuItemWithAllergens,
};
pub use repo::menu_repo::{MenuRepository, RepoError, RepoResult, SqliteMenuRepository};
pub use service::menu_service::{MenuService, RefreshSummary};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
