//! Per-day availability summary.
//!
//! # Invariants
//! - A `DayAvailability` is built from one storage snapshot; its hall entries
//!   and `has_menu` flag never disagree.

use crate::model::hall::DiningHallType;
use crate::model::menu::MenuDate;
use serde::Serialize;

/// Availability of one hall on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HallAvailability {
    pub hall: DiningHallType,
    pub has_menu: bool,
    pub has_brunch: bool,
}

/// Availability of every known hall on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayAvailability {
    pub date: MenuDate,
    pub has_menu: bool,
    /// One entry per known hall, in [`DiningHallType::ALL`] order.
    pub halls: Vec<HallAvailability>,
}

impl DayAvailability {
    /// First hall with a menu, used when the selected hall is closed.
    pub fn first_open_hall(&self) -> Option<DiningHallType> {
        self.halls
            .iter()
            .find(|entry| entry.has_menu)
            .map(|entry| entry.hall)
    }

    /// Entry for `hall`.
    pub fn hall(&self, hall: DiningHallType) -> Option<&HallAvailability> {
        self.halls.iter().find(|entry| entry.hall == hall)
    }
}
