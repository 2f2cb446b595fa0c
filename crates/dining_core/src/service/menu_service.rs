//! Menu use-case service.
//!
//! # Responsibility
//! - Seed the known hall set.
//! - Replace a day's menu from a fetched snapshot.
//! - Summarize per-day availability for navigation and meal tabs.
//!
//! # Invariants
//! - Service APIs never bypass repository transactions.
//! - Caller timestamps are normalized to UTC midnight before reaching storage.

use crate::model::availability::DayAvailability;
use crate::model::hall::{DiningHall, DiningHallType, HallId};
use crate::model::menu::{
    menu_date_from_epoch_ms, ItemType, MenuDate, MenuEntry, MenuItemId, MenuItemWithAllergens,
};
use crate::repo::menu_repo::{MenuRepository, RepoError, RepoResult};
use log::info;
use serde::Serialize;
use std::collections::BTreeSet;

/// Outcome of a day refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    pub date: MenuDate,
    pub item_ids: Vec<MenuItemId>,
}

/// Use-case service wrapper for menu cache operations.
pub struct MenuService<R: MenuRepository> {
    repo: R,
}

impl<R: MenuRepository> MenuService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Inserts the known halls that are not stored yet.
    ///
    /// Safe to call on every start; returns the ids inserted by this call.
    pub fn seed_known_halls(&mut self) -> RepoResult<Vec<HallId>> {
        let present: BTreeSet<HallId> = self
            .repo
            .list_dining_halls()?
            .into_iter()
            .map(|hall| hall.id)
            .collect();
        let missing: Vec<DiningHall> = DiningHallType::ALL
            .into_iter()
            .filter(|hall| !present.contains(&hall.id()))
            .map(DiningHall::from_type)
            .collect();
        if missing.is_empty() {
            return Ok(Vec::new());
        }

        let inserted = self.repo.insert_dining_halls(&missing)?;
        info!(
            "event=halls_seed module=service status=ok inserted={}",
            inserted.len()
        );
        Ok(inserted)
    }

    /// Lists stored halls decoded to the known hall set.
    ///
    /// # Errors
    /// - `DataIntegrity` when a stored hall id is not a known hall.
    pub fn known_halls(&self) -> RepoResult<Vec<DiningHallType>> {
        self.repo
            .list_dining_halls()?
            .iter()
            .map(|hall| {
                hall.hall_type()
                    .map_err(|err| RepoError::DataIntegrity(format!("{err} in dining_halls.id")))
            })
            .collect()
    }

    /// Returns one meal of one hall for the day containing `epoch_ms`.
    pub fn meal(
        &self,
        hall: DiningHallType,
        item_type: ItemType,
        epoch_ms: i64,
    ) -> RepoResult<Vec<MenuItemWithAllergens>> {
        self.repo
            .get_menu_items_for_hall(hall, item_type, menu_date_from_epoch_ms(epoch_ms))
    }

    /// Summarizes which halls serve food (and brunch) on the day containing
    /// `epoch_ms`, from one storage snapshot.
    pub fn day_availability(&self, epoch_ms: i64) -> RepoResult<DayAvailability> {
        self.repo.day_availability(menu_date_from_epoch_ms(epoch_ms))
    }

    /// Returns the first known hall with a menu on the day, if any.
    pub fn first_open_hall(&self, epoch_ms: i64) -> RepoResult<Option<DiningHallType>> {
        Ok(self.day_availability(epoch_ms)?.first_open_hall())
    }

    /// Label for the morning meal tab: `Brunch` when served that day.
    pub fn breakfast_label(&self, hall: DiningHallType, epoch_ms: i64) -> RepoResult<ItemType> {
        if self
            .repo
            .hall_has_brunch(hall, menu_date_from_epoch_ms(epoch_ms))?
        {
            Ok(ItemType::Brunch)
        } else {
            Ok(ItemType::Breakfast)
        }
    }

    /// Replaces the menu of the day containing `epoch_ms` with `entries`.
    ///
    /// Entry dates are normalized to the same day before the write, so a
    /// fetch that stamps items with a time of day still lands on one day.
    pub fn refresh_day(
        &mut self,
        epoch_ms: i64,
        entries: Vec<MenuEntry>,
    ) -> RepoResult<RefreshSummary> {
        let date = menu_date_from_epoch_ms(epoch_ms);
        let entries: Vec<MenuEntry> = entries
            .into_iter()
            .map(|mut entry| {
                entry.item.date = menu_date_from_epoch_ms(entry.item.date);
                entry
            })
            .collect();

        let item_ids = self.repo.replace_menu_snapshot(date, &entries)?;
        info!(
            "event=menu_refresh module=service status=ok date={} items={}",
            date,
            item_ids.len()
        );
        Ok(RefreshSummary { date, item_ids })
    }

    /// Drops the menu of the day containing `epoch_ms`.
    pub fn drop_day(&mut self, epoch_ms: i64) -> RepoResult<usize> {
        self.repo
            .drop_menu_items_for_date(menu_date_from_epoch_ms(epoch_ms))
    }

    /// Drops every cached menu item.
    pub fn clear(&mut self) -> RepoResult<usize> {
        self.repo.drop_menu_items()
    }

    /// Gives access to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }
}
