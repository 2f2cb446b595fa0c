//! Menu item and allergen model.
//!
//! # Responsibility
//! - Define menu item, allergen and composite read records.
//! - Own the item-type code table and menu date normalization.
//!
//! # Invariants
//! - `MenuItem.id` and `Allergen.id` are generated by storage; values passed
//!   on insert are ignored.
//! - A `MenuItemWithAllergens` always carries a (possibly empty) allergen list.

use crate::model::hall::HallId;
use serde::{Deserialize, Serialize};

/// Generated menu item identifier.
pub type MenuItemId = i64;

/// Generated allergen identifier.
pub type AllergenId = i64;

/// UTC-midnight epoch milliseconds identifying one menu day.
pub type MenuDate = i64;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Meal category of a menu item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Breakfast,
    Lunch,
    Dinner,
    /// Weekend replacement for breakfast at some halls.
    Brunch,
}

impl ItemType {
    pub const ALL: [ItemType; 4] = [Self::Breakfast, Self::Lunch, Self::Dinner, Self::Brunch];

    /// Stored code in `menu_items.type`.
    pub fn code(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Brunch => "brunch",
        }
    }

    /// Decodes a stored code. Codes are exact; no case folding.
    pub fn from_code(value: &str) -> Option<Self> {
        match value {
            "breakfast" => Some(Self::Breakfast),
            "lunch" => Some(Self::Lunch),
            "dinner" => Some(Self::Dinner),
            "brunch" => Some(Self::Brunch),
            _ => None,
        }
    }
}

/// Truncates an epoch-millisecond timestamp to its UTC midnight.
///
/// Timestamps before the epoch round down to the previous midnight.
pub fn menu_date_from_epoch_ms(epoch_ms: i64) -> MenuDate {
    epoch_ms.div_euclid(MILLIS_PER_DAY) * MILLIS_PER_DAY
}

/// One dish served by a hall for a meal on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(default)]
    pub id: MenuItemId,
    pub name: String,
    /// Serialized as `type` to match the stored column name.
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// Free-form grouping, usually the station name.
    pub category: String,
    pub date: MenuDate,
    pub hall_id: HallId,
}

impl MenuItem {
    /// Creates an unsaved item; `id` is assigned on insert.
    pub fn new(
        name: impl Into<String>,
        item_type: ItemType,
        category: impl Into<String>,
        date: MenuDate,
        hall_id: impl Into<HallId>,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            item_type,
            category: category.into(),
            date,
            hall_id: hall_id.into(),
        }
    }
}

/// Allergen attached to one menu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allergen {
    #[serde(default)]
    pub id: AllergenId,
    pub name: String,
    pub menu_item_id: MenuItemId,
}

impl Allergen {
    /// Creates an unsaved allergen for `menu_item_id`.
    pub fn new(name: impl Into<String>, menu_item_id: MenuItemId) -> Self {
        Self {
            id: 0,
            name: name.into(),
            menu_item_id,
        }
    }
}

/// Composite read record: an item and its full allergen set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItemWithAllergens {
    pub menu_item: MenuItem,
    pub allergens: Vec<Allergen>,
}

/// Write-side input for snapshot replacement: an item plus allergen names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub item: MenuItem,
    #[serde(default)]
    pub allergens: Vec<String>,
}

impl MenuEntry {
    pub fn new(item: MenuItem, allergens: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            item,
            allergens: allergens.into_iter().map(Into::into).collect(),
        }
    }
}
