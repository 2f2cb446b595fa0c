//! Dining hall model.
//!
//! # Responsibility
//! - Name the closed set of known dining halls and their stable ids.
//! - Describe the persisted hall row.
//!
//! # Invariants
//! - Every `DiningHallType` maps to exactly one id, and `from_id` is the exact
//!   inverse of `id` over [`DiningHallType::ALL`].

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Raw hall identifier as stored in `dining_halls.id`.
pub type HallId = i64;

/// Known dining halls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiningHallType {
    /// Everybody's Kitchen.
    Evk,
    Parkside,
    Village,
}

impl DiningHallType {
    /// All halls in display order.
    pub const ALL: [DiningHallType; 3] = [Self::Evk, Self::Parkside, Self::Village];

    /// Stable storage id for this hall.
    pub fn id(self) -> HallId {
        match self {
            Self::Evk => 514,
            Self::Parkside => 518,
            Self::Village => 27229,
        }
    }

    /// Decodes a stored hall id. Returns `None` for ids outside the known set.
    pub fn from_id(id: HallId) -> Option<Self> {
        match id {
            514 => Some(Self::Evk),
            518 => Some(Self::Parkside),
            27229 => Some(Self::Village),
            _ => None,
        }
    }

    /// Human-readable hall name used when seeding.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Evk => "Everybody's Kitchen",
            Self::Parkside => "Parkside Restaurant & Grill",
            Self::Village => "USC Village Dining Hall",
        }
    }

    /// Short slug accepted by command-line tools (`evk|parkside|village`).
    pub fn slug(self) -> &'static str {
        match self {
            Self::Evk => "evk",
            Self::Parkside => "parkside",
            Self::Village => "village",
        }
    }

    /// Parses a slug, case-insensitively.
    pub fn from_slug(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "evk" => Some(Self::Evk),
            "parkside" => Some(Self::Parkside),
            "village" => Some(Self::Village),
            _ => None,
        }
    }
}

impl From<DiningHallType> for HallId {
    fn from(value: DiningHallType) -> Self {
        value.id()
    }
}

/// Persisted dining hall row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiningHall {
    pub id: HallId,
    pub name: String,
}

impl DiningHall {
    pub fn new(id: HallId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Builds the seed row for a known hall.
    pub fn from_type(hall: DiningHallType) -> Self {
        Self::new(hall.id(), hall.display_name())
    }

    /// Decodes this row's id into the known hall set.
    ///
    /// # Errors
    /// - Returns [`UnknownHallId`] when the id has no enumeration member.
    pub fn hall_type(&self) -> Result<DiningHallType, UnknownHallId> {
        DiningHallType::from_id(self.id).ok_or(UnknownHallId(self.id))
    }
}

/// A hall id with no [`DiningHallType`] member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownHallId(pub HallId);

impl Display for UnknownHallId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown dining hall id `{}`", self.0)
    }
}

impl Error for UnknownHallId {}
