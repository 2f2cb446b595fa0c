//! Menu store contract and SQLite implementation.
//!
//! # Responsibility
//! - Own reads and writes over `dining_halls`, `menu_items` and `allergens`.
//! - Translate typed hall/item-type values to stored codes and back.
//! - Answer the availability queries used to drive UI state.
//!
//! # Invariants
//! - Item and allergen writes fail when their parent row is missing.
//! - Dropping menu items removes their allergens through the storage cascade.
//! - The composite item read and the day availability read each observe one
//!   snapshot.
//! - Unknown stored item-type codes are reported, never defaulted.

use crate::db::DbError;
use crate::model::availability::{DayAvailability, HallAvailability};
use crate::model::hall::{DiningHall, DiningHallType, HallId};
use crate::model::menu::{
    Allergen, ItemType, MenuDate, MenuEntry, MenuItem, MenuItemId, MenuItemWithAllergens,
};
use log::{debug, info};
use rusqlite::{ffi, params, Connection, ErrorCode, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MENU_ITEM_SELECT_SQL: &str = "SELECT
    id,
    name,
    type,
    category,
    date,
    hall_id
FROM menu_items";

const HALL_HAS_MENU_SQL: &str = "SELECT EXISTS(
    SELECT 1 FROM menu_items WHERE hall_id = ?1 AND date = ?2
);";

const DATE_HAS_MENU_SQL: &str = "SELECT EXISTS(SELECT 1 FROM menu_items WHERE date = ?1);";

const HALL_HAS_TYPE_SQL: &str = "SELECT EXISTS(
    SELECT 1
    FROM menu_items
    WHERE hall_id = ?1
      AND date = ?2
      AND type = ?3
);";

const REQUIRED_TABLES: [&str; 3] = ["dining_halls", "menu_items", "allergens"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Menu store error.
#[derive(Debug)]
pub enum RepoError {
    /// A write referenced a missing hall or menu item, or a snapshot entry
    /// did not belong to the day being replaced.
    ConstraintViolation(String),
    /// A write collided with an existing primary key.
    DuplicateKey(String),
    /// A stored enumeration code has no known mapping.
    DataIntegrity(String),
    /// Storage medium or schema version failure.
    Db(DbError),
    /// Connection was not migrated before building the repository.
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConstraintViolation(message) => write!(f, "constraint violation: {message}"),
            Self::DuplicateKey(message) => write!(f, "duplicate key: {message}"),
            Self::DataIntegrity(message) => write!(f, "invalid persisted menu data: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "menu cache table `{table}` is missing; was the database migrated?")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::ConstraintViolation(_)
            | Self::DuplicateKey(_)
            | Self::DataIntegrity(_)
            | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Data-access contract for the menu cache.
pub trait MenuRepository {
    /// Returns every stored hall, in id order.
    fn list_dining_halls(&self) -> RepoResult<Vec<DiningHall>>;

    /// Inserts all halls in one transaction and returns their ids in input
    /// order. A duplicate id rejects the whole batch.
    fn insert_dining_halls(&mut self, halls: &[DiningHall]) -> RepoResult<Vec<HallId>>;

    /// Inserts one item and returns its generated id. `item.id` is ignored.
    fn insert_menu_item(&self, item: &MenuItem) -> RepoResult<MenuItemId>;

    /// Inserts all allergens in one transaction. `Allergen.id` is ignored.
    fn insert_allergens(&mut self, allergens: &[Allergen]) -> RepoResult<()>;

    /// Returns every item matching `(hall_id, item_type, date)` together with
    /// its allergens, read from a single snapshot.
    fn get_menu_items(
        &self,
        hall_id: HallId,
        item_type: ItemType,
        date: MenuDate,
    ) -> RepoResult<Vec<MenuItemWithAllergens>>;

    /// Typed-hall form of [`MenuRepository::get_menu_items`].
    fn get_menu_items_for_hall(
        &self,
        hall: DiningHallType,
        item_type: ItemType,
        date: MenuDate,
    ) -> RepoResult<Vec<MenuItemWithAllergens>> {
        self.get_menu_items(hall.id(), item_type, date)
    }

    /// Returns every meal of one hall on `date`, with allergens, read from a
    /// single snapshot.
    fn get_day_menu(
        &self,
        hall_id: HallId,
        date: MenuDate,
    ) -> RepoResult<Vec<MenuItemWithAllergens>>;

    /// Whether the hall has any item on `date`, regardless of meal.
    fn hall_has_menu(&self, hall_id: HallId, date: MenuDate) -> RepoResult<bool>;

    /// Whether any hall has any item on `date`.
    fn date_has_menu(&self, date: MenuDate) -> RepoResult<bool>;

    /// Whether the hall serves brunch on `date`.
    fn hall_has_brunch(&self, hall: DiningHallType, date: MenuDate) -> RepoResult<bool>;

    /// Menu and brunch flags of every known hall on `date`, read from a
    /// single snapshot.
    fn day_availability(&self, date: MenuDate) -> RepoResult<DayAvailability>;

    /// Deletes every item (and by cascade every allergen). Returns the number
    /// of items removed.
    fn drop_menu_items(&mut self) -> RepoResult<usize>;

    /// Deletes the items of one day (and their allergens). Returns the number
    /// of items removed.
    fn drop_menu_items_for_date(&mut self, date: MenuDate) -> RepoResult<usize>;

    /// Replaces the whole menu of `date` with `entries` in one transaction and
    /// returns the new item ids in input order.
    fn replace_menu_snapshot(
        &mut self,
        date: MenuDate,
        entries: &[MenuEntry],
    ) -> RepoResult<Vec<MenuItemId>>;
}

/// SQLite-backed menu store.
pub struct SqliteMenuRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteMenuRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when a menu table does not exist.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_menu_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl MenuRepository for SqliteMenuRepository<'_> {
    fn list_dining_halls(&self) -> RepoResult<Vec<DiningHall>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM dining_halls ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut halls = Vec::new();
        while let Some(row) = rows.next()? {
            halls.push(DiningHall {
                id: row.get("id")?,
                name: row.get("name")?,
            });
        }
        Ok(halls)
    }

    fn insert_dining_halls(&mut self, halls: &[DiningHall]) -> RepoResult<Vec<HallId>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut ids = Vec::with_capacity(halls.len());
        for hall in halls {
            tx.execute(
                "INSERT INTO dining_halls (id, name) VALUES (?1, ?2);",
                params![hall.id, hall.name.as_str()],
            )
            .map_err(|err| classify_write_error(err, "dining_halls"))?;
            ids.push(tx.last_insert_rowid());
        }
        tx.commit()?;

        debug!(
            "event=halls_insert module=repo status=ok count={}",
            ids.len()
        );
        Ok(ids)
    }

    fn insert_menu_item(&self, item: &MenuItem) -> RepoResult<MenuItemId> {
        insert_menu_item_row(self.conn, item)
    }

    fn insert_allergens(&mut self, allergens: &[Allergen]) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        for allergen in allergens {
            insert_allergen_row(&tx, allergen.name.as_str(), allergen.menu_item_id)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn get_menu_items(
        &self,
        hall_id: HallId,
        item_type: ItemType,
        date: MenuDate,
    ) -> RepoResult<Vec<MenuItemWithAllergens>> {
        load_items_with_allergens(
            self.conn,
            "WHERE hall_id = ?1 AND type = ?2 AND date = ?3",
            params![hall_id, item_type.code(), date],
        )
    }

    fn get_day_menu(
        &self,
        hall_id: HallId,
        date: MenuDate,
    ) -> RepoResult<Vec<MenuItemWithAllergens>> {
        load_items_with_allergens(
            self.conn,
            "WHERE hall_id = ?1 AND date = ?2",
            params![hall_id, date],
        )
    }

    fn hall_has_menu(&self, hall_id: HallId, date: MenuDate) -> RepoResult<bool> {
        exists(self.conn, HALL_HAS_MENU_SQL, params![hall_id, date])
    }

    fn date_has_menu(&self, date: MenuDate) -> RepoResult<bool> {
        exists(self.conn, DATE_HAS_MENU_SQL, params![date])
    }

    fn hall_has_brunch(&self, hall: DiningHallType, date: MenuDate) -> RepoResult<bool> {
        exists(
            self.conn,
            HALL_HAS_TYPE_SQL,
            params![hall.id(), date, ItemType::Brunch.code()],
        )
    }

    fn day_availability(&self, date: MenuDate) -> RepoResult<DayAvailability> {
        let tx = self.conn.unchecked_transaction()?;
        let mut halls = Vec::with_capacity(DiningHallType::ALL.len());
        for hall in DiningHallType::ALL {
            halls.push(HallAvailability {
                hall,
                has_menu: exists(&tx, HALL_HAS_MENU_SQL, params![hall.id(), date])?,
                has_brunch: exists(
                    &tx,
                    HALL_HAS_TYPE_SQL,
                    params![hall.id(), date, ItemType::Brunch.code()],
                )?,
            });
        }
        let has_menu = exists(&tx, DATE_HAS_MENU_SQL, params![date])?;
        tx.commit()?;

        Ok(DayAvailability {
            date,
            has_menu,
            halls,
        })
    }

    fn drop_menu_items(&mut self) -> RepoResult<usize> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let removed = tx.execute("DELETE FROM menu_items;", [])?;
        tx.commit()?;

        info!(
            "event=menu_drop module=repo status=ok scope=all removed={}",
            removed
        );
        Ok(removed)
    }

    fn drop_menu_items_for_date(&mut self, date: MenuDate) -> RepoResult<usize> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let removed = tx.execute("DELETE FROM menu_items WHERE date = ?1;", [date])?;
        tx.commit()?;

        info!(
            "event=menu_drop module=repo status=ok scope=date date={} removed={}",
            date, removed
        );
        Ok(removed)
    }

    fn replace_menu_snapshot(
        &mut self,
        date: MenuDate,
        entries: &[MenuEntry],
    ) -> RepoResult<Vec<MenuItemId>> {
        if let Some(stray) = entries.iter().find(|entry| entry.item.date != date) {
            return Err(RepoError::ConstraintViolation(format!(
                "menu item `{}` dated {} does not belong to snapshot date {}",
                stray.item.name, stray.item.date, date
            )));
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let removed = tx.execute("DELETE FROM menu_items WHERE date = ?1;", [date])?;
        let mut ids = Vec::with_capacity(entries.len());
        for entry in entries {
            let item_id = insert_menu_item_row(&tx, &entry.item)?;
            for name in &entry.allergens {
                insert_allergen_row(&tx, name.as_str(), item_id)?;
            }
            ids.push(item_id);
        }
        tx.commit()?;

        info!(
            "event=menu_replace module=repo status=ok date={} removed={} inserted={}",
            date,
            removed,
            ids.len()
        );
        Ok(ids)
    }
}

fn insert_menu_item_row(conn: &Connection, item: &MenuItem) -> RepoResult<MenuItemId> {
    conn.execute(
        "INSERT INTO menu_items (
            name,
            type,
            category,
            date,
            hall_id
        ) VALUES (?1, ?2, ?3, ?4, ?5);",
        params![
            item.name.as_str(),
            item.item_type.code(),
            item.category.as_str(),
            item.date,
            item.hall_id,
        ],
    )
    .map_err(|err| classify_write_error(err, "menu_items"))?;
    Ok(conn.last_insert_rowid())
}

fn insert_allergen_row(
    conn: &Connection,
    name: &str,
    menu_item_id: MenuItemId,
) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO allergens (name, menu_item_id) VALUES (?1, ?2);",
        params![name, menu_item_id],
    )
    .map_err(|err| classify_write_error(err, "allergens"))?;
    Ok(())
}

/// Loads filtered items and their allergens inside one deferred read
/// transaction, so both selects see the same snapshot.
fn load_items_with_allergens(
    conn: &Connection,
    filter: &str,
    filter_params: impl rusqlite::Params,
) -> RepoResult<Vec<MenuItemWithAllergens>> {
    let tx = conn.unchecked_transaction()?;
    let entries = {
        let mut item_stmt =
            tx.prepare(&format!("{MENU_ITEM_SELECT_SQL} {filter} ORDER BY id ASC;"))?;
        let mut rows = item_stmt.query(filter_params)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_menu_item_row(row)?);
        }

        let mut allergen_stmt = tx.prepare(
            "SELECT id, name, menu_item_id
             FROM allergens
             WHERE menu_item_id = ?1
             ORDER BY id ASC;",
        )?;
        let mut entries = Vec::with_capacity(items.len());
        for menu_item in items {
            let mut rows = allergen_stmt.query([menu_item.id])?;
            let mut allergens = Vec::new();
            while let Some(row) = rows.next()? {
                allergens.push(Allergen {
                    id: row.get("id")?,
                    name: row.get("name")?,
                    menu_item_id: row.get("menu_item_id")?,
                });
            }
            entries.push(MenuItemWithAllergens {
                menu_item,
                allergens,
            });
        }
        entries
    };
    tx.commit()?;

    Ok(entries)
}

fn parse_menu_item_row(row: &Row<'_>) -> RepoResult<MenuItem> {
    let code: String = row.get("type")?;
    let item_type = ItemType::from_code(&code).ok_or_else(|| {
        RepoError::DataIntegrity(format!("invalid item type `{code}` in menu_items.type"))
    })?;

    Ok(MenuItem {
        id: row.get("id")?,
        name: row.get("name")?,
        item_type,
        category: row.get("category")?,
        date: row.get("date")?,
        hall_id: row.get("hall_id")?,
    })
}

fn exists(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> RepoResult<bool> {
    let found: i64 = conn.query_row(sql, params, |row| row.get(0))?;
    Ok(found == 1)
}

/// Maps SQLite constraint failures to semantic repository errors.
fn classify_write_error(err: rusqlite::Error, table: &str) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, message) = &err {
        if failure.code == ErrorCode::ConstraintViolation {
            let detail = message
                .clone()
                .unwrap_or_else(|| failure.to_string());
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return RepoError::ConstraintViolation(format!(
                        "{table}: missing parent row ({detail})"
                    ));
                }
                ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE => {
                    return RepoError::DuplicateKey(format!("{table}: {detail}"));
                }
                _ => {}
            }
        }
    }
    RepoError::from(err)
}

fn ensure_menu_connection_ready(conn: &Connection) -> RepoResult<()> {
    for table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    exists(
        conn,
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
    )
}
