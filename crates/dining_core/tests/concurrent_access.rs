use dining_core::db::open_db;
use dining_core::{
    DiningHall, DiningHallType, ItemType, MenuEntry, MenuItem, MenuRepository, MenuService,
    SqliteMenuRepository,
};
use std::path::Path;
use std::thread;

const DAY: i64 = 86_400_000;
const ALLERGENS_PER_ITEM: usize = 3;

fn snapshot(generation: usize) -> Vec<MenuEntry> {
    ["Porridge", "Fruit"]
        .into_iter()
        .map(|name| {
            MenuEntry::new(
                MenuItem::new(
                    format!("{name} #{generation}"),
                    ItemType::Breakfast,
                    "Morning",
                    DAY,
                    DiningHallType::Evk,
                ),
                ["Oats", "Milk", "Nuts"],
            )
        })
        .collect()
}

fn prepare(path: &Path) {
    let mut conn = open_db(path).unwrap();
    let mut repo = SqliteMenuRepository::try_new(&mut conn).unwrap();
    repo.insert_dining_halls(&[DiningHall::from_type(DiningHallType::Evk)])
        .unwrap();
    repo.replace_menu_snapshot(DAY, &snapshot(0)).unwrap();
}

#[test]
fn reader_keeps_snapshot_while_writer_holds_uncommitted_drop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("menu.db");
    prepare(&path);

    let writer = open_db(&path).unwrap();
    let mut reader_conn = open_db(&path).unwrap();

    writer.execute_batch("BEGIN IMMEDIATE;").unwrap();
    writer
        .execute("DELETE FROM menu_items WHERE date = ?1;", [DAY])
        .unwrap();
    {
        let reader = SqliteMenuRepository::try_new(&mut reader_conn).unwrap();
        let entries = reader
            .get_menu_items_for_hall(DiningHallType::Evk, ItemType::Breakfast, DAY)
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries
            .iter()
            .all(|entry| entry.allergens.len() == ALLERGENS_PER_ITEM));
    }

    writer.execute_batch("COMMIT;").unwrap();

    let reader = SqliteMenuRepository::try_new(&mut reader_conn).unwrap();
    assert!(reader
        .get_menu_items_for_hall(DiningHallType::Evk, ItemType::Breakfast, DAY)
        .unwrap()
        .is_empty());
    assert!(!reader.hall_has_menu(DiningHallType::Evk.id(), DAY).unwrap());
}

#[test]
fn concurrent_refreshes_never_expose_partial_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("menu.db");
    prepare(&path);

    let writer_path = path.clone();
    let writer = thread::spawn(move || {
        let mut conn = open_db(&writer_path).unwrap();
        let mut repo = SqliteMenuRepository::try_new(&mut conn).unwrap();
        for generation in 1..=40 {
            repo.replace_menu_snapshot(DAY, &snapshot(generation))
                .unwrap();
        }
    });

    let reader_path = path.clone();
    let reader = thread::spawn(move || {
        let mut conn = open_db(&reader_path).unwrap();
        let repo = SqliteMenuRepository::try_new(&mut conn).unwrap();
        for _ in 0..200 {
            let entries = repo
                .get_menu_items(DiningHallType::Evk.id(), ItemType::Breakfast, DAY)
                .unwrap();
            assert_eq!(entries.len(), 2, "a snapshot always has two items");
            let generation = entries[0].menu_item.name.split('#').nth(1).unwrap();
            for entry in &entries {
                assert_eq!(entry.allergens.len(), ALLERGENS_PER_ITEM);
                assert!(entry.menu_item.name.ends_with(&format!("#{generation}")));
            }
        }
    });

    writer.join().unwrap();
    reader.join().unwrap();
}

/// Even generations serve Evk breakfast only, odd ones Village brunch only.
fn alternating_snapshot(generation: usize) -> Vec<MenuEntry> {
    let (hall, item_type) = if generation % 2 == 0 {
        (DiningHallType::Evk, ItemType::Breakfast)
    } else {
        (DiningHallType::Village, ItemType::Brunch)
    };
    vec![MenuEntry::new(
        MenuItem::new(format!("Plate #{generation}"), item_type, "Main", DAY, hall),
        ["Gluten"],
    )]
}

#[test]
fn day_availability_never_mixes_two_refreshes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("menu.db");
    {
        let mut conn = open_db(&path).unwrap();
        let repo = SqliteMenuRepository::try_new(&mut conn).unwrap();
        let mut service = MenuService::new(repo);
        service.seed_known_halls().unwrap();
        service.refresh_day(DAY, alternating_snapshot(0)).unwrap();
    }

    let writer_path = path.clone();
    let writer = thread::spawn(move || {
        let mut conn = open_db(&writer_path).unwrap();
        let repo = SqliteMenuRepository::try_new(&mut conn).unwrap();
        let mut service = MenuService::new(repo);
        for generation in 1..=60 {
            service
                .refresh_day(DAY, alternating_snapshot(generation))
                .unwrap();
        }
    });

    let reader_path = path.clone();
    let reader = thread::spawn(move || {
        let mut conn = open_db(&reader_path).unwrap();
        let repo = SqliteMenuRepository::try_new(&mut conn).unwrap();
        let service = MenuService::new(repo);
        for _ in 0..300 {
            let day = service.day_availability(DAY).unwrap();
            let open: Vec<DiningHallType> = day
                .halls
                .iter()
                .filter(|entry| entry.has_menu)
                .map(|entry| entry.hall)
                .collect();
            assert!(day.has_menu);
            assert_eq!(open.len(), 1, "open halls reported = {open:?}");

            let village = day.hall(DiningHallType::Village).unwrap();
            assert_eq!(village.has_brunch, village.has_menu);
            assert!(!day.hall(DiningHallType::Evk).unwrap().has_brunch);
            assert!(!day.hall(DiningHallType::Parkside).unwrap().has_menu);
        }
    });

    writer.join().unwrap();
    reader.join().unwrap();
}
