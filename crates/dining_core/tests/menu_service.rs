use dining_core::db::open_db_in_memory;
use dining_core::{
    DiningHall, DiningHallType, ItemType, MenuEntry, MenuItem, MenuRepository, MenuService,
    RepoError, SqliteMenuRepository,
};

// 2024-03-09 (a Saturday) at 00:00:00Z and a time later that day.
const SATURDAY: i64 = 1_709_942_400_000;
const SATURDAY_NOON: i64 = SATURDAY + 12 * 60 * 60 * 1000;
const SUNDAY: i64 = SATURDAY + 24 * 60 * 60 * 1000;

fn entry(
    name: &str,
    item_type: ItemType,
    hall: DiningHallType,
    allergens: &[&str],
) -> MenuEntry {
    MenuEntry::new(
        MenuItem::new(name, item_type, "Station", SATURDAY_NOON, hall),
        allergens.iter().copied(),
    )
}

#[test]
fn seeding_known_halls_is_idempotent() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteMenuRepository::try_new(&mut conn).unwrap();
    let mut service = MenuService::new(repo);

    let first = service.seed_known_halls().unwrap();
    assert_eq!(first, vec![514, 518, 27229]);
    assert!(service.seed_known_halls().unwrap().is_empty());
    assert_eq!(service.known_halls().unwrap(), DiningHallType::ALL.to_vec());
}

#[test]
fn seeding_fills_only_missing_halls() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteMenuRepository::try_new(&mut conn).unwrap();
    repo.insert_dining_halls(&[DiningHall::from_type(DiningHallType::Parkside)])
        .unwrap();

    let mut service = MenuService::new(repo);
    assert_eq!(service.seed_known_halls().unwrap(), vec![514, 27229]);
}

#[test]
fn known_halls_rejects_foreign_hall_ids() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteMenuRepository::try_new(&mut conn).unwrap();
    repo.insert_dining_halls(&[DiningHall::new(1, "TestHall")])
        .unwrap();

    let service = MenuService::new(repo);
    assert!(matches!(
        service.known_halls(),
        Err(RepoError::DataIntegrity(_))
    ));
}

#[test]
fn refresh_day_normalizes_dates_and_replaces_snapshot() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteMenuRepository::try_new(&mut conn).unwrap();
    let mut service = MenuService::new(repo);
    service.seed_known_halls().unwrap();

    let summary = service
        .refresh_day(
            SATURDAY_NOON,
            vec![
                entry("Pancakes", ItemType::Brunch, DiningHallType::Evk, &["Gluten", "Eggs"]),
                entry("Burger", ItemType::Lunch, DiningHallType::Village, &[]),
            ],
        )
        .unwrap();
    assert_eq!(summary.date, SATURDAY);
    assert_eq!(summary.item_ids.len(), 2);

    let brunch = service
        .meal(DiningHallType::Evk, ItemType::Brunch, SATURDAY_NOON)
        .unwrap();
    assert_eq!(brunch.len(), 1);
    assert_eq!(brunch[0].menu_item.date, SATURDAY);
    assert_eq!(brunch[0].allergens.len(), 2);

    let summary = service
        .refresh_day(
            SATURDAY,
            vec![entry("Tacos", ItemType::Dinner, DiningHallType::Parkside, &["Dairy"])],
        )
        .unwrap();
    assert_eq!(summary.item_ids.len(), 1);
    assert!(service
        .meal(DiningHallType::Evk, ItemType::Brunch, SATURDAY)
        .unwrap()
        .is_empty());
    assert!(service
        .repository()
        .hall_has_menu(DiningHallType::Parkside.id(), SATURDAY)
        .unwrap());
}

#[test]
fn day_availability_reports_each_known_hall() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteMenuRepository::try_new(&mut conn).unwrap();
    let mut service = MenuService::new(repo);
    service.seed_known_halls().unwrap();
    service
        .refresh_day(
            SATURDAY,
            vec![
                entry("Pancakes", ItemType::Brunch, DiningHallType::Parkside, &[]),
                entry("Salad", ItemType::Lunch, DiningHallType::Village, &[]),
            ],
        )
        .unwrap();

    let availability = service.day_availability(SATURDAY_NOON).unwrap();
    assert_eq!(availability.date, SATURDAY);
    assert!(availability.has_menu);
    let halls: Vec<(DiningHallType, bool, bool)> = availability
        .halls
        .iter()
        .map(|entry| (entry.hall, entry.has_menu, entry.has_brunch))
        .collect();
    assert_eq!(
        halls,
        vec![
            (DiningHallType::Evk, false, false),
            (DiningHallType::Parkside, true, true),
            (DiningHallType::Village, true, false),
        ]
    );
    assert_eq!(availability.first_open_hall(), Some(DiningHallType::Parkside));
    assert_eq!(
        service.first_open_hall(SATURDAY).unwrap(),
        Some(DiningHallType::Parkside)
    );

    let empty_day = service.day_availability(SUNDAY).unwrap();
    assert!(!empty_day.has_menu);
    assert!(empty_day.halls.iter().all(|entry| !entry.has_menu));
    assert_eq!(service.first_open_hall(SUNDAY).unwrap(), None);
}

#[test]
fn breakfast_label_switches_to_brunch_when_served() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteMenuRepository::try_new(&mut conn).unwrap();
    let mut service = MenuService::new(repo);
    service.seed_known_halls().unwrap();
    service
        .refresh_day(
            SATURDAY,
            vec![
                entry("Omelette", ItemType::Brunch, DiningHallType::Evk, &["Eggs"]),
                entry("Oatmeal", ItemType::Breakfast, DiningHallType::Village, &[]),
            ],
        )
        .unwrap();

    assert_eq!(
        service
            .breakfast_label(DiningHallType::Evk, SATURDAY_NOON)
            .unwrap(),
        ItemType::Brunch
    );
    assert_eq!(
        service
            .breakfast_label(DiningHallType::Village, SATURDAY)
            .unwrap(),
        ItemType::Breakfast
    );
    assert_eq!(
        service.breakfast_label(DiningHallType::Evk, SUNDAY).unwrap(),
        ItemType::Breakfast
    );
}

#[test]
fn drop_day_and_clear_remove_menus() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteMenuRepository::try_new(&mut conn).unwrap();
    let mut service = MenuService::new(repo);
    service.seed_known_halls().unwrap();
    service
        .refresh_day(
            SATURDAY,
            vec![entry("Soup", ItemType::Lunch, DiningHallType::Evk, &["Celery"])],
        )
        .unwrap();
    let sunday_soup = MenuEntry::new(
        MenuItem::new("Soup", ItemType::Lunch, "Station", SUNDAY, DiningHallType::Evk),
        ["Celery"],
    );
    service.refresh_day(SUNDAY, vec![sunday_soup]).unwrap();

    assert_eq!(service.drop_day(SATURDAY_NOON).unwrap(), 1);
    assert!(!service.day_availability(SATURDAY).unwrap().has_menu);
    assert!(service.day_availability(SUNDAY).unwrap().has_menu);

    assert_eq!(service.clear().unwrap(), 1);
    assert!(!service.day_availability(SUNDAY).unwrap().has_menu);
}
