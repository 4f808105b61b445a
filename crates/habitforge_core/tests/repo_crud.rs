use chrono::{TimeZone, Utc};
use habitforge_core::db::open_db_in_memory;
use habitforge_core::{
    CalendarKey, CheckIn, CheckInRepository, DayWindow, Frequency, Habit, HabitListQuery,
    HabitRepository, HabitSortField, RepoError, SortOrder, SqliteCheckInRepository,
    SqliteHabitRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn day(value: &str) -> CalendarKey {
    CalendarKey::parse(value).unwrap()
}

fn habit(user_id: &str, title: &str, created_ms: i64) -> Habit {
    let mut habit = Habit::new(
        user_id,
        title,
        day("2024-01-01"),
        Frequency::Daily,
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    );
    habit.created_at = created_ms;
    habit.updated_at = created_ms;
    habit
}

fn check_in(habit: &Habit, date: &str) -> CheckIn {
    CheckIn::new(
        habit.id,
        habit.user_id.clone(),
        day(date),
        None,
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
    )
}

fn user_query(user_id: &str) -> HabitListQuery {
    HabitListQuery {
        user_id: user_id.to_string(),
        ..HabitListQuery::default()
    }
}

fn insert_category(conn: &Connection, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO categories (id, name, description, color, icon)
         VALUES (?1, ?2, NULL, '#4CAF50', 'leaf');",
        rusqlite::params![id.to_string(), name],
    )
    .unwrap();
    id
}

#[test]
fn habit_create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHabitRepository::try_new(&conn).unwrap();
    let category_id = insert_category(&conn, "Health");

    let mut created = habit("user-a", "Morning run", 1);
    created.description = Some("5 km".to_string());
    created.frequency = Frequency::Weekly;
    created.category_id = Some(category_id);
    created.start_date = day("2024-02-29");
    repo.create_habit(&created).unwrap();

    let loaded = repo.get_habit(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);

    let category = repo.get_category(category_id).unwrap().unwrap();
    assert_eq!(category.name, "Health");
    assert_eq!(category.color.as_deref(), Some("#4CAF50"));
    assert!(repo.get_category(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn habit_create_rejects_invalid_record() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHabitRepository::try_new(&conn).unwrap();

    let mut invalid = habit("user-a", "Run", 1);
    invalid.title = "ab".to_string();
    assert!(matches!(
        repo.create_habit(&invalid),
        Err(RepoError::Validation(_))
    ));
    assert_eq!(repo.count_habits(&user_query("user-a")).unwrap(), 0);
}

#[test]
fn habit_update_missing_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHabitRepository::try_new(&conn).unwrap();

    let ghost = habit("user-a", "Ghost habit", 1);
    match repo.update_habit(&ghost) {
        Err(RepoError::NotFound(id)) => assert_eq!(id, ghost.id),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn list_filters_by_owner_activity_and_title() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHabitRepository::try_new(&conn).unwrap();

    let read = habit("user-a", "Read books", 1);
    let mut walk = habit("user-a", "Walk the dog", 2);
    walk.is_active = false;
    let percent = habit("user-a", "Save 10% salary", 3);
    let foreign = habit("user-b", "Read news", 4);
    for record in [&read, &walk, &percent, &foreign] {
        repo.create_habit(record).unwrap();
    }

    let all = repo.list_habits(&user_query("user-a")).unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|habit| habit.user_id == "user-a"));

    let active_only = HabitListQuery {
        active_only: true,
        ..user_query("user-a")
    };
    assert_eq!(repo.count_habits(&active_only).unwrap(), 2);

    let search = HabitListQuery {
        title_contains: Some("READ".to_string()),
        ..user_query("user-a")
    };
    let found = repo.list_habits(&search).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, read.id);

    let literal_percent = HabitListQuery {
        title_contains: Some("10%".to_string()),
        ..user_query("user-a")
    };
    assert_eq!(repo.count_habits(&literal_percent).unwrap(), 1);

    let wildcard = HabitListQuery {
        title_contains: Some("%".to_string()),
        ..user_query("user-a")
    };
    assert_eq!(repo.count_habits(&wildcard).unwrap(), 1);
}

#[test]
fn list_sorts_and_paginates() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHabitRepository::try_new(&conn).unwrap();

    let titles = ["Alpha habit", "Bravo habit", "Charlie habit", "Delta habit"];
    for (index, title) in titles.iter().enumerate() {
        repo.create_habit(&habit("user-a", title, index as i64)).unwrap();
    }

    let newest_first = repo.list_habits(&user_query("user-a")).unwrap();
    let order: Vec<&str> = newest_first.iter().map(|h| h.title.as_str()).collect();
    assert_eq!(
        order,
        ["Delta habit", "Charlie habit", "Bravo habit", "Alpha habit"]
    );

    let second_page = HabitListQuery {
        sort_by: HabitSortField::Title,
        sort_order: SortOrder::Asc,
        limit: Some(2),
        offset: 2,
        ..user_query("user-a")
    };
    let page: Vec<String> = repo
        .list_habits(&second_page)
        .unwrap()
        .into_iter()
        .map(|h| h.title)
        .collect();
    assert_eq!(page, ["Charlie habit", "Delta habit"]);
    assert_eq!(repo.count_habits(&second_page).unwrap(), 4);
}

#[test]
fn check_in_roundtrip_and_day_lookup() {
    let conn = open_db_in_memory().unwrap();
    let habits = SqliteHabitRepository::try_new(&conn).unwrap();
    let check_ins = SqliteCheckInRepository::try_new(&conn).unwrap();

    let owner = habit("user-a", "Stretching", 1);
    habits.create_habit(&owner).unwrap();

    let mut first = check_in(&owner, "2024-03-05");
    first.note = Some("felt good".to_string());
    check_ins.create_check_in(&first).unwrap();

    assert_eq!(check_ins.get_check_in(first.id).unwrap(), Some(first.clone()));
    assert_eq!(
        check_ins.find_check_in(owner.id, day("2024-03-05")).unwrap(),
        Some(first.clone())
    );
    assert_eq!(check_ins.find_check_in(owner.id, day("2024-03-06")).unwrap(), None);
}

#[test]
fn duplicate_day_is_a_conflict() {
    let conn = open_db_in_memory().unwrap();
    let habits = SqliteHabitRepository::try_new(&conn).unwrap();
    let check_ins = SqliteCheckInRepository::try_new(&conn).unwrap();

    let owner = habit("user-a", "Stretching", 1);
    habits.create_habit(&owner).unwrap();
    check_ins.create_check_in(&check_in(&owner, "2024-03-05")).unwrap();

    match check_ins.create_check_in(&check_in(&owner, "2024-03-05")) {
        Err(RepoError::Conflict { habit_id, date }) => {
            assert_eq!(habit_id, owner.id);
            assert_eq!(date, day("2024-03-05"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn window_queries_are_half_open_and_ascending() {
    let conn = open_db_in_memory().unwrap();
    let habits = SqliteHabitRepository::try_new(&conn).unwrap();
    let check_ins = SqliteCheckInRepository::try_new(&conn).unwrap();

    let first = habit("user-a", "Journal", 1);
    let second = habit("user-a", "Meditate", 2);
    habits.create_habit(&first).unwrap();
    habits.create_habit(&second).unwrap();
    for date in ["2024-03-07", "2024-03-01", "2024-03-04", "2024-02-29"] {
        check_ins.create_check_in(&check_in(&first, date)).unwrap();
    }
    check_ins
        .create_check_in(&check_in(&second, "2024-03-04"))
        .unwrap();

    let window = DayWindow::span(day("2024-03-01"), day("2024-03-06")).unwrap();
    let dates: Vec<String> = check_ins
        .list_check_ins(first.id, window)
        .unwrap()
        .into_iter()
        .map(|c| c.date.to_string())
        .collect();
    assert_eq!(dates, ["2024-03-01", "2024-03-04"]);

    let instants = check_ins.list_check_in_dates(first.id, window).unwrap();
    assert_eq!(
        instants,
        [
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap(),
        ]
    );

    let per_user = check_ins
        .list_user_check_in_dates("user-a", DayWindow::day(day("2024-03-04")))
        .unwrap();
    assert_eq!(per_user.len(), 2);

    let since_march = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    assert_eq!(
        check_ins
            .count_user_check_ins("user-a", Some(since_march))
            .unwrap(),
        4
    );
    assert_eq!(check_ins.count_user_check_ins("user-a", None).unwrap(), 5);
    assert_eq!(check_ins.count_user_check_ins("user-b", None).unwrap(), 0);
}

#[test]
fn update_note_changes_only_the_note() {
    let conn = open_db_in_memory().unwrap();
    let habits = SqliteHabitRepository::try_new(&conn).unwrap();
    let check_ins = SqliteCheckInRepository::try_new(&conn).unwrap();

    let owner = habit("user-a", "Journal", 1);
    habits.create_habit(&owner).unwrap();
    let created = check_in(&owner, "2024-03-02");
    check_ins.create_check_in(&created).unwrap();

    check_ins.update_note(created.id, Some("two pages")).unwrap();
    let loaded = check_ins.get_check_in(created.id).unwrap().unwrap();
    assert_eq!(loaded.note.as_deref(), Some("two pages"));
    assert_eq!(loaded.date, created.date);

    let missing = Uuid::new_v4();
    assert!(matches!(
        check_ins.update_note(missing, None),
        Err(RepoError::NotFound(id)) if id == missing
    ));
}

#[test]
fn corrupted_rows_surface_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let habits = SqliteHabitRepository::try_new(&conn).unwrap();
    let check_ins = SqliteCheckInRepository::try_new(&conn).unwrap();

    let owner = habit("user-a", "Journal", 1);
    habits.create_habit(&owner).unwrap();
    let created = check_in(&owner, "2024-03-02");
    check_ins.create_check_in(&created).unwrap();

    conn.execute(
        "UPDATE check_ins SET date = date + 3600000 WHERE id = ?1;",
        [created.id.to_string()],
    )
    .unwrap();
    assert!(matches!(
        check_ins.get_check_in(created.id),
        Err(RepoError::InvalidData(_))
    ));
}
