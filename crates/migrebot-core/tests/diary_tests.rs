//! Diary repository and export integration tests.

use std::thread;
use std::time::Duration;

use chrono::NaiveDate;
use migrebot_core::db::{Database, DbError};
use migrebot_core::export::{build_csv, ExportFormat, ExportWindow};
use migrebot_core::models::{
    today, EntryCreate, EntryUpdate, MedicationCreate, MedicationType, PainLevel, Patch,
    SymptomCreate, UserProfile, ValidationError,
};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup_user(db: &mut Database) -> i64 {
    db.run(|s| s.get_or_create_user(42, &UserProfile::with_username("migraine_diary")))
        .unwrap()
        .id
}

fn full_create(user_id: i64, date: NaiveDate) -> EntryCreate {
    EntryCreate {
        user_id,
        entry_date: date,
        pain_level: Some(PainLevel::Moderate),
        pain_score: Some(6),
        pain_description: Some("пульсирующая, слева".to_string()),
        notes: Some("после кофе".to_string()),
        had_attack: true,
    }
}

#[test]
fn test_create_then_get_returns_equal_entry() {
    let mut db = Database::open_in_memory().unwrap();
    let user_id = setup_user(&mut db);
    let data = full_create(user_id, day(2024, 5, 1));

    let created = db.run(|s| s.create_entry(&data)).unwrap();
    let fetched = db
        .run(|s| s.get_entry(user_id, data.entry_date))
        .unwrap()
        .unwrap();

    assert_eq!(created, fetched);
    assert_eq!(fetched.pain_level, data.pain_level);
    assert_eq!(fetched.pain_score, data.pain_score);
    assert_eq!(fetched.pain_description, data.pain_description);
    assert_eq!(fetched.notes, data.notes);
    assert_eq!(fetched.had_attack, data.had_attack);
    assert_eq!(fetched.created_at, fetched.updated_at);
}

#[test]
fn test_second_create_conflicts_and_keeps_original() {
    let mut db = Database::open_in_memory().unwrap();
    let user_id = setup_user(&mut db);
    let date = day(2024, 5, 1);

    let original = db
        .run(|s| s.create_entry(&full_create(user_id, date)))
        .unwrap();

    let mut other = EntryCreate::new(user_id, date);
    other.pain_score = Some(1);
    let err = db.run(|s| s.create_entry(&other)).unwrap_err();
    assert!(matches!(err, DbError::Conflict(_)));

    let stored = db.run(|s| s.get_entry(user_id, date)).unwrap().unwrap();
    assert_eq!(stored, original);
    assert_eq!(db.run(|s| s.count_entries(user_id)).unwrap(), 1);
}

#[test]
fn test_same_date_for_different_users_is_allowed() {
    let mut db = Database::open_in_memory().unwrap();
    let first = setup_user(&mut db);
    let second = db
        .run(|s| s.get_or_create_user(43, &UserProfile::default()))
        .unwrap()
        .id;
    let date = day(2024, 5, 1);

    db.run(|s| s.create_entry(&EntryCreate::new(first, date)))
        .unwrap();
    db.run(|s| s.create_entry(&EntryCreate::new(second, date)))
        .unwrap();
}

#[test]
fn test_single_field_update_keeps_other_fields() {
    let mut db = Database::open_in_memory().unwrap();
    let user_id = setup_user(&mut db);
    let before = db
        .run(|s| s.create_entry(&full_create(user_id, day(2024, 5, 1))))
        .unwrap();

    thread::sleep(Duration::from_millis(5));
    let after = db
        .run(|s| s.update_entry(before.id, &EntryUpdate::pain_score(7)))
        .unwrap()
        .unwrap();

    assert_eq!(after.pain_score, Some(7));
    assert_eq!(after.pain_level, before.pain_level);
    assert_eq!(after.pain_description, before.pain_description);
    assert_eq!(after.notes, before.notes);
    assert_eq!(after.had_attack, before.had_attack);
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at > before.updated_at);

    let stored = db.run(|s| s.get_entry_by_id(before.id)).unwrap().unwrap();
    assert_eq!(stored, after);
}

#[test]
fn test_update_distinguishes_clear_from_keep() {
    let mut db = Database::open_in_memory().unwrap();
    let user_id = setup_user(&mut db);
    let entry = db
        .run(|s| s.create_entry(&full_create(user_id, day(2024, 5, 1))))
        .unwrap();

    let clear_notes = EntryUpdate {
        notes: Patch::Set(None),
        ..EntryUpdate::default()
    };
    let updated = db
        .run(|s| s.update_entry(entry.id, &clear_notes))
        .unwrap()
        .unwrap();

    assert_eq!(updated.notes, None);
    assert_eq!(updated.pain_description, entry.pain_description);
}

#[test]
fn test_update_missing_entry_is_absent() {
    let mut db = Database::open_in_memory().unwrap();
    setup_user(&mut db);
    let result = db
        .run(|s| s.update_entry(12345, &EntryUpdate::notes("x")))
        .unwrap();
    assert!(result.is_none());
}

#[test]
fn test_score_bounds() {
    let mut db = Database::open_in_memory().unwrap();
    let user_id = setup_user(&mut db);

    for (offset, score) in [1, 10].into_iter().enumerate() {
        let mut data = EntryCreate::new(user_id, day(2024, 5, 1 + offset as u32));
        data.pain_score = Some(score);
        db.run(|s| s.create_entry(&data)).unwrap();
    }

    for score in [0, 11, -3] {
        let mut data = EntryCreate::new(user_id, day(2024, 4, 1));
        data.pain_score = Some(score);
        let err = db.run(|s| s.create_entry(&data)).unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::OutOfRange { field: "pain_score", .. })
        ));
    }
    assert_eq!(db.run(|s| s.count_entries(user_id)).unwrap(), 2);
}

#[test]
fn test_future_date_rejected_today_accepted() {
    let mut db = Database::open_in_memory().unwrap();
    let user_id = setup_user(&mut db);
    let today = today();
    let tomorrow = today.succ_opt().unwrap();

    let err = db
        .run(|s| s.create_entry(&EntryCreate::new(user_id, tomorrow)))
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Validation(ValidationError::FutureDate { .. })
    ));
    assert!(err.to_string().contains("future date not allowed"));

    db.run(|s| s.create_entry(&EntryCreate::new(user_id, today)))
        .unwrap();
}

#[test]
fn test_csv_from_stored_entries() {
    let mut db = Database::open_in_memory().unwrap();
    let user_id = setup_user(&mut db);

    let mut first = EntryCreate::new(user_id, day(2024, 5, 1));
    first.pain_score = Some(5);
    let mut second = EntryCreate::new(user_id, day(2024, 4, 30));
    second.pain_level = Some(PainLevel::Severe);
    second.had_attack = true;

    db.run(|s| {
        s.create_entry(&second)?;
        s.create_entry(&first)
    })
    .unwrap();

    let entries = db
        .run(|s| s.list_entries_in_range(user_id, day(2024, 4, 1), day(2024, 5, 1)))
        .unwrap();
    let csv = build_csv(&entries).unwrap();
    let text = String::from_utf8(csv.clone()).unwrap();
    let lines: Vec<_> = text.split("\r\n").collect();

    assert_eq!(
        lines[0],
        "Дата,Уровень боли (категория),Оценка боли (1-10),Описание боли,Приступ,Заметки"
    );
    assert_eq!(lines[1], "2024-05-01,,5,,нет,");
    assert_eq!(lines[2], "2024-04-30,severe,,,да,");
    assert_eq!(build_csv(&entries).unwrap(), csv);
}

#[test]
fn test_range_listing_is_bounded_and_descending() {
    let mut db = Database::open_in_memory().unwrap();
    let user_id = setup_user(&mut db);

    let dates = [
        day(2024, 3, 31),
        day(2024, 4, 1),
        day(2024, 4, 20),
        day(2024, 4, 10),
        day(2024, 5, 1),
        day(2024, 5, 2),
    ];
    db.run(|s| {
        for date in dates {
            s.create_entry(&EntryCreate::new(user_id, date))?;
        }
        Ok::<_, DbError>(())
    })
    .unwrap();

    let window = ExportWindow::new(day(2024, 4, 1), day(2024, 5, 1));
    let entries = db
        .run(|s| s.list_entries_in_range(user_id, window.start, window.end))
        .unwrap();

    let listed: Vec<_> = entries.iter().map(|e| e.entry_date).collect();
    assert_eq!(
        listed,
        vec![day(2024, 5, 1), day(2024, 4, 20), day(2024, 4, 10), day(2024, 4, 1)]
    );
    assert!(listed.iter().all(|d| window.contains(*d)));
}

#[test]
fn test_list_entries_pages_most_recent_first() {
    let mut db = Database::open_in_memory().unwrap();
    let user_id = setup_user(&mut db);
    db.run(|s| {
        for d in 1..=12 {
            s.create_entry(&EntryCreate::new(user_id, day(2024, 5, d)))?;
        }
        Ok::<_, DbError>(())
    })
    .unwrap();

    let first_page = db.run(|s| s.list_entries(user_id, 10, 0)).unwrap();
    assert_eq!(first_page.len(), 10);
    assert_eq!(first_page[0].entry_date, day(2024, 5, 12));
    assert_eq!(first_page[9].entry_date, day(2024, 5, 3));

    let second_page = db.run(|s| s.list_entries(user_id, 10, 10)).unwrap();
    let rest: Vec<_> = second_page.iter().map(|e| e.entry_date).collect();
    assert_eq!(rest, vec![day(2024, 5, 2), day(2024, 5, 1)]);
}

#[test]
fn test_delete_entry_leaves_no_orphans() {
    let mut db = Database::open_in_memory().unwrap();
    let user_id = setup_user(&mut db);

    let entry = db
        .run(|s| {
            let entry = s.create_entry(&EntryCreate::new(user_id, day(2024, 5, 1)))?;
            s.create_medication(&MedicationCreate::new(
                entry.id,
                "sumatriptan",
                MedicationType::Abortive,
            ))?;
            s.create_medication(&MedicationCreate::new(
                entry.id,
                "topiramate",
                MedicationType::Preventive,
            ))?;
            s.create_symptom(&SymptomCreate::new(entry.id, "aura"))?;
            Ok::<_, DbError>(entry)
        })
        .unwrap();

    assert!(db.run(|s| s.delete_entry(entry.id)).unwrap());

    let orphans: i64 = db
        .conn()
        .query_row(
            "SELECT (SELECT COUNT(*) FROM medications) + (SELECT COUNT(*) FROM symptoms)",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(orphans, 0);
    assert!(db.run(|s| s.get_entry_by_id(entry.id)).unwrap().is_none());
}

#[test]
fn test_failed_command_rolls_back_parent() {
    let mut db = Database::open_in_memory().unwrap();
    let user_id = setup_user(&mut db);
    let date = day(2024, 5, 1);

    let result = db.run(|s| {
        let entry = s.create_entry(&EntryCreate::new(user_id, date))?;
        let mut symptom = SymptomCreate::new(entry.id, "nausea");
        symptom.severity = Some(42);
        s.create_symptom(&symptom)
    });
    assert!(result.is_err());

    assert!(db.run(|s| s.get_entry(user_id, date)).unwrap().is_none());
}

#[test]
fn test_export_file_is_reproducible() {
    let mut db = Database::open_in_memory().unwrap();
    let user_id = setup_user(&mut db);
    db.run(|s| s.create_entry(&full_create(user_id, day(2024, 5, 1))))
        .unwrap();

    let diary = migrebot_core::Diary::from_database(db);
    let window = ExportWindow::new(day(2024, 4, 1), day(2024, 5, 1));

    for format in [ExportFormat::Csv, ExportFormat::Xlsx] {
        let a = diary.export(user_id, format, window, "diary").unwrap();
        let b = diary.export(user_id, format, window, "diary").unwrap();
        assert_eq!(a.bytes, b.bytes);
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.filename, format!("diary_2024-04-01_2024-05-01.{}", format));
    }
}
