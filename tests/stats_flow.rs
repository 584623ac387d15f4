use habitloop::db::DbPool;
use habitloop::models::checkin::CheckinInput;
use habitloop::models::habit::{HabitCreateInput, HabitUpdateInput};
use habitloop::services::checkin_service::CheckinService;
use habitloop::services::habit_service::HabitService;
use habitloop::services::stats_service::StatsService;
use habitloop::utils::dates;
use tempfile::tempdir;

struct Fixture {
    habits: HabitService,
    checkins: CheckinService,
    stats: StatsService,
    _dir: tempfile::TempDir,
}

fn setup() -> Fixture {
    let dir = tempdir().expect("temp dir");
    let db_path = dir.path().join("stats.sqlite");
    let pool = DbPool::new(&db_path).expect("db pool");
    Fixture {
        habits: HabitService::new(pool.clone()),
        checkins: CheckinService::new(pool.clone()),
        stats: StatsService::new(pool),
        _dir: dir,
    }
}

fn record(fixture: &Fixture, habit_id: &str, date: &str, value: i64) {
    fixture
        .checkins
        .record_checkin(
            "user-1",
            CheckinInput {
                habit_id: habit_id.into(),
                date: date.into(),
                value: Some(value),
                note: None,
            },
        )
        .expect("record check-in");
}

// Week of 2025-08-24: Sunday the 24th through Saturday the 30th.
#[test]
fn full_week_of_two_habits_produces_consistent_statistics() {
    let fixture = setup();
    let every_day = fixture
        .habits
        .create_habit(
            "user-1",
            HabitCreateInput {
                name: "Journal".into(),
                ..Default::default()
            },
        )
        .expect("create habit");
    let weekdays_only = fixture
        .habits
        .create_habit(
            "user-1",
            HabitCreateInput {
                name: "Deep work".into(),
                active_days: Some(vec![1, 2, 3, 4, 5]),
                target_per_day: Some(2),
                ..Default::default()
            },
        )
        .expect("create habit");

    // Sunday: only the daily habit is expected and done.
    record(&fixture, &every_day.id, "2025-08-24", 1);
    // Monday: both expected, both done (weekday habit needs 2).
    record(&fixture, &every_day.id, "2025-08-25", 1);
    record(&fixture, &weekdays_only.id, "2025-08-25", 2);
    // Tuesday: weekday habit stays under target.
    record(&fixture, &every_day.id, "2025-08-26", 1);
    record(&fixture, &weekdays_only.id, "2025-08-26", 1);
    // Wednesday: both done again.
    record(&fixture, &every_day.id, "2025-08-27", 1);
    record(&fixture, &weekdays_only.id, "2025-08-27", 2);
    // Thursday: both done.
    record(&fixture, &every_day.id, "2025-08-28", 1);
    record(&fixture, &weekdays_only.id, "2025-08-28", 2);

    let today = dates::parse_date("2025-08-28").expect("parse date");
    let overview = fixture
        .stats
        .compute_statistics_as_of("user-1", today)
        .expect("compute statistics");

    assert_eq!(overview.total_habits, 2);
    // Sunday, Monday, Wednesday, Thursday are perfect; Tuesday is not.
    assert_eq!(overview.perfect_days, 4);
    // Thursday (today) and Wednesday count, Tuesday stops the walk.
    assert_eq!(overview.current_streak, 2);

    let days: Vec<(&str, i64)> = overview
        .productivity_by_day
        .iter()
        .map(|entry| (entry.day.as_str(), entry.total_checkins))
        .collect();
    assert_eq!(
        days,
        vec![
            ("Sunday", 1),
            ("Monday", 2),
            ("Tuesday", 2),
            ("Wednesday", 2),
            ("Thursday", 2),
        ]
    );
}

#[test]
fn schedule_edits_reshape_history_judgements() {
    let fixture = setup();
    let habit = fixture
        .habits
        .create_habit(
            "user-1",
            HabitCreateInput {
                name: "Run".into(),
                active_days: Some(vec![1, 3, 5]),
                ..Default::default()
            },
        )
        .expect("create habit");

    // Monday done, Wednesday missed.
    record(&fixture, &habit.id, "2025-08-25", 1);

    let today = dates::parse_date("2025-08-29").expect("parse date");
    let before = fixture
        .stats
        .compute_statistics_as_of("user-1", today)
        .expect("compute statistics");
    assert_eq!(before.perfect_days, 1);

    // Narrowing the schedule to Fridays re-judges the past: Monday is no
    // longer an expected day, so the old check-in stops producing a perfect
    // day. Known approximation, current schedules apply to all history.
    fixture
        .habits
        .update_habit(
            "user-1",
            &habit.id,
            HabitUpdateInput {
                active_days: Some(vec![5]),
                ..Default::default()
            },
        )
        .expect("update habit");

    let after = fixture
        .stats
        .compute_statistics_as_of("user-1", today)
        .expect("compute statistics");
    assert_eq!(after.perfect_days, 0);
    // Raw records are unaffected by schedule edits.
    assert_eq!(after.productivity_by_day.len(), 1);
    assert_eq!(after.productivity_by_day[0].day, "Monday");
}

#[test]
fn archiving_the_last_habit_zeroes_the_overview() {
    let fixture = setup();
    let habit = fixture
        .habits
        .create_habit(
            "user-1",
            HabitCreateInput {
                name: "Read".into(),
                ..Default::default()
            },
        )
        .expect("create habit");
    record(&fixture, &habit.id, "2025-08-25", 1);

    fixture
        .habits
        .archive_habit("user-1", &habit.id)
        .expect("archive habit");

    let today = dates::parse_date("2025-08-29").expect("parse date");
    let overview = fixture
        .stats
        .compute_statistics_as_of("user-1", today)
        .expect("compute statistics");
    assert_eq!(overview.total_habits, 0);
    assert_eq!(overview.perfect_days, 0);
    assert_eq!(overview.current_streak, 0);
    assert!(overview.productivity_by_day.is_empty());
}

#[test]
fn statistics_are_owner_scoped() {
    let fixture = setup();
    let habit = fixture
        .habits
        .create_habit(
            "user-1",
            HabitCreateInput {
                name: "Read".into(),
                ..Default::default()
            },
        )
        .expect("create habit");
    record(&fixture, &habit.id, "2025-08-25", 1);

    let today = dates::parse_date("2025-08-29").expect("parse date");
    let other = fixture
        .stats
        .compute_statistics_as_of("user-2", today)
        .expect("compute statistics");
    assert_eq!(other.total_habits, 0);
    assert_eq!(other.perfect_days, 0);
    assert!(other.productivity_by_day.is_empty());
}
