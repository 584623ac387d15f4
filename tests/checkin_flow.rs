use habitloop::db::{migrations, DbPool};
use habitloop::models::checkin::CheckinInput;
use habitloop::models::habit::HabitCreateInput;
use habitloop::services::checkin_service::CheckinService;
use habitloop::services::habit_service::HabitService;
use tempfile::tempdir;

fn setup() -> (HabitService, CheckinService, DbPool, tempfile::TempDir) {
    let dir = tempdir().expect("temp dir");
    let db_path = dir.path().join("flow.sqlite");
    let pool = DbPool::new(&db_path).expect("db pool");
    (
        HabitService::new(pool.clone()),
        CheckinService::new(pool.clone()),
        pool,
        dir,
    )
}

fn checkin(habit_id: &str, date: &str) -> CheckinInput {
    CheckinInput {
        habit_id: habit_id.into(),
        date: date.into(),
        value: Some(1),
        note: None,
    }
}

#[test]
fn streak_builds_across_consecutive_days_and_survives_repeats() {
    let (habits, checkins, _pool, _dir) = setup();
    let habit = habits
        .create_habit(
            "user-1",
            HabitCreateInput {
                name: "Daily reading".into(),
                ..Default::default()
            },
        )
        .expect("create habit");

    let days = ["2025-08-20", "2025-08-21", "2025-08-22", "2025-08-23"];
    let mut last = None;
    for day in &days {
        last = Some(
            checkins
                .record_checkin("user-1", checkin(&habit.id, day))
                .expect("record check-in"),
        );
    }
    let streak = last.expect("outcome").streak.expect("streak");
    assert_eq!(streak.current_streak, days.len() as i64);
    assert_eq!(streak.longest_streak, days.len() as i64);

    // A second check-in for an already-counted day changes nothing.
    let repeat = checkins
        .record_checkin("user-1", checkin(&habit.id, "2025-08-23"))
        .expect("record check-in");
    let repeated = repeat.streak.expect("streak");
    assert_eq!(repeated.current_streak, streak.current_streak);
    assert_eq!(repeated.longest_streak, streak.longest_streak);
    assert_eq!(repeated.last_checkin_date, streak.last_checkin_date);
    assert_eq!(repeat.checkin.value, 2);
}

#[test]
fn gap_starts_a_new_run_without_losing_the_longest() {
    let (habits, checkins, _pool, _dir) = setup();
    let habit = habits
        .create_habit(
            "user-1",
            HabitCreateInput {
                name: "Stretch".into(),
                ..Default::default()
            },
        )
        .expect("create habit");

    for day in &["2025-08-18", "2025-08-19", "2025-08-20"] {
        checkins
            .record_checkin("user-1", checkin(&habit.id, day))
            .expect("record check-in");
    }
    // Skip the 21st entirely.
    let outcome = checkins
        .record_checkin("user-1", checkin(&habit.id, "2025-08-22"))
        .expect("record check-in");

    let streak = outcome.streak.expect("streak");
    assert_eq!(streak.current_streak, 1);
    assert_eq!(streak.longest_streak, 3);
    assert_eq!(streak.last_checkin_date.as_deref(), Some("2025-08-22"));
}

#[test]
fn listing_reflects_streak_state_after_checkins() {
    let (habits, checkins, _pool, _dir) = setup();
    let habit = habits
        .create_habit(
            "user-1",
            HabitCreateInput {
                name: "Hydrate".into(),
                target_per_day: Some(2),
                ..Default::default()
            },
        )
        .expect("create habit");

    // Below target: accumulates but no streak yet.
    checkins
        .record_checkin("user-1", checkin(&habit.id, "2025-08-25"))
        .expect("record check-in");
    let listed = habits.list_habits("user-1").expect("list habits");
    assert_eq!(listed[0].streak, 0);

    // Second increment reaches the target.
    checkins
        .record_checkin("user-1", checkin(&habit.id, "2025-08-25"))
        .expect("record check-in");
    let listed = habits.list_habits("user-1").expect("list habits");
    assert_eq!(listed[0].streak, 1);
    assert_eq!(listed[0].longest_streak, 1);
    assert_eq!(listed[0].last_checkin_date.as_deref(), Some("2025-08-25"));
}

#[test]
fn migration_history_is_recorded() {
    let (_habits, _checkins, pool, _dir) = setup();
    let history = pool
        .with_connection(|conn| migrations::get_migration_history(conn))
        .expect("migration history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].version, 1);
    assert_eq!(history[1].version, 2);
}
