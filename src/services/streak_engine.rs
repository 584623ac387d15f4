use chrono::NaiveDate;
use tracing::warn;

use crate::models::streak::StreakRecord;
use crate::utils::dates;

/// Applies one qualifying day to a habit's streak state.
///
/// Returns the streak record to persist, or `None` when the day was already
/// counted (a same-day repeat must not double-count, so stored state stays
/// untouched). The caller decides qualification; a non-qualifying check-in
/// never reaches this function.
pub fn apply_qualifying_day(
    existing: Option<&StreakRecord>,
    owner_id: &str,
    habit_id: &str,
    date: NaiveDate,
    now: &str,
) -> Option<StreakRecord> {
    let date_str = dates::format_date(date);

    let Some(streak) = existing else {
        return Some(StreakRecord {
            owner_id: owner_id.to_string(),
            habit_id: habit_id.to_string(),
            current_streak: 1,
            longest_streak: 1,
            last_checkin_date: Some(date_str),
            updated_at: now.to_string(),
        });
    };

    if streak.last_checkin_date.as_deref() == Some(date_str.as_str()) {
        return None;
    }

    let last_date = match streak.last_checkin_date.as_deref() {
        Some(raw) => match dates::parse_date(raw) {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                warn!(
                    target: "app::streak",
                    habit_id,
                    last_checkin_date = raw,
                    "stored streak date unparsable, restarting run"
                );
                None
            }
        },
        None => None,
    };

    let current = match last_date {
        // Exactly one calendar day after the last counted day extends the run.
        // Anything else, including dates in the past, starts a new run of 1.
        Some(last) if (date - last).num_days() == 1 => streak.current_streak + 1,
        _ => 1,
    };

    Some(StreakRecord {
        owner_id: streak.owner_id.clone(),
        habit_id: streak.habit_id.clone(),
        current_streak: current,
        longest_streak: streak.longest_streak.max(current),
        last_checkin_date: Some(date_str),
        updated_at: now.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: &str = "2025-08-25T10:00:00+00:00";

    fn date(value: &str) -> NaiveDate {
        dates::parse_date(value).expect("parse date")
    }

    fn streak(current: i64, longest: i64, last: &str) -> StreakRecord {
        StreakRecord {
            owner_id: "u1".into(),
            habit_id: "h1".into(),
            current_streak: current,
            longest_streak: longest,
            last_checkin_date: Some(last.into()),
            updated_at: NOW.into(),
        }
    }

    #[test]
    fn first_qualifying_day_creates_run_of_one() {
        let created = apply_qualifying_day(None, "u1", "h1", date("2025-08-25"), NOW)
            .expect("new streak record");
        assert_eq!(created.current_streak, 1);
        assert_eq!(created.longest_streak, 1);
        assert_eq!(created.last_checkin_date.as_deref(), Some("2025-08-25"));
    }

    #[test]
    fn consecutive_days_extend_current_and_longest() {
        let mut streak = apply_qualifying_day(None, "u1", "h1", date("2025-08-20"), NOW)
            .expect("new streak record");
        for day in &["2025-08-21", "2025-08-22", "2025-08-23"] {
            streak = apply_qualifying_day(Some(&streak), "u1", "h1", date(day), NOW)
                .expect("extended streak");
        }
        assert_eq!(streak.current_streak, 4);
        assert_eq!(streak.longest_streak, 4);
        assert_eq!(streak.last_checkin_date.as_deref(), Some("2025-08-23"));
    }

    #[test]
    fn same_day_repeat_is_a_no_op() {
        let existing = streak(3, 5, "2025-08-25");
        let result = apply_qualifying_day(Some(&existing), "u1", "h1", date("2025-08-25"), NOW);
        assert!(result.is_none());
    }

    #[test]
    fn gap_resets_current_but_keeps_longest() {
        let existing = streak(4, 4, "2025-08-20");
        let updated =
            apply_qualifying_day(Some(&existing), "u1", "h1", date("2025-08-22"), NOW)
                .expect("reset streak");
        assert_eq!(updated.current_streak, 1);
        assert_eq!(updated.longest_streak, 4);
        assert_eq!(updated.last_checkin_date.as_deref(), Some("2025-08-22"));
    }

    #[test]
    fn earlier_date_also_resets_current() {
        let existing = streak(2, 6, "2025-08-25");
        let updated =
            apply_qualifying_day(Some(&existing), "u1", "h1", date("2025-08-10"), NOW)
                .expect("reset streak");
        assert_eq!(updated.current_streak, 1);
        assert_eq!(updated.longest_streak, 6);
        assert_eq!(updated.last_checkin_date.as_deref(), Some("2025-08-10"));
    }

    #[test]
    fn longest_never_decreases_across_resets_and_extensions() {
        let mut streak = apply_qualifying_day(None, "u1", "h1", date("2025-08-01"), NOW)
            .expect("new streak record");
        let days = [
            "2025-08-02",
            "2025-08-03", // longest = 3
            "2025-08-10", // reset
            "2025-08-11",
        ];
        let mut longest_seen = streak.longest_streak;
        for day in &days {
            streak = apply_qualifying_day(Some(&streak), "u1", "h1", date(day), NOW)
                .expect("updated streak");
            assert!(streak.longest_streak >= longest_seen);
            longest_seen = streak.longest_streak;
        }
        assert_eq!(streak.current_streak, 2);
        assert_eq!(streak.longest_streak, 3);
    }
}
