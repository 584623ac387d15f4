use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::{NaiveDate, Utc};
use tracing::{debug, warn};

use crate::db::repositories::checkin_repository::CheckinRepository;
use crate::db::repositories::habit_repository::HabitRepository;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::habit::HabitRecord;
use crate::models::stats::{StatsOverview, WeekdayProductivity};
use crate::utils::dates;

#[derive(Clone)]
pub struct StatsService {
    db: DbPool,
}

impl StatsService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Recomputes the owner's statistics from the full check-in history and
    /// the current habit schedules. Pure read; nothing is cached or persisted.
    pub fn compute_statistics(&self, owner_id: &str) -> AppResult<StatsOverview> {
        self.compute_statistics_as_of(owner_id, Utc::now().date_naive())
    }

    pub fn compute_statistics_as_of(
        &self,
        owner_id: &str,
        today: NaiveDate,
    ) -> AppResult<StatsOverview> {
        let (habit_rows, checkin_rows) = self.db.with_connection(|conn| {
            let habits = HabitRepository::list_active_for_owner(conn, owner_id)?;
            let checkins = CheckinRepository::list_for_owner(conn, owner_id, None)?;
            Ok((habits, checkins))
        })?;

        if habit_rows.is_empty() {
            debug!(target: "app::stats", owner_id, "no active habits, zero statistics");
            return Ok(StatsOverview {
                total_habits: 0,
                perfect_days: 0,
                current_streak: 0,
                productivity_by_day: Vec::new(),
            });
        }

        let habits = habit_rows
            .into_iter()
            .map(|row| row.into_record())
            .collect::<AppResult<Vec<_>>>()?;

        // Expectation for past dates uses the habits' present schedules; the
        // schedule as it existed back then is not modeled.
        let targets: HashMap<&str, i64> = habits
            .iter()
            .map(|habit| (habit.id.as_str(), habit.effective_target()))
            .collect();

        let mut qualifying: BTreeMap<NaiveDate, HashSet<&str>> = BTreeMap::new();
        let mut weekday_counts = [0i64; 7];
        for checkin in &checkin_rows {
            let date = match dates::parse_date(&checkin.date) {
                Ok(date) => date,
                Err(_) => {
                    warn!(
                        target: "app::stats",
                        checkin_id = %checkin.id,
                        date = %checkin.date,
                        "skipping check-in with unparsable date"
                    );
                    continue;
                }
            };

            // The histogram counts raw records, qualifying or not, including
            // records of habits that have since been archived.
            weekday_counts[dates::weekday_index(date) as usize] += 1;

            if let Some(&target) = targets.get(checkin.habit_id.as_str()) {
                if checkin.value >= target {
                    qualifying
                        .entry(date)
                        .or_default()
                        .insert(checkin.habit_id.as_str());
                }
            }
        }

        let mut perfect_dates: BTreeSet<NaiveDate> = BTreeSet::new();
        for (date, qualified) in &qualifying {
            if is_perfect(&habits, *date, qualified) {
                perfect_dates.insert(*date);
            }
        }

        // Walk backward from today. An incomplete today never breaks an
        // otherwise intact run, it just doesn't count.
        let mut current_streak = 0;
        if perfect_dates.contains(&today) {
            current_streak += 1;
        }
        let mut cursor = today.pred_opt();
        while let Some(day) = cursor {
            if perfect_dates.contains(&day) {
                current_streak += 1;
                cursor = day.pred_opt();
            } else {
                break;
            }
        }

        let productivity_by_day = weekday_counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(weekday, count)| WeekdayProductivity {
                day: dates::weekday_label(weekday as u8).to_string(),
                total_checkins: *count,
            })
            .collect();

        let overview = StatsOverview {
            total_habits: habits.len() as i64,
            perfect_days: perfect_dates.len() as i64,
            current_streak,
            productivity_by_day,
        };
        debug!(
            target: "app::stats",
            owner_id,
            total_habits = overview.total_habits,
            perfect_days = overview.perfect_days,
            current_streak = overview.current_streak,
            "statistics computed"
        );
        Ok(overview)
    }
}

/// A date is perfect when every habit expected on its weekday has a qualifying
/// check-in. A day with no expected habits is never perfect.
fn is_perfect(habits: &[HabitRecord], date: NaiveDate, qualified: &HashSet<&str>) -> bool {
    let weekday = dates::weekday_index(date);
    let mut expected_any = false;
    for habit in habits {
        if habit.is_expected_on(weekday) {
            expected_any = true;
            if !qualified.contains(habit.id.as_str()) {
                return false;
            }
        }
    }
    expected_any
}
