use std::collections::HashMap;

use chrono::{Duration, Utc};
use tracing::{debug, info};

use crate::db::repositories::checkin_repository::CheckinRepository;
use crate::db::repositories::habit_repository::{HabitRepository, HabitRow};
use crate::db::repositories::streak_repository::StreakRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::checkin::CheckinSummary;
use crate::models::habit::{HabitCreateInput, HabitRecord, HabitUpdateInput};
use crate::models::stats::HabitWithStreak;
use crate::utils::dates;

const MAX_NAME_LENGTH: usize = 200;
const MAX_DESCRIPTION_LENGTH: usize = 1000;
const ALL_WEEKDAYS: [u8; 7] = [0, 1, 2, 3, 4, 5, 6];
const RECENT_CHECKIN_DAYS: i64 = 7;

#[derive(Clone)]
pub struct HabitService {
    db: DbPool,
}

impl HabitService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn create_habit(&self, owner_id: &str, input: HabitCreateInput) -> AppResult<HabitRecord> {
        let now = Utc::now().to_rfc3339();
        let record = HabitRecord {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            name: normalize_name(&input.name)?,
            description: normalize_description(input.description)?,
            active_days: normalize_active_days(input.active_days.unwrap_or_else(|| ALL_WEEKDAYS.to_vec()))?,
            target_per_day: normalize_target(input.target_per_day)?,
            tags: normalize_tags(input.tags.unwrap_or_default()),
            archived: false,
            created_at: now.clone(),
            updated_at: now,
        };

        let row = HabitRow::from_record(&record)?;
        self.db.with_connection(|conn| HabitRepository::insert(conn, &row))?;
        info!(habit_id = %record.id, "habit created");
        Ok(record)
    }

    pub fn update_habit(
        &self,
        owner_id: &str,
        habit_id: &str,
        update: HabitUpdateInput,
    ) -> AppResult<HabitRecord> {
        let mut existing = self.get_habit(owner_id, habit_id)?;

        if let Some(name) = update.name {
            existing.name = normalize_name(&name)?;
        }
        if let Some(description) = update.description {
            existing.description = normalize_description(description)?;
        }
        if let Some(active_days) = update.active_days {
            existing.active_days = normalize_active_days(active_days)?;
        }
        if let Some(target) = update.target_per_day {
            existing.target_per_day = normalize_target(Some(target))?;
        }
        if let Some(tags) = update.tags {
            existing.tags = normalize_tags(tags.unwrap_or_default());
        }
        if let Some(archived) = update.archived {
            existing.archived = archived;
        }
        existing.updated_at = Utc::now().to_rfc3339();

        let row = HabitRow::from_record(&existing)?;
        self.db.with_connection(|conn| HabitRepository::update(conn, &row))?;
        info!(habit_id = %existing.id, "habit updated");
        Ok(existing)
    }

    /// Soft delete: the habit drops out of the active schedule and statistics
    /// but its check-in history stays.
    pub fn archive_habit(&self, owner_id: &str, habit_id: &str) -> AppResult<HabitRecord> {
        let mut existing = self.get_habit(owner_id, habit_id)?;
        existing.archived = true;
        existing.updated_at = Utc::now().to_rfc3339();

        let row = HabitRow::from_record(&existing)?;
        self.db.with_connection(|conn| HabitRepository::update(conn, &row))?;
        info!(habit_id = %existing.id, "habit archived");
        Ok(existing)
    }

    pub fn get_habit(&self, owner_id: &str, habit_id: &str) -> AppResult<HabitRecord> {
        let row = self
            .db
            .with_connection(|conn| HabitRepository::find_for_owner(conn, owner_id, habit_id))?
            .ok_or_else(AppError::not_found)?;
        row.into_record()
    }

    /// Active habits for the owner, each overlaid with its streak state and
    /// the last week of check-ins.
    pub fn list_habits(&self, owner_id: &str) -> AppResult<Vec<HabitWithStreak>> {
        let since = dates::format_date(Utc::now().date_naive() - Duration::days(RECENT_CHECKIN_DAYS));

        let (habit_rows, streak_rows, checkin_rows) = self.db.with_connection(|conn| {
            let habits = HabitRepository::list_active_for_owner(conn, owner_id)?;
            let streaks = StreakRepository::list_for_owner(conn, owner_id)?;
            let checkins = CheckinRepository::list_for_owner(conn, owner_id, Some(&since))?;
            Ok((habits, streaks, checkins))
        })?;

        let streaks: HashMap<String, _> = streak_rows
            .into_iter()
            .map(|row| (row.habit_id.clone(), row.into_record()))
            .collect();

        let mut recent: HashMap<String, Vec<CheckinSummary>> = HashMap::new();
        for row in checkin_rows {
            recent.entry(row.habit_id.clone()).or_default().push(CheckinSummary {
                date: row.date,
                value: row.value,
            });
        }

        let mut habits = Vec::with_capacity(habit_rows.len());
        for row in habit_rows {
            let habit = row.into_record()?;
            let streak = streaks.get(&habit.id);
            habits.push(HabitWithStreak {
                streak: streak.map_or(0, |s| s.current_streak),
                longest_streak: streak.map_or(0, |s| s.longest_streak),
                last_checkin_date: streak.and_then(|s| s.last_checkin_date.clone()),
                recent_checkins: recent.remove(&habit.id).unwrap_or_default(),
                habit,
            });
        }
        debug!(count = habits.len(), "habits listed");
        Ok(habits)
    }
}

fn normalize_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("habit name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "habit name cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_string())
}

fn normalize_description(description: Option<String>) -> AppResult<Option<String>> {
    let description = description
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());
    if let Some(ref value) = description {
        if value.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(AppError::validation(format!(
                "habit description cannot exceed {MAX_DESCRIPTION_LENGTH} characters"
            )));
        }
    }
    Ok(description)
}

fn normalize_active_days(mut days: Vec<u8>) -> AppResult<Vec<u8>> {
    if days.is_empty() {
        return Err(AppError::validation("habit needs at least one active day"));
    }
    if let Some(bad) = days.iter().find(|day| **day > 6) {
        return Err(AppError::validation(format!(
            "invalid weekday {bad}, expected 0 (Sunday) through 6 (Saturday)"
        )));
    }
    days.sort_unstable();
    days.dedup();
    Ok(days)
}

fn normalize_target(target: Option<i64>) -> AppResult<i64> {
    match target {
        None => Ok(1),
        Some(value) if value >= 1 => Ok(value),
        Some(value) => Err(AppError::validation(format!(
            "daily target must be positive, got {value}"
        ))),
    }
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = Vec::new();
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}
