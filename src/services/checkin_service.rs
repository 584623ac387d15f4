use chrono::Utc;
use tracing::{debug, info};

use crate::db::repositories::checkin_repository::{CheckinIncrement, CheckinRepository};
use crate::db::repositories::habit_repository::HabitRepository;
use crate::db::repositories::streak_repository::{StreakRepository, StreakRow};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::checkin::{CheckinInput, CheckinOutcome};
use crate::services::streak_engine;
use crate::utils::dates;

#[derive(Clone)]
pub struct CheckinService {
    db: DbPool,
}

impl CheckinService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Records a check-in for `owner_id` on the habit and date in `input`,
    /// folding the increment into the day's accumulated value and advancing
    /// the habit's streak when the day qualifies.
    ///
    /// The upsert and the streak read-modify-write run in one immediate
    /// transaction, so concurrent same-day increments serialize: no lost
    /// accumulation, no double-counted streak day.
    pub fn record_checkin(&self, owner_id: &str, input: CheckinInput) -> AppResult<CheckinOutcome> {
        let date = dates::parse_date(&input.date)?;
        // Ledger rows key on the date string, so always write the canonical
        // zero-padded form; chrono parses "2025-8-25" and "2025-08-25" alike.
        let date_str = dates::format_date(date);
        let increment = input.value.unwrap_or(1);
        if increment < 1 {
            return Err(AppError::validation("check-in value must be at least 1"));
        }
        let note = input
            .note
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());

        let checkin_id = uuid::Uuid::new_v4().to_string();
        let outcome = self.db.with_transaction(|tx| {
            let habit = HabitRepository::find_for_owner(tx, owner_id, &input.habit_id)?
                .ok_or_else(AppError::not_found)?
                .into_record()?;

            let now = Utc::now().to_rfc3339();
            let checkin = CheckinRepository::upsert_increment(
                tx,
                &CheckinIncrement {
                    id: &checkin_id,
                    owner_id,
                    habit_id: &habit.id,
                    date: &date_str,
                    value: increment,
                    note,
                    now: &now,
                },
            )?
            .into_record();

            let existing = StreakRepository::find_by_habit(tx, &habit.id)?.map(StreakRow::into_record);

            // An under-target day, or a habit with no scheduled days, leaves
            // the streak record exactly as it was.
            let streak = if habit.has_empty_schedule() || !habit.qualifies(checkin.value) {
                debug!(
                    target: "app::streak",
                    habit_id = %habit.id,
                    value = checkin.value,
                    target = habit.effective_target(),
                    "check-in below target, streak untouched"
                );
                existing
            } else {
                match streak_engine::apply_qualifying_day(
                    existing.as_ref(),
                    owner_id,
                    &habit.id,
                    date,
                    &now,
                ) {
                    Some(updated) => {
                        StreakRepository::upsert(tx, &StreakRow::from_record(&updated))?;
                        Some(updated)
                    }
                    None => existing,
                }
            };

            Ok(CheckinOutcome { checkin, streak })
        })?;

        info!(
            target: "app::streak",
            habit_id = %input.habit_id,
            date = %date_str,
            value = outcome.checkin.value,
            "check-in recorded"
        );
        Ok(outcome)
    }
}
