use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::checkin::CheckinRecord;

const BASE_SELECT: &str = r#"
    SELECT
        id,
        owner_id,
        habit_id,
        date,
        value,
        note,
        created_at,
        updated_at
    FROM checkins
"#;

#[derive(Debug, Clone)]
pub struct CheckinRow {
    pub id: String,
    pub owner_id: String,
    pub habit_id: String,
    pub date: String,
    pub value: i64,
    pub note: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl CheckinRow {
    pub fn into_record(self) -> CheckinRecord {
        CheckinRecord {
            id: self.id,
            owner_id: self.owner_id,
            habit_id: self.habit_id,
            date: self.date,
            value: self.value,
            note: self.note,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl TryFrom<&Row<'_>> for CheckinRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            owner_id: row.get("owner_id")?,
            habit_id: row.get("habit_id")?,
            date: row.get("date")?,
            value: row.get("value")?,
            note: row.get("note")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Fields for a single check-in increment. `value` is the amount added to the
/// day's accumulated total, not the total itself.
#[derive(Debug, Clone)]
pub struct CheckinIncrement<'a> {
    pub id: &'a str,
    pub owner_id: &'a str,
    pub habit_id: &'a str,
    pub date: &'a str,
    pub value: i64,
    pub note: Option<&'a str>,
    pub now: &'a str,
}

pub struct CheckinRepository;

impl CheckinRepository {
    /// Atomically folds an increment into the (habit, date) row, inserting it
    /// on first check-in of the day. A provided note replaces the stored one;
    /// an absent note leaves it untouched. Returns the post-update row.
    pub fn upsert_increment(
        conn: &Connection,
        increment: &CheckinIncrement<'_>,
    ) -> AppResult<CheckinRow> {
        conn.execute(
            r#"
                INSERT INTO checkins (
                    id,
                    owner_id,
                    habit_id,
                    date,
                    value,
                    note,
                    created_at,
                    updated_at
                ) VALUES (
                    :id,
                    :owner_id,
                    :habit_id,
                    :date,
                    :value,
                    :note,
                    :now,
                    :now
                )
                ON CONFLICT(habit_id, date) DO UPDATE SET
                    value = checkins.value + excluded.value,
                    note = COALESCE(excluded.note, checkins.note),
                    updated_at = excluded.updated_at
            "#,
            named_params! {
                ":id": increment.id,
                ":owner_id": increment.owner_id,
                ":habit_id": increment.habit_id,
                ":date": increment.date,
                ":value": increment.value,
                ":note": increment.note,
                ":now": increment.now,
            },
        )?;

        Self::find_by_habit_date(conn, increment.habit_id, increment.date)?
            .ok_or_else(|| AppError::database("check-in row missing after upsert"))
    }

    pub fn find_by_habit_date(
        conn: &Connection,
        habit_id: &str,
        date: &str,
    ) -> AppResult<Option<CheckinRow>> {
        let sql = format!("{BASE_SELECT} WHERE habit_id = :habit_id AND date = :date");
        let row = conn
            .query_row(
                &sql,
                named_params! { ":habit_id": habit_id, ":date": date },
                |row| CheckinRow::try_from(row),
            )
            .optional()?;
        Ok(row)
    }

    /// Full check-in history for an owner, oldest first. `since` narrows to
    /// dates at or after the given `YYYY-MM-DD` bound.
    pub fn list_for_owner(
        conn: &Connection,
        owner_id: &str,
        since: Option<&str>,
    ) -> AppResult<Vec<CheckinRow>> {
        let sql = match since {
            Some(_) => {
                format!("{BASE_SELECT} WHERE owner_id = :owner_id AND date >= :since ORDER BY date")
            }
            None => format!("{BASE_SELECT} WHERE owner_id = :owner_id ORDER BY date"),
        };
        let mut stmt = conn.prepare(&sql)?;

        let mut checkins = Vec::new();
        match since {
            Some(since) => {
                let rows = stmt.query_map(
                    named_params! { ":owner_id": owner_id, ":since": since },
                    |row| CheckinRow::try_from(row),
                )?;
                for row in rows {
                    checkins.push(row?);
                }
            }
            None => {
                let rows = stmt.query_map(named_params! { ":owner_id": owner_id }, |row| {
                    CheckinRow::try_from(row)
                })?;
                for row in rows {
                    checkins.push(row?);
                }
            }
        }
        Ok(checkins)
    }
}
