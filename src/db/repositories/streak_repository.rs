use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::AppResult;
use crate::models::streak::StreakRecord;

const BASE_SELECT: &str = r#"
    SELECT
        habit_id,
        owner_id,
        current_streak,
        longest_streak,
        last_checkin_date,
        updated_at
    FROM streaks
"#;

#[derive(Debug, Clone)]
pub struct StreakRow {
    pub habit_id: String,
    pub owner_id: String,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub last_checkin_date: Option<String>,
    pub updated_at: String,
}

impl StreakRow {
    pub fn from_record(record: &StreakRecord) -> Self {
        Self {
            habit_id: record.habit_id.clone(),
            owner_id: record.owner_id.clone(),
            current_streak: record.current_streak,
            longest_streak: record.longest_streak,
            last_checkin_date: record.last_checkin_date.clone(),
            updated_at: record.updated_at.clone(),
        }
    }

    pub fn into_record(self) -> StreakRecord {
        StreakRecord {
            habit_id: self.habit_id,
            owner_id: self.owner_id,
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
            last_checkin_date: self.last_checkin_date,
            updated_at: self.updated_at,
        }
    }
}

impl TryFrom<&Row<'_>> for StreakRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            habit_id: row.get("habit_id")?,
            owner_id: row.get("owner_id")?,
            current_streak: row.get("current_streak")?,
            longest_streak: row.get("longest_streak")?,
            last_checkin_date: row.get("last_checkin_date")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub struct StreakRepository;

impl StreakRepository {
    pub fn find_by_habit(conn: &Connection, habit_id: &str) -> AppResult<Option<StreakRow>> {
        let sql = format!("{BASE_SELECT} WHERE habit_id = :habit_id");
        let row = conn
            .query_row(&sql, named_params! { ":habit_id": habit_id }, |row| {
                StreakRow::try_from(row)
            })
            .optional()?;
        Ok(row)
    }

    pub fn list_for_owner(conn: &Connection, owner_id: &str) -> AppResult<Vec<StreakRow>> {
        let sql = format!("{BASE_SELECT} WHERE owner_id = :owner_id");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(named_params! { ":owner_id": owner_id }, |row| {
            StreakRow::try_from(row)
        })?;

        let mut streaks = Vec::new();
        for row in rows {
            streaks.push(row?);
        }
        Ok(streaks)
    }

    pub fn upsert(conn: &Connection, row: &StreakRow) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO streaks (
                    habit_id,
                    owner_id,
                    current_streak,
                    longest_streak,
                    last_checkin_date,
                    updated_at
                ) VALUES (
                    :habit_id,
                    :owner_id,
                    :current_streak,
                    :longest_streak,
                    :last_checkin_date,
                    :updated_at
                )
                ON CONFLICT(habit_id) DO UPDATE SET
                    current_streak = excluded.current_streak,
                    longest_streak = excluded.longest_streak,
                    last_checkin_date = excluded.last_checkin_date,
                    updated_at = excluded.updated_at
            "#,
            named_params! {
                ":habit_id": row.habit_id,
                ":owner_id": row.owner_id,
                ":current_streak": row.current_streak,
                ":longest_streak": row.longest_streak,
                ":last_checkin_date": row.last_checkin_date,
                ":updated_at": row.updated_at,
            },
        )?;
        Ok(())
    }
}
