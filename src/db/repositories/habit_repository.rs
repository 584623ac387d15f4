use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::AppResult;
use crate::models::habit::HabitRecord;

const BASE_SELECT: &str = r#"
    SELECT
        id,
        owner_id,
        name,
        description,
        active_days,
        target_per_day,
        tags,
        archived,
        created_at,
        updated_at
    FROM habits
"#;

#[derive(Debug, Clone)]
pub struct HabitRow {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub active_days: String,
    pub target_per_day: i64,
    pub tags: Option<String>,
    pub archived: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl HabitRow {
    pub fn from_record(record: &HabitRecord) -> AppResult<Self> {
        Ok(Self {
            id: record.id.clone(),
            owner_id: record.owner_id.clone(),
            name: record.name.clone(),
            description: record.description.clone(),
            active_days: serde_json::to_string(&record.active_days)?,
            target_per_day: record.target_per_day,
            tags: serialize_vec(&record.tags)?,
            archived: record.archived,
            created_at: record.created_at.clone(),
            updated_at: record.updated_at.clone(),
        })
    }

    pub fn into_record(self) -> AppResult<HabitRecord> {
        Ok(HabitRecord {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name,
            description: self.description,
            active_days: serde_json::from_str(&self.active_days)?,
            target_per_day: self.target_per_day,
            tags: deserialize_vec(self.tags)?,
            archived: self.archived,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TryFrom<&Row<'_>> for HabitRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            owner_id: row.get("owner_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            active_days: row.get("active_days")?,
            target_per_day: row.get("target_per_day")?,
            tags: row.get("tags")?,
            archived: row.get("archived")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub struct HabitRepository;

impl HabitRepository {
    pub fn insert(conn: &Connection, row: &HabitRow) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO habits (
                    id,
                    owner_id,
                    name,
                    description,
                    active_days,
                    target_per_day,
                    tags,
                    archived,
                    created_at,
                    updated_at
                ) VALUES (
                    :id,
                    :owner_id,
                    :name,
                    :description,
                    :active_days,
                    :target_per_day,
                    :tags,
                    :archived,
                    :created_at,
                    :updated_at
                )
            "#,
            named_params! {
                ":id": row.id,
                ":owner_id": row.owner_id,
                ":name": row.name,
                ":description": row.description,
                ":active_days": row.active_days,
                ":target_per_day": row.target_per_day,
                ":tags": row.tags,
                ":archived": row.archived,
                ":created_at": row.created_at,
                ":updated_at": row.updated_at,
            },
        )?;
        Ok(())
    }

    pub fn update(conn: &Connection, row: &HabitRow) -> AppResult<()> {
        conn.execute(
            r#"
                UPDATE habits SET
                    name = :name,
                    description = :description,
                    active_days = :active_days,
                    target_per_day = :target_per_day,
                    tags = :tags,
                    archived = :archived,
                    updated_at = :updated_at
                WHERE id = :id AND owner_id = :owner_id
            "#,
            named_params! {
                ":id": row.id,
                ":owner_id": row.owner_id,
                ":name": row.name,
                ":description": row.description,
                ":active_days": row.active_days,
                ":target_per_day": row.target_per_day,
                ":tags": row.tags,
                ":archived": row.archived,
                ":updated_at": row.updated_at,
            },
        )?;
        Ok(())
    }

    pub fn find_for_owner(
        conn: &Connection,
        owner_id: &str,
        habit_id: &str,
    ) -> AppResult<Option<HabitRow>> {
        let sql = format!("{BASE_SELECT} WHERE id = :id AND owner_id = :owner_id");
        let row = conn
            .query_row(
                &sql,
                named_params! { ":id": habit_id, ":owner_id": owner_id },
                |row| HabitRow::try_from(row),
            )
            .optional()?;
        Ok(row)
    }

    pub fn list_active_for_owner(conn: &Connection, owner_id: &str) -> AppResult<Vec<HabitRow>> {
        let sql =
            format!("{BASE_SELECT} WHERE owner_id = :owner_id AND archived = 0 ORDER BY created_at");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(named_params! { ":owner_id": owner_id }, |row| {
            HabitRow::try_from(row)
        })?;

        let mut habits = Vec::new();
        for row in rows {
            habits.push(row?);
        }
        Ok(habits)
    }
}

fn serialize_vec(values: &[String]) -> AppResult<Option<String>> {
    if values.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::to_string(values)?))
    }
}

fn deserialize_vec(value: Option<String>) -> AppResult<Vec<String>> {
    match value {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(Vec::new()),
    }
}
