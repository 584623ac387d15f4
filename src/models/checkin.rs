use serde::{Deserialize, Serialize};

use crate::models::streak::StreakRecord;

/// One accumulated check-in per (habit, date). Repeated check-ins for the same
/// day fold into `value` instead of creating new records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckinRecord {
    pub id: String,
    pub owner_id: String,
    pub habit_id: String,
    pub date: String,
    pub value: i64,
    pub note: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckinInput {
    pub habit_id: String,
    /// Calendar date in `YYYY-MM-DD` form.
    pub date: String,
    /// Amount added to the day's accumulated value; defaults to 1.
    #[serde(default)]
    pub value: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Result of recording a check-in: the post-update ledger row plus the streak
/// record, if one exists for the habit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckinOutcome {
    pub checkin: CheckinRecord,
    pub streak: Option<StreakRecord>,
}

/// Compact check-in view used by the habit list overlay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckinSummary {
    pub date: String,
    pub value: i64,
}
