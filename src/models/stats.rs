use serde::{Deserialize, Serialize};

use crate::models::checkin::CheckinSummary;
use crate::models::habit::HabitRecord;

/// Point-in-time productivity statistics for one owner, recomputed fresh on
/// every request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatsOverview {
    pub total_habits: i64,
    pub perfect_days: i64,
    pub current_streak: i64,
    pub productivity_by_day: Vec<WeekdayProductivity>,
}

/// Raw check-in record count for one weekday. The histogram is sparse:
/// weekdays without records are omitted, remaining entries stay in
/// Sunday..Saturday order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayProductivity {
    pub day: String,
    pub total_checkins: i64,
}

/// Habit as returned by the list endpoint: the record plus its streak overlay
/// and the last week of check-ins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HabitWithStreak {
    #[serde(flatten)]
    pub habit: HabitRecord,
    pub streak: i64,
    pub longest_streak: i64,
    pub last_checkin_date: Option<String>,
    pub recent_checkins: Vec<CheckinSummary>,
}
