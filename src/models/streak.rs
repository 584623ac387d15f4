use serde::{Deserialize, Serialize};

/// Incrementally maintained streak state for one habit. Fully reconstructible
/// from the check-in ledger; persisted so a check-in updates in O(1) instead
/// of replaying history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StreakRecord {
    pub owner_id: String,
    pub habit_id: String,
    pub current_streak: i64,
    pub longest_streak: i64,
    /// `YYYY-MM-DD` date of the last day that counted toward the streak.
    pub last_checkin_date: Option<String>,
    pub updated_at: String,
}
