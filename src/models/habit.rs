use serde::{Deserialize, Serialize};

/// A recurring habit with a weekday schedule and a daily repetition target.
///
/// `active_days` holds weekday indexes (0=Sunday..6=Saturday, sorted,
/// deduplicated). Archived habits keep their check-in history but are excluded
/// from the active schedule and from statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HabitRecord {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub active_days: Vec<u8>,
    pub target_per_day: i64,
    pub tags: Vec<String>,
    pub archived: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl HabitRecord {
    /// Whether this habit is expected on the given weekday (0=Sunday..6=Saturday).
    pub fn is_expected_on(&self, weekday: u8) -> bool {
        self.active_days.contains(&weekday)
    }

    /// Whether an accumulated check-in value meets the daily target. A target
    /// that is unset or non-positive counts as 1.
    pub fn qualifies(&self, value: i64) -> bool {
        value >= self.effective_target()
    }

    pub fn effective_target(&self) -> i64 {
        if self.target_per_day > 0 {
            self.target_per_day
        } else {
            1
        }
    }

    /// A habit with no active days is never expected and never streaks.
    pub fn has_empty_schedule(&self) -> bool {
        self.active_days.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HabitCreateInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub active_days: Option<Vec<u8>>,
    #[serde(default)]
    pub target_per_day: Option<i64>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HabitUpdateInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub active_days: Option<Vec<u8>>,
    #[serde(default)]
    pub target_per_day: Option<i64>,
    #[serde(default)]
    pub tags: Option<Option<Vec<String>>>,
    /// Setting `false` restores an archived habit.
    #[serde(default)]
    pub archived: Option<bool>,
}
