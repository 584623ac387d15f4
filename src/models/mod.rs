pub mod checkin;
pub mod habit;
pub mod stats;
pub mod streak;
