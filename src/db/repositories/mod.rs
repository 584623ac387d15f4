pub mod checkin_repository;
pub mod habit_repository;
pub mod streak_repository;
