pub mod checkin_service;
pub mod habit_service;
pub mod stats_service;
pub mod streak_engine;
