pub mod dates;
pub mod logger;
