use crate::Database;

const COUNTER: &str = "days_without_downtime";

fn test_db() -> Database {
    Database::open_in_memory().expect("Failed to create test DB")
}

mod streak;
