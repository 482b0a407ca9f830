//! Utility functions for the pairing scheduler

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use uuid::{Builder, Uuid};

/// Generate a new random (v4) match ID from the given source
///
/// Drawing ids from the scheduler's generator keeps seeded runs fully
/// reproducible.
pub fn generate_match_id<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    let bytes: [u8; 16] = rng.gen();
    Builder::from_random_bytes(bytes).into_uuid()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Suggested download name for an exported fixtures table
pub fn fixtures_filename(date: NaiveDate) -> String {
    format!("match-fixtures-{}.csv", date.format("%Y-%m-%d"))
}
