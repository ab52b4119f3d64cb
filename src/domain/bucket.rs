//! Time bucket keys
//!
//! Day, month and year keys derived from a single recording instant.

use chrono::{DateTime, Utc};

/// Bucket keys for one recording instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketKeys {
    /// `YYYY-MM-DD`
    pub day: String,
    /// `YYYY-MM`
    pub month: String,
    /// `YYYY`
    pub year: String,
}

impl BucketKeys {
    /// Derive all three keys from the same timestamp
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            day: instant.format("%Y-%m-%d").to_string(),
            month: instant.format("%Y-%m").to_string(),
            year: instant.format("%Y").to_string(),
        }
    }
}
