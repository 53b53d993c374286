//! Reference catalog event records.

use serde::{Deserialize, Serialize};

/// A single earthquake from the reference catalog listing.
///
/// Records are produced once by the catalog parser and kept in listing order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventRecord {
    /// Event identifier as written in the listing.
    pub id: String,

    /// Origin time as milliseconds since the Unix epoch (UTC).
    pub origin_time: i64,

    pub latitude: f64,
    pub longitude: f64,

    /// Depth in kilometres.
    pub depth: f64,

    pub magnitude: f64,
}

impl EventRecord {
    /// Origin time as a UTC timestamp, if it is representable.
    pub fn origin_datetime(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.origin_time)
    }
}
