//! Reference catalog parser.
//!
//! The listing has one event per line with nine whitespace-separated fields:
//!
//! ```text
//! id  day  month  year  HH:MM  latitude  longitude  magnitude  depth
//! 1   9    Jan    2006  14:23  36.93     -121.66    4.05       7.2
//! ```
//!
//! Events are returned in listing order; nothing is sorted or filtered.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::{CatalogError, EventRecord, Result, XvalError};

/// Number of fields every catalog line must carry.
pub const CATALOG_FIELDS: usize = 9;

/// Format of the canonical origin-time string assembled from the listing.
pub const ORIGIN_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

const MONTHS: [(&str, u32); 12] = [
    ("Jan", 1),
    ("Feb", 2),
    ("Mar", 3),
    ("Apr", 4),
    ("May", 5),
    ("Jun", 6),
    ("Jul", 7),
    ("Aug", 8),
    ("Sep", 9),
    ("Oct", 10),
    ("Nov", 11),
    ("Dec", 12),
];

/// Map a three-letter month abbreviation to its 1-based number.
pub fn month_number(abbrev: &str) -> Option<u32> {
    MONTHS
        .iter()
        .find(|(name, _)| *name == abbrev)
        .map(|(_, num)| *num)
}

/// Parse a full catalog listing.
///
/// Blank lines are skipped. Line numbers in errors are 1-based.
pub fn parse_catalog(text: &str) -> std::result::Result<Vec<EventRecord>, CatalogError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| parse_line(idx + 1, line))
        .collect()
}

/// Read and parse a catalog file.
pub fn load_catalog(path: &Path) -> Result<Vec<EventRecord>> {
    let text = std::fs::read_to_string(path).map_err(|e| XvalError::io(path, e))?;
    let events = parse_catalog(&text)?;
    tracing::debug!(path = %path.display(), events = events.len(), "parsed catalog");
    Ok(events)
}

fn parse_line(line_no: usize, line: &str) -> std::result::Result<EventRecord, CatalogError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < CATALOG_FIELDS {
        return Err(CatalogError::TooFewFields {
            line_no,
            found: fields.len(),
            line: line.to_string(),
        });
    }

    let month = month_number(fields[2]).ok_or_else(|| CatalogError::UnknownMonth {
        line_no,
        month: fields[2].to_string(),
        line: line.to_string(),
    })?;

    let timestamp = format!("{}-{}-{} {}", fields[3], month, fields[1], fields[4]);
    let origin_time = NaiveDateTime::parse_from_str(&timestamp, ORIGIN_TIME_FORMAT)
        .map_err(|_| CatalogError::InvalidTimestamp {
            line_no,
            timestamp: timestamp.clone(),
            line: line.to_string(),
        })?
        .and_utc()
        .timestamp_millis();

    let number = |field: &'static str, value: &str| {
        value
            .parse::<f64>()
            .map_err(|_| CatalogError::InvalidNumber {
                line_no,
                field,
                value: value.to_string(),
                line: line.to_string(),
            })
    };

    Ok(EventRecord {
        id: fields[0].to_string(),
        origin_time,
        latitude: number("latitude", fields[5])?,
        longitude: number("longitude", fields[6])?,
        magnitude: number("magnitude", fields[7])?,
        depth: number("depth", fields[8])?,
    })
}

/// Number of events whose origin time falls outside `[start, end)`.
pub fn events_outside_window(
    events: &[EventRecord],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> usize {
    events
        .iter()
        .filter(|e| {
            e.origin_datetime()
                .map_or(true, |t| t < start || t >= end)
        })
        .count()
}

/// Aggregate view of a parsed catalog, used for run logs and reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogSummary {
    pub event_count: usize,
    pub first_origin_time: Option<i64>,
    pub last_origin_time: Option<i64>,
    pub min_magnitude: Option<f64>,
    pub max_magnitude: Option<f64>,
}

impl CatalogSummary {
    pub fn from_events(events: &[EventRecord]) -> Self {
        let times = events.iter().map(|e| e.origin_time);
        let mags = events.iter().map(|e| e.magnitude);
        Self {
            event_count: events.len(),
            first_origin_time: times.clone().min(),
            last_origin_time: times.max(),
            min_magnitude: mags.clone().reduce(f64::min),
            max_magnitude: mags.reduce(f64::max),
        }
    }
}
