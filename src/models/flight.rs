//! Historical flight records and timestamp helpers

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AdsbError;

const UTC_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One flight as estimated by the provider from ADS-B coverage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub icao24: String,
    pub callsign: Option<String>,
    pub departure_airport: Option<String>,
    pub arrival_airport: Option<String>,
    /// Unix seconds
    pub first_seen: i64,
    /// Unix seconds
    pub last_seen: i64,
    pub departure_time_utc: Option<String>,
    pub arrival_time_utc: Option<String>,
}

impl FlightRecord {
    #[must_use]
    pub fn new(
        icao24: String,
        callsign: Option<String>,
        departure_airport: Option<String>,
        arrival_airport: Option<String>,
        first_seen: i64,
        last_seen: i64,
    ) -> Self {
        Self {
            icao24,
            callsign: callsign.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
            departure_airport,
            arrival_airport,
            first_seen,
            last_seen,
            departure_time_utc: format_unix_utc(first_seen),
            arrival_time_utc: format_unix_utc(last_seen),
        }
    }
}

/// `YYYY-MM-DD HH:MM:SS` in UTC; `None` for zero or out-of-range timestamps
#[must_use]
pub fn format_unix_utc(timestamp: i64) -> Option<String> {
    if timestamp == 0 {
        return None;
    }
    DateTime::<Utc>::from_timestamp(timestamp, 0).map(|dt| dt.format(UTC_DISPLAY_FORMAT).to_string())
}

/// Parse an ISO 8601 timestamp into unix seconds.
///
/// Accepts RFC 3339 (`2025-11-10T12:00:00Z`, offsets) and offset-less
/// date-times, which are read as UTC.
pub fn parse_iso8601(value: &str) -> Result<i64, AdsbError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc().timestamp());
        }
    }
    Err(AdsbError::invalid_argument(format!(
        "Invalid time format '{value}'. Use ISO 8601 (YYYY-MM-DDTHH:MM:SSZ)"
    )))
}
