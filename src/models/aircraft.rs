//! Aircraft state vectors as returned to API clients

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::AdsbError;
use crate::geo::GeoPoint;

/// 1 foot in meters
pub const FEET_TO_METERS: f64 = 0.3048;
/// 1 knot in meters per second
pub const KNOTS_TO_MS: f64 = 0.514444;

/// Snapshot of one aircraft, provider units plus derived aviation units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftState {
    pub icao24: String,
    pub callsign: Option<String>,
    pub origin_country: String,
    pub time_position: Option<i64>,
    pub last_contact: i64,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    /// Barometric altitude in meters
    pub baro_altitude: Option<f64>,
    pub on_ground: bool,
    /// Ground speed in m/s
    pub velocity: Option<f64>,
    /// Track in degrees clockwise from north
    pub true_track: Option<f64>,
    /// Vertical rate in m/s
    pub vertical_rate: Option<f64>,
    pub squawk: Option<String>,
    pub altitude_feet: Option<i64>,
    pub velocity_knots: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub distance_from_center_nm: Option<f64>,
}

impl AircraftState {
    /// Fill the derived unit fields from the provider values
    #[must_use]
    pub fn with_derived_units(mut self) -> Self {
        self.callsign = self
            .callsign
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        self.altitude_feet = self.baro_altitude.map(meters_to_feet);
        self.velocity_knots = self.velocity.map(ms_to_knots);
        self
    }

    /// Reported position, if the aircraft has one
    #[must_use]
    pub fn position(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => GeoPoint::new(lat, lon).ok(),
            _ => None,
        }
    }

    /// Altitude bounds in feet; aircraft without an altitude always pass
    #[must_use]
    pub fn within_altitude(&self, min_feet: Option<f64>, max_feet: Option<f64>) -> bool {
        let Some(altitude) = self.altitude_feet else {
            return true;
        };
        let altitude = altitude as f64;
        min_feet.is_none_or(|min| altitude >= min) && max_feet.is_none_or(|max| altitude <= max)
    }

    /// Loose match against the ICAO24 address or the callsign
    #[must_use]
    pub fn matches_filter(&self, filter: &str) -> bool {
        let filter = filter.trim();
        if filter.is_empty() {
            return true;
        }
        self.icao24.to_lowercase().contains(&filter.to_lowercase())
            || self
                .callsign
                .as_deref()
                .is_some_and(|c| c.to_uppercase().contains(&filter.to_uppercase()))
    }

    /// Exact callsign match, ignoring case and padding
    #[must_use]
    pub fn has_callsign(&self, callsign: &str) -> bool {
        self.callsign
            .as_deref()
            .is_some_and(|c| c.trim().eq_ignore_ascii_case(callsign.trim()))
    }
}

fn meters_to_feet(meters: f64) -> i64 {
    (meters / FEET_TO_METERS).round() as i64
}

fn ms_to_knots(ms: f64) -> i64 {
    (ms / KNOTS_TO_MS).round() as i64
}

/// How an aircraft is identified in a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierType {
    FlightNumber,
    Icao24,
    Registration,
}

impl IdentifierType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierType::FlightNumber => "flight_number",
            IdentifierType::Icao24 => "icao24",
            IdentifierType::Registration => "registration",
        }
    }
}

impl fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdentifierType {
    type Err = AdsbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flight_number" => Ok(IdentifierType::FlightNumber),
            "icao24" => Ok(IdentifierType::Icao24),
            "registration" => Ok(IdentifierType::Registration),
            _ => Err(AdsbError::invalid_argument(
                "Invalid identifier_type. Must be: flight_number, icao24, or registration",
            )),
        }
    }
}

/// Validate a 24-bit hex transponder address, returned lowercased
pub fn normalize_icao24(value: &str) -> Result<String, AdsbError> {
    let value = value.trim().to_lowercase();
    if value.len() == 6 && value.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(value)
    } else {
        Err(AdsbError::invalid_argument(format!(
            "ICAO24 address must be 6 hexadecimal characters, got: '{value}'"
        )))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rstest::rstest;

    pub(crate) fn sample_state(icao24: &str, callsign: &str, altitude_m: Option<f64>) -> AircraftState {
        AircraftState {
            icao24: icao24.to_string(),
            callsign: Some(format!("{callsign}  ")),
            origin_country: "United States".to_string(),
            time_position: Some(1_731_355_200),
            last_contact: 1_731_355_201,
            longitude: Some(-122.38),
            latitude: Some(37.62),
            baro_altitude: altitude_m,
            on_ground: false,
            velocity: Some(231.5),
            true_track: Some(284.0),
            vertical_rate: Some(0.0),
            squawk: Some("1200".to_string()),
            altitude_feet: None,
            velocity_knots: None,
            distance_from_center_nm: None,
        }
        .with_derived_units()
    }

    #[test]
    fn test_derived_units() {
        let state = sample_state("a1b2c3", "UAL123", Some(10668.0));
        assert_eq!(state.callsign.as_deref(), Some("UAL123"));
        assert_eq!(state.altitude_feet, Some(35000));
        // 231.5 / 0.514444 = 450.0
        assert_eq!(state.velocity_knots, Some(450));
    }

    #[test]
    fn test_missing_values_stay_missing() {
        let mut state = sample_state("a1b2c3", "", None);
        state.velocity = None;
        let state = state.with_derived_units();
        assert_eq!(state.callsign, None);
        assert_eq!(state.altitude_feet, None);
        assert_eq!(state.velocity_knots, None);
    }

    #[rstest]
    #[case(Some(10000.0), None, true)]
    #[case(Some(40000.0), None, false)]
    #[case(None, Some(30000.0), false)]
    #[case(Some(30000.0), Some(36000.0), true)]
    #[case(None, None, true)]
    fn test_altitude_filter(#[case] min: Option<f64>, #[case] max: Option<f64>, #[case] expected: bool) {
        let state = sample_state("a1b2c3", "UAL123", Some(10668.0));
        assert_eq!(state.within_altitude(min, max), expected);
    }

    #[test]
    fn test_altitude_filter_passes_unknown_altitude() {
        let state = sample_state("a1b2c3", "UAL123", None);
        assert!(state.within_altitude(Some(1000.0), Some(2000.0)));
    }

    #[rstest]
    #[case("A1B2", true)]
    #[case("ual", true)]
    #[case("DAL", false)]
    #[case("", true)]
    fn test_type_filter(#[case] filter: &str, #[case] expected: bool) {
        let state = sample_state("a1b2c3", "UAL123", Some(10668.0));
        assert_eq!(state.matches_filter(filter), expected);
    }

    #[test]
    fn test_has_callsign() {
        let state = sample_state("a1b2c3", "UAL123", None);
        assert!(state.has_callsign("ual123"));
        assert!(!state.has_callsign("UAL12"));
    }

    #[test]
    fn test_identifier_type_parse() {
        assert_eq!("icao24".parse::<IdentifierType>().unwrap(), IdentifierType::Icao24);
        assert!("tail_number".parse::<IdentifierType>().is_err());
    }

    #[rstest]
    #[case("A1B2C3", Ok("a1b2c3"))]
    #[case(" 4ca7b5 ", Ok("4ca7b5"))]
    #[case("a1b2", Err(()))]
    #[case("zzzzzz", Err(()))]
    fn test_normalize_icao24(#[case] input: &str, #[case] expected: Result<&str, ()>) {
        assert_eq!(normalize_icao24(input).map_err(|_| ()), expected.map(str::to_string));
    }
}
