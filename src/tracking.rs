//! Aircraft tracking operations
//!
//! Combines the flight-data provider with the geodesic calculator and shapes
//! the results returned by the HTTP API and the agent tools.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::geo::{BoundingBox, DistanceUnit, GeoPoint, GeodesicCalculator, round_to};
use crate::models::aircraft::normalize_icao24;
use crate::models::flight::parse_iso8601;
use crate::models::{AircraftState, FlightRecord, IdentifierType};
use crate::opensky::{FlightDataProvider, StateQuery};
use crate::{AdsbError, Result};

/// Default cruise speed for route time estimates
pub const DEFAULT_AVERAGE_SPEED_KNOTS: f64 = 450.0;
/// How far back aircraft info looks for recent flights
pub const RECENT_FLIGHTS_WINDOW_SECS: i64 = 24 * 3600;
/// How far back airport boards look
pub const AIRPORT_WINDOW_SECS: i64 = 2 * 3600;
/// Entries kept per arrivals/departures board
pub const AIRPORT_BOARD_LIMIT: usize = 10;

/// Area search parameters
#[derive(Debug, Clone, Deserialize)]
pub struct AreaQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// Nautical miles
    pub radius: f64,
    /// Feet
    pub altitude_min: Option<f64>,
    /// Feet
    pub altitude_max: Option<f64>,
    /// Substring of the ICAO24 address or callsign
    pub aircraft_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchArea {
    pub center: GeoPoint,
    pub radius_nm: f64,
    pub bounding_box: BoundingBox,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdsbDataReport {
    pub timestamp: i64,
    pub aircraft_count: usize,
    pub aircraft: Vec<AircraftState>,
    pub search_area: SearchArea,
}

#[derive(Debug, Clone, Serialize)]
pub struct AircraftInfo {
    pub aircraft: AircraftState,
    /// Flights in the last 24 hours; `None` if the history lookup failed
    pub recent_flights: Option<usize>,
    pub identifier_type: IdentifierType,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryQuery {
    pub flight_id: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlightHistory {
    pub flight_count: usize,
    pub flights: Vec<FlightRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub query: HistoryQuery,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AirportQuery {
    pub airport_code: String,
    #[serde(default = "default_true")]
    pub include_weather: bool,
    #[serde(default)]
    pub include_departures: bool,
    #[serde(default)]
    pub include_arrivals: bool,
}

fn default_true() -> bool {
    true
}

/// Arrivals or departures for one airport
#[derive(Debug, Clone, Serialize)]
pub struct FlightBoard {
    pub count: usize,
    pub flights: Vec<BoardEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardEntry {
    pub icao24: String,
    pub callsign: Option<String>,
    /// The other end of the flight
    pub airport: Option<String>,
    /// Arrival time for arrivals, departure time for departures
    pub time_utc: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeatherSection {
    pub available: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AirportInfo {
    pub airport_code: String,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrivals: Option<FlightBoard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departures: Option<FlightBoard>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteQuery {
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub average_speed_knots: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteEndpoint {
    pub input: String,
    pub coordinates: GeoPoint,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlightTime {
    pub hours: f64,
    pub minutes: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalculationParameters {
    pub average_speed_knots: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteDistance {
    pub origin: RouteEndpoint,
    pub destination: RouteEndpoint,
    pub distance: f64,
    pub unit: DistanceUnit,
    pub flight_time: FlightTime,
    pub calculation_parameters: CalculationParameters,
}

/// Entry point for all tracking queries
#[derive(Clone)]
pub struct TrackingService {
    provider: Arc<dyn FlightDataProvider>,
    calculator: GeodesicCalculator,
}

impl TrackingService {
    pub fn new(provider: Arc<dyn FlightDataProvider>, calculator: GeodesicCalculator) -> Self {
        Self {
            provider,
            calculator,
        }
    }

    #[must_use]
    pub fn calculator(&self) -> &GeodesicCalculator {
        &self.calculator
    }

    /// Aircraft currently inside the search circle's bounding box
    #[instrument(skip(self))]
    pub async fn collect_adsb_data(&self, query: AreaQuery) -> Result<AdsbDataReport> {
        let center = GeoPoint::new(query.latitude, query.longitude)?;
        for (name, bound) in [("altitude_min", query.altitude_min), ("altitude_max", query.altitude_max)] {
            if bound.is_some_and(|feet| !feet.is_finite()) {
                return Err(AdsbError::invalid_argument(format!(
                    "{name} must be a finite number of feet"
                )));
            }
        }
        if let (Some(min), Some(max)) = (query.altitude_min, query.altitude_max) {
            if min > max {
                return Err(AdsbError::invalid_argument(format!(
                    "altitude_min ({min}) cannot exceed altitude_max ({max})"
                )));
            }
        }
        let bbox = self.calculator.bounding_box(center, query.radius)?;

        let states = self.provider.get_states(StateQuery::Area(bbox)).await?;
        let received = states.len();

        let filter = query.aircraft_type.as_deref().unwrap_or_default();
        let aircraft: Vec<AircraftState> = states
            .into_iter()
            .filter(|s| s.within_altitude(query.altitude_min, query.altitude_max))
            .filter(|s| s.matches_filter(filter))
            .map(|mut s| {
                s.distance_from_center_nm = s.position().map(|p| {
                    round_to(
                        self.calculator
                            .great_circle_distance(center, p, DistanceUnit::NauticalMiles),
                        2,
                    )
                });
                s
            })
            .collect();

        info!(received, kept = aircraft.len(), "Collected ADS-B data");

        Ok(AdsbDataReport {
            timestamp: Utc::now().timestamp(),
            aircraft_count: aircraft.len(),
            aircraft,
            search_area: SearchArea {
                center,
                radius_nm: query.radius,
                bounding_box: bbox,
            },
        })
    }

    /// Live state of one aircraft plus a count of its recent flights
    #[instrument(skip(self))]
    pub async fn get_aircraft_info(
        &self,
        identifier: &str,
        identifier_type: IdentifierType,
    ) -> Result<AircraftInfo> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(AdsbError::invalid_argument("identifier cannot be empty"));
        }

        let aircraft = match identifier_type {
            IdentifierType::Icao24 => {
                let icao24 = normalize_icao24(identifier)?;
                self.provider
                    .get_states(StateQuery::Aircraft(icao24))
                    .await?
                    .into_iter()
                    .next()
            }
            IdentifierType::FlightNumber => self
                .provider
                .get_states(StateQuery::All)
                .await?
                .into_iter()
                .find(|s| s.has_callsign(identifier)),
            IdentifierType::Registration => {
                return Err(AdsbError::invalid_argument(
                    "Registration lookup is not supported by the tracking provider; use icao24 or flight_number",
                ));
            }
        };

        let mut aircraft = aircraft.ok_or_else(|| {
            AdsbError::not_found(format!(
                "Aircraft '{identifier}' not found or not currently transmitting"
            ))
        })?;
        aircraft.distance_from_center_nm = None;

        let end = Utc::now().timestamp();
        let recent_flights = match self
            .provider
            .get_flights_by_aircraft(&aircraft.icao24, end - RECENT_FLIGHTS_WINDOW_SECS, end)
            .await
        {
            Ok(flights) => Some(flights.len()),
            Err(e) => {
                warn!(error = %e, icao24 = %aircraft.icao24, "Recent flight lookup failed");
                None
            }
        };

        Ok(AircraftInfo {
            aircraft,
            recent_flights,
            identifier_type,
        })
    }

    /// Flights of one aircraft between two ISO 8601 instants
    #[instrument(skip(self))]
    pub async fn get_flight_history(
        &self,
        flight_id: &str,
        start_time: &str,
        end_time: &str,
    ) -> Result<FlightHistory> {
        let begin = parse_iso8601(start_time)?;
        let end = parse_iso8601(end_time)?;
        if end <= begin {
            return Err(AdsbError::invalid_argument("end_time must be after start_time"));
        }
        let icao24 = normalize_icao24(flight_id)?;

        let flights = self.provider.get_flights_by_aircraft(&icao24, begin, end).await?;
        debug!(count = flights.len(), "Flight history received");

        let message = flights
            .is_empty()
            .then(|| "No flights found in specified time range".to_string());

        Ok(FlightHistory {
            flight_count: flights.len(),
            flights,
            message,
            query: HistoryQuery {
                flight_id: flight_id.to_string(),
                start_time: start_time.to_string(),
                end_time: end_time.to_string(),
            },
        })
    }

    /// Recent arrivals and departures for an airport
    #[instrument(skip(self))]
    pub async fn get_airport_info(&self, query: AirportQuery) -> Result<AirportInfo> {
        let airport_code = normalize_airport_code(&query.airport_code)?;
        let end = Utc::now().timestamp();
        let begin = end - AIRPORT_WINDOW_SECS;

        let arrivals = async {
            if !query.include_arrivals {
                return None;
            }
            let result = self.provider.get_arrivals_by_airport(&airport_code, begin, end).await;
            Some(build_board(result, "arrivals", |f| {
                (f.departure_airport.clone(), f.arrival_time_utc.clone())
            }))
        };
        let departures = async {
            if !query.include_departures {
                return None;
            }
            let result = self.provider.get_departures_by_airport(&airport_code, begin, end).await;
            Some(build_board(result, "departures", |f| {
                (f.arrival_airport.clone(), f.departure_time_utc.clone())
            }))
        };
        let (arrivals, departures) = futures::join!(arrivals, departures);

        let weather = query.include_weather.then(|| WeatherSection {
            available: false,
            message: "Weather data is not provided by the flight-tracking provider".to_string(),
        });

        Ok(AirportInfo {
            airport_code,
            timestamp: end,
            weather,
            arrivals,
            departures,
        })
    }

    /// Great-circle distance and flight time between two `lat,lon` points
    #[instrument(skip(self))]
    pub fn calculate_route_distance(&self, query: RouteQuery) -> Result<RouteDistance> {
        let unit = match query.unit.as_deref() {
            Some(unit) if !unit.trim().is_empty() => unit.parse::<DistanceUnit>()?,
            _ => DistanceUnit::default(),
        };
        let speed = query.average_speed_knots.unwrap_or(DEFAULT_AVERAGE_SPEED_KNOTS);

        let origin = parse_route_point(&query.origin, "origin")?;
        let destination = parse_route_point(&query.destination, "destination")?;

        let distance = self.calculator.great_circle_distance(origin, destination, unit);
        let distance_nm = self
            .calculator
            .great_circle_distance(origin, destination, DistanceUnit::NauticalMiles);
        let hours = self.calculator.estimate_flight_time(distance_nm, speed)?;

        Ok(RouteDistance {
            origin: RouteEndpoint {
                input: query.origin,
                coordinates: origin,
            },
            destination: RouteEndpoint {
                input: query.destination,
                coordinates: destination,
            },
            distance: round_to(distance, 2),
            unit,
            flight_time: FlightTime {
                hours: round_to(hours, 2),
                minutes: round_to(hours * 60.0, 0),
            },
            calculation_parameters: CalculationParameters {
                average_speed_knots: speed,
            },
        })
    }
}

fn parse_route_point(input: &str, field: &str) -> Result<GeoPoint> {
    if input.trim().is_empty() {
        return Err(AdsbError::invalid_argument(format!("{field} cannot be empty")));
    }
    if !input.contains(',') {
        return Err(AdsbError::invalid_argument(format!(
            "{field} '{input}' looks like an airport code; only lat,lon coordinates are supported (e.g. \"37.7749,-122.4194\")"
        )));
    }
    input.parse()
}

/// ICAO (4) or IATA (3) code, uppercased
fn normalize_airport_code(code: &str) -> Result<String> {
    let code = code.trim().to_uppercase();
    if (3..=4).contains(&code.len()) && code.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(code)
    } else {
        Err(AdsbError::invalid_argument(format!(
            "Airport code must be a 3-letter IATA or 4-letter ICAO code, got: '{code}'"
        )))
    }
}

fn build_board<F>(result: Result<Vec<FlightRecord>>, label: &str, project: F) -> FlightBoard
where
    F: Fn(&FlightRecord) -> (Option<String>, Option<String>),
{
    match result {
        Ok(flights) => FlightBoard {
            count: flights.len(),
            flights: flights
                .iter()
                .take(AIRPORT_BOARD_LIMIT)
                .map(|f| {
                    let (airport, time_utc) = project(f);
                    BoardEntry {
                        icao24: f.icao24.clone(),
                        callsign: f.callsign.clone(),
                        airport,
                        time_utc,
                    }
                })
                .collect(),
            error: None,
        },
        Err(e) => {
            warn!(error = %e, "Unable to fetch {label}");
            FlightBoard {
                count: 0,
                flights: Vec::new(),
                error: Some(format!("Unable to fetch {label}: {}", e.user_message())),
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::aircraft::tests::sample_state;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Canned provider that records the queries it receives
    #[derive(Default)]
    pub(crate) struct FakeProvider {
        pub states: Vec<AircraftState>,
        pub flights: Vec<FlightRecord>,
        pub fail_flights: bool,
        pub fail_arrivals: bool,
        pub state_queries: Mutex<Vec<StateQuery>>,
        pub flight_windows: Mutex<Vec<(String, i64, i64)>>,
    }

    #[async_trait]
    impl FlightDataProvider for FakeProvider {
        async fn get_states(&self, query: StateQuery) -> Result<Vec<AircraftState>> {
            let states = match &query {
                StateQuery::Aircraft(icao24) => self
                    .states
                    .iter()
                    .filter(|s| &s.icao24 == icao24)
                    .cloned()
                    .collect(),
                _ => self.states.clone(),
            };
            self.state_queries.lock().unwrap().push(query);
            Ok(states)
        }

        async fn get_flights_by_aircraft(&self, icao24: &str, begin: i64, end: i64) -> Result<Vec<FlightRecord>> {
            self.flight_windows
                .lock()
                .unwrap()
                .push((icao24.to_string(), begin, end));
            if self.fail_flights {
                return Err(AdsbError::provider_unavailable("down"));
            }
            Ok(self.flights.clone())
        }

        async fn get_arrivals_by_airport(&self, _airport: &str, _begin: i64, _end: i64) -> Result<Vec<FlightRecord>> {
            if self.fail_arrivals {
                return Err(AdsbError::provider_unavailable("down"));
            }
            Ok(self.flights.clone())
        }

        async fn get_departures_by_airport(&self, _airport: &str, _begin: i64, _end: i64) -> Result<Vec<FlightRecord>> {
            Ok(self.flights.clone())
        }
    }

    pub(crate) fn sample_flight(n: i64) -> FlightRecord {
        FlightRecord::new(
            "a1b2c3".to_string(),
            Some(format!("UAL{n}")),
            Some("KSFO".to_string()),
            Some("KJFK".to_string()),
            1_762_732_800 + n * 60,
            1_762_752_600 + n * 60,
        )
    }

    fn service(provider: FakeProvider) -> (TrackingService, Arc<FakeProvider>) {
        let provider = Arc::new(provider);
        (
            TrackingService::new(provider.clone(), GeodesicCalculator::default()),
            provider,
        )
    }

    fn area(radius: f64) -> AreaQuery {
        AreaQuery {
            latitude: 37.7749,
            longitude: -122.4194,
            radius,
            altitude_min: None,
            altitude_max: None,
            aircraft_type: None,
        }
    }

    #[tokio::test]
    async fn test_collect_adsb_data_uses_bounding_box() {
        let (service, provider) = service(FakeProvider {
            states: vec![sample_state("a1b2c3", "UAL123", Some(10668.0))],
            ..FakeProvider::default()
        });

        let report = service.collect_adsb_data(area(50.0)).await.unwrap();

        assert_eq!(report.aircraft_count, 1);
        let queries = provider.state_queries.lock().unwrap();
        let StateQuery::Area(bbox) = &queries[0] else {
            panic!("expected an area query, got {:?}", queries[0]);
        };
        assert_eq!(*bbox, report.search_area.bounding_box);
        assert!((bbox.min_lat - 36.9399).abs() < 1e-9);

        let distance = report.aircraft[0].distance_from_center_nm.unwrap();
        assert!(distance > 0.0 && distance < 50.0, "got {distance}");
    }

    #[tokio::test]
    async fn test_collect_adsb_data_filters() {
        let (service, _) = service(FakeProvider {
            states: vec![
                sample_state("a1b2c3", "UAL123", Some(10668.0)),
                sample_state("c0ffee", "DAL45", Some(3048.0)),
                sample_state("abcdef", "SWA9", None),
            ],
            ..FakeProvider::default()
        });

        let mut query = area(50.0);
        query.altitude_min = Some(20000.0);
        let report = service.collect_adsb_data(query).await.unwrap();
        let ids: Vec<_> = report.aircraft.iter().map(|a| a.icao24.as_str()).collect();
        assert_eq!(ids, vec!["a1b2c3", "abcdef"]);

        let mut query = area(50.0);
        query.aircraft_type = Some("dal".to_string());
        let report = service.collect_adsb_data(query).await.unwrap();
        assert_eq!(report.aircraft_count, 1);
        assert_eq!(report.aircraft[0].icao24, "c0ffee");
    }

    #[tokio::test]
    async fn test_collect_adsb_data_rejects_bad_input() {
        let (service, provider) = service(FakeProvider::default());

        let err = service.collect_adsb_data(area(0.0)).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);

        let mut query = area(10.0);
        query.latitude = 95.0;
        assert!(service.collect_adsb_data(query).await.is_err());

        let mut query = area(10.0);
        query.altitude_min = Some(30000.0);
        query.altitude_max = Some(10000.0);
        assert!(service.collect_adsb_data(query).await.is_err());

        assert!(provider.state_queries.lock().unwrap().is_empty());
    }

    #[rstest::rstest]
    #[case(Some(f64::NAN), None)]
    #[case(None, Some(f64::INFINITY))]
    #[case(Some(f64::NEG_INFINITY), Some(30000.0))]
    #[tokio::test]
    async fn test_collect_adsb_data_rejects_non_finite_altitude(
        #[case] altitude_min: Option<f64>,
        #[case] altitude_max: Option<f64>,
    ) {
        let (service, provider) = service(FakeProvider {
            states: vec![sample_state("a1b2c3", "UAL123", Some(10668.0))],
            ..FakeProvider::default()
        });

        let mut query = area(50.0);
        query.altitude_min = altitude_min;
        query.altitude_max = altitude_max;
        let err = service.collect_adsb_data(query).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("finite"));
        assert!(provider.state_queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_aircraft_info_by_icao24() {
        let (service, provider) = service(FakeProvider {
            states: vec![sample_state("a1b2c3", "UAL123", Some(10668.0))],
            flights: vec![sample_flight(1), sample_flight(2)],
            ..FakeProvider::default()
        });

        let info = service
            .get_aircraft_info("A1B2C3", IdentifierType::Icao24)
            .await
            .unwrap();
        assert_eq!(info.aircraft.icao24, "a1b2c3");
        assert_eq!(info.recent_flights, Some(2));

        let windows = provider.flight_windows.lock().unwrap();
        let (_, begin, end) = windows[0];
        assert_eq!(end - begin, RECENT_FLIGHTS_WINDOW_SECS);
    }

    #[tokio::test]
    async fn test_get_aircraft_info_by_flight_number() {
        let (service, _) = service(FakeProvider {
            states: vec![
                sample_state("c0ffee", "DAL45", None),
                sample_state("a1b2c3", "UAL123", None),
            ],
            fail_flights: true,
            ..FakeProvider::default()
        });

        let info = service
            .get_aircraft_info("ual123", IdentifierType::FlightNumber)
            .await
            .unwrap();
        assert_eq!(info.aircraft.icao24, "a1b2c3");
        assert_eq!(info.recent_flights, None);
    }

    #[tokio::test]
    async fn test_get_aircraft_info_errors() {
        let (service, _) = service(FakeProvider::default());

        let err = service
            .get_aircraft_info("a1b2c3", IdentifierType::Icao24)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);

        let err = service
            .get_aircraft_info("N12345", IdentifierType::Registration)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_get_flight_history() {
        let (service, provider) = service(FakeProvider {
            flights: vec![sample_flight(1)],
            ..FakeProvider::default()
        });

        let history = service
            .get_flight_history("A1B2C3", "2025-11-10T00:00:00Z", "2025-11-11T00:00:00Z")
            .await
            .unwrap();
        assert_eq!(history.flight_count, 1);
        assert!(history.message.is_none());
        assert_eq!(history.query.flight_id, "A1B2C3");

        let windows = provider.flight_windows.lock().unwrap();
        assert_eq!(windows[0], ("a1b2c3".to_string(), 1_762_732_800, 1_762_819_200));
    }

    #[tokio::test]
    async fn test_get_flight_history_empty_and_invalid() {
        let (service, _) = service(FakeProvider::default());

        let history = service
            .get_flight_history("a1b2c3", "2025-11-10T00:00:00Z", "2025-11-11T00:00:00Z")
            .await
            .unwrap();
        assert_eq!(history.flight_count, 0);
        assert!(history.message.is_some());

        assert!(service
            .get_flight_history("a1b2c3", "last tuesday", "2025-11-11T00:00:00Z")
            .await
            .is_err());
        assert!(service
            .get_flight_history("a1b2c3", "2025-11-11T00:00:00Z", "2025-11-10T00:00:00Z")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_get_airport_info() {
        let (service, _) = service(FakeProvider {
            flights: (0..12).map(sample_flight).collect(),
            fail_arrivals: true,
            ..FakeProvider::default()
        });

        let info = service
            .get_airport_info(AirportQuery {
                airport_code: "ksfo".to_string(),
                include_weather: false,
                include_departures: true,
                include_arrivals: true,
            })
            .await
            .unwrap();

        assert_eq!(info.airport_code, "KSFO");
        assert!(info.weather.is_none());
        let departures = info.departures.unwrap();
        assert_eq!(departures.count, 12);
        assert_eq!(departures.flights.len(), AIRPORT_BOARD_LIMIT);
        assert_eq!(departures.flights[0].airport.as_deref(), Some("KJFK"));
        let arrivals = info.arrivals.unwrap();
        assert_eq!(arrivals.count, 0);
        assert!(arrivals.error.is_some());
    }

    #[tokio::test]
    async fn test_get_airport_info_defaults() {
        let (service, _) = service(FakeProvider::default());
        let query: AirportQuery = serde_json::from_str(r#"{"airport_code": "KJFK"}"#).unwrap();
        let info = service.get_airport_info(query).await.unwrap();
        assert!(info.weather.is_some());
        assert!(info.arrivals.is_none());
        assert!(info.departures.is_none());

        let query: AirportQuery = serde_json::from_str(r#"{"airport_code": "K-JFK"}"#).unwrap();
        assert!(service.get_airport_info(query).await.is_err());
    }

    #[test]
    fn test_calculate_route_distance() {
        let (service, _) = service(FakeProvider::default());
        let route = service
            .calculate_route_distance(RouteQuery {
                origin: "37.7749,-122.4194".to_string(),
                destination: "40.7128,-74.0060".to_string(),
                unit: None,
                average_speed_knots: None,
            })
            .unwrap();

        assert_eq!(route.unit, DistanceUnit::NauticalMiles);
        assert_eq!(route.distance, 2229.53);
        assert_eq!(route.flight_time.hours, 4.95);
        assert_eq!(route.flight_time.minutes, 297.0);
        assert_eq!(route.calculation_parameters.average_speed_knots, 450.0);
    }

    #[test]
    fn test_calculate_route_distance_units_and_errors() {
        let (service, _) = service(FakeProvider::default());
        let query = |unit: Option<&str>, speed: Option<f64>, destination: &str| RouteQuery {
            origin: "37.7749,-122.4194".to_string(),
            destination: destination.to_string(),
            unit: unit.map(str::to_string),
            average_speed_knots: speed,
        };

        let route = service
            .calculate_route_distance(query(Some("kilometers"), None, "40.7128,-74.0060"))
            .unwrap();
        assert_eq!(route.distance, 4129.09);
        // flight time always comes from nautical miles
        assert_eq!(route.flight_time.hours, 4.95);

        assert!(service
            .calculate_route_distance(query(Some("furlongs"), None, "40.7128,-74.0060"))
            .is_err());
        assert!(service
            .calculate_route_distance(query(None, Some(0.0), "40.7128,-74.0060"))
            .is_err());
        let err = service
            .calculate_route_distance(query(None, None, "KJFK"))
            .unwrap_err();
        assert!(err.to_string().contains("airport code"));
    }
}
