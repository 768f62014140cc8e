//! OpenSky Network REST client
//!
//! Wraps the `/states/all` and `/flights/*` endpoints behind the
//! [`FlightDataProvider`] trait so the tracking service can be exercised
//! without network access. Transient failures are retried with exponential
//! backoff by the HTTP middleware.

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::config::ProviderConfig;
use crate::geo::BoundingBox;
use crate::models::{AircraftState, FlightRecord};
use crate::{AdsbError, Result};

/// Which state vectors to request
#[derive(Debug, Clone, PartialEq)]
pub enum StateQuery {
    Area(BoundingBox),
    Aircraft(String),
    All,
}

/// Source of live and historical surveillance data
#[async_trait]
pub trait FlightDataProvider: Send + Sync {
    /// Current state vectors; an empty list when nothing matches
    async fn get_states(&self, query: StateQuery) -> Result<Vec<AircraftState>>;

    /// Flights of one aircraft in `[begin, end]` (unix seconds)
    async fn get_flights_by_aircraft(&self, icao24: &str, begin: i64, end: i64) -> Result<Vec<FlightRecord>>;

    async fn get_arrivals_by_airport(&self, airport: &str, begin: i64, end: i64) -> Result<Vec<FlightRecord>>;

    async fn get_departures_by_airport(&self, airport: &str, begin: i64, end: i64) -> Result<Vec<FlightRecord>>;
}

/// `/states/all` response body
#[derive(Debug, Deserialize)]
pub struct StatesResponse {
    pub time: i64,
    pub states: Option<Vec<RawStateVector>>,
}

/// One state vector, sent by the provider as a positional JSON array
#[derive(Debug, Clone, Deserialize)]
pub struct RawStateVector {
    pub icao24: String,
    pub callsign: Option<String>,
    pub origin_country: String,
    pub time_position: Option<i64>,
    pub last_contact: i64,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub baro_altitude: Option<f64>,
    pub on_ground: bool,
    pub velocity: Option<f64>,
    pub true_track: Option<f64>,
    pub vertical_rate: Option<f64>,
    #[serde(default)]
    pub sensors: Option<Vec<i64>>,
    #[serde(default)]
    pub geo_altitude: Option<f64>,
    #[serde(default)]
    pub squawk: Option<String>,
    #[serde(default)]
    pub spi: Option<bool>,
    #[serde(default)]
    pub position_source: Option<u8>,
    #[serde(default)]
    pub category: Option<u8>,
}

impl From<RawStateVector> for AircraftState {
    fn from(raw: RawStateVector) -> Self {
        AircraftState {
            icao24: raw.icao24,
            callsign: raw.callsign,
            origin_country: raw.origin_country,
            time_position: raw.time_position,
            last_contact: raw.last_contact,
            longitude: raw.longitude,
            latitude: raw.latitude,
            baro_altitude: raw.baro_altitude,
            on_ground: raw.on_ground,
            velocity: raw.velocity,
            true_track: raw.true_track,
            vertical_rate: raw.vertical_rate,
            squawk: raw.squawk,
            altitude_feet: None,
            velocity_knots: None,
            distance_from_center_nm: None,
        }
        .with_derived_units()
    }
}

/// `/flights/*` response element
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFlight {
    pub icao24: String,
    pub first_seen: i64,
    pub est_departure_airport: Option<String>,
    pub last_seen: i64,
    pub est_arrival_airport: Option<String>,
    pub callsign: Option<String>,
}

impl From<RawFlight> for FlightRecord {
    fn from(raw: RawFlight) -> Self {
        FlightRecord::new(
            raw.icao24,
            raw.callsign,
            raw.est_departure_airport,
            raw.est_arrival_airport,
            raw.first_seen,
            raw.last_seen,
        )
    }
}

/// OpenSky Network API client
pub struct OpenSkyClient {
    client: ClientWithMiddleware,
    base_url: String,
    credentials: Option<(String, String)>,
}

impl OpenSkyClient {
    /// Create a new client from provider settings
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("adsb-tracker/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AdsbError::config(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        let credentials = match (&config.username, &config.password) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            _ => None,
        };

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        Url::parse_with_params(&format!("{}{}", self.base_url, path), params)
            .map_err(|e| AdsbError::config(format!("Invalid provider URL: {e}")))
    }

    /// GET a JSON document; `Ok(None)` when the provider answers 404
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        debug!(%url, "Calling OpenSky");

        let mut request = self.client.get(url);
        if let Some((user, pass)) = &self.credentials {
            request = request.basic_auth(user, Some(pass));
        }

        let response = request
            .send()
            .await
            .map_err(|e| AdsbError::provider_unavailable(format!("OpenSky request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("OpenSky returned 404, treating as no data");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "OpenSky request rejected");
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    AdsbError::provider_auth(format!("OpenSky rejected credentials ({status})"))
                }
                StatusCode::BAD_REQUEST => {
                    AdsbError::invalid_argument(format!("OpenSky rejected the query: {body}"))
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    AdsbError::provider_unavailable("OpenSky rate limit exceeded")
                }
                _ => AdsbError::provider_unavailable(format!("OpenSky error {status}: {body}")),
            });
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| AdsbError::invalid_response(format!("Failed to parse OpenSky response: {e}")))
    }

    async fn get_flights(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<FlightRecord>> {
        let url = self.endpoint(path, params)?;
        let flights: Vec<RawFlight> = self.get_json(url).await?.unwrap_or_default();
        Ok(flights.into_iter().map(FlightRecord::from).collect())
    }
}

fn flight_window(begin: i64, end: i64) -> [(&'static str, String); 2] {
    [("begin", begin.to_string()), ("end", end.to_string())]
}

#[async_trait]
impl FlightDataProvider for OpenSkyClient {
    #[instrument(skip(self))]
    async fn get_states(&self, query: StateQuery) -> Result<Vec<AircraftState>> {
        let params: Vec<(&str, String)> = match &query {
            StateQuery::Area(bbox) => vec![
                ("lamin", bbox.min_lat.to_string()),
                ("lomin", bbox.min_lon.to_string()),
                ("lamax", bbox.max_lat.to_string()),
                ("lomax", bbox.max_lon.to_string()),
            ],
            StateQuery::Aircraft(icao24) => vec![("icao24", icao24.clone())],
            StateQuery::All => Vec::new(),
        };
        let url = self.endpoint("/states/all", &params)?;

        let response: Option<StatesResponse> = self.get_json(url).await?;
        let states: Vec<AircraftState> = response
            .and_then(|r| r.states)
            .unwrap_or_default()
            .into_iter()
            .map(AircraftState::from)
            .collect();

        info!(count = states.len(), "Received state vectors");
        Ok(states)
    }

    #[instrument(skip(self))]
    async fn get_flights_by_aircraft(&self, icao24: &str, begin: i64, end: i64) -> Result<Vec<FlightRecord>> {
        let [begin, end] = flight_window(begin, end);
        self.get_flights("/flights/aircraft", &[("icao24", icao24.to_string()), begin, end])
            .await
    }

    #[instrument(skip(self))]
    async fn get_arrivals_by_airport(&self, airport: &str, begin: i64, end: i64) -> Result<Vec<FlightRecord>> {
        let [begin, end] = flight_window(begin, end);
        self.get_flights("/flights/arrival", &[("airport", airport.to_string()), begin, end])
            .await
    }

    #[instrument(skip(self))]
    async fn get_departures_by_airport(&self, airport: &str, begin: i64, end: i64) -> Result<Vec<FlightRecord>> {
        let [begin, end] = flight_window(begin, end);
        self.get_flights("/flights/departure", &[("airport", airport.to_string()), begin, end])
            .await
    }
}
