use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{AdsbError, ErrorKind};
use crate::models::IdentifierType;
use crate::tracking::{
    AdsbDataReport, AircraftInfo, AirportInfo, AirportQuery, AreaQuery, FlightHistory, RouteDistance,
    RouteQuery, TrackingService,
};

pub const SERVICE_NAME: &str = "ADS-B Backend API";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub tracking: TrackingService,
}

/// `{"success": true, ...data}`
#[derive(Serialize)]
pub struct ApiSuccess<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T> ApiSuccess<T> {
    pub fn new(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

/// `{"success": false, "error": ..., "error_kind": ...}`
#[derive(Serialize)]
pub struct ApiFailure {
    pub success: bool,
    pub error: String,
    pub error_kind: ErrorKind,
}

impl IntoResponse for AdsbError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = StatusCode::from_u16(kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = ApiFailure {
            success: false,
            error: self.user_message(),
            error_kind: kind,
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiSuccess<T>>, AdsbError>;

fn query_params<T>(params: Result<Query<T>, QueryRejection>, hint: &str) -> Result<T, AdsbError> {
    params
        .map(|Query(p)| p)
        .map_err(|e| AdsbError::invalid_argument(format!("{hint} ({})", e.body_text())))
}

fn required<T>(value: Option<T>, message: &str) -> Result<T, AdsbError> {
    value.ok_or_else(|| AdsbError::invalid_argument(message))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/collect_adsb_data", get(collect_adsb_data))
        .route("/get_aircraft_info", get(get_aircraft_info))
        .route("/get_flight_history", get(get_flight_history))
        .route("/get_airport_info", get(get_airport_info))
        .route("/calculate_route_distance", get(calculate_route_distance))
}

#[derive(Deserialize)]
struct AreaParams {
    latitude: Option<f64>,
    longitude: Option<f64>,
    radius: Option<f64>,
    altitude_min: Option<f64>,
    altitude_max: Option<f64>,
    aircraft_type: Option<String>,
}

const AREA_HINT: &str = "Missing or invalid required parameters. Required: latitude, longitude, radius";

async fn collect_adsb_data(
    State(state): State<AppState>,
    params: Result<Query<AreaParams>, QueryRejection>,
) -> ApiResult<AdsbDataReport> {
    let params = query_params(params, AREA_HINT)?;
    let query = AreaQuery {
        latitude: required(params.latitude, AREA_HINT)?,
        longitude: required(params.longitude, AREA_HINT)?,
        radius: required(params.radius, AREA_HINT)?,
        altitude_min: params.altitude_min,
        altitude_max: params.altitude_max,
        aircraft_type: params.aircraft_type.filter(|t| !t.trim().is_empty()),
    };
    let report = state.tracking.collect_adsb_data(query).await?;
    Ok(ApiSuccess::new(report))
}

#[derive(Deserialize)]
struct AircraftParams {
    identifier: Option<String>,
    identifier_type: Option<String>,
}

async fn get_aircraft_info(
    State(state): State<AppState>,
    params: Result<Query<AircraftParams>, QueryRejection>,
) -> ApiResult<AircraftInfo> {
    const HINT: &str = "Missing required parameters: identifier and identifier_type";
    let params = query_params(params, HINT)?;
    let identifier = required(params.identifier.filter(|s| !s.is_empty()), HINT)?;
    let identifier_type: IdentifierType =
        required(params.identifier_type.filter(|s| !s.is_empty()), HINT)?.parse()?;

    let info = state
        .tracking
        .get_aircraft_info(&identifier, identifier_type)
        .await?;
    Ok(ApiSuccess::new(info))
}

#[derive(Deserialize)]
struct HistoryParams {
    flight_id: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
}

async fn get_flight_history(
    State(state): State<AppState>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> ApiResult<FlightHistory> {
    const HINT: &str = "Missing required parameters: flight_id, start_time, end_time";
    let params = query_params(params, HINT)?;
    let flight_id = required(params.flight_id.filter(|s| !s.is_empty()), HINT)?;
    let start_time = required(params.start_time.filter(|s| !s.is_empty()), HINT)?;
    let end_time = required(params.end_time.filter(|s| !s.is_empty()), HINT)?;

    let history = state
        .tracking
        .get_flight_history(&flight_id, &start_time, &end_time)
        .await?;
    Ok(ApiSuccess::new(history))
}

#[derive(Deserialize)]
struct AirportParams {
    airport_code: Option<String>,
    include_weather: Option<String>,
    include_departures: Option<String>,
    include_arrivals: Option<String>,
}

/// `true` only for a case-insensitive "true"
fn flag(value: Option<&str>, default: bool) -> bool {
    value.map_or(default, |v| v.trim().eq_ignore_ascii_case("true"))
}

async fn get_airport_info(
    State(state): State<AppState>,
    params: Result<Query<AirportParams>, QueryRejection>,
) -> ApiResult<AirportInfo> {
    const HINT: &str = "Missing required parameter: airport_code";
    let params = query_params(params, HINT)?;
    let query = AirportQuery {
        airport_code: required(params.airport_code.filter(|s| !s.is_empty()), HINT)?,
        include_weather: flag(params.include_weather.as_deref(), true),
        include_departures: flag(params.include_departures.as_deref(), false),
        include_arrivals: flag(params.include_arrivals.as_deref(), false),
    };
    let info = state.tracking.get_airport_info(query).await?;
    Ok(ApiSuccess::new(info))
}

#[derive(Deserialize)]
struct RouteParams {
    origin: Option<String>,
    destination: Option<String>,
    unit: Option<String>,
    average_speed_knots: Option<f64>,
}

async fn calculate_route_distance(
    State(state): State<AppState>,
    params: Result<Query<RouteParams>, QueryRejection>,
) -> ApiResult<RouteDistance> {
    const HINT: &str = "Missing required parameters: origin, destination";
    let params = query_params(params, HINT)?;
    let query = RouteQuery {
        origin: required(params.origin.filter(|s| !s.is_empty()), HINT)?,
        destination: required(params.destination.filter(|s| !s.is_empty()), HINT)?,
        unit: params.unit,
        average_speed_knots: params.average_speed_knots,
    };
    let route = state.tracking.calculate_route_distance(query)?;
    Ok(ApiSuccess::new(route))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": crate::VERSION,
    }))
}

/// Self-describing endpoint list served at `/`
pub async fn index() -> Json<Value> {
    Json(json!({
        "name": "ADS-B Aircraft Tracking API",
        "version": crate::VERSION,
        "description": "ADS-B aircraft tracking backend with OpenSky Network API integration",
        "endpoints": {
            "collect_adsb_data": {
                "method": "GET",
                "path": "/api/collect_adsb_data",
                "parameters": {
                    "latitude": "float (required) - Center latitude",
                    "longitude": "float (required) - Center longitude",
                    "radius": "float (required) - Search radius in nautical miles",
                    "altitude_min": "float (optional) - Minimum altitude in feet",
                    "altitude_max": "float (optional) - Maximum altitude in feet",
                    "aircraft_type": "string (optional) - Filter by ICAO24 address or callsign"
                },
                "example": "/api/collect_adsb_data?latitude=37.7749&longitude=-122.4194&radius=50"
            },
            "get_aircraft_info": {
                "method": "GET",
                "path": "/api/get_aircraft_info",
                "parameters": {
                    "identifier": "string (required) - Aircraft identifier",
                    "identifier_type": "string (required) - Type: flight_number, icao24, or registration"
                },
                "example": "/api/get_aircraft_info?identifier=a1b2c3&identifier_type=icao24"
            },
            "get_flight_history": {
                "method": "GET",
                "path": "/api/get_flight_history",
                "parameters": {
                    "flight_id": "string (required) - ICAO24 address",
                    "start_time": "string (required) - ISO 8601 format",
                    "end_time": "string (required) - ISO 8601 format"
                },
                "example": "/api/get_flight_history?flight_id=a1b2c3&start_time=2025-11-10T00:00:00Z&end_time=2025-11-11T00:00:00Z"
            },
            "get_airport_info": {
                "method": "GET",
                "path": "/api/get_airport_info",
                "parameters": {
                    "airport_code": "string (required) - ICAO or IATA code",
                    "include_weather": "boolean (optional, default: true)",
                    "include_departures": "boolean (optional, default: false)",
                    "include_arrivals": "boolean (optional, default: false)"
                },
                "example": "/api/get_airport_info?airport_code=KSFO&include_arrivals=true"
            },
            "calculate_route_distance": {
                "method": "GET",
                "path": "/api/calculate_route_distance",
                "parameters": {
                    "origin": "string (required) - lat,lon",
                    "destination": "string (required) - lat,lon",
                    "unit": "string (optional) - nautical_miles, kilometers, or statute_miles",
                    "average_speed_knots": "float (optional, default: 450)"
                },
                "example": "/api/calculate_route_distance?origin=37.7749,-122.4194&destination=40.7128,-74.0060"
            }
        }
    }))
}
