//! Tool definitions offered to the language model and their execution
//!
//! Each tool mirrors one tracking endpoint. Calls are decoded into a typed
//! [`ToolInvocation`] and executed against the HTTP API by
//! [`BackendToolExecutor`].

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::config::AgentConfig;
use crate::{AdsbError, Result};

/// Function tool in the chat-completions schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object
    pub parameters: Value,
}

impl ToolDefinition {
    fn function(name: &str, description: &str, parameters: Value) -> Self {
        Self {
            kind: "function".to_string(),
            function: FunctionDefinition {
                name: name.to_string(),
                description: description.to_string(),
                parameters,
            },
        }
    }
}

/// The tracking tools, one per API endpoint
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::function(
            "collect_adsb_data",
            "Collects live ADS-B data for aircraft inside a circular area: position, altitude, speed and identification",
            json!({
                "type": "object",
                "properties": {
                    "latitude": {"type": "number", "description": "Latitude of the search center in decimal degrees"},
                    "longitude": {"type": "number", "description": "Longitude of the search center in decimal degrees"},
                    "radius": {"type": "number", "description": "Search radius in nautical miles"},
                    "altitude_min": {"type": "number", "description": "Minimum altitude in feet (optional)"},
                    "altitude_max": {"type": "number", "description": "Maximum altitude in feet (optional)"},
                    "aircraft_type": {"type": "string", "description": "Filter on ICAO24 address or callsign fragment (optional)"}
                },
                "required": ["latitude", "longitude", "radius"]
            }),
        ),
        ToolDefinition::function(
            "get_aircraft_info",
            "Retrieves the current state of one aircraft and how many flights it made in the last 24 hours",
            json!({
                "type": "object",
                "properties": {
                    "identifier": {"type": "string", "description": "Flight number / callsign (e.g. 'UAL123') or ICAO24 hex address (e.g. 'a1b2c3')"},
                    "identifier_type": {"type": "string", "enum": ["flight_number", "icao24", "registration"], "description": "Kind of identifier provided"}
                },
                "required": ["identifier", "identifier_type"]
            }),
        ),
        ToolDefinition::function(
            "get_flight_history",
            "Retrieves the flights an aircraft made in a time range, with departure and arrival airports and times",
            json!({
                "type": "object",
                "properties": {
                    "flight_id": {"type": "string", "description": "ICAO24 hex address of the aircraft"},
                    "start_time": {"type": "string", "description": "Start of the range in ISO 8601 (e.g. '2025-11-10T12:00:00Z')"},
                    "end_time": {"type": "string", "description": "End of the range in ISO 8601 (e.g. '2025-11-11T12:00:00Z')"}
                },
                "required": ["flight_id", "start_time", "end_time"]
            }),
        ),
        ToolDefinition::function(
            "get_airport_info",
            "Retrieves recent arrivals and departures at an airport over the last two hours",
            json!({
                "type": "object",
                "properties": {
                    "airport_code": {"type": "string", "description": "Airport ICAO code (e.g. 'KJFK', 'KSFO')"},
                    "include_weather": {"type": "boolean", "description": "Include weather conditions (default: true)"},
                    "include_departures": {"type": "boolean", "description": "Include departures (default: false)"},
                    "include_arrivals": {"type": "boolean", "description": "Include arrivals (default: false)"}
                },
                "required": ["airport_code"]
            }),
        ),
        ToolDefinition::function(
            "calculate_route_distance",
            "Calculates the great circle distance and estimated flight time between two coordinate pairs",
            json!({
                "type": "object",
                "properties": {
                    "origin": {"type": "string", "description": "Origin as 'lat,lon' (e.g. '37.7749,-122.4194')"},
                    "destination": {"type": "string", "description": "Destination as 'lat,lon' (e.g. '40.7128,-74.0060')"},
                    "unit": {"type": "string", "enum": ["nautical_miles", "kilometers", "statute_miles"], "description": "Distance unit (default: nautical_miles)"},
                    "average_speed_knots": {"type": "number", "description": "Average cruise speed in knots for the time estimate (default: 450)"}
                },
                "required": ["origin", "destination"]
            }),
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CollectAdsbArgs {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    pub altitude_min: Option<f64>,
    pub altitude_max: Option<f64>,
    pub aircraft_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AircraftInfoArgs {
    pub identifier: String,
    pub identifier_type: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FlightHistoryArgs {
    pub flight_id: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AirportInfoArgs {
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

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteDistanceArgs {
    pub origin: String,
    pub destination: String,
    pub unit: Option<String>,
    pub average_speed_knots: Option<f64>,
}

/// A decoded tool call
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocation {
    CollectAdsbData(CollectAdsbArgs),
    GetAircraftInfo(AircraftInfoArgs),
    GetFlightHistory(FlightHistoryArgs),
    GetAirportInfo(AirportInfoArgs),
    CalculateRouteDistance(RouteDistanceArgs),
}

impl ToolInvocation {
    /// Decode a call from its function name and JSON argument string
    pub fn parse(name: &str, arguments: &str) -> Result<Self> {
        let arguments = if arguments.trim().is_empty() { "{}" } else { arguments };
        let invalid = |e: serde_json::Error| AdsbError::invalid_argument(format!("Invalid arguments for {name}: {e}"));

        Ok(match name {
            "collect_adsb_data" => Self::CollectAdsbData(serde_json::from_str(arguments).map_err(invalid)?),
            "get_aircraft_info" => Self::GetAircraftInfo(serde_json::from_str(arguments).map_err(invalid)?),
            "get_flight_history" => Self::GetFlightHistory(serde_json::from_str(arguments).map_err(invalid)?),
            "get_airport_info" => Self::GetAirportInfo(serde_json::from_str(arguments).map_err(invalid)?),
            "calculate_route_distance" => {
                Self::CalculateRouteDistance(serde_json::from_str(arguments).map_err(invalid)?)
            }
            other => return Err(AdsbError::agent(format!("Unknown tool: {other}"))),
        })
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::CollectAdsbData(_) => "collect_adsb_data",
            Self::GetAircraftInfo(_) => "get_aircraft_info",
            Self::GetFlightHistory(_) => "get_flight_history",
            Self::GetAirportInfo(_) => "get_airport_info",
            Self::CalculateRouteDistance(_) => "calculate_route_distance",
        }
    }

    /// API path and query parameters serving this call
    #[must_use]
    pub fn to_request(&self) -> (String, Vec<(&'static str, String)>) {
        let mut params = Vec::new();
        match self {
            Self::CollectAdsbData(args) => {
                params.push(("latitude", args.latitude.to_string()));
                params.push(("longitude", args.longitude.to_string()));
                params.push(("radius", args.radius.to_string()));
                if let Some(min) = args.altitude_min {
                    params.push(("altitude_min", min.to_string()));
                }
                if let Some(max) = args.altitude_max {
                    params.push(("altitude_max", max.to_string()));
                }
                if let Some(kind) = &args.aircraft_type {
                    params.push(("aircraft_type", kind.clone()));
                }
            }
            Self::GetAircraftInfo(args) => {
                params.push(("identifier", args.identifier.clone()));
                params.push(("identifier_type", args.identifier_type.clone()));
            }
            Self::GetFlightHistory(args) => {
                params.push(("flight_id", args.flight_id.clone()));
                params.push(("start_time", args.start_time.clone()));
                params.push(("end_time", args.end_time.clone()));
            }
            Self::GetAirportInfo(args) => {
                params.push(("airport_code", args.airport_code.clone()));
                params.push(("include_weather", args.include_weather.to_string()));
                params.push(("include_departures", args.include_departures.to_string()));
                params.push(("include_arrivals", args.include_arrivals.to_string()));
            }
            Self::CalculateRouteDistance(args) => {
                params.push(("origin", args.origin.clone()));
                params.push(("destination", args.destination.clone()));
                if let Some(unit) = &args.unit {
                    params.push(("unit", unit.clone()));
                }
                if let Some(speed) = args.average_speed_knots {
                    params.push(("average_speed_knots", speed.to_string()));
                }
            }
        }
        (format!("/api/{}", self.name()), params)
    }
}

/// Failure payload handed back to the model instead of aborting the chat
#[must_use]
pub fn failure_result(error: &AdsbError) -> Value {
    json!({
        "success": false,
        "error": error.user_message(),
        "error_kind": error.kind(),
    })
}

/// Runs decoded tool calls
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Always yields a JSON result for the model; failures are encoded in it
    async fn execute(&self, invocation: &ToolInvocation) -> Value;
}

/// Executes tools by calling the tracking HTTP API
pub struct BackendToolExecutor {
    client: Client,
    backend_url: String,
}

impl BackendToolExecutor {
    pub fn new(config: &AgentConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .build()
            .map_err(|e| AdsbError::config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            backend_url: config.backend_url.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, invocation: &ToolInvocation) -> Result<Url> {
        let (path, params) = invocation.to_request();
        Url::parse_with_params(&format!("{}{}", self.backend_url, path), &params)
            .map_err(|e| AdsbError::config(format!("Invalid backend URL: {e}")))
    }

    async fn call(&self, invocation: &ToolInvocation) -> Result<Value> {
        let url = self.url_for(invocation)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AdsbError::provider_unavailable(format!("Tracking API unreachable: {e}")))?;
        // failure bodies are JSON too and are passed through to the model
        response
            .json::<Value>()
            .await
            .map_err(|e| AdsbError::invalid_response(format!("Tracking API returned invalid JSON: {e}")))
    }
}

#[async_trait]
impl ToolExecutor for BackendToolExecutor {
    #[instrument(skip_all, fields(tool = invocation.name()))]
    async fn execute(&self, invocation: &ToolInvocation) -> Value {
        match self.call(invocation).await {
            Ok(value) => {
                info!("Tool call completed");
                value
            }
            Err(e) => {
                warn!(error = %e, "Tool call failed");
                failure_result(&e)
            }
        }
    }
}
