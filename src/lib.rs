//! `adsb-tracker` - Live ADS-B flight tracking over HTTP
//!
//! This library provides geodesic calculations, an `OpenSky` Network client,
//! the tracking operations built on top of it, the JSON API serving them and
//! a conversational agent that answers questions through that API.

pub mod agent;
pub mod api;
pub mod config;
pub mod error;
pub mod geo;
pub mod models;
pub mod opensky;
pub mod telemetry;
pub mod tracking;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use config::AdsbConfig;
pub use error::{AdsbError, ErrorKind};
pub use geo::{BoundingBox, DistanceUnit, GeoPoint, GeodesicCalculator, GeodesicConstants};
pub use models::{AircraftState, FlightRecord, IdentifierType};
pub use opensky::{FlightDataProvider, OpenSkyClient, StateQuery};
pub use tracking::TrackingService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AdsbError>;
