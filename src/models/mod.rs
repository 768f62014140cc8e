//! Data models for the ADS-B tracker
//!
//! - Aircraft: live state vectors and their derived units
//! - Flight: historical flight records and timestamp handling

pub mod aircraft;
pub mod flight;

pub use aircraft::{AircraftState, IdentifierType};
pub use flight::FlightRecord;
