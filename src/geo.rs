//! Geodesic calculations for search areas and route distances
//!
//! Bounding boxes use a flat nautical-mile-to-degree factor with a cosine
//! correction on the longitude axis only. Distances use the haversine
//! formula on a spherical Earth. Both are approximations kept stable so that
//! results match the values clients already rely on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AdsbError;

/// 1 nautical mile is treated as this many degrees on both axes.
pub const NM_TO_DEGREES: f64 = 0.0167;
/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const KM_TO_NAUTICAL_MILES: f64 = 0.539957;
pub const KM_TO_STATUTE_MILES: f64 = 0.621371;
/// Centers closer than this to a pole are rejected by [`bounding_box`].
pub const POLE_EPSILON_DEG: f64 = 1e-6;

/// A point on the globe in decimal degrees.
///
/// Always finite and within ±90° / ±180°: the only ways in are
/// [`GeoPoint::new`], `FromStr` and deserialization, all of which validate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = AdsbError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        GeoPoint::new(raw.latitude, raw.longitude)
    }
}

impl GeoPoint {
    /// Create a validated point
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, AdsbError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AdsbError::invalid_argument(format!(
                "Latitude must be between -90 and 90, got: {latitude}"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AdsbError::invalid_argument(format!(
                "Longitude must be between -180 and 180, got: {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl FromStr for GeoPoint {
    type Err = AdsbError;

    /// Parse `"lat,lon"`, whitespace around either part allowed
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s.split_once(',').ok_or_else(|| {
            AdsbError::invalid_argument(format!(
                "Expected coordinates as 'lat,lon' (e.g. \"37.7749,-122.4194\"), got: '{s}'"
            ))
        })?;
        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| AdsbError::invalid_argument(format!("Invalid latitude: '{}'", lat.trim())))?;
        let lon = lon
            .trim()
            .parse::<f64>()
            .map_err(|_| AdsbError::invalid_argument(format!("Invalid longitude: '{}'", lon.trim())))?;
        GeoPoint::new(lat, lon)
    }
}

/// Rectangular lat/lon search region.
///
/// Bounds are not clamped: a box around a high-latitude center may extend
/// past ±90° or ±180°.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    #[must_use]
    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    #[must_use]
    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// True if the point lies inside or on the edge of the box
    #[must_use]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.latitude)
            && (self.min_lon..=self.max_lon).contains(&point.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    #[default]
    NauticalMiles,
    Kilometers,
    StatuteMiles,
}

impl DistanceUnit {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceUnit::NauticalMiles => "nautical_miles",
            DistanceUnit::Kilometers => "kilometers",
            DistanceUnit::StatuteMiles => "statute_miles",
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceUnit {
    type Err = AdsbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nautical_miles" | "nm" => Ok(DistanceUnit::NauticalMiles),
            "kilometers" | "km" => Ok(DistanceUnit::Kilometers),
            "statute_miles" | "mi" => Ok(DistanceUnit::StatuteMiles),
            other => Err(AdsbError::invalid_argument(format!(
                "Invalid unit '{other}'. Must be one of: nautical_miles, kilometers, statute_miles"
            ))),
        }
    }
}

/// Conversion factors used by [`GeodesicCalculator`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodesicConstants {
    pub nm_to_degrees: f64,
    pub earth_radius_km: f64,
    pub km_to_nautical_miles: f64,
    pub km_to_statute_miles: f64,
}

impl Default for GeodesicConstants {
    fn default() -> Self {
        Self {
            nm_to_degrees: NM_TO_DEGREES,
            earth_radius_km: EARTH_RADIUS_KM,
            km_to_nautical_miles: KM_TO_NAUTICAL_MILES,
            km_to_statute_miles: KM_TO_STATUTE_MILES,
        }
    }
}

/// Stateless geodesic math over a fixed set of constants
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeodesicCalculator {
    constants: GeodesicConstants,
}

impl GeodesicCalculator {
    #[must_use]
    pub fn new(constants: GeodesicConstants) -> Self {
        Self { constants }
    }

    #[must_use]
    pub fn constants(&self) -> &GeodesicConstants {
        &self.constants
    }

    /// Search rectangle around `center` for a radius in nautical miles.
    ///
    /// The latitude offset is the same at every latitude; only the longitude
    /// offset is widened by `1 / cos(lat)`. Centers at a pole are rejected
    /// since that widening diverges there.
    pub fn bounding_box(&self, center: GeoPoint, radius_nm: f64) -> Result<BoundingBox, AdsbError> {
        if !radius_nm.is_finite() || radius_nm <= 0.0 {
            return Err(AdsbError::invalid_argument(format!(
                "Radius must be a positive number of nautical miles, got: {radius_nm}"
            )));
        }
        if 90.0 - center.latitude.abs() < POLE_EPSILON_DEG {
            return Err(AdsbError::invalid_argument(format!(
                "Cannot build a bounding box centered at a pole (latitude {})",
                center.latitude
            )));
        }

        let radius_deg = radius_nm * self.constants.nm_to_degrees;
        let lon_adjustment = radius_deg / center.latitude.to_radians().cos();

        Ok(BoundingBox {
            min_lat: center.latitude - radius_deg,
            max_lat: center.latitude + radius_deg,
            min_lon: center.longitude - lon_adjustment,
            max_lon: center.longitude + lon_adjustment,
        })
    }

    /// Haversine distance between two points
    #[must_use]
    pub fn great_circle_distance(&self, a: GeoPoint, b: GeoPoint, unit: DistanceUnit) -> f64 {
        let lat1 = a.latitude.to_radians();
        let lon1 = a.longitude.to_radians();
        let lat2 = b.latitude.to_radians();
        let lon2 = b.longitude.to_radians();

        let dlat = lat2 - lat1;
        let dlon = lon2 - lon1;

        let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        // rounding can push h a hair above 1 for antipodal points
        let c = 2.0 * h.clamp(0.0, 1.0).sqrt().asin();

        let distance_km = self.constants.earth_radius_km * c;

        match unit {
            DistanceUnit::NauticalMiles => distance_km * self.constants.km_to_nautical_miles,
            DistanceUnit::StatuteMiles => distance_km * self.constants.km_to_statute_miles,
            DistanceUnit::Kilometers => distance_km,
        }
    }

    /// Hours needed to cover `distance_nm` at a constant ground speed
    pub fn estimate_flight_time(&self, distance_nm: f64, speed_knots: f64) -> Result<f64, AdsbError> {
        if !speed_knots.is_finite() || speed_knots <= 0.0 {
            return Err(AdsbError::invalid_argument(format!(
                "Average speed must be a positive number of knots, got: {speed_knots}"
            )));
        }
        if !distance_nm.is_finite() || distance_nm < 0.0 {
            return Err(AdsbError::invalid_argument(format!(
                "Distance must be a non-negative number of nautical miles, got: {distance_nm}"
            )));
        }
        Ok(distance_nm / speed_knots)
    }
}

/// [`GeodesicCalculator::bounding_box`] with the default constants
pub fn bounding_box(center: GeoPoint, radius_nm: f64) -> Result<BoundingBox, AdsbError> {
    GeodesicCalculator::default().bounding_box(center, radius_nm)
}

/// [`GeodesicCalculator::great_circle_distance`] with the default constants
#[must_use]
pub fn great_circle_distance(a: GeoPoint, b: GeoPoint, unit: DistanceUnit) -> f64 {
    GeodesicCalculator::default().great_circle_distance(a, b, unit)
}

/// [`GeodesicCalculator::estimate_flight_time`] with the default constants
pub fn estimate_flight_time(distance_nm: f64, speed_knots: f64) -> Result<f64, AdsbError> {
    GeodesicCalculator::default().estimate_flight_time(distance_nm, speed_knots)
}

/// Round half away from zero to `decimals` places
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}
