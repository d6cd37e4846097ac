//! Geographic proximity filtering
//!
//! Hospital locations arrive from the API in several historical shapes:
//! GeoJSON points, bare coordinate arrays, named latitude/longitude fields,
//! or a plain address string. [`resolve_coordinate`] normalizes them once at
//! the boundary so every downstream consumer only ever deals with
//! `Option<Coordinate>`. Descriptors that cannot be resolved are excluded
//! from distance-based filtering, never treated as an error.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default search radius for the "near me" filter.
pub const DEFAULT_NEARBY_RADIUS_KM: f64 = 50.0;

/// A WGS84 latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Location field as it appears on API payloads.
///
/// Variant order matters: GeoJSON points carry a `type` field and must be
/// tried before the bare coordinate-array shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationDescriptor {
    GeoJsonPoint {
        #[serde(rename = "type")]
        kind: String,
        /// `[lon, lat]`, per GeoJSON.
        coordinates: [f64; 2],
    },
    CoordinatePair {
        /// `[lon, lat]`, same ordering as the GeoJSON shape.
        coordinates: [f64; 2],
    },
    NamedFields {
        latitude: f64,
        longitude: f64,
    },
    Address(String),
}

impl LocationDescriptor {
    /// Free-text form, when the descriptor is an address string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            LocationDescriptor::Address(text) => Some(text),
            _ => None,
        }
    }
}

/// Great-circle distance between two coordinates in kilometres (haversine).
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// True when `b` lies within `radius_km` of `a`.
pub fn is_nearby(a: Coordinate, b: Coordinate, radius_km: f64) -> bool {
    distance_km(a, b) <= radius_km
}

/// Normalize a location descriptor to a single authoritative coordinate.
///
/// Address strings fall back to the city lookup table; anything that still
/// fails to resolve yields `None`.
pub fn resolve_coordinate(descriptor: &LocationDescriptor) -> Option<Coordinate> {
    match descriptor {
        LocationDescriptor::GeoJsonPoint { coordinates, .. }
        | LocationDescriptor::CoordinatePair { coordinates } => {
            Some(Coordinate::new(coordinates[1], coordinates[0]))
        }
        LocationDescriptor::NamedFields {
            latitude,
            longitude,
        } => Some(Coordinate::new(*latitude, *longitude)),
        LocationDescriptor::Address(address) => city_coordinates(address),
    }
}

/// City fallback table for address strings without numeric coordinates.
static CITY_COORDINATES: &[(&str, Coordinate)] = &[
    ("lahore", Coordinate { lat: 31.5204, lon: 74.3587 }),
    ("karachi", Coordinate { lat: 24.8607, lon: 67.0011 }),
    ("islamabad", Coordinate { lat: 33.6844, lon: 73.0479 }),
    ("rawalpindi", Coordinate { lat: 33.5651, lon: 73.0169 }),
    ("faisalabad", Coordinate { lat: 31.4504, lon: 73.135 }),
    ("multan", Coordinate { lat: 30.1575, lon: 71.5249 }),
    ("peshawar", Coordinate { lat: 34.0151, lon: 71.5249 }),
    ("quetta", Coordinate { lat: 30.1798, lon: 66.975 }),
    ("sialkot", Coordinate { lat: 32.4945, lon: 74.5229 }),
    ("gujranwala", Coordinate { lat: 32.1877, lon: 74.1945 }),
    ("bahawalpur", Coordinate { lat: 29.3956, lon: 71.6836 }),
    ("hyderabad", Coordinate { lat: 25.396, lon: 68.3578 }),
    ("sukkur", Coordinate { lat: 27.7052, lon: 68.8574 }),
    ("abbottabad", Coordinate { lat: 34.1463, lon: 73.2117 }),
    ("mardan", Coordinate { lat: 34.1982, lon: 72.0459 }),
    ("okara", Coordinate { lat: 30.8138, lon: 73.445 }),
    ("rahimyarkhan", Coordinate { lat: 28.4202, lon: 70.2956 }),
    ("jhelum", Coordinate { lat: 32.9408, lon: 73.7276 }),
    ("sargodha", Coordinate { lat: 32.0836, lon: 72.6711 }),
    ("mirpur", Coordinate { lat: 33.1478, lon: 73.751 }),
];

/// Look up a known city by case-insensitive substring match on an address.
pub fn city_coordinates(address: &str) -> Option<Coordinate> {
    let address = address.to_lowercase();
    CITY_COORDINATES
        .iter()
        .find(|(city, _)| address.contains(city))
        .map(|(_, coordinate)| *coordinate)
}
