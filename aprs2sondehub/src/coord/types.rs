//! Coordinate type definitions

use std::fmt;

/// Valid latitude range
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Width of the degree field in an APRS latitude token (`DDMM.mmN`).
pub const LAT_DEGREE_DIGITS: usize = 2;

/// Width of the degree field in an APRS longitude token (`DDDMM.mmE`).
pub const LON_DEGREE_DIGITS: usize = 3;

/// Feet per meter, as used by APRS `A=` altitude extensions.
pub const FEET_PER_METER: f64 = 3.281;

/// A geographic fix.
///
/// Altitude is optional because a packet can carry a position without an
/// `A=` altitude extension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees, negative south
    pub latitude: f64,
    /// Longitude in decimal degrees, negative west
    pub longitude: f64,
    /// Altitude in meters
    pub altitude: Option<f64>,
}

impl Location {
    /// Creates a location without altitude.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
        }
    }

    /// Returns a copy with the given altitude in meters.
    pub fn with_altitude(mut self, altitude: Option<f64>) -> Self {
        self.altitude = altitude;
        self
    }
}

/// Errors that can occur while decoding APRS coordinate tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Token is too short or contains non-numeric degree/minute content
    InvalidToken(String),
    /// Hemisphere letter is not one of the expected pair
    InvalidHemisphere(char),
    /// Decoded latitude is outside -90.0 to 90.0
    InvalidLatitude(f64),
    /// Decoded longitude is outside -180.0 to 180.0
    InvalidLongitude(f64),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidToken(token) => {
                write!(f, "Invalid coordinate token: '{}'", token)
            }
            CoordError::InvalidHemisphere(c) => write!(f, "Invalid hemisphere letter: '{}'", c),
            CoordError::InvalidLatitude(lat) => {
                write!(
                    f,
                    "Invalid latitude: {} (must be between {} and {})",
                    lat, MIN_LAT, MAX_LAT
                )
            }
            CoordError::InvalidLongitude(lon) => {
                write!(
                    f,
                    "Invalid longitude: {} (must be between {} and {})",
                    lon, MIN_LON, MAX_LON
                )
            }
        }
    }
}

impl std::error::Error for CoordError {}
