//! Coordinate conversion module
//!
//! Converts between the APRS degree/minute position tokens
//! (`5213.20N`, `02100.00E`) and decimal degrees.

mod types;

#[cfg(test)]
mod tests;

pub use types::{
    CoordError, Location, FEET_PER_METER, LAT_DEGREE_DIGITS, LON_DEGREE_DIGITS, MAX_LAT, MAX_LON,
    MIN_LAT, MIN_LON,
};

/// Decodes an APRS latitude token such as `5213.20N`.
///
/// The last character is the hemisphere (`N`/`S`), the first two digits are
/// degrees and the remainder is decimal minutes.
pub fn decode_latitude(token: &str) -> Result<f64, CoordError> {
    let value = decode_token(token, LAT_DEGREE_DIGITS, 'N', 'S')?;
    if !(MIN_LAT..=MAX_LAT).contains(&value) {
        return Err(CoordError::InvalidLatitude(value));
    }
    Ok(value)
}

/// Decodes an APRS longitude token such as `02100.00E`.
///
/// Same layout as latitude but with a three digit degree field and `E`/`W`.
pub fn decode_longitude(token: &str) -> Result<f64, CoordError> {
    let value = decode_token(token, LON_DEGREE_DIGITS, 'E', 'W')?;
    if !(MIN_LON..=MAX_LON).contains(&value) {
        return Err(CoordError::InvalidLongitude(value));
    }
    Ok(value)
}

/// Decodes a latitude/longitude token pair into a fix.
///
/// Returns `None` when either token fails to decode or when either
/// component is exactly zero, which trackers emit while they have no fix.
pub fn decode_position(lat_token: &str, lon_token: &str) -> Option<Location> {
    let latitude = decode_latitude(lat_token).ok()?;
    let longitude = decode_longitude(lon_token).ok()?;

    if latitude == 0.0 || longitude == 0.0 {
        return None;
    }

    Some(Location::new(latitude, longitude))
}

/// Encodes decimal degrees as an APRS latitude token (`DDMM.mmN`).
///
/// Minutes are truncated to hundredths.
pub fn encode_latitude(latitude: f64) -> String {
    encode_token(latitude, LAT_DEGREE_DIGITS, 'N', 'S')
}

/// Encodes decimal degrees as an APRS longitude token (`DDDMM.mmE`).
pub fn encode_longitude(longitude: f64) -> String {
    encode_token(longitude, LON_DEGREE_DIGITS, 'E', 'W')
}

fn decode_token(
    token: &str,
    degree_digits: usize,
    positive: char,
    negative: char,
) -> Result<f64, CoordError> {
    let token = token.trim();
    let invalid = || CoordError::InvalidToken(token.to_string());

    if !token.is_ascii() || token.len() <= degree_digits + 1 {
        return Err(invalid());
    }

    let (body, hemisphere) = token.split_at(token.len() - 1);
    let hemisphere = hemisphere.chars().next().ok_or_else(invalid)?;
    let sign = if hemisphere == positive {
        1.0
    } else if hemisphere == negative {
        -1.0
    } else {
        return Err(CoordError::InvalidHemisphere(hemisphere));
    };

    let (degrees, minutes) = body.split_at(degree_digits);
    if !degrees.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let degrees: f64 = degrees.parse().map_err(|_| invalid())?;
    let minutes: f64 = minutes.parse().map_err(|_| invalid())?;
    if !minutes.is_finite() || minutes < 0.0 {
        return Err(invalid());
    }

    Ok(sign * (degrees + minutes / 60.0))
}

fn encode_token(value: f64, degree_digits: usize, positive: char, negative: char) -> String {
    let hemisphere = if value < 0.0 { negative } else { positive };
    let magnitude = value.abs();
    let degrees = magnitude.trunc();

    // Hundredths of a minute, truncated; the epsilon absorbs float noise
    // such as 0.25 * 6000 landing on 1499.9999.
    let hundredths = ((magnitude - degrees) * 6000.0 + 1e-6).floor().min(5999.0) as u32;

    format!(
        "{:0width$}{:02}.{:02}{}",
        degrees as u32,
        hundredths / 100,
        hundredths % 100,
        hemisphere,
        width = degree_digits
    )
}
