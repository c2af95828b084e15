//! Solar position for a balloon fix.
//!
//! Low-precision solar ephemeris (about one arc-minute over a few decades
//! around J2000), good enough for deciding how much light reaches a solar
//! powered tracker. The elevation is measured from the observer's apparent
//! horizon, which drops below the astronomical horizon as the balloon
//! climbs.

use std::f64::consts::PI;

use chrono::{DateTime, Utc};

const RAD: f64 = PI / 180.0;

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_008.8;

const DAY_MS: f64 = 1000.0 * 60.0 * 60.0 * 24.0;
const J1970: f64 = 2_440_588.0;
const J2000: f64 = 2_451_545.0;

/// Obliquity of the ecliptic at J2000.
const OBLIQUITY: f64 = RAD * 23.4397;

/// Perihelion of the Earth.
const PERIHELION: f64 = RAD * 102.9372;

/// Solar elevation above the observer's apparent horizon, in radians.
///
/// `height_m` is the observer height above the reference sphere; negative
/// heights are treated as sea level.
pub fn solar_elevation(time: DateTime<Utc>, lat: f64, lon: f64, height_m: f64) -> f64 {
    let lw = RAD * -lon;
    let phi = RAD * lat;
    let d = days_since_j2000(time);

    let (dec, ra) = sun_coords(d);
    let h = sidereal_time(d, lw) - ra;

    let altitude = (phi.sin() * dec.sin() + phi.cos() * dec.cos() * h.cos()).asin();
    altitude + horizon_dip(height_m)
}

/// Solar elevation in degrees.
pub fn solar_elevation_degrees(time: DateTime<Utc>, lat: f64, lon: f64, height_m: f64) -> f64 {
    solar_elevation(time, lat, lon, height_m).to_degrees()
}

/// Depression of the apparent horizon seen from `height_m` above the sphere.
fn horizon_dip(height_m: f64) -> f64 {
    let height = height_m.max(0.0);
    (EARTH_RADIUS_M / (EARTH_RADIUS_M + height)).acos()
}

fn days_since_j2000(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / DAY_MS - 0.5 + J1970 - J2000
}

fn solar_mean_anomaly(d: f64) -> f64 {
    RAD * (357.5291 + 0.985_600_28 * d)
}

fn ecliptic_longitude(m: f64) -> f64 {
    // Equation of center
    let c = RAD * (1.9148 * m.sin() + 0.02 * (2.0 * m).sin() + 0.0003 * (3.0 * m).sin());
    m + c + PERIHELION + PI
}

/// Declination and right ascension for ecliptic latitude zero.
fn sun_coords(d: f64) -> (f64, f64) {
    let l = ecliptic_longitude(solar_mean_anomaly(d));
    let declination = (l.sin() * OBLIQUITY.sin()).asin();
    let right_ascension = (l.sin() * OBLIQUITY.cos()).atan2(l.cos());
    (declination, right_ascension)
}

fn sidereal_time(d: f64, lw: f64) -> f64 {
    RAD * (280.16 + 360.985_623_5 * d) - lw
}
