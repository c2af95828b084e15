//! Field extractors for the balloon comment dialect.
//!
//! Each extractor looks for one letter-prefixed number and returns `None`
//! when its pattern does not match. A comment such as
//! `P123S8T-12V345F1N2O20FT-3ODO=1234km` carries:
//!
//! | Field          | Pattern            | Example  |
//! |----------------|--------------------|----------|
//! | frame          | `P<n>`             | `P123`   |
//! | satellites     | `S<n>`             | `S8`     |
//! | power          | `O<n>` (dflt 20)   | `O20`    |
//! | flight number  | `N<n>`             | `N2`     |
//! | time to fix    | `FT<±n>`           | `FT-3`   |
//! | temperature    | `T<±n>`, not `FT`  | `T-12`   |
//! | voltage        | `V<nnn>`           | `V345`   |
//! | frequency code | `F<n>`             | `F1`     |
//! | odometer       | `ODO=<n>km/kkm`    | `ODO=1234km` |

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::coord::{decode_position, Location, FEET_PER_METER};

/// Power reported when the comment has no `O` field.
pub const DEFAULT_POWER: u32 = 20;

fn capture<T: FromStr>(pattern: &Regex, text: &str) -> Option<T> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Frame counter, `P<n>`.
pub fn frame(comment: &str) -> Option<u32> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"P([0-9]+)").unwrap());
    capture(pattern, comment)
}

/// Satellites in view, `S<n>`.
pub fn satellites(comment: &str) -> Option<u32> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"S([0-9]+)").unwrap());
    capture(pattern, comment)
}

/// Transmit power, `O<n>`, [`DEFAULT_POWER`] when absent.
pub fn power(comment: &str) -> u32 {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"O([0-9]+)").unwrap());
    capture(pattern, comment).unwrap_or(DEFAULT_POWER)
}

/// Flight number, `N<n>`.
pub fn flight_number(comment: &str) -> Option<u32> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"N([0-9]+)").unwrap());
    capture(pattern, comment)
}

/// Seconds to GPS fix, `FT<±n>`.
pub fn time_to_fix(comment: &str) -> Option<i32> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"FT(-?[0-9]+)").unwrap());
    capture(pattern, comment)
}

/// Temperature in °C, `T<±n>` not preceded by `F`.
pub fn temperature(comment: &str) -> Option<i32> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"(?:^|[^F])T(-?[0-9]+)").unwrap());
    capture(pattern, comment)
}

/// Solar voltage in hundredths of a volt, `V` followed by exactly 3 digits.
pub fn voltage(comment: &str) -> Option<u32> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"V([0-9]{3})").unwrap());
    capture(pattern, comment)
}

/// Frequency table code, `F<n>`.
pub fn frequency_code(comment: &str) -> Option<u32> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"F([0-9]+)").unwrap());
    capture(pattern, comment)
}

/// Distance travelled in km, `ODO=<n>km` or `ODO=<n>kkm` (thousands).
pub fn odometer_km(comment: &str) -> Option<u64> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"ODO=([0-9]+)(k?)km").unwrap());

    let captures = pattern.captures(comment)?;
    let value: u64 = captures.get(1)?.as_str().parse().ok()?;
    let thousands = captures.get(2).is_some_and(|m| !m.as_str().is_empty());

    if thousands {
        value.checked_mul(1000)
    } else {
        Some(value)
    }
}

/// Altitude in metres from the `A=<feet>/` extension of the whole line.
pub fn altitude_m(line: &str) -> Option<f64> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"A=([0-9]+)/").unwrap());
    capture::<f64>(pattern, line).map(|feet| feet / FEET_PER_METER)
}

/// Receiving station: the path element right before the `:` that starts
/// the information field.
pub fn receiver(line: &str) -> Option<&str> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r",([a-zA-Z0-9-]+):.").unwrap());
    pattern
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Source callsign, everything before the first `>`.
pub fn source(line: &str) -> &str {
    line.split('>').next().unwrap_or(line)
}

/// Comment text, everything after the last `/`.
pub fn comment(line: &str) -> &str {
    line.rsplit('/').next().unwrap_or(line)
}

/// Decodes the position from an uncompressed `/HHMMSSh` report.
///
/// Takes the last segment after a `:` + data type byte, then the text after
/// the last `h` and before the first `O`, and splits it on `/` into the
/// latitude and longitude tokens. `None` means no usable fix.
pub fn position(line: &str) -> Option<Location> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r":.").unwrap());

    let info = pattern.split(line).last()?;
    let after_time = info.rsplit('h').next()?;
    let coordinates = after_time.split('O').next()?;

    let mut tokens = coordinates.split('/');
    let lat = tokens.next()?;
    let lon = tokens.next()?;
    decode_position(lat, lon)
}
