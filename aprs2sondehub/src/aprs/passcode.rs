//! APRS-IS login passcode and login line.

/// Seed of the APRS-IS passcode hash.
const PASSCODE_SEED: u32 = 0x73E2;

/// Only the first ten characters of the base callsign are hashed.
const PASSCODE_CALLSIGN_LEN: usize = 10;

/// Computes the APRS-IS passcode for a login callsign.
///
/// The SSID suffix is stripped, the first ten characters are upper-cased
/// and folded as big-endian 16-bit pairs into the seed with XOR. The
/// result is masked to 15 bits.
pub fn passcode(callsign: &str) -> u16 {
    let base = callsign.split('-').next().unwrap_or_default();
    let codes: Vec<u32> = base
        .chars()
        .take(PASSCODE_CALLSIGN_LEN)
        .flat_map(char::to_uppercase)
        .map(|c| c as u32)
        .collect();

    let mut hash = PASSCODE_SEED;
    for pair in codes.chunks(2) {
        hash ^= pair[0] << 8;
        if let Some(&low) = pair.get(1) {
            hash ^= low;
        }
    }

    (hash & 0x7FFF) as u16
}

/// Builds the login line sent right after connecting.
///
/// The budlist filter (`b/CALL1/CALL2`) limits the feed to the given source
/// callsigns. The line is CRLF terminated.
pub fn login_line(callsign: &str, software: &str, version: &str, filter: &[String]) -> String {
    format!(
        "user {} pass {} vers {} {} filter b/{}\r\n",
        callsign,
        passcode(callsign),
        software,
        version,
        filter.join("/")
    )
}
