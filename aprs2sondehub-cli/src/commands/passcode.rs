//! Passcode command - print the APRS-IS passcode for a callsign.

use aprs2sondehub::aprs::passcode;

use crate::error::CliError;

/// Print the passcode for `callsign`; any SSID is ignored.
pub fn run(callsign: &str) -> Result<(), CliError> {
    println!("{}", passcode(callsign));
    Ok(())
}
