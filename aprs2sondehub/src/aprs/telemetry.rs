//! Outbound APRS frames: status beacon and the compact telemetry format.
//!
//! Telemetry channels are sent as 8-bit analog values. The `EQNS` frame
//! tells receivers how to turn them back into physical units, so the
//! scaling functions here and the coefficients in [`initial_frames`] must
//! stay in step:
//!
//! | Channel | Quantity          | Raw value              | EQNS (a,b,c)   |
//! |---------|-------------------|------------------------|----------------|
//! | A1      | Temperature (°C)  | `round((T+80)/0.43)`   | `0,0.43,-80`   |
//! | A2      | Solar voltage (V) | `round(V*10)`          | `0,0.1,0`      |
//! | A3      | Sun elevation (°) | `E*255/80`, 1 decimal  | `0,0.3137,0`   |

/// Destination and path used for every frame we inject into APRS-IS.
pub const FRAME_PATH: &str = "APZHUB,NOHUB,TCPIP,qAC";

/// Addressee field width for `:ADDRESSEE:` message frames.
const ADDRESSEE_WIDTH: usize = 9;

/// Upper bound of the sun elevation channel, in degrees.
const MAX_ELEVATION_DEG: f64 = 80.0;

/// Scales a temperature in °C into the A1 channel.
pub fn scale_temperature(celsius: f64) -> u8 {
    clamp_channel(((celsius + 80.0) / 0.43).round())
}

/// Scales a voltage into the A2 channel (tenths of a volt).
pub fn scale_voltage(volts: f64) -> u8 {
    clamp_channel((volts * 10.0).round())
}

/// Scales a sun elevation in degrees into the A3 channel.
///
/// Elevation is clamped to 0..=80 degrees first; the result keeps one
/// decimal place.
pub fn scale_elevation(degrees: f64) -> f64 {
    let elevation = degrees.max(0.0).min(MAX_ELEVATION_DEG);
    let scaled = elevation * (255.0 / MAX_ELEVATION_DEG);
    ((scaled * 10.0).round() / 10.0).max(0.0).min(255.0)
}

fn clamp_channel(value: f64) -> u8 {
    value.max(0.0).min(255.0) as u8
}

/// Right-pads a callsign with spaces to the addressee width.
pub fn pad_callsign(callsign: &str) -> String {
    format!("{:<width$}", callsign, width = ADDRESSEE_WIDTH)
}

/// Status beacon (`>` data type) pointing at the tracker page.
pub fn status_frame(callsign: &str, status: &str) -> String {
    format!("{}>{}:>{}", callsign, FRAME_PATH, status)
}

/// The PARM, UNIT, EQNS and BITS metadata frames, in send order.
pub fn initial_frames(callsign: &str) -> [String; 4] {
    let addressee = pad_callsign(callsign);
    let header = format!("{}>{}::{}:", callsign, FRAME_PATH, addressee);

    [
        format!("{}PARM.Temp,Vsolar,SunElev", header),
        format!("{}UNIT.degC,Volts,deg", header),
        format!("{}EQNS.0,0.43,-80,0,0.1,0,0,0.3137,0", header),
        format!("{}BITS.11110000,BALLOON", header),
    ]
}

/// Encodes one telemetry frame.
///
/// A missing temperature or voltage is sent as a raw zero on its channel.
pub fn telemetry_frame(
    callsign: &str,
    sequence: u8,
    temperature: Option<f64>,
    voltage: Option<f64>,
    elevation_deg: f64,
) -> String {
    let temperature = temperature.map(scale_temperature).unwrap_or(0);
    let voltage = voltage.map(scale_voltage).unwrap_or(0);
    let elevation = scale_elevation(elevation_deg);

    format!(
        "{}>{}:T#{:04},{},{},{},000,000,11100000",
        callsign, FRAME_PATH, sequence, temperature, voltage, elevation
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_temperature() {
        assert_eq!(scale_temperature(-80.0), 0);
        assert_eq!(scale_temperature(0.0), 186);
        assert_eq!(scale_temperature(-40.0), 93);
        assert_eq!(scale_temperature(-200.0), 0);
        assert_eq!(scale_temperature(100.0), 255);
    }

    #[test]
    fn test_scale_voltage() {
        assert_eq!(scale_voltage(3.3), 33);
        assert_eq!(scale_voltage(0.0), 0);
        assert_eq!(scale_voltage(-1.0), 0);
        assert_eq!(scale_voltage(30.0), 255);
    }

    #[test]
    fn test_scale_elevation() {
        assert_eq!(scale_elevation(0.0), 0.0);
        assert_eq!(scale_elevation(-12.0), 0.0);
        assert_eq!(scale_elevation(80.0), 255.0);
        assert_eq!(scale_elevation(89.0), 255.0);
        assert_eq!(scale_elevation(40.0), 127.5);
        assert_eq!(scale_elevation(10.0), 31.9);
    }

    #[test]
    fn test_scale_elevation_nan_is_zero() {
        assert_eq!(scale_elevation(f64::NAN), 0.0);
    }

    #[test]
    fn test_pad_callsign() {
        assert_eq!(pad_callsign("SQ2IPS-11"), "SQ2IPS-11");
        assert_eq!(pad_callsign("N0CALL"), "N0CALL   ");
        assert_eq!(pad_callsign("LONGCALL-15"), "LONGCALL-15");
    }

    #[test]
    fn test_status_frame() {
        assert_eq!(
            status_frame("SQ2IPS-11", "https://amateur.sondehub.org/SQ2IPS-11"),
            "SQ2IPS-11>APZHUB,NOHUB,TCPIP,qAC:>https://amateur.sondehub.org/SQ2IPS-11"
        );
    }

    #[test]
    fn test_initial_frames() {
        let frames = initial_frames("N0CALL");
        assert_eq!(
            frames[0],
            "N0CALL>APZHUB,NOHUB,TCPIP,qAC::N0CALL   :PARM.Temp,Vsolar,SunElev"
        );
        assert_eq!(
            frames[1],
            "N0CALL>APZHUB,NOHUB,TCPIP,qAC::N0CALL   :UNIT.degC,Volts,deg"
        );
        assert_eq!(
            frames[2],
            "N0CALL>APZHUB,NOHUB,TCPIP,qAC::N0CALL   :EQNS.0,0.43,-80,0,0.1,0,0,0.3137,0"
        );
        assert_eq!(
            frames[3],
            "N0CALL>APZHUB,NOHUB,TCPIP,qAC::N0CALL   :BITS.11110000,BALLOON"
        );
    }

    #[test]
    fn test_telemetry_frame() {
        let frame = telemetry_frame("SQ2IPS-11", 7, Some(-40.0), Some(3.3), 40.0);
        assert_eq!(
            frame,
            "SQ2IPS-11>APZHUB,NOHUB,TCPIP,qAC:T#0007,93,33,127.5,000,000,11100000"
        );
    }

    #[test]
    fn test_telemetry_frame_missing_channels() {
        let frame = telemetry_frame("SQ2IPS-11", 255, None, None, 80.0);
        assert_eq!(
            frame,
            "SQ2IPS-11>APZHUB,NOHUB,TCPIP,qAC:T#0255,0,0,255,000,000,11100000"
        );
    }
}
