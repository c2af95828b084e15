//! Tests for coordinate conversion

use super::*;

/// One hundredth of an arc-minute, the resolution of the APRS token.
const TOKEN_RESOLUTION: f64 = 1.0 / 6000.0;

#[test]
fn test_decode_latitude_north() {
    let lat = decode_latitude("5213.20N").unwrap();
    assert!((lat - (52.0 + 13.20 / 60.0)).abs() < 1e-9);
}

#[test]
fn test_decode_latitude_south_is_negative() {
    let lat = decode_latitude("3351.60S").unwrap();
    assert!((lat - -(33.0 + 51.60 / 60.0)).abs() < 1e-9);
}

#[test]
fn test_decode_longitude_uses_three_degree_digits() {
    let lon = decode_longitude("02100.00E").unwrap();
    assert!((lon - 21.0).abs() < 1e-9);

    let lon = decode_longitude("15112.30W").unwrap();
    assert!((lon - -(151.0 + 12.30 / 60.0)).abs() < 1e-9);
}

#[test]
fn test_decode_rejects_wrong_hemisphere() {
    assert_eq!(
        decode_latitude("5213.20E"),
        Err(CoordError::InvalidHemisphere('E'))
    );
    assert_eq!(
        decode_longitude("02100.00N"),
        Err(CoordError::InvalidHemisphere('N'))
    );
}

#[test]
fn test_decode_rejects_non_numeric_content() {
    assert!(matches!(
        decode_latitude("52AB.20N"),
        Err(CoordError::InvalidToken(_))
    ));
    // Position ambiguity replaces digits with spaces
    assert!(matches!(
        decode_latitude("52  .  N"),
        Err(CoordError::InvalidToken(_))
    ));
    assert!(matches!(decode_latitude("N"), Err(CoordError::InvalidToken(_))));
    assert!(matches!(decode_latitude(""), Err(CoordError::InvalidToken(_))));
}

#[test]
fn test_decode_rejects_out_of_range() {
    assert!(matches!(
        decode_latitude("9500.00N"),
        Err(CoordError::InvalidLatitude(_))
    ));
    assert!(matches!(
        decode_longitude("18100.00E"),
        Err(CoordError::InvalidLongitude(_))
    ));
}

#[test]
fn test_decode_position_zero_is_no_fix() {
    assert!(decode_position("0000.00N", "00000.00E").is_none());
    assert!(decode_position("5213.20N", "00000.00E").is_none());
    assert!(decode_position("0000.00N", "02100.00E").is_none());
}

#[test]
fn test_decode_position_valid() {
    let location = decode_position("5213.20N", "02100.00E").unwrap();
    assert!((location.latitude - 52.22).abs() < 1e-9);
    assert!((location.longitude - 21.0).abs() < 1e-9);
    assert!(location.altitude.is_none());
}

#[test]
fn test_decode_position_garbage_is_no_fix() {
    assert!(decode_position("garbage", "02100.00E").is_none());
    assert!(decode_position("5213.20N", "").is_none());
}

#[test]
fn test_encode_latitude_format() {
    assert_eq!(encode_latitude(52.22), "5213.20N");
    assert_eq!(encode_latitude(-33.86), "3351.60S");
    assert_eq!(encode_latitude(5.5), "0530.00N");
    assert_eq!(encode_latitude(0.0), "0000.00N");
}

#[test]
fn test_encode_longitude_format() {
    assert_eq!(encode_longitude(21.0), "02100.00E");
    assert_eq!(encode_longitude(-151.205), "15112.30W");
    assert_eq!(encode_longitude(7.25), "00715.00E");
}

#[test]
fn test_encode_never_emits_sixty_minutes() {
    let token = encode_latitude(10.999_999_9);
    assert_eq!(token, "1059.99N");
}

#[test]
fn test_roundtrip_across_globe() {
    let mut lat = -89.99;
    while lat <= 89.99 {
        let mut lon = -179.99;
        while lon <= 179.99 {
            let decoded_lat = decode_latitude(&encode_latitude(lat)).unwrap();
            let decoded_lon = decode_longitude(&encode_longitude(lon)).unwrap();

            assert!(
                (decoded_lat - lat).abs() <= TOKEN_RESOLUTION + 1e-9,
                "lat {} decoded as {}",
                lat,
                decoded_lat
            );
            assert!(
                (decoded_lon - lon).abs() <= TOKEN_RESOLUTION + 1e-9,
                "lon {} decoded as {}",
                lon,
                decoded_lon
            );
            lon += 7.3;
        }
        lat += 3.7;
    }
}
