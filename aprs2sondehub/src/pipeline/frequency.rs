//! Radio profiles behind the `F<n>` comment code.

/// Modulation reported when the packet carries no known frequency code.
pub const DEFAULT_MODULATION: &str = "APRS";

const LORA_APRS: &str = "LoRa APRS";
const AFSK_APRS: &str = "AFSK APRS";

/// Frequency, modulation and (for LoRa) symbol rate for one code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadioProfile {
    /// Carrier frequency in MHz.
    pub frequency_mhz: f64,
    pub modulation: &'static str,
    /// LoRa symbol rate in baud.
    pub symbol_rate: Option<u32>,
}

impl RadioProfile {
    const fn lora(frequency_mhz: f64, symbol_rate: u32) -> Self {
        Self {
            frequency_mhz,
            modulation: LORA_APRS,
            symbol_rate: Some(symbol_rate),
        }
    }

    const fn afsk(frequency_mhz: f64) -> Self {
        Self {
            frequency_mhz,
            modulation: AFSK_APRS,
            symbol_rate: None,
        }
    }
}

/// Looks up a frequency code; codes outside 1..=11 are unmapped.
pub fn radio_profile(code: u32) -> Option<RadioProfile> {
    let profile = match code {
        1 => RadioProfile::lora(433.775, 300),
        2 => RadioProfile::lora(434.855, 1200),
        3 => RadioProfile::lora(439.9125, 300),
        4 => RadioProfile::afsk(144.8),
        5 => RadioProfile::afsk(144.39),
        6 => RadioProfile::afsk(145.57),
        7 => RadioProfile::afsk(144.64),
        8 => RadioProfile::afsk(144.66),
        9 => RadioProfile::afsk(145.525),
        10 => RadioProfile::afsk(144.575),
        11 => RadioProfile::afsk(145.175),
        _ => return None,
    };
    Some(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lora_codes() {
        let profile = radio_profile(2).unwrap();
        assert_eq!(profile.frequency_mhz, 434.855);
        assert_eq!(profile.modulation, "LoRa APRS");
        assert_eq!(profile.symbol_rate, Some(1200));

        assert_eq!(radio_profile(1).unwrap().symbol_rate, Some(300));
        assert_eq!(radio_profile(3).unwrap().frequency_mhz, 439.9125);
    }

    #[test]
    fn test_afsk_codes() {
        for code in 4..=11 {
            let profile = radio_profile(code).unwrap();
            assert_eq!(profile.modulation, "AFSK APRS");
            assert_eq!(profile.symbol_rate, None);
            assert!((144.0..146.0).contains(&profile.frequency_mhz));
        }
        assert_eq!(radio_profile(5).unwrap().frequency_mhz, 144.39);
    }

    #[test]
    fn test_unmapped_codes() {
        assert!(radio_profile(0).is_none());
        assert!(radio_profile(12).is_none());
    }
}
