//! Per-key "at most once per window" gates.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Remembers when each key last passed and refuses it again inside the
/// window.
#[derive(Debug)]
pub(crate) struct Throttle {
    window: Duration,
    last: HashMap<String, DateTime<Utc>>,
}

impl Throttle {
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            window,
            last: HashMap::new(),
        }
    }

    /// Returns `true` and stamps `now` if `key` has not passed within the
    /// window. A stamp in the future counts as inside the window.
    pub(crate) fn try_pass(&mut self, key: &str, now: DateTime<Utc>) -> bool {
        if let Some(last) = self.last.get(key) {
            let within = match (now - *last).to_std() {
                Ok(elapsed) => elapsed < self.window,
                Err(_) => true,
            };
            if within {
                return false;
            }
        }

        self.last.insert(key.to_string(), now);
        true
    }
}

/// Outbound telemetry state, guarded by a single lock.
#[derive(Debug)]
pub(crate) struct TelemetryState {
    pub(crate) throttle: Throttle,
    sequences: HashMap<String, u8>,
    initialized: HashSet<String>,
}

impl TelemetryState {
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            throttle: Throttle::new(window),
            sequences: HashMap::new(),
            initialized: HashSet::new(),
        }
    }

    /// `true` exactly once per callsign.
    pub(crate) fn mark_initialized(&mut self, callsign: &str) -> bool {
        self.initialized.insert(callsign.to_string())
    }

    /// Advances and returns the callsign's sequence: 1, 2, ..., 255, 0, 1, ...
    pub(crate) fn next_sequence(&mut self, callsign: &str) -> u8 {
        let sequence = self.sequences.entry(callsign.to_string()).or_insert(0);
        *sequence = sequence.wrapping_add(1);
        *sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_throttle_window() {
        let mut throttle = Throttle::new(Duration::from_secs(30));

        assert!(throttle.try_pass("R1", at(0)));
        assert!(!throttle.try_pass("R1", at(10)));
        assert!(!throttle.try_pass("R1", at(29)));
        assert!(throttle.try_pass("R1", at(30)));
        assert!(!throttle.try_pass("R1", at(45)));
    }

    #[test]
    fn test_throttle_keys_are_independent() {
        let mut throttle = Throttle::new(Duration::from_secs(30));
        assert!(throttle.try_pass("R1", at(0)));
        assert!(throttle.try_pass("R2", at(1)));
        assert!(!throttle.try_pass("R1", at(2)));
    }

    #[test]
    fn test_clock_going_backwards_stays_throttled() {
        let mut throttle = Throttle::new(Duration::from_secs(30));
        assert!(throttle.try_pass("R1", at(100)));
        assert!(!throttle.try_pass("R1", at(0)));
    }

    #[test]
    fn test_sequence_wraps() {
        let mut state = TelemetryState::new(Duration::from_secs(30));
        let sequence: Vec<u8> = (0..257).map(|_| state.next_sequence("N0CALL")).collect();

        assert_eq!(sequence[0], 1);
        assert_eq!(sequence[254], 255);
        assert_eq!(sequence[255], 0);
        assert_eq!(sequence[256], 1);
        assert_eq!(state.next_sequence("OTHER"), 1);
    }

    #[test]
    fn test_initialized_once() {
        let mut state = TelemetryState::new(Duration::from_secs(30));
        assert!(state.mark_initialized("N0CALL"));
        assert!(!state.mark_initialized("N0CALL"));
        assert!(state.mark_initialized("N1CALL"));
    }
}
