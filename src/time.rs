//! Time-of-day values exchanged as `HH:MM` text.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A wall-clock time stored in `time` columns and rendered as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(NaiveTime);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time '{0}' (expected HH:MM, or HH:MM:SS with zero seconds)")]
pub struct ParseClockTimeError(String);

impl ClockTime {
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(ClockTime)
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }
}

impl From<NaiveTime> for ClockTime {
    fn from(t: NaiveTime) -> Self {
        ClockTime(t)
    }
}

impl FromStr for ClockTime {
    type Err = ParseClockTimeError;

    /// Minute precision only: seconds other than `00` are rejected rather than dropped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        NaiveTime::parse_from_str(s, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
            .ok()
            .filter(|t| t.second() == 0)
            .map(ClockTime)
            .ok_or_else(|| ParseClockTimeError(s.to_string()))
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_forms() {
        let short: ClockTime = "09:30".parse().unwrap();
        let long: ClockTime = "09:30:00".parse().unwrap();
        assert_eq!(short, long);
        assert_eq!(short, ClockTime::from_hm(9, 30).unwrap());
    }

    #[test]
    fn renders_without_seconds() {
        let t = ClockTime::from(NaiveTime::from_hms_opt(14, 5, 0).unwrap());
        assert_eq!(t.to_string(), "14:05");
        assert_eq!(serde_json::to_value(t).unwrap(), serde_json::json!("14:05"));
    }

    #[test]
    fn text_form_round_trips() {
        let t: ClockTime = serde_json::from_value(serde_json::json!("08:00")).unwrap();
        assert_eq!(serde_json::to_value(t).unwrap(), serde_json::json!("08:00"));
    }

    #[test]
    fn nonzero_seconds_are_rejected() {
        let err = "09:30:10".parse::<ClockTime>().unwrap_err();
        assert!(err.to_string().contains("09:30:10"));
        assert!("23:59:59".parse::<ClockTime>().is_err());
        assert!("23:59:00".parse::<ClockTime>().is_ok());
    }

    #[test]
    fn rejects_garbage() {
        assert!("25:00".parse::<ClockTime>().is_err());
        assert!("noon".parse::<ClockTime>().is_err());
        assert!("".parse::<ClockTime>().is_err());
    }

    #[test]
    fn orders_by_time_of_day() {
        let a: ClockTime = "08:00".parse().unwrap();
        let b: ClockTime = "10:00".parse().unwrap();
        assert!(a < b);
    }
}
