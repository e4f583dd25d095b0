use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;
use crate::model::attendance::AttendanceStatus;

const MINUTES_PER_DAY: i32 = 24 * 60;

/// Default sign-in time used by the stepper when the current value is unusable.
pub const START_TIME: ClockTime = ClockTime(8 * 60);
/// First minute counted as `Late`.
pub const LATE_START: ClockTime = ClockTime(8 * 60 + 31);
/// First minute counted as `VeryLate`.
pub const VERY_LATE_START: ClockTime = ClockTime(9 * 60);

/// A wall-clock minute of the day, `00:00` to `23:59`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);
    pub const LAST_MINUTE: ClockTime = ClockTime((MINUTES_PER_DAY - 1) as u16);

    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if hour <= 23 && minute <= 59 {
            Some(ClockTime(hour * 60 + minute))
        } else {
            None
        }
    }

    /// Strict `HH:MM` parse: five characters, colon at index 2, digits only.
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return None;
        }
        let (hh, mm) = (&bytes[..2], &bytes[3..]);
        if !hh.iter().chain(mm).all(u8::is_ascii_digit) {
            return None;
        }
        let digits = |d: &[u8]| u16::from(d[0] - b'0') * 10 + u16::from(d[1] - b'0');
        Self::from_hm(digits(hh), digits(mm))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    fn from_minutes_clamped(total: i32) -> Self {
        ClockTime(total.clamp(0, MINUTES_PER_DAY - 1) as u16)
    }
}

pub fn is_valid_time(s: &str) -> bool {
    ClockTime::parse(s).is_some()
}

pub fn classify(time: ClockTime) -> AttendanceStatus {
    if time < LATE_START {
        AttendanceStatus::Present
    } else if time < VERY_LATE_START {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::VeryLate
    }
}

/// Stepper arithmetic for the sign-in time field.
///
/// An unparsable input restarts from [`START_TIME`]; the result never leaves
/// `00:00..=23:59`.
pub fn adjust(time: &str, delta_minutes: i32) -> ClockTime {
    let base = ClockTime::parse(time).unwrap_or(START_TIME);
    ClockTime::from_minutes_clamped(i32::from(base.0).saturating_add(delta_minutes))
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClockTime::parse(s).ok_or_else(|| ValidationError::InvalidTime(s.to_string()))
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
