use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

use crate::attendance::clock::ClockTime;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
pub enum AttendanceStatus {
    Present,
    Late,
    VeryLate,
    Absent,
    Excused,
    /// Display-only marker for a teacher with no record on the day.
    NotSigned,
}

impl AttendanceStatus {
    /// Statuses that must carry a sign-in time.
    pub fn is_time_bearing(self) -> bool {
        matches!(
            self,
            AttendanceStatus::Present | AttendanceStatus::Late | AttendanceStatus::VeryLate
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[schema(example = json!({
    "teacher": "Ana",
    "date": "2026-10-16",
    "time": "08:12",
    "status": "Present"
}))]
pub struct AttendanceRecord {
    pub teacher: String,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = Option<String>, example = "08:12")]
    pub time: Option<ClockTime>,
    pub status: AttendanceStatus,
}

/// The persisted `(time, status)` pair of one teacher on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub time: Option<ClockTime>,
    pub status: AttendanceStatus,
}

impl From<&AttendanceRecord> for Snapshot {
    fn from(r: &AttendanceRecord) -> Self {
        Snapshot {
            time: r.time,
            status: r.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceHistoryEntry {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn only_present_late_and_very_late_carry_a_time() {
        let bearing: Vec<_> = AttendanceStatus::iter()
            .filter(|s| s.is_time_bearing())
            .collect();
        assert_eq!(
            bearing,
            vec![
                AttendanceStatus::Present,
                AttendanceStatus::Late,
                AttendanceStatus::VeryLate
            ]
        );
    }

    #[test]
    fn status_names_round_trip_through_strings() {
        assert_eq!(AttendanceStatus::VeryLate.to_string(), "VeryLate");
        assert_eq!(
            AttendanceStatus::from_str("Excused"),
            Ok(AttendanceStatus::Excused)
        );
        assert!(AttendanceStatus::from_str("Not Signed").is_err());
    }
}
