use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::clock::ClockTime;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RosterRow {
    pub teacher: String,
    #[schema(value_type = Option<String>, example = "08:00")]
    pub time: Option<ClockTime>,
    pub status: AttendanceStatus,
}

impl RosterRow {
    fn sort_key(&self) -> (bool, u16, &str) {
        let unsigned = self.status == AttendanceStatus::NotSigned;
        // blank time sorts after 23:59
        let time = self.time.map_or(u16::MAX, ClockTime::minutes);
        (unsigned, time, self.teacher.as_str())
    }
}

/// Every known teacher with their record for the day, signed teachers first,
/// then by sign-in time, then by name.
pub fn build_full_roster(known_teachers: &[String], existing: &[AttendanceRecord]) -> Vec<RosterRow> {
    let by_name: HashMap<&str, &AttendanceRecord> =
        existing.iter().map(|r| (r.teacher.as_str(), r)).collect();

    let mut rows: Vec<RosterRow> = known_teachers
        .iter()
        .map(|name| match by_name.get(name.as_str()) {
            Some(rec) => RosterRow {
                teacher: name.clone(),
                time: rec.time,
                status: rec.status,
            },
            None => RosterRow {
                teacher: name.clone(),
                time: None,
                status: AttendanceStatus::NotSigned,
            },
        })
        .collect();

    rows.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    rows
}

/// Day listing order: by time, blank times last, then by name.
pub fn sort_by_time(records: &mut [AttendanceRecord]) {
    records.sort_by(|a, b| {
        let ka = (a.time.map_or(u16::MAX, ClockTime::minutes), a.teacher.as_str());
        let kb = (b.time.map_or(u16::MAX, ClockTime::minutes), b.teacher.as_str());
        ka.cmp(&kb)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(teacher: &str, time: &str, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            teacher: teacher.into(),
            date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            time: ClockTime::parse(time),
            status,
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unsigned_teachers_follow_signed_ones() {
        let rows = build_full_roster(
            &names(&["Ana", "Bob"]),
            &[record("Ana", "08:00", AttendanceStatus::Present)],
        );
        assert_eq!(
            rows,
            vec![
                RosterRow {
                    teacher: "Ana".into(),
                    time: ClockTime::parse("08:00"),
                    status: AttendanceStatus::Present,
                },
                RosterRow {
                    teacher: "Bob".into(),
                    time: None,
                    status: AttendanceStatus::NotSigned,
                },
            ]
        );
    }

    #[test]
    fn signed_rows_sort_by_time_then_name_with_blank_times_last() {
        let rows = build_full_roster(
            &names(&["dora", "Cleo", "Bob", "Ana", "Eli", "Abe"]),
            &[
                record("Ana", "09:10", AttendanceStatus::VeryLate),
                record("Bob", "", AttendanceStatus::Absent),
                record("Cleo", "07:55", AttendanceStatus::Present),
                record("dora", "07:55", AttendanceStatus::Present),
                record("Eli", "", AttendanceStatus::Excused),
            ],
        );
        let order: Vec<_> = rows.iter().map(|r| r.teacher.as_str()).collect();
        // "Cleo" < "dora" because uppercase sorts first
        assert_eq!(order, vec!["Cleo", "dora", "Ana", "Bob", "Eli", "Abe"]);
        assert_eq!(rows[5].status, AttendanceStatus::NotSigned);
    }

    #[test]
    fn records_for_unknown_teachers_are_not_shown() {
        let rows = build_full_roster(
            &names(&["Ana"]),
            &[record("Ghost", "08:00", AttendanceStatus::Present)],
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, AttendanceStatus::NotSigned);
    }

    #[test]
    fn day_listing_orders_by_time() {
        let mut records = vec![
            record("Bob", "", AttendanceStatus::Absent),
            record("Ana", "08:40", AttendanceStatus::Late),
            record("Cleo", "08:05", AttendanceStatus::Present),
        ];
        sort_by_time(&mut records);
        let order: Vec<_> = records.iter().map(|r| r.teacher.as_str()).collect();
        assert_eq!(order, vec!["Cleo", "Ana", "Bob"]);
    }
}
