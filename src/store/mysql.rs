use std::str::FromStr;

use chrono::NaiveDate;
use sqlx::{FromRow, MySqlPool};
use tracing::debug;

use super::AttendanceStore;
use crate::attendance::clock::ClockTime;
use crate::error::StoreError;
use crate::model::attendance::{AttendanceHistoryEntry, AttendanceRecord, AttendanceStatus};

#[derive(FromRow)]
struct AttendanceRow {
    teacher_name: String,
    date: NaiveDate,
    time: Option<String>,
    status: String,
}

#[derive(FromRow)]
struct HistoryRow {
    date: NaiveDate,
    status: String,
}

// NotSigned is a display marker; a stored one is as malformed as an unknown value
fn parse_status(teacher: &str, raw: &str) -> Result<AttendanceStatus, StoreError> {
    match AttendanceStatus::from_str(raw) {
        Ok(AttendanceStatus::NotSigned) | Err(_) => Err(StoreError::Corrupt(format!(
            "{teacher}: unknown status {raw:?}"
        ))),
        Ok(status) => Ok(status),
    }
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = StoreError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let status = parse_status(&row.teacher_name, &row.status)?;
        let time = if status.is_time_bearing() {
            let raw = row.time.as_deref().unwrap_or_default();
            let parsed = ClockTime::parse(raw).ok_or_else(|| {
                StoreError::Corrupt(format!("{}: invalid time {raw:?}", row.teacher_name))
            })?;
            Some(parsed)
        } else {
            None
        };
        Ok(AttendanceRecord {
            teacher: row.teacher_name,
            date: row.date,
            time,
            status,
        })
    }
}

impl AttendanceStore for MySqlPool {
    async fn teacher_names(&self) -> Result<Vec<String>, StoreError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT name FROM teachers WHERE name <> '' ORDER BY name",
        )
        .fetch_all(self)
        .await?;
        Ok(names)
    }

    async fn attendance_on(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, StoreError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT teacher_name, date, time, status
            FROM attendance
            WHERE date = ? AND teacher_name <> ''
            ORDER BY time
            "#,
        )
        .bind(date)
        .fetch_all(self)
        .await?;

        debug!(%date, rows = rows.len(), "Loaded attendance");
        rows.into_iter().map(AttendanceRecord::try_from).collect()
    }

    async fn save_attendance(&self, record: &AttendanceRecord) -> Result<(), StoreError> {
        // relies on the unique key (teacher_name, date)
        sqlx::query(
            r#"
            INSERT INTO attendance (teacher_name, date, time, status)
            VALUES (?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE time = VALUES(time), status = VALUES(status)
            "#,
        )
        .bind(&record.teacher)
        .bind(record.date)
        .bind(record.time.map(|t| t.to_string()))
        .bind(record.status.as_ref())
        .execute(self)
        .await?;
        Ok(())
    }

    async fn attendance_history(
        &self,
        teacher: &str,
    ) -> Result<Vec<AttendanceHistoryEntry>, StoreError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            "SELECT date, status FROM attendance WHERE teacher_name = ? ORDER BY date ASC",
        )
        .bind(teacher)
        .fetch_all(self)
        .await?;

        rows.into_iter()
            .map(|r| {
                Ok(AttendanceHistoryEntry {
                    date: r.date,
                    status: parse_status(teacher, &r.status)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(time: Option<&str>, status: &str) -> AttendanceRow {
        AttendanceRow {
            teacher_name: "Ana".into(),
            date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            time: time.map(str::to_string),
            status: status.into(),
        }
    }

    #[test]
    fn timed_row_converts() {
        let record = AttendanceRecord::try_from(row(Some("08:45"), "Late")).unwrap();
        assert_eq!(record.status, AttendanceStatus::Late);
        assert_eq!(record.time, ClockTime::from_hm(8, 45));
    }

    #[test]
    fn stray_time_on_absent_row_is_dropped() {
        let record = AttendanceRecord::try_from(row(Some("08:00"), "Absent")).unwrap();
        assert_eq!(record.time, None);
    }

    #[test]
    fn malformed_rows_are_corrupt() {
        assert!(matches!(
            AttendanceRecord::try_from(row(Some("8h"), "Present")),
            Err(StoreError::Corrupt(_))
        ));
        assert!(matches!(
            AttendanceRecord::try_from(row(None, "Present")),
            Err(StoreError::Corrupt(_))
        ));
        assert!(matches!(
            AttendanceRecord::try_from(row(Some("08:00"), "present")),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn stored_not_signed_is_corrupt() {
        assert!(matches!(
            AttendanceRecord::try_from(row(None, "NotSigned")),
            Err(StoreError::Corrupt(msg)) if msg.contains("NotSigned")
        ));
        assert!(matches!(
            parse_status("Ana", "NotSigned"),
            Err(StoreError::Corrupt(_))
        ));
        assert_eq!(parse_status("Ana", "Excused").ok(), Some(AttendanceStatus::Excused));
    }
}
