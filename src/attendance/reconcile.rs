//! Diffing of a user-edited records table against the persisted day.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::clock::{ClockTime, classify};
use crate::model::attendance::{AttendanceStatus, Snapshot};

/// One row as it came back from the table editor. Nothing here is trusted.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProposedRow {
    #[serde(default)]
    #[schema(example = "Ana")]
    pub teacher: String,
    #[serde(default)]
    #[schema(example = "08:45")]
    pub time: String,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Upsert {
    pub teacher: String,
    #[schema(value_type = Option<String>, example = "08:45")]
    pub time: Option<ClockTime>,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    UnknownTeacher,
    InvalidTime,
    /// `NotSigned` is a display marker and is never stored.
    InvalidStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Rejection {
    pub teacher: String,
    /// Raw time as typed, kept for invalid-time rejections.
    pub raw_time: Option<String>,
    pub reason: RejectionReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Reconciliation {
    pub upserts: Vec<Upsert>,
    pub rejections: Vec<Rejection>,
}

impl Reconciliation {
    pub fn is_noop(&self) -> bool {
        self.upserts.is_empty()
    }
}

/// Validates `proposed` row by row and keeps only the rows that change what
/// `existing` already holds. Rows are reported in input order.
///
/// When a teacher appears on several rows only the last one counts; the
/// earlier rows are superseded and produce neither an upsert nor a rejection.
pub fn reconcile(
    proposed: &[ProposedRow],
    existing: &HashMap<String, Snapshot>,
    known_teachers: &HashSet<String>,
    auto_reclassify: bool,
) -> Reconciliation {
    let mut out = Reconciliation::default();

    let last_row: HashMap<&str, usize> = proposed
        .iter()
        .enumerate()
        .map(|(i, row)| (row.teacher.trim(), i))
        .collect();

    for (i, row) in proposed.iter().enumerate() {
        let teacher = row.teacher.trim();
        if teacher.is_empty() || last_row.get(teacher) != Some(&i) {
            continue;
        }
        if !known_teachers.contains(teacher) {
            out.rejections.push(Rejection {
                teacher: teacher.to_string(),
                raw_time: None,
                reason: RejectionReason::UnknownTeacher,
            });
            continue;
        }

        let raw_time = row.time.trim();
        let mut status = row.status;
        let time = if status.is_time_bearing() {
            let Some(parsed) = ClockTime::parse(raw_time) else {
                out.rejections.push(Rejection {
                    teacher: teacher.to_string(),
                    raw_time: Some(raw_time.to_string()),
                    reason: RejectionReason::InvalidTime,
                });
                continue;
            };
            if auto_reclassify {
                status = classify(parsed);
            }
            Some(parsed)
        } else if status == AttendanceStatus::NotSigned {
            out.rejections.push(Rejection {
                teacher: teacher.to_string(),
                raw_time: None,
                reason: RejectionReason::InvalidStatus,
            });
            continue;
        } else {
            None
        };

        let candidate = Snapshot { time, status };
        if existing.get(teacher) == Some(&candidate) {
            continue;
        }
        out.upserts.push(Upsert {
            teacher: teacher.to_string(),
            time,
            status,
        });
    }

    out
}
