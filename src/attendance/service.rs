//! Attendance operations: each one validates, then issues sequential store calls.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

use super::clock::{ClockTime, classify};
use super::reconcile::{ProposedRow, Reconciliation, Rejection, RejectionReason, reconcile};
use super::roster::{RosterRow, build_full_roster, sort_by_time};
use crate::error::{ApiError, StoreError, ValidationError};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, Snapshot};
use crate::model::notice::Notice;
use crate::store::AttendanceStore;
use crate::utils::pending_store::{PendingOverwrite, PendingOverwrites};
use crate::utils::teacher_cache::TeacherDirectory;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SignInOutcome {
    Saved(AttendanceRecord),
    PendingConfirmation(PendingOverwrite),
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct TableOutcome {
    pub reconciliation: Reconciliation,
    pub saved: usize,
    pub failed: Vec<String>,
}

fn display_time(time: Option<ClockTime>) -> String {
    time.map(|t| t.to_string()).unwrap_or_default()
}

fn snapshot_map(records: &[AttendanceRecord]) -> HashMap<String, Snapshot> {
    records
        .iter()
        .map(|r| (r.teacher.clone(), Snapshot::from(r)))
        .collect()
}

async fn require_known<S: AttendanceStore>(
    store: &S,
    directory: &TeacherDirectory,
    teacher: &str,
) -> Result<(), ApiError> {
    let names = directory.names(store).await?;
    if names.iter().any(|n| n == teacher) {
        Ok(())
    } else {
        Err(ValidationError::UnknownTeacher(teacher.to_string()).into())
    }
}

async fn existing_for<S: AttendanceStore>(
    store: &S,
    date: NaiveDate,
    teacher: &str,
) -> Result<Option<Snapshot>, StoreError> {
    let records = store.attendance_on(date).await?;
    Ok(records
        .iter()
        .find(|r| r.teacher == teacher)
        .map(Snapshot::from))
}

/// Parse a typed time and report the status it would get.
pub fn classify_input(time: &str) -> Result<(ClockTime, AttendanceStatus), ValidationError> {
    let parsed: ClockTime = time.trim().parse()?;
    Ok((parsed, classify(parsed)))
}

pub async fn day_records<S: AttendanceStore>(
    store: &S,
    date: NaiveDate,
) -> Result<Vec<AttendanceRecord>, StoreError> {
    let mut records = store.attendance_on(date).await?;
    sort_by_time(&mut records);
    Ok(records)
}

pub async fn full_roster<S: AttendanceStore>(
    store: &S,
    directory: &TeacherDirectory,
    date: NaiveDate,
) -> Result<Vec<RosterRow>, StoreError> {
    let (teachers, records) =
        futures::try_join!(directory.names(store), store.attendance_on(date))?;
    Ok(build_full_roster(&teachers, &records))
}

/// Record a sign-in. A teacher who already has a record gets a pending
/// overwrite instead of a write.
#[instrument(skip(store, directory, pending))]
pub async fn sign_in<S: AttendanceStore>(
    store: &S,
    directory: &TeacherDirectory,
    pending: &PendingOverwrites,
    date: NaiveDate,
    teacher: &str,
    time: &str,
) -> Result<(SignInOutcome, Notice), ApiError> {
    let teacher = teacher.trim();
    require_known(store, directory, teacher).await?;

    let time = time.trim();
    if time.is_empty() {
        return Err(ValidationError::MissingTime(teacher.to_string()).into());
    }
    let (time, status) = classify_input(time)?;

    let record = AttendanceRecord {
        teacher: teacher.to_string(),
        date,
        time: Some(time),
        status,
    };

    if let Some(previous) = existing_for(store, date, teacher).await? {
        let staged = pending.stage(record, previous).await;
        debug!(token = %staged.token, "Overwrite staged");
        let notice = Notice::Warning(format!(
            "Pending overwrite for {teacher}. Confirm below."
        ));
        return Ok((SignInOutcome::PendingConfirmation(staged), notice));
    }

    store
        .save_attendance(&record)
        .await
        .map_err(|source| ApiError::SaveFailed {
            teacher: teacher.to_string(),
            source,
        })?;
    let notice = Notice::Success(format!("Saved {teacher} {status} @ {time}"));
    Ok((SignInOutcome::Saved(record), notice))
}

/// Apply a staged overwrite. The staged entry is consumed even when the write fails.
#[instrument(skip(store, pending))]
pub async fn confirm_overwrite<S: AttendanceStore>(
    store: &S,
    pending: &PendingOverwrites,
    token: &str,
) -> Result<(AttendanceRecord, Notice), ApiError> {
    let staged = pending
        .take(token)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Pending overwrite {token}")))?;
    let record = staged.proposed;

    store
        .save_attendance(&record)
        .await
        .map_err(|source| ApiError::SaveFailed {
            teacher: record.teacher.clone(),
            source,
        })?;

    let notice = Notice::Success(format!(
        "Updated {} to {} @ {}",
        record.teacher,
        record.status,
        display_time(record.time)
    ));
    Ok((record, notice))
}

pub async fn cancel_overwrite(pending: &PendingOverwrites, token: &str) -> Result<Notice, ApiError> {
    pending
        .take(token)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Pending overwrite {token}")))?;
    Ok(Notice::Info("Update canceled".to_string()))
}

/// Quick Absent / Excused marking for a teacher without a record on `date`.
#[instrument(skip(store, directory))]
pub async fn mark<S: AttendanceStore>(
    store: &S,
    directory: &TeacherDirectory,
    date: NaiveDate,
    teacher: &str,
    status: AttendanceStatus,
) -> Result<(AttendanceRecord, Notice), ApiError> {
    if !matches!(status, AttendanceStatus::Absent | AttendanceStatus::Excused) {
        return Err(ValidationError::StatusNotAllowed(status).into());
    }
    let teacher = teacher.trim();
    require_known(store, directory, teacher).await?;

    if existing_for(store, date, teacher).await?.is_some() {
        return Err(ValidationError::RecordExists {
            teacher: teacher.to_string(),
            date: date.to_string(),
        }
        .into());
    }

    let record = AttendanceRecord {
        teacher: teacher.to_string(),
        date,
        time: None,
        status,
    };
    store
        .save_attendance(&record)
        .await
        .map_err(|source| ApiError::SaveFailed {
            teacher: teacher.to_string(),
            source,
        })?;
    let notice = Notice::Success(format!("Marked {teacher} {status}"));
    Ok((record, notice))
}

/// Groups raw rejections into one warning per reason.
pub fn rejection_notices(rejections: &[Rejection]) -> Vec<Notice> {
    let mut unknown: Vec<&str> = Vec::new();
    let mut bad_times: Vec<String> = Vec::new();
    let mut bad_status: Vec<&str> = Vec::new();

    for r in rejections {
        match r.reason {
            RejectionReason::UnknownTeacher => unknown.push(&r.teacher),
            RejectionReason::InvalidTime => {
                let raw = r.raw_time.as_deref().filter(|t| !t.is_empty()).unwrap_or("blank");
                bad_times.push(format!("{} ({})", r.teacher, raw));
            }
            RejectionReason::InvalidStatus => bad_status.push(&r.teacher),
        }
    }
    unknown.sort_unstable();
    unknown.dedup();

    let mut notices = Vec::new();
    if !unknown.is_empty() {
        notices.push(Notice::Warning(format!(
            "Unknown teacher names ignored: {}",
            unknown.join(", ")
        )));
    }
    if !bad_times.is_empty() {
        notices.push(Notice::Warning(format!(
            "Invalid time values ignored: {}",
            bad_times.join(", ")
        )));
    }
    if !bad_status.is_empty() {
        notices.push(Notice::Warning(format!(
            "Rows marked NotSigned ignored: {}",
            bad_status.join(", ")
        )));
    }
    notices
}

async fn reconcile_day<S: AttendanceStore>(
    store: &S,
    directory: &TeacherDirectory,
    date: NaiveDate,
    rows: &[ProposedRow],
    auto_reclassify: bool,
) -> Result<Reconciliation, StoreError> {
    let (teachers, records) =
        futures::try_join!(directory.names(store), store.attendance_on(date))?;
    let known: HashSet<String> = teachers.iter().cloned().collect();
    Ok(reconcile(rows, &snapshot_map(&records), &known, auto_reclassify))
}

/// Reconcile table edits without writing anything.
pub async fn preview_table_edits<S: AttendanceStore>(
    store: &S,
    directory: &TeacherDirectory,
    date: NaiveDate,
    rows: &[ProposedRow],
    auto_reclassify: bool,
) -> Result<(Reconciliation, Vec<Notice>), StoreError> {
    let reconciliation = reconcile_day(store, directory, date, rows, auto_reclassify).await?;
    let mut notices = rejection_notices(&reconciliation.rejections);
    if reconciliation.is_noop() {
        notices.push(Notice::Info("No changes detected.".to_string()));
    }
    Ok((reconciliation, notices))
}

/// Reconcile table edits and write the upserts one by one, carrying on past failures.
#[instrument(skip(store, directory, rows), fields(rows = rows.len()))]
pub async fn apply_table_edits<S: AttendanceStore>(
    store: &S,
    directory: &TeacherDirectory,
    date: NaiveDate,
    rows: &[ProposedRow],
    auto_reclassify: bool,
) -> Result<(TableOutcome, Vec<Notice>), StoreError> {
    let (reconciliation, mut notices) =
        preview_table_edits(store, directory, date, rows, auto_reclassify).await?;

    let mut outcome = TableOutcome::default();
    for upsert in &reconciliation.upserts {
        let record = AttendanceRecord {
            teacher: upsert.teacher.clone(),
            date,
            time: upsert.time,
            status: upsert.status,
        };
        match store.save_attendance(&record).await {
            Ok(()) => outcome.saved += 1,
            Err(e) => {
                error!(error = %e, teacher = %upsert.teacher, %date, "Attendance upsert failed");
                notices.push(Notice::Error(format!("Failed {}: {}", upsert.teacher, e)));
                outcome.failed.push(upsert.teacher.clone());
            }
        }
    }
    if outcome.saved > 0 {
        notices.push(Notice::Success(format!(
            "Applied {} change(s).",
            outcome.saved
        )));
    }

    outcome.reconciliation = reconciliation;
    Ok((outcome, notices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use std::time::Duration;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn directory() -> TeacherDirectory {
        TeacherDirectory::new(Duration::from_secs(60))
    }

    fn pending() -> PendingOverwrites {
        PendingOverwrites::new(Duration::from_secs(60))
    }

    fn row(teacher: &str, time: &str, status: AttendanceStatus) -> ProposedRow {
        ProposedRow {
            teacher: teacher.into(),
            time: time.into(),
            status,
        }
    }

    fn signed(teacher: &str, time: &str, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            teacher: teacher.into(),
            date: day(),
            time: ClockTime::parse(time),
            status,
        }
    }

    #[actix_web::test]
    async fn first_sign_in_is_saved_with_classified_status() {
        let store = MemoryStore::with_teachers(&["Ana"]);
        let (outcome, notice) = sign_in(&store, &directory(), &pending(), day(), "Ana", "08:45")
            .await
            .unwrap();

        assert!(matches!(outcome, SignInOutcome::Saved(ref r) if r.status == AttendanceStatus::Late));
        assert_eq!(notice, Notice::Success("Saved Ana Late @ 08:45".into()));
        assert_eq!(store.get("Ana", day()).unwrap().status, AttendanceStatus::Late);
    }

    #[actix_web::test]
    async fn sign_in_over_existing_record_waits_for_confirmation() {
        let store = MemoryStore::with_teachers(&["Ana"]);
        store.seed(signed("Ana", "08:00", AttendanceStatus::Present));
        let pending = pending();

        let (outcome, notice) = sign_in(&store, &directory(), &pending, day(), "Ana", "09:05")
            .await
            .unwrap();
        let SignInOutcome::PendingConfirmation(staged) = outcome else {
            panic!("expected a pending overwrite");
        };
        assert!(matches!(notice, Notice::Warning(_)));
        assert_eq!(staged.previous_status, AttendanceStatus::Present);
        assert_eq!(store.saves.get(), 0);

        let (record, notice) = confirm_overwrite(&store, &pending, &staged.token).await.unwrap();
        assert_eq!(record.status, AttendanceStatus::VeryLate);
        assert_eq!(notice, Notice::Success("Updated Ana to VeryLate @ 09:05".into()));
        assert_eq!(store.get("Ana", day()).unwrap().time, ClockTime::parse("09:05"));

        let again = confirm_overwrite(&store, &pending, &staged.token).await;
        assert!(matches!(again, Err(ApiError::NotFound(_))));
    }

    #[actix_web::test]
    async fn cancelled_overwrite_leaves_the_record() {
        let store = MemoryStore::with_teachers(&["Ana"]);
        store.seed(signed("Ana", "08:00", AttendanceStatus::Present));
        let pending = pending();

        let (outcome, _) = sign_in(&store, &directory(), &pending, day(), "Ana", "08:50")
            .await
            .unwrap();
        let SignInOutcome::PendingConfirmation(staged) = outcome else {
            panic!("expected a pending overwrite");
        };
        let notice = cancel_overwrite(&pending, &staged.token).await.unwrap();
        assert_eq!(notice, Notice::Info("Update canceled".into()));
        assert_eq!(store.get("Ana", day()).unwrap().status, AttendanceStatus::Present);
    }

    #[actix_web::test]
    async fn sign_in_rejects_bad_input() {
        let store = MemoryStore::with_teachers(&["Ana"]);
        let dir = directory();
        let pending = pending();

        let unknown = sign_in(&store, &dir, &pending, day(), "Carl", "08:00").await;
        assert!(matches!(
            unknown,
            Err(ApiError::Validation(ValidationError::UnknownTeacher(_)))
        ));
        let blank = sign_in(&store, &dir, &pending, day(), "Ana", "  ").await;
        assert!(matches!(
            blank,
            Err(ApiError::Validation(ValidationError::MissingTime(_)))
        ));
        let bad = sign_in(&store, &dir, &pending, day(), "Ana", "8h30").await;
        assert!(matches!(
            bad,
            Err(ApiError::Validation(ValidationError::InvalidTime(_)))
        ));
        assert_eq!(store.saves.get(), 0);
    }

    #[actix_web::test]
    async fn failed_save_is_attributed_to_the_teacher() {
        let store = MemoryStore::with_teachers(&["Ana"]);
        store.fail_for("Ana");
        let err = sign_in(&store, &directory(), &pending(), day(), "Ana", "08:00")
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Save failed for Ana"));
    }

    #[actix_web::test]
    async fn mark_only_accepts_absent_or_excused_for_unsigned_teachers() {
        let store = MemoryStore::with_teachers(&["Ana", "Bob"]);
        store.seed(signed("Bob", "08:00", AttendanceStatus::Present));
        let dir = directory();

        let (record, notice) = mark(&store, &dir, day(), "Ana", AttendanceStatus::Excused)
            .await
            .unwrap();
        assert_eq!(record.time, None);
        assert_eq!(notice, Notice::Success("Marked Ana Excused".into()));

        let late = mark(&store, &dir, day(), "Ana", AttendanceStatus::Late).await;
        assert!(matches!(
            late,
            Err(ApiError::Validation(ValidationError::StatusNotAllowed(AttendanceStatus::Late)))
        ));
        let existing = mark(&store, &dir, day(), "Bob", AttendanceStatus::Absent).await;
        assert!(matches!(
            existing,
            Err(ApiError::Validation(ValidationError::RecordExists { .. }))
        ));
    }

    #[actix_web::test]
    async fn table_apply_continues_past_failures_and_counts_successes() {
        let store = MemoryStore::with_teachers(&["Ana", "Bob", "Cleo"]);
        store.fail_for("Bob");
        let rows = [
            row("Ana", "08:45", AttendanceStatus::Present),
            row("Bob", "08:00", AttendanceStatus::Present),
            row("Cleo", "", AttendanceStatus::Absent),
            row("Carl", "08:00", AttendanceStatus::Present),
            row("", "", AttendanceStatus::Present),
        ];

        let (outcome, notices) = apply_table_edits(&store, &directory(), day(), &rows, true)
            .await
            .unwrap();

        assert_eq!(outcome.saved, 2);
        assert_eq!(outcome.failed, vec!["Bob".to_string()]);
        assert_eq!(outcome.reconciliation.rejections.len(), 1);
        assert_eq!(store.get("Ana", day()).unwrap().status, AttendanceStatus::Late);
        assert_eq!(store.get("Cleo", day()).unwrap().status, AttendanceStatus::Absent);
        assert!(store.get("Bob", day()).is_none());

        assert_eq!(
            notices,
            vec![
                Notice::Warning("Unknown teacher names ignored: Carl".into()),
                Notice::Error("Failed Bob: store unavailable: write rejected for Bob".into()),
                Notice::Success("Applied 2 change(s).".into()),
            ]
        );
    }

    #[actix_web::test]
    async fn reapplying_the_same_table_changes_nothing() {
        let store = MemoryStore::with_teachers(&["Ana", "Bob"]);
        let rows = [
            row("Ana", "08:10", AttendanceStatus::Late),
            row("Bob", "07:00", AttendanceStatus::Absent),
        ];
        let dir = directory();

        let (first, _) = apply_table_edits(&store, &dir, day(), &rows, true).await.unwrap();
        assert_eq!(first.saved, 2);

        let (second, notices) = apply_table_edits(&store, &dir, day(), &rows, true).await.unwrap();
        assert_eq!(second.saved, 0);
        assert!(second.reconciliation.upserts.is_empty());
        assert_eq!(notices, vec![Notice::Info("No changes detected.".into())]);
        assert_eq!(store.saves.get(), 2);
    }

    #[actix_web::test]
    async fn preview_never_writes() {
        let store = MemoryStore::with_teachers(&["Ana"]);
        let (reconciliation, _) = preview_table_edits(
            &store,
            &directory(),
            day(),
            &[row("Ana", "08:00", AttendanceStatus::Present)],
            true,
        )
        .await
        .unwrap();
        assert_eq!(reconciliation.upserts.len(), 1);
        assert_eq!(store.saves.get(), 0);
    }

    #[actix_web::test]
    async fn roster_includes_unsigned_teachers() {
        let store = MemoryStore::with_teachers(&["Bob", "Ana"]);
        store.seed(signed("Ana", "08:00", AttendanceStatus::Present));
        let rows = full_roster(&store, &directory(), day()).await.unwrap();
        let summary: Vec<_> = rows.iter().map(|r| (r.teacher.as_str(), r.status)).collect();
        assert_eq!(
            summary,
            vec![
                ("Ana", AttendanceStatus::Present),
                ("Bob", AttendanceStatus::NotSigned)
            ]
        );
    }

    #[test]
    fn rejection_notices_group_and_dedupe() {
        let rejections = vec![
            Rejection {
                teacher: "Zed".into(),
                raw_time: None,
                reason: RejectionReason::UnknownTeacher,
            },
            Rejection {
                teacher: "Bob".into(),
                raw_time: Some(String::new()),
                reason: RejectionReason::InvalidTime,
            },
            Rejection {
                teacher: "Carl".into(),
                raw_time: None,
                reason: RejectionReason::UnknownTeacher,
            },
            Rejection {
                teacher: "Zed".into(),
                raw_time: None,
                reason: RejectionReason::UnknownTeacher,
            },
            Rejection {
                teacher: "Ana".into(),
                raw_time: Some("25:00".into()),
                reason: RejectionReason::InvalidTime,
            },
        ];
        assert_eq!(
            rejection_notices(&rejections),
            vec![
                Notice::Warning("Unknown teacher names ignored: Carl, Zed".into()),
                Notice::Warning("Invalid time values ignored: Bob (blank), Ana (25:00)".into()),
            ]
        );
    }

    #[test]
    fn classify_input_trims_and_validates() {
        let (time, status) = classify_input(" 08:31 ").unwrap();
        assert_eq!(time.to_string(), "08:31");
        assert_eq!(status, AttendanceStatus::Late);
        assert!(classify_input("8:31").is_err());
    }
}
