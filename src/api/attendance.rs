use crate::{
    attendance::{
        clock::{adjust, classify},
        reconcile::ProposedRow,
        service::{self, SignInOutcome},
    },
    error::ApiError,
    model::{
        attendance::AttendanceStatus,
        notice::{RenderedNotice, render_all},
    },
    store::AttendanceStore,
    utils::{pending_store::PendingOverwrites, teacher_cache::TeacherDirectory},
};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams)]
pub struct ClassifyQuery {
    /// Sign-in time, HH:MM
    pub time: String,
}

#[derive(Deserialize, ToSchema)]
pub struct AdjustTime {
    /// Current content of the time field; anything unparsable restarts from 08:00
    #[schema(example = "08:30")]
    pub time: String,
    #[schema(example = 1)]
    pub delta: i32,
}

#[derive(Deserialize, ToSchema)]
pub struct SignIn {
    #[schema(example = "Ana")]
    pub teacher: String,
    #[schema(example = "08:12")]
    pub time: String,
}

#[derive(Deserialize, ToSchema)]
pub struct MarkTeacher {
    #[schema(example = "Ana")]
    pub teacher: String,
    #[schema(example = "Absent")]
    pub status: AttendanceStatus,
}

/// Sign-in outcome with the notices to show alongside it.
#[derive(Serialize)]
struct SignInResponse<'a> {
    #[serde(flatten)]
    outcome: &'a SignInOutcome,
    notices: Vec<RenderedNotice>,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize, ToSchema)]
pub struct TableEdits {
    pub rows: Vec<ProposedRow>,
    /// Recompute Present/Late/VeryLate from the time column
    #[serde(default = "default_true")]
    #[schema(example = true)]
    pub auto_reclassify: bool,
}

/// Status a typed time would get
#[utoipa::path(
    get,
    path = "/api/attendance/classify",
    params(ClassifyQuery),
    responses(
        (status = 200, description = "Classified", body = Object, example = json!({
            "time": "08:45", "status": "Late"
        })),
        (status = 400, description = "Invalid time format")
    ),
    tag = "Attendance"
)]
pub async fn classify_time(query: web::Query<ClassifyQuery>) -> Result<HttpResponse, ApiError> {
    let (time, status) = service::classify_input(&query.time)?;
    Ok(HttpResponse::Ok().json(json!({ "time": time, "status": status })))
}

/// Step the sign-in time by whole minutes
#[utoipa::path(
    post,
    path = "/api/attendance/adjust",
    request_body = AdjustTime,
    responses(
        (status = 200, description = "Adjusted time", body = Object, example = json!({
            "time": "08:31", "status": "Late"
        }))
    ),
    tag = "Attendance"
)]
pub async fn adjust_time(payload: web::Json<AdjustTime>) -> HttpResponse {
    let time = adjust(&payload.time, payload.delta);
    HttpResponse::Ok().json(json!({ "time": time, "status": classify(time) }))
}

/// Records of one day, by sign-in time
#[utoipa::path(
    get,
    path = "/api/attendance/{date}",
    params(("date" = String, Path, description = "Day, YYYY-MM-DD")),
    responses(
        (status = 200, description = "Day records", body = [crate::model::attendance::AttendanceRecord]),
        (status = 500, description = "Store error")
    ),
    tag = "Attendance"
)]
pub async fn day_records(
    pool: web::Data<MySqlPool>,
    path: web::Path<NaiveDate>,
) -> Result<HttpResponse, ApiError> {
    let records = service::day_records(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// Every teacher, signed or not
#[utoipa::path(
    get,
    path = "/api/attendance/{date}/roster",
    params(("date" = String, Path, description = "Day, YYYY-MM-DD")),
    responses(
        (status = 200, description = "Full roster", body = [crate::attendance::roster::RosterRow]),
        (status = 500, description = "Store error")
    ),
    tag = "Attendance"
)]
pub async fn roster(
    pool: web::Data<MySqlPool>,
    directory: web::Data<TeacherDirectory>,
    path: web::Path<NaiveDate>,
) -> Result<HttpResponse, ApiError> {
    let rows = service::full_roster(pool.get_ref(), directory.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// Sign a teacher in
#[utoipa::path(
    post,
    path = "/api/attendance/{date}/sign-in",
    params(("date" = String, Path, description = "Day, YYYY-MM-DD")),
    request_body = SignIn,
    responses(
        (status = 201, description = "Saved", body = Object, example = json!({
            "outcome": "saved",
            "teacher": "Ana", "date": "2026-10-16", "time": "08:12", "status": "Present",
            "notices": [{"level": "success", "message": "Saved Ana Present @ 08:12"}]
        })),
        (status = 202, description = "A record exists; confirmation required", body = Object, example = json!({
            "outcome": "pending_confirmation",
            "token": "4b3f3c1e-4f7e-4c7e-9d3c-2f1c8a7b6e5d",
            "proposed": {"teacher": "Ana", "date": "2026-10-16", "time": "09:05", "status": "VeryLate"},
            "previous_time": "08:12",
            "previous_status": "Present",
            "notices": [{"level": "warning", "message": "Pending overwrite for Ana. Confirm below."}]
        })),
        (status = 400, description = "Unknown teacher or invalid time"),
        (status = 500, description = "Save failed")
    ),
    tag = "Attendance"
)]
pub async fn sign_in(
    pool: web::Data<MySqlPool>,
    directory: web::Data<TeacherDirectory>,
    pending: web::Data<PendingOverwrites>,
    path: web::Path<NaiveDate>,
    payload: web::Json<SignIn>,
) -> Result<HttpResponse, ApiError> {
    let (outcome, notice) = service::sign_in(
        pool.get_ref(),
        directory.get_ref(),
        pending.get_ref(),
        path.into_inner(),
        &payload.teacher,
        &payload.time,
    )
    .await?;

    let body = SignInResponse {
        outcome: &outcome,
        notices: render_all(&[notice]),
    };

    Ok(match &outcome {
        SignInOutcome::Saved(_) => HttpResponse::Created().json(&body),
        SignInOutcome::PendingConfirmation(_) => HttpResponse::Accepted().json(&body),
    })
}

/// Confirm a pending overwrite
#[utoipa::path(
    post,
    path = "/api/attendance/pending/{token}",
    params(("token" = String, Path, description = "Token returned by sign-in")),
    responses(
        (status = 200, description = "Overwrite applied"),
        (status = 404, description = "No such pending overwrite"),
        (status = 500, description = "Save failed")
    ),
    tag = "Attendance"
)]
pub async fn confirm_pending(
    pool: web::Data<MySqlPool>,
    pending: web::Data<PendingOverwrites>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let (record, notice) =
        service::confirm_overwrite(pool.get_ref(), pending.get_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "record": record,
        "notices": render_all(&[notice])
    })))
}

/// Drop a pending overwrite
#[utoipa::path(
    delete,
    path = "/api/attendance/pending/{token}",
    params(("token" = String, Path, description = "Token returned by sign-in")),
    responses(
        (status = 200, description = "Canceled"),
        (status = 404, description = "No such pending overwrite")
    ),
    tag = "Attendance"
)]
pub async fn cancel_pending(
    pending: web::Data<PendingOverwrites>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let notice = service::cancel_overwrite(pending.get_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "notices": render_all(&[notice]) })))
}

/// Mark a teacher Absent or Excused
#[utoipa::path(
    post,
    path = "/api/attendance/{date}/mark",
    params(("date" = String, Path, description = "Day, YYYY-MM-DD")),
    request_body = MarkTeacher,
    responses(
        (status = 201, description = "Marked"),
        (status = 400, description = "Teacher unknown, already recorded, or status not allowed"),
        (status = 500, description = "Save failed")
    ),
    tag = "Attendance"
)]
pub async fn mark(
    pool: web::Data<MySqlPool>,
    directory: web::Data<TeacherDirectory>,
    path: web::Path<NaiveDate>,
    payload: web::Json<MarkTeacher>,
) -> Result<HttpResponse, ApiError> {
    let (record, notice) = service::mark(
        pool.get_ref(),
        directory.get_ref(),
        path.into_inner(),
        &payload.teacher,
        payload.status,
    )
    .await?;
    Ok(HttpResponse::Created().json(json!({
        "record": record,
        "notices": render_all(&[notice])
    })))
}

/// Dry run of a table save
#[utoipa::path(
    post,
    path = "/api/attendance/{date}/preview",
    params(("date" = String, Path, description = "Day, YYYY-MM-DD")),
    request_body = TableEdits,
    responses(
        (status = 200, description = "What a save would do", body = crate::attendance::reconcile::Reconciliation),
        (status = 500, description = "Store error")
    ),
    tag = "Attendance"
)]
pub async fn preview_table(
    pool: web::Data<MySqlPool>,
    directory: web::Data<TeacherDirectory>,
    path: web::Path<NaiveDate>,
    payload: web::Json<TableEdits>,
) -> Result<HttpResponse, ApiError> {
    let (reconciliation, notices) = service::preview_table_edits(
        pool.get_ref(),
        directory.get_ref(),
        path.into_inner(),
        &payload.rows,
        payload.auto_reclassify,
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({
        "upserts": reconciliation.upserts,
        "rejections": reconciliation.rejections,
        "notices": render_all(&notices)
    })))
}

/// Save edits made in the records table
#[utoipa::path(
    put,
    path = "/api/attendance/{date}",
    params(("date" = String, Path, description = "Day, YYYY-MM-DD")),
    request_body = TableEdits,
    responses(
        (status = 200, description = "Edits applied; per-row failures are listed", body = crate::attendance::service::TableOutcome),
        (status = 500, description = "Store error while loading the day")
    ),
    tag = "Attendance"
)]
pub async fn save_table(
    pool: web::Data<MySqlPool>,
    directory: web::Data<TeacherDirectory>,
    path: web::Path<NaiveDate>,
    payload: web::Json<TableEdits>,
) -> Result<HttpResponse, ApiError> {
    let (outcome, notices) = service::apply_table_edits(
        pool.get_ref(),
        directory.get_ref(),
        path.into_inner(),
        &payload.rows,
        payload.auto_reclassify,
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({
        "saved": outcome.saved,
        "failed": outcome.failed,
        "upserts": outcome.reconciliation.upserts,
        "rejections": outcome.reconciliation.rejections,
        "notices": render_all(&notices)
    })))
}

/// Attendance history of one teacher
#[utoipa::path(
    get,
    path = "/api/teachers/by-name/{name}/attendance",
    params(("name" = String, Path, description = "Teacher name")),
    responses(
        (status = 200, description = "Dates and statuses, oldest first", body = [crate::model::attendance::AttendanceHistoryEntry]),
        (status = 500, description = "Store error")
    ),
    tag = "Attendance"
)]
pub async fn teacher_history(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let history = pool.get_ref().attendance_history(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(history))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        attendance::clock::ClockTime,
        model::{attendance::AttendanceRecord, notice::Notice},
        utils::pending_store::PendingOverwrite,
    };

    fn record(time: &str, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            teacher: "Ana".into(),
            date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            time: ClockTime::parse(time),
            status,
        }
    }

    #[test]
    fn saved_sign_in_body_carries_record_and_notices() {
        let outcome = SignInOutcome::Saved(record("08:12", AttendanceStatus::Present));
        let body = serde_json::to_value(SignInResponse {
            outcome: &outcome,
            notices: render_all(&[Notice::Success("Saved Ana Present @ 08:12".into())]),
        })
        .unwrap();

        assert_eq!(body["outcome"], "saved");
        assert_eq!(body["teacher"], "Ana");
        assert_eq!(body["date"], "2026-10-16");
        assert_eq!(body["time"], "08:12");
        assert_eq!(body["status"], "Present");
        assert_eq!(body["notices"][0]["level"], "success");
    }

    #[test]
    fn pending_sign_in_body_carries_token_and_previous_values() {
        let outcome = SignInOutcome::PendingConfirmation(PendingOverwrite {
            token: "tok".into(),
            proposed: record("09:05", AttendanceStatus::VeryLate),
            previous_time: ClockTime::parse("08:12"),
            previous_status: AttendanceStatus::Present,
        });
        let body = serde_json::to_value(SignInResponse {
            outcome: &outcome,
            notices: Vec::new(),
        })
        .unwrap();

        assert_eq!(body["outcome"], "pending_confirmation");
        assert_eq!(body["token"], "tok");
        assert_eq!(body["proposed"]["status"], "VeryLate");
        assert_eq!(body["previous_time"], "08:12");
        assert_eq!(body["notices"], serde_json::json!([]));
    }
}
