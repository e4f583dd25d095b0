use std::str::FromStr;

use crate::{
    error::{ApiError, StoreError, ValidationError},
    model::calendar::{CalendarOverride, OverrideKind},
};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateOverride {
    pub kind: OverrideKind,
    #[schema(example = "2026-12-21", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2027-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Winter break")]
    pub label: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct OverrideWindow {
    #[param(value_type = String, example = "2026-12-01")]
    pub start: NaiveDate,
    #[param(value_type = String, example = "2026-12-31")]
    pub end: NaiveDate,
}

#[derive(sqlx::FromRow)]
struct OverrideRow {
    id: u64,
    kind: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    label: Option<String>,
}

impl TryFrom<OverrideRow> for CalendarOverride {
    type Error = StoreError;

    fn try_from(row: OverrideRow) -> Result<Self, Self::Error> {
        let kind = OverrideKind::from_str(&row.kind).map_err(|_| {
            StoreError::Corrupt(format!("override {} has kind {:?}", row.id, row.kind))
        })?;
        Ok(CalendarOverride {
            id: row.id,
            kind,
            start_date: row.start_date,
            end_date: row.end_date,
            label: row.label,
        })
    }
}

fn check_range(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if start > end {
        return Err(ValidationError::InvertedRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/calendar/overrides",
    request_body = CreateOverride,
    responses(
        (status = 201, description = "Override created"),
        (status = 400, description = "Start date after end date"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Calendar"
)]
pub async fn create_override(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateOverride>,
) -> Result<HttpResponse, ApiError> {
    check_range(payload.start_date, payload.end_date)?;

    let res = sqlx::query(
        "INSERT INTO calendar_overrides (kind, start_date, end_date, label) VALUES (?, ?, ?, ?)",
    )
    .bind(payload.kind.as_ref())
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(&payload.label)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, kind = %payload.kind, "Failed to add calendar override");
        ApiError::from(e)
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Override created",
        "id": res.last_insert_id()
    })))
}

/// Overrides touching `[start, end]`
#[utoipa::path(
    get,
    path = "/api/calendar/overrides",
    params(OverrideWindow),
    responses(
        (status = 200, description = "Overrides intersecting the window", body = [CalendarOverride]),
        (status = 400, description = "Start date after end date")
    ),
    tag = "Calendar"
)]
pub async fn list_overrides(
    pool: web::Data<MySqlPool>,
    query: web::Query<OverrideWindow>,
) -> Result<HttpResponse, ApiError> {
    let OverrideWindow { start, end } = query.into_inner();
    check_range(start, end)?;

    let rows = sqlx::query_as::<_, OverrideRow>(
        r#"
        SELECT id, kind, start_date, end_date, label
        FROM calendar_overrides
        WHERE start_date <= ? AND end_date >= ?
        ORDER BY start_date
        "#,
    )
    .bind(end)
    .bind(start)
    .fetch_all(pool.get_ref())
    .await?;

    let overrides = rows
        .into_iter()
        .map(CalendarOverride::try_from)
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|o| o.intersects(start, end))
        .collect::<Vec<_>>();

    Ok(HttpResponse::Ok().json(overrides))
}

#[utoipa::path(
    delete,
    path = "/api/calendar/overrides/{override_id}",
    params(
        ("override_id" = u64, Path, description = "Override ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Override not found")
    ),
    tag = "Calendar"
)]
pub async fn delete_override(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let override_id = path.into_inner();

    let res = sqlx::query("DELETE FROM calendar_overrides WHERE id = ?")
        .bind(override_id)
        .execute(pool.get_ref())
        .await?;

    if res.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("Override {override_id}")));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
}
