use crate::{error::ApiError, model::journal::JournalEntry};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateJournalEntry {
    #[schema(example = "Ana")]
    pub teacher_name: String,
    #[schema(example = "2026-10-16", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "late")]
    pub status: String,
    pub observation: Option<String>,
    #[schema(example = 3)]
    pub outdated_days: Option<i32>,
}

#[derive(Deserialize, IntoParams)]
pub struct JournalFilter {
    /// Only entries of this day
    #[param(value_type = Option<String>, example = "2026-10-16")]
    pub date: Option<NaiveDate>,
}

#[utoipa::path(
    post,
    path = "/api/journal",
    request_body = CreateJournalEntry,
    responses(
        (status = 201, description = "Journal entry recorded"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Journal"
)]
pub async fn create_entry(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateJournalEntry>,
) -> Result<HttpResponse, ApiError> {
    sqlx::query(
        r#"
        INSERT INTO journal (teacher_name, date, status, observation, outdated_days)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.teacher_name)
    .bind(payload.date)
    .bind(&payload.status)
    .bind(&payload.observation)
    .bind(payload.outdated_days)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, teacher = %payload.teacher_name, "Failed to add journal entry");
        ApiError::from(e)
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Journal entry recorded"
    })))
}

#[utoipa::path(
    get,
    path = "/api/journal",
    params(JournalFilter),
    responses(
        (status = 200, description = "Journal entries", body = [JournalEntry])
    ),
    tag = "Journal"
)]
pub async fn list_entries(
    pool: web::Data<MySqlPool>,
    query: web::Query<JournalFilter>,
) -> Result<HttpResponse, ApiError> {
    let entries = match query.date {
        Some(date) => {
            sqlx::query_as::<_, JournalEntry>(
                r#"
                SELECT id, teacher_name, date, status, observation, outdated_days
                FROM journal WHERE date = ? ORDER BY teacher_name
                "#,
            )
            .bind(date)
            .fetch_all(pool.get_ref())
            .await?
        }
        None => {
            sqlx::query_as::<_, JournalEntry>(
                r#"
                SELECT id, teacher_name, date, status, observation, outdated_days
                FROM journal ORDER BY date DESC, teacher_name
                "#,
            )
            .fetch_all(pool.get_ref())
            .await?
        }
    };

    Ok(HttpResponse::Ok().json(entries))
}
