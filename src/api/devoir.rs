use crate::{error::ApiError, model::devoir::Devoir};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateDevoir {
    #[schema(example = "Ana")]
    pub teacher_name: String,
    #[schema(example = "6A")]
    pub class_name: String,
    #[schema(example = "2026-10-15", format = "date", value_type = Option<String>)]
    pub thursday_date: Option<NaiveDate>,
    #[schema(example = "sent")]
    pub status: String,
    #[schema(example = "2026-10-16", format = "date", value_type = Option<String>)]
    pub sent_date: Option<NaiveDate>,
    #[schema(example = 1)]
    pub days_late: Option<i32>,
}

#[utoipa::path(
    post,
    path = "/api/devoir",
    request_body = CreateDevoir,
    responses(
        (status = 201, description = "Homework delivery recorded"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Devoir"
)]
pub async fn create_devoir(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateDevoir>,
) -> Result<HttpResponse, ApiError> {
    sqlx::query(
        r#"
        INSERT INTO devoir (teacher_name, class_name, thursday_date, status, sent_date, days_late)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.teacher_name)
    .bind(&payload.class_name)
    .bind(payload.thursday_date)
    .bind(&payload.status)
    .bind(payload.sent_date)
    .bind(payload.days_late)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, teacher = %payload.teacher_name, class = %payload.class_name, "Failed to add devoir");
        ApiError::from(e)
    })?;

    Ok(HttpResponse::Created().json(json!({ "message": "Homework delivery recorded" })))
}

#[utoipa::path(
    get,
    path = "/api/devoir",
    responses(
        (status = 200, description = "Deliveries, newest Thursday first", body = [Devoir])
    ),
    tag = "Devoir"
)]
pub async fn list_devoir(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let entries = sqlx::query_as::<_, Devoir>(
        r#"
        SELECT id, teacher_name, class_name, thursday_date, status, sent_date, days_late
        FROM devoir
        ORDER BY thursday_date DESC, id DESC
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(entries))
}
