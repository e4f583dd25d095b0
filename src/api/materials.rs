use crate::{
    error::{ApiError, ValidationError},
    model::material::MaterialEntry,
};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateMaterial {
    #[schema(example = "Ana")]
    pub teacher_name: String,
    #[schema(example = "Chalk")]
    pub material: String,
    #[schema(example = 10)]
    pub quantity: Option<i32>,
    #[schema(example = "2026-10-16", format = "date", value_type = String)]
    pub date: NaiveDate,
}

#[utoipa::path(
    post,
    path = "/api/materials",
    request_body = CreateMaterial,
    responses(
        (status = 201, description = "Handout recorded"),
        (status = 400, description = "Negative quantity"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Material"
)]
pub async fn create_material(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateMaterial>,
) -> Result<HttpResponse, ApiError> {
    if payload.quantity.is_some_and(|q| q < 0) {
        return Err(ValidationError::Payload("Quantity cannot be negative".into()).into());
    }

    sqlx::query("INSERT INTO materials (teacher_name, material, quantity, date) VALUES (?, ?, ?, ?)")
        .bind(&payload.teacher_name)
        .bind(&payload.material)
        .bind(payload.quantity)
        .bind(payload.date)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, teacher = %payload.teacher_name, "Failed to add material entry");
            ApiError::from(e)
        })?;

    Ok(HttpResponse::Created().json(json!({ "message": "Handout recorded" })))
}

#[utoipa::path(
    get,
    path = "/api/materials",
    responses(
        (status = 200, description = "Handouts, newest first", body = [MaterialEntry])
    ),
    tag = "Material"
)]
pub async fn list_materials(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let entries = sqlx::query_as::<_, MaterialEntry>(
        "SELECT id, teacher_name, material, quantity, date FROM materials ORDER BY date DESC, id DESC",
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(entries))
}
