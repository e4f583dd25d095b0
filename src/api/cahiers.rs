use std::collections::HashMap;

use crate::{
    error::ApiError,
    model::cahier::{Cahier, UncorrectedLesson},
};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct NewUncorrectedLesson {
    #[schema(example = "2026-10-12", format = "date", value_type = Option<String>)]
    pub lesson_date: Option<NaiveDate>,
    #[schema(example = "Fractions")]
    pub module: Option<String>,
    #[schema(example = "Adding unlike fractions")]
    pub title: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateCahier {
    #[schema(example = "Ana")]
    pub teacher_name: String,
    #[schema(example = "2026-10-16", format = "date", value_type = String)]
    pub inspection_date: NaiveDate,
    #[schema(example = "2026-10-09", format = "date", value_type = Option<String>)]
    pub last_corrected_date: Option<NaiveDate>,
    pub last_corrected_module: Option<String>,
    pub last_corrected_title: Option<String>,
    pub observation: Option<String>,
    #[serde(default)]
    pub uncorrected: Vec<NewUncorrectedLesson>,
}

#[derive(Serialize, ToSchema)]
pub struct CahierResponse {
    pub cahier: Cahier,
    pub uncorrected: Vec<UncorrectedLesson>,
}

/// Record a notebook inspection with its uncorrected lessons
#[utoipa::path(
    post,
    path = "/api/cahiers",
    request_body = CreateCahier,
    responses(
        (status = 201, description = "Inspection recorded", body = Object, example = json!({
            "message": "Inspection recorded", "id": 5
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Cahier"
)]
pub async fn create_cahier(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateCahier>,
) -> Result<HttpResponse, ApiError> {
    let mut tx = pool.begin().await?;

    let cahier_id = sqlx::query(
        r#"
        INSERT INTO cahiers
            (teacher_name, inspection_date, last_corrected_date,
             last_corrected_module, last_corrected_title, observation)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.teacher_name)
    .bind(payload.inspection_date)
    .bind(payload.last_corrected_date)
    .bind(&payload.last_corrected_module)
    .bind(&payload.last_corrected_title)
    .bind(&payload.observation)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        error!(error = %e, teacher = %payload.teacher_name, "Failed to add cahier");
        ApiError::from(e)
    })?
    .last_insert_id();

    for lesson in &payload.uncorrected {
        sqlx::query(
            r#"
            INSERT INTO cahiers_uncorrected (cahier_id, lesson_date, module, title)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(cahier_id)
        .bind(lesson.lesson_date)
        .bind(&lesson.module)
        .bind(&lesson.title)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, cahier_id, "Failed to add uncorrected lesson");
            ApiError::from(e)
        })?;
    }

    tx.commit().await?;
    info!(cahier_id, lessons = payload.uncorrected.len(), "Inspection recorded");

    Ok(HttpResponse::Created().json(json!({
        "message": "Inspection recorded",
        "id": cahier_id
    })))
}

/// Inspections, newest first
#[utoipa::path(
    get,
    path = "/api/cahiers",
    responses(
        (status = 200, description = "Inspections with their uncorrected lessons", body = [CahierResponse])
    ),
    tag = "Cahier"
)]
pub async fn list_cahiers(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let cahiers = sqlx::query_as::<_, Cahier>(
        r#"
        SELECT id, teacher_name, inspection_date, last_corrected_date,
               last_corrected_module, last_corrected_title, observation
        FROM cahiers
        ORDER BY inspection_date DESC, id DESC
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    // one query for all lessons instead of one per cahier
    let lessons = sqlx::query_as::<_, UncorrectedLesson>(
        "SELECT id, cahier_id, lesson_date, module, title FROM cahiers_uncorrected ORDER BY id",
    )
    .fetch_all(pool.get_ref())
    .await?;

    let mut by_cahier: HashMap<u64, Vec<UncorrectedLesson>> = HashMap::new();
    for lesson in lessons {
        by_cahier.entry(lesson.cahier_id).or_default().push(lesson);
    }

    let data: Vec<CahierResponse> = cahiers
        .into_iter()
        .map(|cahier| CahierResponse {
            uncorrected: by_cahier.remove(&cahier.id).unwrap_or_default(),
            cahier,
        })
        .collect();

    Ok(HttpResponse::Ok().json(data))
}
