use crate::{
    error::ApiError,
    model::rapport::{Rapport, RapportDelivery},
    utils::db_utils::{UpdatableColumns, build_update_sql, execute_update},
};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::ToSchema;

const RAPPORT_COLUMNS: UpdatableColumns<'static> = UpdatableColumns {
    allowed: &["title", "due_date", "classes"],
    ignored: &[],
};

#[derive(Deserialize, ToSchema)]
pub struct CreateRapport {
    #[schema(example = "First term report")]
    pub title: String,
    #[schema(example = "2026-12-18", format = "date", value_type = String)]
    pub due_date: NaiveDate,
    #[schema(example = "6A, 6B")]
    pub classes: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateDelivery {
    pub rapport_id: u64,
    #[schema(example = "Ana")]
    pub teacher_name: String,
    #[schema(example = "2026-12-19", format = "date", value_type = Option<String>)]
    pub delivered_day: Option<NaiveDate>,
    #[schema(example = "6A")]
    pub delivered_classes: Option<String>,
    #[schema(example = 1)]
    pub days_late: Option<i32>,
}

#[utoipa::path(
    post,
    path = "/api/rapports",
    request_body = CreateRapport,
    responses(
        (status = 201, description = "Rapport created", body = Object, example = json!({
            "message": "Rapport created", "id": 3
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Rapport"
)]
pub async fn create_rapport(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateRapport>,
) -> Result<HttpResponse, ApiError> {
    let res = sqlx::query("INSERT INTO rapports (title, due_date, classes) VALUES (?, ?, ?)")
        .bind(&payload.title)
        .bind(payload.due_date)
        .bind(&payload.classes)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, title = %payload.title, "Failed to create rapport");
            ApiError::from(e)
        })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Rapport created",
        "id": res.last_insert_id()
    })))
}

#[utoipa::path(
    get,
    path = "/api/rapports",
    responses(
        (status = 200, description = "Rapports by due date", body = [Rapport])
    ),
    tag = "Rapport"
)]
pub async fn list_rapports(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let rapports = sqlx::query_as::<_, Rapport>(
        "SELECT id, title, due_date, classes FROM rapports ORDER BY due_date DESC, id DESC",
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(rapports))
}

#[utoipa::path(
    put,
    path = "/api/rapports/{rapport_id}",
    params(
        ("rapport_id" = i64, Path, description = "Rapport ID")
    ),
    request_body(
        content = Object,
        description = "Any of title, due_date, classes",
        example = json!({"due_date": "2026-12-20"})
    ),
    responses(
        (status = 200, description = "Rapport updated"),
        (status = 400, description = "Unsupported field"),
        (status = 404, description = "Rapport not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Rapport"
)]
pub async fn update_rapport(
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let rapport_id = path.into_inner();

    let update = build_update_sql("rapports", &body, &RAPPORT_COLUMNS, "id", rapport_id)?;

    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        error!(error = %e, rapport_id, "Failed to update rapport");
        ApiError::from(e)
    })?;

    if affected == 0 {
        return Err(ApiError::NotFound(format!("Rapport {rapport_id}")));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Rapport updated" })))
}

/// Delete a rapport together with its deliveries
#[utoipa::path(
    delete,
    path = "/api/rapports/{rapport_id}",
    params(
        ("rapport_id" = u64, Path, description = "Rapport ID")
    ),
    responses(
        (status = 200, description = "Rapport and deliveries deleted"),
        (status = 404, description = "Rapport not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Rapport"
)]
pub async fn delete_rapport(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let rapport_id = path.into_inner();
    let mut tx = pool.begin().await?;

    let deliveries = sqlx::query("DELETE FROM rapport_deliveries WHERE rapport_id = ?")
        .bind(rapport_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, rapport_id, "Failed to delete deliveries");
            ApiError::from(e)
        })?
        .rows_affected();

    let res = sqlx::query("DELETE FROM rapports WHERE id = ?")
        .bind(rapport_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, rapport_id, "Failed to delete rapport");
            ApiError::from(e)
        })?;

    if res.rows_affected() == 0 {
        // dropping the transaction rolls back the delivery delete
        return Err(ApiError::NotFound(format!("Rapport {rapport_id}")));
    }

    tx.commit().await?;
    info!(rapport_id, deliveries, "Rapport deleted");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted",
        "deliveries_removed": deliveries
    })))
}

#[utoipa::path(
    post,
    path = "/api/deliveries",
    request_body = CreateDelivery,
    responses(
        (status = 201, description = "Delivery recorded"),
        (status = 404, description = "Rapport not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Rapport"
)]
pub async fn create_delivery(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateDelivery>,
) -> Result<HttpResponse, ApiError> {
    let exists = sqlx::query_scalar::<_, u64>("SELECT id FROM rapports WHERE id = ?")
        .bind(payload.rapport_id)
        .fetch_optional(pool.get_ref())
        .await?;
    if exists.is_none() {
        return Err(ApiError::NotFound(format!("Rapport {}", payload.rapport_id)));
    }

    sqlx::query(
        r#"
        INSERT INTO rapport_deliveries
            (rapport_id, teacher_name, delivered_day, delivered_classes, days_late)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.rapport_id)
    .bind(&payload.teacher_name)
    .bind(payload.delivered_day)
    .bind(&payload.delivered_classes)
    .bind(payload.days_late)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, rapport_id = payload.rapport_id, teacher = %payload.teacher_name, "Failed to add delivery");
        ApiError::from(e)
    })?;

    Ok(HttpResponse::Created().json(json!({ "message": "Delivery recorded" })))
}

#[utoipa::path(
    get,
    path = "/api/deliveries",
    responses(
        (status = 200, description = "Deliveries with their rapport", body = [RapportDelivery])
    ),
    tag = "Rapport"
)]
pub async fn list_deliveries(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let deliveries = sqlx::query_as::<_, RapportDelivery>(
        r#"
        SELECT d.id, d.rapport_id, r.title, r.due_date, d.teacher_name,
               d.delivered_day, d.delivered_classes, d.days_late
        FROM rapport_deliveries d
        LEFT JOIN rapports r ON r.id = d.rapport_id
        ORDER BY d.delivered_day DESC, d.id DESC
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(deliveries))
}
