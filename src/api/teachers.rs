use crate::{
    error::{ApiError, ValidationError},
    model::teacher::{Teacher, split_classes},
    utils::{
        db_utils::{UpdatableColumns, build_update_sql, execute_update},
        teacher_cache::TeacherDirectory,
    },
};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::ToSchema;

const TEACHER_COLUMNS: UpdatableColumns<'static> = UpdatableColumns {
    allowed: &["name", "first_day", "subject", "assigned_classes"],
    // dropped from the schema, still sent by older clients
    ignored: &["level"],
};

#[derive(Deserialize, ToSchema)]
pub struct CreateTeacher {
    #[schema(example = "Ana")]
    pub name: String,
    #[schema(example = "2024-09-02", format = "date", value_type = Option<String>)]
    pub first_day: Option<NaiveDate>,
    #[schema(example = "Mathematics")]
    pub subject: Option<String>,
    #[schema(example = "6A, 6B")]
    pub assigned_classes: Option<String>,
}

/// List teachers
#[utoipa::path(
    get,
    path = "/api/teachers",
    responses(
        (status = 200, description = "Teachers ordered by name", body = [Teacher]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Teacher"
)]
pub async fn list_teachers(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let teachers = sqlx::query_as::<_, Teacher>(
        "SELECT id, name, first_day, subject, assigned_classes FROM teachers ORDER BY name",
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(teachers))
}

/// Create Teacher
#[utoipa::path(
    post,
    path = "/api/teachers",
    request_body = CreateTeacher,
    responses(
        (status = 201, description = "Teacher created", body = Object, example = json!({
            "message": "Teacher created", "id": 12
        })),
        (status = 400, description = "Empty or duplicate name"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Teacher"
)]
pub async fn create_teacher(
    pool: web::Data<MySqlPool>,
    directory: web::Data<TeacherDirectory>,
    payload: web::Json<CreateTeacher>,
) -> Result<HttpResponse, ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ValidationError::Payload("Teacher name must not be empty".into()).into());
    }

    let result = sqlx::query(
        r#"
        INSERT INTO teachers (name, first_day, subject, assigned_classes)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(name)
    .bind(payload.first_day)
    .bind(&payload.subject)
    .bind(&payload.assigned_classes)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(res) => {
            directory.invalidate().await;
            info!(teacher = %name, "Teacher created");
            Ok(HttpResponse::Created().json(json!({
                "message": "Teacher created",
                "id": res.last_insert_id()
            })))
        }
        Err(e) => {
            // Duplicate name
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Err(ValidationError::Payload(format!(
                        "Teacher {name:?} already exists"
                    ))
                    .into());
                }
            }
            error!(error = %e, teacher = %name, "Failed to create teacher");
            Err(e.into())
        }
    }
}

/// Update Teacher
#[utoipa::path(
    put,
    path = "/api/teachers/{teacher_id}",
    params(
        ("teacher_id", Path, description = "Teacher ID")
    ),
    request_body(
        content = Object,
        description = "Any of name, first_day, subject, assigned_classes",
        example = json!({"subject": "Physics"})
    ),
    responses(
        (status = 200, description = "Teacher updated successfully"),
        (status = 400, description = "Unsupported field"),
        (status = 404, description = "Teacher not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Teacher"
)]
pub async fn update_teacher(
    pool: web::Data<MySqlPool>,
    directory: web::Data<TeacherDirectory>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let teacher_id = path.into_inner();

    let update = build_update_sql("teachers", &body, &TEACHER_COLUMNS, "id", teacher_id)?;

    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        error!(error = %e, teacher_id, "Failed to update teacher");
        ApiError::from(e)
    })?;

    if affected == 0 {
        return Err(ApiError::NotFound(format!("Teacher {teacher_id}")));
    }

    directory.invalidate().await;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Teacher updated successfully"
    })))
}

/// Delete Teacher
#[utoipa::path(
    delete,
    path = "/api/teachers/{teacher_id}",
    params(
        ("teacher_id", Path, description = "Teacher ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Teacher not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Teacher"
)]
pub async fn delete_teacher(
    pool: web::Data<MySqlPool>,
    directory: web::Data<TeacherDirectory>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let teacher_id = path.into_inner();

    let res = sqlx::query("DELETE FROM teachers WHERE id = ?")
        .bind(teacher_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, teacher_id, "Failed to delete teacher");
            ApiError::from(e)
        })?;

    if res.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("Teacher {teacher_id}")));
    }

    directory.invalidate().await;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}

/// Classes assigned to a teacher
#[utoipa::path(
    get,
    path = "/api/teachers/by-name/{name}/classes",
    params(("name" = String, Path, description = "Teacher name")),
    responses(
        (status = 200, description = "Class codes", body = [String], example = json!(["6A", "6B"])),
        (status = 404, description = "Teacher not found")
    ),
    tag = "Teacher"
)]
pub async fn teacher_classes(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let name = path.into_inner();

    let assigned = sqlx::query_scalar::<_, Option<String>>(
        "SELECT assigned_classes FROM teachers WHERE name = ? LIMIT 1",
    )
    .bind(&name)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("Teacher {name}")))?;

    Ok(HttpResponse::Ok().json(split_classes(assigned.as_deref().unwrap_or_default())))
}
