use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct MaterialEntry {
    pub id: u64,
    pub teacher_name: String,
    #[schema(example = "Whiteboard markers")]
    pub material: String,
    #[schema(example = 12)]
    pub quantity: Option<i32>,
    #[schema(example = "2026-10-16", value_type = String, format = "date")]
    pub date: NaiveDate,
}
