use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Weekly homework hand-in for one class.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Devoir {
    pub id: u64,
    pub teacher_name: String,
    #[schema(example = "6A")]
    pub class_name: String,
    #[schema(example = "2026-10-15", value_type = Option<String>, format = "date")]
    pub thursday_date: Option<NaiveDate>,
    #[schema(example = "sent")]
    pub status: String,
    #[schema(value_type = Option<String>, format = "date")]
    pub sent_date: Option<NaiveDate>,
    pub days_late: Option<i32>,
}
