use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct JournalEntry {
    pub id: u64,
    #[schema(example = "Ana")]
    pub teacher_name: String,
    #[schema(example = "2026-10-16", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "up to date")]
    pub status: String,
    pub observation: Option<String>,
    /// Days the journal lags behind the lesson plan
    #[schema(example = 2)]
    pub outdated_days: Option<i32>,
}
