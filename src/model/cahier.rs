use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One notebook inspection.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Cahier {
    pub id: u64,
    pub teacher_name: String,
    #[schema(example = "2026-10-16", value_type = String, format = "date")]
    pub inspection_date: NaiveDate,
    #[schema(example = "2026-10-09", value_type = Option<String>, format = "date")]
    pub last_corrected_date: Option<NaiveDate>,
    pub last_corrected_module: Option<String>,
    pub last_corrected_title: Option<String>,
    pub observation: Option<String>,
}

/// A lesson found uncorrected during an inspection.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct UncorrectedLesson {
    pub id: u64,
    pub cahier_id: u64,
    #[schema(example = "2026-10-12", value_type = Option<String>, format = "date")]
    pub lesson_date: Option<NaiveDate>,
    pub module: Option<String>,
    pub title: Option<String>,
}
