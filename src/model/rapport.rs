use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Rapport {
    pub id: u64,
    #[schema(example = "First term report")]
    pub title: String,
    #[schema(example = "2026-12-18", value_type = String, format = "date")]
    pub due_date: NaiveDate,
    #[schema(example = "6A, 6B")]
    pub classes: Option<String>,
}

/// A delivery joined with the rapport it answers. Title and due date are
/// null once the rapport is gone.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct RapportDelivery {
    pub id: u64,
    pub rapport_id: u64,
    pub title: Option<String>,
    #[schema(value_type = Option<String>, format = "date")]
    pub due_date: Option<NaiveDate>,
    pub teacher_name: String,
    #[schema(value_type = Option<String>, format = "date")]
    pub delivered_day: Option<NaiveDate>,
    pub delivered_classes: Option<String>,
    pub days_late: Option<i32>,
}
