use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Ana",
        "first_day": "2024-09-02",
        "subject": "Mathematics",
        "assigned_classes": "6A, 6B"
    })
)]
pub struct Teacher {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Ana")]
    pub name: String,

    #[schema(example = "2024-09-02", value_type = Option<String>, format = "date")]
    pub first_day: Option<NaiveDate>,

    #[schema(example = "Mathematics", nullable = true)]
    pub subject: Option<String>,

    /// Comma separated class codes
    #[schema(example = "6A, 6B", nullable = true)]
    pub assigned_classes: Option<String>,
}

/// Split a stored `assigned_classes` value into class codes.
pub fn split_classes(assigned: &str) -> Vec<String> {
    assigned
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_are_trimmed_and_empty_parts_dropped() {
        assert_eq!(split_classes(" 6A,6B , ,7C,"), vec!["6A", "6B", "7C"]);
        assert!(split_classes("").is_empty());
        assert!(split_classes(" , ").is_empty());
    }
}
