use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum OverrideKind {
    /// School closed on days that would normally be worked
    Vacation,
    /// Worked day that would normally be off, e.g. a Saturday
    Working,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CalendarOverride {
    pub id: u64,
    pub kind: OverrideKind,
    #[schema(example = "2026-12-21", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2027-01-03", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    #[schema(example = "Winter break")]
    pub label: Option<String>,
}

impl CalendarOverride {
    /// Whether the inclusive range touches the inclusive window `[start, end]`.
    pub fn intersects(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date >= start
    }
}
