use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::model::attendance::AttendanceStatus;

/// User input that cannot be accepted. Reported back, never persisted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown teacher: {0}")]
    UnknownTeacher(String),

    #[error("Invalid time format (use HH:MM): {0:?}")]
    InvalidTime(String),

    #[error("No time entered for {0}: use Absent / Excused instead")]
    MissingTime(String),

    #[error("{teacher} already has a record on {date}; edit it from the records table")]
    RecordExists { teacher: String, date: String },

    #[error("Status {0} cannot be recorded here")]
    StatusNotAllowed(AttendanceStatus),

    #[error("Start date {start} is after end date {end}")]
    InvertedRange { start: String, end: String },

    #[error("Invalid confirmation token: {0}")]
    BadToken(String),

    #[error("{0}")]
    Payload(String),
}

/// A call to the record store failed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored row is malformed: {0}")]
    Corrupt(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Startup-only failures. The process exits when one is raised.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("record store unreachable: {0}")]
    Unreachable(#[source] sqlx::Error),
}

/// Error surface of the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] StoreError),

    #[error("Save failed for {teacher}: {source}")]
    SaveFailed {
        teacher: String,
        #[source]
        source: StoreError,
    },

    #[error("{0} not found")]
    NotFound(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Persistence(_) | ApiError::SaveFailed { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Persistence(e) => tracing::error!(error = %e, "Store call failed"),
            ApiError::SaveFailed { teacher, source } => {
                tracing::error!(error = %source, teacher = %teacher, "Save failed")
            }
            _ => {}
        }
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Persistence(StoreError::Database(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = ApiError::from(ValidationError::UnknownTeacher("Carl".into()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("Carl"));
    }

    #[test]
    fn persistence_maps_to_internal_error() {
        let err = ApiError::from(StoreError::Unavailable("timeout".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn save_failure_names_the_teacher() {
        let err = ApiError::SaveFailed {
            teacher: "Ana".into(),
            source: StoreError::Unavailable("timeout".into()),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "Save failed for Ana: store unavailable: timeout"
        );
    }

    #[test]
    fn not_found_names_the_entity() {
        let err = ApiError::NotFound("Rapport 7".into());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Rapport 7 not found");
    }
}
