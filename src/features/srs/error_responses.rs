use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::data::models::SrsError;

const RETRY_AFTER_SECS: &str = "1";

impl IntoResponse for SrsError {
    fn into_response(self) -> Response {
        let status = match &self {
            e if e.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
            SrsError::InvalidConfig(_)
            | SrsError::Validation(_)
            | SrsError::EmptyLesson
            | SrsError::TimestampOutOfRange(_) => StatusCode::BAD_REQUEST,
            SrsError::LearnerNotFound(_) | SrsError::LessonNotFound(_) => StatusCode::NOT_FOUND,
            SrsError::Pool(_) => StatusCode::SERVICE_UNAVAILABLE,
            SrsError::Database(_) | SrsError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        }

        let body = json!({
            "error": self.to_string(),
            "status": status.as_u16()
        });

        if status == StatusCode::SERVICE_UNAVAILABLE {
            return (status, [(header::RETRY_AFTER, RETRY_AFTER_SECS)], axum::Json(body))
                .into_response();
        }
        (status, axum::Json(body)).into_response()
    }
}
