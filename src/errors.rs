use crate::{pagination::PaginationError, services::ServiceError, validation::ValidationError};
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for request errors that keeps the message local.
///
/// Rendered as `{"error": message, "status": code}`, plus `"field"` when a
/// uniqueness conflict names the offending field.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub field: Option<&'static str>,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
            field: None,
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized access")
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": self.message,
            "status": self.status.as_u16()
        });
        if let Some(field) = self.field {
            body["field"] = json!(field);
        }

        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::Validation(msg) => AppError::bad_request(msg),
            ServiceError::Conflict { field } => AppError {
                status: StatusCode::BAD_REQUEST,
                message,
                field: Some(field),
            },
            ServiceError::NotFound(msg) => AppError::not_found(msg),
            ServiceError::Unauthorized => AppError::unauthorized(),
            ServiceError::InvalidCredentials => AppError::new(StatusCode::UNAUTHORIZED, message),
            ServiceError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                AppError::internal("internal server error")
            }
            ServiceError::Sqlx(err) => {
                tracing::error!("database error: {}", err);
                AppError::internal("internal server error")
            }
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::bad_request(err.0)
    }
}

impl From<PaginationError> for AppError {
    fn from(err: PaginationError) -> Self {
        AppError::bad_request(err.to_string())
    }
}

/// Wrong content type, bad syntax and wrong field types are all plain 400s.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::bad_request(format!("invalid Host header: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_statuses() {
        let cases = [
            (ServiceError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Conflict { field: "list_name" }, StatusCode::BAD_REQUEST),
            (ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ServiceError::Unauthorized, StatusCode::UNAUTHORIZED),
            (ServiceError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (ServiceError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status, status);
        }
    }

    #[test]
    fn conflict_carries_field_name() {
        let err = AppError::from(ServiceError::Conflict { field: "username" });
        assert_eq!(err.field, Some("username"));
        assert_eq!(err.message, "The username already exists");
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let err = AppError::from(ServiceError::Internal("secret path /etc".into()));
        assert_eq!(err.message, "internal server error");
    }
}
