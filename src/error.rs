use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Request-level error taxonomy. Every variant maps to one status code and
/// is rendered to the caller as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized. {0}")]
    Unauthorized(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("Insufficient stock")]
    InsufficientStock,
    #[error("Need is already completed")]
    NeedCompleted,
    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) | ApiError::InsufficientStock | ApiError::NeedCompleted => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let ApiError::Internal(detail) = &self {
            log::error!("request failed: {}", detail);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Record"),
            err => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<bcrypt::BcryptError> for ApiError {
    fn from(err: bcrypt::BcryptError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn other_database_errors_map_to_internal() {
        let err = ApiError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, ApiError::Internal(_)));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn status_codes_match_the_taxonomy() {
        let cases = [
            (
                ApiError::Unauthorized("No token provided".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
            (ApiError::NotFound("Need"), StatusCode::NOT_FOUND),
            (
                ApiError::Validation("bad input".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::InsufficientStock, StatusCode::BAD_REQUEST),
            (ApiError::NeedCompleted, StatusCode::BAD_REQUEST),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
