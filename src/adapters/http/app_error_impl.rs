use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    adapters::http::envelope,
    app_error::{AppError, ErrorCode},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error before it gets flattened into a status response.
        // Messages carry no credential or token material.
        tracing::error!(error = ?self, "Request failed");

        let (status, code) = match &self {
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DatabaseError),
            AppError::InvalidInput(_) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidInput),
            AppError::NotFound => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, ErrorCode::InvalidCredentials)
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized),
            AppError::TokenExpired => (StatusCode::UNAUTHORIZED, ErrorCode::TokenExpired),
            AppError::StaleRefreshToken => {
                (StatusCode::UNAUTHORIZED, ErrorCode::StaleRefreshToken)
            }
            AppError::ResetTokenInvalid => {
                (StatusCode::BAD_REQUEST, ErrorCode::InvalidOrExpiredToken)
            }
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError),
        };

        // Internal details stay in the log; the client sees the generic text.
        let message = match &self {
            AppError::Database(_) => "Internal server error".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        envelope::fail(status, code, &message)
    }
}
