use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use forum_auth::ErrorResponse;
use forum_core::storage::{repository_error_to_status_code, RepositoryError};

use crate::services::ServiceError;

pub struct AppError(pub anyhow::Error);

impl AppError {
    fn status_code(&self) -> StatusCode {
        let code = if let Some(err) = self.0.downcast_ref::<ServiceError>() {
            match err {
                ServiceError::NotFound(_) => 404,
                ServiceError::BadRequest(_) | ServiceError::Validation(_) => 400,
                ServiceError::Repository(repo_error) => repository_error_to_status_code(repo_error),
            }
        } else if let Some(repo_error) = self.0.downcast_ref::<RepositoryError>() {
            repository_error_to_status_code(repo_error)
        } else {
            500
        };

        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
            match status {
                StatusCode::SERVICE_UNAVAILABLE => "Service temporarily unavailable".to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            tracing::debug!(status = %status, message = %self.0, "Request rejected");
            self.0.to_string()
        };

        ErrorResponse::new(status, message).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
