use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::{DbErr, models::todo::TodoError};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Todo(#[from] TodoError),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            ApiError::Todo(err) => match err {
                TodoError::TodoNotFound | TodoError::SubtaskNotFound => StatusCode::NOT_FOUND,
                TodoError::Validation(_) => StatusCode::BAD_REQUEST,
                TodoError::Database(DbErr::RecordNotFound(_)) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Database(db_err) => match db_err {
                DbErr::RecordNotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status_code.is_server_error() {
            tracing::error!(
                status = %status_code,
                error = %self,
                "API request failed"
            );
        }

        let response: ApiResponse<()> = match self {
            ApiError::Todo(TodoError::Validation(errors)) => ApiResponse::validation(errors),
            ApiError::Todo(TodoError::TodoNotFound) => ApiResponse::error("Todo not found"),
            ApiError::Todo(TodoError::SubtaskNotFound) => ApiResponse::error("Subtask not found"),
            ApiError::Todo(TodoError::Database(DbErr::RecordNotFound(message)))
            | ApiError::Database(DbErr::RecordNotFound(message)) => ApiResponse::error(&message),
            ApiError::Todo(err) => ApiResponse::server_error(&err.to_string()),
            ApiError::Database(err) => ApiResponse::server_error(&err.to_string()),
            ApiError::Unauthorized => ApiResponse::error("Unauthorized"),
            ApiError::NotFound(message) => ApiResponse::error(&message),
            ApiError::BadRequest(message) => ApiResponse::error(&message),
            ApiError::Internal(message) => ApiResponse::server_error(&message),
        };

        (status_code, Json(response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use utils::response::FieldError;

    use super::*;

    #[test]
    fn api_error_maps_to_expected_http_statuses() {
        assert_eq!(
            ApiError::BadRequest("bad".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::NotFound("missing".to_string())
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal("boom".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn domain_errors_map_to_expected_http_statuses() {
        assert_eq!(
            ApiError::from(TodoError::TodoNotFound)
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(TodoError::SubtaskNotFound)
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(TodoError::Validation(vec![FieldError::new(
                "title",
                "Title is required"
            )]))
            .into_response()
            .status(),
            StatusCode::BAD_REQUEST
        );
    }
}
