use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use polls_core::error::CoreError;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found")]
    NotFound,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Machine-readable error code string.
    fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound => "NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        let message = match &self {
            ApiError::Internal(err) => {
                tracing::error!("API internal error: {err:#}");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "code": code,
            "message": message,
            "error": message,
            "details": Value::Null,
        });

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NotFound => ApiError::NotFound,
            CoreError::InvalidSelection => {
                ApiError::BadRequest(crate::routes::polls::NO_CHOICE_MESSAGE.to_string())
            }
            CoreError::BadRequest(msg) => ApiError::BadRequest(msg),
            CoreError::Database(err) => err.into(),
        }
    }
}

impl From<polls_db::DbError> for ApiError {
    fn from(e: polls_db::DbError) -> Self {
        match e {
            polls_db::DbError::NotFound => ApiError::NotFound,
            polls_db::DbError::Sqlx(err) => {
                ApiError::Internal(anyhow::anyhow!("database error: {err}"))
            }
        }
    }
}
