use axum::response::{IntoResponse, Response};
use http::StatusCode;
use tracing::error;

use crate::{menu::CATALOG_MENU, views};

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),
    #[error("Store error: {0}")]
    Store(library_dal::Error),
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<library_dal::Error> for ApiError {
    fn from(value: library_dal::Error) -> Self {
        match value {
            library_dal::Error::RecordNotFound(entity) => {
                ApiError::NotFound(format!("{entity} not found"))
            }
            other => ApiError::Store(other),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::NotFound(msg)
            | ApiError::InvalidRequest(msg)
            | ApiError::UnsupportedMediaType(msg) => msg,
            ApiError::Store(e) => {
                error!("Store error: {e}");
                "Internal server error".to_string()
            }
            ApiError::Internal(e) => {
                error!("Internal error: {e:#}");
                "Internal server error".to_string()
            }
        };
        (
            status,
            views::html(views::error_page(&CATALOG_MENU, status, &message)),
        )
            .into_response()
    }
}
