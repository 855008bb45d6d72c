// region:    --- Imports
use crate::store::StoreError;
use crate::views;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;
use tracing::error;

// endregion: --- Imports

/// Request level failure rendered as an error page.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Page not found.")]
    NotFound,
    #[error("You are not allowed to do that.")]
    Forbidden,
    #[error("{0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ListingNotFound(_) | StoreError::UserNotFound(_) => AppError::NotFound,
            StoreError::NotOwner { .. } => AppError::Forbidden,
            StoreError::UsernameTaken | StoreError::Bid(_) => AppError::BadRequest(err.to_string()),
            StoreError::Database(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Internal(format!("session token: {err}"))
    }
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(err: argon2::password_hash::Error) -> Self {
        AppError::Internal(format!("password hash: {err}"))
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(detail) => {
                error!("{:<12} --> {}", "Error", detail);
                "Something went wrong. Please try again later.".to_string()
            }
            other => other.to_string(),
        };
        (status, Html(views::error_page(status, &message))).into_response()
    }
}
