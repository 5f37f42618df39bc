use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{models::DetailResponse, repository::RepositoryError};

/// ApiError
///
/// Every failure a request can end in. Each variant maps to one fixed status code and a
/// `{"detail": ...}` body; none of them is retried or recovered.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad username/password at login.
    #[error("Incorrect username or password")]
    AuthenticationFailed,
    /// Missing, malformed, expired or foreign bearer token.
    #[error("Invalid token")]
    InvalidToken,
    #[error("Item not found")]
    NotFound,
    /// Storage or signing failure. The cause is logged where it happens, never returned.
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::AuthenticationFailed => StatusCode::BAD_REQUEST,
            ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(_) => ApiError::NotFound,
            RepositoryError::Database(_) => ApiError::Internal,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(DetailResponse {
            detail: self.to_string(),
        });
        let mut response = (self.status(), body).into_response();
        if matches!(self, ApiError::InvalidToken) {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
