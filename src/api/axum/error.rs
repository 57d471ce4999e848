use axum::Json;
use axum::response::{IntoResponse, Response};

use crate::api::ErrorResponse;
use crate::{AuthError, status_for};

/// converts `AuthError` into appropriate HTTP responses
#[derive(Debug)]
pub struct AppError(pub AuthError);

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        (status, Json(ErrorResponse::from(self.0))).into_response()
    }
}
