use serde::{Deserialize, Serialize};

use crate::SecretString;

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email or username, depending on the authenticator's lookup field.
    pub login: String,
    pub password: SecretString,
}

// Response DTOs

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<crate::AuthError> for ErrorResponse {
    fn from(err: crate::AuthError) -> Self {
        let code = match &err {
            crate::AuthError::RandomSourceFailure => "RANDOM_SOURCE_FAILURE",
            crate::AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            crate::AuthError::NotFound => "SESSION_NOT_FOUND",
            crate::AuthError::NotAuthenticated => "NOT_AUTHENTICATED",
            crate::AuthError::SessionExpired => "SESSION_EXPIRED",
            crate::AuthError::PasswordHashError => "PASSWORD_HASH_ERROR",
            crate::AuthError::DatabaseError(_) => "DATABASE_ERROR",
            crate::AuthError::ConfigurationError(_) => "CONFIGURATION_ERROR",
            crate::AuthError::Internal(_) => "INTERNAL_ERROR",
        };

        ErrorResponse {
            error: err.to_string(),
            code: code.to_owned(),
        }
    }
}
