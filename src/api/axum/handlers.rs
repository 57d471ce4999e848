//! HTTP handlers for the session endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Serialize;

use super::error::AppError;
use crate::api::{LoginRequest, MessageResponse};
use crate::{Authenticator, CurrentUser, SessionAuth, SessionRepository};

/// Verify credentials and open a session.
///
/// POST /login
pub async fn login<A, S>(
    State(auth): State<Arc<SessionAuth<A, S>>>,
    Json(body): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<Arc<A::User>>), AppError>
where
    A: Authenticator + 'static,
    A::User: Serialize,
    S: SessionRepository<A::User> + 'static,
{
    let mut headers = HeaderMap::new();
    let user = auth.login(&body.login, &body.password, &mut headers).await?;
    Ok((headers, Json(user)))
}

/// End the current session and clear the cookie.
///
/// POST /logout
pub async fn logout<A, S>(
    State(auth): State<Arc<SessionAuth<A, S>>>,
    request_headers: HeaderMap,
) -> Result<(HeaderMap, Json<MessageResponse>), AppError>
where
    A: Authenticator + 'static,
    S: SessionRepository<A::User> + 'static,
{
    let mut headers = HeaderMap::new();
    auth.logout(&request_headers, &mut headers).await?;
    Ok((
        headers,
        Json(MessageResponse {
            message: "Logged out".to_owned(),
        }),
    ))
}

/// Return the user behind the session cookie.
///
/// GET /me
pub async fn me<A, S>(CurrentUser(user): CurrentUser<A::User>) -> Json<Arc<A::User>>
where
    A: Authenticator + 'static,
    A::User: Serialize,
    S: SessionRepository<A::User> + 'static,
{
    Json(user)
}
