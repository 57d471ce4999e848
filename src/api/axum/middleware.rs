use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::error::AppError;
use crate::{AuthError, Authenticator, CurrentUser, SessionAuth, SessionRepository};

/// Rejects requests without a live session with 401.
///
/// Admitted requests carry a [`CurrentUser`] in their extensions.
///
/// # Example
///
/// ```rust,ignore
/// use axum::middleware::from_fn_with_state;
///
/// let app = Router::new()
///     .route("/dashboard", get(dashboard))
///     .route_layer(from_fn_with_state(auth.clone(), require_session::<A, S>));
/// ```
pub async fn require_session<A, S>(
    State(auth): State<Arc<SessionAuth<A, S>>>,
    mut request: Request,
    next: Next,
) -> Response
where
    A: Authenticator + 'static,
    S: SessionRepository<A::User> + 'static,
{
    match auth.gate(&mut request).await {
        Ok(_) => next.run(request).await,
        Err(err) => AppError(err).into_response(),
    }
}

/// reads the user attached by [`require_session`]
impl<U, St> FromRequestParts<St> for CurrentUser<U>
where
    U: Send + Sync + 'static,
    St: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser<U>>()
            .cloned()
            .ok_or(AppError(AuthError::NotAuthenticated))
    }
}
