use std::sync::Arc;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use serde::Serialize;

use super::handlers;
use super::middleware::require_session;
use crate::{Authenticator, SessionAuth, SessionRepository};

/// `POST /login`, `POST /logout` and the gated `GET /me`.
///
/// # Example
///
/// ```rust,ignore
/// let auth = Arc::new(SessionAuth::new(authenticator, InMemorySessionRepository::new()));
/// let app = Router::new().nest("/auth", session_routes(auth));
/// ```
pub fn session_routes<A, S>(auth: Arc<SessionAuth<A, S>>) -> Router
where
    A: Authenticator + 'static,
    A::User: Serialize,
    S: SessionRepository<A::User> + 'static,
{
    let protected = Router::new()
        .route("/me", get(handlers::me::<A, S>))
        .route_layer(from_fn_with_state(
            Arc::clone(&auth),
            require_session::<A, S>,
        ));

    Router::new()
        .route("/login", post(handlers::login::<A, S>))
        .route("/logout", post(handlers::logout::<A, S>))
        .merge(protected)
        .with_state(auth)
}
