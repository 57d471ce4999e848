//! The request-facing facade.
//!
//! [`SessionAuth`] is the one type the HTTP layer talks to. It reads the
//! session cookie, resolves it through a [`SessionRepository`], and logs users
//! in and out through an [`Authenticator`].

use std::fmt;
use std::sync::Arc;

use http::{HeaderMap, Request, StatusCode};

use crate::AuthError;
use crate::authenticator::Authenticator;
use crate::crypto::SecretString;
use crate::session::{
    SessionConfig, SessionRepository, append_cookie, read_cookie, removal_cookie, session_cookie,
};

/// The authenticated user, attached to the request extensions by
/// [`SessionAuth::gate`].
///
/// Downstream handlers retrieve it with
/// `request.extensions().get::<CurrentUser<U>>()`, or with the axum extractor
/// of the same name.
pub struct CurrentUser<U>(pub Arc<U>);

impl<U> CurrentUser<U> {
    /// Borrows the authenticated user.
    pub fn user(&self) -> &U {
        &self.0
    }

    /// Returns the shared handle to the user.
    pub fn into_inner(self) -> Arc<U> {
        self.0
    }
}

impl<U> Clone for CurrentUser<U> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<U: fmt::Debug> fmt::Debug for CurrentUser<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CurrentUser").field(&self.0).finish()
    }
}

/// Maps a library error to the HTTP status the facade aborts with.
pub fn status_for(err: &AuthError) -> StatusCode {
    match err {
        AuthError::InvalidCredentials
        | AuthError::NotFound
        | AuthError::NotAuthenticated
        | AuthError::SessionExpired => StatusCode::UNAUTHORIZED,
        AuthError::RandomSourceFailure
        | AuthError::PasswordHashError
        | AuthError::DatabaseError(_)
        | AuthError::ConfigurationError(_)
        | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Cookie-based session authentication.
///
/// # Example
///
/// ```rust,ignore
/// let auth = SessionAuth::new(
///     RepositoryAuthenticator::<_, User>::by_email(users),
///     InMemorySessionRepository::new(),
/// );
///
/// let user = auth.login("jane@example.com", &password, response.headers_mut()).await?;
/// ```
pub struct SessionAuth<A, S> {
    authenticator: A,
    sessions: S,
    config: SessionConfig,
}

impl<A, S> SessionAuth<A, S>
where
    A: Authenticator,
    S: SessionRepository<A::User>,
{
    /// Creates a facade with the default [`SessionConfig`].
    pub fn new(authenticator: A, sessions: S) -> Self {
        SessionAuth {
            authenticator,
            sessions,
            config: SessionConfig::default(),
        }
    }

    /// Creates a facade with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ConfigurationError` if the configuration is invalid.
    pub fn with_config(
        authenticator: A,
        sessions: S,
        config: SessionConfig,
    ) -> Result<Self, AuthError> {
        config.validate()?;
        Ok(SessionAuth {
            authenticator,
            sessions,
            config,
        })
    }

    /// The cookie and lifetime settings in effect.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The session store.
    pub fn sessions(&self) -> &S {
        &self.sessions
    }

    /// The credential verifier.
    pub fn authenticator(&self) -> &A {
        &self.authenticator
    }

    /// Admits or rejects an incoming request.
    ///
    /// On success the session is touched and a [`CurrentUser`] is inserted
    /// into the request extensions.
    ///
    /// # Returns
    ///
    /// - `Ok(user)` - the session's user
    /// - `Err(AuthError::NotAuthenticated)` - no session cookie
    /// - `Err(AuthError::NotFound)` - the token is not a live session
    /// - `Err(AuthError::SessionExpired)` - idle longer than `idle_timeout`
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "session_gate", skip_all, err)
    )]
    pub async fn gate<B: Send>(&self, request: &mut Request<B>) -> Result<Arc<A::User>, AuthError> {
        let user = self.authenticate_headers(request.headers()).await?;
        request
            .extensions_mut()
            .insert(CurrentUser(Arc::clone(&user)));
        Ok(user)
    }

    /// Resolves the session cookie in `headers` to a user, touching the session.
    ///
    /// Same checks as [`gate`](Self::gate) without attaching anything.
    pub async fn authenticate_headers(
        &self,
        headers: &HeaderMap,
    ) -> Result<Arc<A::User>, AuthError> {
        let token =
            read_cookie(headers, &self.config.cookie_name).ok_or(AuthError::NotAuthenticated)?;

        let mut session = self
            .sessions
            .get_session(&token)
            .await?
            .ok_or(AuthError::NotFound)?;

        if let Some(idle_timeout) = self.config.idle_timeout {
            if session.is_idle(idle_timeout) {
                self.sessions.delete_session(&token).await?;
                log::info!(target: "sessid", "msg=\"idle session rejected\"");
                return Err(AuthError::SessionExpired);
            }
        }

        self.sessions.touch(&mut session).await?;
        Ok(session.user)
    }

    /// Verifies the credentials, opens a session and sets the session cookie
    /// on `response_headers`.
    ///
    /// The error is returned untouched so the caller can decide how to
    /// respond. See [`login_with_abort`](Self::login_with_abort) for the
    /// status-code variant.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown login or wrong
    /// password. If the cookie cannot be encoded the new session is deleted
    /// before the error is returned, so a failed login never leaves one behind.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "session_login", skip_all, err)
    )]
    pub async fn login(
        &self,
        login: &str,
        password: &SecretString,
        response_headers: &mut HeaderMap,
    ) -> Result<Arc<A::User>, AuthError> {
        let user = match self.authenticator.authenticate(login, password).await {
            Ok(user) => Arc::new(user),
            Err(err) => {
                log::warn!(target: "sessid", "msg=\"login failed\" error=\"{err}\"");
                return Err(err);
            }
        };

        let session = self.sessions.create_session(user).await?;
        if let Err(err) = append_cookie(
            response_headers,
            &session_cookie(&session.token, &self.config),
        ) {
            // no cookie, no reachable session
            self.sessions.delete_session(&session.token).await?;
            log::error!(target: "sessid", "msg=\"session cookie rejected\" error=\"{err}\"");
            return Err(err);
        }

        log::info!(target: "sessid", "msg=\"login success\"");
        Ok(session.user)
    }

    /// Like [`login`](Self::login), but maps failures to the HTTP status the
    /// request should be aborted with.
    pub async fn login_with_abort(
        &self,
        login: &str,
        password: &SecretString,
        response_headers: &mut HeaderMap,
    ) -> Result<Arc<A::User>, StatusCode> {
        self.login(login, password, response_headers)
            .await
            .map_err(|err| status_for(&err))
    }

    /// Ends the session named by the request's cookie and tells the client to
    /// drop the cookie.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - session deleted, removal cookie appended
    /// - `Err(AuthError::NotAuthenticated)` - no cookie, or no such session
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "session_logout", skip_all, err)
    )]
    pub async fn logout(
        &self,
        request_headers: &HeaderMap,
        response_headers: &mut HeaderMap,
    ) -> Result<(), AuthError> {
        let token = read_cookie(request_headers, &self.config.cookie_name)
            .ok_or(AuthError::NotAuthenticated)?;

        if !self.sessions.delete_session(&token).await? {
            return Err(AuthError::NotAuthenticated);
        }

        append_cookie(response_headers, &removal_cookie(&self.config))?;

        log::info!(target: "sessid", "msg=\"logout success\"");
        Ok(())
    }
}
