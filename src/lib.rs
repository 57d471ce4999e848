//! Cookie-based session authentication.
//!
//! `sessid` verifies a login/password pair through a pluggable
//! [`Authenticator`], issues an opaque session token stored in an in-memory
//! [`SessionRepository`], and hands the token to the client in a cookie.
//! Every later request is admitted or rejected by [`SessionAuth::gate`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sessid::{InMemorySessionRepository, RepositoryAuthenticator, SessionAuth, User};
//!
//! let authenticator = RepositoryAuthenticator::<_, User>::by_email(my_user_repository);
//! let auth = SessionAuth::new(authenticator, InMemorySessionRepository::new());
//!
//! // login: sets the `sessid` cookie on `response_headers`
//! let user = auth.login("jane@example.com", &password, &mut response_headers).await?;
//!
//! // every request: attaches `CurrentUser<User>` to the request extensions
//! let user = auth.gate(&mut request).await?;
//! ```

pub mod api;
pub mod auth;
pub mod authenticator;
pub mod crypto;
pub mod repository;
pub mod session;

use std::fmt;

pub use auth::{CurrentUser, SessionAuth, status_for};
pub use authenticator::{Authenticator, RepositoryAuthenticator};
pub use crypto::{
    Argon2Hasher, PasswordHasher, SecretString, Sha512Hasher, set_password, verify_password,
};
pub use repository::{AuthRecord, LookupField, User, UserRepository};
#[cfg(any(test, feature = "mocks"))]
pub use repository::MockUserRepository;
pub use session::{
    InMemorySessionRepository, SameSite, Session, SessionConfig, SessionRepository,
    spawn_idle_sweeper,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The operating system's random source failed.
    RandomSourceFailure,
    /// Unknown login or wrong password; deliberately indistinguishable.
    InvalidCredentials,
    /// The session token is not known to the store.
    NotFound,
    /// No session cookie was presented.
    NotAuthenticated,
    /// The session sat idle longer than the configured timeout.
    SessionExpired,
    PasswordHashError,
    DatabaseError(String),
    ConfigurationError(String),
    Internal(String),
}

impl std::error::Error for AuthError {}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::RandomSourceFailure => write!(f, "Random source unavailable"),
            AuthError::InvalidCredentials => write!(f, "Invalid login or password"),
            AuthError::NotFound => write!(f, "Session not found"),
            AuthError::NotAuthenticated => write!(f, "User was not authenticated"),
            AuthError::SessionExpired => write!(f, "Session has expired"),
            AuthError::PasswordHashError => write!(f, "Failed to hash password"),
            AuthError::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            AuthError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
            AuthError::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}
