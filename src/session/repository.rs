//! Session repository trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;

use super::Session;
use crate::AuthError;

/// Storage for live sessions, keyed by token.
///
/// Implementations are shared between concurrent request handlers and must
/// serialize access to their state.
#[async_trait]
pub trait SessionRepository<U: Send + Sync + 'static>: Send + Sync {
    /// Creates a session for `user` under a freshly generated token.
    ///
    /// Never overwrites a live session.
    async fn create_session(&self, user: Arc<U>) -> Result<Session<U>, AuthError>;

    /// Finds a session by its token. Does not modify it.
    async fn get_session(&self, token: &str) -> Result<Option<Session<U>>, AuthError>;

    /// Marks the session as used now, in the store and in `session`.
    async fn touch(&self, session: &mut Session<U>) -> Result<(), AuthError>;

    /// Removes the session. Absent tokens are not an error.
    ///
    /// Returns `true` if this call removed the session. Lookup and removal
    /// happen as one step, so concurrent deletes of one token see exactly
    /// one `true`.
    async fn delete_session(&self, token: &str) -> Result<bool, AuthError>;

    /// Removes sessions unused for longer than `idle_timeout`.
    ///
    /// Returns the number of sessions pruned.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ConfigurationError` if `idle_timeout` is not
    /// positive.
    async fn prune_idle(&self, idle_timeout: Duration) -> Result<u64, AuthError>;
}
