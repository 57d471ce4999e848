mod config;
mod cookie;
mod memory_store;
mod repository;
mod sweeper;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
pub use config::{SameSite, SessionConfig};
pub use cookie::{append_cookie, read_cookie, removal_cookie, session_cookie};
pub use memory_store::InMemorySessionRepository;
pub use repository::SessionRepository;
pub use sweeper::spawn_idle_sweeper;

/// One authenticated session.
///
/// The user is shared, never copied: every clone of a session points at the
/// same record.
pub struct Session<U> {
    pub token: String,
    pub user: Arc<U>,
    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
}

impl<U> Session<U> {
    /// Creates a session for `user`, created and last used now.
    pub fn new(token: String, user: Arc<U>) -> Self {
        let now = Utc::now();
        Self {
            token,
            user,
            created_at: now,
            last_used: now,
        }
    }

    /// Returns true if the session has not been used for longer than `idle_timeout`.
    pub fn is_idle(&self, idle_timeout: Duration) -> bool {
        Utc::now() - self.last_used > idle_timeout
    }
}

impl<U> Clone for Session<U> {
    fn clone(&self) -> Self {
        Self {
            token: self.token.clone(),
            user: Arc::clone(&self.user),
            created_at: self.created_at,
            last_used: self.last_used,
        }
    }
}

impl<U: fmt::Debug> fmt::Debug for Session<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .field("created_at", &self.created_at)
            .field("last_used", &self.last_used)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::User;

    #[test]
    fn test_new_session_is_not_idle() {
        let session = Session::new("token".to_owned(), Arc::new(User::mock()));
        assert_eq!(session.created_at, session.last_used);
        assert!(!session.is_idle(Duration::minutes(5)));
    }

    #[test]
    fn test_session_idle() {
        let mut session = Session::new("token".to_owned(), Arc::new(User::mock()));
        session.last_used = Utc::now() - Duration::hours(1);
        assert!(session.is_idle(Duration::minutes(30)));
    }

    #[test]
    fn test_clone_shares_user() {
        let session = Session::new("token".to_owned(), Arc::new(User::mock()));
        let copy = session.clone();
        assert!(Arc::ptr_eq(&session.user, &copy.user));
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::new("supersecrettoken".to_owned(), Arc::new(User::mock()));
        let debug = format!("{session:?}");
        assert!(!debug.contains("supersecrettoken"));
        assert!(debug.contains("[REDACTED]"));
    }
}
