//! In-memory session storage.
//!
//! Suitable for single-instance deployments; sessions are lost when the
//! process restarts.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::AuthError;
use crate::crypto::{SESSION_TOKEN_BYTES, generate_token};

use super::Session;
use super::config::check_idle_timeout;
use super::repository::SessionRepository;

/// Attempts at finding an unused token before giving up.
const MAX_TOKEN_ATTEMPTS: usize = 3;

/// In-memory session storage.
///
/// Stores sessions in a `HashMap` protected by a `RwLock`, keyed by token.
/// Clones share the same map.
pub struct InMemorySessionRepository<U> {
    sessions: Arc<RwLock<HashMap<String, Session<U>>>>,
}

impl<U> InMemorySessionRepository<U> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the number of sessions currently stored.
    ///
    /// Counts through a poisoned lock; the other operations report poison
    /// as `AuthError::Internal`.
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if there are no sessions stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<U> Clone for InMemorySessionRepository<U> {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
        }
    }
}

impl<U> Default for InMemorySessionRepository<U> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> AuthError {
    AuthError::Internal("Lock poisoned".to_owned())
}

#[async_trait]
impl<U: Send + Sync + 'static> SessionRepository<U> for InMemorySessionRepository<U> {
    async fn create_session(&self, user: Arc<U>) -> Result<Session<U>, AuthError> {
        for _ in 0..MAX_TOKEN_ATTEMPTS {
            // entropy is read before taking the lock
            let token = generate_token(SESSION_TOKEN_BYTES)?;

            let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
            if let Entry::Vacant(slot) = sessions.entry(token.clone()) {
                let session = Session::new(token, Arc::clone(&user));
                slot.insert(session.clone());
                drop(sessions);

                log::debug!(target: "sessid::session", "msg=\"session created\"");
                return Ok(session);
            }
            drop(sessions);

            log::warn!(target: "sessid::session", "msg=\"session token collision, regenerating\"");
        }

        Err(AuthError::Internal(
            "could not generate an unused session token".to_owned(),
        ))
    }

    async fn get_session(&self, token: &str) -> Result<Option<Session<U>>, AuthError> {
        let sessions = self.sessions.read().map_err(|_| poisoned())?;
        Ok(sessions.get(token).cloned())
    }

    async fn touch(&self, session: &mut Session<U>) -> Result<(), AuthError> {
        let now = Utc::now().max(session.last_used);
        session.last_used = now;

        if let Some(stored) = self
            .sessions
            .write()
            .map_err(|_| poisoned())?
            .get_mut(&session.token)
        {
            stored.last_used = stored.last_used.max(now);
        }

        Ok(())
    }

    async fn delete_session(&self, token: &str) -> Result<bool, AuthError> {
        let removed = self
            .sessions
            .write()
            .map_err(|_| poisoned())?
            .remove(token)
            .is_some();

        if removed {
            log::debug!(target: "sessid::session", "msg=\"session deleted\"");
        }

        Ok(removed)
    }

    #[allow(clippy::significant_drop_tightening)]
    async fn prune_idle(&self, idle_timeout: Duration) -> Result<u64, AuthError> {
        check_idle_timeout(idle_timeout)?;

        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;

        let cutoff = Utc::now() - idle_timeout;
        let before_count = sessions.len();

        sessions.retain(|_, session| session.last_used >= cutoff);

        let pruned = before_count.saturating_sub(sessions.len());
        Ok(u64::try_from(pruned).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::User;

    fn user(id: i64) -> Arc<User> {
        Arc::new(User::mock_with_login(
            id,
            &format!("user{id}"),
            &format!("user{id}@example.com"),
        ))
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemorySessionRepository::new();

        let session = repo.create_session(user(1)).await.unwrap();
        assert_eq!(session.token.len(), SESSION_TOKEN_BYTES * 2);
        assert_eq!(session.created_at, session.last_used);

        let found = repo.get_session(&session.token).await.unwrap().unwrap();
        assert_eq!(found.token, session.token);
        assert_eq!(found.user.id, 1);
        assert!(Arc::ptr_eq(&found.user, &session.user));
    }

    #[tokio::test]
    async fn test_get_unknown_token() {
        let repo = InMemorySessionRepository::<User>::new();

        let found = repo.get_session("nonexistent").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_delete_session() {
        let repo = InMemorySessionRepository::new();
        let session = repo.create_session(user(1)).await.unwrap();
        assert!(!repo.is_empty());

        assert!(repo.delete_session(&session.token).await.unwrap());
        assert!(repo.is_empty());
        assert!(!repo.delete_session(&session.token).await.unwrap());

        let found = repo.get_session(&session.token).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_delete_absent_is_noop() {
        let repo = InMemorySessionRepository::new();
        repo.create_session(user(1)).await.unwrap();

        assert!(!repo.delete_session("nonexistent").await.unwrap());
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_deletes_remove_once() {
        let repo = InMemorySessionRepository::new();
        let session = repo.create_session(user(1)).await.unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let repo = repo.clone();
                let token = session.token.clone();
                tokio::spawn(async move { repo.delete_session(&token).await.unwrap() })
            })
            .collect();

        let mut removed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                removed += 1;
            }
        }
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn test_touch_moves_last_used_forward() {
        let repo = InMemorySessionRepository::new();
        let mut session = repo.create_session(user(1)).await.unwrap();
        let previous = session.last_used;

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        repo.touch(&mut session).await.unwrap();

        assert!(session.last_used >= previous);
        let stored = repo.get_session(&session.token).await.unwrap().unwrap();
        assert_eq!(stored.last_used, session.last_used);
    }

    #[tokio::test]
    async fn test_touch_never_moves_backwards() {
        let repo = InMemorySessionRepository::new();
        let mut session = repo.create_session(user(1)).await.unwrap();
        let future = Utc::now() + Duration::minutes(1);
        session.last_used = future;

        repo.touch(&mut session).await.unwrap();
        assert_eq!(session.last_used, future);
    }

    #[tokio::test]
    async fn test_touch_deleted_session_does_not_resurrect() {
        let repo = InMemorySessionRepository::new();
        let mut session = repo.create_session(user(1)).await.unwrap();
        repo.delete_session(&session.token).await.unwrap();

        repo.touch(&mut session).await.unwrap();
        assert!(repo.get_session(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tokens_unique() {
        let repo = InMemorySessionRepository::new();
        let shared = user(1);
        let mut tokens = HashSet::new();

        for _ in 0..10_000 {
            let session = repo.create_session(Arc::clone(&shared)).await.unwrap();
            assert!(tokens.insert(session.token));
        }

        assert_eq!(repo.len(), 10_000);
    }

    #[tokio::test]
    async fn test_prune_idle() {
        let repo = InMemorySessionRepository::new();

        let stale = repo.create_session(user(1)).await.unwrap();
        let fresh = repo.create_session(user(2)).await.unwrap();
        repo.sessions
            .write()
            .unwrap()
            .get_mut(&stale.token)
            .unwrap()
            .last_used = Utc::now() - Duration::hours(3);

        let pruned = repo.prune_idle(Duration::hours(1)).await.unwrap();
        assert_eq!(pruned, 1);
        assert_eq!(repo.len(), 1);
        assert!(repo.get_session(&fresh.token).await.unwrap().is_some());
        assert!(repo.get_session(&stale.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_prune_idle_rejects_non_positive_timeout() {
        let repo = InMemorySessionRepository::new();
        repo.create_session(user(1)).await.unwrap();

        for timeout in [Duration::zero(), Duration::seconds(-5)] {
            let result = repo.prune_idle(timeout).await;
            assert!(matches!(result, Err(AuthError::ConfigurationError(_))));
        }
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_len_counts_through_poisoned_lock() {
        let repo = InMemorySessionRepository::new();
        repo.create_session(user(1)).await.unwrap();

        let shared = repo.clone();
        let _ = std::thread::spawn(move || {
            let _guard = shared.sessions.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert_eq!(repo.len(), 1);
        assert!(!repo.is_empty());
        assert_eq!(
            repo.get_session("anything").await.unwrap_err(),
            AuthError::Internal("Lock poisoned".to_owned())
        );
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let repo = InMemorySessionRepository::new();
        let other = repo.clone();

        let session = repo.create_session(user(1)).await.unwrap();
        assert!(other.get_session(&session.token).await.unwrap().is_some());
    }
}
