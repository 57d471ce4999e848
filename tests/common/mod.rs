//! Shared fixtures for the integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use sessid::crypto::{Argon2Hasher, SecretString, set_password};
use sessid::{
    AuthError, AuthRecord, InMemorySessionRepository, LookupField, RepositoryAuthenticator,
    SessionAuth, User, UserRepository,
};

pub const PASSWORD: &str = "securepassword123";

/// A user store standing in for the application's database.
#[derive(Clone, Default)]
pub struct TestUsers {
    users: Arc<RwLock<Vec<User>>>,
}

impl TestUsers {
    pub fn with_user(id: i64, username: &str, email: &str, password: &str) -> Self {
        let store = Self::default();
        store.add(id, username, email, password);
        store
    }

    pub fn add(&self, id: i64, username: &str, email: &str, password: &str) {
        let mut user = User {
            id,
            username: username.to_owned(),
            email: email.to_owned(),
            salt: String::new(),
            hash: String::new(),
            rights: 0,
        };
        set_password(&mut user, &SecretString::new(password), &fast_hasher()).unwrap();
        self.users.write().unwrap().push(user);
    }
}

#[async_trait]
impl UserRepository<User> for TestUsers {
    async fn find_first_by(
        &self,
        field: LookupField,
        value: &str,
    ) -> Result<Option<User>, AuthError> {
        let users = self.users.read().unwrap();
        Ok(users.iter().find(|u| u.login_field(field) == value).cloned())
    }
}

pub type TestAuthenticator = RepositoryAuthenticator<TestUsers, User, Argon2Hasher>;
pub type TestSessions = InMemorySessionRepository<User>;
pub type TestAuth = SessionAuth<TestAuthenticator, TestSessions>;

pub fn fast_hasher() -> Argon2Hasher {
    Argon2Hasher::new(1024, 1, 1)
}

pub fn create_auth(lookup: LookupField) -> TestAuth {
    let users = TestUsers::with_user(1, "jane", "jane@example.com", PASSWORD);
    let authenticator = RepositoryAuthenticator::with_hasher(users, lookup, fast_hasher());
    SessionAuth::new(authenticator, InMemorySessionRepository::new())
}
