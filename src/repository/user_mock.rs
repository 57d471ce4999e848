#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::AuthError;

use super::user::{AuthRecord, LookupField, User, UserRepository};

#[derive(Clone)]
pub struct MockUserRepository<T = User> {
    pub users: Arc<Mutex<Vec<T>>>,
}

impl<T> MockUserRepository<T> {
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Adds a record to the store.
    pub fn insert(&self, user: T) {
        self.users.lock().unwrap().push(user);
    }
}

impl<T> Default for MockUserRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: AuthRecord + Clone> UserRepository<T> for MockUserRepository<T> {
    async fn find_first_by(
        &self,
        field: LookupField,
        value: &str,
    ) -> Result<Option<T>, AuthError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.login_field(field) == value).cloned())
    }
}
