use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::AuthError;

/// Field a login identifier is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LookupField {
    #[default]
    Email,
    Username,
}

impl LookupField {
    /// Column name for SQL-backed repositories.
    pub fn column(self) -> &'static str {
        match self {
            LookupField::Email => "email",
            LookupField::Username => "username",
        }
    }
}

impl fmt::Display for LookupField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A user record the authenticator can verify.
///
/// The library reads the salt, the hash and the login fields. It writes only
/// through [`set_credentials`](AuthRecord::set_credentials).
pub trait AuthRecord: Send + Sync + 'static {
    fn salt(&self) -> &str;

    fn password_hash(&self) -> &str;

    /// Overwrites the salt and hash. Must not touch any other field.
    fn set_credentials(&mut self, salt: String, hash: String);

    fn login_field(&self, field: LookupField) -> &str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub salt: String,
    #[serde(skip_serializing, default)]
    pub hash: String,
    pub rights: u32,
}

impl AuthRecord for User {
    fn salt(&self) -> &str {
        &self.salt
    }

    fn password_hash(&self) -> &str {
        &self.hash
    }

    fn set_credentials(&mut self, salt: String, hash: String) {
        self.salt = salt;
        self.hash = hash;
    }

    fn login_field(&self, field: LookupField) -> &str {
        match field {
            LookupField::Email => &self.email,
            LookupField::Username => &self.username,
        }
    }
}

#[cfg(any(test, feature = "mocks"))]
impl User {
    /// A user with fixed test data and no credentials.
    pub fn mock() -> Self {
        User {
            id: 1,
            username: "testuser".to_owned(),
            email: "test@example.com".to_owned(),
            salt: "fakesalt".to_owned(),
            hash: "fakehash".to_owned(),
            rights: 0,
        }
    }

    pub fn mock_with_login(id: i64, username: &str, email: &str) -> Self {
        User {
            id,
            username: username.to_owned(),
            email: email.to_owned(),
            ..Self::mock()
        }
    }
}

/// Lookup capability over the application's user store.
#[async_trait]
pub trait UserRepository<T: AuthRecord>: Send + Sync {
    /// Returns the first record whose `field` equals `value`, if any.
    async fn find_first_by(&self, field: LookupField, value: &str)
    -> Result<Option<T>, AuthError>;
}
