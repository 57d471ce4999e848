//! Credential verification.

use std::marker::PhantomData;

use async_trait::async_trait;

use crate::AuthError;
use crate::crypto::{Argon2Hasher, PasswordHasher, SecretString, verify_password};
use crate::repository::{AuthRecord, LookupField, UserRepository};

/// Maps a login identifier and password to a user record.
///
/// Implementations must not reveal which half of the pair was wrong: an
/// unknown login and a wrong password both yield
/// [`AuthError::InvalidCredentials`].
#[async_trait]
pub trait Authenticator: Send + Sync {
    type User: Send + Sync + 'static;

    async fn authenticate(
        &self,
        login: &str,
        password: &SecretString,
    ) -> Result<Self::User, AuthError>;
}

/// Authenticator backed by a [`UserRepository`].
///
/// Issues exactly one lookup on the configured [`LookupField`] and verifies
/// the password against the record it returns.
pub struct RepositoryAuthenticator<R, T, H = Argon2Hasher> {
    repository: R,
    lookup: LookupField,
    hasher: H,
    _marker: PhantomData<fn() -> T>,
}

impl<R, T> RepositoryAuthenticator<R, T, Argon2Hasher>
where
    R: UserRepository<T>,
    T: AuthRecord,
{
    /// Creates an authenticator matching logins against `lookup`, hashing
    /// with the default [`Argon2Hasher`].
    pub fn new(repository: R, lookup: LookupField) -> Self {
        Self::with_hasher(repository, lookup, Argon2Hasher::default())
    }

    /// Matches logins against the email field.
    pub fn by_email(repository: R) -> Self {
        Self::new(repository, LookupField::Email)
    }

    /// Matches logins against the username field.
    pub fn by_username(repository: R) -> Self {
        Self::new(repository, LookupField::Username)
    }
}

impl<R, T, H> RepositoryAuthenticator<R, T, H>
where
    R: UserRepository<T>,
    T: AuthRecord,
    H: PasswordHasher,
{
    /// Creates an authenticator with an explicit password hasher.
    ///
    /// The hasher must be the one the stored digests were computed with.
    pub fn with_hasher(repository: R, lookup: LookupField, hasher: H) -> Self {
        RepositoryAuthenticator {
            repository,
            lookup,
            hasher,
            _marker: PhantomData,
        }
    }

    /// The field login identifiers are matched against.
    pub fn lookup(&self) -> LookupField {
        self.lookup
    }

    /// The hasher used to verify passwords.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }
}

#[async_trait]
impl<R, T, H> Authenticator for RepositoryAuthenticator<R, T, H>
where
    R: UserRepository<T>,
    T: AuthRecord,
    H: PasswordHasher,
{
    type User = T;

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "authenticate", skip_all, fields(lookup = %self.lookup), err)
    )]
    async fn authenticate(&self, login: &str, password: &SecretString) -> Result<T, AuthError> {
        let record = self.repository.find_first_by(self.lookup, login).await?;

        // a miss goes through the same verification as a wrong password
        verify_password(record.as_ref(), password, &self.hasher)?;

        record.ok_or(AuthError::InvalidCredentials)
    }
}
