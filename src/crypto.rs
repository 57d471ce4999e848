use crate::AuthError;
use crate::repository::AuthRecord;
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer};
use sha2::{Digest, Sha512};
use std::fmt;

/// Salt length in bytes, before hex encoding.
pub const SALT_LENGTH: usize = 16;

/// Session token length in bytes, before hex encoding (256 bits).
pub const SESSION_TOKEN_BYTES: usize = 32;

/// Salt used when verifying against a missing record, so both failure
/// paths pay for one digest.
const DUMMY_SALT: &str = "00000000000000000000000000000000";

/// A wrapper for sensitive string data that prevents accidental logging.
///
/// `SecretString` implements `Debug` and `Display` to show `[REDACTED]` instead
/// of the actual content.
///
/// # Example
///
/// ```rust
/// use sessid::crypto::SecretString;
///
/// let password = SecretString::new("my_secret_password");
///
/// assert_eq!(format!("{:?}", password), "SecretString([REDACTED])");
/// assert_eq!(password.expose_secret(), "my_secret_password");
/// ```
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Exposes the secret value.
    ///
    /// Use this only when handing the value to a hashing function.
    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(SecretString(s))
    }
}

/// Deterministic, salt-dependent password digest.
///
/// The same `(password, salt)` pair must always produce the same digest.
/// The default implementation is [`Argon2Hasher`].
///
/// # Example
///
/// ```rust
/// use sessid::crypto::{Argon2Hasher, PasswordHasher};
///
/// let hasher = Argon2Hasher::new(1024, 1, 1);
/// let a = hasher.compute_hash("mypassword", "0123456789abcdef").unwrap();
/// let b = hasher.compute_hash("mypassword", "0123456789abcdef").unwrap();
/// assert_eq!(a, b);
/// ```
pub trait PasswordHasher: Send + Sync {
    /// Computes the text-encoded digest of `password` keyed by `salt`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHashError` if the salt or parameters are
    /// rejected by the underlying primitive.
    fn compute_hash(&self, password: &str, salt: &str) -> Result<String, AuthError>;
}

/// Argon2id key derivation with configurable cost.
///
/// # Example
///
/// ```rust
/// use sessid::crypto::Argon2Hasher;
///
/// // Default settings (19 MiB memory, 2 iterations, 1 lane)
/// let hasher = Argon2Hasher::default();
///
/// // OWASP 2024 recommendations
/// let hasher = Argon2Hasher::production();
///
/// // Custom settings
/// let hasher = Argon2Hasher::new(32768, 4, 2);
/// ```
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    /// Memory cost in KiB
    memory_cost: u32,
    /// Number of iterations
    time_cost: u32,
    /// Degree of parallelism
    parallelism: u32,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            memory_cost: 19456, // 19 MiB - argon2 default
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl Argon2Hasher {
    /// Output length of the raw digest in bytes.
    pub const OUTPUT_LENGTH: usize = 32;

    /// Creates a new hasher with custom parameters.
    ///
    /// # Arguments
    ///
    /// * `memory_cost` - Memory usage in KiB
    /// * `time_cost` - Number of iterations
    /// * `parallelism` - Number of lanes
    #[must_use]
    pub fn new(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }

    /// Parameters: 64 MiB memory, 3 iterations, 4 lanes.
    #[must_use]
    pub fn production() -> Self {
        Self {
            memory_cost: 65536, // 64 MiB
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl PasswordHasher for Argon2Hasher {
    fn compute_hash(&self, password: &str, salt: &str) -> Result<String, AuthError> {
        let params = Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Some(Self::OUTPUT_LENGTH),
        )
        .map_err(|_| AuthError::PasswordHashError)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut output = [0u8; Self::OUTPUT_LENGTH];
        argon2
            .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut output)
            .map_err(|_| AuthError::PasswordHashError)?;

        Ok(hex::encode(output))
    }
}

/// Single-pass `sha512(salt ++ password)`.
///
/// Fast and therefore weak against offline guessing. Use it only to verify
/// records written by systems that used this construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha512Hasher;

impl PasswordHasher for Sha512Hasher {
    fn compute_hash(&self, password: &str, salt: &str) -> Result<String, AuthError> {
        let mut hasher = Sha512::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }
}

/// Fills `num_bytes` from the operating system's CSPRNG and hex encodes them.
///
/// # Errors
///
/// Returns `AuthError::RandomSourceFailure` if the OS random source fails.
/// There is no fallback to a weaker generator.
pub fn generate_token(num_bytes: usize) -> Result<String, AuthError> {
    let mut bytes = vec![0u8; num_bytes];
    OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
        log::error!(target: "sessid", "msg=\"random source failure\" error=\"{e}\"");
        AuthError::RandomSourceFailure
    })?;
    Ok(hex::encode(bytes))
}

/// Generates a fresh 16-byte salt, hex encoded.
///
/// # Errors
///
/// Returns `AuthError::RandomSourceFailure` if the OS random source fails.
pub fn generate_salt() -> Result<String, AuthError> {
    generate_token(SALT_LENGTH)
}

/// Replaces the record's salt and hash for `new_password`.
///
/// Only the salt and hash are touched and nothing is persisted; saving the
/// record is the caller's job.
///
/// # Errors
///
/// Propagates `RandomSourceFailure` and `PasswordHashError`. On error the
/// record is left unchanged.
pub fn set_password<T, H>(
    record: &mut T,
    new_password: &SecretString,
    hasher: &H,
) -> Result<(), AuthError>
where
    T: AuthRecord,
    H: PasswordHasher + ?Sized,
{
    let salt = generate_salt()?;
    let hash = hasher.compute_hash(new_password.expose_secret(), &salt)?;
    record.set_credentials(salt, hash);
    Ok(())
}

/// Checks `password` against the record's stored salt and hash.
///
/// A missing record never verifies. It still costs one digest so that the
/// two failure cases take the same path.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on any mismatch, including a
/// missing record or a stored salt the hasher rejects.
pub fn verify_password<T, H>(
    record: Option<&T>,
    password: &SecretString,
    hasher: &H,
) -> Result<(), AuthError>
where
    T: AuthRecord,
    H: PasswordHasher + ?Sized,
{
    let Some(record) = record else {
        let _ = hasher.compute_hash(password.expose_secret(), DUMMY_SALT);
        return Err(AuthError::InvalidCredentials);
    };

    let computed = match hasher.compute_hash(password.expose_secret(), record.salt()) {
        Ok(hash) => hash,
        Err(e) => {
            log::warn!(target: "sessid", "msg=\"stored credentials unusable\" error=\"{e}\"");
            return Err(AuthError::InvalidCredentials);
        }
    };

    if constant_time_eq(computed.as_bytes(), record.password_hash().as_bytes()) {
        Ok(())
    } else {
        Err(AuthError::InvalidCredentials)
    }
}

/// Constant-time comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
