use chrono::Duration;

use crate::AuthError;

/// Name of the session cookie unless configured otherwise.
pub const DEFAULT_COOKIE_NAME: &str = "sessid";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    None,
    #[default]
    Lax,
    Strict,
}

/// Cookie and lifetime settings for [`SessionAuth`](crate::SessionAuth).
///
/// # Example
///
/// ```rust
/// use sessid::SessionConfig;
/// use chrono::Duration;
///
/// let config = SessionConfig {
///     cookie_secure: true,
///     idle_timeout: Some(Duration::hours(8)),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub cookie_path: String,
    /// `None` keeps the cookie host-only.
    pub cookie_domain: Option<String>,
    pub cookie_secure: bool,
    pub cookie_http_only: bool,
    pub cookie_same_site: SameSite,
    /// Sessions unused for longer than this are rejected and removed.
    /// `None` keeps sessions until logout or restart.
    pub idle_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_owned(),
            cookie_path: "/".to_owned(),
            cookie_domain: None,
            cookie_secure: false,
            cookie_http_only: true,
            cookie_same_site: SameSite::Lax,
            idle_timeout: None,
        }
    }
}

impl SessionConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain-HTTP friendly settings for local development.
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            cookie_same_site: SameSite::Lax,
            idle_timeout: Some(Duration::days(7)),
            ..Self::default()
        }
    }

    /// HTTPS-only cookies, strict same-site policy, 30 minute idle timeout.
    pub fn strict() -> Self {
        Self {
            cookie_secure: true,
            cookie_http_only: true,
            cookie_same_site: SameSite::Strict,
            idle_timeout: Some(Duration::minutes(30)),
            ..Self::default()
        }
    }

    /// Checks that the settings produce a well-formed `Set-Cookie` header.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ConfigurationError` naming the first offending field.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.cookie_name.is_empty() {
            return Err(AuthError::ConfigurationError(
                "cookie_name must not be empty".to_owned(),
            ));
        }
        if !self.cookie_name.chars().all(is_token_char) {
            return Err(AuthError::ConfigurationError(format!(
                "cookie_name {:?} contains characters not allowed in a cookie name",
                self.cookie_name
            )));
        }
        if !self.cookie_path.starts_with('/') {
            return Err(AuthError::ConfigurationError(
                "cookie_path must start with '/'".to_owned(),
            ));
        }
        if !is_attribute_value(&self.cookie_path) {
            return Err(AuthError::ConfigurationError(format!(
                "cookie_path {:?} contains ';' or control characters",
                self.cookie_path
            )));
        }
        if let Some(domain) = &self.cookie_domain {
            if domain.is_empty() || !is_attribute_value(domain) {
                return Err(AuthError::ConfigurationError(format!(
                    "cookie_domain {domain:?} must be non-empty without ';' or control characters"
                )));
            }
        }
        if self.cookie_same_site == SameSite::None && !self.cookie_secure {
            return Err(AuthError::ConfigurationError(
                "SameSite=None requires cookie_secure".to_owned(),
            ));
        }
        if let Some(timeout) = self.idle_timeout {
            check_idle_timeout(timeout)?;
        }
        Ok(())
    }
}

/// Rejects idle timeouts that would put the cutoff at or after now.
pub(crate) fn check_idle_timeout(timeout: Duration) -> Result<(), AuthError> {
    if timeout <= Duration::zero() {
        return Err(AuthError::ConfigurationError(
            "idle_timeout must be positive".to_owned(),
        ));
    }
    Ok(())
}

/// `Path` and `Domain` values end at `;` and may not hold CTLs.
fn is_attribute_value(value: &str) -> bool {
    !value.chars().any(|c| c == ';' || c.is_control())
}

/// RFC 7230 `tchar`.
fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.cookie_name, "sessid");
        assert_eq!(config.cookie_path, "/");
        assert!(config.cookie_domain.is_none());
        assert!(!config.cookie_secure);
        assert!(config.cookie_http_only);
        assert_eq!(config.cookie_same_site, SameSite::Lax);
        assert!(config.idle_timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_validate() {
        assert!(SessionConfig::development().validate().is_ok());

        let strict = SessionConfig::strict();
        assert!(strict.validate().is_ok());
        assert!(strict.cookie_secure);
        assert_eq!(strict.idle_timeout, Some(Duration::minutes(30)));
    }

    #[test]
    fn test_validate_empty_cookie_name() {
        let config = SessionConfig {
            cookie_name: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AuthError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_validate_bad_cookie_name() {
        let config = SessionConfig {
            cookie_name: "my session".to_owned(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_relative_path() {
        let config = SessionConfig {
            cookie_path: "app".to_owned(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_path_with_control_characters() {
        for path in ["/a\nb", "/a\rb", "/a;b", "/\u{7f}"] {
            let config = SessionConfig {
                cookie_path: path.to_owned(),
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(AuthError::ConfigurationError(_))),
                "{path:?} accepted"
            );
        }
    }

    #[test]
    fn test_validate_cookie_domain() {
        for domain in ["", "example.com;evil", "example.com\n"] {
            let config = SessionConfig {
                cookie_domain: Some(domain.to_owned()),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "{domain:?} accepted");
        }

        let config = SessionConfig {
            cookie_domain: Some("example.com".to_owned()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_same_site_none_requires_secure() {
        let config = SessionConfig {
            cookie_same_site: SameSite::None,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_non_positive_idle_timeout() {
        let config = SessionConfig {
            idle_timeout: Some(Duration::zero()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(check_idle_timeout(Duration::seconds(-5)).is_err());
        assert!(check_idle_timeout(Duration::seconds(1)).is_ok());
    }
}
