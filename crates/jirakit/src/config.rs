//! Connection settings.
//!
//! Settings arrive from several places (command line, manifest, environment)
//! and are layered with [`ConnectionSettings::or`] before being resolved into
//! a complete [`ConnectionConfig`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Environment variable holding the Jira base URL.
pub const ENV_URL: &str = "JIRA_URL";
/// Environment variable holding the Basic auth user name.
pub const ENV_USERNAME: &str = "JIRA_USERNAME";
/// Environment variable holding the Basic auth password.
pub const ENV_PASSWORD: &str = "JIRA_PASSWORD";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;

/// Partially specified connection settings.
///
/// Every field is optional; missing values are filled from lower-priority
/// layers and finally from the environment.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionSettings {
    /// Jira service root, e.g. `https://jira.example.com`.
    #[serde(default)]
    pub url: Option<String>,
    /// Basic auth principal.
    #[serde(default)]
    pub username: Option<String>,
    /// Basic auth secret.
    #[serde(default)]
    pub password: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default)]
    pub timeout: Option<f64>,
    /// Whether TLS certificates are validated.
    #[serde(default)]
    pub validate_certs: Option<bool>,
}

impl ConnectionSettings {
    /// Fill unset fields from `fallback`.
    #[must_use]
    pub fn or(self, fallback: ConnectionSettings) -> Self {
        Self {
            url: self.url.or(fallback.url),
            username: self.username.or(fallback.username),
            password: self.password.or(fallback.password),
            timeout: self.timeout.or(fallback.timeout),
            validate_certs: self.validate_certs.or(fallback.validate_certs),
        }
    }

    /// Resolve against the process environment.
    pub fn resolve(self) -> Result<ConnectionConfig> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve using `env` as the environment lookup.
    ///
    /// Empty strings count as unset, both here and in the environment.
    pub fn resolve_with<F>(self, env: F) -> Result<ConnectionConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |value: Option<String>, var: &str, name: &str| -> Result<String> {
            value
                .filter(|v| !v.is_empty())
                .or_else(|| env(var).filter(|v| !v.is_empty()))
                .ok_or_else(|| Error::Configuration(format!("{name} not set")))
        };

        let base_url = pick(self.url, ENV_URL, "jira_url")?;
        let username = pick(self.username, ENV_USERNAME, "jira_username")?;
        let password = pick(self.password, ENV_PASSWORD, "jira_password")?;

        let timeout_secs = self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let invalid_timeout =
            || Error::Configuration(format!("timeout must be a positive number of seconds, got {timeout_secs}"));
        if timeout_secs <= 0.0 {
            return Err(invalid_timeout());
        }
        let timeout = Duration::try_from_secs_f64(timeout_secs).map_err(|_| invalid_timeout())?;

        Ok(ConnectionConfig {
            base_url,
            username,
            password,
            timeout,
            validate_certs: self.validate_certs.unwrap_or(true),
        })
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("validate_certs", &self.validate_certs)
            .finish()
    }
}

/// Fully resolved connection configuration.
#[derive(Clone)]
pub struct ConnectionConfig {
    /// Jira service root.
    pub base_url: String,
    /// Basic auth principal.
    pub username: String,
    /// Basic auth secret.
    pub password: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Whether TLS certificates are validated.
    pub validate_certs: bool,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("validate_certs", &self.validate_certs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn full() -> ConnectionSettings {
        ConnectionSettings {
            url: Some("https://jira.example.com".into()),
            username: Some("admin".into()),
            password: Some("secret".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_defaults() {
        let config = full().resolve_with(env_of(&[])).unwrap();
        assert_eq!(config.base_url, "https://jira.example.com");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.validate_certs);
    }

    #[test]
    fn test_resolve_env_fallback() {
        let config = ConnectionSettings::default()
            .resolve_with(env_of(&[
                (ENV_URL, "https://env.example.com"),
                (ENV_USERNAME, "envuser"),
                (ENV_PASSWORD, "envpass"),
            ]))
            .unwrap();
        assert_eq!(config.base_url, "https://env.example.com");
        assert_eq!(config.username, "envuser");
        assert_eq!(config.password, "envpass");
    }

    #[test]
    fn test_explicit_beats_env() {
        let config = full()
            .resolve_with(env_of(&[(ENV_URL, "https://env.example.com")]))
            .unwrap();
        assert_eq!(config.base_url, "https://jira.example.com");
    }

    #[test]
    fn test_missing_url_is_configuration_error() {
        let settings = ConnectionSettings {
            url: None,
            ..full()
        };
        let err = settings.resolve_with(env_of(&[])).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m == "jira_url not set"));
    }

    #[test]
    fn test_empty_password_counts_as_missing() {
        let settings = ConnectionSettings {
            password: Some(String::new()),
            ..full()
        };
        let err = settings.resolve_with(env_of(&[(ENV_PASSWORD, "")])).unwrap_err();
        assert!(err.to_string().contains("jira_password not set"));
    }

    #[test]
    fn test_invalid_timeout() {
        let settings = ConnectionSettings {
            timeout: Some(0.0),
            ..full()
        };
        assert!(settings.resolve_with(env_of(&[])).is_err());
    }

    #[test]
    fn test_huge_timeout_is_configuration_error() {
        for timeout in [1e30, f64::INFINITY, f64::NAN] {
            let settings = ConnectionSettings {
                timeout: Some(timeout),
                ..full()
            };
            let err = settings.resolve_with(env_of(&[])).unwrap_err();
            assert!(matches!(err, Error::Configuration(_)), "{timeout}: {err}");
        }
    }

    #[test]
    fn test_or_layers() {
        let cli = ConnectionSettings {
            username: Some("cli".into()),
            ..Default::default()
        };
        let merged = cli.or(full());
        assert_eq!(merged.username.as_deref(), Some("cli"));
        assert_eq!(merged.url.as_deref(), Some("https://jira.example.com"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = full().resolve_with(env_of(&[])).unwrap();
        let rendered = format!("{config:?} {:?}", full());
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
