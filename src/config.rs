//! Configuration for the code relay.
//!
//! Use [`RelayConfig::from_env`] in the binaries, or [`RelayConfigBuilder`] directly:
//!
//! ```
//! use tg_code_relay::RelayConfig;
//!
//! let config = RelayConfig::builder()
//!     .api_id(12345)
//!     .api_hash("0123456789abcdef")
//!     .base_service_url("https://svc.example/code=")
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.official_id, 777_000);
//! ```

use crate::error::{Error, Result};
use crate::proxy::{self, ProxyDescriptor};
use crate::session;
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;
use std::time::Duration;

/// API id variable.
pub const ENV_API_ID: &str = "TELEGRAM_API_ID";
/// API hash variable.
pub const ENV_API_HASH: &str = "TELEGRAM_API_HASH";
/// Forwarding target variable.
pub const ENV_BASE_SERVICE_URL: &str = "BASE_SERVICE_URL";
/// Optional phone number used by the login flow.
pub const ENV_PHONE: &str = "TELEGRAM_PHONE";
/// Optional log directory.
pub const ENV_LOG_DIR: &str = "LOG_DIR";

/// Sender id of the official Telegram service account.
pub const TELEGRAM_OFFICIAL_ID: i64 = 777_000;

/// Default timeout for the forwarding request.
pub const DEFAULT_FORWARD_TIMEOUT: Duration = Duration::from_secs(10);

/// Default log directory.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Telegram application credentials.
///
/// The `api_hash` is stored as a [`SecretString`] and redacted from `Debug`.
#[derive(Clone)]
pub struct ApiCredentials {
    /// Application id from my.telegram.org.
    pub api_id: i32,
    api_hash: SecretString,
}

impl ApiCredentials {
    /// Creates credentials from raw values.
    #[must_use]
    pub fn new(api_id: i32, api_hash: impl Into<String>) -> Self {
        Self {
            api_id,
            api_hash: SecretString::from(api_hash.into()),
        }
    }

    /// Returns the API hash.
    #[must_use]
    pub fn api_hash(&self) -> &str {
        self.api_hash.expose_secret()
    }

    /// Reads `TELEGRAM_API_ID` and `TELEGRAM_API_HASH` from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingConfig`] naming every absent variable, or
    /// [`Error::InvalidConfig`] if the API id is not an integer.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads credentials through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup<L>(lookup: L) -> Result<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let credentials = read_credentials(&lookup, &mut missing)?;
        match credentials {
            Some(credentials) if missing.is_empty() => Ok(credentials),
            _ => Err(Error::MissingConfig { names: missing }),
        }
    }
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_id", &self.api_id)
            .field("api_hash", &"[REDACTED]")
            .finish()
    }
}

/// Configuration for the relay service.
///
/// Create using [`RelayConfig::builder()`] or [`RelayConfig::from_env()`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Telegram application credentials.
    pub credentials: ApiCredentials,
    /// Forwarding target; the code is appended verbatim.
    pub base_service_url: String,
    /// Phone number for the login flow (prompted for if absent).
    pub phone: Option<String>,
    /// Only messages from this sender are acted upon.
    pub official_id: i64,
    /// Location of the session token file.
    pub session_path: PathBuf,
    /// Optional outbound proxy for the transport.
    pub proxy: Option<ProxyDescriptor>,
    /// Timeout for the forwarding request.
    pub forward_timeout: Duration,
    /// Directory for rotating log files.
    pub log_dir: PathBuf,
}

impl RelayConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> RelayConfigBuilder {
        RelayConfigBuilder::default()
    }

    /// Builds the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingConfig`] listing every missing required variable,
    /// or [`Error::InvalidConfig`] if a value cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration through an arbitrary variable lookup.
    ///
    /// The proxy is resolved with [`proxy::resolve_proxy`] and never causes an error.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup<L>(lookup: L) -> Result<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let credentials = read_credentials(&lookup, &mut missing)?;
        // Used verbatim; the code is appended to exactly what the operator configured.
        let base_service_url = lookup(ENV_BASE_SERVICE_URL).filter(|v| !v.trim().is_empty());
        if base_service_url.is_none() {
            missing.push(ENV_BASE_SERVICE_URL);
        }

        let (Some(credentials), Some(base_service_url)) = (credentials, base_service_url) else {
            return Err(Error::MissingConfig { names: missing });
        };

        let mut builder = Self::builder()
            .credentials(credentials)
            .base_service_url(base_service_url);

        if let Some(phone) = non_empty(&lookup, ENV_PHONE) {
            builder = builder.phone(phone);
        }
        if let Some(dir) = non_empty(&lookup, ENV_LOG_DIR) {
            builder = builder.log_dir(dir);
        }
        if let Some(proxy) = proxy::resolve_proxy(&lookup) {
            builder = builder.proxy(proxy);
        }

        builder.build()
    }
}

fn non_empty<L>(lookup: &L, key: &str) -> Option<String>
where
    L: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Reads the API id and hash, recording missing names instead of failing early.
fn read_credentials<L>(lookup: &L, missing: &mut Vec<&'static str>) -> Result<Option<ApiCredentials>>
where
    L: Fn(&str) -> Option<String>,
{
    let api_id = match non_empty(lookup, ENV_API_ID) {
        Some(raw) => {
            let id = raw.parse::<i32>().map_err(|_| Error::InvalidConfig {
                message: format!("{ENV_API_ID} must be an integer, got '{raw}'"),
            })?;
            Some(id).filter(|id| *id != 0)
        }
        None => None,
    };
    if api_id.is_none() {
        missing.push(ENV_API_ID);
    }

    let api_hash = non_empty(lookup, ENV_API_HASH);
    if api_hash.is_none() {
        missing.push(ENV_API_HASH);
    }

    Ok(api_id
        .zip(api_hash)
        .map(|(id, hash)| ApiCredentials::new(id, hash)))
}

/// Builder for [`RelayConfig`].
#[derive(Debug, Default)]
pub struct RelayConfigBuilder {
    api_id: Option<i32>,
    api_hash: Option<String>,
    credentials: Option<ApiCredentials>,
    base_service_url: Option<String>,
    phone: Option<String>,
    official_id: Option<i64>,
    session_path: Option<PathBuf>,
    proxy: Option<ProxyDescriptor>,
    forward_timeout: Option<Duration>,
    log_dir: Option<PathBuf>,
}

impl RelayConfigBuilder {
    /// Sets the API id (required unless [`credentials`](Self::credentials) is used).
    #[must_use]
    pub fn api_id(mut self, api_id: i32) -> Self {
        self.api_id = Some(api_id);
        self
    }

    /// Sets the API hash (required unless [`credentials`](Self::credentials) is used).
    #[must_use]
    pub fn api_hash(mut self, api_hash: impl Into<String>) -> Self {
        self.api_hash = Some(api_hash.into());
        self
    }

    /// Sets both API credentials at once.
    #[must_use]
    pub fn credentials(mut self, credentials: ApiCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the forwarding base URL (required).
    #[must_use]
    pub fn base_service_url(mut self, url: impl Into<String>) -> Self {
        self.base_service_url = Some(url.into());
        self
    }

    /// Sets the phone number used when an interactive login is needed.
    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Overrides the sender id treated as the official account.
    #[must_use]
    pub fn official_id(mut self, id: i64) -> Self {
        self.official_id = Some(id);
        self
    }

    /// Overrides the session file location.
    #[must_use]
    pub fn session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = Some(path.into());
        self
    }

    /// Sets the outbound proxy.
    #[must_use]
    pub fn proxy(mut self, proxy: ProxyDescriptor) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Sets the forwarding request timeout.
    #[must_use]
    pub fn forward_timeout(mut self, timeout: Duration) -> Self {
        self.forward_timeout = Some(timeout);
        self
    }

    /// Sets the log directory.
    #[must_use]
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing or invalid.
    pub fn build(self) -> Result<RelayConfig> {
        let credentials = match (self.credentials, self.api_id, self.api_hash) {
            (Some(credentials), _, _) => credentials,
            (None, Some(id), Some(hash)) => ApiCredentials::new(id, hash),
            (None, id, hash) => {
                let mut names = Vec::new();
                if id.is_none() {
                    names.push(ENV_API_ID);
                }
                if hash.is_none() {
                    names.push(ENV_API_HASH);
                }
                return Err(Error::MissingConfig { names });
            }
        };

        if credentials.api_id == 0 {
            return Err(Error::InvalidConfig {
                message: "api id must be non-zero".into(),
            });
        }

        let base_service_url = self
            .base_service_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| Error::MissingConfig {
                names: vec![ENV_BASE_SERVICE_URL],
            })?;

        Ok(RelayConfig {
            credentials,
            base_service_url,
            phone: self.phone,
            official_id: self.official_id.unwrap_or(TELEGRAM_OFFICIAL_ID),
            session_path: self.session_path.unwrap_or_else(session::session_path),
            proxy: self.proxy,
            forward_timeout: self.forward_timeout.unwrap_or(DEFAULT_FORWARD_TIMEOUT),
            log_dir: self.log_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from<'a>(
        pairs: &'a [(&'a str, &'a str)],
    ) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        move |key| map.get(key).map(|v| (*v).to_string())
    }

    #[test]
    fn test_builder_minimal() {
        let config = RelayConfig::builder()
            .api_id(1)
            .api_hash("hash")
            .base_service_url("https://svc.example/code=")
            .session_path("session_auto_jd")
            .build()
            .unwrap();

        assert_eq!(config.credentials.api_id, 1);
        assert_eq!(config.credentials.api_hash(), "hash");
        assert_eq!(config.official_id, TELEGRAM_OFFICIAL_ID);
        assert_eq!(config.forward_timeout, Duration::from_secs(10));
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert!(config.proxy.is_none());
        assert!(config.phone.is_none());
    }

    #[test]
    fn test_builder_missing_url() {
        let err = RelayConfig::builder()
            .api_id(1)
            .api_hash("hash")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::MissingConfig { ref names } if names == &[ENV_BASE_SERVICE_URL]));
    }

    #[test]
    fn test_builder_missing_credentials() {
        let err = RelayConfig::builder()
            .base_service_url("https://svc.example/")
            .build()
            .unwrap_err();
        assert!(
            matches!(err, Error::MissingConfig { ref names } if names == &[ENV_API_ID, ENV_API_HASH])
        );
    }

    #[test]
    fn test_from_lookup_full() {
        let config = RelayConfig::from_lookup(lookup_from(&[
            (ENV_API_ID, "12345"),
            (ENV_API_HASH, "abcdef"),
            (ENV_BASE_SERVICE_URL, "https://svc.example/code="),
            (ENV_PHONE, "+10000000000"),
            (ENV_LOG_DIR, "/tmp/relay-logs"),
            (proxy::ENV_PROXY_TYPE, "socks5"),
            (proxy::ENV_PROXY_ADDR, "10.0.0.1"),
            (proxy::ENV_PROXY_PORT, "1080"),
        ]))
        .unwrap();

        assert_eq!(config.credentials.api_id, 12345);
        assert_eq!(config.base_service_url, "https://svc.example/code=");
        assert_eq!(config.phone.as_deref(), Some("+10000000000"));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/relay-logs"));
        assert_eq!(config.proxy.unwrap().address(), "10.0.0.1:1080");
    }

    #[test]
    fn test_from_lookup_keeps_base_url_verbatim() {
        let config = RelayConfig::from_lookup(lookup_from(&[
            (ENV_API_ID, "12345"),
            (ENV_API_HASH, "abcdef"),
            (ENV_BASE_SERVICE_URL, "https://svc.example/code= "),
        ]))
        .unwrap();

        assert_eq!(config.base_service_url, "https://svc.example/code= ");
    }

    #[test]
    fn test_from_lookup_blank_base_url_is_missing() {
        let err = RelayConfig::from_lookup(lookup_from(&[
            (ENV_API_ID, "12345"),
            (ENV_API_HASH, "abcdef"),
            (ENV_BASE_SERVICE_URL, "   "),
        ]))
        .unwrap_err();

        assert!(
            matches!(err, Error::MissingConfig { ref names } if names == &[ENV_BASE_SERVICE_URL])
        );
    }

    #[test]
    fn test_from_lookup_reports_all_missing() {
        let err = RelayConfig::from_lookup(lookup_from(&[])).unwrap_err();
        match err {
            Error::MissingConfig { names } => {
                assert_eq!(names, vec![ENV_API_ID, ENV_API_HASH, ENV_BASE_SERVICE_URL]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_lookup_zero_api_id_is_missing() {
        let err = RelayConfig::from_lookup(lookup_from(&[
            (ENV_API_ID, "0"),
            (ENV_API_HASH, "abcdef"),
            (ENV_BASE_SERVICE_URL, "https://svc.example/"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::MissingConfig { ref names } if names == &[ENV_API_ID]));
    }

    #[test]
    fn test_from_lookup_non_numeric_api_id() {
        let err = RelayConfig::from_lookup(lookup_from(&[
            (ENV_API_ID, "twelve"),
            (ENV_API_HASH, "abcdef"),
            (ENV_BASE_SERVICE_URL, "https://svc.example/"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_from_lookup_bad_proxy_is_ignored() {
        let config = RelayConfig::from_lookup(lookup_from(&[
            (ENV_API_ID, "12345"),
            (ENV_API_HASH, "abcdef"),
            (ENV_BASE_SERVICE_URL, "https://svc.example/"),
            (proxy::ENV_PROXY_TYPE, "socks5"),
            (proxy::ENV_PROXY_ADDR, "10.0.0.1"),
            (proxy::ENV_PROXY_PORT, "abc"),
        ]))
        .unwrap();
        assert!(config.proxy.is_none());
    }

    #[test]
    fn test_credentials_only() {
        let credentials = ApiCredentials::from_lookup(lookup_from(&[
            (ENV_API_ID, "42"),
            (ENV_API_HASH, "abcdef"),
        ]))
        .unwrap();
        assert_eq!(credentials.api_id, 42);

        let err = ApiCredentials::from_lookup(lookup_from(&[(ENV_API_ID, "42")])).unwrap_err();
        assert!(matches!(err, Error::MissingConfig { ref names } if names == &[ENV_API_HASH]));
    }

    #[test]
    fn test_api_hash_not_in_debug() {
        let config = RelayConfig::builder()
            .api_id(1)
            .api_hash("super-secret-hash")
            .base_service_url("https://svc.example/")
            .session_path("session_auto_jd")
            .build()
            .unwrap();

        let debug_str = format!("{config:?}");
        assert!(!debug_str.contains("super-secret-hash"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}
