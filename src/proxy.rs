//! Outbound proxy configuration for the Telegram transport.
//!
//! The proxy is optional and comes from `TELEGRAM_PROXY_*` environment variables.
//! Resolution never fails: anything incomplete or malformed degrades to "no proxy".
//!
//! # Example
//!
//! ```
//! use tg_code_relay::proxy::{resolve_proxy, ProxyKind};
//!
//! let vars = [
//!     ("TELEGRAM_PROXY_TYPE", "socks5"),
//!     ("TELEGRAM_PROXY_ADDR", "10.0.0.1"),
//!     ("TELEGRAM_PROXY_PORT", "1080"),
//! ];
//! let proxy = resolve_proxy(|key| {
//!     vars.iter().find(|(k, _)| *k == key).map(|(_, v)| (*v).to_string())
//! })
//! .unwrap();
//!
//! assert_eq!(proxy.kind, ProxyKind::Socks5);
//! assert!(proxy.auth.is_none());
//! ```

use secrecy::{ExposeSecret, SecretString};
use std::str::FromStr;
use tracing::{info, warn};

/// Proxy type variable.
pub const ENV_PROXY_TYPE: &str = "TELEGRAM_PROXY_TYPE";
/// Proxy host variable.
pub const ENV_PROXY_ADDR: &str = "TELEGRAM_PROXY_ADDR";
/// Proxy port variable.
pub const ENV_PROXY_PORT: &str = "TELEGRAM_PROXY_PORT";
/// Proxy username variable.
pub const ENV_PROXY_USERNAME: &str = "TELEGRAM_PROXY_USERNAME";
/// Proxy password variable.
pub const ENV_PROXY_PASSWORD: &str = "TELEGRAM_PROXY_PASSWORD";
/// Reverse DNS flag variable (default `"true"`).
pub const ENV_PROXY_RDNS: &str = "TELEGRAM_PROXY_RDNS";

/// Supported proxy protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyKind {
    /// SOCKS5.
    Socks5,
    /// SOCKS4.
    Socks4,
    /// HTTP CONNECT.
    Http,
}

impl ProxyKind {
    /// URL scheme for this proxy kind.
    #[must_use]
    pub fn scheme(self) -> &'static str {
        match self {
            ProxyKind::Socks5 => "socks5",
            ProxyKind::Socks4 => "socks4",
            ProxyKind::Http => "http",
        }
    }
}

impl FromStr for ProxyKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "socks5" => Ok(ProxyKind::Socks5),
            "socks4" => Ok(ProxyKind::Socks4),
            "http" => Ok(ProxyKind::Http),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.scheme())
    }
}

/// Validated proxy descriptor.
#[derive(Debug, Clone)]
pub struct ProxyDescriptor {
    /// Proxy protocol.
    pub kind: ProxyKind,
    /// Proxy server hostname or IP address.
    pub host: String,
    /// Proxy server port (never 0).
    pub port: u16,
    /// Whether hostnames are resolved by the proxy.
    pub reverse_dns: bool,
    /// Optional authentication credentials.
    pub auth: Option<ProxyAuth>,
}

/// Authentication credentials for the proxy.
#[derive(Debug, Clone)]
pub struct ProxyAuth {
    /// Username for proxy authentication.
    pub username: String,
    /// Password for proxy authentication.
    pub password: SecretString,
}

impl ProxyDescriptor {
    /// Creates a descriptor without authentication.
    #[must_use]
    pub fn new(kind: ProxyKind, host: impl Into<String>, port: u16) -> Self {
        Self {
            kind,
            host: host.into(),
            port,
            reverse_dns: true,
            auth: None,
        }
    }

    /// Adds credentials to this descriptor.
    #[must_use]
    pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some(ProxyAuth {
            username: username.into(),
            password: SecretString::from(password.into()),
        });
        self
    }

    /// Returns the proxy address as "host:port".
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns `true` if this proxy requires authentication.
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        self.auth.is_some()
    }

    /// Renders the proxy as a URL including credentials, for handing to the transport.
    ///
    /// Never log the result; use the `Display` impl instead.
    #[must_use]
    pub fn to_url(&self) -> String {
        match &self.auth {
            Some(auth) => format!(
                "{}://{}:{}@{}:{}",
                self.kind,
                auth.username,
                auth.password.expose_secret(),
                self.host,
                self.port
            ),
            None => format!("{}://{}:{}", self.kind, self.host, self.port),
        }
    }
}

impl std::fmt::Display for ProxyDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.auth {
            Some(auth) => write!(
                f,
                "{}://{}:***@{}:{}",
                self.kind, auth.username, self.host, self.port
            ),
            None => write!(f, "{}://{}:{}", self.kind, self.host, self.port),
        }
    }
}

/// Resolves the proxy from an arbitrary variable lookup.
///
/// Returns `None` when type, address or port is missing. A port that is not a valid
/// number, or an unknown proxy type, is logged as a warning and also yields `None`.
/// Credentials are attached only when both username and password are non-empty.
pub fn resolve_proxy<L>(lookup: L) -> Option<ProxyDescriptor>
where
    L: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

    let kind_raw = get(ENV_PROXY_TYPE)?.to_ascii_lowercase();
    let host = get(ENV_PROXY_ADDR)?;
    let port_raw = get(ENV_PROXY_PORT)?;

    let port = match port_raw.trim().parse::<u16>() {
        Ok(port) if port > 0 => port,
        _ => {
            warn!(port = %port_raw, "Invalid proxy port, continuing without proxy");
            return None;
        }
    };

    let Ok(kind) = kind_raw.parse::<ProxyKind>() else {
        warn!(proxy_type = %kind_raw, "Unsupported proxy type, continuing without proxy");
        return None;
    };

    let reverse_dns = lookup(ENV_PROXY_RDNS).map_or(true, |v| v.eq_ignore_ascii_case("true"));

    let mut proxy = ProxyDescriptor::new(kind, host, port);
    proxy.reverse_dns = reverse_dns;

    if let (Some(username), Some(password)) = (get(ENV_PROXY_USERNAME), get(ENV_PROXY_PASSWORD)) {
        proxy = proxy.with_auth(username, password);
    }

    info!(proxy = %proxy, reverse_dns, "Proxy configured");

    Some(proxy)
}
