//! Error types for the tg-code-relay crate.
//!
//! All errors implement [`std::error::Error`] and provide context about what went wrong.
//! Errors are grouped by [`ErrorCategory`] for logging - see [`Error::category`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error coming from the messaging client library.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while relaying login codes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration errors (fatal at startup)
    // ─────────────────────────────────────────────────────────────────────────
    /// One or more required environment variables are missing or empty.
    #[error("missing required configuration: {}", names.join(", "))]
    MissingConfig {
        /// Names of every missing variable.
        names: Vec<&'static str>,
    },

    /// A configuration value is present but unusable.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Session storage
    // ─────────────────────────────────────────────────────────────────────────
    /// Reading or writing the session token file failed.
    #[error("session file error at {}", path.display())]
    SessionIo {
        /// The session file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Transport errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to establish the transport connection.
    #[error("failed to connect to Telegram")]
    Connect {
        /// The underlying client error.
        #[source]
        source: BoxError,
    },

    /// A transport call failed after the connection was established.
    #[error("transport operation '{operation}' failed")]
    Transport {
        /// The operation that failed.
        operation: &'static str,
        /// The underlying client error.
        #[source]
        source: BoxError,
    },

    /// An operation that needs a live connection was called while disconnected.
    #[error("transport is not connected")]
    NotConnected,

    // ─────────────────────────────────────────────────────────────────────────
    // Authorization errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The interactive login flow failed.
    #[error("login failed: {reason}")]
    Login {
        /// Description reported by the client library.
        reason: String,
    },

    /// The session is still unauthorized after the login flow.
    #[error("account is not authorized after login flow")]
    NotAuthorized,

    /// Reading interactive input failed.
    #[error("failed to read interactive input")]
    Prompt {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Forwarding errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    ClientBuild {
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Logging
    // ─────────────────────────────────────────────────────────────────────────
    /// The logging subscriber could not be installed.
    #[error("failed to initialize logging: {message}")]
    LoggingInit {
        /// Description of the failure.
        message: String,
    },
}

impl Error {
    /// Returns `true` if the process should stop because of this error.
    ///
    /// Only startup problems are fatal. Everything that can happen while handling
    /// a single message is logged and dropped at the handler boundary.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Configuration | ErrorCategory::Authorization | ErrorCategory::Logging
        )
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::MissingConfig { .. } | Error::InvalidConfig { .. } => {
                ErrorCategory::Configuration
            }

            Error::SessionIo { .. } => ErrorCategory::Session,

            Error::Connect { .. } | Error::Transport { .. } | Error::NotConnected => {
                ErrorCategory::Transport
            }

            Error::Login { .. } | Error::NotAuthorized | Error::Prompt { .. } => {
                ErrorCategory::Authorization
            }

            Error::ClientBuild { .. } => ErrorCategory::Forward,

            Error::LoggingInit { .. } => ErrorCategory::Logging,
        }
    }

    pub(crate) fn transport<E>(operation: &'static str) -> impl FnOnce(E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        move |source| Error::Transport {
            operation,
            source: Box::new(source),
        }
    }
}

/// Error categories for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Missing or invalid configuration.
    Configuration,
    /// Session token file problems.
    Session,
    /// Messaging transport failures.
    Transport,
    /// Login and authorization failures.
    Authorization,
    /// HTTP forwarding failures.
    Forward,
    /// Logging setup failures.
    Logging,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Session => write!(f, "session"),
            ErrorCategory::Transport => write!(f, "transport"),
            ErrorCategory::Authorization => write!(f, "authorization"),
            ErrorCategory::Forward => write!(f, "forward"),
            ErrorCategory::Logging => write!(f, "logging"),
        }
    }
}
