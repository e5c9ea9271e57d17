//! # tg-code-relay
//!
//! Watches a Telegram account for login-code notifications from the official
//! service account and forwards each extracted code to an HTTP endpoint.
//!
//! The pipeline per message is: filter by sender → extract a 5-digit code →
//! one HTTP GET with the code appended to a base URL.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tg_code_relay::{HttpForwarder, RelayConfig, SessionMonitor, TelegramTransport};
//!
//! # async fn example() -> tg_code_relay::Result<()> {
//! let config = RelayConfig::from_env()?;
//!
//! let transport = TelegramTransport::new(&config);
//! let forwarder = HttpForwarder::new(&config.base_service_url, config.forward_timeout)?;
//! let mut monitor = SessionMonitor::new(transport, forwarder, config.official_id);
//!
//! // Relays codes until Ctrl-C, then disconnects.
//! monitor.run(async { tokio::signal::ctrl_c().await.ok(); }).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Code Extraction
//!
//! ```
//! use tg_code_relay::CodeExtractor;
//!
//! let extractor = CodeExtractor::new();
//! assert_eq!(
//!     extractor.extract(Some("**Login code:** 35628. Do not give this code to anyone")).as_deref(),
//!     Some("35628")
//! );
//! ```
//!
//! ## Observability
//!
//! The crate uses `tracing` for instrumentation. [`logging::init`] installs the
//! process-wide subscriber with console and rotating file output.
//!
//! ### Span Naming Convention
//!
//! - `SessionMonitor::start` - Connection and authorization
//! - `SessionMonitor::run` - Whole monitoring lifetime
//! - `SessionMonitor::handle_message` - One incoming message
//! - `HttpForwarder::forward` - Forwarding request
//! - `TelegramTransport::connect` - Transport connection
//! - `TelegramTransport::login` - Interactive login flow

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
pub mod config;
pub mod error;
pub mod extractor;
pub mod forwarder;
pub mod logging;
pub mod monitor;
pub mod proxy;
pub mod session;
pub mod telegram;
pub mod transport;

// Re-exports for ergonomic API
pub use config::{ApiCredentials, RelayConfig, RelayConfigBuilder, TELEGRAM_OFFICIAL_ID};
pub use error::{Error, ErrorCategory, Result};
pub use extractor::{CodeExtractor, Matcher, RegexMatcher};
pub use forwarder::{Forwarder, HttpForwarder};
pub use monitor::{HandleOutcome, MonitorState, SessionMonitor};
pub use proxy::{ProxyAuth, ProxyDescriptor, ProxyKind};
pub use telegram::TelegramTransport;
pub use transport::{AccountInfo, IncomingMessage, Transport};
