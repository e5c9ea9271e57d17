//! Session monitor: connect, authorize, then relay codes from the official account.
//!
//! The [`SessionMonitor`] drives one [`Transport`] through an explicit state machine:
//!
//! ```text
//! Disconnected → Connecting → Authorized ─────────────┐
//!                     │                                ├→ Monitoring → Disconnected
//!                     └→ Unauthorized → (login) → Authorized
//!                                           └→ Unauthorized (startup fails)
//! ```
//!
//! An already-authorized session skips the login flow entirely, so the process can be
//! restarted freely once a session file exists.
//!
//! # Example
//!
//! ```no_run
//! use tg_code_relay::{HttpForwarder, RelayConfig, SessionMonitor, TelegramTransport};
//!
//! # async fn example() -> tg_code_relay::Result<()> {
//! let config = RelayConfig::from_env()?;
//! let transport = TelegramTransport::new(&config);
//! let forwarder = HttpForwarder::new(&config.base_service_url, config.forward_timeout)?;
//!
//! let mut monitor = SessionMonitor::new(transport, forwarder, config.official_id);
//! monitor.run(async { tokio::signal::ctrl_c().await.ok(); }).await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use crate::extractor::CodeExtractor;
use crate::forwarder::Forwarder;
use crate::transport::{IncomingMessage, Transport};
use std::future::Future;
use tracing::{debug, error, info, instrument, warn};

/// Number of recent messages fetched by the startup diagnostics.
pub const RECENT_MESSAGE_LIMIT: usize = 3;

/// Lifecycle state of a [`SessionMonitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitorState {
    /// No transport connection.
    Disconnected,
    /// Transport connection in progress.
    Connecting,
    /// Connected and bound to a logged-in account.
    Authorized,
    /// Connected but not logged in.
    Unauthorized,
    /// Receiving and handling messages.
    Monitoring,
}

/// What happened to one incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    /// The sender could not be resolved.
    NoSender,
    /// The sender is not the official account.
    IgnoredSender,
    /// Official message without a recognizable code.
    NoCode,
    /// The code was delivered.
    Forwarded(String),
    /// The code was found but delivery failed; it is not retried.
    ForwardFailed(String),
}

/// Result of probing an account during startup diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountProbe {
    /// Display name, if the account could be resolved.
    pub display_name: Option<String>,
    /// Number of recent messages found (at most [`RECENT_MESSAGE_LIMIT`]).
    pub recent_count: usize,
}

/// Looks up an account and counts its most recent messages.
///
/// # Errors
///
/// Returns the transport error from either lookup.
#[instrument(name = "monitor::probe_account", skip(transport))]
pub async fn probe_account<T>(transport: &mut T, id: i64) -> Result<AccountProbe>
where
    T: Transport + ?Sized,
{
    let display_name = transport.lookup_display_name(id).await?;
    let recent = transport.recent_messages(id, RECENT_MESSAGE_LIMIT).await?;

    Ok(AccountProbe {
        display_name,
        recent_count: recent.len(),
    })
}

/// Watches a Telegram session and forwards codes sent by the official account.
pub struct SessionMonitor<T, F> {
    transport: T,
    forwarder: F,
    extractor: CodeExtractor,
    official_id: i64,
    state: MonitorState,
}

impl<T, F> SessionMonitor<T, F>
where
    T: Transport,
    F: Forwarder,
{
    /// Creates a monitor in the [`MonitorState::Disconnected`] state.
    #[must_use]
    pub fn new(transport: T, forwarder: F, official_id: i64) -> Self {
        Self {
            transport,
            forwarder,
            extractor: CodeExtractor::new(),
            official_id,
            state: MonitorState::Disconnected,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// The sender id whose messages are acted upon.
    #[must_use]
    pub fn official_id(&self) -> i64 {
        self.official_id
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The forwarder in use.
    #[must_use]
    pub fn forwarder(&self) -> &F {
        &self.forwarder
    }

    /// Connects and makes sure the session is authorized, then enters
    /// [`MonitorState::Monitoring`].
    ///
    /// The login flow only runs when the first authorization check fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthorized`] if the session is still unauthorized after the
    /// login flow, or the transport error that stopped the connection or login.
    #[instrument(name = "SessionMonitor::start", skip(self), fields(official_id = self.official_id))]
    pub async fn start(&mut self) -> Result<()> {
        self.state = MonitorState::Connecting;
        info!("Connecting to Telegram");

        if let Err(e) = self.transport.connect().await {
            self.state = MonitorState::Disconnected;
            return Err(e);
        }

        if self.authorize().await? {
            self.log_account().await;
        } else {
            info!("Session not authorized, starting login flow");
            self.transport.login().await?;

            if !self.authorize().await? {
                error!("Still unauthorized after login flow");
                return Err(Error::NotAuthorized);
            }

            self.log_account().await;
            self.log_official_probe().await;
        }

        self.state = MonitorState::Monitoring;
        Ok(())
    }

    /// Handles one message: filter by sender, extract, forward.
    ///
    /// Never fails; every problem is logged and reflected in the outcome.
    #[instrument(
        name = "SessionMonitor::handle_message",
        skip_all,
        fields(sender_id = message.sender_id)
    )]
    pub async fn handle_message(&self, message: &IncomingMessage) -> HandleOutcome {
        let Some(sender_id) = message.sender_id else {
            debug!("Message without resolvable sender, ignoring");
            return HandleOutcome::NoSender;
        };

        let sender_name = message.sender_name.as_deref().unwrap_or("Unknown");
        debug!(sender = %sender_name, "Message received");

        if sender_id != self.official_id {
            debug!(sender = %sender_name, "Not from official account, ignoring");
            return HandleOutcome::IgnoredSender;
        }

        info!(text = %message.text, "Official message received");

        let Some((code, pattern)) = self.extractor.extract_with_pattern(Some(&message.text)) else {
            info!("No code found in official message");
            return HandleOutcome::NoCode;
        };

        info!(code = %code, pattern, "Code detected");

        if self.forwarder.forward(&code).await {
            info!(code = %code, "Code forwarded");
            HandleOutcome::Forwarded(code)
        } else {
            error!(code = %code, "Code forwarding failed");
            HandleOutcome::ForwardFailed(code)
        }
    }

    /// Starts the monitor and relays messages until `shutdown` completes or the
    /// event stream ends.
    ///
    /// The transport is disconnected on every exit path.
    ///
    /// # Errors
    ///
    /// Returns the startup error, or the transport error that ended monitoring.
    #[instrument(name = "SessionMonitor::run", skip_all)]
    pub async fn run<S>(&mut self, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()>,
    {
        let result = match self.start().await {
            Ok(()) => self.monitor(shutdown).await,
            Err(e) => {
                error!(error = %e, "Startup failed, not monitoring");
                Err(e)
            }
        };

        self.teardown().await;
        result
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private methods
    // ─────────────────────────────────────────────────────────────────────────

    /// The single authorization check reused at every transition.
    async fn authorize(&mut self) -> Result<bool> {
        let authorized = self.transport.is_authorized().await?;
        self.state = if authorized {
            MonitorState::Authorized
        } else {
            MonitorState::Unauthorized
        };
        debug!(authorized, "Authorization checked");
        Ok(authorized)
    }

    async fn log_account(&mut self) {
        match self.transport.me().await {
            Ok(me) => info!(name = %me.display_name, id = me.id, "Logged in"),
            Err(e) => warn!(error = %e, "Could not fetch own account"),
        }
    }

    async fn log_official_probe(&mut self) {
        match probe_account(&mut self.transport, self.official_id).await {
            Ok(probe) => info!(
                name = probe.display_name.as_deref().unwrap_or("Unknown"),
                recent = probe.recent_count,
                "Official account reachable"
            ),
            Err(e) => warn!(error = %e, "Could not reach official account"),
        }
    }

    async fn monitor<S>(&mut self, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(official_id = self.official_id, "Listening for login codes");

        loop {
            let next = tokio::select! {
                () = &mut shutdown => {
                    info!("Stop signal received");
                    return Ok(());
                }
                next = self.transport.next_message() => next,
            };

            match next {
                Ok(Some(message)) => {
                    self.handle_message(&message).await;
                }
                Ok(None) => {
                    warn!("Update stream ended");
                    return Ok(());
                }
                Err(e) => {
                    error!(error = %e, "Receiving updates failed");
                    return Err(e);
                }
            }
        }
    }

    async fn teardown(&mut self) {
        self.transport.disconnect().await;
        self.state = MonitorState::Disconnected;
        info!("Disconnected");
    }
}

impl<T, F> std::fmt::Debug for SessionMonitor<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionMonitor")
            .field("official_id", &self.official_id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
