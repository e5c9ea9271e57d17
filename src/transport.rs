//! The messaging client consumed by the session monitor.
//!
//! [`Transport`] is the seam between the monitor and the MTProto client. The
//! production implementation is [`crate::telegram::TelegramTransport`].

use crate::error::Result;
use async_trait::async_trait;

/// One incoming message, as seen by the monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Sender account id, if the sender could be resolved.
    pub sender_id: Option<i64>,
    /// Sender display name, if known.
    pub sender_name: Option<String>,
    /// Message text (may be empty).
    pub text: String,
}

impl IncomingMessage {
    /// Creates a message from a resolved sender.
    #[must_use]
    pub fn from_sender(sender_id: i64, text: impl Into<String>) -> Self {
        Self {
            sender_id: Some(sender_id),
            sender_name: None,
            text: text.into(),
        }
    }

    /// Creates a message whose sender could not be resolved.
    #[must_use]
    pub fn anonymous(text: impl Into<String>) -> Self {
        Self {
            sender_id: None,
            sender_name: None,
            text: text.into(),
        }
    }

    /// Attaches a display name to the sender.
    #[must_use]
    pub fn with_sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = Some(name.into());
        self
    }
}

/// The logged-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    /// Account id.
    pub id: i64,
    /// First and last name.
    pub display_name: String,
    /// Public username, if any.
    pub username: Option<String>,
    /// Phone number, if visible.
    pub phone: Option<String>,
}

/// Messaging client capabilities used by the relay.
#[async_trait]
pub trait Transport: Send {
    /// Establishes the transport connection without logging in.
    async fn connect(&mut self) -> Result<()>;

    /// Reports whether the session is bound to a logged-in account.
    async fn is_authorized(&mut self) -> Result<bool>;

    /// Runs the interactive login flow to completion.
    async fn login(&mut self) -> Result<()>;

    /// Returns the logged-in account.
    async fn me(&mut self) -> Result<AccountInfo>;

    /// Resolves an account id to a display name. `Ok(None)` if unknown.
    async fn lookup_display_name(&mut self, id: i64) -> Result<Option<String>>;

    /// Fetches up to `limit` most recent messages exchanged with `id`.
    async fn recent_messages(&mut self, id: i64, limit: usize) -> Result<Vec<IncomingMessage>>;

    /// Waits for the next incoming message. `Ok(None)` means the event stream ended.
    async fn next_message(&mut self) -> Result<Option<IncomingMessage>>;

    /// Releases the connection. Never fails; problems are logged.
    async fn disconnect(&mut self);
}
