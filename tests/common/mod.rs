//! Shared test doubles for the monitor tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tg_code_relay::{AccountInfo, Error, Forwarder, IncomingMessage, Result, Transport};

// ─────────────────────────────────────────────────────────────────────────────
// Fake transport
// ─────────────────────────────────────────────────────────────────────────────

/// Counts every call made against a [`FakeTransport`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Calls {
    pub connect: usize,
    pub is_authorized: usize,
    pub login: usize,
    pub me: usize,
    pub lookup: usize,
    pub recent: usize,
    pub next_message: usize,
    pub disconnect: usize,
}

/// What the fake does once its message queue is drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhenDrained {
    /// Report the end of the update stream.
    EndStream,
    /// Fail with a transport error.
    Fail,
    /// Never return.
    Hang,
}

#[derive(Debug)]
pub struct FakeTransport {
    pub authorized: bool,
    pub login_authorizes: bool,
    pub connect_fails: bool,
    pub lookup_fails: bool,
    pub when_drained: WhenDrained,
    pub messages: VecDeque<IncomingMessage>,
    pub calls: Arc<Mutex<Calls>>,
}

impl FakeTransport {
    /// A transport whose session is already authorized.
    pub fn authorized() -> Self {
        Self {
            authorized: true,
            login_authorizes: true,
            connect_fails: false,
            lookup_fails: false,
            when_drained: WhenDrained::EndStream,
            messages: VecDeque::new(),
            calls: Arc::new(Mutex::new(Calls::default())),
        }
    }

    /// A transport that needs the login flow first.
    pub fn unauthorized(login_authorizes: bool) -> Self {
        Self {
            authorized: false,
            login_authorizes,
            ..Self::authorized()
        }
    }

    pub fn with_messages(mut self, messages: impl IntoIterator<Item = IncomingMessage>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn when_drained(mut self, behavior: WhenDrained) -> Self {
        self.when_drained = behavior;
        self
    }

    pub fn calls(&self) -> Arc<Mutex<Calls>> {
        Arc::clone(&self.calls)
    }

    fn record(&self, f: impl FnOnce(&mut Calls)) {
        f(&mut self.calls.lock().unwrap());
    }
}

fn io_error(message: &str) -> Error {
    Error::Transport {
        operation: "fake",
        source: Box::new(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            message.to_string(),
        )),
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn connect(&mut self) -> Result<()> {
        self.record(|c| c.connect += 1);
        if self.connect_fails {
            return Err(Error::Connect {
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "refused",
                )),
            });
        }
        Ok(())
    }

    async fn is_authorized(&mut self) -> Result<bool> {
        self.record(|c| c.is_authorized += 1);
        Ok(self.authorized)
    }

    async fn login(&mut self) -> Result<()> {
        self.record(|c| c.login += 1);
        self.authorized = self.login_authorizes;
        Ok(())
    }

    async fn me(&mut self) -> Result<AccountInfo> {
        self.record(|c| c.me += 1);
        Ok(AccountInfo {
            id: 42,
            display_name: "Test User".into(),
            username: Some("tester".into()),
            phone: None,
        })
    }

    async fn lookup_display_name(&mut self, _id: i64) -> Result<Option<String>> {
        self.record(|c| c.lookup += 1);
        if self.lookup_fails {
            return Err(io_error("lookup failed"));
        }
        Ok(Some("Telegram".into()))
    }

    async fn recent_messages(&mut self, id: i64, limit: usize) -> Result<Vec<IncomingMessage>> {
        self.record(|c| c.recent += 1);
        Ok((0..limit)
            .map(|i| IncomingMessage::from_sender(id, format!("message {i}")))
            .collect())
    }

    async fn next_message(&mut self) -> Result<Option<IncomingMessage>> {
        self.record(|c| c.next_message += 1);
        if let Some(message) = self.messages.pop_front() {
            return Ok(Some(message));
        }
        match self.when_drained {
            WhenDrained::EndStream => Ok(None),
            WhenDrained::Fail => Err(io_error("connection reset")),
            WhenDrained::Hang => std::future::pending().await,
        }
    }

    async fn disconnect(&mut self) {
        self.record(|c| c.disconnect += 1);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Recording forwarder
// ─────────────────────────────────────────────────────────────────────────────

/// Forwarder that records every code and answers with a fixed result.
#[derive(Debug, Clone)]
pub struct RecordingForwarder {
    pub codes: Arc<Mutex<Vec<String>>>,
    pub succeed: bool,
}

impl RecordingForwarder {
    pub fn succeeding() -> Self {
        Self {
            codes: Arc::new(Mutex::new(Vec::new())),
            succeed: true,
        }
    }

    pub fn failing() -> Self {
        Self {
            succeed: false,
            ..Self::succeeding()
        }
    }

    pub fn forwarded(&self) -> Vec<String> {
        self.codes.lock().unwrap().clone()
    }
}

#[async_trait]
impl Forwarder for RecordingForwarder {
    async fn forward(&self, code: &str) -> bool {
        self.codes.lock().unwrap().push(code.to_string());
        self.succeed
    }
}
