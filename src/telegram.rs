//! [`Transport`] implementation backed by `grammers-client`.
//!
//! The client owns the MTProto connection; this module adds session persistence,
//! the interactive login prompts, and mapping of updates to [`IncomingMessage`].

use crate::config::{ApiCredentials, RelayConfig};
use crate::error::{Error, Result};
use crate::proxy::{ProxyDescriptor, ProxyKind};
use crate::session;
use crate::transport::{AccountInfo, IncomingMessage, Transport};
use async_trait::async_trait;
use grammers_client::types::{Chat, Message};
use grammers_client::{Client, Config, InitParams, SignInError, Update};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

/// Telegram user-account transport.
pub struct TelegramTransport {
    credentials: ApiCredentials,
    session_path: PathBuf,
    proxy: Option<ProxyDescriptor>,
    phone: Option<String>,
    client: Option<Client>,
}

impl TelegramTransport {
    /// Creates a disconnected transport from the relay configuration.
    #[must_use]
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            credentials: config.credentials.clone(),
            session_path: config.session_path.clone(),
            proxy: config.proxy.clone(),
            phone: config.phone.clone(),
            client: None,
        }
    }

    /// Creates a disconnected transport from bare credentials, without proxy.
    #[must_use]
    pub fn with_credentials(credentials: ApiCredentials, session_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials,
            session_path: session_path.into(),
            proxy: None,
            phone: None,
            client: None,
        }
    }

    /// Sets the outbound proxy.
    #[must_use]
    pub fn proxy(mut self, proxy: Option<ProxyDescriptor>) -> Self {
        self.proxy = proxy;
        self
    }

    /// Returns `true` while a client connection is held.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    fn client(&self) -> Result<Client> {
        self.client.clone().ok_or(Error::NotConnected)
    }

    fn init_params(&self) -> InitParams {
        let proxy_url = match &self.proxy {
            Some(proxy) if proxy.kind == ProxyKind::Socks5 => {
                // Data centers are dialed by IP, so the proxy never resolves a hostname.
                info!(
                    proxy = %proxy,
                    reverse_dns = proxy.reverse_dns,
                    "Connecting through proxy"
                );
                Some(proxy.to_url())
            }
            Some(proxy) => {
                warn!(
                    proxy = %proxy,
                    "Transport only tunnels socks5 proxies, connecting directly"
                );
                None
            }
            None => None,
        };

        InitParams {
            proxy_url,
            ..InitParams::default()
        }
    }

    async fn find_chat(&self, id: i64) -> Result<Option<Chat>> {
        let client = self.client()?;
        let mut dialogs = client.iter_dialogs();

        while let Some(dialog) = dialogs
            .next()
            .await
            .map_err(Error::transport("iter_dialogs"))?
        {
            let chat = dialog.chat();
            if chat.id() == id {
                return Ok(Some(chat.clone()));
            }
        }

        Ok(None)
    }
}

fn to_incoming(message: &Message) -> IncomingMessage {
    let sender = message.sender();
    IncomingMessage {
        sender_id: sender.as_ref().map(Chat::id),
        sender_name: sender.as_ref().map(|chat| chat.name().to_string()),
        text: message.text().to_string(),
    }
}

/// Reads one line from stdin after printing `message`.
async fn prompt(message: &str) -> Result<String> {
    let message = message.to_string();

    tokio::task::spawn_blocking(move || {
        let mut stdout = std::io::stdout();
        stdout.write_all(message.as_bytes())?;
        stdout.flush()?;

        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        Ok::<_, std::io::Error>(line.trim().to_string())
    })
    .await
    .map_err(|e| Error::Prompt {
        source: std::io::Error::other(e),
    })?
    .map_err(|source| Error::Prompt { source })
}

#[async_trait]
impl Transport for TelegramTransport {
    #[instrument(
        name = "TelegramTransport::connect",
        skip(self),
        fields(
            session = %self.session_path.display(),
            proxy_enabled = self.proxy.is_some()
        )
    )]
    async fn connect(&mut self) -> Result<()> {
        let session = session::load(&self.session_path)?;
        let params = self.init_params();

        let client = Client::connect(Config {
            session,
            api_id: self.credentials.api_id,
            api_hash: self.credentials.api_hash().to_string(),
            params,
        })
        .await
        .map_err(|e| Error::Connect {
            source: Box::new(e),
        })?;

        debug!("Transport connected");
        self.client = Some(client);
        Ok(())
    }

    async fn is_authorized(&mut self) -> Result<bool> {
        self.client()?
            .is_authorized()
            .await
            .map_err(Error::transport("is_authorized"))
    }

    #[instrument(name = "TelegramTransport::login", skip(self))]
    async fn login(&mut self) -> Result<()> {
        let client = self.client()?;

        let phone = match &self.phone {
            Some(phone) => phone.clone(),
            None => prompt("Enter your phone number (international format): ").await?,
        };

        let token = client
            .request_login_code(&phone)
            .await
            .map_err(|e| Error::Login {
                reason: e.to_string(),
            })?;

        let code = prompt("Enter the login code you received: ").await?;

        match client.sign_in(&token, &code).await {
            Ok(_) => {}
            Err(SignInError::PasswordRequired(password_token)) => {
                let hint = password_token.hint().unwrap_or("none").to_string();
                let password = prompt(&format!("Enter your 2FA password (hint: {hint}): ")).await?;

                client
                    .check_password(password_token, password.trim())
                    .await
                    .map_err(|e| Error::Login {
                        reason: e.to_string(),
                    })?;
            }
            Err(e) => {
                return Err(Error::Login {
                    reason: e.to_string(),
                })
            }
        }

        session::save(client.session(), &self.session_path)?;
        info!("Signed in, session saved");
        Ok(())
    }

    async fn me(&mut self) -> Result<AccountInfo> {
        let me = self
            .client()?
            .get_me()
            .await
            .map_err(Error::transport("get_me"))?;

        Ok(AccountInfo {
            id: me.id(),
            display_name: me.full_name(),
            username: me.username().map(str::to_string),
            phone: me.phone().map(str::to_string),
        })
    }

    async fn lookup_display_name(&mut self, id: i64) -> Result<Option<String>> {
        Ok(self
            .find_chat(id)
            .await?
            .map(|chat| chat.name().to_string()))
    }

    async fn recent_messages(&mut self, id: i64, limit: usize) -> Result<Vec<IncomingMessage>> {
        let Some(chat) = self.find_chat(id).await? else {
            return Ok(Vec::new());
        };

        let client = self.client()?;
        let mut iter = client.iter_messages(chat.pack()).limit(limit);
        let mut messages = Vec::with_capacity(limit);

        while let Some(message) = iter
            .next()
            .await
            .map_err(Error::transport("iter_messages"))?
        {
            messages.push(to_incoming(&message));
        }

        Ok(messages)
    }

    async fn next_message(&mut self) -> Result<Option<IncomingMessage>> {
        let client = self.client()?;

        loop {
            let update = client
                .next_update()
                .await
                .map_err(Error::transport("next_update"))?;

            match update {
                Update::NewMessage(message) if !message.outgoing() => {
                    return Ok(Some(to_incoming(&message)));
                }
                _ => {}
            }
        }
    }

    async fn disconnect(&mut self) {
        let Some(client) = self.client.take() else {
            return;
        };

        if let Err(e) = session::save(client.session(), &self.session_path) {
            warn!(error = %e, "Failed to save session on disconnect");
        }

        drop(client);
        debug!("Transport released");
    }
}

impl std::fmt::Debug for TelegramTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramTransport")
            .field("api_id", &self.credentials.api_id)
            .field("session_path", &self.session_path)
            .field("proxy", &self.proxy.as_ref().map(ToString::to_string))
            .field("connected", &self.client.is_some())
            .finish_non_exhaustive()
    }
}
