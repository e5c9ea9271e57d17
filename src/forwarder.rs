//! Forwarding extracted codes to the configured HTTP endpoint.
//!
//! The code is appended verbatim to the base URL and sent with a single GET.
//! Only status 200 counts as delivered. There is no retry: a failed code is lost.

use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{error, info, instrument};

/// Destination for extracted codes.
#[async_trait]
pub trait Forwarder: Send + Sync {
    /// Delivers one code. Returns `true` on success.
    async fn forward(&self, code: &str) -> bool;
}

/// Builds the target URL by raw concatenation.
///
/// No separator is inserted and nothing is escaped.
///
/// ```
/// use tg_code_relay::forwarder::target_url;
///
/// assert_eq!(target_url("https://svc.example/code=", "35628"), "https://svc.example/code=35628");
/// ```
#[must_use]
pub fn target_url(base_url: &str, code: &str) -> String {
    format!("{base_url}{code}")
}

/// [`Forwarder`] issuing one GET per code with a fixed timeout.
#[derive(Debug, Clone)]
pub struct HttpForwarder {
    client: reqwest::Client,
    base_url: String,
}

impl HttpForwarder {
    /// Creates a forwarder for `base_url` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClientBuild`] if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| Error::ClientBuild { source })?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Returns the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Forwarder for HttpForwarder {
    #[instrument(name = "HttpForwarder::forward", skip(self), fields(code = %code))]
    async fn forward(&self, code: &str) -> bool {
        let url = target_url(&self.base_url, code);
        info!(url = %url, "Sending code to service");

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Request to service failed");
                return false;
            }
        };

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {e}>"));

        if status == StatusCode::OK {
            info!(body = %body, "Code delivered to service");
            true
        } else {
            error!(status = status.as_u16(), body = %body, "Service rejected code");
            false
        }
    }
}
