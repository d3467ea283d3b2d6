//! Delivery of rendered cards to the Google Chat API.

use std::time::Duration;

use backlog_chat::ChatMessage;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

/// Request timeout for establishing a connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that prevent a card from reaching the chat API.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid chat API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("chat API request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Result of one delivery that reached the chat API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// The API answered with a non-success status.
    Rejected { status: u16 },
}

/// Space credentials taken from the inbound query string.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub key: &'a str,
    pub token: &'a str,
}

/// Client for the Google Chat incoming webhook API.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    api_base: Url,
}

impl ChatClient {
    /// Create a client posting under `api_base`.
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_base: Url::parse(api_base)?,
        })
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Target URL for a message posted to the inbound `path`.
    pub fn message_url(&self, path: &str, credentials: Credentials<'_>) -> Result<Url, DeliveryError> {
        let mut url = self.api_base.join(path)?;
        url.query_pairs_mut()
            .clear()
            .append_pair("key", credentials.key)
            .append_pair("token", credentials.token);
        Ok(url)
    }

    /// POST `message` to the chat API.
    ///
    /// A non-success status is reported as [`DeliveryOutcome::Rejected`];
    /// only transport failures are errors. No retry is attempted.
    pub async fn post(
        &self,
        path: &str,
        credentials: Credentials<'_>,
        message: &ChatMessage,
    ) -> Result<DeliveryOutcome, DeliveryError> {
        let url = self.message_url(path, credentials)?;
        debug!(path = %url.path(), "posting card to chat API");

        let response = self.client.post(url).json(message).send().await?;
        let status = response.status();

        if status.is_success() {
            info!(status = status.as_u16(), "card delivered");
            return Ok(DeliveryOutcome::Delivered);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "chat API rejected card");
        debug!(body = %body, "chat API error body");
        Ok(DeliveryOutcome::Rejected {
            status: status.as_u16(),
        })
    }
}
