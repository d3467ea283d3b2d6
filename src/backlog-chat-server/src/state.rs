//! Application state management.

use backlog_chat::Dispatcher;

use crate::config::ServerConfig;
use crate::delivery::ChatClient;
use crate::error::{AppError, AppResult};

/// Application state shared across request handlers.
#[derive(Debug)]
pub struct AppState {
    /// Server configuration.
    pub config: ServerConfig,
    /// Renders webhook payloads with links into the configured space.
    pub dispatcher: Dispatcher,
    /// Client for the chat API.
    pub chat: ChatClient,
}

impl AppState {
    pub fn new(config: ServerConfig) -> AppResult<Self> {
        config
            .validate()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let dispatcher = Dispatcher::new(config.backlog_base_url.clone());
        let chat = ChatClient::new(&config.google_chat_api, config.delivery_timeout())?;

        Ok(Self {
            config,
            dispatcher,
            chat,
        })
    }
}
