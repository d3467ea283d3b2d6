//! HTTP request handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{OriginalUri, Path, Query, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::delivery::{Credentials, DeliveryOutcome};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Query string of an inbound webhook.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookQuery {
    pub key: Option<String>,
    pub token: Option<String>,
}

impl WebhookQuery {
    fn credentials(&self) -> AppResult<Credentials<'_>> {
        match (self.key.as_deref(), self.token.as_deref()) {
            (Some(key), Some(token)) if !key.is_empty() && !token.is_empty() => {
                Ok(Credentials { key, token })
            }
            _ => Err(AppError::BadRequest(
                "query parameters `key` and `token` are required".to_string(),
            )),
        }
    }
}

/// Body returned for every accepted webhook.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub message: &'static str,
}

const ACK: Ack = Ack { message: "OK" };

/// Relay one Backlog webhook to the chat space at the same path.
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Path(space_id): Path<String>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<WebhookQuery>,
    Json(payload): Json<Value>,
) -> AppResult<Json<Ack>> {
    let message = match state.dispatcher.render(&payload) {
        Ok(message) => message,
        Err(e) if e.is_unsupported() => {
            warn!(space = %space_id, error = %e, "ignoring webhook");
            return Ok(Json(ACK));
        }
        Err(e) => {
            error!(space = %space_id, error = %e, "failed to render webhook");
            return Err(e.into());
        }
    };

    let credentials = query.credentials()?;
    match state.chat.post(uri.path(), credentials, &message).await? {
        DeliveryOutcome::Delivered => info!(space = %space_id, "webhook relayed"),
        DeliveryOutcome::Rejected { status } => {
            warn!(space = %space_id, status, "webhook acknowledged but not delivered");
        }
    }

    Ok(Json(ACK))
}

/// Health check endpoint.
pub async fn health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_required() {
        let query = WebhookQuery {
            key: Some("foo".into()),
            token: None,
        };
        assert!(matches!(
            query.credentials(),
            Err(AppError::BadRequest(_))
        ));

        let query = WebhookQuery {
            key: Some("foo".into()),
            token: Some(String::new()),
        };
        assert!(query.credentials().is_err());
    }

    #[test]
    fn test_credentials_present() {
        let query = WebhookQuery {
            key: Some("foo".into()),
            token: Some("bar".into()),
        };
        let credentials = query.credentials().unwrap();
        assert_eq!(credentials.key, "foo");
        assert_eq!(credentials.token, "bar");
    }
}
