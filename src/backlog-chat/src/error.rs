//! Error types for webhook normalization and rendering.
//!
//! Only [`RenderError::UnsupportedEventType`] is expected in normal
//! operation; callers acknowledge such events without forwarding anything.
//! The other variants mean either the webhook contract changed upstream or
//! a renderer is wired to the wrong event kind, and are meant to propagate.

use thiserror::Error;

use crate::event_type::EventType;

/// Errors produced while turning a webhook payload into a chat message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The event type has no registered handler, or one of its change
    /// entries names a field this crate cannot label.
    #[error("event type `{code}` is not supported: {reason}")]
    UnsupportedEventType {
        /// Raw `type` code from the payload.
        code: i64,
        /// Why the event cannot be handled.
        reason: String,
    },

    /// A change entry names a field missing from the field table.
    ///
    /// Raised by the resolver; the dispatcher reports it as
    /// [`RenderError::UnsupportedEventType`].
    #[error("change field `{0}` has no mapping")]
    UnmappedField(String),

    /// The payload broke the webhook contract: a required key is missing,
    /// an enum ID is unknown, or a value has the wrong encoding.
    #[error("malformed {context} payload: {message}")]
    MalformedPayload {
        /// Which part of the payload failed (variant or entity name).
        context: String,
        /// Parser message.
        message: String,
    },

    /// An operation was invoked on an event kind that does not carry the
    /// entity it needs.
    #[error("`{operation}` is not supported for event type {event_type}")]
    TypeState {
        /// Name of the link accessor or renderer.
        operation: &'static str,
        /// Kind of the event it was invoked on.
        event_type: EventType,
    },
}

impl RenderError {
    /// Build an [`RenderError::UnsupportedEventType`] for an unregistered code.
    pub fn unregistered(code: i64) -> Self {
        Self::UnsupportedEventType {
            code,
            reason: "no handler is registered".to_string(),
        }
    }

    /// Build a [`RenderError::MalformedPayload`].
    pub fn malformed(context: impl Into<String>, message: impl ToString) -> Self {
        Self::MalformedPayload {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Whether the boundary should acknowledge the event and drop it.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedEventType { .. })
    }
}

/// Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
