//! Backlog webhook to Google Chat card rendering.
//!
//! This crate turns the JSON payload of a Backlog webhook into a Google Chat
//! card message:
//! - Normalization of loosely typed payloads into typed event content
//! - Field label and enum ID resolution
//! - Unified diffs for description changes
//! - Deep links back into Backlog
//! - One card renderer per supported event type
//!
//! # Example
//!
//! ```rust,ignore
//! use backlog_chat::Dispatcher;
//!
//! let dispatcher = Dispatcher::new("https://example.backlog.com/");
//! let message = dispatcher.render(&payload)?;
//! let body = serde_json::to_string(&message)?;
//! ```
//!
//! Unsupported event types fail with
//! [`RenderError::UnsupportedEventType`]; callers are expected to
//! acknowledge those and send nothing.

pub mod diff;
pub mod dispatch;
pub mod error;
pub mod event_type;
pub mod links;
pub mod message;
pub mod model;
pub mod normalize;
pub mod render;
pub mod resolver;

// Re-export main types
pub use dispatch::{Dispatcher, is_supported, supported_event_types};
pub use error::{RenderError, RenderResult};
pub use event_type::EventType;
pub use links::LinkBuilder;
pub use message::{ChatMessage, MessageBuilder};
pub use model::{Content, WebhookEvent};
