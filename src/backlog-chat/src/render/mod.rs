//! Card renderers, one per supported event type.
//!
//! Renderers are pure: they read a normalized [`WebhookEvent`] and return a
//! [`ChatMessage`]. Every card uses the event author as subtitle and ends
//! with an action bar, except for deletions which render a bare header.

pub mod issue;
pub mod project;
pub mod pull_request;
pub mod repository;
pub mod wiki;

use crate::diff::text_diff;
use crate::error::{RenderError, RenderResult};
use crate::links::{EventLinks, LinkBuilder};
use crate::message::{ChatMessage, KeyValue, MessageBuilder, Widget};
use crate::model::{Project, WebhookEvent};
use crate::resolver::{Change, icon_for_field};

/// Signature shared by all renderers.
pub type RenderFn = fn(&RenderContext<'_>) -> RenderResult<ChatMessage>;

/// Everything a renderer reads.
pub struct RenderContext<'a> {
    pub event: &'a WebhookEvent,
    pub links: EventLinks<'a>,
}

impl<'a> RenderContext<'a> {
    pub fn new(links: &'a LinkBuilder, event: &'a WebhookEvent) -> Self {
        Self {
            event,
            links: links.for_event(event),
        }
    }

    /// Display name of the user who triggered the event.
    pub fn author(&self) -> &str {
        &self.event.created_user.name
    }

    pub fn project(&self) -> RenderResult<&'a Project> {
        self.event.project()
    }

    /// Start a card with `text` as notification and `title` as header.
    pub fn message(&self, text: impl Into<String>, title: impl Into<String>) -> MessageBuilder {
        MessageBuilder::new(text, title, self.author())
    }

    /// Error for a renderer invoked on an event of another kind.
    pub fn wrong_content(&self, renderer: &'static str) -> RenderError {
        RenderError::TypeState {
            operation: renderer,
            event_type: self.event.event_type,
        }
    }
}

/// `old > new` key-value for one change.
pub fn transition_widget(change: &Change) -> Widget {
    KeyValue::new(change.label, change.transition())
        .with_icon(icon_for_field(&change.field))
        .into()
}

/// Key-value showing a unified diff of the change values.
pub fn diff_widget(change: &Change) -> Widget {
    KeyValue::new(
        change.label,
        text_diff(change.old_value.as_deref(), change.new_value.as_deref()),
    )
    .with_icon(icon_for_field(&change.field))
    .into()
}

/// Whether the change edits the free-text description.
pub fn is_description(change: &Change) -> bool {
    change.field == "description"
}

/// Join entity names with `", "`.
pub fn join_names<'n>(names: impl IntoIterator<Item = &'n str>) -> String {
    names.into_iter().collect::<Vec<_>>().join(", ")
}
