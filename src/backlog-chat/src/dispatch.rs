//! Event dispatch.
//!
//! [`HANDLERS`] pairs every supported event type with its normalizer and
//! renderer. Codes missing from the table are reported as
//! [`RenderError::UnsupportedEventType`] so the boundary can acknowledge
//! them without forwarding anything.

use serde_json::Value;
use tracing::debug;

use crate::error::{RenderError, RenderResult};
use crate::event_type::EventType;
use crate::links::LinkBuilder;
use crate::message::ChatMessage;
use crate::model::{Content, EventEnvelope, WebhookEvent};
use crate::normalize;
use crate::render::{self, RenderContext, RenderFn};

/// Builds typed content from the raw `content` object.
pub type NormalizeFn = fn(&Value) -> RenderResult<Content>;

/// Normalizer and renderer for one event type.
#[derive(Debug, Clone, Copy)]
pub struct EventHandler {
    pub event_type: EventType,
    pub normalize: NormalizeFn,
    pub render: RenderFn,
}

const fn handler(event_type: EventType, normalize: NormalizeFn, render: RenderFn) -> EventHandler {
    EventHandler {
        event_type,
        normalize,
        render,
    }
}

/// Every supported event type, in code order.
pub static HANDLERS: &[EventHandler] = &[
    handler(EventType::CreateIssue, normalize::create_issue, render::issue::create_issue),
    handler(EventType::UpdateIssue, normalize::update_issue, render::issue::update_issue),
    handler(EventType::AddComment, normalize::add_comment, render::issue::add_comment),
    handler(EventType::DeleteIssue, normalize::delete_issue, render::issue::delete_issue),
    handler(EventType::CreateWiki, normalize::create_wiki, render::wiki::create_wiki),
    handler(EventType::UpdateWiki, normalize::update_wiki, render::wiki::update_wiki),
    handler(EventType::DeleteWiki, normalize::delete_wiki, render::wiki::delete_wiki),
    handler(
        EventType::CommitSubversion,
        normalize::commit_subversion,
        render::repository::commit_subversion,
    ),
    handler(EventType::PushGit, normalize::push_git, render::repository::push_git),
    handler(EventType::CreateGit, normalize::create_git, render::repository::create_git),
    handler(
        EventType::BulkUpdateIssue,
        normalize::bulk_update_issue,
        render::issue::bulk_update_issue,
    ),
    handler(EventType::JoinProject, normalize::join_project, render::project::join_project),
    handler(EventType::LeaveProject, normalize::leave_project, render::project::leave_project),
    handler(
        EventType::CreatePullRequest,
        normalize::create_pull_request,
        render::pull_request::create_pull_request,
    ),
    handler(
        EventType::UpdatePullRequest,
        normalize::update_pull_request,
        render::pull_request::update_pull_request,
    ),
    handler(
        EventType::CommentPullRequest,
        normalize::comment_pull_request,
        render::pull_request::comment_pull_request,
    ),
];

/// Look up the handler for a raw type code.
pub fn handler_for(code: i64) -> Option<&'static EventHandler> {
    HANDLERS.iter().find(|h| h.event_type.code() == code)
}

/// Event types that have a renderer.
pub fn supported_event_types() -> impl Iterator<Item = EventType> {
    HANDLERS.iter().map(|h| h.event_type)
}

pub fn is_supported(code: i64) -> bool {
    handler_for(code).is_some()
}

/// Renders raw webhook payloads into chat messages.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    links: LinkBuilder,
}

impl Dispatcher {
    /// Create a dispatcher linking into the Backlog space at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            links: LinkBuilder::new(base_url),
        }
    }

    pub fn links(&self) -> &LinkBuilder {
        &self.links
    }

    /// Render a complete webhook payload.
    ///
    /// The type code is checked before anything else is parsed, so an
    /// unsupported event never fails as malformed.
    pub fn render(&self, payload: &Value) -> RenderResult<ChatMessage> {
        let event = self.parse_event(payload)?;
        self.render_event(&event)
    }

    /// Parse and normalize a complete webhook payload.
    pub fn parse_event(&self, payload: &Value) -> RenderResult<WebhookEvent> {
        let code = payload
            .get("type")
            .and_then(Value::as_i64)
            .ok_or_else(|| RenderError::malformed("event", "missing or non-integer `type`"))?;
        let handler = handler_for(code).ok_or_else(|| RenderError::unregistered(code))?;

        let envelope: EventEnvelope = normalize::parse(payload, "event")?;
        let raw_content = payload.get("content").ok_or_else(|| {
            RenderError::malformed(handler.event_type.name(), "missing field `content`")
        })?;
        self.normalize(code, envelope, raw_content)
    }

    /// Normalize and render the content of an already parsed envelope.
    pub fn dispatch(
        &self,
        code: i64,
        envelope: EventEnvelope,
        raw_content: &Value,
    ) -> RenderResult<ChatMessage> {
        let event = self.normalize(code, envelope, raw_content)?;
        self.render_event(&event)
    }

    fn normalize(
        &self,
        code: i64,
        envelope: EventEnvelope,
        raw_content: &Value,
    ) -> RenderResult<WebhookEvent> {
        let handler = handler_for(code).ok_or_else(|| RenderError::unregistered(code))?;
        debug!(
            event_id = envelope.id,
            event_type = %handler.event_type,
            "normalizing webhook event"
        );

        let content = (handler.normalize)(raw_content).map_err(|err| match err {
            RenderError::UnmappedField(field) => RenderError::UnsupportedEventType {
                code,
                reason: format!("change field `{field}` has no mapping"),
            },
            other => other,
        })?;
        Ok(WebhookEvent::new(envelope, content))
    }

    /// Render an already normalized event.
    pub fn render_event(&self, event: &WebhookEvent) -> RenderResult<ChatMessage> {
        let handler = handler_for(event.event_type.code())
            .ok_or_else(|| RenderError::unregistered(event.event_type.code()))?;
        debug!(event_id = event.id, event_type = %event.event_type, "rendering card");
        (handler.render)(&RenderContext::new(&self.links, event))
    }
}
