//! Pull request cards.
//!
//! Titles read `<KEY>/<repository>#<number> <summary>`.

use super::{RenderContext, is_description, transition_widget};
use crate::error::RenderResult;
use crate::message::{Button, ChatMessage, Icon, KeyValue, MessageBuilder, Widget};
use crate::model::{Content, PullRequestContent};

const OPEN_PULL_REQUEST: &str = "プルリクエストを開く";

/// Card builder with the pull-request title.
fn start(
    ctx: &RenderContext<'_>,
    text: &str,
    content: &PullRequestContent,
) -> RenderResult<MessageBuilder> {
    let project = ctx.project()?;
    Ok(ctx.message(
        text,
        format!(
            "{}/{}#{} {}",
            project.project_key, content.repository.name, content.number, content.summary
        ),
    ))
}

pub fn create_pull_request(ctx: &RenderContext<'_>) -> RenderResult<ChatMessage> {
    let Content::CreatePullRequest(content) = &ctx.event.content else {
        return Err(ctx.wrong_content("create_pull_request"));
    };
    let project = ctx.project()?;

    let mut widgets = vec![Widget::text(&content.description)];
    if let Some(assignee) = &content.assignee {
        widgets.push(
            KeyValue::new("担当者", &assignee.name)
                .with_icon(Icon::Person)
                .into(),
        );
    }
    if let Some(issue) = &content.issue {
        let key = project.issue_key(issue.key_id);
        widgets.push(
            KeyValue::new("関連課題", format!("{key} {}", issue.summary))
                .with_icon(Icon::Ticket)
                .with_button(Button::link("課題を開く", ctx.links.view(&key)))
                .into(),
        );
    }

    Ok(start(ctx, "プルリクエストを作成", content)?
        .section(widgets)
        .action(OPEN_PULL_REQUEST, ctx.links.pull_request()?)
        .build())
}

/// Description edits are left out; the card already shows the description.
pub fn update_pull_request(ctx: &RenderContext<'_>) -> RenderResult<ChatMessage> {
    let Content::UpdatePullRequest(content) = &ctx.event.content else {
        return Err(ctx.wrong_content("update_pull_request"));
    };

    let mut widgets = vec![Widget::text(&content.description)];
    widgets.extend(
        content
            .changes
            .iter()
            .filter(|change| !is_description(change))
            .map(transition_widget),
    );

    Ok(start(ctx, "プルリクエストを更新", content)?
        .section(widgets)
        .action(OPEN_PULL_REQUEST, ctx.links.pull_request()?)
        .build())
}

pub fn comment_pull_request(ctx: &RenderContext<'_>) -> RenderResult<ChatMessage> {
    let Content::CommentPullRequest(content) = &ctx.event.content else {
        return Err(ctx.wrong_content("comment_pull_request"));
    };
    let comment = content
        .comment
        .iter()
        .map(|comment| Widget::text(&comment.content))
        .collect();

    Ok(start(ctx, "プルリクエストにコメント", content)?
        .section_if_any(comment)
        .action(OPEN_PULL_REQUEST, ctx.links.pull_request()?)
        .build())
}
