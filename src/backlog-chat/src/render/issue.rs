//! Issue cards: create, update, comment, delete and bulk update.

use super::{RenderContext, diff_widget, is_description, join_names, transition_widget};
use crate::error::RenderResult;
use crate::message::{Button, ChatMessage, Icon, KeyValue, Widget};
use crate::model::Content;
use crate::resolver::icon_for_field;

const OPEN_ISSUE: &str = "課題を開く";

pub fn create_issue(ctx: &RenderContext<'_>) -> RenderResult<ChatMessage> {
    let Content::CreateIssue(content) = &ctx.event.content else {
        return Err(ctx.wrong_content("create_issue"));
    };
    let key = ctx.links.issue_key()?;

    let mut widgets = vec![
        Widget::text(&content.description),
        field("種別", &content.issue_type.name, "issueType"),
    ];
    if let Some(assignee) = &content.assignee {
        widgets.push(field("担当者", &assignee.name, "assignee"));
    }
    if let Some(priority) = content.priority {
        widgets.push(field("優先度", priority.to_string(), "priority"));
    }
    if !content.milestone.is_empty() {
        let names = join_names(content.milestone.iter().map(|m| m.name.as_str()));
        widgets.push(field("マイルストーン", names, "milestone"));
    }
    if !content.category.is_empty() {
        let names = join_names(content.category.iter().map(|c| c.name.as_str()));
        widgets.push(field("カテゴリー", names, "category"));
    }
    if !content.versions.is_empty() {
        let names = join_names(content.versions.iter().map(|v| v.name.as_str()));
        widgets.push(field("バージョン", names, "version"));
    }
    if let Some(due_date) = content.due_date {
        widgets.push(field("期限日", due_date.format("%Y-%m-%d").to_string(), "dueDate"));
    }

    Ok(ctx
        .message(
            format!("課題 {key} を追加"),
            format!("{key} {}", content.summary),
        )
        .section(widgets)
        .action(OPEN_ISSUE, ctx.links.issue()?)
        .build())
}

pub fn update_issue(ctx: &RenderContext<'_>) -> RenderResult<ChatMessage> {
    let Content::UpdateIssue(content) = &ctx.event.content else {
        return Err(ctx.wrong_content("update_issue"));
    };
    let key = ctx.links.issue_key()?;

    let mut widgets = Vec::new();
    if let Some(comment) = &content.comment {
        widgets.push(Widget::text(&comment.content));
    }
    widgets.extend(content.changes.iter().map(|change| {
        if is_description(change) {
            diff_widget(change)
        } else {
            transition_widget(change)
        }
    }));
    for file in &content.shared_files {
        widgets.push(
            KeyValue::new("添付ファイル", &file.name)
                .with_button(Button::link("ファイルを開く", ctx.links.shared_file(file)?))
                .into(),
        );
    }

    let open = if content.comment.is_some() {
        ctx.links.issue_comment()?
    } else {
        ctx.links.issue()?
    };

    Ok(ctx
        .message(
            format!("課題 {key} を更新"),
            format!("{key} {}", content.summary),
        )
        .section_if_any(widgets)
        .action(OPEN_ISSUE, open)
        .build())
}

pub fn add_comment(ctx: &RenderContext<'_>) -> RenderResult<ChatMessage> {
    let Content::AddComment(content) = &ctx.event.content else {
        return Err(ctx.wrong_content("add_comment"));
    };
    let key = ctx.links.issue_key()?;

    Ok(ctx
        .message(
            format!("課題 {key} にコメント"),
            format!("{key} {}", content.summary),
        )
        .section(vec![Widget::text(&content.comment.content)])
        .action(OPEN_ISSUE, ctx.links.issue_comment()?)
        .build())
}

pub fn delete_issue(ctx: &RenderContext<'_>) -> RenderResult<ChatMessage> {
    if !matches!(ctx.event.content, Content::DeleteIssue(_)) {
        return Err(ctx.wrong_content("delete_issue"));
    }
    let key = ctx.links.issue_key()?;
    Ok(ctx.message(format!("課題 {key} を削除"), key).build())
}

pub fn bulk_update_issue(ctx: &RenderContext<'_>) -> RenderResult<ChatMessage> {
    let Content::BulkUpdateIssue(content) = &ctx.event.content else {
        return Err(ctx.wrong_content("bulk_update_issue"));
    };
    let project = ctx.project()?;

    let issues: Vec<Widget> = content
        .link
        .iter()
        .map(|link| {
            let key = project.issue_key(&link.id);
            Widget::from(
                KeyValue::new(&key, &link.title)
                    .with_icon(Icon::Ticket)
                    .with_button(Button::link(OPEN_ISSUE, ctx.links.view(&key))),
            )
        })
        .collect();
    let changes: Vec<Widget> = content.changes.iter().map(transition_widget).collect();

    Ok(ctx
        .message("課題をまとめて更新", project.display_name())
        .section(issues)
        .section(changes)
        .action("プロジェクトを開く", ctx.links.project()?)
        .build())
}

fn field(label: &str, content: impl Into<String>, raw_field: &str) -> Widget {
    KeyValue::new(label, content)
        .with_icon(icon_for_field(raw_field))
        .into()
}
