//! Subversion and Git repository cards.

use super::RenderContext;
use crate::error::RenderResult;
use crate::message::{Button, ChatMessage, Icon, KeyValue, Widget};
use crate::model::Content;

const OPEN_COMMIT: &str = "コミットを開く";

pub fn commit_subversion(ctx: &RenderContext<'_>) -> RenderResult<ChatMessage> {
    let Content::CommitSubversion(content) = &ctx.event.content else {
        return Err(ctx.wrong_content("commit_subversion"));
    };
    Ok(ctx
        .message("Subversion にコミット", format!("r{}", content.rev))
        .section(vec![Widget::text(&content.comment)])
        .action(OPEN_COMMIT, ctx.links.subversion_commit()?)
        .build())
}

/// One key-value per pushed revision, labelled with the short hash.
pub fn push_git(ctx: &RenderContext<'_>) -> RenderResult<ChatMessage> {
    let Content::PushGit(content) = &ctx.event.content else {
        return Err(ctx.wrong_content("push_git"));
    };

    let revisions = content
        .revisions
        .iter()
        .map(|revision| {
            Ok(Widget::from(
                KeyValue::new(revision.short_rev(), &revision.comment)
                    .with_icon(Icon::Description)
                    .with_button(Button::link(OPEN_COMMIT, ctx.links.git_commit(revision)?)),
            ))
        })
        .collect::<RenderResult<Vec<_>>>()?;

    Ok(ctx
        .message(
            "Git リポジトリにプッシュ",
            format!("{}/{}", content.repository.name, content.branch()),
        )
        .section(revisions)
        .action("ブランチを開く", ctx.links.git_branch()?)
        .build())
}

pub fn create_git(ctx: &RenderContext<'_>) -> RenderResult<ChatMessage> {
    let Content::CreateGit(content) = &ctx.event.content else {
        return Err(ctx.wrong_content("create_git"));
    };
    let description = content
        .repository
        .description
        .iter()
        .filter(|d| !d.is_empty())
        .map(Widget::text)
        .collect();

    Ok(ctx
        .message("Git リポジトリを作成", &content.repository.name)
        .section_if_any(description)
        .action("リポジトリを開く", ctx.links.git_repository()?)
        .build())
}
