//! Project membership cards.

use super::RenderContext;
use crate::error::RenderResult;
use crate::message::{ChatMessage, Icon, KeyValue, Widget};
use crate::model::{Content, User};

pub fn join_project(ctx: &RenderContext<'_>) -> RenderResult<ChatMessage> {
    let Content::JoinProject(content) = &ctx.event.content else {
        return Err(ctx.wrong_content("join_project"));
    };
    membership(ctx, "参加", &content.users)
}

pub fn leave_project(ctx: &RenderContext<'_>) -> RenderResult<ChatMessage> {
    let Content::LeaveProject(content) = &ctx.event.content else {
        return Err(ctx.wrong_content("leave_project"));
    };
    membership(ctx, "脱退", &content.users)
}

fn membership(ctx: &RenderContext<'_>, label: &str, users: &[User]) -> RenderResult<ChatMessage> {
    let project = ctx.project()?;
    let members = users
        .iter()
        .map(|user| Widget::from(KeyValue::new(label, &user.name).with_icon(Icon::Person)))
        .collect();

    Ok(ctx
        .message("メンバーを変更", project.display_name())
        .section(members)
        .action("プロジェクトを開く", ctx.links.project()?)
        .build())
}
