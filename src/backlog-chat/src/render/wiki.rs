//! Wiki cards.

use super::RenderContext;
use crate::error::RenderResult;
use crate::message::{ChatMessage, Widget};
use crate::model::Content;

const OPEN_WIKI: &str = "Wiki を開く";

pub fn create_wiki(ctx: &RenderContext<'_>) -> RenderResult<ChatMessage> {
    let Content::CreateWiki(page) = &ctx.event.content else {
        return Err(ctx.wrong_content("create_wiki"));
    };
    Ok(ctx
        .message("Wiki を追加", &page.name)
        .section(vec![Widget::text(&page.content)])
        .action(OPEN_WIKI, ctx.links.wiki()?)
        .build())
}

/// Backlog's own page diff is shown verbatim, with a link to the diff view.
pub fn update_wiki(ctx: &RenderContext<'_>) -> RenderResult<ChatMessage> {
    let Content::UpdateWiki(page) = &ctx.event.content else {
        return Err(ctx.wrong_content("update_wiki"));
    };
    let message = ctx.message("Wiki を更新", &page.name);
    let message = if page.diff.is_empty() {
        message.action(OPEN_WIKI, ctx.links.wiki()?)
    } else {
        message
            .section(vec![Widget::text(&page.diff)])
            .action(OPEN_WIKI, ctx.links.wiki()?)
            .action("差分を開く", ctx.links.wiki_diff()?)
    };
    Ok(message.build())
}

pub fn delete_wiki(ctx: &RenderContext<'_>) -> RenderResult<ChatMessage> {
    let Content::DeleteWiki(page) = &ctx.event.content else {
        return Err(ctx.wrong_content("delete_wiki"));
    };
    Ok(ctx.message("Wiki を削除", &page.name).build())
}
