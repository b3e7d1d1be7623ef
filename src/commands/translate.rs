//! Translation command handlers: .tr .rr .t .r .tl

use super::{CommandContext, Reply};
use crate::composer::{translate_and_edit, Mode, TranslationRequest};

pub(super) async fn translate(
    ctx: &CommandContext<'_>,
    mode: Mode,
    langs: Option<&str>,
    text: &str,
) -> Option<Reply> {
    let langs = match langs {
        Some(langs) => langs.to_string(),
        None => ctx.app.settings.get().default_lang,
    };
    let request = TranslationRequest::new(text, &langs, mode);
    if request.text.is_empty() || request.targets.is_empty() {
        return Some(Reply::usage(
            "Usage: <code>.tr text</code>, <code>.rr text</code>, \
             <code>.t ja,en text</code> or <code>.r ko text</code>",
        ));
    }
    translate_and_edit(ctx.app, ctx.channel, ctx.working, &request).await;
    None
}

pub(super) async fn translate_reply(ctx: &CommandContext<'_>) -> Option<Reply> {
    let Some(text) = ctx.incoming.reply_text() else {
        return Some(Reply::usage("Reply to a message with <code>.tl</code>"));
    };
    let home = ctx.app.settings.get().home_lang;
    let request = TranslationRequest::new(text, &home, Mode::Replace);
    translate_and_edit(ctx.app, ctx.channel, ctx.working, &request).await;
    None
}
